use imagemap_geometry::Point;

/// Platform pointer identifier.
pub type PointerId = u64;

/// A tracked contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub id: PointerId,
    /// Last stored position in screen coordinates
    pub position: Point,
}

/// Every pointer currently in contact, in the order contact was made.
#[derive(Debug, Clone, Default)]
pub struct PointerRegistry {
    pointers: Vec<Pointer>,
}

impl PointerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new contact. Returns false if the id is already tracked,
    /// in which case only its position is updated.
    pub fn add(&mut self, id: PointerId, position: Point) -> bool {
        if let Some(existing) = self.get_mut(id) {
            existing.position = position;
            return false;
        }
        self.pointers.push(Pointer { id, position });
        true
    }

    pub fn get(&self, id: PointerId) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: PointerId) -> Option<&mut Pointer> {
        self.pointers.iter_mut().find(|p| p.id == id)
    }

    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.get(id).map(|p| p.position)
    }

    pub fn contains(&self, id: PointerId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: PointerId) -> Option<Pointer> {
        let index = self.pointers.iter().position(|p| p.id == id)?;
        Some(self.pointers.remove(index))
    }

    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    /// Earliest contact not in `bound`.
    pub fn first_unbound(&self, bound: &[Option<PointerId>]) -> Option<PointerId> {
        self.pointers
            .iter()
            .map(|p| p.id)
            .find(|id| !bound.contains(&Some(*id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers.iter()
    }
}
