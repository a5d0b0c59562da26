//! Area ingestion and lookup.
//!
//! Area definitions arrive as loosely typed records (shape keyword, id and a
//! comma-separated coordinate list, like an HTML `<area>` tag). They are
//! validated into [`Area`]s here and stored in an [`AreaRegistry`] that keeps
//! both draw order and id lookup.

use std::collections::HashMap;

use imagemap_geometry::{Area, AreaId, Decoration, Point};
use serde::{Deserialize, Serialize};

use crate::error::AreaError;

/// One raw hotspot definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AreaDefinition {
    /// `rect`, `circle`, `poly` or `polygon` (any case)
    pub shape: String,
    /// Decimal id, must be nonzero
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Comma-separated numbers in natural-image pixels
    pub coords: String,
    /// Every attribute of the definition, kept verbatim
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl AreaDefinition {
    pub fn new(shape: impl Into<String>, id: impl Into<String>, coords: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            id: id.into(),
            coords: coords.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The explicit name, else the `title` attribute, else `alt`.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or_else(|| self.attributes.get("title").map(String::as_str))
            .or_else(|| self.attributes.get("alt").map(String::as_str))
    }
}

fn parse_id(raw: &str) -> Result<AreaId, AreaError> {
    match raw.trim().parse::<AreaId>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(AreaError::invalid_id(raw)),
    }
}

/// An empty list parses to no coordinates; an empty token inside a list
/// (`"10,,10"`) is an invalid coordinate.
fn parse_coords(raw: &str) -> Result<Vec<f32>, AreaError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(str::trim)
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| AreaError::InvalidCoordinate { value: token.to_string() })
        })
        .collect()
}

impl TryFrom<AreaDefinition> for Area {
    type Error = AreaError;

    fn try_from(def: AreaDefinition) -> Result<Self, Self::Error> {
        let id = parse_id(&def.id)?;
        let shape = def.shape.trim().to_ascii_lowercase();
        let coords = parse_coords(&def.coords)?;

        let area = match shape.as_str() {
            "rect" => match coords[..] {
                [left, top, right, bottom] => Area::rect(id, left, top, right, bottom)?,
                _ => return Err(AreaError::coordinate_count(shape.as_str(), "4", coords.len())),
            },
            "circle" => match coords[..] {
                [x, y, radius] => Area::circle(id, x, y, radius)?,
                _ => return Err(AreaError::coordinate_count(shape.as_str(), "3", coords.len())),
            },
            "poly" | "polygon" => {
                if coords.len() < 6 || coords.len() % 2 != 0 {
                    return Err(AreaError::coordinate_count(shape.as_str(), "an even number >= 6", coords.len()));
                }
                let vertices = coords.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect();
                Area::polygon(id, vertices)?
            }
            _ => return Err(AreaError::unsupported_shape(def.shape.clone())),
        };

        let mut area = match def.display_name() {
            Some(name) => area.with_name(name),
            None => area,
        };
        for (key, value) in def.attributes {
            area.set_attribute(key, value);
        }
        Ok(area)
    }
}

/// Areas in registration (draw and hit-test) order, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct AreaRegistry {
    areas: Vec<Area>,
    index: HashMap<AreaId, usize>,
}

impl AreaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an area. Ids must be unique.
    pub fn add(&mut self, area: Area) -> Result<AreaId, AreaError> {
        let id = area.id();
        if id == 0 {
            return Err(AreaError::invalid_id("0"));
        }
        if self.index.contains_key(&id) {
            return Err(AreaError::DuplicateId { id });
        }
        self.index.insert(id, self.areas.len());
        self.areas.push(area);
        Ok(id)
    }

    /// Validate and add a raw definition.
    pub fn add_definition(&mut self, definition: AreaDefinition) -> Result<AreaId, AreaError> {
        self.add(Area::try_from(definition)?)
    }

    pub fn get(&self, id: AreaId) -> Option<&Area> {
        self.index.get(&id).map(|&i| &self.areas[i])
    }

    fn get_mut(&mut self, id: AreaId) -> Option<&mut Area> {
        let i = *self.index.get(&id)?;
        self.areas.get_mut(i)
    }

    pub fn contains(&self, id: AreaId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Area> {
        self.areas.iter()
    }

    pub fn len(&self) -> usize {
        self.areas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn attribute(&self, id: AreaId, key: &str) -> Option<&str> {
        self.get(id)?.attribute(key)
    }

    /// Returns false if the area does not exist.
    pub fn set_attribute(&mut self, id: AreaId, key: impl Into<String>, value: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(area) => {
                area.set_attribute(key, value);
                true
            }
            None => false,
        }
    }

    /// Returns false if the area does not exist.
    pub fn set_decoration(&mut self, id: AreaId, decoration: Option<Decoration>) -> bool {
        match self.get_mut(id) {
            Some(area) => {
                area.set_decoration(decoration);
                true
            }
            None => false,
        }
    }

    /// First area, in registration order, containing a natural-image point.
    pub fn find_at(&self, point: Point) -> Option<&Area> {
        self.areas.iter().find(|area| area.is_in_area(point.x, point.y))
    }

    pub fn clear(&mut self) {
        self.areas.clear();
        self.index.clear();
    }
}
