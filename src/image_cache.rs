//! Decoded image cache.
//!
//! Holds decoded RGBA images keyed by an identifier, evicting the least
//! recently used ones once the pixel budget is exceeded. The cache is an
//! ordinary value owned by whoever loads images; nothing is global.

use image::RgbaImage;
use std::collections::HashMap;
use std::sync::Arc;

struct Entry {
    image: Arc<RgbaImage>,
    bytes: usize,
    last_used: u64,
}

/// Bounded LRU cache of decoded images.
pub struct ImageCache {
    budget_bytes: usize,
    used_bytes: usize,
    clock: u64,
    entries: HashMap<String, Entry>,
}

/// Pixel memory of an RGBA image.
pub fn image_bytes(image: &RgbaImage) -> usize {
    image.as_raw().len()
}

impl ImageCache {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            used_bytes: 0,
            clock: 0,
            entries: HashMap::new(),
        }
    }

    fn touch(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up an image and mark it as recently used.
    pub fn get(&mut self, key: &str) -> Option<Arc<RgbaImage>> {
        let now = self.touch();
        let entry = self.entries.get_mut(key)?;
        entry.last_used = now;
        Some(Arc::clone(&entry.image))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Store an image, replacing any previous one under the same key.
    ///
    /// An image larger than the whole budget is handed back without being
    /// retained.
    pub fn insert(&mut self, key: impl Into<String>, image: RgbaImage) -> Arc<RgbaImage> {
        let key = key.into();
        let image = Arc::new(image);
        let bytes = image_bytes(&image);

        self.remove(&key);
        if bytes > self.budget_bytes {
            log::warn!(
                "Image '{}' ({} bytes) exceeds the cache budget of {} bytes, not caching",
                key,
                bytes,
                self.budget_bytes
            );
            return image;
        }

        self.evict_to_fit(bytes);
        let last_used = self.touch();
        self.used_bytes += bytes;
        log::debug!("Cached image '{}' ({}x{}, {} bytes)", key, image.width(), image.height(), bytes);
        self.entries.insert(
            key,
            Entry {
                image: Arc::clone(&image),
                bytes,
                last_used,
            },
        );
        image
    }

    /// Return the cached image or decode, cache and return it.
    pub fn get_or_insert_with<F, E>(&mut self, key: &str, decode: F) -> Result<Arc<RgbaImage>, E>
    where
        F: FnOnce() -> Result<RgbaImage, E>,
    {
        if let Some(image) = self.get(key) {
            log::trace!("Cache hit for '{}'", key);
            return Ok(image);
        }
        log::info!("🖼️ Decoding image '{}'", key);
        let image = decode()?;
        Ok(self.insert(key, image))
    }

    pub fn remove(&mut self, key: &str) -> Option<Arc<RgbaImage>> {
        let entry = self.entries.remove(key)?;
        self.used_bytes -= entry.bytes;
        Some(entry.image)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.used_bytes = 0;
    }

    fn evict_to_fit(&mut self, incoming: usize) {
        while self.used_bytes + incoming > self.budget_bytes {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            if let Some(entry) = self.entries.remove(&oldest) {
                self.used_bytes -= entry.bytes;
                log::debug!("Evicted image '{}' ({} bytes)", oldest, entry.bytes);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_CACHE_BUDGET_BYTES)
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("budget_bytes", &self.budget_bytes)
            .field("used_bytes", &self.used_bytes)
            .field("len", &self.entries.len())
            .finish()
    }
}
