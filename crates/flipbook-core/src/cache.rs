use crate::types::{RenderedPage, ZoomLevel};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Cache key: a page is only reusable at the zoom it was rendered at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub page_index: usize,
    pub zoom: ZoomLevel,
}

impl CacheKey {
    pub fn new(page_index: usize, zoom: ZoomLevel) -> Self {
        Self { page_index, zoom }
    }
}

/// Bounded LRU cache of rendered pages
#[derive(Debug)]
pub struct RenderCache {
    enabled: bool,
    capacity: usize,
    pages: HashMap<CacheKey, Arc<RenderedPage>>,
    order: VecDeque<CacheKey>,
}

impl RenderCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            enabled: true,
            capacity: capacity.max(1),
            pages: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(1)
        }
    }

    /// Look up a page and mark it most recently used
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<RenderedPage>> {
        let page = Arc::clone(self.pages.get(key)?);
        self.touch(key);
        Some(page)
    }

    pub fn put(&mut self, key: CacheKey, page: Arc<RenderedPage>) {
        if !self.enabled {
            return;
        }
        if self.pages.insert(key, page).is_some() {
            self.touch(&key);
            return;
        }
        self.order.push_back(key);
        while self.order.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.pages.remove(&oldest);
        }
    }

    /// Move `key` to the back of the recency queue
    fn touch(&mut self, key: &CacheKey) {
        if let Some(position) = self.order.iter().position(|k| k == key) {
            if let Some(found) = self.order.remove(position) {
                self.order.push_back(found);
            }
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(zoom: u32) -> Arc<RenderedPage> {
        Arc::new(RenderedPage::filled(1, 1, ZoomLevel(zoom), [0, 0, 0, 255]))
    }

    #[test]
    fn test_get_and_overwrite() {
        let mut cache = RenderCache::new(4);
        let key = CacheKey::new(0, ZoomLevel(150));
        assert!(cache.get(&key).is_none());

        cache.put(key, page(150));
        assert_eq!(cache.get(&key).unwrap().zoom, ZoomLevel(150));

        let replacement = Arc::new(RenderedPage::filled(2, 2, ZoomLevel(150), [1, 1, 1, 1]));
        cache.put(key, replacement);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key).unwrap().width, 2);
    }

    #[test]
    fn test_overwrite_refreshes_recency() {
        let mut cache = RenderCache::new(2);
        let a = CacheKey::new(0, ZoomLevel(100));
        let b = CacheKey::new(1, ZoomLevel(100));
        let c = CacheKey::new(2, ZoomLevel(100));

        cache.put(a, page(100));
        cache.put(b, page(100));
        cache.put(a, page(100));
        cache.put(c, page(100));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&a).is_some());
    }

    #[test]
    fn test_zoom_is_part_of_key() {
        let mut cache = RenderCache::new(4);
        cache.put(CacheKey::new(3, ZoomLevel(150)), page(150));

        assert!(cache.get(&CacheKey::new(3, ZoomLevel(170))).is_none());
        cache.put(CacheKey::new(3, ZoomLevel(170)), page(170));
        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.get(&CacheKey::new(3, ZoomLevel(150))).unwrap().zoom,
            ZoomLevel(150)
        );

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = RenderCache::new(2);
        let a = CacheKey::new(0, ZoomLevel(100));
        let b = CacheKey::new(1, ZoomLevel(100));
        let c = CacheKey::new(2, ZoomLevel(100));

        cache.put(a, page(100));
        cache.put(b, page(100));
        // Touch a so b becomes the eviction candidate
        assert!(cache.get(&a).is_some());
        cache.put(c, page(100));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&a).is_some());
        assert!(cache.get(&c).is_some());
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let mut cache = RenderCache::disabled();
        let key = CacheKey::new(0, ZoomLevel(100));
        cache.put(key, page(100));
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
