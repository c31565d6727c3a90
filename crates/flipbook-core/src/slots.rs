use crate::types::RenderedPage;
use std::sync::Arc;

/// State of one page position
#[derive(Debug, Clone, Default)]
pub enum PageSlot {
    #[default]
    Pending,
    Ready(Arc<RenderedPage>),
    /// Rasterization failed; shown as a placeholder
    Failed(String),
}

impl PageSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, PageSlot::Pending)
    }

    pub fn is_settled(&self) -> bool {
        !self.is_pending()
    }

    pub fn page(&self) -> Option<&Arc<RenderedPage>> {
        match self {
            PageSlot::Ready(page) => Some(page),
            _ => None,
        }
    }
}

/// Ordered page slots with a version bumped on every change
#[derive(Debug, Clone, Default)]
pub struct PageSlots {
    slots: Vec<PageSlot>,
    version: u64,
}

impl PageSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `page_count` pending slots
    pub fn allocate(&mut self, page_count: usize) {
        self.slots = vec![PageSlot::Pending; page_count];
        self.version += 1;
    }

    pub fn reset(&mut self) {
        self.slots.clear();
        self.version += 1;
    }

    /// Store a slot; returns false when `index` is out of range
    pub fn set(&mut self, index: usize, slot: PageSlot) -> bool {
        match self.slots.get_mut(index) {
            Some(existing) => {
                *existing = slot;
                self.version += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&PageSlot> {
        self.slots.get(index)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageSlot> {
        self.slots.iter()
    }

    pub fn pending_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_pending())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn settled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_settled()).count()
    }

    /// True when every slot holds a bitmap or a failure marker
    pub fn is_settled(&self) -> bool {
        self.slots.iter().all(PageSlot::is_settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ZoomLevel;

    #[test]
    fn test_allocate_and_settle() {
        let mut slots = PageSlots::new();
        slots.allocate(3);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots.pending_indices(), vec![0, 1, 2]);
        assert!(!slots.is_settled());

        let page = Arc::new(RenderedPage::filled(1, 1, ZoomLevel(100), [0; 4]));
        assert!(slots.set(0, PageSlot::Ready(page)));
        assert!(slots.set(2, PageSlot::Failed("broken".into())));
        assert_eq!(slots.pending_indices(), vec![1]);
        assert_eq!(slots.settled_count(), 2);
        assert!(slots.get(0).unwrap().page().is_some());
    }

    #[test]
    fn test_set_out_of_range_is_ignored() {
        let mut slots = PageSlots::new();
        slots.allocate(1);
        let version = slots.version();
        assert!(!slots.set(5, PageSlot::Failed("nope".into())));
        assert_eq!(slots.version(), version);
    }

    #[test]
    fn test_version_bumps_on_change() {
        let mut slots = PageSlots::new();
        let v0 = slots.version();
        slots.allocate(2);
        slots.set(1, PageSlot::Failed("x".into()));
        slots.reset();
        assert_eq!(slots.version(), v0 + 3);
        assert!(slots.is_empty());
    }
}
