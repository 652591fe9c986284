//! LRU cache of resolved map frames keyed by (map view, date).
//!
//! Scrubbing the time cursor back and forth revisits the same dates; a hit
//! skips the per-country resolution pass.

use crate::dataset::DatasetIndex;
use crate::navigation::MapView;
use crate::resolver::{resolve_frame, MapFrame};
use chrono::NaiveDate;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

#[derive(Debug)]
pub struct FrameCache {
    frames: LruCache<(MapView, NaiveDate), Arc<MapFrame>>,
    misses: usize,
}

impl FrameCache {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            frames: LruCache::new(capacity),
            misses: 0,
        }
    }

    pub fn frame(&mut self, index: &DatasetIndex, map: MapView, date: NaiveDate) -> Arc<MapFrame> {
        if let Some(frame) = self.frames.get(&(map, date)) {
            return Arc::clone(frame);
        }
        self.misses += 1;
        log::debug!("Frame cache miss #{} for {} on {}", self.misses, map, date);
        let frame = Arc::new(resolve_frame(index, map, date));
        self.frames.put((map, date), Arc::clone(&frame));
        frame
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    pub fn misses(&self) -> usize {
        self.misses
    }
}
