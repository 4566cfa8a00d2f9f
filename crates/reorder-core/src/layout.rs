use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    #[default]
    Vertical,
    Horizontal,
}

impl ScrollAxis {
    pub fn is_horizontal(self) -> bool {
        matches!(self, ScrollAxis::Horizontal)
    }

    /// Pick the component that lies along this axis.
    pub fn pick<T>(self, x: T, y: T) -> T {
        match self {
            ScrollAxis::Vertical => y,
            ScrollAxis::Horizontal => x,
        }
    }
}

/// Position and size of a row along the scroll axis, in content coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub pos: f32,
    pub extent: f32,
}

impl LayoutEntry {
    pub fn new(pos: f32, extent: f32) -> Self {
        Self { pos, extent }
    }

    /// Build an entry from a rectangle, keeping only the components along `axis`.
    pub fn along(axis: ScrollAxis, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: axis.pick(x, y),
            extent: axis.pick(width, height),
        }
    }

    pub fn end(&self) -> f32 {
        self.pos + self.extent
    }

    pub fn center(&self) -> f32 {
        self.pos + self.extent / 2.0
    }
}

pub type SharedLayoutCache = Rc<RefCell<LayoutCache>>;

/// Measured row layouts keyed by item key.
///
/// Entries are only ever inserted or overwritten. Keys that disappear from the
/// list keep their stale entry, which is harmless because lookups always go
/// through the current keys.
#[derive(Clone, Debug, Default)]
pub struct LayoutCache {
    entries: HashMap<String, LayoutEntry>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedLayoutCache {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn record(&mut self, key: impl Into<String>, entry: LayoutEntry) {
        self.entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<LayoutEntry> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Find the slot a probe point falls into.
///
/// Walks `keys` in list order and returns the first index whose entry ends
/// strictly after `probe`, so a probe sitting exactly on a boundary belongs to
/// the later item. When the probe lies past every entry, returns `keys.len()`.
///
/// Returns `None` as soon as a key without a measured entry is reached before
/// the slot is found; callers keep their previous answer in that case rather
/// than settling on the unmeasured index.
pub fn resolve_target_index<'a>(
    cache: &LayoutCache,
    keys: impl IntoIterator<Item = &'a str>,
    probe: f32,
) -> Option<usize> {
    let mut count = 0;
    for (ix, key) in keys.into_iter().enumerate() {
        let entry = cache.get(key)?;
        if probe < entry.end() {
            return Some(ix);
        }
        count = ix + 1;
    }
    Some(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(extents: &[(&str, f32)]) -> LayoutCache {
        let mut cache = LayoutCache::new();
        let mut pos = 0.0;
        for (key, extent) in extents {
            cache.record(*key, LayoutEntry::new(pos, *extent));
            pos += extent;
        }
        cache
    }

    #[test]
    fn boundary_probe_belongs_to_later_item() {
        let cache = cache(&[("a", 10.0), ("b", 20.0), ("c", 30.0)]);
        let keys = ["a", "b", "c"];
        assert_eq!(resolve_target_index(&cache, keys, 0.0), Some(0));
        assert_eq!(resolve_target_index(&cache, keys, 9.9), Some(0));
        assert_eq!(resolve_target_index(&cache, keys, 10.0), Some(1));
        assert_eq!(resolve_target_index(&cache, keys, 29.0), Some(1));
        assert_eq!(resolve_target_index(&cache, keys, 30.0), Some(2));
    }

    #[test]
    fn probe_past_every_measured_item_resolves_to_len() {
        let cache = cache(&[("a", 10.0), ("b", 10.0)]);
        assert_eq!(resolve_target_index(&cache, ["a", "b"], 25.0), Some(2));
    }

    #[test]
    fn missing_layout_stops_the_walk() {
        let cache = cache(&[("a", 10.0), ("b", 10.0)]);
        // `c` was never measured: a probe beyond the known ends cannot be resolved.
        assert_eq!(resolve_target_index(&cache, ["a", "b", "c"], 25.0), None);
        // A probe inside the measured prefix still resolves.
        assert_eq!(resolve_target_index(&cache, ["a", "b", "c"], 15.0), Some(1));
    }

    #[test]
    fn entry_along_axis_picks_components() {
        let vertical = LayoutEntry::along(ScrollAxis::Vertical, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(vertical, LayoutEntry::new(2.0, 4.0));
        let horizontal = LayoutEntry::along(ScrollAxis::Horizontal, 1.0, 2.0, 3.0, 4.0);
        assert_eq!(horizontal, LayoutEntry::new(1.0, 3.0));
        assert_eq!(vertical.end(), 6.0);
        assert_eq!(vertical.center(), 4.0);
    }
}
