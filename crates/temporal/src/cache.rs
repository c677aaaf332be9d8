use std::collections::BTreeMap;

use foundation::ids::TileId;
use foundation::time::Time;

use crate::style::StyleLabel;

/// Exact bit pattern of a query time. `-0.0` and `0.0` share a key; every
/// other pair of distinct values gets distinct keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeKey(u64);

impl TimeKey {
    pub fn new(time: Time) -> Self {
        let v = if time.0 == 0.0 { 0.0 } else { time.0 };
        TimeKey(v.to_bits())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey {
    pub time: TimeKey,
    pub tile: TileId,
}

impl StateKey {
    pub fn new(time: Time, tile: TileId) -> Self {
        Self {
            time: TimeKey::new(time),
            tile,
        }
    }
}

/// Memoized feature states per `(time, tile)`.
///
/// Entries are write-once and never evicted; the cache grows with the number
/// of distinct times visited.
#[derive(Debug, Default)]
pub struct StateCache {
    entries: BTreeMap<StateKey, Vec<StyleLabel>>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, time: Time, tile: TileId) -> Option<&[StyleLabel]> {
        self.entries
            .get(&StateKey::new(time, tile))
            .map(|v| v.as_slice())
    }

    pub fn contains(&self, time: Time, tile: TileId) -> bool {
        self.entries.contains_key(&StateKey::new(time, tile))
    }

    /// Stores `states` unless the key is already present; returns the stored
    /// entry either way.
    pub fn insert(&mut self, time: Time, tile: TileId, states: Vec<StyleLabel>) -> &[StyleLabel] {
        self.entries
            .entry(StateKey::new(time, tile))
            .or_insert(states)
            .as_slice()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{StateCache, TimeKey};
    use crate::style::StyleLabel;
    use foundation::ids::TileId;
    use foundation::time::Time;

    #[test]
    fn entries_are_write_once() {
        let mut cache = StateCache::new();
        cache.insert(Time(2010.0), TileId(1), vec![StyleLabel::HIDE]);
        let kept = cache.insert(Time(2010.0), TileId(1), vec![StyleLabel::CREATION]);
        assert_eq!(kept, &[StyleLabel::HIDE]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_separate_time_and_tile() {
        let mut cache = StateCache::new();
        cache.insert(Time(1.0), TileId(1), vec![StyleLabel::HIDE]);
        cache.insert(Time(1.0), TileId(2), vec![]);
        cache.insert(Time(1.0 + f64::EPSILON), TileId(1), vec![StyleLabel::CREATION]);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(Time(1.0), TileId(1)), Some(&[StyleLabel::HIDE][..]));
        assert!(cache.get(Time(3.0), TileId(1)).is_none());
        assert!(cache.contains(Time(1.0 + f64::EPSILON), TileId(1)));
    }

    #[test]
    fn signed_zero_shares_a_key() {
        assert_eq!(TimeKey::new(Time(-0.0)), TimeKey::new(Time(0.0)));
        assert_ne!(TimeKey::new(Time(1.0)), TimeKey::new(Time(-1.0)));
    }
}
