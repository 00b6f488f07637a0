use crate::matrix::PairMatrix;

/// Occluders remembered per ordered pair.
pub const OCCLUDER_CACHE_SIZE: usize = 3;

/// Small per-pair cache of cuboids that recently blocked the pair.
///
/// Entries are indices into the engine's immutable cuboid array, each with
/// the tick it last blocked. Eviction replaces an empty slot first, then the
/// slot with the oldest tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccluderCache {
    entries: [Option<u32>; OCCLUDER_CACHE_SIZE],
    last_used: [u64; OCCLUDER_CACHE_SIZE],
}

impl OccluderCache {
    /// Occupied `(slot, cuboid)` entries in slot order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, e)| e.map(|cuboid| (slot, cuboid)))
    }

    pub fn cuboids(&self) -> Vec<u32> {
        self.entries().map(|(_, c)| c).collect()
    }

    pub fn contains(&self, cuboid: u32) -> bool {
        self.entries.contains(&Some(cuboid))
    }

    pub fn len(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_used(&self, slot: usize) -> Option<u64> {
        self.entries.get(slot)?.map(|_| self.last_used[slot])
    }

    /// Mark a slot as having blocked at `tick`.
    pub fn touch(&mut self, slot: usize, tick: u64) {
        if slot < OCCLUDER_CACHE_SIZE && self.entries[slot].is_some() {
            self.last_used[slot] = tick;
        }
    }

    /// Remember `cuboid` as blocking at `tick`; returns the slot used.
    pub fn insert(&mut self, cuboid: u32, tick: u64) -> usize {
        let slot = self
            .entries
            .iter()
            .position(|e| *e == Some(cuboid))
            .or_else(|| self.entries.iter().position(Option::is_none))
            .unwrap_or_else(|| self.oldest_slot());
        self.entries[slot] = Some(cuboid);
        self.last_used[slot] = tick;
        slot
    }

    /// Drop `cuboid` from the cache, freeing its slot.
    pub fn remove(&mut self, cuboid: u32) -> bool {
        match self.entries.iter().position(|e| *e == Some(cuboid)) {
            Some(slot) => {
                self.entries[slot] = None;
                self.last_used[slot] = 0;
                true
            }
            None => false,
        }
    }

    fn oldest_slot(&self) -> usize {
        let mut oldest = 0;
        for slot in 1..OCCLUDER_CACHE_SIZE {
            if self.last_used[slot] < self.last_used[oldest] {
                oldest = slot;
            }
        }
        oldest
    }
}

/// Per-pair visibility state: countdown timers plus occluder caches.
///
/// A pair with timer 0 is due for a new occlusion query; a pair with a
/// positive timer counts as visible.
#[derive(Debug, Clone, Default)]
pub struct VisibilityCache {
    timers: PairMatrix<u32>,
    occluders: PairMatrix<OccluderCache>,
}

impl VisibilityCache {
    pub fn new(size: usize) -> Self {
        Self {
            timers: PairMatrix::new(size),
            occluders: PairMatrix::new(size),
        }
    }

    pub fn size(&self) -> usize {
        self.timers.size()
    }

    /// Grow to cover `size` character slots.
    pub fn grow(&mut self, size: usize) {
        self.timers.grow(size);
        self.occluders.grow(size);
    }

    /// Timer for a pair; out-of-range pairs read as 0.
    pub fn timer(&self, player: usize, enemy: usize) -> u32 {
        self.timers.get(player, enemy).copied().unwrap_or(0)
    }

    pub fn set_timer(&mut self, player: usize, enemy: usize, value: u32) {
        match self.timers.get_mut(player, enemy) {
            Some(timer) => *timer = value,
            None => {
                debug_assert!(false, "timer ({player}, {enemy}) out of range");
                tracing::warn!(player, enemy, "ignoring timer write for unknown pair");
            }
        }
    }

    /// Count a positive timer down by one and return the new value.
    pub fn decrement_timer(&mut self, player: usize, enemy: usize) -> u32 {
        match self.timers.get_mut(player, enemy) {
            Some(timer) => {
                *timer = timer.saturating_sub(1);
                *timer
            }
            None => 0,
        }
    }

    pub fn occluders(&self, player: usize, enemy: usize) -> Option<&OccluderCache> {
        self.occluders.get(player, enemy)
    }

    pub fn touch_occluder(&mut self, player: usize, enemy: usize, slot: usize, tick: u64) {
        if let Some(cache) = self.occluders.get_mut(player, enemy) {
            cache.touch(slot, tick);
        }
    }

    pub fn insert_occluder(&mut self, player: usize, enemy: usize, cuboid: u32, tick: u64) {
        if let Some(cache) = self.occluders.get_mut(player, enemy) {
            cache.insert(cuboid, tick);
        }
    }

    /// Remove `cuboid` from every pair's cache; returns how many pairs held it.
    pub fn forget_occluder(&mut self, cuboid: u32) -> usize {
        self.occluders
            .values_mut()
            .map(|cache| cache.remove(cuboid))
            .filter(|removed| *removed)
            .count()
    }

    /// Pairs with a positive timer.
    pub fn visible_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.timers
            .iter()
            .filter(|(_, _, t)| **t > 0)
            .map(|(i, j, _)| (i, j))
    }

    /// Total cached occluder entries across all pairs.
    pub fn cached_count(&self) -> usize {
        self.occluders.iter().map(|(_, _, c)| c.len()).sum()
    }
}
