use bytes::Bytes;
use std::collections::HashMap;

pub const CACHE_SIZE: usize = 256;

/// Rolling cache of game data payloads. Both sides of a session keep one in
/// lockstep so a payload already seen can be sent as its one-byte slot index.
#[derive(Debug, Clone)]
pub struct GameDataCache {
    slots: Vec<Option<Bytes>>,
    /// Payload -> slot, for the outbound hit check.
    hits: HashMap<Bytes, u8>,
    next: usize,
}

impl Default for GameDataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl GameDataCache {
    pub fn new() -> Self {
        Self {
            slots: vec![None; CACHE_SIZE],
            hits: HashMap::with_capacity(CACHE_SIZE),
            next: 0,
        }
    }

    /// Stores `data` in the next slot, overwriting the oldest entry once the
    /// cache has wrapped, and returns the slot index.
    pub fn add(&mut self, data: Bytes) -> u8 {
        let index = (self.next % CACHE_SIZE) as u8;
        self.next = self.next.wrapping_add(1);

        if let Some(evicted) = self.slots[index as usize].take() {
            if self.hits.get(&evicted) == Some(&index) {
                self.hits.remove(&evicted);
            }
        }
        self.hits.insert(data.clone(), index);
        self.slots[index as usize] = Some(data);
        index
    }

    pub fn get(&self, index: u8) -> Option<&Bytes> {
        self.slots[index as usize].as_ref()
    }

    pub fn index_of(&self, data: &[u8]) -> Option<u8> {
        self.hits.get(data).copied()
    }

    /// Occupied slots. The same payload may sit in more than one.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.hits.clear();
        self.next = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u32) -> Bytes {
        Bytes::from(n.to_le_bytes().to_vec())
    }

    #[test]
    fn test_add_and_find() {
        let mut cache = GameDataCache::new();
        assert_eq!(cache.add(frame(1)), 0);
        assert_eq!(cache.add(frame(2)), 1);
        assert_eq!(cache.add(frame(3)), 2);

        assert_eq!(cache.index_of(&frame(2)), Some(1));
        assert_eq!(cache.index_of(&frame(9)), None);
        assert_eq!(cache.get(2), Some(&frame(3)));
        assert_eq!(cache.get(3), None);
    }

    #[test]
    fn test_wraps_and_overwrites_oldest() {
        let mut cache = GameDataCache::new();
        for n in 0..CACHE_SIZE as u32 {
            assert_eq!(cache.add(frame(n)), n as u8);
        }
        assert_eq!(cache.len(), CACHE_SIZE);

        // slot 0 is reused and its old payload forgotten
        assert_eq!(cache.add(frame(1000)), 0);
        assert_eq!(cache.index_of(&frame(0)), None);
        assert_eq!(cache.index_of(&frame(1000)), Some(0));
        assert_eq!(cache.get(0), Some(&frame(1000)));
        assert_eq!(cache.add(frame(1001)), 1);
        assert_eq!(cache.len(), CACHE_SIZE);
    }

    #[test]
    fn test_duplicate_payload_tracks_newest_slot() {
        let mut cache = GameDataCache::new();
        cache.add(frame(7));
        cache.add(frame(8));
        assert_eq!(cache.add(frame(7)), 2);
        assert_eq!(cache.index_of(&frame(7)), Some(2));
        assert_eq!(cache.get(0), Some(&frame(7)));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut cache = GameDataCache::new();
        cache.add(frame(1));
        cache.add(frame(2));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(0), None);
        assert_eq!(cache.index_of(&frame(1)), None);
        assert_eq!(cache.add(frame(3)), 0);
    }
}
