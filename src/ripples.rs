//! Time-keyed set of ripples (drops) on the water surface.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use glam::Vec2;

use crate::error::{Error, Result};

/// Time value written into the uniform slot after the last live ripple.
/// Simulation time never goes negative, so the shader stops at the first
/// slot with a negative time.
pub const SENTINEL_TIME: f32 = -1.0;

/// A drop that hit the surface at `time`, at `position` in surface UV space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ripple {
    pub time: f32,
    pub position: Vec2,
}

/// Total order over finite timestamps
#[derive(Debug, Clone, Copy, PartialEq)]
struct TimeKey(f32);

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Ripples ordered by timestamp, bounded in count and age
#[derive(Debug, Clone)]
pub struct RippleStore {
    entries: BTreeMap<TimeKey, Vec2>,
    capacity: usize,
    horizon: f32,
}

impl RippleStore {
    pub fn new(capacity: usize, horizon: f32) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity,
            horizon,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a ripple at `time`, replacing any ripple with the same timestamp.
    /// When the store is full the oldest ripple is dropped.
    pub fn add_ripple(&mut self, time: f32, position: Vec2) -> Result<()> {
        if !time.is_finite() || time < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "ripple time must be finite and non-negative, got {}",
                time
            )));
        }
        if !position.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "ripple position must be finite, got {}",
                position
            )));
        }

        let position = position.clamp(Vec2::ZERO, Vec2::ONE);
        self.entries.insert(TimeKey(time), position);
        while self.entries.len() > self.capacity {
            self.entries.pop_first();
        }
        log::debug!("ripple at {:.3} ({:.3}, {:.3}), {} live", time, position.x, position.y, self.len());
        Ok(())
    }

    /// Remove every ripple with `now - time > horizon`
    pub fn age_out(&mut self, now: f32) {
        while let Some(entry) = self.entries.first_entry() {
            if now - entry.key().0 > self.horizon {
                entry.remove();
            } else {
                break;
            }
        }
    }

    /// Live ripples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = Ripple> + '_ {
        self.entries.iter().map(|(key, &position)| Ripple {
            time: key.0,
            position,
        })
    }

    /// Pack ripples as `(x, y, time, 0)` followed by one sentinel slot.
    ///
    /// If `slots` cannot hold every ripple plus the sentinel, the oldest are
    /// skipped. Returns the number of ripples written.
    pub fn write_uniform_slots(&self, slots: &mut [[f32; 4]]) -> usize {
        let Some(room) = slots.len().checked_sub(1) else {
            return 0;
        };
        let skip = self.len().saturating_sub(room);
        let mut written = 0;
        for (slot, ripple) in slots.iter_mut().zip(self.iter().skip(skip)) {
            *slot = [ripple.position.x, ripple.position.y, ripple.time, 0.0];
            written += 1;
        }
        slots[written] = [0.0, 0.0, SENTINEL_TIME, 0.0];
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_time_overwrites() {
        let mut store = RippleStore::new(100, 30.0);
        store.add_ripple(1.0, Vec2::new(0.1, 0.1)).unwrap();
        store.add_ripple(1.0, Vec2::new(0.9, 0.2)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().unwrap().position, Vec2::new(0.9, 0.2));
    }

    #[test]
    fn test_iter_ascends_and_restarts() {
        let mut store = RippleStore::new(100, 30.0);
        for t in [5.0, 1.0, 3.0] {
            store.add_ripple(t, Vec2::splat(0.5)).unwrap();
        }
        let times: Vec<f32> = store.iter().map(|r| r.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
        assert_eq!(store.iter().count(), 3);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = RippleStore::new(100, 30.0);
        for i in 0..150 {
            store.add_ripple(i as f32 * 0.01, Vec2::ZERO).unwrap();
        }
        assert_eq!(store.len(), 100);
        assert_eq!(store.iter().next().unwrap().time, 50.0 * 0.01);
    }

    #[test]
    fn test_age_out_horizon_is_exclusive() {
        let mut store = RippleStore::new(100, 30.0);
        store.add_ripple(0.0, Vec2::ZERO).unwrap();
        store.add_ripple(10.0, Vec2::ZERO).unwrap();

        store.age_out(30.0);
        assert_eq!(store.len(), 2);
        store.age_out(30.5);
        assert_eq!(store.len(), 1);
        store.age_out(100.0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_ripples_are_rejected() {
        let mut store = RippleStore::new(10, 30.0);
        assert!(store.add_ripple(f32::NAN, Vec2::ZERO).is_err());
        assert!(store.add_ripple(-2.0, Vec2::ZERO).is_err());
        assert!(store.add_ripple(1.0, Vec2::new(f32::INFINITY, 0.0)).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_uniform_slots_end_with_sentinel() {
        let mut store = RippleStore::new(100, 30.0);
        store.add_ripple(2.0, Vec2::new(0.25, 0.75)).unwrap();
        store.add_ripple(1.0, Vec2::new(0.5, 0.5)).unwrap();

        let mut slots = [[9.0; 4]; 8];
        assert_eq!(store.write_uniform_slots(&mut slots), 2);
        assert_eq!(slots[0], [0.5, 0.5, 1.0, 0.0]);
        assert_eq!(slots[1], [0.25, 0.75, 2.0, 0.0]);
        assert_eq!(slots[2][2], SENTINEL_TIME);
    }

    #[test]
    fn test_uniform_slots_keep_newest_when_short() {
        let mut store = RippleStore::new(100, 30.0);
        for t in 0..5 {
            store.add_ripple(t as f32, Vec2::ZERO).unwrap();
        }
        let mut slots = [[0.0; 4]; 3];
        assert_eq!(store.write_uniform_slots(&mut slots), 2);
        assert_eq!(slots[0][2], 3.0);
        assert_eq!(slots[1][2], 4.0);
        assert_eq!(slots[2][2], SENTINEL_TIME);
    }
}
