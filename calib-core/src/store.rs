use crate::{LidarPoint, PointKey};
use log::*;
use std::collections::HashMap;

/// Decides which point survives when two points share a [`PointKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// The most recently ingested point replaces the stored one.
    KeepLatest,
    /// The stored point is kept and later arrivals are dropped.
    KeepFirst,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self::KeepLatest
    }
}

/// An append-only collection of decoded points with at most one point per
/// `(azimuth bin, laser)` pair.
///
/// Points are kept in insertion order. When a point replaces another under
/// [`DedupPolicy::KeepLatest`], it takes the position of its own arrival, not the position of
/// the point it replaced. Queries are pure reads and can be repeated.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    policy: DedupPolicy,
    slots: Vec<Option<LidarPoint>>,
    index: HashMap<PointKey, usize>,
}

impl PointStore {
    /// Creates an empty store that keeps the latest point on key collisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given dedup policy.
    pub fn with_policy(policy: DedupPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// Inserts one point and applies the dedup policy.
    ///
    /// Returns the point that is no longer part of the store because of this insertion: the
    /// replaced point for [`DedupPolicy::KeepLatest`] or the rejected point for
    /// [`DedupPolicy::KeepFirst`].
    pub fn insert(&mut self, point: LidarPoint) -> Option<LidarPoint> {
        let key = point.key();
        match (self.index.get(&key).copied(), self.policy) {
            (None, _) => {
                self.index.insert(key, self.slots.len());
                self.slots.push(Some(point));
                None
            }
            (Some(_), DedupPolicy::KeepFirst) => Some(point),
            (Some(slot), DedupPolicy::KeepLatest) => {
                let replaced = self.slots[slot].take();
                self.index.insert(key, self.slots.len());
                self.slots.push(Some(point));
                if self.slots.len() > 2 * self.index.len() {
                    self.compact();
                }
                replaced
            }
        }
    }

    /// Appends a batch of points, applying the dedup policy to each in order.
    ///
    /// Returns the number of points that were displaced or rejected.
    pub fn ingest<I>(&mut self, points: I) -> usize
    where
        I: IntoIterator<Item = LidarPoint>,
    {
        let before = self.len();
        let mut arrived = 0;
        let mut displaced = 0;
        for point in points {
            arrived += 1;
            if self.insert(point).is_some() {
                displaced += 1;
            }
        }
        debug!(
            "ingested {} points ({} displaced), store grew from {} to {}",
            arrived,
            displaced,
            before,
            self.len()
        );
        displaced
    }

    /// All points with the given packet timestamp, optionally restricted to one azimuth bin.
    pub fn query(&self, timestamp: u32, azimuth_bin: Option<u32>) -> Vec<LidarPoint> {
        self.iter()
            .filter(|point| point.timestamp == timestamp)
            .filter(|point| azimuth_bin.map_or(true, |bin| point.azimuth_bin == bin))
            .copied()
            .collect()
    }

    /// Iterates over the stored points in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &LidarPoint> + '_ {
        self.slots.iter().flatten()
    }

    /// The distinct packet timestamps present in the store, in order of first appearance.
    pub fn timestamps(&self) -> Vec<u32> {
        let mut timestamps: Vec<u32> = vec![];
        for point in self.iter() {
            if !timestamps.contains(&point.timestamp) {
                timestamps.push(point.timestamp);
            }
        }
        timestamps
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Drops the holes left behind by replaced points.
    fn compact(&mut self) {
        trace!(
            "compacting point store from {} slots to {}",
            self.slots.len(),
            self.index.len()
        );
        self.slots.retain(Option::is_some);
        for (slot, point) in self.slots.iter().enumerate() {
            if let Some(point) = point {
                self.index.insert(point.key(), slot);
            }
        }
    }
}

impl Extend<LidarPoint> for PointStore {
    fn extend<I: IntoIterator<Item = LidarPoint>>(&mut self, points: I) {
        self.ingest(points);
    }
}
