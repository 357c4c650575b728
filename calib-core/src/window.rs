use crate::{DedupPolicy, LidarPoint, PointStore};
use log::*;
use std::collections::HashMap;

/// Every decoded point grouped by its packet timestamp, without deduplication.
///
/// A capture covers many rotations, so the same `(azimuth bin, laser)` pair appears once per
/// rotation. Keeping the raw batches lets a later sweep be rebuilt for any timestamp, not
/// only for the last rotation.
#[derive(Debug, Clone, Default)]
pub struct TimestampIndex {
    batches: HashMap<u32, Vec<LidarPoint>>,
    order: Vec<u32>,
    len: usize,
}

impl TimestampIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends decoded points to the batch of their packet timestamp.
    pub fn ingest<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = LidarPoint>,
    {
        for point in points {
            let order = &mut self.order;
            self.batches
                .entry(point.timestamp)
                .or_insert_with(|| {
                    order.push(point.timestamp);
                    vec![]
                })
                .push(point);
            self.len += 1;
        }
    }

    /// The points decoded with the given packet timestamp, in arrival order.
    pub fn points(&self, timestamp: u32) -> &[LidarPoint] {
        self.batches
            .get(&timestamp)
            .map_or(&[][..], |batch| batch.as_slice())
    }

    /// The distinct packet timestamps in order of first appearance.
    pub fn timestamps(&self) -> &[u32] {
        &self.order
    }

    /// Total number of indexed points.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Extend<LidarPoint> for TimestampIndex {
    fn extend<I: IntoIterator<Item = LidarPoint>>(&mut self, points: I) {
        self.ingest(points);
    }
}

/// Accumulates the points of successive synchronization events into one deduplicated sweep.
///
/// Each call to [`SyncWindow::advance`] moves the points of one packet timestamp from the
/// index into a [`PointStore`]. The store keeps one point per `(azimuth bin, laser)` pair,
/// so after a full rotation the sweep holds the most recent return in every direction
/// (or the first one under [`DedupPolicy::KeepFirst`]).
#[derive(Debug, Clone)]
pub struct SyncWindow<'a> {
    index: &'a TimestampIndex,
    store: PointStore,
}

impl<'a> SyncWindow<'a> {
    pub fn new(index: &'a TimestampIndex, policy: DedupPolicy) -> Self {
        Self {
            index,
            store: PointStore::with_policy(policy),
        }
    }

    /// Ingests the points of one synchronization event.
    ///
    /// Returns the number of indexed points with that timestamp, which is zero when the
    /// timestamp never appeared in the captures.
    pub fn advance(&mut self, timestamp: u32) -> usize {
        let points = self.index.points(timestamp);
        if points.is_empty() {
            warn!("no lidar points decoded for timestamp {}", timestamp);
        } else {
            self.store.ingest(points.iter().copied());
        }
        points.len()
    }

    /// A snapshot of the accumulated sweep in insertion order.
    pub fn sweep(&self) -> Vec<LidarPoint> {
        self.store.iter().copied().collect()
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::collections::HashSet;

    fn point(azimuth_bin: u32, timestamp: u32) -> LidarPoint {
        LidarPoint {
            position: Point3::new(azimuth_bin as f64, 0.0, 1.0),
            range: 1.0,
            reflectivity: 40,
            azimuth: azimuth_bin as f64 * 100.0,
            azimuth_bin,
            laser: 0,
            timestamp,
            source: 0,
        }
    }

    /// Two rotations of four packets with three bins each, second rotation offset by 100.
    fn two_rotations() -> TimestampIndex {
        let mut index = TimestampIndex::new();
        for rotation in 0..2 {
            for packet in 0..4 {
                let timestamp = rotation * 100 + packet;
                index.ingest((0..3).map(|bin| point(packet * 3 + bin, timestamp)));
            }
        }
        index
    }

    #[test]
    fn index_keeps_every_rotation() {
        let index = two_rotations();
        assert_eq!(index.len(), 24);
        assert_eq!(index.timestamps(), &[0, 1, 2, 3, 100, 101, 102, 103]);
        assert_eq!(index.points(2).len(), 3);
        assert_eq!(index.points(102).len(), 3);
        assert!(index.points(50).is_empty());
    }

    #[test]
    fn first_rotation_timestamp_has_a_sweep() {
        let index = two_rotations();
        let mut window = SyncWindow::new(&index, DedupPolicy::KeepLatest);
        assert_eq!(window.advance(1), 3);
        let sweep = window.sweep();
        assert_eq!(sweep.len(), 3);
        assert!(sweep.iter().all(|p| p.timestamp == 1));
    }

    #[test]
    fn window_accumulates_one_point_per_key() {
        let index = two_rotations();
        let mut window = SyncWindow::new(&index, DedupPolicy::KeepLatest);
        for timestamp in [0, 1, 2, 3, 100, 101] {
            window.advance(timestamp);
        }
        let sweep = window.sweep();
        assert_eq!(sweep.len(), 12);
        let keys: HashSet<_> = sweep.iter().map(|p| p.key()).collect();
        assert_eq!(keys.len(), sweep.len());
        // Bins 0..6 were refreshed by the second rotation.
        for p in &sweep {
            let expected = if p.azimuth_bin < 6 { 100 } else { 0 };
            assert_eq!(p.timestamp / 100 * 100, expected);
        }
    }

    #[test]
    fn keep_first_window_ignores_later_rotations() {
        let index = two_rotations();
        let mut window = SyncWindow::new(&index, DedupPolicy::KeepFirst);
        for &timestamp in index.timestamps() {
            window.advance(timestamp);
        }
        assert_eq!(window.store().len(), 12);
        assert!(window.sweep().iter().all(|p| p.timestamp < 100));
    }

    #[test]
    fn unknown_timestamp_leaves_window_unchanged() {
        let index = two_rotations();
        let mut window = SyncWindow::new(&index, DedupPolicy::KeepLatest);
        window.advance(0);
        assert_eq!(window.advance(77), 0);
        assert_eq!(window.sweep().len(), 3);
    }
}
