use std::collections::VecDeque;
use std::collections::vec_deque;

use crate::state::TrajectoryPoint;

/// Capacity-bounded, temporally ordered trajectory with strict FIFO eviction.
///
/// Storage is reserved once at construction (`capacity + 1` slots to cover
/// the transient overflow inside `append`), so steady-state appends never
/// allocate.
#[derive(Clone, Debug)]
pub struct TrajectoryBuffer {
    points: VecDeque<TrajectoryPoint>,
    capacity: usize,
    appended: u64,
}

impl TrajectoryBuffer {
    /// Empty buffer. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity + 1),
            capacity,
            appended: 0,
        }
    }

    /// Buffer holding only `seed`.
    pub fn seeded(capacity: usize, seed: TrajectoryPoint) -> Self {
        let mut buf = Self::new(capacity);
        buf.append(seed);
        buf
    }

    /// Push to the back; once the length exceeds capacity, drop exactly one
    /// point from the front.
    pub fn append(&mut self, point: TrajectoryPoint) {
        self.points.push_back(point);
        self.appended += 1;
        if self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    /// Empty the buffer, then append `point`. Used on reset.
    pub fn clear_and_seed(&mut self, point: TrajectoryPoint) {
        self.points.clear();
        self.appended = 0;
        self.append(point);
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            points: &self.points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.points.len() == self.capacity
    }

    /// Appends since the buffer was created or last seeded, seed included.
    pub fn total_appended(&self) -> u64 {
        self.appended
    }
}

/// Read-only view of the buffer in temporal order (oldest first).
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    points: &'a VecDeque<TrajectoryPoint>,
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<TrajectoryPoint> {
        self.points.get(index).copied()
    }

    pub fn first(&self) -> Option<TrajectoryPoint> {
        self.points.front().copied()
    }

    pub fn last(&self) -> Option<TrajectoryPoint> {
        self.points.back().copied()
    }

    pub fn iter(&self) -> vec_deque::Iter<'a, TrajectoryPoint> {
        self.points.iter()
    }

    /// Consecutive `(index, previous, current)` triples for `index in 1..len`,
    /// the order a renderer draws connected segments in.
    pub fn pairs(self) -> impl Iterator<Item = (usize, TrajectoryPoint, TrajectoryPoint)> + 'a {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .enumerate()
            .map(|(i, (prev, curr))| (i + 1, *prev, *curr))
    }

    pub fn to_vec(&self) -> Vec<TrajectoryPoint> {
        self.points.iter().copied().collect()
    }
}

impl<'a> IntoIterator for Snapshot<'a> {
    type Item = &'a TrajectoryPoint;
    type IntoIter = vec_deque::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use proptest::prelude::*;

    fn pt(i: usize) -> TrajectoryPoint {
        State::new(i as f64, 0.0, 0.0)
    }

    #[test]
    fn test_append_below_capacity() {
        let mut buf = TrajectoryBuffer::new(4);
        for i in 0..3 {
            buf.append(pt(i));
        }
        assert_eq!(buf.len(), 3);
        assert!(!buf.is_full());
        assert_eq!(buf.snapshot().first(), Some(pt(0)));
        assert_eq!(buf.snapshot().last(), Some(pt(2)));
    }

    #[test]
    fn test_evicts_exactly_one_per_append() {
        let mut buf = TrajectoryBuffer::new(3);
        for i in 0..3 {
            buf.append(pt(i));
        }
        buf.append(pt(3));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.snapshot().to_vec(), vec![pt(1), pt(2), pt(3)]);
        buf.append(pt(4));
        assert_eq!(buf.snapshot().to_vec(), vec![pt(2), pt(3), pt(4)]);
    }

    #[test]
    fn test_clear_and_seed() {
        let mut buf = TrajectoryBuffer::new(3);
        for i in 0..10 {
            buf.append(pt(i));
        }
        buf.clear_and_seed(pt(42));
        assert_eq!(buf.snapshot().to_vec(), vec![pt(42)]);
        assert_eq!(buf.total_appended(), 1);
    }

    #[test]
    fn test_capacity_one() {
        let mut buf = TrajectoryBuffer::seeded(1, pt(0));
        buf.append(pt(1));
        assert_eq!(buf.snapshot().to_vec(), vec![pt(1)]);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let buf = TrajectoryBuffer::new(0);
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    fn test_pairs_walk_segments_in_order() {
        let mut buf = TrajectoryBuffer::new(10);
        for i in 0..4 {
            buf.append(pt(i));
        }
        let pairs: Vec<_> = buf.snapshot().pairs().collect();
        assert_eq!(
            pairs,
            vec![(1, pt(0), pt(1)), (2, pt(1), pt(2)), (3, pt(2), pt(3))]
        );
    }

    #[test]
    fn test_single_point_has_no_pairs() {
        let buf = TrajectoryBuffer::seeded(10, pt(0));
        assert_eq!(buf.snapshot().pairs().count(), 0);
    }

    #[test]
    fn test_steady_state_does_not_grow_storage() {
        let mut buf = TrajectoryBuffer::new(100);
        for i in 0..100 {
            buf.append(pt(i));
        }
        let reserved = buf.points.capacity();
        for i in 100..1_000 {
            buf.append(pt(i));
        }
        assert_eq!(buf.points.capacity(), reserved);
    }

    proptest! {
        #[test]
        fn prop_length_never_exceeds_capacity(capacity in 1usize..64, appends in 0usize..256) {
            let mut buf = TrajectoryBuffer::new(capacity);
            for i in 0..appends {
                buf.append(pt(i));
                prop_assert!(buf.len() <= capacity);
                if i + 1 >= capacity {
                    prop_assert_eq!(buf.len(), capacity);
                }
            }
        }

        #[test]
        fn prop_keeps_most_recent_in_order(capacity in 1usize..64, appends in 1usize..256) {
            let mut buf = TrajectoryBuffer::new(capacity);
            for i in 0..appends {
                buf.append(pt(i));
            }
            let start = appends.saturating_sub(capacity);
            let expected: Vec<_> = (start..appends).map(pt).collect();
            prop_assert_eq!(buf.snapshot().to_vec(), expected);
            // earliest survivor is the (total - capacity + 1)-th append
            prop_assert_eq!(buf.snapshot().first(), Some(pt(start)));
            prop_assert_eq!(buf.total_appended(), appends as u64);
        }
    }
}
