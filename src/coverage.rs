// SYNCOV: Data-Availability Analysis of Ad-Hoc Sync Protocol Snapshot Logs
// Copyright (C) 2024-2025 Syncov developers
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Merging per-node receive windows into a global coverage view.

use std::{collections::BTreeMap, ops::RangeInclusive};

use crate::{NodeId, SeqNum};

/// Received sequence numbers of one producer, kept as disjoint inclusive
/// ranges. Overlapping and adjacent insertions coalesce.
#[derive(Debug)]
struct SeqRanges(range_set::RangeSet<[RangeInclusive<SeqNum>; 4]>);

impl Default for SeqRanges {
    fn default() -> Self {
        Self::new()
    }
}

impl SeqRanges {
    fn new() -> Self {
        Self(range_set::RangeSet::new())
    }

    fn insert_range(&mut self, range: RangeInclusive<SeqNum>) {
        let _ = self.0.insert_range(range);
    }

    fn contains(&self, seq: SeqNum) -> bool {
        self.0.contains(seq)
    }
}

/// Receive windows of a single observer at a single snapshot: for every
/// producer, the sequence ranges the observer claims to have received.
///
/// Ranges are inclusive on both ends and may overlap. They are coalesced
/// when merged into a [`MergedCoverage`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObservationSet {
    windows: BTreeMap<NodeId, Vec<RangeInclusive<SeqNum>>>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a received range for `producer`. The range must be well-formed
    /// (`start <= end`); reversed input lines are rejected by the log reader
    /// and never get this far.
    pub fn insert(&mut self, producer: NodeId, range: RangeInclusive<SeqNum>) {
        self.windows.entry(producer).or_default().push(range);
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn producers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.windows.keys().copied()
    }

    /// The raw (possibly overlapping) ranges recorded for `producer`.
    pub fn ranges(&self, producer: NodeId) -> &[RangeInclusive<SeqNum>] {
        self.windows
            .get(&producer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn iter(&self) -> impl Iterator<Item = (NodeId, &[RangeInclusive<SeqNum>])> {
        self.windows.iter().map(|(p, r)| (*p, r.as_slice()))
    }
}

/// Union of all observers' receive windows at one snapshot: the set of data
/// items received by at least one node, per producer.
#[derive(Debug, Default)]
pub struct MergedCoverage {
    covered: BTreeMap<NodeId, SeqRanges>,
}

impl MergedCoverage {
    /// Membership test: has any node received `(producer, seq)`?
    ///
    /// A producer without any observation has explicit zero coverage.
    pub fn covers(&self, producer: NodeId, seq: SeqNum) -> bool {
        self.covered
            .get(&producer)
            .map(|ranges| ranges.contains(seq))
            .unwrap_or(false)
    }

    pub fn producers(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.covered.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.covered.is_empty()
    }
}

/// Union all observers into a single coverage view.
///
/// Union is commutative and associative, so the order in which observers are
/// merged does not affect the result.
pub fn merge_observations<'a>(
    observers: impl IntoIterator<Item = &'a ObservationSet>,
) -> MergedCoverage {
    let mut covered: BTreeMap<NodeId, SeqRanges> = BTreeMap::new();
    for observer in observers {
        for (producer, ranges) in observer.iter() {
            let merged = covered.entry(producer).or_default();
            for range in ranges {
                merged.insert_range(range.clone());
            }
        }
    }
    MergedCoverage { covered }
}

#[cfg(test)]
mod test {
    use super::*;

    use itertools::Itertools;

    fn observer(ranges: &[(NodeId, RangeInclusive<SeqNum>)]) -> ObservationSet {
        let mut set = ObservationSet::new();
        for (producer, range) in ranges {
            set.insert(*producer, range.clone());
        }
        set
    }

    /// Membership of `merged` over a small universe, for comparisons.
    fn grid(merged: &MergedCoverage) -> Vec<(NodeId, SeqNum, bool)> {
        (0..4)
            .flat_map(|p| (0..12).map(move |s| (p, s, merged.covers(p, s))))
            .collect()
    }

    #[test]
    fn overlapping_and_adjacent_ranges_coalesce() {
        let a = observer(&[(1, 1..=3)]);
        let b = observer(&[(1, 3..=5)]);
        let merged = merge_observations([&a, &b]);

        assert!(!merged.covers(1, 0));
        for seq in 1..=5 {
            assert!(merged.covers(1, seq), "seq {seq} must be covered");
        }
        assert!(!merged.covers(1, 6));

        // adjacent without overlap
        let a = observer(&[(2, 1..=2)]);
        let b = observer(&[(2, 3..=5)]);
        let merged = merge_observations([&a, &b]);
        for seq in 1..=5 {
            assert!(merged.covers(2, seq), "seq {seq} must be covered");
        }
    }

    #[test]
    fn merge_is_order_independent() {
        let sets = vec![
            observer(&[(1, 1..=3), (2, 4..=8)]),
            observer(&[(1, 3..=5), (3, 1..=1)]),
            observer(&[(2, 1..=2), (1, 10..=10)]),
        ];
        let reference = grid(&merge_observations(&sets));

        for permutation in sets.iter().permutations(sets.len()) {
            assert_eq!(grid(&merge_observations(permutation)), reference);
        }
    }

    #[test]
    fn bigger_observer_yields_bigger_coverage() {
        let small = observer(&[(1, 1..=3)]);
        let mut big = small.clone();
        big.insert(1, 6..=8);
        big.insert(2, 1..=4);
        let other = observer(&[(1, 2..=4)]);

        let merged_small = merge_observations([&small, &other]);
        let merged_big = merge_observations([&big, &other]);

        for (producer, seq, covered) in grid(&merged_small) {
            if covered {
                assert!(merged_big.covers(producer, seq));
            }
        }
    }

    #[test]
    fn producers_are_listed_in_order() {
        let set = observer(&[(3, 1..=2), (1, 4..=6), (3, 8..=9)]);
        assert_eq!(set.producers().collect::<Vec<_>>(), vec![1, 3]);

        let other = observer(&[(2, 1..=1)]);
        let merged = merge_observations([&set, &other]);
        assert_eq!(merged.producers().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn no_observers_means_no_coverage() {
        let none: [&ObservationSet; 0] = [];
        let merged = merge_observations(none);
        assert!(merged.is_empty());
        assert!(!merged.covers(0, 1));

        let empty = ObservationSet::new();
        assert!(empty.is_empty());
        let merged = merge_observations([&empty]);
        assert!(!merged.covers(0, 1));
    }
}
