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
//! Per-snapshot data availability computed from merged coverage.

use std::collections::BTreeMap;

use crate::{
    coverage::{merge_observations, MergedCoverage},
    snapshot_log::SnapshotLog,
    NodeId, SeqNum, SnapshotIdx,
};

/// Availability of a single snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvailabilityPoint {
    pub snapshot: SnapshotIdx,
    /// Fraction of produced data items received by at least one node, in
    /// `[0, 1]`. NaN when nothing was produced yet.
    pub availability: f64,
    pub produced: u64,
    pub observed: u64,
}

/// Count produced and observed data items: every `(producer, seq)` with
/// `1 <= seq <= count` is produced, and observed iff the merged coverage
/// contains it. Producers with a count of zero contribute nothing.
fn coverage_counts(
    production: &BTreeMap<NodeId, SeqNum>,
    merged: &MergedCoverage,
) -> (u64, u64) {
    let mut observed = 0;
    let mut produced = 0;
    for (producer, count) in production {
        for seq in 1..=*count {
            produced += 1;
            if merged.covers(*producer, seq) {
                observed += 1;
            }
        }
    }
    (observed, produced)
}

fn ratio(observed: u64, produced: u64) -> f64 {
    if produced == 0 {
        // nothing produced: the ratio is undefined, not an error
        f64::NAN
    } else {
        observed as f64 / produced as f64
    }
}

/// Fraction of produced data items covered by `merged`.
///
/// Returns NaN when no data was produced yet; callers aggregating several
/// snapshots must skip undefined values (see [`crate::stats::nan_mean`]).
pub fn compute_availability(
    production: &BTreeMap<NodeId, SeqNum>,
    merged: &MergedCoverage,
) -> f64 {
    let (observed, produced) = coverage_counts(production, merged);
    ratio(observed, produced)
}

/// Merge every snapshot of `log` and compute its availability.
///
/// Nodes without a receive record at a snapshot contribute empty coverage.
pub fn availability_trace(log: &SnapshotLog) -> Vec<AvailabilityPoint> {
    log.snapshots()
        .map(|(snapshot, record)| {
            let merged = merge_observations(record.observations.values());
            let (observed, produced) = coverage_counts(&record.production, &merged);
            AvailabilityPoint {
                snapshot,
                availability: ratio(observed, produced),
                produced,
                observed,
            }
        })
        .collect()
}

/// A data item that was covered at an earlier snapshot but no longer at
/// `snapshot`. Well-formed logs never produce these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageRegression {
    pub snapshot: SnapshotIdx,
    pub producer: NodeId,
    pub seq: SeqNum,
}

/// Validate that merged coverage only grows from one snapshot to the next,
/// checked over the data items produced as of the earlier snapshot.
pub fn coverage_regressions(log: &SnapshotLog) -> Vec<CoverageRegression> {
    let mut regressions = Vec::new();
    let mut previous: Option<(MergedCoverage, BTreeMap<NodeId, SeqNum>)> = None;

    for (snapshot, record) in log.snapshots() {
        let merged = merge_observations(record.observations.values());
        if let Some((prev_merged, prev_production)) = &previous {
            for (producer, count) in prev_production {
                for seq in 1..=*count {
                    if prev_merged.covers(*producer, seq) && !merged.covers(*producer, seq) {
                        regressions.push(CoverageRegression {
                            snapshot,
                            producer: *producer,
                            seq,
                        });
                    }
                }
            }
        }
        previous = Some((merged, record.production.clone()));
    }

    regressions
}
