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
//! Library for computing global data availability from per-node snapshot
//! logs of an ad-hoc wireless sync-protocol testbed.

/// Identifier of a node in the simulated group. Producers and observers share
/// the same id space.
pub type NodeId = u64;
/// Sequence number of a data item, 1-based per producer.
pub type SeqNum = u64;
/// Index of a snapshot in simulated time.
pub type SnapshotIdx = usize;

pub mod availability;
pub mod coverage;
pub mod records;
pub mod snapshot_log;
pub mod stats;
pub mod sync_duration;
pub mod util;

pub mod prelude {
    pub use super::{
        availability::{availability_trace, compute_availability, AvailabilityPoint},
        coverage::{merge_observations, MergedCoverage, ObservationSet},
        snapshot_log::{parse_snapshot_log, ParseError, SnapshotLog},
        NodeId, SeqNum, SnapshotIdx,
    };
}
