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
//! Record data types to (de-)serialize analysis inputs and results to CSV.

use serde::{Deserialize, Serialize};

use crate::{availability::AvailabilityPoint, NodeId, SeqNum, SnapshotIdx};

/// Per-snapshot data availability, as exported to CSV.
///
/// An undefined ratio (nothing produced yet) maps to an empty field rather
/// than `NaN`, so the record round-trips through `csv::invalid_option` and
/// plots cleanly downstream.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AvailabilityRecord {
    pub snapshot: SnapshotIdx,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub availability: Option<f64>,
    pub produced: u64,
    pub observed: u64,
}

impl From<AvailabilityPoint> for AvailabilityRecord {
    fn from(point: AvailabilityPoint) -> Self {
        Self {
            snapshot: point.snapshot,
            availability: (!point.availability.is_nan()).then_some(point.availability),
            produced: point.produced,
            observed: point.observed,
        }
    }
}

/// One node storing one data item, as logged by the testbed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct StoreRecord {
    /// Timestamp in seconds.
    pub time: f64,
    /// The node that stored the item.
    pub node: NodeId,
    /// The producer that originated the item.
    pub producer: NodeId,
    pub seq: SeqNum,
}
