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
//! Replication latency of individual data items.
//!
//! A data item is fully synced once every node of the group has stored it;
//! its sync duration is the span between the first store (generation) and
//! the store on the last remaining node.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::{records::StoreRecord, NodeId, SeqNum};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncDurationError {
    #[error(
        "data item {producer}-{seq} was stored by {stores} distinct nodes, \
         but the group only has {nodes}"
    )]
    TooManyStores {
        producer: NodeId,
        seq: SeqNum,
        stores: usize,
        nodes: usize,
    },
}

/// Sync durations in seconds, sorted ascending.
#[derive(Debug, Default, PartialEq)]
pub struct SyncDurations {
    pub complete: Vec<f64>,
    /// Items that never reached every node within the log.
    pub incomplete: usize,
}

struct ItemState {
    first_store: f64,
    storers: HashSet<NodeId>,
    completed: Option<f64>,
}

/// Compute the sync duration of every data item from unordered store events.
///
/// Repeated stores by the same node (e.g. after cache eviction) do not count
/// as new replicas. An item stored by more than `node_count` distinct nodes
/// means the log and the group size disagree, which is an error.
pub fn sync_durations(
    records: impl IntoIterator<Item = StoreRecord>,
    node_count: usize,
) -> Result<SyncDurations, SyncDurationError> {
    let mut items: HashMap<(NodeId, SeqNum), ItemState> = HashMap::new();

    for record in records
        .into_iter()
        .sorted_by(|a, b| a.time.total_cmp(&b.time))
    {
        let state = items
            .entry((record.producer, record.seq))
            .or_insert_with(|| ItemState {
                first_store: record.time,
                storers: HashSet::new(),
                completed: None,
            });
        if !state.storers.insert(record.node) {
            continue;
        }
        if state.storers.len() > node_count {
            return Err(SyncDurationError::TooManyStores {
                producer: record.producer,
                seq: record.seq,
                stores: state.storers.len(),
                nodes: node_count,
            });
        }
        if state.storers.len() == node_count {
            state.completed = Some(record.time - state.first_store);
        }
    }

    let mut durations = SyncDurations::default();
    for state in items.into_values() {
        match state.completed {
            Some(duration) => durations.complete.push(duration),
            None => durations.incomplete += 1,
        }
    }
    durations.complete.sort_by(f64::total_cmp);
    Ok(durations)
}
