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
//! Reader for testbed snapshot logs.
//!
//! The log is a tagged-line text format, one record per line:
//!
//! ```text
//! prod <snapshot> <node> <c0>,<c1>,...,<cK>
//! recv <snapshot> <node> (1:1-5) (3:2) ...
//! ```
//!
//! A `prod` record is the reporting node's view of how many data items each
//! producer (indexed by position) has published as of the snapshot. A `recv`
//! record lists the reporting node's receive windows, one
//! `(producer:start-end)` or `(producer:seq)` token per contiguous range,
//! space- or comma-delimited. Blank lines and `#` comments are skipped.
//!
//! Malformed lines never abort parsing: each one is dropped as a whole,
//! logged, and reported through [`SnapshotLog::rejected`].

use std::{collections::BTreeMap, ops::RangeInclusive, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;

use crate::{coverage::ObservationSet, NodeId, SeqNum, SnapshotIdx};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown record tag `{0}`")]
    UnknownTag(String),
    #[error("missing `{0}` field")]
    MissingField(&'static str),
    #[error("invalid {field} `{value}`")]
    InvalidInt { field: &'static str, value: String },
    #[error("malformed receive window `{0}`")]
    MalformedWindow(String),
    #[error("reversed range {start}-{end} for producer {producer}")]
    ReversedRange {
        producer: NodeId,
        start: SeqNum,
        end: SeqNum,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum_macros::EnumString)]
enum RecordKind {
    #[strum(serialize = "prod")]
    Production,
    #[strum(serialize = "recv")]
    ReceiveWindow,
}

/// All records of one snapshot, merged over the per-node log blocks.
#[derive(Debug, Default)]
pub struct SnapshotRecord {
    /// Producer id to the number of items produced as of this snapshot.
    /// Counts are monotone, so reports from different nodes are merged by
    /// element-wise maximum.
    pub production: BTreeMap<NodeId, SeqNum>,
    /// Observer id to its receive windows. Nodes without a `recv` record
    /// have no entry and contribute empty coverage.
    pub observations: BTreeMap<NodeId, ObservationSet>,
}

/// A dropped line, with everything known about its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// 1-based line number in the input text.
    pub line: usize,
    pub snapshot: Option<SnapshotIdx>,
    pub observer: Option<NodeId>,
    pub error: ParseError,
}

/// A fully parsed snapshot log.
#[derive(Debug, Default)]
pub struct SnapshotLog {
    snapshots: BTreeMap<SnapshotIdx, SnapshotRecord>,
    rejected: Vec<Rejection>,
}

impl SnapshotLog {
    /// Iterate over all snapshots in index order.
    pub fn snapshots(&self) -> impl Iterator<Item = (SnapshotIdx, &SnapshotRecord)> {
        self.snapshots.iter().map(|(idx, record)| (*idx, record))
    }

    pub fn get(&self, snapshot: SnapshotIdx) -> Option<&SnapshotRecord> {
        self.snapshots.get(&snapshot)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Lines dropped during parsing. A non-empty list means the computed
    /// availability is only a lower bound on the logged one.
    pub fn rejected(&self) -> &[Rejection] {
        self.rejected.as_slice()
    }
}

lazy_static! {
    static ref WINDOW_RE: Regex = Regex::new(r"^\(([0-9]+):([0-9]+)-([0-9]+)\)$").unwrap();
    static ref SINGLE_RE: Regex = Regex::new(r"^\(([0-9]+):([0-9]+)\)$").unwrap();
}

enum Line {
    Production {
        snapshot: SnapshotIdx,
        node: NodeId,
        counts: Vec<(NodeId, SeqNum)>,
    },
    ReceiveWindow {
        snapshot: SnapshotIdx,
        node: NodeId,
        windows: Vec<(NodeId, RangeInclusive<SeqNum>)>,
    },
}

struct LineRejection {
    snapshot: Option<SnapshotIdx>,
    observer: Option<NodeId>,
    error: ParseError,
}

impl LineRejection {
    fn new(snapshot: Option<SnapshotIdx>, observer: Option<NodeId>, error: ParseError) -> Self {
        Self {
            snapshot,
            observer,
            error,
        }
    }
}

/// Parse a whole snapshot log.
///
/// Never fails wholesale: malformed lines are rejected individually (see
/// [`SnapshotLog::rejected`]) and the remaining input is still processed.
pub fn parse_snapshot_log(input: &str) -> SnapshotLog {
    let mut log = SnapshotLog::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok(Line::Production {
                snapshot,
                node,
                counts,
            }) => {
                log::trace!(
                    "snapshot {snapshot}: node {node} reports {} producers",
                    counts.len()
                );
                let record = log.snapshots.entry(snapshot).or_default();
                for (producer, count) in counts {
                    let entry = record.production.entry(producer).or_insert(0);
                    // the largest report wins: counts are monotone and the
                    // producer's own report is complete
                    *entry = (*entry).max(count);
                }
            }
            Ok(Line::ReceiveWindow {
                snapshot,
                node,
                windows,
            }) => {
                let record = log.snapshots.entry(snapshot).or_default();
                let observation = record.observations.entry(node).or_default();
                for (producer, range) in windows {
                    observation.insert(producer, range);
                }
            }
            Err(LineRejection {
                snapshot,
                observer,
                error,
            }) => {
                log::warn!("dropping malformed log line {}: {error}", idx + 1);
                log.rejected.push(Rejection {
                    line: idx + 1,
                    snapshot,
                    observer,
                    error,
                });
            }
        }
    }

    log
}

fn parse_line(line: &str) -> Result<Line, LineRejection> {
    let mut fields = line.split_whitespace();
    // `line` is trimmed and non-empty, so the tag field always exists
    let tag = fields.next().unwrap_or_default();
    let kind = match RecordKind::from_str(tag) {
        Ok(kind) => kind,
        Err(_) => {
            return Err(LineRejection::new(
                None,
                None,
                ParseError::UnknownTag(tag.to_string()),
            ))
        }
    };

    let snapshot = parse_int::<SnapshotIdx>("snapshot index", fields.next())
        .map_err(|e| LineRejection::new(None, None, e))?;
    let node = parse_int::<NodeId>("node id", fields.next())
        .map_err(|e| LineRejection::new(Some(snapshot), None, e))?;

    match kind {
        RecordKind::Production => {
            let raw = fields.next().ok_or_else(|| {
                LineRejection::new(
                    Some(snapshot),
                    Some(node),
                    ParseError::MissingField("production counts"),
                )
            })?;
            // tolerate one trailing comma, as emitted by the testbed
            let raw = raw.strip_suffix(',').unwrap_or(raw);
            let mut counts = Vec::new();
            for (producer, value) in raw.split(',').enumerate() {
                let count = value.parse::<SeqNum>().map_err(|_| {
                    LineRejection::new(
                        Some(snapshot),
                        Some(node),
                        ParseError::InvalidInt {
                            field: "production count",
                            value: value.to_string(),
                        },
                    )
                })?;
                counts.push((producer as NodeId, count));
            }
            Ok(Line::Production {
                snapshot,
                node,
                counts,
            })
        }
        RecordKind::ReceiveWindow => {
            let mut windows = Vec::new();
            for token in fields.flat_map(|f| f.split(',')).filter(|t| !t.is_empty()) {
                let window = parse_window(token)
                    .map_err(|e| LineRejection::new(Some(snapshot), Some(node), e))?;
                windows.push(window);
            }
            Ok(Line::ReceiveWindow {
                snapshot,
                node,
                windows,
            })
        }
    }
}

fn parse_int<T: FromStr>(field: &'static str, value: Option<&str>) -> Result<T, ParseError> {
    let value = value.ok_or(ParseError::MissingField(field))?;
    value.parse().map_err(|_| ParseError::InvalidInt {
        field,
        value: value.to_string(),
    })
}

fn parse_window(token: &str) -> Result<(NodeId, RangeInclusive<SeqNum>), ParseError> {
    if let Some(caps) = WINDOW_RE.captures(token) {
        let producer = parse_int("producer id", caps.get(1).map(|m| m.as_str()))?;
        let start = parse_int("range start", caps.get(2).map(|m| m.as_str()))?;
        let end = parse_int("range end", caps.get(3).map(|m| m.as_str()))?;
        if start > end {
            return Err(ParseError::ReversedRange {
                producer,
                start,
                end,
            });
        }
        Ok((producer, start..=end))
    } else if let Some(caps) = SINGLE_RE.captures(token) {
        let producer = parse_int("producer id", caps.get(1).map(|m| m.as_str()))?;
        let seq = parse_int("sequence number", caps.get(2).map(|m| m.as_str()))?;
        Ok((producer, seq..=seq))
    } else {
        Err(ParseError::MalformedWindow(token.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_production_and_receive_records() {
        let log = parse_snapshot_log(
            "prod 0 0 3,0,5\n\
             prod 0 1 2,1,5,\n\
             recv 0 0 (1:1-3) (2:5)\n\
             recv 0 0 (2:1-2)\n\
             recv 0 1 (0:1-3),(2:4-5)\n",
        );

        assert!(log.rejected().is_empty());
        assert_eq!(log.len(), 1);

        let record = log.get(0).unwrap();
        // element-wise maximum over both reports
        assert_eq!(
            record.production,
            BTreeMap::from([(0, 3), (1, 1), (2, 5)])
        );

        let windows = &record.observations[&0];
        assert_eq!(windows.ranges(1), &[1..=3]);
        // repeated lines for the same (node, snapshot) accumulate
        assert_eq!(windows.ranges(2), &[5..=5, 1..=2]);
        assert_eq!(log.get(0).unwrap().observations[&1].ranges(0), &[1..=3]);
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert!(parse_snapshot_log("").is_empty());
        assert!(parse_snapshot_log("# header\n\n   \n").is_empty());

        let log = parse_snapshot_log("# header\n\nprod 3 0 1\n   \n");
        assert!(!log.is_empty());
        assert!(log.rejected().is_empty());
        assert_eq!(log.get(3).unwrap().production, BTreeMap::from([(0, 1)]));
    }

    #[test]
    fn reversed_range_rejects_the_whole_line() {
        let log = parse_snapshot_log(
            "prod 0 1 0,5\n\
             recv 0 1 (1:1-2) (1:5-2)\n\
             recv 0 2 (1:1-3)\n",
        );

        assert_eq!(log.rejected().len(), 1);
        let rejection = &log.rejected()[0];
        assert_eq!(rejection.line, 2);
        assert_eq!(rejection.snapshot, Some(0));
        assert_eq!(rejection.observer, Some(1));
        assert_eq!(
            rejection.error,
            ParseError::ReversedRange {
                producer: 1,
                start: 5,
                end: 2
            }
        );

        // the faulty observer contributes nothing, not even its valid token
        let record = log.get(0).unwrap();
        assert!(!record.observations.contains_key(&1));
        // the other observer of the same snapshot is unaffected
        assert_eq!(record.observations[&2].ranges(1), &[1..=3]);
    }

    #[test]
    fn garbage_tokens_are_not_silently_ignored() {
        let log = parse_snapshot_log("recv 0 4 (1:x-2)\n");
        assert_eq!(log.rejected().len(), 1);
        assert_eq!(
            log.rejected()[0].error,
            ParseError::MalformedWindow("(1:x-2)".to_string())
        );
        assert_eq!(log.rejected()[0].observer, Some(4));
    }

    #[test]
    fn unknown_tags_and_bad_fields_are_rejected() {
        let log = parse_snapshot_log(
            "foo 0 1 (1:1-2)\n\
             prod 0 nine 1,2\n\
             prod 1 0 1,two\n\
             prod 1 0\n\
             recv 2 0\n",
        );

        let errors: Vec<_> = log.rejected().iter().map(|r| &r.error).collect();
        assert_eq!(
            errors,
            vec![
                &ParseError::UnknownTag("foo".to_string()),
                &ParseError::InvalidInt {
                    field: "node id",
                    value: "nine".to_string()
                },
                &ParseError::InvalidInt {
                    field: "production count",
                    value: "two".to_string()
                },
                &ParseError::MissingField("production counts"),
            ]
        );
        // an empty receive record is valid: the node has observed nothing
        assert!(log.get(2).unwrap().observations[&0].is_empty());
        // rejection context stops at the last successfully parsed field
        assert_eq!(log.rejected()[1].snapshot, Some(0));
        assert_eq!(log.rejected()[1].observer, None);
    }
}
