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
//! Utility module collection of functions

use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

/// Write `records` to `path` as headered CSV, replacing the file.
pub fn write_csv<R: Serialize>(path: impl AsRef<Path>, records: &[R]) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read all records from a headered CSV file.
pub fn read_csv<R: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<R>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().from_path(path.as_ref())?;
    reader.deserialize().collect()
}
