// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Scraped data on disk
//!
//! API records are flattened into CSV snapshots named by run date.

mod records;
mod store;

pub use records::{cell, extract_records, Record, RecordTable};
pub use store::{read_rows, write_table, DataStore, PlayerKind, Row, Snapshot};
