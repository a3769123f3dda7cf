// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Persistent run state
//!
//! Run records and content fingerprints kept under the state directory.

mod hash;
mod history;

pub use hash::{fingerprint_dir, hash_file, list_files, ContentHasher};
pub use history::{RunHistory, RunRecord, StepRecord};
