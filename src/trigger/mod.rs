// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 scrapeflow contributors

//! Run triggers
//!
//! A run is fired either by a cron schedule or by manual dispatch.

mod cron;

pub use cron::CronSchedule;

use serde::{Deserialize, Serialize};

/// What started a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Trigger {
    /// Dispatched by hand (`scrapeflow run`)
    Manual,
    /// Fired by a schedule entry
    Schedule { cron: String },
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Schedule { cron } => write!(f, "schedule ({})", cron),
        }
    }
}
