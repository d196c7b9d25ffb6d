//! # cxms-report-core
//!
//! Core library for cxms-report, the opt-in telemetry reporter for CxMS
//! projects (a `CLAUDE.md` manifest plus `<Project>_*.md` companion files).
//!
//! This library provides:
//! - Artifact discovery and per-artifact metric extraction
//! - The anonymous per-project identity and submission counter
//! - The metrics record, its preview and its HTTP submission
//! - The interactive run workflow
//! - Configuration management and logging infrastructure
//!
//! ## Architecture
//!
//! A run is a straight pipeline:
//! - **Locate:** [`artifacts::locate`] maps directory entries to artifact kinds
//! - **Extract:** [`extract`] turns each artifact into a small fragment
//! - **Aggregate:** [`aggregate::Aggregator`] joins fragments, file stats,
//!   identity and host info into one [`MetricsRecord`]
//! - **Report:** [`workflow::Workflow`] asks, previews, and submits
//!
//! ## Example
//!
//! ```rust,no_run
//! use cxms_report_core::prompt::Terminal;
//! use cxms_report_core::submit::SyncSubmitter;
//! use cxms_report_core::workflow::{RunOptions, Workflow};
//! use cxms_report_core::Config;
//!
//! let config = Config::load().expect("failed to load config");
//! let mut submitter = SyncSubmitter::new(&config.endpoint).expect("invalid endpoint");
//! let options = RunOptions { dry_run: true, ..RunOptions::default() };
//!
//! let outcome = Workflow::new(std::path::Path::new("."), options)
//!     .run(&mut Terminal::stdio(), &mut submitter)
//!     .expect("run failed");
//! println!("{:?}", outcome);
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use workflow::{Outcome, RunOptions, Workflow};

// Public modules
pub mod aggregate;
pub mod artifacts;
pub mod config;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod identity;
pub mod logging;
pub mod preview;
pub mod prompt;
pub mod submit;
pub mod types;
pub mod workflow;
