//! Git history extraction via git2.
//!
//! Walks commit history newest-first, diffing each commit against its first
//! parent, and produces the transaction list (files changed together per
//! commit) plus the run-scoped file-id map consumed by the mining pipeline.
//! Renames are tracked so one id follows a file across its old names.

pub mod mining;

pub use mining::{GitHistory, HistoryOptions};
