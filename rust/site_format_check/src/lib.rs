//! Format checks for static-site homework submissions.
//!
//! Each submission is a ZIP archive expected to hold an `index.html` and a
//! stylesheet. The checks produce plain issue strings; a submission passes
//! when no issue was raised.

pub mod archive;
pub mod balance;
pub mod batch;
pub mod error;
pub mod report;
pub mod structure;

pub use archive::{inspect_archive, inspect_archive_bytes, ArchiveInspection};
pub use balance::{check_tag_balance, BalanceChecker, TagEvent};
pub use batch::{check_submission, run_batch, BatchConfig, BatchSummary};
pub use error::CheckError;
pub use report::Report;
pub use structure::{check_basic_structure, has_css_link};

/// Assignment label written into reports when none is configured.
pub const DEFAULT_ASSIGNMENT: &str = "hw1";
