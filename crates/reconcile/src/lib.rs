pub mod matcher;
pub mod report;

pub use matcher::{
    compare, CompareError, MatchedPair, Mismatch, MismatchReason, ReconciliationResult,
};
pub use report::{generate, report_filename, ReportError};
