//! Rundata maintenance for featureprofiles tests
//!
//! Scans a `feature` tree for test directories, reads each test's README
//! heading and `metadata.textproto`, checks the suite for missing, stale or
//! duplicated rundata, and optionally rewrites the metadata files.

pub mod error;
pub mod kind;
pub mod metadata;
pub mod report;
pub mod suite;
pub mod testcase;

pub use error::{Result, RundataError};
pub use kind::{PairKey, TestKind};
pub use metadata::Rundata;
pub use report::{Field, Finding, Key, Report};
pub use suite::{Exclusions, NON_TEST_READMES, TestSuite, WriteOutcome};
pub use testcase::{CaseError, Testcase, Written};
