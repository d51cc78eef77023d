//! Findings collected while reading, checking and fixing a suite.

use std::fmt;

use tracing::error;

use crate::testcase::CaseError;

/// Which rundata key a duplicate was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    PlanId,
    Uuid,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::PlanId => f.write_str("test plan ID"),
            Key::Uuid => f.write_str("test UUID"),
        }
    }
}

/// A rundata field compared between ATE and OTG variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PlanId,
    Description,
    Uuid,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::PlanId => f.write_str("test plan IDs"),
            Field::Description => f.write_str("test descriptions"),
            Field::Uuid => f.write_str("UUIDs"),
        }
    }
}

/// One reported problem. Paths are relative to the feature root's parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    BadPath { path: String },
    ReadFailed { dir: String, error: String },
    PackageName { dir: String, error: String },
    Testcase { dir: String, errors: Vec<CaseError> },
    Duplicate { key: Key, dir: String, first: String },
    Mismatch { field: Field, dir: String, ate: String, otg: String },
    FixFailed { dir: String, error: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::BadPath { path } => write!(f, "Test found in a bad path: {}", path),
            Finding::ReadFailed { dir, error } => {
                write!(f, "Error reading testdir: {}: {}", dir, error)
            }
            Finding::PackageName { dir, error } => {
                write!(f, "Error checking test package name for dir: {}: {}", dir, error)
            }
            Finding::Testcase { dir, errors } => {
                write!(f, "Found {} errors in {}", errors.len(), dir)?;
                for err in errors {
                    write!(f, "\n  - {}", err)?;
                }
                Ok(())
            }
            Finding::Duplicate { key, dir, first } => {
                write!(f, "Duplicate {} found at {}, already used by {}", key, dir, first)
            }
            Finding::Mismatch {
                field,
                dir,
                ate,
                otg,
            } => write!(
                f,
                "ATE and OTG tests have different {}: {}\n  - ATE: {}\n  - OTG: {}",
                field, dir, ate, otg
            ),
            Finding::FixFailed { dir, error } => write!(f, "Could not fix {}: {}", dir, error),
        }
    }
}

/// Findings of one phase. Each finding is logged as it is recorded.
#[derive(Debug, Default)]
pub struct Report {
    findings: Vec<Finding>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        for line in finding.to_string().lines() {
            error!("{}", line);
        }
        self.findings.push(finding);
    }

    pub fn is_ok(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of ATE/OTG mismatches on `field`.
    pub fn mismatches(&self, field: Field) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::Mismatch { field: got, .. } if *got == field))
            .count()
    }

    /// Number of duplicates on `key`.
    pub fn duplicates(&self, key: Key) -> usize {
        self.findings
            .iter()
            .filter(|f| matches!(f, Finding::Duplicate { key: got, .. } if *got == key))
            .count()
    }
}
