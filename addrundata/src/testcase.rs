//! Rundata of a single test directory.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{Result, RundataError};
use crate::metadata::{DEFAULT_TESTBED, Rundata};

pub const README_FILE: &str = "README.md";

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(\S+?):\s+(.+?)\s*$").unwrap());

/// Plan ID and description from the first H1 of a README.
///
/// Returns `None` when the first H1 is not of the form
/// `# <PlanID>: <Description>`, or there is no H1 at all.
pub fn parse_markdown(text: &str) -> Option<Rundata> {
    let heading = text.lines().find(|line| line.starts_with("# "))?;
    let caps = HEADING.captures(heading)?;
    Some(Rundata {
        plan_id: caps[1].to_string(),
        description: caps[2].to_string(),
        ..Default::default()
    })
}

/// A problem with one testcase's rundata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaseError {
    #[error("README.md has no '# <PlanID>: <Description>' heading")]
    NoHeading,

    #[error("metadata.textproto is missing")]
    NoMetadata,

    #[error("plan_id {metadata:?} does not match README {markdown:?}")]
    PlanId { markdown: String, metadata: String },

    #[error("description {metadata:?} does not match README {markdown:?}")]
    Description { markdown: String, metadata: String },

    #[error("uuid is missing")]
    MissingUuid,

    #[error("uuid {0:?} is not a valid UUID")]
    BadUuid(String),

    #[error("testbed is missing")]
    MissingTestbed,
}

/// Outcome of writing one testcase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Written {
    Unchanged,
    Updated,
}

/// The three views of a test's rundata.
#[derive(Debug, Clone, Default)]
pub struct Testcase {
    /// From the README heading.
    pub markdown: Option<Rundata>,
    /// From `metadata.textproto` on disk.
    pub existing: Option<Rundata>,
    /// Corrected rundata, set by [`Testcase::fix`].
    pub fixed: Option<Rundata>,
}

impl Testcase {
    /// (Re)load README and metadata from `testdir`, discarding any fix.
    pub fn read(&mut self, testdir: &Path) -> Result<()> {
        let readme = testdir.join(README_FILE);
        let text = std::fs::read_to_string(&readme).map_err(|e| RundataError::io(&readme, e))?;

        self.markdown = parse_markdown(&text);
        self.existing = Rundata::read(testdir)?;
        self.fixed = None;
        Ok(())
    }

    /// Structural problems with the README and existing metadata.
    pub fn check(&self) -> Vec<CaseError> {
        let mut errs = Vec::new();

        let Some(existing) = &self.existing else {
            if self.markdown.is_none() {
                errs.push(CaseError::NoHeading);
            }
            errs.push(CaseError::NoMetadata);
            return errs;
        };

        match &self.markdown {
            None => errs.push(CaseError::NoHeading),
            Some(markdown) => {
                if markdown.plan_id != existing.plan_id {
                    errs.push(CaseError::PlanId {
                        markdown: markdown.plan_id.clone(),
                        metadata: existing.plan_id.clone(),
                    });
                }
                if markdown.description != existing.description {
                    errs.push(CaseError::Description {
                        markdown: markdown.description.clone(),
                        metadata: existing.description.clone(),
                    });
                }
            }
        }

        if existing.uuid.is_empty() {
            errs.push(CaseError::MissingUuid);
        } else if Uuid::parse_str(&existing.uuid).is_err() {
            errs.push(CaseError::BadUuid(existing.uuid.clone()));
        }

        if existing.testbed.is_empty() {
            errs.push(CaseError::MissingTestbed);
        }

        errs
    }

    /// Compute the corrected rundata.
    ///
    /// Plan ID and description always follow the README. A valid existing
    /// UUID is kept; otherwise a fresh one is assigned.
    pub fn fix(&mut self, testdir: &Path) -> Result<()> {
        let markdown = self
            .markdown
            .as_ref()
            .ok_or_else(|| RundataError::MissingHeading {
                path: testdir.join(README_FILE),
            })?;

        let mut fixed = self.existing.clone().unwrap_or_default();
        fixed.plan_id = markdown.plan_id.clone();
        fixed.description = markdown.description.clone();
        if Uuid::parse_str(&fixed.uuid).is_err() {
            fixed.uuid = Uuid::new_v4().to_string();
        }
        if fixed.testbed.is_empty() {
            fixed.testbed = DEFAULT_TESTBED.to_string();
        }

        self.fixed = Some(fixed);
        Ok(())
    }

    /// Persist the fixed rundata if it differs from what is on disk.
    pub fn write(&mut self, testdir: &Path) -> Result<Written> {
        let fixed = self.fixed.as_ref().ok_or(RundataError::NotFixed)?;
        if self.existing.as_ref() == Some(fixed) {
            return Ok(Written::Unchanged);
        }

        fixed.write(testdir)?;
        self.existing = Some(fixed.clone());
        Ok(Written::Updated)
    }
}
