//! Test directory kinds and path shape.
//!
//! A test lives at `feature/<area>[/<subfeature>]/<kind>/<name>`. ATE and OTG
//! variants of the same test share everything but the `<kind>` segment, so
//! they map to the same [`PairKey`].

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Kind of a test directory, named by its parent directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    Ate,
    Kne,
    Otg,
    Tests,
}

impl TestKind {
    pub const ALL: [TestKind; 4] = [TestKind::Ate, TestKind::Kne, TestKind::Otg, TestKind::Tests];

    pub fn dir_name(&self) -> &'static str {
        match self {
            TestKind::Ate => "ate_tests",
            TestKind::Kne => "kne_tests",
            TestKind::Otg => "otg_tests",
            TestKind::Tests => "tests",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TestKind::Ate => "ATE Test",
            TestKind::Kne => "KNE Test",
            TestKind::Otg => "OTG Test",
            TestKind::Tests => "Test",
        }
    }

    pub fn from_dir_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dir_name() == name)
    }

    /// Whether tests of this kind have a counterpart of the other
    /// traffic-generator kind.
    pub fn is_pairable(&self) -> bool {
        matches!(self, TestKind::Ate | TestKind::Otg)
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Why a directory holding a README is not a test directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// Not 3 or 4 segments below the feature root.
    Depth,
    /// The `<kind>` segment is not a known kind.
    Kind(String),
}

/// Check the shape of `testdir` below `feature_root` and return its kind.
pub fn classify(feature_root: &Path, testdir: &Path) -> Result<TestKind, ShapeError> {
    let rel = testdir.strip_prefix(feature_root).map_err(|_| ShapeError::Depth)?;
    let segments: Vec<&str> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    if !(3..=4).contains(&segments.len()) {
        return Err(ShapeError::Depth);
    }

    let kind = segments[segments.len() - 2];
    TestKind::from_dir_name(kind).ok_or_else(|| ShapeError::Kind(kind.to_string()))
}

/// Kind-agnostic identity of a test: the area path plus the test name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    area: PathBuf,
    name: String,
}

impl PairKey {
    /// Key for `testdir`; `None` when the path has no kind segment.
    pub fn of(testdir: &Path) -> Option<Self> {
        let name = testdir.file_name()?.to_str()?.to_string();
        let area = testdir.parent()?.parent()?.to_path_buf();
        Some(Self { area, name })
    }
}
