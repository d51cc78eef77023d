//! The rundata test suite.
//!
//! Test directories are stored in an arena: each gets a stable index when it
//! is first discovered. ATE and OTG variants of the same test are linked
//! through a secondary table keyed on their kind-agnostic [`PairKey`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, RundataError};
use crate::kind::{PairKey, ShapeError, TestKind, classify};
use crate::metadata::Rundata;
use crate::report::{Field, Finding, Key, Report};
use crate::testcase::{README_FILE, Testcase, Written};

/// Default location of the exclusion list, relative to the feature root's parent.
pub const NON_TEST_READMES: &str = "tools/non_test_readmes.txt";

static PACKAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^package (\w+)").unwrap());

/// READMEs that do not belong to a test.
#[derive(Debug, Default)]
pub struct Exclusions {
    paths: HashSet<PathBuf>,
}

impl Exclusions {
    /// Load the exclusion list at `list` (relative to `base` unless
    /// absolute). Each non-empty line is a README path relative to `base`.
    pub fn load(base: &Path, list: &Path) -> Result<Self> {
        let path = base.join(list);
        let text = std::fs::read_to_string(&path).map_err(|e| RundataError::io(&path, e))?;
        Ok(Self::from_lines(base, text.lines()))
    }

    pub fn from_lines<'a>(base: &Path, lines: impl IntoIterator<Item = &'a str>) -> Self {
        let paths = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| base.join(line))
            .collect();
        Self { paths }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Result of writing the suite.
#[derive(Debug)]
pub enum WriteOutcome {
    /// No testcase needed updating.
    Unchanged,
    /// These test directories were rewritten.
    Updated(Vec<PathBuf>),
    /// The first write failure; later testcases were not attempted.
    Failed(RundataError),
}

#[derive(Debug)]
struct Entry {
    dir: PathBuf,
    kind: TestKind,
    pair: Option<PairKey>,
    testcase: Testcase,
}

#[derive(Debug, Default)]
struct Pair {
    ate: Option<usize>,
    otg: Option<usize>,
}

/// All tests under a feature root.
#[derive(Debug, Default)]
pub struct TestSuite {
    base: PathBuf,
    entries: Vec<Entry>,
    by_dir: HashMap<PathBuf, usize>,
    pairs: HashMap<PairKey, Pair>,
}

impl TestSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn testcase(&self, dir: &Path) -> Option<&Testcase> {
        self.by_dir.get(dir).map(|&i| &self.entries[i].testcase)
    }

    pub fn kind(&self, dir: &Path) -> Option<TestKind> {
        self.by_dir.get(dir).map(|&i| self.entries[i].kind)
    }

    /// Scan `feature_dir` and (re)load every test found.
    ///
    /// Structural problems are collected in the returned report and do not
    /// stop the scan. A traversal failure is returned as an error.
    pub fn read(&mut self, feature_dir: &Path, exclusions: &Exclusions) -> Result<Report> {
        self.base = feature_dir.parent().unwrap_or(Path::new("")).to_path_buf();
        let mut report = Report::new();
        let mut testdirs: BTreeMap<PathBuf, TestKind> = BTreeMap::new();

        for entry in WalkDir::new(feature_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file()
                || !entry.file_name().to_string_lossy().ends_with(README_FILE)
            {
                continue;
            }
            let path = entry.path();
            if exclusions.contains(path) {
                debug!("Skipping non-test README {}", path.display());
                continue;
            }
            let Some(testdir) = path.parent() else {
                continue;
            };

            match classify(feature_dir, testdir) {
                Ok(kind) => {
                    testdirs.insert(testdir.to_path_buf(), kind);
                }
                Err(ShapeError::Depth) => report.push(Finding::BadPath {
                    path: self.rel(testdir),
                }),
                Err(ShapeError::Kind(_)) => report.push(Finding::BadPath {
                    path: self.rel(path),
                }),
            }
        }

        for (dir, kind) in testdirs {
            let rel = self.rel(&dir);
            let index = self.insert(dir, kind);
            let entry = &mut self.entries[index];

            if let Err(e) = entry.testcase.read(&entry.dir) {
                report.push(Finding::ReadFailed {
                    dir: rel,
                    error: e.to_string(),
                });
            } else if let Err(e) = check_package_names(&entry.dir) {
                report.push(Finding::PackageName {
                    dir: rel,
                    error: e.to_string(),
                });
            }
        }

        debug!("Read {} tests under {}", self.len(), feature_dir.display());
        Ok(report)
    }

    fn insert(&mut self, dir: PathBuf, kind: TestKind) -> usize {
        if let Some(&index) = self.by_dir.get(&dir) {
            return index;
        }

        let index = self.entries.len();
        let pair = kind.is_pairable().then(|| PairKey::of(&dir)).flatten();
        if let Some(key) = &pair {
            let slot = self.pairs.entry(key.clone()).or_default();
            match kind {
                TestKind::Ate => slot.ate = Some(index),
                TestKind::Otg => slot.otg = Some(index),
                _ => {}
            }
        }

        self.by_dir.insert(dir.clone(), index);
        self.entries.push(Entry {
            dir,
            kind,
            pair,
            testcase: Testcase::default(),
        });
        index
    }

    fn rel(&self, path: &Path) -> String {
        path.strip_prefix(&self.base)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// (ATE, OTG) index pairs where both variants exist, in ATE order.
    fn ate_otg_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .pairs
            .values()
            .filter_map(|p| Some((p.ate?, p.otg?)))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    fn is_pair(&self, a: usize, b: usize) -> bool {
        self.entries[a]
            .pair
            .as_ref()
            .and_then(|key| self.pairs.get(key))
            .is_some_and(|p| {
                (p.ate == Some(a) && p.otg == Some(b)) || (p.ate == Some(b) && p.otg == Some(a))
            })
    }

    /// Run every consistency pass. All passes run even when an earlier one fails.
    pub fn check(&self) -> Report {
        let mut report = Report::new();
        self.check_cases(&mut report);
        self.check_duplicate(Key::PlanId, &mut report, |tc| {
            tc.markdown.as_ref().map(|r| r.plan_id.as_str())
        });
        self.check_duplicate(Key::Uuid, &mut report, |tc| {
            tc.existing.as_ref().map(|r| r.uuid.as_str())
        });
        self.check_ate_otg(&mut report);
        report
    }

    fn check_cases(&self, report: &mut Report) {
        for entry in &self.entries {
            let errors = entry.testcase.check();
            if !errors.is_empty() {
                report.push(Finding::Testcase {
                    dir: self.rel(&entry.dir),
                    errors,
                });
            }
        }
    }

    /// Flag tests sharing a key, unless they are each other's ATE/OTG variant.
    fn check_duplicate<F>(&self, key: Key, report: &mut Report, keyfn: F)
    where
        F: Fn(&Testcase) -> Option<&str>,
    {
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (index, entry) in self.entries.iter().enumerate() {
            let value = keyfn(&entry.testcase).unwrap_or_default();
            if value.is_empty() {
                warn!(
                    "Skipping check for duplicate {} due to missing value: {}",
                    key,
                    self.rel(&entry.dir)
                );
                continue;
            }

            match seen.get(value) {
                None => {
                    seen.insert(value, index);
                }
                Some(&first) if !self.is_pair(first, index) => {
                    report.push(Finding::Duplicate {
                        key,
                        dir: self.rel(&entry.dir),
                        first: self.rel(&self.entries[first].dir),
                    });
                }
                Some(_) => {}
            }
        }
    }

    /// ATE and OTG variants of a test must carry identical rundata.
    fn check_ate_otg(&self, report: &mut Report) {
        let empty = Rundata::default();
        for (a, o) in self.ate_otg_pairs() {
            let ate = self.entries[a].testcase.existing.as_ref().unwrap_or(&empty);
            let otg = self.entries[o].testcase.existing.as_ref().unwrap_or(&empty);

            for (field, ate_value, otg_value) in [
                (Field::PlanId, &ate.plan_id, &otg.plan_id),
                (Field::Description, &ate.description, &otg.description),
                (Field::Uuid, &ate.uuid, &otg.uuid),
            ] {
                if ate_value != otg_value {
                    report.push(Finding::Mismatch {
                        field,
                        dir: self.rel(&self.entries[a].dir),
                        ate: ate_value.clone(),
                        otg: otg_value.clone(),
                    });
                }
            }
        }
    }

    /// Compute fixed rundata for every test.
    ///
    /// If any test cannot be fixed the OTG UUID alignment is skipped.
    pub fn fix(&mut self) -> Report {
        let mut report = Report::new();
        for index in 0..self.entries.len() {
            let entry = &mut self.entries[index];
            if let Err(e) = entry.testcase.fix(&entry.dir) {
                let dir = self.rel(&self.entries[index].dir);
                report.push(Finding::FixFailed {
                    dir,
                    error: e.to_string(),
                });
            }
        }
        if !report.is_ok() {
            return report;
        }

        for (a, o) in self.ate_otg_pairs() {
            let uuid = self.entries[a].testcase.fixed.as_ref().map(|r| r.uuid.clone());
            if let (Some(uuid), Some(otg)) = (uuid, self.entries[o].testcase.fixed.as_mut()) {
                otg.uuid = uuid;
            }
        }
        report
    }

    /// Write every test whose fixed rundata differs from disk.
    pub fn write(&mut self) -> WriteOutcome {
        let mut updated = Vec::new();

        for index in 0..self.entries.len() {
            let rel = self.rel(&self.entries[index].dir);
            let entry = &mut self.entries[index];
            match entry.testcase.write(&entry.dir) {
                Ok(Written::Unchanged) => {}
                Ok(Written::Updated) => {
                    info!("Updated {}", rel);
                    updated.push(entry.dir.clone());
                }
                Err(e) => return WriteOutcome::Failed(e),
            }
        }

        if updated.is_empty() {
            WriteOutcome::Unchanged
        } else {
            WriteOutcome::Updated(updated)
        }
    }
}

/// Every `*_test.go` file in `testdir` must declare a `..._test` package.
fn check_package_names(testdir: &Path) -> Result<()> {
    let entries = std::fs::read_dir(testdir).map_err(|e| RundataError::io(testdir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| RundataError::io(testdir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with("_test.go") && entry.path().is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    for file in files {
        let package = package_name(&file)?;
        if !package.ends_with("_test") {
            return Err(RundataError::Package { file, package });
        }
    }
    Ok(())
}

/// Package name from the first `package` clause, or empty if there is none.
fn package_name(file: &Path) -> Result<String> {
    let reader = BufReader::new(std::fs::File::open(file).map_err(|e| RundataError::io(file, e))?);
    for line in reader.lines() {
        let line = line.map_err(|e| RundataError::io(file, e))?;
        if let Some(caps) = PACKAGE.captures(&line) {
            return Ok(caps[1].to_string());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusions_from_lines() {
        let exclusions = Exclusions::from_lines(
            Path::new("/fp"),
            ["feature/README.md", "", "  feature/bgp/README.md  "],
        );
        assert_eq!(exclusions.len(), 2);
        assert!(exclusions.contains(Path::new("/fp/feature/bgp/README.md")));
        assert!(!exclusions.contains(Path::new("/fp/feature/bgp/tests/x/README.md")));
    }

    #[test]
    fn test_package_name() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("foo_test.go");
        std::fs::write(&file, "// Copyright\n\npackage foo_test\n\nimport \"testing\"\n").unwrap();
        assert_eq!(package_name(&file).unwrap(), "foo_test");

        std::fs::write(&file, "// no package clause\n").unwrap();
        assert_eq!(package_name(&file).unwrap(), "");
    }

    #[test]
    fn test_check_package_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("helper.go"), "package foo\n").unwrap();
        std::fs::write(dir.path().join("foo_test.go"), "package foo_test\n").unwrap();
        assert!(check_package_names(dir.path()).is_ok());

        std::fs::write(dir.path().join("bar_test.go"), "package foo\n").unwrap();
        assert!(matches!(
            check_package_names(dir.path()),
            Err(RundataError::Package { package, .. }) if package == "foo"
        ));
    }

    #[test]
    fn test_insert_links_pairs() {
        let mut suite = TestSuite::new();
        let ate = suite.insert(PathBuf::from("feature/a/b/ate_tests/x"), TestKind::Ate);
        let otg = suite.insert(PathBuf::from("feature/a/b/otg_tests/x"), TestKind::Otg);
        let kne = suite.insert(PathBuf::from("feature/a/b/kne_tests/x"), TestKind::Kne);

        assert_eq!(suite.insert(PathBuf::from("feature/a/b/ate_tests/x"), TestKind::Ate), ate);
        assert!(suite.is_pair(ate, otg));
        assert!(suite.is_pair(otg, ate));
        assert!(!suite.is_pair(ate, kne));
        assert_eq!(suite.ate_otg_pairs(), vec![(ate, otg)]);
    }
}
