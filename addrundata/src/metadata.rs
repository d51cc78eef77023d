//! `metadata.textproto` reading and writing.
//!
//! Only the top-level scalar fields are interpreted. Anything else (nested
//! messages such as platform exceptions, unknown fields) is carried through
//! verbatim so a rewrite does not lose it.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, RundataError};

pub const METADATA_FILE: &str = "metadata.textproto";

/// Testbed assigned when none is set.
pub const DEFAULT_TESTBED: &str = "TESTBED_DUT_ATE_2LINKS";

const HEADER: &str = "# proto-file: github.com/openconfig/featureprofiles/proto/metadata.proto\n# proto-message: Metadata\n";

static FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z_]\w*)\s*:\s*(.*)$").unwrap());
static BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_]\w*\s*:?\s*[{<]").unwrap());

/// Rundata of one test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rundata {
    pub uuid: String,
    pub plan_id: String,
    pub description: String,
    pub testbed: String,
    /// Uninterpreted top-level lines, in file order.
    pub extra: Vec<String>,
}

impl Rundata {
    /// Parse textproto content. `path` is only used for error context.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let mut rundata = Rundata::default();
        let mut depth: i32 = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            let err = |message: String| RundataError::Metadata {
                path: path.to_path_buf(),
                line: index + 1,
                message,
            };

            if depth > 0 {
                depth += nesting(line);
                rundata.extra.push(raw.to_string());
                continue;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if BLOCK.is_match(line) {
                depth += nesting(line);
                rundata.extra.push(raw.to_string());
                continue;
            }

            let caps = FIELD
                .captures(line)
                .ok_or_else(|| err(format!("cannot parse '{}'", line)))?;
            let value = || scalar(&caps[2]).map_err(&err);
            match &caps[1] {
                "uuid" => rundata.uuid = value()?,
                "plan_id" => rundata.plan_id = value()?,
                "description" => rundata.description = value()?,
                "testbed" => rundata.testbed = value()?,
                _ => rundata.extra.push(raw.to_string()),
            }
        }

        if depth != 0 {
            return Err(RundataError::Metadata {
                path: path.to_path_buf(),
                line: text.lines().count(),
                message: "unbalanced braces".to_string(),
            });
        }
        Ok(rundata)
    }

    /// Read `metadata.textproto` from a test directory; `None` if absent.
    pub fn read(testdir: &Path) -> Result<Option<Self>> {
        let path = testdir.join(METADATA_FILE);
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&path, &text).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RundataError::io(&path, e)),
        }
    }

    /// Render as textproto with the standard header.
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        out.push('\n');
        out.push_str(&format!("uuid: {}\n", quote(&self.uuid)));
        out.push_str(&format!("plan_id: {}\n", quote(&self.plan_id)));
        out.push_str(&format!("description: {}\n", quote(&self.description)));
        if !self.testbed.is_empty() {
            out.push_str(&format!("testbed: {}\n", self.testbed));
        }
        for line in &self.extra {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn write(&self, testdir: &Path) -> Result<()> {
        let path = testdir.join(METADATA_FILE);
        std::fs::write(&path, self.render()).map_err(|e| RundataError::io(&path, e))
    }
}

fn nesting(line: &str) -> i32 {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in line.chars() {
        match (c, quote) {
            _ if escaped => escaped = false,
            ('\\', Some(_)) => escaped = true,
            (q, Some(open)) if q == open => quote = None,
            (_, Some(_)) => {}
            ('"' | '\'', None) => quote = Some(c),
            ('{' | '<', None) => depth += 1,
            ('}' | '>', None) => depth -= 1,
            ('#', None) => break,
            _ => {}
        }
    }
    depth
}

/// Decode a scalar field value: a quoted string (either quote style) or a
/// bare enum token.
fn scalar(value: &str) -> std::result::Result<String, String> {
    let value = value.trim();
    let Some((open, body)) = value
        .chars()
        .next()
        .filter(|c| matches!(c, '"' | '\''))
        .map(|c| (c, &value[1..]))
    else {
        let token = value.split('#').next().unwrap_or_default().trim();
        if token.is_empty() {
            return Err("missing value".to_string());
        }
        return Ok(token.to_string());
    };

    let mut out = String::new();
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            c if c == open => {
                let rest = chars.as_str().trim();
                if !rest.is_empty() && !rest.starts_with('#') {
                    return Err(format!("trailing characters '{}'", rest));
                }
                return Ok(out);
            }
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err("unterminated string".to_string())
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
