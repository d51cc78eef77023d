//! Conversion between XPath-like strings and gNMI paths.

use std::collections::HashMap;

use crate::error::{GnmiError, Result};
use crate::gnmi::{Path, PathElem};

/// Parse an XPath-like path into a gNMI [`Path`].
///
/// Key values may contain `/` (e.g. `interface[name=Ethernet1/1]`), so the
/// path is split only on separators outside brackets.
pub fn parse_path(path_str: &str) -> Result<Path> {
    let mut elems = Vec::new();

    for segment in split_segments(path_str)? {
        let (name, key) = parse_path_segment(segment)?;
        elems.push(PathElem { name, key });
    }

    Ok(Path {
        elem: elems,
        ..Default::default()
    })
}

fn split_segments(path_str: &str) -> Result<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, c) in path_str.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| GnmiError::Path(format!("unbalanced ']' in {}", path_str)))?;
            }
            '/' if depth == 0 => {
                if i > start {
                    segments.push(&path_str[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(GnmiError::Path(format!("unbalanced '[' in {}", path_str)));
    }
    if start < path_str.len() {
        segments.push(&path_str[start..]);
    }

    Ok(segments)
}

/// Parse `interface[name=eth0]` into `("interface", {"name": "eth0"})`.
///
/// Multiple keys are written as consecutive brackets: `a[k1=v1][k2=v2]`.
pub fn parse_path_segment(segment: &str) -> Result<(String, HashMap<String, String>)> {
    let Some(bracket_pos) = segment.find('[') else {
        return Ok((segment.to_string(), HashMap::new()));
    };

    let name = segment[..bracket_pos].to_string();
    let mut keys = HashMap::new();
    let mut rest = &segment[bracket_pos..];

    while let Some(stripped) = rest.strip_prefix('[') {
        let end = stripped
            .find(']')
            .ok_or_else(|| GnmiError::Path(format!("unterminated key in {}", segment)))?;
        let (k, v) = stripped[..end]
            .split_once('=')
            .ok_or_else(|| GnmiError::Path(format!("key without value in {}", segment)))?;
        keys.insert(k.trim().to_string(), v.trim().to_string());
        rest = &stripped[end + 1..];
    }

    if !rest.is_empty() {
        return Err(GnmiError::Path(format!(
            "trailing characters after keys in {}",
            segment
        )));
    }

    Ok((name, keys))
}

/// Render a gNMI [`Path`] back to its XPath-like form, with a leading `/`.
///
/// Keys are sorted so the output is stable.
pub fn path_to_string(path: &Path) -> String {
    let elems: Vec<String> = path
        .elem
        .iter()
        .map(|elem| {
            let mut keys: Vec<(&String, &String)> = elem.key.iter().collect();
            keys.sort();
            let keys: String = keys
                .into_iter()
                .map(|(k, v)| format!("[{}={}]", k, v))
                .collect();
            format!("{}{}", elem.name, keys)
        })
        .collect();

    format!("/{}", elems.join("/"))
}

/// Join a notification prefix and an update path.
pub fn join_paths(prefix: Option<&Path>, path: &Path) -> Path {
    let mut elem = prefix.map(|p| p.elem.clone()).unwrap_or_default();
    elem.extend(path.elem.iter().cloned());
    Path {
        elem,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_simple() {
        let path = parse_path("/interfaces/interface/state").unwrap();
        assert_eq!(path.elem.len(), 3);
        assert_eq!(path.elem[0].name, "interfaces");
        assert_eq!(path.elem[1].name, "interface");
        assert_eq!(path.elem[2].name, "state");
    }

    #[test]
    fn test_parse_path_with_slash_in_key() {
        let path = parse_path("/interfaces/interface[name=Ethernet1/1]/state/oper-status").unwrap();
        assert_eq!(path.elem.len(), 4);
        assert_eq!(path.elem[1].name, "interface");
        assert_eq!(
            path.elem[1].key.get("name"),
            Some(&"Ethernet1/1".to_string())
        );
        assert_eq!(path.elem[3].name, "oper-status");
    }

    #[test]
    fn test_parse_path_segment() {
        let (name, keys) = parse_path_segment("interface[name=eth0]").unwrap();
        assert_eq!(name, "interface");
        assert_eq!(keys.get("name"), Some(&"eth0".to_string()));

        let (name, keys) = parse_path_segment("channel[index=0][lane=1]").unwrap();
        assert_eq!(name, "channel");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.get("lane"), Some(&"1".to_string()));

        let (name, keys) = parse_path_segment("state").unwrap();
        assert_eq!(name, "state");
        assert!(keys.is_empty());
    }

    #[test]
    fn test_parse_path_rejects_unbalanced() {
        assert!(parse_path("/interfaces/interface[name=eth0/state").is_err());
        assert!(parse_path("/interfaces/interface]name=eth0/state").is_err());
        assert!(parse_path_segment("interface[name]").is_err());
    }

    #[test]
    fn test_path_round_trip() {
        let text = "/components/component[name=Transceiver1]/state/serial-no";
        assert_eq!(path_to_string(&parse_path(text).unwrap()), text);
    }

    #[test]
    fn test_join_paths() {
        let prefix = parse_path("/interfaces/interface[name=eth0]").unwrap();
        let leaf = parse_path("state/oper-status").unwrap();
        let joined = join_paths(Some(&prefix), &leaf);
        assert_eq!(
            path_to_string(&joined),
            "/interfaces/interface[name=eth0]/state/oper-status"
        );
        assert_eq!(path_to_string(&join_paths(None, &leaf)), "/state/oper-status");
    }
}
