//! # Path & URL
//!
//! Parsing and canonicalization for the `proto1://proto2://…::opt::final://path`
//! chain grammar used to address a filesystem and all the wrapper layers
//! stacked in front of it.
//!
//! ## Grammar
//!
//! ```text
//! url      := chain | plain
//! chain    := segment ("::" segment)+
//! segment  := plain | bare_path
//! plain    := protocol "://" path
//! protocol := [A-Za-z][A-Za-z0-9+.-]*
//! ```
//!
//! `::` chains wrappers outermost-first: `cache::zip://*.csv::s3://bkt/a.zip`
//! means "open `s3://bkt/a.zip`, wrap it in a zip-archive view, wrap that in
//! a cache". A bare path with no recognized scheme defaults to the local
//! filesystem.

use std::collections::HashMap;

use crate::{VfsError, VfsResult};

/// One link in a parsed protocol chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlChainLink {
    /// The protocol name (`"s3"`, `"cache"`, `"file"`, …).
    pub protocol: String,
    /// The path portion for this link (may itself be a nested URL for the
    /// innermost link, e.g. `zip://*.csv`).
    pub path: String,
}

/// A fully parsed chained URL: an outermost-first list of links plus the
/// resolved innermost target (the thing that actually holds bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    /// Outermost-first chain of wrapper/target links.
    pub chain: Vec<UrlChainLink>,
}

impl ParsedUrl {
    /// The innermost link — the concrete backend the chain bottoms out at.
    pub fn innermost(&self) -> &UrlChainLink {
        self.chain
            .last()
            .expect("ParsedUrl::chain is never constructed empty")
    }

    /// The outermost link — the first wrapper applied when resolving.
    pub fn outermost(&self) -> &UrlChainLink {
        &self.chain[0]
    }
}

/// Per-protocol keyword arguments threaded alongside a parsed chain.
///
/// When the same protocol name appears twice in a chain, positional order
/// in `for_protocol` disambiguates: the first `get` call returns the
/// kwargs meant for the first occurrence, the second call the second, etc.
#[derive(Debug, Clone, Default)]
pub struct ChainKwargs {
    by_protocol: HashMap<String, Vec<HashMap<String, String>>>,
    cursor: std::cell::RefCell<HashMap<String, usize>>,
}

impl ChainKwargs {
    /// Build from a mapping of protocol name to its ordered occurrences.
    pub fn new(by_protocol: HashMap<String, Vec<HashMap<String, String>>>) -> Self {
        Self {
            by_protocol,
            cursor: std::cell::RefCell::new(HashMap::new()),
        }
    }

    /// Fetch the next unconsumed kwargs map registered for `protocol`.
    pub fn for_protocol(&self, protocol: &str) -> HashMap<String, String> {
        let Some(occurrences) = self.by_protocol.get(protocol) else {
            return HashMap::new();
        };
        let mut cursor = self.cursor.borrow_mut();
        let idx = cursor.entry(protocol.to_string()).or_insert(0);
        let kwargs = occurrences.get(*idx).cloned().unwrap_or_default();
        *idx += 1;
        kwargs
    }
}

/// Split a chained URL into its `::`-separated segments, outermost-first.
///
/// `::` only splits at the top level: a segment's own path (e.g. a zip
/// member glob `*.csv`) never legitimately contains `::`, so a naive split
/// is sufficient — there is no nested-chain escaping in this grammar.
fn split_chain(url: &str) -> Vec<&str> {
    url.split("::").collect()
}

/// Parse a segment of the form `protocol://path` or a bare path.
fn parse_segment(segment: &str) -> UrlChainLink {
    match segment.split_once("://") {
        Some((protocol, path)) if is_valid_protocol(protocol) => UrlChainLink {
            protocol: protocol.to_lowercase(),
            path: path.to_string(),
        },
        // A bare wrapper name with no "://" and no path of its own, e.g.
        // the `cache` in `cache::zip://*.csv`.
        _ if is_valid_protocol(segment) => UrlChainLink {
            protocol: segment.to_lowercase(),
            path: String::new(),
        },
        _ => UrlChainLink {
            protocol: "file".to_string(),
            path: segment.to_string(),
        },
    }
}

fn is_valid_protocol(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '.' || c == '-')
}

/// Parse a (possibly chained) URL into an outermost-first [`ParsedUrl`].
pub fn parse_chain(url: &str) -> ParsedUrl {
    let chain = split_chain(url).into_iter().map(parse_segment).collect();
    ParsedUrl { chain }
}

/// Remove exactly one recognized scheme prefix from `path`, returning the
/// canonical in-filesystem path.
///
/// Idempotent: `strip_protocol(strip_protocol(p)) == strip_protocol(p)`,
/// since a path with its scheme already stripped has no `://` to find.
pub fn strip_protocol(path: &str, protocol: &str) -> String {
    let prefix = format!("{protocol}://");
    path.strip_prefix(&prefix).unwrap_or(path).to_string()
}

/// Inverse of [`strip_protocol`]: add exactly one scheme prefix.
pub fn unstrip_protocol(path: &str, protocol: &str) -> String {
    let prefix = format!("{protocol}://");
    if path.starts_with(&prefix) {
        path.to_string()
    } else {
        format!("{prefix}{path}")
    }
}

/// Normalize a path to the canonical form `spec.md` §3 describes: forward
/// slashes, no trailing slash (except the literal root `/`), no empty
/// segments, no `.`/`..` components.
///
/// A non-root path whose last component is empty (i.e. it ends in `/`,
/// naming a "file" with a trailing slash) is rejected — the Open Question
/// in `spec.md` §9 about trailing-slash-named files is resolved here by
/// disallowing such names outright.
pub fn normalize_path(path: &str) -> VfsResult<String> {
    let had_leading_slash = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    if out.is_empty() {
        return Ok(if had_leading_slash {
            "/".to_string()
        } else {
            String::new()
        });
    }
    if path.ends_with('/') {
        return Err(VfsError::InvalidPath {
            path: path.into(),
            reason: "trailing slash names are not permitted".to_string(),
        });
    }
    let joined = out.join("/");
    Ok(if had_leading_slash {
        format!("/{joined}")
    } else {
        joined
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_path_as_file_protocol() {
        let parsed = parse_chain("/tmp/data.csv");
        assert_eq!(parsed.chain.len(), 1);
        assert_eq!(parsed.chain[0].protocol, "file");
        assert_eq!(parsed.chain[0].path, "/tmp/data.csv");
    }

    #[test]
    fn parses_single_scheme() {
        let parsed = parse_chain("s3://bucket/key.txt");
        assert_eq!(parsed.chain[0].protocol, "s3");
        assert_eq!(parsed.chain[0].path, "bucket/key.txt");
    }

    #[test]
    fn parses_chain_outermost_first() {
        let parsed = parse_chain("cache::zip://*.csv::s3://bkt/a.zip");
        assert_eq!(parsed.chain.len(), 3);
        assert_eq!(parsed.chain[0].protocol, "cache");
        assert_eq!(parsed.chain[1].protocol, "zip");
        assert_eq!(parsed.chain[1].path, "*.csv");
        assert_eq!(parsed.chain[2].protocol, "s3");
        assert_eq!(parsed.chain[2].path, "bkt/a.zip");
        assert_eq!(parsed.innermost().protocol, "s3");
        assert_eq!(parsed.outermost().protocol, "cache");
    }

    #[test]
    fn strip_protocol_is_idempotent() {
        let once = strip_protocol("s3://bkt/key", "s3");
        let twice = strip_protocol(&once, "s3");
        assert_eq!(once, twice);
        assert_eq!(once, "bkt/key");
    }

    #[test]
    fn strip_then_unstrip_round_trips() {
        let p = "bkt/key";
        let wrapped = unstrip_protocol(p, "s3");
        assert_eq!(wrapped, "s3://bkt/key");
        assert_eq!(strip_protocol(&wrapped, "s3"), p);
    }

    #[test]
    fn unstrip_is_idempotent_on_already_prefixed() {
        let once = unstrip_protocol("bkt/key", "s3");
        let twice = unstrip_protocol(&once, "s3");
        assert_eq!(once, twice);
    }

    #[test]
    fn normalize_collapses_dot_and_dotdot() {
        assert_eq!(normalize_path("/a/./b/../c").unwrap(), "/a/c");
    }

    #[test]
    fn normalize_rejects_trailing_slash() {
        assert!(normalize_path("/a/b/").is_err());
    }

    #[test]
    fn normalize_root_stays_root() {
        assert_eq!(normalize_path("/").unwrap(), "/");
    }

    #[test]
    fn chain_kwargs_disambiguates_repeated_protocol() {
        let mut by_protocol = HashMap::new();
        by_protocol.insert(
            "s3".to_string(),
            vec![
                HashMap::from([("key".to_string(), "first".to_string())]),
                HashMap::from([("key".to_string(), "second".to_string())]),
            ],
        );
        let kwargs = ChainKwargs::new(by_protocol);
        assert_eq!(kwargs.for_protocol("s3").get("key").unwrap(), "first");
        assert_eq!(kwargs.for_protocol("s3").get("key").unwrap(), "second");
    }
}
