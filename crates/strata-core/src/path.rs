//! Syntactic path classification
//!
//! Decides whether a path string is a scheme-qualified reference
//! (`scheme://host/path`) or a plain local path. Classification never touches
//! the filesystem or the network; the same input always decomposes the same
//! way.

/// A path string decomposed into routing components
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRef {
    /// Bare local path (relative or absolute), kept verbatim
    Local(String),
    /// Scheme-qualified remote reference
    Remote {
        /// Lowercased scheme, e.g. `hdfs` or `s3n`
        scheme: String,
        /// Authority component; may be empty (`hdfs:///tmp`)
        host: String,
        /// Path component including its leading slash; may be empty
        path: String,
    },
}

/// Whether `path` is a scheme-qualified remote reference
pub fn is_uri(path: &str) -> bool {
    matches!(parse(path), PathRef::Remote { .. })
}

/// Decompose `path`. Total over any input; never fails.
pub fn parse(path: &str) -> PathRef {
    let Some((scheme, rest)) = path.split_once("://") else {
        return PathRef::Local(path.to_string());
    };
    if !looks_like_scheme(scheme) {
        return PathRef::Local(path.to_string());
    }
    let (host, tail) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };
    PathRef::Remote {
        scheme: scheme.to_ascii_lowercase(),
        host: host.to_string(),
        path: tail.to_string(),
    }
}

/// The `scheme://host` portion of a remote reference, used to re-qualify
/// relative entries in backend listings. Empty string for local paths.
pub fn uri_prefix(path: &str) -> String {
    match parse(path) {
        PathRef::Remote { scheme, host, .. } => format!("{}://{}", scheme, host),
        PathRef::Local(_) => String::new(),
    }
}

/// Join a name onto a directory, forward-slash style. An absolute or
/// scheme-qualified `name` replaces `dir` outright.
pub fn join(dir: &str, name: &str) -> String {
    if name.starts_with('/') || is_uri(name) {
        return name.to_string();
    }
    if dir.is_empty() {
        return name.to_string();
    }
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

// A single letter before "://" reads as a drive letter rather than a scheme;
// anything that is not alphanumeric/+/-/. cannot start a scheme at all.
fn looks_like_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    scheme.len() >= 2
        && first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
