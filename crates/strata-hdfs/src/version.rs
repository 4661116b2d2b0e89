//! Tool version probing and comparison
//!
//! Several command flags changed across major versions of the DFS client;
//! the adapter probes `version` once and gates those flags on the result.

use std::sync::LazyLock;

use regex::Regex;

/// Assumed when the `version` subcommand's output cannot be parsed;
/// downstream flag selection still needs some deterministic answer.
pub const FALLBACK_VERSION: &str = "0.20.203";

// first run of digits and dots in "Hadoop 0.20.203" etc.
static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d.]+").unwrap());

/// Pull the version token out of the `version` subcommand's stdout
pub fn extract_version(stdout: &str) -> Option<String> {
    let first_line = stdout.lines().next()?;
    VERSION_TOKEN
        .find(first_line)
        .map(|m| m.as_str().to_string())
}

/// Componentwise dotted-version comparison; missing components count as
/// zero, non-numeric components too.
pub fn version_gte(version: &str, threshold: &str) -> bool {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|c| c.parse::<u64>().unwrap_or(0))
            .collect()
    };
    let a = parse(version);
    let b = parse(threshold);
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        if x != y {
            return x > y;
        }
    }
    true
}
