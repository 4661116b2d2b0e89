//! Parsers for the tool's line-oriented listing and size output

use strata_core::{path, Error, Result};

/// Parse one recursive-listing output line; `Ok(None)` for a directory
/// entry (directories are traversed, never reported).
///
/// Two line layouts are seen in the wild, one with owner/group columns and
/// one without (listings of an object store through the same CLI drop that
/// metadata):
///
/// ```text
/// -rw-r--r--   3 dave users       3276 2010-01-13 14:00 /foo/bar
/// -rwxrwxrwx   1          3276 010-01-13 14:00 /foo/bar
/// ```
///
/// The path starts right after the last token shaped like a clock time
/// (five characters, colon in the middle). A filename carrying its own
/// `hh:mm`-shaped token shifts the detected start; that is a known
/// limitation of the line format, not something this parser tries to
/// outguess.
pub fn parse_ls_line(line: &str, uri_prefix: &str) -> Result<Option<String>> {
    // split on single spaces; runs of spaces produce empty fields, and the
    // field index arithmetic below counts them
    let fields: Vec<&str> = line.split(' ').collect();

    if fields.first().is_some_and(|f| f.starts_with('d')) {
        return Ok(None);
    }

    let mut path_start = None;
    for (index, field) in fields.iter().enumerate() {
        if field.len() == 5 && field.as_bytes()[2] == b':' {
            path_start = Some(index + 1);
        }
    }
    let Some(path_start) = path_start else {
        return Err(Error::Parse {
            line: line.to_string(),
        });
    };

    // the path may itself contain spaces; rejoin everything after the
    // clock token
    let entry = fields[path_start..].join(" ");

    // newer tool versions already report fully qualified references
    if path::is_uri(&entry) {
        Ok(Some(entry))
    } else {
        Ok(Some(format!("{}{}", uri_prefix, entry)))
    }
}

/// Sum the byte counts of a disk-usage summary: one line per matched
/// top-level entry, second whitespace field is the count.
pub fn sum_dus(stdout: &str) -> Result<u64> {
    let mut total = 0u64;
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        let field = line
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| Error::Parse {
                line: line.to_string(),
            })?;
        total += field.parse::<u64>().map_err(|_| Error::Parse {
            line: line.to_string(),
        })?;
    }
    Ok(total)
}
