//! Relative path construction with escaped segments.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::Error;

/// Everything except RFC 3986 unreserved characters is escaped, `/` included,
/// so an argument always stays a single segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Expands `{}` placeholders in `template` with escaped path segments.
///
/// ```
/// let path = github_api::expand_path("repos/{}/{}/issues", &["octo", "hello world"]).unwrap();
/// assert_eq!(path, "repos/octo/hello%20world/issues");
/// ```
pub fn expand_path(template: &str, args: &[&str]) -> Result<String, Error> {
    let placeholders = template.matches("{}").count();
    if placeholders != args.len() {
        return Err(Error::InvalidPathSegment {
            segment: template.to_string(),
            reason: "placeholder count does not match argument count",
        });
    }

    let mut out = String::with_capacity(template.len() + args.iter().map(|a| a.len()).sum::<usize>());
    let mut pieces = template.split("{}");
    if let Some(head) = pieces.next() {
        out.push_str(head);
    }
    for (piece, arg) in pieces.zip(args) {
        out.push_str(&escape_segment(arg)?);
        out.push_str(piece);
    }
    Ok(out)
}

/// Percent-encodes a single path segment, rejecting values that cannot be one.
pub fn escape_segment(segment: &str) -> Result<String, Error> {
    let reason = if segment.is_empty() {
        Some("segment is empty")
    } else if segment == "." || segment == ".." {
        Some("segment is a relative path component")
    } else if segment.chars().any(|c| c.is_control()) {
        Some("segment contains control characters")
    } else {
        None
    };
    if let Some(reason) = reason {
        return Err(Error::InvalidPathSegment {
            segment: segment.to_string(),
            reason,
        });
    }
    Ok(utf8_percent_encode(segment, SEGMENT).to_string())
}
