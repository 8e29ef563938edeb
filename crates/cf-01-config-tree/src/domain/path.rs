//! Path grammar helpers.

use super::key::same_key;
use shared_types::TreeError;

/// Separator between path segments.
pub const GROUP_SEPARATOR: char = '/';

/// Segment that moves to the parent group.
pub const PARENT_GROUP: &str = "..";

/// Non-empty segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(GROUP_SEPARATOR).filter(|s| !s.is_empty())
}

/// Split a path into `(group path, last element)`.
///
/// `"a/b/c"` gives `("a/b", "c")`, `"c"` gives `("", "c")`. Trailing
/// separators are ignored.
pub fn separate_last_element(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches(GROUP_SEPARATOR);
    match trimmed.rfind(GROUP_SEPARATOR) {
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => ("", trimmed),
    }
}

/// Join a group path and a child name.
pub fn join(group: &str, name: &str) -> String {
    let group = group.trim_end_matches(GROUP_SEPARATOR);
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{group}{GROUP_SEPARATOR}{name}")
    }
}

/// Last element of a path, the root being `""`.
pub fn last_element(path: &str) -> &str {
    separate_last_element(path).1
}

/// Check that `name` can be used as a group or parameter name.
pub fn validate_name(name: &str) -> Result<(), TreeError> {
    let reason = if name.is_empty() {
        "empty name"
    } else if name.contains(GROUP_SEPARATOR) {
        "name contains a group separator"
    } else if name == PARENT_GROUP {
        "\"..\" is not a valid name"
    } else {
        return Ok(());
    };
    Err(TreeError::InvalidPath {
        path: name.to_string(),
        reason,
    })
}

/// Check a path used to create groups: no trailing separator and no empty
/// segment between two names. A single leading separator is accepted.
pub fn validate_creation_path(path: &str) -> Result<(), TreeError> {
    let invalid = |reason| TreeError::InvalidPath {
        path: path.to_string(),
        reason,
    };
    let body = path.strip_prefix(GROUP_SEPARATOR).unwrap_or(path);
    if body.is_empty() {
        return Err(invalid("empty path"));
    }
    if body.ends_with(GROUP_SEPARATOR) {
        return Err(invalid("trailing group separator"));
    }
    if body.split(GROUP_SEPARATOR).any(str::is_empty) {
        return Err(invalid("empty group name"));
    }
    Ok(())
}

/// Number of edges between two canonical group paths, counted through
/// their lowest common ancestor.
pub fn tree_distance(a: &str, b: &str) -> usize {
    let a: Vec<&str> = segments(a).collect();
    let b: Vec<&str> = segments(b).collect();
    let common = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| same_key(x, y))
        .count();
    (a.len() - common) + (b.len() - common)
}

/// True if `path` is `ancestor` or lies below it (canonical paths).
pub fn is_within(path: &str, ancestor: &str) -> bool {
    let mut inner = segments(path);
    segments(ancestor).all(|seg| inner.next().is_some_and(|p| same_key(p, seg)))
}
