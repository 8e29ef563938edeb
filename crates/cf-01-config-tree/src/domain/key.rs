//! Numeric-aware configuration keys
//!
//! Group and parameter names are split at their last `:`. When the part
//! after the colon is made only of decimal digits it is compared as an
//! unsigned number, so `motor:3` and `motor:03` are the same key and
//! `motor:3` sorts before `motor:12`. A numeric suffix sorts before a
//! non-numeric suffix with the same prefix.
//!
//! The ordering is a lexicographic comparison of `(prefix, suffix)`, which
//! keeps it a total order usable as a `BTreeMap` key. Names without a colon
//! sort before every suffixed name with the same prefix.

use std::cmp::Ordering;
use std::fmt;

/// Key of a child group or a parameter inside a node.
#[derive(Debug, Clone)]
pub struct ConfigKey {
    name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix<'a> {
    None,
    /// Digits with leading zeros stripped.
    Numeric(&'a str),
    Text(&'a str),
}

impl ConfigKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The name as it was first inserted.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Numeric value of the suffix, if it fits in a `u64`.
    pub fn numeric_suffix(&self) -> Option<u64> {
        match split(&self.name).1 {
            Suffix::Numeric(digits) if digits.is_empty() => Some(0),
            Suffix::Numeric(digits) => digits.parse().ok(),
            _ => None,
        }
    }

    /// Part of the name before the last colon (the whole name if none).
    pub fn prefix(&self) -> &str {
        split(&self.name).0
    }
}

fn split(name: &str) -> (&str, Suffix<'_>) {
    match name.rsplit_once(':') {
        None => (name, Suffix::None),
        Some((prefix, suffix)) => {
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                (prefix, Suffix::Numeric(suffix.trim_start_matches('0')))
            } else {
                (prefix, Suffix::Text(suffix))
            }
        }
    }
}

fn compare_suffixes(a: Suffix<'_>, b: Suffix<'_>) -> Ordering {
    match (a, b) {
        (Suffix::None, Suffix::None) => Ordering::Equal,
        (Suffix::None, _) => Ordering::Less,
        (_, Suffix::None) => Ordering::Greater,
        // Without leading zeros a shorter digit string is a smaller number.
        (Suffix::Numeric(x), Suffix::Numeric(y)) => x.len().cmp(&y.len()).then_with(|| x.cmp(y)),
        (Suffix::Numeric(_), Suffix::Text(_)) => Ordering::Less,
        (Suffix::Text(_), Suffix::Numeric(_)) => Ordering::Greater,
        (Suffix::Text(x), Suffix::Text(y)) => x.cmp(y),
    }
}

/// Compare two names with the key ordering.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let (prefix_a, suffix_a) = split(a);
    let (prefix_b, suffix_b) = split(b);
    prefix_a
        .cmp(prefix_b)
        .then_with(|| compare_suffixes(suffix_a, suffix_b))
}

/// True if both names address the same key.
pub fn same_key(a: &str, b: &str) -> bool {
    compare_names(a, b) == Ordering::Equal
}

impl Ord for ConfigKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_names(&self.name, &other.name)
    }
}

impl PartialOrd for ConfigKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ConfigKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ConfigKey {}

impl From<&str> for ConfigKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ConfigKey {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
