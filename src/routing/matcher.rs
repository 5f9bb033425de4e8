//! Matcher primitives evaluated per RPC.
//!
//! # Responsibilities
//! - Match the request path (exact, prefix, full-regex)
//! - Match a single header value (exact, regex, range, presence, prefix, suffix)
//! - Gate a fraction of traffic on a random draw
//!
//! # Design Decisions
//! - Path matching is always case-sensitive
//! - Regexes are compiled once at conversion time; matching never fails
//! - Each specifier group is an enum, so "exactly one set" holds by construction
//! - Equality and hashing are structural (regexes compare by pattern text)

use std::fmt;
use std::hash::{Hash, Hasher};

use regex::Regex;

use crate::routing::random::RandomSource;

/// A compiled regex that must match the whole input.
#[derive(Clone)]
pub struct SafeRegex {
    pattern: String,
    compiled: Regex,
}

impl SafeRegex {
    pub fn new(pattern: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = pattern.into();
        let compiled = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Self { pattern, compiled })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_full_match(&self, input: &str) -> bool {
        self.compiled.is_match(input)
    }
}

impl fmt::Debug for SafeRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SafeRegex").field(&self.pattern).finish()
    }
}

impl PartialEq for SafeRegex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for SafeRegex {}

impl Hash for SafeRegex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.pattern.hash(state);
    }
}

/// Matches the `:path` of an RPC, e.g. `/package.Service/Method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathMatcher {
    Exact(String),
    Prefix(String),
    Regex(SafeRegex),
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(exact) => path == exact.as_str(),
            PathMatcher::Prefix(prefix) => path.starts_with(prefix.as_str()),
            PathMatcher::Regex(regex) => regex.is_full_match(path),
        }
    }

    pub fn exact_path(&self) -> Option<&str> {
        match self {
            PathMatcher::Exact(exact) => Some(exact.as_str()),
            _ => None,
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        match self {
            PathMatcher::Prefix(prefix) => Some(prefix.as_str()),
            _ => None,
        }
    }

    pub fn regex(&self) -> Option<&SafeRegex> {
        match self {
            PathMatcher::Regex(regex) => Some(regex),
            _ => None,
        }
    }
}

/// Half-open integer range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.start <= value && value < self.end
    }
}

/// The value test a [`HeaderMatcher`] applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HeaderMatchKind {
    Exact(String),
    Regex(SafeRegex),
    Range(Range),
    Present(bool),
    Prefix(String),
    Suffix(String),
}

/// Matches one request header by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HeaderMatcher {
    name: String,
    kind: HeaderMatchKind,
    invert: bool,
}

impl HeaderMatcher {
    pub fn new(name: impl Into<String>, kind: HeaderMatchKind, invert: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            invert,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &HeaderMatchKind {
        &self.kind
    }

    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Evaluate against the header's value, `None` when the header is absent.
    ///
    /// An absent header never matches unless the matcher is a presence test;
    /// inversion does not turn absence into a match.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let matched = match (&self.kind, value) {
            (HeaderMatchKind::Present(present), value) => value.is_some() == *present,
            (_, None) => return false,
            (HeaderMatchKind::Exact(exact), Some(value)) => value == exact.as_str(),
            (HeaderMatchKind::Regex(regex), Some(value)) => regex.is_full_match(value),
            (HeaderMatchKind::Range(range), Some(value)) => value
                .parse::<i64>()
                .map(|number| range.contains(number))
                .unwrap_or(false),
            (HeaderMatchKind::Prefix(prefix), Some(value)) => value.starts_with(prefix.as_str()),
            (HeaderMatchKind::Suffix(suffix), Some(value)) => value.ends_with(suffix.as_str()),
        };
        matched != self.invert
    }
}

/// Admits `numerator / denominator` of otherwise-matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FractionMatcher {
    numerator: u32,
    denominator: u32,
}

impl FractionMatcher {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// `draw` must be uniform over `[0, denominator)`.
    pub fn matches(&self, draw: u64) -> bool {
        draw < u64::from(self.numerator)
    }

    pub fn sample(&self, random: &dyn RandomSource) -> bool {
        self.matches(random.next_below(u64::from(self.denominator)))
    }
}
