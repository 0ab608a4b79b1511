//! Route patterns and segment matching.
//!
//! # Responsibilities
//! - Parse `/author/:authorId` style patterns into segments
//! - Reject malformed or duplicate parameter names
//! - Match a concrete path against a pattern, binding parameters
//!
//! # Design Decisions
//! - Segment-count matching only; no catch-all or optional segments
//! - Literal matching is case-sensitive
//! - Parameters bind any non-empty segment
//! - No regex on the request path

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }

    fn matches(&self, concrete: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == concrete,
            Segment::Param(_) => !concrete.is_empty(),
        }
    }
}

/// Why a pattern could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern must start with '/'")]
    MissingLeadingSlash,

    #[error("empty segment at position {0}")]
    EmptySegment(usize),

    #[error("malformed parameter name {0:?}")]
    InvalidParamName(String),

    #[error("parameter {0:?} appears more than once")]
    DuplicateParam(String),

    /// Bracket segments must be rewritten to colon form first.
    #[error("segment {0:?} uses bracket syntax; run normalize-routes")]
    BracketSegment(String),
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parse a pattern such as `/events/:slug`. `/` is the root pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or(PatternError::MissingLeadingSlash)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self { segments: Vec::new() });
        }

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for (i, raw) in rest.split('/').enumerate() {
            if raw.is_empty() {
                return Err(PatternError::EmptySegment(i));
            }
            if raw.contains('[') || raw.contains(']') {
                return Err(PatternError::BracketSegment(raw.to_string()));
            }
            match raw.strip_prefix(':') {
                Some(name) => {
                    if !is_valid_param_name(name) {
                        return Err(PatternError::InvalidParamName(name.to_string()));
                    }
                    if !seen.insert(name) {
                        return Err(PatternError::DuplicateParam(name.to_string()));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of literal segments; the specificity used to break ties.
    pub fn literal_count(&self) -> usize {
        self.segments.iter().filter(|s| s.is_literal()).count()
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match concrete path segments, returning parameter bindings.
    pub fn matches(&self, path: &[&str]) -> Option<HashMap<String, String>> {
        if path.len() != self.segments.len() {
            return None;
        }
        let mut params = HashMap::new();
        for (segment, concrete) in self.segments.iter().zip(path) {
            if !segment.matches(concrete) {
                return None;
            }
            if let Segment::Param(name) = segment {
                params.insert(name.clone(), (*concrete).to_string());
            }
        }
        Some(params)
    }

    /// The pattern matching exactly the paths both patterns match.
    ///
    /// Literal wherever either side has one, parameter where both do.
    /// `None` when no path matches both.
    pub fn intersection(&self, other: &RoutePattern) -> Option<RoutePattern> {
        if self.segments.len() != other.segments.len() {
            return None;
        }
        let mut segments = Vec::with_capacity(self.segments.len());
        for (a, b) in self.segments.iter().zip(&other.segments) {
            let segment = match (a, b) {
                (Segment::Literal(x), Segment::Literal(y)) if x != y => return None,
                (Segment::Literal(x), _) | (_, Segment::Literal(x)) => Segment::Literal(x.clone()),
                (Segment::Param(name), Segment::Param(_)) => Segment::Param(name.clone()),
            };
            segments.push(segment);
        }
        Some(RoutePattern { segments })
    }

    /// Whether every path matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &RoutePattern) -> bool {
        self.segments.len() == other.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| match (a, b) {
                (Segment::Param(_), _) => true,
                (Segment::Literal(x), Segment::Literal(y)) => x == y,
                (Segment::Literal(_), Segment::Param(_)) => false,
            })
    }
}

impl FromStr for RoutePattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => write!(f, "/{}", lit)?,
                Segment::Param(name) => write!(f, "/:{}", name)?,
            }
        }
        Ok(())
    }
}

/// Split a request path into segments. `/` yields no segments.
pub fn split_path(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn is_valid_param_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
