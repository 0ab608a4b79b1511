//! Route table construction and lookup.
//!
//! # Responsibilities
//! - Build the table from the route source, resolving each entry's policy
//! - Reject duplicate and overlapping patterns before anything is served
//! - Look up the entry for a request path and bind its parameters
//!
//! # Design Decisions
//! - Immutable after construction (shared read-only, no locks)
//! - Declaration order kept for iteration and admin output only
//! - Precedence: most literal segments wins; equal specificity is an error
//!   unless a more specific entry wins every shared path
//! - O(n) scan per lookup (tables hold a few dozen pages)

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::schema::{RouteDefinition, RouteSource};
use crate::policy::{check_server_only, resolve_policy, PolicyConfigError, RenderingPolicy};
use crate::routing::matcher::{split_path, PatternError, RoutePattern, Segment};

/// Opaque reference to a renderable unit of the UI layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ComponentRef(String);

impl ComponentRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a page is, as opposed to how it is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub title: String,
    pub description: String,
    pub component: ComponentRef,
}

/// One page of the site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub descriptor: PageDescriptor,
    pub policy: RenderingPolicy,
}

impl RouteEntry {
    pub fn new(pattern: RoutePattern, descriptor: PageDescriptor, policy: RenderingPolicy) -> Self {
        Self {
            pattern,
            descriptor,
            policy,
        }
    }

    /// Build an entry from its route source definition.
    pub fn from_definition(def: &RouteDefinition) -> Result<Self, RouteError> {
        let pattern = RoutePattern::parse(&def.pattern).map_err(|source| RouteError::InvalidPattern {
            pattern: def.pattern.clone(),
            source,
        })?;
        let policy = resolve_policy(&def.rendering(), def.client_only)
            .and_then(|policy| check_server_only(policy, def.server_only, def.immutable))
            .map_err(|source| RouteError::Policy {
                pattern: def.pattern.clone(),
                source,
            })?;

        Ok(Self::new(
            pattern,
            PageDescriptor {
                title: def.title.clone(),
                description: def.description.clone(),
                component: ComponentRef::new(def.component.clone()),
            },
            policy,
        ))
    }
}

/// Result of a successful lookup.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: HashMap<String, String>,
}

/// Route table errors, build time and request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No pattern matches the path. Expected at request time.
    #[error("no route matches {path}")]
    NotFound { path: String },

    /// More than one pattern of equal specificity matches `path`.
    #[error("{path} is matched by equally specific patterns {}", .patterns.join(", "))]
    Ambiguous { path: String, patterns: Vec<String> },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },

    #[error("pattern {pattern} is declared more than once")]
    DuplicatePattern { pattern: String },

    #[error("route {pattern}: {source}")]
    Policy {
        pattern: String,
        #[source]
        source: PolicyConfigError,
    },
}

impl RouteError {
    /// Whether the error is the ordinary "no such page" case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RouteError::NotFound { .. })
    }
}

/// Validated, immutable route table.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Validate entries and freeze them into a table.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteError> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.pattern.to_string()) {
                return Err(RouteError::DuplicatePattern {
                    pattern: entry.pattern.to_string(),
                });
            }
        }

        // Two equally specific patterns may share paths only when a more
        // specific entry wins every one of them.
        for (i, a) in entries.iter().enumerate() {
            for b in &entries[i + 1..] {
                let literals = a.pattern.literal_count();
                if literals != b.pattern.literal_count() {
                    continue;
                }
                let Some(shared) = a.pattern.intersection(&b.pattern) else {
                    continue;
                };
                let resolved = entries
                    .iter()
                    .any(|c| c.pattern.literal_count() > literals && c.pattern.covers(&shared));
                if !resolved {
                    return Err(RouteError::Ambiguous {
                        path: witness_path(&shared, &entries),
                        patterns: vec![a.pattern.to_string(), b.pattern.to_string()],
                    });
                }
            }
        }

        Ok(Self { entries })
    }

    /// Build the table from a parsed route source.
    pub fn from_source(source: &RouteSource) -> Result<Self, RouteError> {
        let entries = source
            .routes
            .iter()
            .map(RouteEntry::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        let table = Self::new(entries)?;

        tracing::debug!(routes = table.len(), "Route table built");
        Ok(table)
    }

    /// Find the entry for a concrete request path.
    pub fn lookup(&self, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        let segments = split_path(path);
        let mut best: Vec<RouteMatch<'_>> = Vec::new();
        let mut best_literals = 0;

        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(&segments) else {
                continue;
            };
            let literals = entry.pattern.literal_count();
            if best.is_empty() || literals > best_literals {
                best.clear();
                best_literals = literals;
            } else if literals < best_literals {
                continue;
            }
            best.push(RouteMatch { entry, params });
        }

        match best.len() {
            0 => Err(RouteError::NotFound {
                path: path.to_string(),
            }),
            1 => Ok(best.remove(0)),
            _ => Err(RouteError::Ambiguous {
                path: path.to_string(),
                patterns: best.iter().map(|m| m.entry.pattern.to_string()).collect(),
            }),
        }
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A concrete path matched by `shared` and by no literal of any entry at its
/// parameter positions.
fn witness_path(shared: &RoutePattern, entries: &[RouteEntry]) -> String {
    let literals: HashSet<&str> = entries
        .iter()
        .flat_map(|e| e.pattern.segments())
        .filter_map(|s| match s {
            Segment::Literal(lit) => Some(lit.as_str()),
            Segment::Param(_) => None,
        })
        .collect();
    let filler = std::iter::once("x".to_string())
        .chain((1..).map(|n| format!("x{}", n)))
        .find(|candidate| !literals.contains(candidate.as_str()))
        .unwrap_or_default();

    let segments: Vec<&str> = shared
        .segments()
        .iter()
        .map(|s| match s {
            Segment::Literal(lit) => lit.as_str(),
            Segment::Param(_) => filler.as_str(),
        })
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{DynamicFlag, RevalidateValue};

    fn entry(pattern: &str) -> RouteEntry {
        RouteEntry::new(
            RoutePattern::parse(pattern).unwrap(),
            PageDescriptor {
                title: pattern.to_string(),
                description: String::new(),
                component: ComponentRef::new("Page"),
            },
            RenderingPolicy::Static,
        )
    }

    fn definition(pattern: &str) -> RouteDefinition {
        RouteDefinition {
            pattern: pattern.to_string(),
            title: "Page".to_string(),
            description: String::new(),
            component: "Page".to_string(),
            dynamic: Some(DynamicFlag::ForceStatic),
            revalidate: None,
            client_only: false,
            server_only: false,
            immutable: false,
        }
    }

    #[test]
    fn test_literal_beats_param() {
        let table = RouteTable::new(vec![
            entry("/author/:authorId"),
            entry("/author/profile-creator"),
        ])
        .unwrap();

        let m = table.lookup("/author/profile-creator").unwrap();
        assert_eq!(m.entry.pattern.to_string(), "/author/profile-creator");
        assert!(m.params.is_empty());

        let m = table.lookup("/author/jsmith").unwrap();
        assert_eq!(m.entry.pattern.to_string(), "/author/:authorId");
        assert_eq!(m.params.get("authorId").map(String::as_str), Some("jsmith"));
    }

    #[test]
    fn test_not_found() {
        let table = RouteTable::new(vec![entry("/"), entry("/about")]).unwrap();
        let err = table.lookup("/nonexistent/path").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            err,
            RouteError::NotFound {
                path: "/nonexistent/path".into()
            }
        );
    }

    #[test]
    fn test_root_and_trailing_slash() {
        let table = RouteTable::new(vec![entry("/"), entry("/about")]).unwrap();
        assert_eq!(table.lookup("/").unwrap().entry.pattern.to_string(), "/");
        assert_eq!(table.lookup("/about/").unwrap().entry.pattern.to_string(), "/about");
    }

    #[test]
    fn test_duplicate_patterns_rejected() {
        let err = RouteTable::new(vec![entry("/about"), entry("/about/")]).unwrap_err();
        assert_eq!(
            err,
            RouteError::DuplicatePattern {
                pattern: "/about".into()
            }
        );
    }

    #[test]
    fn test_overlapping_patterns_rejected() {
        let err = RouteTable::new(vec![entry("/author/:id"), entry("/author/:slug")]).unwrap_err();
        assert_eq!(
            err,
            RouteError::Ambiguous {
                path: "/author/x".into(),
                patterns: vec!["/author/:id".into(), "/author/:slug".into()],
            }
        );

        let err = RouteTable::new(vec![entry("/a/:x"), entry("/:y/b")]).unwrap_err();
        assert!(matches!(err, RouteError::Ambiguous { ref path, .. } if path == "/a/b"));
    }

    #[test]
    fn test_overlap_won_by_more_specific_entry() {
        let table = RouteTable::new(vec![entry("/a/:x"), entry("/:y/b"), entry("/a/b")]).unwrap();

        assert_eq!(table.lookup("/a/b").unwrap().entry.pattern.to_string(), "/a/b");
        assert_eq!(table.lookup("/a/c").unwrap().entry.pattern.to_string(), "/a/:x");
        assert_eq!(table.lookup("/c/b").unwrap().entry.pattern.to_string(), "/:y/b");
    }

    #[test]
    fn test_partially_won_overlap_rejected() {
        // `/author/profile-creator` wins one shared path, not all of them.
        let err = RouteTable::new(vec![
            entry("/author/:id"),
            entry("/author/:slug"),
            entry("/author/profile-creator"),
        ])
        .unwrap_err();
        assert!(matches!(err, RouteError::Ambiguous { ref path, .. } if path == "/author/x"));
    }

    #[test]
    fn test_witness_avoids_declared_literals() {
        let err = RouteTable::new(vec![entry("/:a/:b"), entry("/:c/:d"), entry("/x/x")]).unwrap_err();
        assert!(matches!(err, RouteError::Ambiguous { ref path, .. } if path == "/x1/x1"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let table = RouteTable::new(vec![entry("/photos"), entry("/"), entry("/events")]).unwrap();
        let order: Vec<String> = table.entries().iter().map(|e| e.pattern.to_string()).collect();
        assert_eq!(order, vec!["/photos", "/", "/events"]);
    }

    #[test]
    fn test_from_source_resolves_policies() {
        let mut news = definition("/news/:slug");
        news.dynamic = None;
        news.revalidate = Some(RevalidateValue::Seconds(86400));
        let mut dashboard = definition("/admin/dashboard");
        dashboard.client_only = true;

        let source = RouteSource {
            routes: vec![definition("/about"), news, dashboard],
        };
        let table = RouteTable::from_source(&source).unwrap();
        let policies: Vec<RenderingPolicy> = table.entries().iter().map(|e| e.policy).collect();
        assert_eq!(
            policies,
            vec![
                RenderingPolicy::Static,
                RenderingPolicy::incremental(86400).unwrap(),
                RenderingPolicy::Dynamic,
            ]
        );
    }

    #[test]
    fn test_from_source_rejects_bad_entries() {
        let source = RouteSource {
            routes: vec![definition("/author/[authorId]")],
        };
        assert!(matches!(
            RouteTable::from_source(&source),
            Err(RouteError::InvalidPattern { .. })
        ));

        let mut zero = definition("/events");
        zero.revalidate = Some(RevalidateValue::Seconds(0));
        let source = RouteSource { routes: vec![zero] };
        assert_eq!(
            RouteTable::from_source(&source).unwrap_err(),
            RouteError::Policy {
                pattern: "/events".into(),
                source: PolicyConfigError::NonPositiveInterval(0),
            }
        );

        let mut server_only = definition("/admin/reports");
        server_only.server_only = true;
        let source = RouteSource {
            routes: vec![server_only.clone()],
        };
        assert!(matches!(
            RouteTable::from_source(&source),
            Err(RouteError::Policy {
                source: PolicyConfigError::MutableServerOnlyStatic,
                ..
            })
        ));

        server_only.immutable = true;
        let source = RouteSource {
            routes: vec![server_only],
        };
        assert!(RouteTable::from_source(&source).is_ok());
    }
}
