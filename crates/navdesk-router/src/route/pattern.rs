//! Pattern parsing for route paths
//!
//! Pure functional parsing of `/users/:id` style patterns into typed segments.
//! All functions are **pure**: same input → same output, no side effects.

use crate::error::TableError;
use crate::path::{normalize_path, segments};
use std::collections::HashMap;

/// A single segment of a route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly
    Static(String),
    /// Dynamic segment `:name` matching any single path segment
    Param(String),
}

/// Classifies a segment into a pattern segment (pure function)
///
/// # Examples
///
/// ```
/// use navdesk_router::route::pattern::{classify_segment, Segment};
///
/// assert_eq!(classify_segment("news"), Segment::Static("news".to_string()));
/// assert_eq!(classify_segment(":symbol"), Segment::Param("symbol".to_string()));
/// ```
pub fn classify_segment(segment: &str) -> Segment {
    match segment.strip_prefix(':') {
        Some(name) => Segment::Param(name.to_string()),
        None => Segment::Static(segment.to_string()),
    }
}

/// Parsed, validated route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parses a pattern, normalizing slashes first
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::route::pattern::PathPattern;
    ///
    /// let pattern = PathPattern::parse("/analysis/:symbol/").unwrap();
    /// assert_eq!(pattern.as_str(), "/analysis/:symbol");
    /// assert_eq!(pattern.wildcard_count(), 1);
    /// assert!(!pattern.is_literal());
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, TableError> {
        let raw = normalize_path(pattern).into_owned();
        let segments: Vec<Segment> = segments(&raw).map(classify_segment).collect();

        let invalid = |reason: String| TableError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        let mut seen = Vec::new();
        for segment in &segments {
            if let Segment::Param(name) = segment {
                if name.is_empty() {
                    return Err(invalid("empty parameter name".to_string()));
                }
                if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(invalid(format!("invalid parameter name :{}", name)));
                }
                if seen.contains(&name) {
                    return Err(invalid(format!("parameter :{} appears twice", name)));
                }
                seen.push(name);
            }
        }

        Ok(Self { raw, segments })
    }

    /// Normalized pattern text
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of dynamic segments; fewer means more specific
    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Param(_)))
            .count()
    }

    pub fn is_literal(&self) -> bool {
        self.wildcard_count() == 0
    }

    /// Parameter names in pattern order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Shape of the pattern with parameter names erased
    ///
    /// Two patterns with the same shape match exactly the same paths.
    pub fn shape(&self, case_insensitive: bool) -> String {
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Param(_) => ":".to_string(),
                Segment::Static(text) if case_insensitive => text.to_ascii_lowercase(),
                Segment::Static(text) => text.clone(),
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    /// Matches a normalized path, returning decoded parameters
    pub fn matches(&self, path: &str, case_insensitive: bool) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = segments(path).collect();
        if path_segments.len() != self.segments.len() {
            return None;
        }

        self.segments
            .iter()
            .zip(path_segments)
            .try_fold(HashMap::new(), |mut params, (pattern_seg, path_seg)| {
                match pattern_seg {
                    Segment::Static(text) => {
                        let matches = if case_insensitive {
                            text.eq_ignore_ascii_case(path_seg)
                        } else {
                            text == path_seg
                        };
                        matches.then_some(params)
                    }
                    Segment::Param(name) => {
                        let value = urlencoding::decode(path_seg)
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| path_seg.to_string());
                        params.insert(name.clone(), value);
                        Some(params)
                    }
                }
            })
    }

    /// Builds a concrete path by substituting parameters
    ///
    /// Returns the name of the first missing parameter on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use navdesk_router::route::pattern::PathPattern;
    /// use std::collections::HashMap;
    ///
    /// let pattern = PathPattern::parse("/analysis/:symbol").unwrap();
    /// let params = HashMap::from([("symbol".to_string(), "BRK A".to_string())]);
    /// assert_eq!(pattern.generate(&params).unwrap(), "/analysis/BRK%20A");
    /// ```
    pub fn generate(&self, params: &HashMap<String, String>) -> Result<String, String> {
        let parts = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Static(text) => Ok(text.clone()),
                Segment::Param(name) => params
                    .get(name)
                    .map(|v| urlencoding::encode(v).into_owned())
                    .ok_or_else(|| name.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(format!("/{}", parts.join("/")))
    }
}
