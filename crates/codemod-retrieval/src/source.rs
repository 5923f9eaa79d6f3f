//! Guidance retrieval boundary
//!
//! A [`GuidanceSource`] answers free-text queries with ranked documentation
//! snippets. The codemod session treats it as best-effort: a failed query is
//! logged and behaves like an empty result set ([`query_or_empty`]).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Snippet length kept in a match before `...` is appended
pub const SNIPPET_MAX_CHARS: usize = 400;

/// Default number of matches per query
pub const DEFAULT_TOP_K: usize = 6;

/// Matches requested for the package/version summary query
pub const SUPPLEMENTAL_TOP_K: usize = 4;

fn missing_chunk_index() -> i64 {
    -1
}

/// One ranked retrieval result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RetrievalMatch {
    /// Similarity score, higher is better
    #[serde(default)]
    pub score: f32,
    /// Page title
    #[serde(default)]
    pub title: String,
    /// Source URL
    #[serde(default)]
    pub url: String,
    /// Framework tag (`nextjs`, `react`, ...)
    #[serde(default)]
    pub framework: String,
    /// Position of the chunk within its page; `-1` when unknown
    #[serde(default = "missing_chunk_index")]
    pub chunk_index: i64,
    /// Truncated chunk text
    #[serde(default)]
    pub snippet: String,
}

impl RetrievalMatch {
    /// Create match; the snippet is truncated to [`SNIPPET_MAX_CHARS`]
    #[must_use]
    pub fn new(url: impl Into<String>, snippet: &str) -> Self {
        Self {
            url: url.into(),
            snippet: truncate_snippet(snippet),
            chunk_index: -1,
            ..Self::default()
        }
    }

    /// With score
    #[inline]
    #[must_use]
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// With title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// With framework tag
    #[inline]
    #[must_use]
    pub fn with_framework(mut self, framework: impl Into<String>) -> Self {
        self.framework = framework.into();
        self
    }
}

/// Keep at most [`SNIPPET_MAX_CHARS`] characters, marking the cut with `...`
#[must_use]
pub fn truncate_snippet(text: &str) -> String {
    match text.char_indices().nth(SNIPPET_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Framework filter for a package name
#[must_use]
pub fn framework_hint(package_name: &str) -> Option<&'static str> {
    if package_name.starts_with("next") {
        Some("nextjs")
    } else if package_name.starts_with("react") {
        Some("react")
    } else {
        None
    }
}

/// Summary query for a package upgrade
#[must_use]
pub fn supplemental_query(package_name: &str, current_version: &str, target_version: &str) -> String {
    let current = if current_version.is_empty() {
        "current"
    } else {
        current_version
    };
    format!("{package_name} migration {current} to {target_version} quick summary key API renames")
}

/// Documentation retrieval backend
pub trait GuidanceSource: Send + Sync + Debug {
    /// Return up to `top_k` matches for `text`, optionally restricted to a framework
    ///
    /// # Errors
    /// Returns error if the backend cannot be reached or rejects the query
    fn query(&self, text: &str, top_k: usize, framework: Option<&str>) -> Result<Vec<RetrievalMatch>>;
}

/// Run a query, logging failures and returning no matches instead
#[must_use]
pub fn query_or_empty(
    source: &dyn GuidanceSource,
    text: &str,
    top_k: usize,
    framework: Option<&str>,
) -> Vec<RetrievalMatch> {
    match source.query(text, top_k, framework) {
        Ok(matches) => {
            tracing::debug!("Guidance query returned {} matches", matches.len());
            matches
        }
        Err(e) => {
            tracing::error!("Guidance query failed: {}", e);
            Vec::new()
        }
    }
}

/// Source that never returns anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGuidanceSource;

impl GuidanceSource for NoGuidanceSource {
    fn query(&self, _text: &str, _top_k: usize, _framework: Option<&str>) -> Result<Vec<RetrievalMatch>> {
        Ok(Vec::new())
    }
}

/// Source over a fixed match list
///
/// Ignores the query text; filters by framework and returns the best
/// `top_k` by score.
#[derive(Debug, Clone, Default)]
pub struct StaticGuidanceSource {
    matches: Vec<RetrievalMatch>,
}

impl StaticGuidanceSource {
    /// Create source from matches
    #[must_use]
    pub fn new(matches: impl IntoIterator<Item = RetrievalMatch>) -> Self {
        Self {
            matches: matches
                .into_iter()
                .map(|mut m| {
                    m.snippet = truncate_snippet(&m.snippet);
                    m
                })
                .collect(),
        }
    }

    /// Load matches from a JSON array
    ///
    /// # Errors
    /// Returns error if the payload is not a JSON array of matches
    pub fn from_json(payload: &str) -> Result<Self> {
        let matches: Vec<RetrievalMatch> = serde_json::from_str(payload)?;
        Ok(Self::new(matches))
    }

    /// Number of stored matches
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Whether no matches are stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

impl GuidanceSource for StaticGuidanceSource {
    fn query(&self, _text: &str, top_k: usize, framework: Option<&str>) -> Result<Vec<RetrievalMatch>> {
        let mut hits: Vec<RetrievalMatch> = self
            .matches
            .iter()
            .filter(|m| framework.map_or(true, |f| m.framework == f))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(top_k);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RetrievalError;

    #[derive(Debug)]
    struct Unreachable;

    impl GuidanceSource for Unreachable {
        fn query(&self, _: &str, _: usize, _: Option<&str>) -> Result<Vec<RetrievalMatch>> {
            Err(RetrievalError::Query("connection refused".to_string()))
        }
    }

    #[test]
    fn snippet_truncation() {
        assert_eq!(truncate_snippet("short"), "short");
        let exact = "x".repeat(SNIPPET_MAX_CHARS);
        assert_eq!(truncate_snippet(&exact), exact);

        let long = "é".repeat(SNIPPET_MAX_CHARS + 5);
        let cut = truncate_snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), SNIPPET_MAX_CHARS + 3);
    }

    #[test]
    fn framework_hints() {
        assert_eq!(framework_hint("next"), Some("nextjs"));
        assert_eq!(framework_hint("react-dom"), Some("react"));
        assert_eq!(framework_hint("lodash"), None);
    }

    #[test]
    fn supplemental_query_text() {
        assert_eq!(
            supplemental_query("next", "13.4.0", "14.0.0"),
            "next migration 13.4.0 to 14.0.0 quick summary key API renames"
        );
        assert_eq!(
            supplemental_query("next", "", "14.0.0"),
            "next migration current to 14.0.0 quick summary key API renames"
        );
    }

    #[test]
    fn failed_query_degrades_to_empty() {
        assert!(query_or_empty(&Unreachable, "q", 4, None).is_empty());
        assert!(query_or_empty(&NoGuidanceSource, "q", 4, None).is_empty());
    }

    #[test]
    fn static_source_filters_and_ranks() {
        let source = StaticGuidanceSource::new([
            RetrievalMatch::new("u1", "a").with_score(0.2).with_framework("nextjs"),
            RetrievalMatch::new("u2", "b").with_score(0.9).with_framework("nextjs"),
            RetrievalMatch::new("u3", "c").with_score(0.95).with_framework("react"),
        ]);
        let hits = source.query("anything", 1, Some("nextjs")).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "u2");

        let all = source.query("anything", 10, None).unwrap();
        assert_eq!(all.iter().map(|m| m.url.as_str()).collect::<Vec<_>>(), vec!["u3", "u2", "u1"]);
    }

    #[test]
    fn static_source_from_json() {
        let source = StaticGuidanceSource::from_json(
            r#"[{"url":"https://nextjs.org/docs","snippet":"useRouter moved","framework":"nextjs"}]"#,
        )
        .unwrap();
        assert_eq!(source.len(), 1);
        let hits = source.query("q", 4, Some("nextjs")).unwrap();
        assert_eq!(hits[0].chunk_index, -1);

        assert!(StaticGuidanceSource::from_json("{}").is_err());
    }
}
