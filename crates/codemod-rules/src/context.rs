//! Rule context and guidance compaction
//!
//! [`RuleContext`] is built once per pipeline invocation and handed to every
//! rule by shared reference. It carries the package identity, the version
//! pair, and the compacted [`Guidance`] map.

use codemod_artifact::{AnalysisArtifact, GuidanceEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Topic key reserved for live-retrieval results
pub const SUPPLEMENTAL_TOPIC: &str = "supplemental";

/// Hints attached to the supplemental topic
pub const SUPPLEMENTAL_HINTS: [&str; 3] = ["migration", "api", "rename"];

/// Fixed keyword vocabulary searched for in guidance snippets
pub const DEFAULT_HINT_VOCABULARY: [&str; 10] = [
    "deprecated",
    "migration",
    "replace",
    "rename",
    "router",
    "app router",
    "config",
    "env",
    "server actions",
    "useRouter",
];

/// Compacted guidance for one topic
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuidanceTopic {
    /// Reference URLs, deduplicated in first-seen order
    pub urls: Vec<String>,
    /// Keyword hints found in the snippets, sorted and unique
    pub hints: BTreeSet<String>,
}

impl GuidanceTopic {
    fn push_url(&mut self, url: &str) {
        if !url.is_empty() && !self.urls.iter().any(|u| u == url) {
            self.urls.push(url.to_string());
        }
    }
}

/// Topic -> compacted guidance, in topic first-seen order
pub type Guidance = IndexMap<String, GuidanceTopic>;

/// Reduces retrieval output to a [`Guidance`] map
#[derive(Debug, Clone)]
pub struct GuidanceCompactor {
    /// (vocabulary form, lowercase form)
    vocabulary: Vec<(String, String)>,
}

impl Default for GuidanceCompactor {
    fn default() -> Self {
        Self::new(DEFAULT_HINT_VOCABULARY)
    }
}

impl GuidanceCompactor {
    /// Create compactor with a custom vocabulary
    #[must_use]
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|kw| {
                    let kw = kw.into();
                    let lower = kw.to_lowercase();
                    (kw, lower)
                })
                .collect(),
        }
    }

    /// Compact guidance entries
    ///
    /// Entries that share a topic are merged.
    #[must_use]
    pub fn compact(&self, entries: &[GuidanceEntry]) -> Guidance {
        let mut guidance = Guidance::new();
        for entry in entries {
            let topic = guidance.entry(entry.topic.clone()).or_default();
            for reference in &entry.references {
                topic.push_url(&reference.url);
                topic.hints.extend(self.hints_in(&reference.snippet));
            }
        }
        guidance
    }

    /// Vocabulary keywords found (case-insensitively) in `text`
    pub fn hints_in<'a>(&'a self, text: &str) -> impl Iterator<Item = String> + 'a {
        let lower = text.to_lowercase();
        self.vocabulary
            .iter()
            .filter(move |(_, kw)| lower.contains(kw.as_str()))
            .map(|(original, _)| original.clone())
    }
}

/// Add live-retrieval URLs under [`SUPPLEMENTAL_TOPIC`]
///
/// The topic is inserted even when no URL survives; callers skip this when
/// the live query returned no matches at all.
pub fn insert_supplemental<I, S>(guidance: &mut Guidance, urls: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut topic = GuidanceTopic::default();
    for url in urls {
        topic.push_url(url.as_ref());
    }
    topic.hints = SUPPLEMENTAL_HINTS.iter().map(ToString::to_string).collect();
    guidance.insert(SUPPLEMENTAL_TOPIC.to_string(), topic);
}

/// Per-invocation context handed to every rule
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RuleContext {
    /// Package under upgrade
    pub package_name: String,
    /// Installed version
    pub current_version: String,
    /// Target version
    pub target_version: String,
    /// Compacted guidance
    pub guidance: Guidance,
}

impl RuleContext {
    /// Create context
    #[must_use]
    pub fn new(
        package_name: impl Into<String>,
        current_version: impl Into<String>,
        target_version: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            current_version: current_version.into(),
            target_version: target_version.into(),
            guidance: Guidance::new(),
        }
    }

    /// Context for an artifact with pre-compacted guidance
    #[must_use]
    pub fn from_artifact(artifact: &AnalysisArtifact, guidance: Guidance) -> Self {
        Self {
            package_name: artifact.package_name.clone(),
            current_version: artifact.current_version.clone(),
            target_version: artifact.target_version.clone(),
            guidance,
        }
    }

    /// Whether the package belongs to a framework family
    #[inline]
    #[must_use]
    pub fn package_starts_with(&self, prefix: &str) -> bool {
        self.package_name.starts_with(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemod_artifact::GuidanceReference;

    fn reference(url: &str, snippet: &str) -> GuidanceReference {
        GuidanceReference {
            url: url.to_string(),
            snippet: snippet.to_string(),
            ..GuidanceReference::default()
        }
    }

    fn entry(topic: &str, refs: Vec<GuidanceReference>) -> GuidanceEntry {
        GuidanceEntry {
            topic: topic.to_string(),
            references: refs,
        }
    }

    #[test]
    fn compacts_urls_in_first_seen_order_without_duplicates() {
        let guidance = GuidanceCompactor::default().compact(&[entry(
            "routing",
            vec![
                reference("https://b", ""),
                reference("https://a", ""),
                reference("https://b", ""),
                reference("", "no url"),
            ],
        )]);
        assert_eq!(guidance["routing"].urls, vec!["https://b", "https://a"]);
    }

    #[test]
    fn hints_are_sorted_unique_and_case_insensitive() {
        let guidance = GuidanceCompactor::default().compact(&[entry(
            "routing",
            vec![
                reference("u1", "The Router API is DEPRECATED; see migration"),
                reference("u2", "migration: use the App Router and useRouter"),
            ],
        )]);
        let hints: Vec<_> = guidance["routing"].hints.iter().map(String::as_str).collect();
        assert_eq!(
            hints,
            vec!["app router", "deprecated", "migration", "router", "useRouter"]
        );
    }

    #[test]
    fn topics_keep_first_seen_order_and_merge() {
        let guidance = GuidanceCompactor::default().compact(&[
            entry("b", vec![reference("u1", "")]),
            entry("a", vec![reference("u2", "")]),
            entry("b", vec![reference("u3", "env vars")]),
        ]);
        assert_eq!(guidance.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(guidance["b"].urls, vec!["u1", "u3"]);
        assert!(guidance["b"].hints.contains("env"));
    }

    #[test]
    fn empty_entries_give_empty_guidance() {
        assert!(GuidanceCompactor::default().compact(&[]).is_empty());
    }

    #[test]
    fn supplemental_topic_keeps_hints_without_urls() {
        let mut guidance = Guidance::new();
        insert_supplemental(&mut guidance, ["", ""]);
        assert!(guidance[SUPPLEMENTAL_TOPIC].urls.is_empty());
        assert_eq!(guidance[SUPPLEMENTAL_TOPIC].hints.len(), 3);

        insert_supplemental(&mut guidance, ["u1", "u1", "u2"]);
        let topic = &guidance[SUPPLEMENTAL_TOPIC];
        assert_eq!(topic.urls, vec!["u1", "u2"]);
        assert_eq!(topic.hints.len(), 3);
        assert!(topic.hints.contains("api"));
    }

    #[test]
    fn context_prefix_check() {
        let ctx = RuleContext::new("next", "13.0.0", "14.0.0");
        assert!(ctx.package_starts_with("next"));
        assert!(!ctx.package_starts_with("react"));
    }
}
