//! Transform pipeline
//!
//! Folds a [`RuleRegistry`] over one file: each applicable rule sees the
//! previous rule's output. Change counts are summed and notes concatenated in
//! application order.

use crate::context::RuleContext;
use crate::registry::RuleRegistry;

/// Result of running every rule on one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTransform {
    /// Final content
    pub content: String,
    /// Sum of per-rule change counts
    pub changes: u32,
    /// Notes in application order
    pub notes: Vec<String>,
}

impl FileTransform {
    /// Whether any rule counted a change
    #[inline]
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.changes > 0
    }
}

/// Applies a registry to file contents
#[derive(Debug, Clone, Copy)]
pub struct TransformPipeline<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> TransformPipeline<'r> {
    /// Create pipeline over a registry
    #[inline]
    #[must_use]
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Run every applicable rule, in order, on `content`
    #[must_use]
    pub fn run(&self, path: &str, content: &str, ctx: &RuleContext) -> FileTransform {
        let mut current = content.to_string();
        let mut changes = 0u32;
        let mut notes = Vec::new();

        for rule in self.registry.iter() {
            if !rule.applicable(path, &current, ctx) {
                continue;
            }
            let outcome = rule.transform(path, &current, ctx);
            if outcome.failed {
                tracing::warn!("Rule '{}' failed on {}: {:?}", rule.name(), path, outcome.notes);
            } else if outcome.is_change() {
                tracing::debug!("Rule '{}' changed {} ({})", rule.name(), path, outcome.changes);
            }
            current = outcome.content;
            changes = changes.saturating_add(outcome.changes);
            notes.extend(outcome.notes);
        }

        FileTransform {
            content: current,
            changes,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::CustomRuleSpec;
    use crate::rule::{Rule, RuleOutcome};
    use pretty_assertions::assert_eq;

    fn next_ctx() -> RuleContext {
        RuleContext::new("next", "13.4.0", "14.0.0")
    }

    #[test]
    fn scenario_named_import() {
        let registry = RuleRegistry::with_defaults();
        let out = TransformPipeline::new(&registry).run(
            "pages/index.tsx",
            "import { useRouter } from 'next/router';",
            &next_ctx(),
        );
        assert!(out.content.contains("import { useRouter } from 'next/navigation';"));
        assert_eq!(out.changes, 1);
        assert_eq!(
            out.notes,
            vec!["Switched useRouter import to next/navigation (App Router)."]
        );
    }

    #[test]
    fn second_pass_is_identical() {
        let registry = RuleRegistry::with_defaults();
        let pipeline = TransformPipeline::new(&registry);
        let src = "import Router from 'next/router';\nimport { useRouter } from 'next/router';\nimport Image from 'next/legacy/image';\n";
        let first = pipeline.run("a.tsx", src, &next_ctx());
        assert_eq!(first.changes, 3);

        let second = pipeline.run("a.tsx", &first.content, &next_ctx());
        assert_eq!(second.content, first.content);
        assert_eq!(second.changes, 0);
    }

    #[test]
    fn later_rules_see_earlier_output() {
        let mut registry = RuleRegistry::with_defaults();
        registry.register_custom(CustomRuleSpec::new(
            "nav-to-compat",
            "next/navigation",
            "next/compat/navigation",
        ));
        let out = TransformPipeline::new(&registry).run(
            "a.ts",
            "import { useRouter } from 'next/router';",
            &next_ctx(),
        );
        assert_eq!(out.content, "import { useRouter } from 'next/compat/navigation';");
        assert_eq!(out.changes, 2);
        assert_eq!(out.notes[1], "Custom rule applied: nav-to-compat");
    }

    #[test]
    fn bad_custom_rule_does_not_stop_later_rules() {
        let mut registry = RuleRegistry::with_defaults();
        registry.register_custom(CustomRuleSpec::new("bad", "[", "x"));
        registry.register_custom(CustomRuleSpec::new("good", "foo", "bar"));
        let out = TransformPipeline::new(&registry).run("a.ts", "foo", &next_ctx());
        assert_eq!(out.content, "bar");
        assert_eq!(out.changes, 1);
        assert!(out.notes[0].starts_with("Custom rule error (bad)"));
        assert_eq!(out.notes[1], "Custom rule applied: good");
    }

    #[test]
    fn unrelated_package_makes_no_changes() {
        let registry = RuleRegistry::with_defaults();
        let ctx = RuleContext::new("typescript", "4.9", "5.0");
        let out = TransformPipeline::new(&registry).run(
            "a.ts",
            "import { useRouter } from 'next/router';",
            &ctx,
        );
        assert!(!out.is_change());
        assert!(out.notes.is_empty());
    }

    #[derive(Debug)]
    struct CountsTwice;

    impl Rule for CountsTwice {
        fn name(&self) -> &str {
            "counts-twice"
        }
        fn description(&self) -> &str {
            "test"
        }
        fn applicable(&self, _: &str, _: &str, _: &RuleContext) -> bool {
            true
        }
        fn transform(&self, _: &str, content: &str, _: &RuleContext) -> RuleOutcome {
            RuleOutcome {
                content: content.to_string(),
                changes: 2,
                notes: vec!["claimed".into()],
                failed: false,
            }
        }
    }

    #[test]
    fn counts_are_summed_not_deduplicated() {
        let mut registry = RuleRegistry::new();
        registry.register_builtin(Box::new(CountsTwice));
        registry.register_builtin(Box::new(CountsTwice));
        let out = TransformPipeline::new(&registry).run("a.ts", "x", &next_ctx());
        assert_eq!(out.changes, 4);
        assert_eq!(out.notes.len(), 2);
        assert_eq!(out.content, "x");
    }
}
