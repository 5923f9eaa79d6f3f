//! Rule registry
//!
//! Provides [`RuleRegistry`]: built-in rules in their fixed order followed by
//! custom rules in registration order. Iteration order is the application
//! order.

use crate::builtin::builtin_rules;
use crate::custom::{CustomRule, CustomRuleSpec};
use crate::rule::Rule;

/// Prefix used when listing custom rule names
pub const CUSTOM_PREFIX: &str = "custom:";

/// Ordered rule list
#[derive(Debug, Default)]
pub struct RuleRegistry {
    builtins: Vec<Box<dyn Rule>>,
    custom: Vec<CustomRule>,
}

impl RuleRegistry {
    /// Create registry with no rules
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with the built-in catalogue
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            builtins: builtin_rules(),
            custom: Vec::new(),
        }
    }

    /// Append a built-in style rule after the existing built-ins
    #[cfg(test)]
    pub(crate) fn register_builtin(&mut self, rule: Box<dyn Rule>) {
        self.builtins.push(rule);
    }

    /// Append a custom rule; returns the number of custom rules
    pub fn register_custom(&mut self, spec: CustomRuleSpec) -> usize {
        tracing::debug!("Registering custom rule '{}'", spec.name);
        self.custom.push(CustomRule::new(spec));
        self.custom.len()
    }

    /// Rules in application order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Rule> {
        let builtins = self.builtins.iter().map(|r| r.as_ref() as &dyn Rule);
        let custom = self.custom.iter().map(|r| r as &dyn Rule);
        builtins.chain(custom)
    }

    /// Rule names, custom ones prefixed with [`CUSTOM_PREFIX`]
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.builtins
            .iter()
            .map(|r| r.name().to_string())
            .chain(
                self.custom
                    .iter()
                    .map(|r| format!("{CUSTOM_PREFIX}{}", r.spec().name)),
            )
            .collect()
    }

    /// Total number of rules
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.builtins.len() + self.custom.len()
    }

    /// Whether no rules are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_new_empty() {
        let registry = RuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn registry_with_defaults() {
        let registry = RuleRegistry::with_defaults();
        assert_eq!(registry.len(), 5);
        assert!(registry.names().iter().all(|n| !n.starts_with(CUSTOM_PREFIX)));
    }

    #[test]
    fn custom_rules_follow_builtins() {
        let mut registry = RuleRegistry::with_defaults();
        assert_eq!(registry.register_custom(CustomRuleSpec::new("r1", "a", "b")), 1);
        assert_eq!(registry.register_custom(CustomRuleSpec::new("r2", "b", "c")), 2);

        let order: Vec<_> = registry.iter().map(|r| r.name().to_string()).collect();
        assert_eq!(order.len(), 7);
        assert_eq!(order[5], "r1");
        assert_eq!(order[6], "r2");

        let names = registry.names();
        assert_eq!(names[0], "next-router-named-import");
        assert_eq!(names[5], "custom:r1");
        assert_eq!(names[6], "custom:r2");
    }
}
