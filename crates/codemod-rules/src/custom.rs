//! User-supplied pattern rules
//!
//! A custom rule is `{name, pattern, replacement}`. The pattern is a regex
//! compiled in multiline mode. The replacement is literal text except for
//! backslash escapes: `\1`..`\99` and `\g<1>` / `\g<name>` insert capture
//! groups, `\n` `\t` `\r` are control characters and `\\` is a backslash.
//! A `$` is always literal, so template literals such as `${API}` survive.

use crate::context::RuleContext;
use crate::error::RuleError;
use crate::rule::{Rule, RuleOutcome};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Custom rule payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomRuleSpec {
    /// Rule name
    pub name: String,
    /// Search pattern
    pub pattern: String,
    /// Replacement text
    pub replacement: String,
}

impl CustomRuleSpec {
    /// Create spec
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// Parse and validate the payload
    ///
    /// The pattern itself is not validated here: a pattern that does not
    /// compile is reported per file when the rule runs.
    ///
    /// # Errors
    /// - [`RuleError::InvalidPayload`] for malformed JSON or a non-object
    /// - [`RuleError::MissingField`] when `name`, `pattern` or `replacement`
    ///   is absent or not a string
    pub fn from_json(payload: &str) -> Result<Self, RuleError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| RuleError::InvalidPayload(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed payload
    ///
    /// # Errors
    /// Same as [`CustomRuleSpec::from_json`]
    pub fn from_value(value: &Value) -> Result<Self, RuleError> {
        let Value::Object(map) = value else {
            return Err(RuleError::InvalidPayload("rule must be an object".to_string()));
        };
        let field = |key: &'static str| -> Result<String, RuleError> {
            map.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(RuleError::MissingField(key))
        };
        Ok(Self {
            name: field("name")?,
            pattern: field("pattern")?,
            replacement: field("replacement")?,
        })
    }
}

/// Registered custom rule
///
/// Compilation happens once at registration; a compile failure is kept and
/// surfaced as a note on every file the rule runs against.
#[derive(Debug, Clone)]
pub struct CustomRule {
    spec: CustomRuleSpec,
    compiled: Result<Regex, regex::Error>,
    /// Replacement rewritten into `regex` expansion syntax
    template: String,
}

fn push_group(out: &mut String, group: &str) {
    out.push_str("${");
    out.push_str(group);
    out.push('}');
}

/// Rewrite a backslash-style replacement into `regex` expansion syntax
///
/// Group references become `${..}`; every other `$` is doubled so the
/// expander emits it verbatim. Unknown escapes are kept as written.
#[must_use]
fn expansion_template(replacement: &str) -> String {
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut chars = replacement.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '$' => out.push_str("$$"),
            '\\' => match chars.peek().copied() {
                Some(d @ '1'..='9') => {
                    chars.next();
                    let mut group = String::from(d);
                    if let Some(e @ '0'..='9') = chars.peek().copied() {
                        chars.next();
                        group.push(e);
                    }
                    push_group(&mut out, &group);
                }
                Some('g') => {
                    let rest: String = chars.clone().collect();
                    let name = rest
                        .strip_prefix("g<")
                        .and_then(|r| r.split_once('>'))
                        .map(|(name, _)| name)
                        .filter(|name| {
                            !name.is_empty()
                                && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
                        });
                    match name {
                        Some(name) => {
                            // skip `g<name>`
                            for _ in 0..name.chars().count() + 3 {
                                chars.next();
                            }
                            push_group(&mut out, name);
                        }
                        None => out.push('\\'),
                    }
                }
                Some('n') => {
                    chars.next();
                    out.push('\n');
                }
                Some('t') => {
                    chars.next();
                    out.push('\t');
                }
                Some('r') => {
                    chars.next();
                    out.push('\r');
                }
                Some('\\') => {
                    chars.next();
                    out.push('\\');
                }
                _ => out.push('\\'),
            },
            other => out.push(other),
        }
    }
    out
}

impl CustomRule {
    /// Compile a rule from its spec
    #[must_use]
    pub fn new(spec: CustomRuleSpec) -> Self {
        let compiled = RegexBuilder::new(&spec.pattern).multi_line(true).build();
        if let Err(e) = &compiled {
            tracing::warn!("Custom rule '{}' has an invalid pattern: {}", spec.name, e);
        }
        let template = expansion_template(&spec.replacement);
        Self {
            spec,
            compiled,
            template,
        }
    }

    /// Underlying spec
    #[inline]
    #[must_use]
    pub fn spec(&self) -> &CustomRuleSpec {
        &self.spec
    }
}

impl From<CustomRuleSpec> for CustomRule {
    fn from(spec: CustomRuleSpec) -> Self {
        Self::new(spec)
    }
}

impl Rule for CustomRule {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn description(&self) -> &str {
        "User-supplied pattern replacement"
    }

    fn applicable(&self, _path: &str, _content: &str, _ctx: &RuleContext) -> bool {
        true
    }

    fn transform(&self, _path: &str, content: &str, _ctx: &RuleContext) -> RuleOutcome {
        let re = match &self.compiled {
            Ok(re) => re,
            Err(e) => {
                return RuleOutcome::failed(
                    content,
                    format!("Custom rule error ({}): {}", self.spec.name, e),
                )
            }
        };
        let new = re.replace_all(content, self.template.as_str());
        if new == content {
            RuleOutcome::unchanged(content)
        } else {
            RuleOutcome::changed(
                new.into_owned(),
                format!("Custom rule applied: {}", self.spec.name),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RuleContext {
        RuleContext::new("next", "13", "14")
    }

    #[test]
    fn spec_requires_all_fields() {
        let err = CustomRuleSpec::from_json(r#"{"name":"r1","pattern":"x"}"#).unwrap_err();
        assert!(matches!(err, RuleError::MissingField("replacement")));
        assert_eq!(
            err.to_string(),
            "rule must have name, pattern, replacement (missing 'replacement')"
        );
    }

    #[test]
    fn spec_rejects_non_string_field() {
        let err =
            CustomRuleSpec::from_json(r#"{"name":1,"pattern":"x","replacement":"y"}"#).unwrap_err();
        assert!(matches!(err, RuleError::MissingField("name")));
    }

    #[test]
    fn spec_rejects_bad_json_and_non_objects() {
        assert!(matches!(
            CustomRuleSpec::from_json("{nope"),
            Err(RuleError::InvalidPayload(_))
        ));
        assert!(matches!(
            CustomRuleSpec::from_json("[]"),
            Err(RuleError::InvalidPayload(_))
        ));
    }

    #[test]
    fn literal_replacement_then_noop() {
        let rule = CustomRule::new(CustomRuleSpec::new("r1", "from 'lib/foo'", "from 'lib/bar'"));
        let first = rule.transform("a.ts", "import x from 'lib/foo';\n", &ctx());
        assert_eq!(first.content, "import x from 'lib/bar';\n");
        assert_eq!(first.changes, 1);
        assert_eq!(first.notes, vec!["Custom rule applied: r1"]);

        let second = rule.transform("a.ts", &first.content, &ctx());
        assert_eq!(second.changes, 0);
        assert!(second.notes.is_empty());
    }

    #[test]
    fn capture_groups_are_substituted() {
        let rule = CustomRule::new(CustomRuleSpec::new(
            "swap",
            r"from '(\w+)/old'",
            r"from '\1/new'",
        ));
        let out = rule.transform("a.ts", "import a from 'pkg/old';", &ctx());
        assert_eq!(out.content, "import a from 'pkg/new';");
    }

    #[test]
    fn named_groups_use_g_syntax() {
        let rule = CustomRule::new(CustomRuleSpec::new(
            "swap",
            r"from '(?P<pkg>\w+)/old'",
            r"from '\g<pkg>/new' // \g<1>",
        ));
        let out = rule.transform("a.ts", "import a from 'pkg/old';", &ctx());
        assert_eq!(out.content, "import a from 'pkg/new' // pkg;");
    }

    #[test]
    fn dollar_signs_are_literal() {
        let rule = CustomRule::new(CustomRuleSpec::new(
            "api",
            r"fetch\('/api/users'\)",
            "fetch(`${API}/users`)",
        ));
        let out = rule.transform("a.ts", "fetch('/api/users')", &ctx());
        assert_eq!(out.content, "fetch(`${API}/users`)");

        let rule = CustomRule::new(CustomRuleSpec::new("store", "oldStore", "$store"));
        let out = rule.transform("a.ts", "x = oldStore;", &ctx());
        assert_eq!(out.content, "x = $store;");
        assert_eq!(out.changes, 1);
    }

    #[test]
    fn template_escapes() {
        assert_eq!(expansion_template(r"\1-\12"), "${1}-${12}");
        assert_eq!(expansion_template(r"$t(\g<key>)"), "$$t(${key})");
        assert_eq!(expansion_template(r"a\nb\\c"), "a\nb\\c");
        assert_eq!(expansion_template(r"\g<bad name>\q"), r"\g<bad name>\q");
        assert_eq!(expansion_template("plain"), "plain");
    }

    #[test]
    fn multiline_anchors_match_per_line() {
        let rule = CustomRule::new(CustomRuleSpec::new("strip", r"^// drop me$\n", ""));
        let out = rule.transform("a.ts", "a\n// drop me\nb\n", &ctx());
        assert_eq!(out.content, "a\nb\n");
    }

    #[test]
    fn invalid_pattern_fails_locally() {
        let rule = CustomRule::new(CustomRuleSpec::new("bad", "(unclosed", "x"));
        assert!(rule.compiled.is_err());
        let out = rule.transform("a.ts", "(unclosed", &ctx());
        assert!(out.failed);
        assert_eq!(out.content, "(unclosed");
        assert_eq!(out.changes, 0);
        assert!(out.notes[0].starts_with("Custom rule error (bad): "));
    }
}
