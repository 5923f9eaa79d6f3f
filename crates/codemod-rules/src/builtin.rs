//! Built-in rule catalogue
//!
//! Fixed at process start and always applied in this order:
//!
//! 1. [`NextRouterNamedImport`]
//! 2. [`NextRouterDefaultImportWarning`]
//! 3. [`NextLegacyImage`]
//! 4. [`NextConfigExperimentalNote`]
//! 5. [`ReactCreateRootNote`]
//!
//! Substitution rules stay idempotent because their patterns no longer match
//! rewritten code. Advisory rules prepend a comment block starting with a
//! unique marker and do nothing when the marker is already present.
//!
//! Matching is plain text: code inside strings or comments that looks like an
//! import will be rewritten too.

use crate::context::RuleContext;
use crate::rule::{Rule, RuleOutcome};
use crate::selector::CONFIG_FILE_PATTERN;
use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

// Patterns are literals; failing to compile is a programming error.
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern compiles")
}

static ROUTER_NAMED_IMPORT: Lazy<Regex> = Lazy::new(|| {
    compile(r#"import\s*\{\s*useRouter\s*\}\s*from\s*['"]next/router['"];?"#)
});
static ROUTER_DEFAULT_IMPORT: Lazy<Regex> =
    Lazy::new(|| compile(r#"import\s+Router\s+from\s+['"]next/router['"];?"#));
static LEGACY_IMAGE_IMPORT: Lazy<Regex> =
    Lazy::new(|| compile(r#"from\s+['"]next/legacy/image['"]"#));
static NEXT_CONFIG_PATH: Lazy<Regex> = Lazy::new(|| compile(CONFIG_FILE_PATTERN));
static REACT_DOM_RENDER: Lazy<Regex> = Lazy::new(|| compile(r"ReactDOM\.render\("));

/// Marker for [`NextRouterDefaultImportWarning`]
pub const NEXT_MIGRATE_MARKER: &str = "// TODO(next-migrate)";
/// Marker for [`NextConfigExperimentalNote`]
pub const NEXT_CONFIG_MARKER: &str = "// TODO(next-config)";
/// Marker for [`ReactCreateRootNote`]
pub const REACT_MIGRATE_MARKER: &str = "// TODO(react-migrate)";

pub(crate) fn config_path_regex() -> &'static Regex {
    &NEXT_CONFIG_PATH
}

/// Whether a path names a Next.js config file
#[must_use]
pub fn is_next_config(path: &str) -> bool {
    NEXT_CONFIG_PATH.is_match(path)
}

/// Every built-in rule, in application order
#[must_use]
pub fn builtin_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(NextRouterNamedImport),
        Box::new(NextRouterDefaultImportWarning),
        Box::new(NextLegacyImage),
        Box::new(NextConfigExperimentalNote),
        Box::new(ReactCreateRootNote),
    ]
}

fn substitute(re: &Regex, content: &str, replacement: &str, note: &str) -> RuleOutcome {
    let new = re.replace_all(content, NoExpand(replacement));
    if new == content {
        RuleOutcome::unchanged(content)
    } else {
        // one change per file, however many occurrences
        RuleOutcome::changed(new.into_owned(), note)
    }
}

fn prepend_advisory(content: &str, marker: &str, block: &str, note: String) -> RuleOutcome {
    if content.contains(marker) {
        return RuleOutcome::unchanged(content);
    }
    RuleOutcome::changed(format!("{block}{content}"), note)
}

/// `import { useRouter } from 'next/router'` -> `next/navigation`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextRouterNamedImport;

impl Rule for NextRouterNamedImport {
    fn name(&self) -> &str {
        "next-router-named-import"
    }

    fn description(&self) -> &str {
        "Replace `import { useRouter } from 'next/router'` with next/navigation."
    }

    fn applicable(&self, _path: &str, content: &str, ctx: &RuleContext) -> bool {
        ctx.package_starts_with("next") && ROUTER_NAMED_IMPORT.is_match(content)
    }

    fn transform(&self, _path: &str, content: &str, _ctx: &RuleContext) -> RuleOutcome {
        substitute(
            &ROUTER_NAMED_IMPORT,
            content,
            "import { useRouter } from 'next/navigation';",
            "Switched useRouter import to next/navigation (App Router).",
        )
    }
}

/// Flags the legacy default `Router` import for manual migration
#[derive(Debug, Clone, Copy, Default)]
pub struct NextRouterDefaultImportWarning;

impl Rule for NextRouterDefaultImportWarning {
    fn name(&self) -> &str {
        "next-router-default-import-warning"
    }

    fn description(&self) -> &str {
        "Flag default Router import and add TODO with suggested migration."
    }

    fn applicable(&self, _path: &str, content: &str, ctx: &RuleContext) -> bool {
        ctx.package_starts_with("next") && ROUTER_DEFAULT_IMPORT.is_match(content)
    }

    fn transform(&self, _path: &str, content: &str, _ctx: &RuleContext) -> RuleOutcome {
        let block = format!(
            "{NEXT_MIGRATE_MARKER}: `import Router from 'next/router'` is legacy (Pages Router).\n\
             // Consider refactoring to App Router APIs from 'next/navigation' (e.g., `useRouter`, `redirect`).\n"
        );
        prepend_advisory(
            content,
            NEXT_MIGRATE_MARKER,
            &block,
            "Annotated legacy default Router import; manual refactor recommended.".to_string(),
        )
    }
}

/// `next/legacy/image` -> `next/image`
#[derive(Debug, Clone, Copy, Default)]
pub struct NextLegacyImage;

impl Rule for NextLegacyImage {
    fn name(&self) -> &str {
        "next-legacy-image"
    }

    fn description(&self) -> &str {
        "Replace next/legacy/image with next/image."
    }

    fn applicable(&self, _path: &str, content: &str, ctx: &RuleContext) -> bool {
        ctx.package_starts_with("next") && LEGACY_IMAGE_IMPORT.is_match(content)
    }

    fn transform(&self, _path: &str, content: &str, _ctx: &RuleContext) -> RuleOutcome {
        substitute(
            &LEGACY_IMAGE_IMPORT,
            content,
            "from 'next/image'",
            "Replaced next/legacy/image with next/image.",
        )
    }
}

/// Notes experimental flags in `next.config.(m)js` against the target version
#[derive(Debug, Clone, Copy, Default)]
pub struct NextConfigExperimentalNote;

impl Rule for NextConfigExperimentalNote {
    fn name(&self) -> &str {
        "next-config-experimental-note"
    }

    fn description(&self) -> &str {
        "Add TODO note on experimental flags that commonly shift across versions."
    }

    fn applicable(&self, path: &str, _content: &str, ctx: &RuleContext) -> bool {
        ctx.package_starts_with("next") && is_next_config(path)
    }

    fn transform(&self, _path: &str, content: &str, ctx: &RuleContext) -> RuleOutcome {
        if !content.contains("experimental") {
            return RuleOutcome::unchanged(content);
        }
        let target = &ctx.target_version;
        let block = format!(
            "{NEXT_CONFIG_MARKER}: Check experimental flags against target version {target}. \
             Confirm replacements/renames in docs.\n"
        );
        prepend_advisory(
            content,
            NEXT_CONFIG_MARKER,
            &block,
            format!("Annotated experimental flags for Next {target}."),
        )
    }
}

/// Advises moving `ReactDOM.render` to `createRoot`
#[derive(Debug, Clone, Copy, Default)]
pub struct ReactCreateRootNote;

impl Rule for ReactCreateRootNote {
    fn name(&self) -> &str {
        "react-create-root-note"
    }

    fn description(&self) -> &str {
        "Advise migration to createRoot if applicable (comment)."
    }

    fn applicable(&self, _path: &str, content: &str, ctx: &RuleContext) -> bool {
        ctx.package_starts_with("react") && REACT_DOM_RENDER.is_match(content)
    }

    fn transform(&self, _path: &str, content: &str, _ctx: &RuleContext) -> RuleOutcome {
        let block = format!(
            "{REACT_MIGRATE_MARKER}: ReactDOM.render is legacy. Consider migrate to React 18 `createRoot` API.\n"
        );
        prepend_advisory(
            content,
            REACT_MIGRATE_MARKER,
            &block,
            "Annotated ReactDOM.render usage with createRoot guidance.".to_string(),
        )
    }
}
