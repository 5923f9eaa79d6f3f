//! Codemod Rule Engine
//!
//! Rules, their registry, the per-file transform pipeline, and file selection.
//!
//! # Core Concepts
//!
//! - [`Rule`]: applicability predicate plus a pure transform
//! - [`RuleRegistry`]: built-in rules in fixed order, then custom rules
//! - [`TransformPipeline`]: folds the registry over one file's evolving content
//! - [`FileSelector`]: two-tier eligibility (prioritized paths, else code files)
//! - [`GuidanceCompactor`]: topic -> {urls, hints} map exposed via [`RuleContext`]
//!
//! # Example
//!
//! ```rust,ignore
//! use codemod_rules::{RuleContext, RuleRegistry, TransformPipeline};
//!
//! let registry = RuleRegistry::with_defaults();
//! let ctx = RuleContext::new("next", "13.4.0", "14.0.0");
//! let out = TransformPipeline::new(&registry).run("app/page.tsx", source, &ctx);
//! assert!(out.is_change());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod builtin;
mod context;
mod custom;
mod error;
mod pipeline;
mod registry;
mod rule;
mod selector;

pub use builtin::{
    builtin_rules, is_next_config, NextConfigExperimentalNote, NextLegacyImage,
    NextRouterDefaultImportWarning, NextRouterNamedImport, ReactCreateRootNote,
    NEXT_CONFIG_MARKER, NEXT_MIGRATE_MARKER, REACT_MIGRATE_MARKER,
};
pub use context::{
    insert_supplemental, Guidance, GuidanceCompactor, GuidanceTopic, RuleContext,
    DEFAULT_HINT_VOCABULARY, SUPPLEMENTAL_HINTS, SUPPLEMENTAL_TOPIC,
};
pub use custom::{CustomRule, CustomRuleSpec};
pub use error::RuleError;
pub use pipeline::{FileTransform, TransformPipeline};
pub use registry::{RuleRegistry, CUSTOM_PREFIX};
pub use rule::{Rule, RuleOutcome};
pub use selector::{FileSelector, CODE_EXTENSIONS, CONFIG_FILE_PATTERN};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
