//! JSON control surface
//!
//! String-in, JSON-out wrappers over a [`CodemodSession`]. Every operation
//! answers with an object carrying `"status": "ok"` plus its payload fields,
//! or `"status": "error"` with `code` and `message`. Nothing here panics or
//! propagates errors: a failed call leaves the session usable.

use crate::error::CodemodError;
use crate::session::CodemodSession;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::path::Path;

/// Strings accepted as `true` by [`parse_flag`], compared case-insensitively
pub const TRUTHY: [&str; 5] = ["1", "true", "yes", "y", "on"];

/// Interpret a flag string; anything not in [`TRUTHY`] is `false`
#[must_use]
pub fn parse_flag(flag: &str) -> bool {
    let flag = flag.trim().to_ascii_lowercase();
    TRUTHY.contains(&flag.as_str())
}

fn ok_payload<T: Serialize>(payload: &T) -> Value {
    let mut map = Map::new();
    map.insert("status".to_string(), Value::from("ok"));
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => map.extend(fields),
        Ok(other) => {
            map.insert("result".to_string(), other);
        }
        Err(e) => return error_payload("serialization", &e.to_string()),
    }
    Value::Object(map)
}

fn error_payload(code: &str, message: &str) -> Value {
    json!({ "status": "error", "code": code, "message": message })
}

fn respond<T: Serialize>(result: Result<T, CodemodError>) -> Value {
    match result {
        Ok(payload) => ok_payload(&payload),
        Err(e) => {
            tracing::warn!("Operation failed ({}): {}", e.code(), e);
            error_payload(e.code(), &e.to_string())
        }
    }
}

/// Whether a response reports success
#[must_use]
pub fn is_ok(response: &Value) -> bool {
    response.get("status").and_then(Value::as_str) == Some("ok")
}

/// JSON front-end for one session
#[derive(Debug, Default)]
pub struct ControlSurface {
    session: CodemodSession,
}

impl ControlSurface {
    /// Wrap a session
    #[inline]
    #[must_use]
    pub fn new(session: CodemodSession) -> Self {
        Self { session }
    }

    /// Underlying session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &CodemodSession {
        &self.session
    }

    /// Unwrap the session
    #[inline]
    #[must_use]
    pub fn into_session(self) -> CodemodSession {
        self.session
    }

    /// `{"status","files","label"}`
    pub fn load_repository(&mut self, payload: &str) -> Value {
        respond(self.session.load_repository(payload))
    }

    /// `{"status","package","current_version","target_version","topics"}`
    pub fn load_artifact(&mut self, payload: &str) -> Value {
        respond(self.session.load_artifact(payload))
    }

    /// `{"status","dry_run"}`
    pub fn set_dry_run(&mut self, flag: &str) -> Value {
        self.session.set_dry_run(parse_flag(flag));
        json!({ "status": "ok", "dry_run": self.session.dry_run() })
    }

    /// `{"status","custom_rules"}`
    pub fn add_custom_rule(&mut self, payload: &str) -> Value {
        respond(
            self.session
                .add_custom_rule(payload)
                .map(|count| json!({ "custom_rules": count })),
        )
    }

    /// `{"status","considering_files","rules","guidance_hints","dry_run"}`
    #[must_use]
    pub fn suggest_changes(&self) -> Value {
        respond(self.session.suggest_changes())
    }

    /// `{"status","diff_count","files_changed","preview"}`
    pub fn generate_diffs(&mut self) -> Value {
        respond(self.session.generate_diffs())
    }

    /// `{"status","applied_files","count"}`
    pub fn apply(&mut self) -> Value {
        respond(self.session.apply())
    }

    /// `{"status","written","files"}`; a blank path means the configured default
    #[must_use]
    pub fn export(&self, path: &str) -> Value {
        let path = path.trim();
        let path = (!path.is_empty()).then(|| Path::new(path));
        respond(self.session.export(path))
    }

    /// Load both inputs, set dry-run, suggest, generate, and apply unless dry
    ///
    /// Returns the generate-diffs payload. A failed load is returned as is
    /// and stops the chain. When apply runs, its payload is attached under
    /// `apply`.
    pub fn full_codemod(&mut self, repository: &str, artifact: &str, dry_run: &str) -> Value {
        let loaded = self.load_repository(repository);
        if !is_ok(&loaded) {
            return loaded;
        }
        let loaded = self.load_artifact(artifact);
        if !is_ok(&loaded) {
            return loaded;
        }
        self.set_dry_run(dry_run);

        let suggestion = self.suggest_changes();
        if let Some(files) = suggestion.get("considering_files").and_then(Value::as_array) {
            tracing::info!("Considering {} files", files.len());
        }

        let mut diffs = self.generate_diffs();
        if !self.session.dry_run() && is_ok(&diffs) {
            let applied = self.apply();
            if let Value::Object(map) = &mut diffs {
                map.insert("apply".to_string(), applied);
            }
        }
        diffs
    }
}
