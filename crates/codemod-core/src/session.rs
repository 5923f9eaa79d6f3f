//! Codemod session
//!
//! A [`CodemodSession`] owns everything one upgrade run needs: the loaded
//! repository snapshot and analysis artifact, compacted guidance, the rule
//! registry, the dry-run gate, the cached diff batch and the modified
//! snapshot produced by apply. Sessions share nothing, so any number may
//! coexist.
//!
//! # Invariants
//! - The original snapshot is never mutated; apply writes into a fresh copy
//! - Loading either input drops the cached diffs and the modified snapshot
//! - Apply re-runs the pipeline on current rules instead of replaying patches

use crate::config::CodemodConfig;
use crate::error::{CodemodError, PreconditionError, Result};
use crate::state::{validate_transition, SessionState};
use codemod_artifact::{AnalysisArtifact, ChangeRecord, DiffGenerator, RepositorySnapshot};
use codemod_retrieval::{
    framework_hint, query_or_empty, supplemental_query, GuidanceSource, NoGuidanceSource,
};
use codemod_rules::{
    insert_supplemental, CustomRuleSpec, FileSelector, Guidance, GuidanceCompactor, RuleContext,
    RuleRegistry, TransformPipeline,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate new random ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Result of loading a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub files: usize,
    pub label: String,
}

/// Result of loading an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub package: String,
    pub current_version: String,
    pub target_version: String,
    /// Guidance topic keys, in first-seen order
    pub topics: Vec<String>,
}

/// Preview of what a run would touch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub considering_files: Vec<String>,
    /// Rule names in application order; custom rules carry a `custom:` prefix
    pub rules: Vec<String>,
    pub guidance_hints: Guidance,
    pub dry_run: bool,
}

/// Summary of a generated diff batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub diff_count: usize,
    pub files_changed: Vec<String>,
    /// Leading records of the batch
    pub preview: Vec<ChangeRecord>,
}

/// Result of a successful apply
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplyReport {
    pub applied_files: Vec<String>,
    pub count: usize,
}

/// Result of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    pub written: PathBuf,
    pub files: usize,
}

/// One codemod run over one repository
#[derive(Debug)]
pub struct CodemodSession {
    id: SessionId,
    config: CodemodConfig,
    selector: FileSelector,
    compactor: GuidanceCompactor,
    diff_generator: DiffGenerator,
    guidance_source: Arc<dyn GuidanceSource>,
    registry: RuleRegistry,
    repository: Option<RepositorySnapshot>,
    artifact: Option<AnalysisArtifact>,
    guidance: Guidance,
    dry_run: bool,
    diffs: Vec<ChangeRecord>,
    modified: Option<RepositorySnapshot>,
    state: SessionState,
}

impl Default for CodemodSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CodemodSession {
    /// Create session with default configuration and no guidance backend
    #[must_use]
    pub fn new() -> Self {
        let config = CodemodConfig::default();
        Self {
            id: SessionId::new(),
            selector: FileSelector::default(),
            compactor: config.compactor(),
            diff_generator: config.diff_generator(),
            guidance_source: Arc::new(NoGuidanceSource),
            registry: RuleRegistry::with_defaults(),
            repository: None,
            artifact: None,
            guidance: Guidance::new(),
            dry_run: config.dry_run,
            diffs: Vec::new(),
            modified: None,
            state: SessionState::Empty,
            config,
        }
    }

    /// Create session from configuration
    ///
    /// # Errors
    /// Returns error if the configuration is invalid
    pub fn with_config(config: CodemodConfig) -> Result<Self> {
        config.validate()?;
        let selector = config.selector()?;
        Ok(Self {
            selector,
            compactor: config.compactor(),
            diff_generator: config.diff_generator(),
            dry_run: config.dry_run,
            config,
            ..Self::new()
        })
    }

    /// With guidance backend
    #[must_use]
    pub fn with_guidance_source(mut self, source: Arc<dyn GuidanceSource>) -> Self {
        self.guidance_source = source;
        self
    }

    /// Session identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &CodemodConfig {
        &self.config
    }

    /// Rule registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Original repository snapshot
    #[inline]
    #[must_use]
    pub fn repository(&self) -> Option<&RepositorySnapshot> {
        self.repository.as_ref()
    }

    /// Snapshot produced by the last apply
    #[inline]
    #[must_use]
    pub fn modified_repository(&self) -> Option<&RepositorySnapshot> {
        self.modified.as_ref()
    }

    /// Loaded analysis artifact
    #[inline]
    #[must_use]
    pub fn artifact(&self) -> Option<&AnalysisArtifact> {
        self.artifact.as_ref()
    }

    /// Compacted guidance for the loaded artifact
    #[inline]
    #[must_use]
    pub fn guidance(&self) -> &Guidance {
        &self.guidance
    }

    /// Cached diff batch
    #[inline]
    #[must_use]
    pub fn diffs(&self) -> &[ChangeRecord] {
        &self.diffs
    }

    /// Dry-run gate
    #[inline]
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Set the dry-run gate; consulted only by [`CodemodSession::apply`]
    pub fn set_dry_run(&mut self, dry_run: bool) {
        tracing::info!("Session {} dry_run = {}", self.id, dry_run);
        self.dry_run = dry_run;
    }

    /// Parse and load a repository payload
    ///
    /// # Errors
    /// Returns error if the payload is malformed; the session is unchanged
    pub fn load_repository(&mut self, payload: &str) -> Result<RepositorySummary> {
        let snapshot = RepositorySnapshot::from_json(payload)?;
        Ok(self.load_repository_snapshot(snapshot))
    }

    /// Load an already-built snapshot
    pub fn load_repository_snapshot(&mut self, snapshot: RepositorySnapshot) -> RepositorySummary {
        let summary = RepositorySummary {
            files: snapshot.len(),
            label: snapshot.label().to_string(),
        };
        tracing::info!("Loaded repository '{}' with {} files", summary.label, summary.files);
        self.repository = Some(snapshot);
        self.after_load();
        summary
    }

    /// Parse and load an analysis artifact, harvesting its guidance
    ///
    /// # Errors
    /// Returns error if the payload is malformed; the session is unchanged
    pub fn load_artifact(&mut self, payload: &str) -> Result<ArtifactSummary> {
        let artifact = AnalysisArtifact::from_json(payload)?;
        Ok(self.load_analysis_artifact(artifact))
    }

    /// Load an already-parsed artifact
    pub fn load_analysis_artifact(&mut self, artifact: AnalysisArtifact) -> ArtifactSummary {
        self.guidance = self.harvest_guidance(&artifact);
        let summary = ArtifactSummary {
            package: artifact.package_name.clone(),
            current_version: artifact.current_version.clone(),
            target_version: artifact.target_version.clone(),
            topics: self.guidance.keys().cloned().collect(),
        };
        tracing::info!(
            "Loaded artifact for {} {} -> {} ({} guidance topics)",
            summary.package,
            summary.current_version,
            summary.target_version,
            summary.topics.len()
        );
        self.artifact = Some(artifact);
        self.after_load();
        summary
    }

    /// Parse and register a custom rule
    ///
    /// Returns the number of custom rules now registered.
    ///
    /// # Errors
    /// Returns error if the payload lacks `name`, `pattern` or `replacement`
    pub fn add_custom_rule(&mut self, payload: &str) -> Result<usize> {
        let spec = CustomRuleSpec::from_json(payload)?;
        Ok(self.add_custom_rule_spec(spec))
    }

    /// Register a custom rule after the built-ins and earlier custom rules
    pub fn add_custom_rule_spec(&mut self, spec: CustomRuleSpec) -> usize {
        tracing::info!("Added custom rule '{}'", spec.name);
        self.registry.register_custom(spec)
    }

    /// List candidate files, rules and guidance without transforming anything
    ///
    /// # Errors
    /// Returns a precondition error if either input is missing
    pub fn suggest_changes(&self) -> Result<Suggestion> {
        let (repository, artifact) = self.inputs()?;
        let considering_files = self
            .selector
            .candidates(repository, &artifact.prioritized_files, self.config.candidate_cap)
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Suggestion {
            considering_files,
            rules: self.registry.names(),
            guidance_hints: self.guidance.clone(),
            dry_run: self.dry_run,
        })
    }

    /// Run the pipeline over every eligible file and cache the diff batch
    ///
    /// Never mutates a snapshot and behaves the same whatever the dry-run
    /// gate says. Each call recomputes the batch from scratch.
    ///
    /// # Errors
    /// Returns a precondition error if either input is missing
    pub fn generate_diffs(&mut self) -> Result<DiffSummary> {
        let (repository, artifact) = self.inputs()?;
        let ctx = self.rule_context(artifact);
        let pipeline = TransformPipeline::new(&self.registry);

        let mut diffs = Vec::new();
        for path in self.selector.select(repository, &artifact.prioritized_files) {
            let before = repository.get(path).unwrap_or_default();
            let out = pipeline.run(path, before, &ctx);
            if let Some(record) =
                self.diff_generator
                    .record(path, before, &out.content, out.changes, out.notes)
            {
                diffs.push(record);
            }
        }

        self.transition(SessionState::Previewed)?;
        tracing::info!("Generated {} diffs", diffs.len());
        self.diffs = diffs;
        Ok(self.diff_summary())
    }

    /// Summary of the cached diff batch
    #[must_use]
    pub fn diff_summary(&self) -> DiffSummary {
        DiffSummary {
            diff_count: self.diffs.len(),
            files_changed: self.diffs.iter().map(|d| d.file.clone()).collect(),
            preview: self
                .diffs
                .iter()
                .take(self.config.preview_limit)
                .cloned()
                .collect(),
        }
    }

    /// Commit the cached diff batch into a copy of the original snapshot
    ///
    /// Every path in the batch is re-transformed with the current rules; the
    /// cached patch text is not replayed.
    ///
    /// # Errors
    /// - [`PreconditionError::DryRunEnabled`] while dry-run is on (checked first)
    /// - [`PreconditionError::NoDiffs`] when no non-empty batch is cached
    pub fn apply(&mut self) -> Result<ApplyReport> {
        if self.dry_run {
            return Err(PreconditionError::DryRunEnabled.into());
        }
        if self.diffs.is_empty() {
            return Err(PreconditionError::NoDiffs.into());
        }
        let (repository, artifact) = self.inputs()?;
        let ctx = self.rule_context(artifact);
        let pipeline = TransformPipeline::new(&self.registry);

        let mut copy = repository.clone();
        let mut applied_files = Vec::new();
        for record in &self.diffs {
            let Some(before) = repository.get(&record.file) else {
                continue;
            };
            let out = pipeline.run(&record.file, before, &ctx);
            if out.content != before {
                copy.set_content(&record.file, out.content);
                applied_files.push(record.file.clone());
            }
        }

        self.transition(SessionState::Applied)?;
        tracing::info!("Applied changes to {} files", applied_files.len());
        self.modified = Some(copy);
        Ok(ApplyReport {
            count: applied_files.len(),
            applied_files,
        })
    }

    /// Write the modified snapshot (or the original, if nothing was applied) as JSON
    ///
    /// `path` defaults to the configured export path.
    ///
    /// # Errors
    /// Returns error if no repository is loaded or the file cannot be written
    pub fn export(&self, path: Option<&Path>) -> Result<ExportReport> {
        let snapshot = self
            .modified
            .as_ref()
            .or(self.repository.as_ref())
            .ok_or(PreconditionError::RepositoryNotLoaded)?;
        let path = path.unwrap_or(self.config.export_path.as_path());
        let json = snapshot.to_json_pretty()?;
        std::fs::write(path, json).map_err(|source| CodemodError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Exported {} files to {}", snapshot.len(), path.display());
        Ok(ExportReport {
            written: path.to_path_buf(),
            files: snapshot.len(),
        })
    }

    fn inputs(&self) -> Result<(&RepositorySnapshot, &AnalysisArtifact)> {
        let repository = self
            .repository
            .as_ref()
            .ok_or(PreconditionError::RepositoryNotLoaded)?;
        let artifact = self
            .artifact
            .as_ref()
            .ok_or(PreconditionError::ArtifactNotLoaded)?;
        Ok((repository, artifact))
    }

    fn rule_context(&self, artifact: &AnalysisArtifact) -> RuleContext {
        RuleContext::from_artifact(artifact, self.guidance.clone())
    }

    fn harvest_guidance(&self, artifact: &AnalysisArtifact) -> Guidance {
        let mut guidance = self.compactor.compact(&artifact.guidance_entries);
        if artifact.package_name.is_empty() || artifact.target_version.is_empty() {
            return guidance;
        }
        let query = supplemental_query(
            &artifact.package_name,
            &artifact.current_version,
            &artifact.target_version,
        );
        let matches = query_or_empty(
            self.guidance_source.as_ref(),
            &query,
            self.config.supplemental_top_k,
            framework_hint(&artifact.package_name),
        );
        if !matches.is_empty() {
            insert_supplemental(&mut guidance, matches.iter().map(|m| m.url.as_str()));
        }
        guidance
    }

    fn after_load(&mut self) {
        self.diffs.clear();
        self.modified = None;
        let next = if self.repository.is_some() && self.artifact.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Empty
        };
        // loads are legal from every state
        self.state = next;
    }

    fn transition(&mut self, to: SessionState) -> Result<()> {
        validate_transition(self.state, to)?;
        tracing::debug!("Session {}: {} -> {}", self.id, self.state, to);
        self.state = to;
        Ok(())
    }
}
