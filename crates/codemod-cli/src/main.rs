//! `codemod` command-line driver
//!
//! Loads a repository snapshot and an analysis artifact from disk, runs one
//! session operation and prints the result, either as text or as the JSON
//! control-surface payload.

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use codemod_core::{is_ok, CodemodConfig, CodemodSession, ControlSurface};
use codemod_retrieval::StaticGuidanceSource;
use codemod_rules::CustomRuleSpec;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn session_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("repo")
            .long("repo")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Repository snapshot JSON ({files: [{path, content}], label?})"),
    )
    .arg(
        Arg::new("artifact")
            .long("artifact")
            .required(true)
            .value_parser(clap::value_parser!(PathBuf))
            .help("Analysis artifact JSON"),
    )
    .arg(
        Arg::new("rule")
            .long("rule")
            .action(ArgAction::Append)
            .value_parser(clap::value_parser!(PathBuf))
            .help("JSON file holding a custom rule or a list of rules (repeatable)"),
    )
    .arg(
        Arg::new("config")
            .long("config")
            .value_parser(clap::value_parser!(PathBuf))
            .help("TOML configuration file"),
    )
    .arg(
        Arg::new("guidance")
            .long("guidance")
            .value_parser(clap::value_parser!(PathBuf))
            .help("JSON list of retrieval matches used for the supplemental query"),
    )
    .arg(
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Keep dry-run on; apply is refused"),
    )
    .arg(
        Arg::new("out")
            .long("out")
            .value_parser(clap::value_parser!(PathBuf))
            .help("Export destination for the modified snapshot"),
    )
    .arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print the structured JSON payload"),
    )
}

fn cli() -> Command {
    Command::new("codemod")
        .version(codemod_core::VERSION)
        .about("Deterministic text codemods for JS/TS dependency upgrades")
        .subcommand_required(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(session_args(
            Command::new("suggest").about("List candidate files, rules and guidance hints"),
        ))
        .subcommand(session_args(
            Command::new("diff").about("Generate diffs without touching the snapshot"),
        ))
        .subcommand(session_args(
            Command::new("apply").about("Generate diffs, apply them and export the result"),
        ))
        .subcommand(session_args(
            Command::new("run").about("Load, suggest, diff and apply in one step"),
        ))
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Custom rules in a file: one rule object or a list of them
fn read_rules(path: &Path) -> Result<Vec<CustomRuleSpec>> {
    let text = read(path)?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let entries = match value {
        Value::Array(entries) => entries,
        other => vec![other],
    };
    entries
        .iter()
        .map(|entry| {
            CustomRuleSpec::from_value(entry)
                .with_context(|| format!("invalid rule in {}", path.display()))
        })
        .collect()
}

/// Session configured from the shared arguments, inputs not yet loaded
fn build_session(args: &ArgMatches) -> Result<CodemodSession> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => CodemodConfig::from_file(path)?,
        None => CodemodConfig::default(),
    };
    let mut session = CodemodSession::with_config(config)?;
    if let Some(path) = args.get_one::<PathBuf>("guidance") {
        let source = StaticGuidanceSource::from_json(&read(path)?)
            .with_context(|| format!("invalid guidance file {}", path.display()))?;
        session = session.with_guidance_source(Arc::new(source));
    }
    for path in args.get_many::<PathBuf>("rule").into_iter().flatten() {
        for spec in read_rules(path)? {
            session.add_custom_rule_spec(spec);
        }
    }
    Ok(session)
}

fn print_payload(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_patches(session: &CodemodSession) {
    for record in session.diffs() {
        println!(
            "# {} ({} changes, {} -> {})",
            record.file, record.changes, record.before_hash, record.after_hash
        );
        for note in &record.notes {
            println!("#   {note}");
        }
        print!("{}", record.patch);
    }
}

fn suggest(args: &ArgMatches, repo: &str, artifact: &str) -> Result<()> {
    let mut session = build_session(args)?;
    session.load_repository(repo)?;
    session.load_artifact(artifact)?;
    let suggestion = session.suggest_changes()?;
    if args.get_flag("json") {
        return print_payload(&serde_json::to_value(&suggestion)?);
    }
    println!("Rules: {}", suggestion.rules.join(", "));
    println!("Considering {} files:", suggestion.considering_files.len());
    for file in &suggestion.considering_files {
        println!("  {file}");
    }
    for (topic, guidance) in &suggestion.guidance_hints {
        let hints: Vec<&str> = guidance.hints.iter().map(String::as_str).collect();
        println!("Guidance [{topic}]: {}", hints.join(", "));
    }
    Ok(())
}

fn diff(args: &ArgMatches, repo: &str, artifact: &str) -> Result<()> {
    let mut session = build_session(args)?;
    session.load_repository(repo)?;
    session.load_artifact(artifact)?;
    let summary = session.generate_diffs()?;
    if args.get_flag("json") {
        return print_payload(&serde_json::to_value(&summary)?);
    }
    print_patches(&session);
    tracing::info!("{} files would change", summary.diff_count);
    Ok(())
}

fn apply(args: &ArgMatches, repo: &str, artifact: &str) -> Result<()> {
    let mut session = build_session(args)?;
    session.load_repository(repo)?;
    session.load_artifact(artifact)?;
    session.set_dry_run(args.get_flag("dry-run"));
    session.generate_diffs()?;
    let report = session.apply()?;
    let exported = session.export(args.get_one::<PathBuf>("out").map(PathBuf::as_path))?;
    if args.get_flag("json") {
        return print_payload(&serde_json::json!({
            "apply": report,
            "export": exported,
        }));
    }
    for file in &report.applied_files {
        println!("applied {file}");
    }
    println!(
        "Wrote {} files to {}",
        exported.files,
        exported.written.display()
    );
    Ok(())
}

fn run(args: &ArgMatches, repo: &str, artifact: &str) -> Result<()> {
    let dry_run = if args.get_flag("dry-run") { "true" } else { "false" };
    let mut surface = ControlSurface::new(build_session(args)?);
    let mut response = surface.full_codemod(repo, artifact, dry_run);
    if !is_ok(&response) {
        print_payload(&response)?;
        bail!("codemod failed");
    }
    let applied = response.get("apply").is_some_and(is_ok);
    if applied {
        let out = args
            .get_one::<PathBuf>("out")
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let exported = surface.export(&out);
        if let Value::Object(map) = &mut response {
            map.insert("export".to_string(), exported);
        }
    }
    if args.get_flag("json") {
        return print_payload(&response);
    }
    print_patches(surface.session());
    println!(
        "{} files changed{}",
        surface.session().diffs().len(),
        if applied { ", applied" } else { " (dry run)" }
    );
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let Some((name, args)) = matches.subcommand() else {
        bail!("no subcommand given");
    };
    let (Some(repo), Some(artifact)) = (
        args.get_one::<PathBuf>("repo"),
        args.get_one::<PathBuf>("artifact"),
    ) else {
        bail!("--repo and --artifact are required");
    };
    let repo = read(repo)?;
    let artifact = read(artifact)?;

    match name {
        "suggest" => suggest(args, &repo, &artifact),
        "diff" => diff(args, &repo, &artifact),
        "apply" => apply(args, &repo, &artifact),
        "run" => run(args, &repo, &artifact),
        other => bail!("unknown subcommand '{other}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codemod_test_utils::{next_artifact_json, next_repo_json};
    use pretty_assertions::assert_eq;

    fn matches_for(argv: &[&str]) -> ArgMatches {
        let matches = cli().try_get_matches_from(argv).unwrap();
        let (_, args) = matches.subcommand().unwrap();
        args.clone()
    }

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn repo_and_artifact_are_required() {
        assert!(cli().try_get_matches_from(["codemod", "diff"]).is_err());
        assert!(cli()
            .try_get_matches_from(["codemod", "diff", "--repo", "r.json", "--artifact", "a.json"])
            .is_ok());
    }

    #[test]
    fn rule_file_may_hold_one_rule_or_a_list() {
        let dir = tempfile::tempdir().unwrap();
        let single = dir.path().join("single.json");
        std::fs::write(&single, r#"{"name":"r1","pattern":"a","replacement":"b"}"#).unwrap();
        let list = dir.path().join("list.json");
        std::fs::write(
            &list,
            r#"[{"name":"r1","pattern":"a","replacement":"b"},{"name":"r2","pattern":"c","replacement":"d"}]"#,
        )
        .unwrap();

        assert_eq!(read_rules(&single).unwrap().len(), 1);
        let names: Vec<_> = read_rules(&list).unwrap().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["r1", "r2"]);
    }

    #[test]
    fn bad_rule_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"name":"r1"}"#).unwrap();
        let err = read_rules(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }

    #[test]
    fn session_picks_up_rules_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let rule = dir.path().join("rule.json");
        std::fs::write(&rule, r#"{"name":"rename","pattern":"add","replacement":"sum"}"#).unwrap();
        let config = dir.path().join("codemod.toml");
        std::fs::write(&config, "preview_limit = 1\n").unwrap();

        let args = matches_for(&[
            "codemod",
            "diff",
            "--repo",
            "r.json",
            "--artifact",
            "a.json",
            "--rule",
            rule.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ]);
        let mut session = build_session(&args).unwrap();
        assert_eq!(session.config().preview_limit, 1);
        assert!(session.registry().names().contains(&"custom:rename".to_string()));

        session.load_repository(&next_repo_json()).unwrap();
        session.load_artifact(&next_artifact_json()).unwrap();
        let summary = session.generate_diffs().unwrap();
        assert_eq!(summary.preview.len(), 1);
        assert!(summary.files_changed.iter().any(|f| f == "lib/math.ts"));
    }
}
