//! Integration tests for ApplyCommand: resolution into the target MCP config.

use mcpm_core::commands::{ApplyCommand, ApplyMode, ApplyOptions};
use mcpm_core::confirm::FixedAnswer;
use mcpm_core::context::AppContext;
use mcpm_core::env::EnvMap;
use mcpm_core::error::ErrorKind;
use mcpm_core::settings::Settings;
use mcpm_core::template::TemplateSpec;
use serde_json::{Value, json};
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> EnvMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn setup() -> (TempDir, AppContext) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let settings = Settings {
        target: temp.path().join("project").join(".mcp.json"),
        ..Settings::default()
    };
    let ctx = AppContext::with_settings(temp.path().join("home"), settings);

    let templates = ctx.templates();
    templates
        .save_manual(
            &TemplateSpec::new("t1", "node")
                .with_args(["server.js"])
                .with_env(env(&[("A", "1"), ("B", "2")])),
            false,
            &FixedAnswer::NO,
        )
        .unwrap();
    templates
        .save_manual(
            &TemplateSpec::new("fs", "npx")
                .with_args(["-y", "@modelcontextprotocol/server-filesystem"])
                .with_transport_type("stdio"),
            false,
            &FixedAnswer::NO,
        )
        .unwrap();

    let profiles = ctx.profiles();
    profiles.create("dev", "").unwrap();
    profiles
        .add_server("dev", "t1", "app", env(&[("B", "20"), ("C", "30")]))
        .unwrap();
    profiles.add_server("dev", "fs", "", EnvMap::new()).unwrap();

    (temp, ctx)
}

fn read_json(path: &std::path::Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn apply_writes_resolved_servers_to_settings_target() {
    let (_temp, ctx) = setup();
    let cmd = ApplyCommand::new(ctx.clone());

    let report = cmd.execute(&ApplyOptions::new("dev")).unwrap();

    assert_eq!(report.target, ctx.settings().target);
    assert_eq!(report.servers, vec!["app", "fs"]);
    let written = read_json(&report.target);
    assert_eq!(
        written["mcpServers"]["app"],
        json!({
            "command": "node",
            "args": ["server.js"],
            "env": {"A": "1", "B": "20", "C": "30"}
        })
    );
    assert_eq!(written["mcpServers"]["fs"]["transportType"], "stdio");
}

#[test]
fn dangling_reference_fails_without_writing() {
    let (temp, ctx) = setup();
    ctx.profiles()
        .add_server("dev", "deleted-template", "gone", EnvMap::new())
        .unwrap();
    let target = temp.path().join("out.json");

    let err = ApplyCommand::new(ctx)
        .execute(&ApplyOptions::new("dev").with_target(&target))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    assert!(!target.exists());
}

#[test]
fn failed_apply_leaves_existing_target_untouched() {
    let (temp, ctx) = setup();
    let target = temp.path().join("existing.json");
    let original = r#"{"mcpServers": {"keep": {"command": "x"}}}"#;
    std::fs::write(&target, original).unwrap();
    ctx.profiles()
        .add_server("dev", "missing", "", EnvMap::new())
        .unwrap();

    let result = ApplyCommand::new(ctx).execute(&ApplyOptions::new("dev").with_target(&target));

    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), original);
}

#[test]
fn replace_mode_drops_existing_servers_but_keeps_other_fields() {
    let (temp, ctx) = setup();
    let target = temp.path().join("claude.json");
    std::fs::write(
        &target,
        r#"{"numStartups": 4, "mcpServers": {"legacy": {"command": "old"}}}"#,
    )
    .unwrap();

    ApplyCommand::new(ctx)
        .execute(&ApplyOptions::new("dev").with_target(&target))
        .unwrap();

    let written = read_json(&target);
    assert_eq!(written["numStartups"], 4);
    assert!(written["mcpServers"].get("legacy").is_none());
    assert!(written["mcpServers"].get("app").is_some());
}

#[test]
fn merge_mode_keeps_existing_servers_and_reports_replacements() {
    let (temp, ctx) = setup();
    let target = temp.path().join("claude.json");
    std::fs::write(
        &target,
        r#"{"mcpServers": {"legacy": {"command": "old"}, "fs": {"command": "stale"}}}"#,
    )
    .unwrap();

    let report = ApplyCommand::new(ctx)
        .execute(
            &ApplyOptions::new("dev")
                .with_target(&target)
                .with_mode(ApplyMode::Merge),
        )
        .unwrap();

    assert_eq!(report.replaced, vec!["fs"]);
    let written = read_json(&target);
    assert_eq!(written["mcpServers"]["legacy"]["command"], "old");
    assert_eq!(written["mcpServers"]["fs"]["command"], "npx");
}

#[test]
fn preview_does_not_write() {
    let (temp, ctx) = setup();
    let target = temp.path().join("preview.json");

    let doc = ApplyCommand::new(ctx)
        .preview(&ApplyOptions::new("dev").with_target(&target))
        .unwrap();

    assert_eq!(doc["mcpServers"]["app"]["env"]["B"], "20");
    assert!(!target.exists());
}

#[test]
fn apply_unknown_profile_is_not_found() {
    let (_temp, ctx) = setup();
    let err = ApplyCommand::new(ctx)
        .execute(&ApplyOptions::new("ghost"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn custom_servers_key_from_settings() {
    let temp = TempDir::new().unwrap();
    let base = temp.path().join("home");
    std::fs::create_dir_all(&base).unwrap();
    std::fs::write(
        base.join("settings.toml"),
        format!(
            "target = {:?}\nservers_key = \"servers\"\n",
            temp.path().join("out.json")
        ),
    )
    .unwrap();
    let ctx = AppContext::new(&base).unwrap();
    ctx.templates()
        .save_manual(&TemplateSpec::new("t", "cmd"), false, &FixedAnswer::NO)
        .unwrap();
    ctx.profiles().create("p", "").unwrap();
    ctx.profiles().add_server("p", "t", "", EnvMap::new()).unwrap();

    let report = ApplyCommand::new(ctx).execute(&ApplyOptions::new("p")).unwrap();

    let written = read_json(&report.target);
    assert_eq!(written["servers"]["t"]["command"], "cmd");
    assert!(written.get("mcpServers").is_none());
}
