//! Template deletion and its effect on profiles that reference it.

use std::cell::RefCell;

use mcpm_core::confirm::FixedAnswer;
use mcpm_core::env::EnvMap;
use mcpm_core::error::ErrorKind;
use mcpm_core::profile::ProfileStore;
use mcpm_core::template::{TemplateSpec, TemplateStore};
use tempfile::TempDir;

fn setup() -> (TempDir, TemplateStore, ProfileStore) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let templates = TemplateStore::new(temp.path().join("servers"));
    let profiles = ProfileStore::new(temp.path().join("profiles"));

    templates
        .save_manual(&TemplateSpec::new("github", "npx"), false, &FixedAnswer::NO)
        .unwrap();
    templates
        .save_manual(&TemplateSpec::new("slack", "npx"), false, &FixedAnswer::NO)
        .unwrap();

    profiles.create("dev", "").unwrap();
    profiles.add_server("dev", "github", "", EnvMap::new()).unwrap();
    profiles.add_server("dev", "slack", "", EnvMap::new()).unwrap();
    profiles.create("ops", "").unwrap();
    profiles.add_server("ops", "github", "gh", EnvMap::new()).unwrap();

    (temp, templates, profiles)
}

#[test]
fn forced_delete_strips_references_everywhere() {
    let (_temp, templates, profiles) = setup();

    let report = templates
        .delete("github", true, &profiles, &FixedAnswer::NO)
        .unwrap();

    assert!(!templates.exists("github"));
    assert_eq!(report.referenced_by, vec!["dev", "ops"]);
    assert_eq!(report.cleaned_profiles, vec!["dev", "ops"]);
    for name in ["dev", "ops"] {
        let profile = profiles.load(name).unwrap();
        assert!(!profile.references_template("github"), "{name}");
    }
    assert_eq!(profiles.load("dev").unwrap().servers.len(), 1);
}

#[test]
fn declined_delete_changes_nothing() {
    let (_temp, templates, profiles) = setup();

    let err = templates
        .delete("github", false, &profiles, &FixedAnswer::NO)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(templates.exists("github"));
    assert!(profiles.load("ops").unwrap().references_template("github"));
}

#[test]
fn declining_cleanup_leaves_dangling_references() {
    let (_temp, templates, profiles) = setup();
    let prompts = RefCell::new(Vec::new());
    let yes_then_no = |prompt: &str| {
        prompts.borrow_mut().push(prompt.to_string());
        prompts.borrow().len() == 1
    };

    let report = templates
        .delete("github", false, &profiles, &yes_then_no)
        .unwrap();

    assert!(!templates.exists("github"));
    assert!(report.cleaned_profiles.is_empty());
    assert!(profiles.load("ops").unwrap().references_template("github"));

    let prompts = prompts.into_inner();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("dev, ops"));
}

#[test]
fn accepted_cleanup_strips_references() {
    let (_temp, templates, profiles) = setup();

    let report = templates
        .delete("github", false, &profiles, &FixedAnswer::YES)
        .unwrap();

    assert_eq!(report.cleaned_profiles, vec!["dev", "ops"]);
    assert!(profiles.find_profiles_using_template("github").unwrap().is_empty());
}

#[test]
fn unreferenced_template_is_only_confirmed_once() {
    let (_temp, templates, profiles) = setup();
    profiles.remove_server("dev", "slack").unwrap();
    let prompts = RefCell::new(0);
    let count = |_: &str| {
        *prompts.borrow_mut() += 1;
        true
    };

    let report = templates.delete("slack", false, &profiles, &count).unwrap();

    assert!(report.referenced_by.is_empty());
    assert_eq!(*prompts.borrow(), 1);
}

#[test]
fn deleting_missing_template_is_not_found() {
    let (_temp, templates, profiles) = setup();

    let err = templates
        .delete("ghost", true, &profiles, &FixedAnswer::YES)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}
