use std::io::Write;
use std::path::Path;

use wf_board::color::Color;
use wf_board::config::loader::{expand_tilde, load_config, parse_config_file};
use wf_board::config::types::AppConfig;
use wf_board::table::{LookupPolicy, SortDirection, SortSpec};
use wf_board::theme::{Background, ResolvedTheme};
use wf_board::types::StatusCode;

#[test]
fn parse_empty_config_uses_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();
    assert_eq!(config.defaults.group, "");
    assert_eq!(config.defaults.lookup_policy, LookupPolicy::Lenient);
    assert!(config.defaults.initial_sort().is_none());
    assert!(config.defaults.snapshot.is_none());
    assert!(config.layout.hidden.is_empty());
    assert!(config.theme.ui.table.show_separator);
}

#[test]
fn parse_unknown_keys_ignored() {
    let toml = r#"
unknown_top_level = "should be ignored"

[defaults]
group = "etl"
refetch_interval_minutes = 5
"#;
    let config: AppConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.defaults.group, "etl");
}

#[test]
fn parse_fixture_config() {
    let config = parse_config_file(Path::new("tests/fixtures/config.toml")).unwrap();

    assert_eq!(config.defaults.group, "etl");
    assert_eq!(config.defaults.lookup_policy, LookupPolicy::Strict);
    assert_eq!(config.defaults.sort_direction, SortDirection::Desc);
    assert_eq!(config.defaults.initial_sort(), Some(SortSpec::desc("Status")));
    assert_eq!(
        config.defaults.snapshot.as_deref(),
        Some(Path::new("~/workflows/snapshot.json"))
    );

    assert_eq!(config.layout.hidden, vec!["Config", "Actions"]);
    assert_eq!(config.layout.widths.get("Workflow"), Some(&30));
    assert_eq!(config.layout.widths.get("Type"), Some(&10));
    assert!(!config.theme.ui.table.show_separator);
}

#[test]
fn fixture_theme_overrides_only_given_slots() {
    let config = parse_config_file(Path::new("tests/fixtures/config.toml")).unwrap();
    let theme = ResolvedTheme::resolve(&config.theme, Background::Dark);
    let defaults = ResolvedTheme::default();

    assert_eq!(
        theme.text_primary,
        Color::Hex {
            r: 0xc0,
            g: 0xca,
            b: 0xf5
        }
    );
    assert_eq!(theme.text_secondary, Color::Ansi256(245));
    assert_eq!(theme.bg_selected, Color::Ansi256(237));
    assert_eq!(
        theme.status_color(StatusCode::Running),
        Color::Hex {
            r: 0x9e,
            g: 0xce,
            b: 0x6a
        }
    );
    assert_eq!(theme.status_color(StatusCode::Error), Color::Ansi256(1));
    assert_eq!(
        theme.status_color(StatusCode::Success),
        defaults.status_color(StatusCode::Success)
    );
    assert_eq!(theme.border_faint, defaults.border_faint);
}

#[test]
fn invalid_color_in_config_produces_error() {
    let toml_str = r#"
[theme.colors.status]
error = "crimson"
"#;
    let err = toml::from_str::<AppConfig>(toml_str).unwrap_err();
    let msg = err.to_string();
    assert!(
        msg.contains("crimson"),
        "error should mention the invalid value: {msg}"
    );
}

#[test]
fn invalid_lookup_policy_is_rejected() {
    let toml_str = r#"
[defaults]
lookup_policy = "sometimes"
"#;
    assert!(toml::from_str::<AppConfig>(toml_str).is_err());
}

#[test]
fn load_config_reads_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[defaults]
sort = "Workflow"

[layout]
hidden = ["Type"]
"#
    )
    .unwrap();

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.defaults.initial_sort(), Some(SortSpec::asc("Workflow")));
    assert_eq!(config.layout.hidden, vec!["Type"]);
}

#[test]
fn load_config_missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = load_config(Some(&missing)).unwrap_err();
    assert!(format!("{err:#}").contains("nope.toml"));
}

#[test]
fn load_config_bad_toml_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[defaults\ngroup = ").unwrap();
    let err = load_config(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("parsing TOML"));
}

#[test]
fn expand_tilde_leaves_plain_paths_alone() {
    assert_eq!(
        expand_tilde(Path::new("/tmp/snapshot.json")),
        Path::new("/tmp/snapshot.json")
    );
    assert_eq!(
        expand_tilde(Path::new("relative/snapshot.json")),
        Path::new("relative/snapshot.json")
    );
}
