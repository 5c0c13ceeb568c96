use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_dir(label: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("search_cli_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_overrides(
        &mut settings,
        r#"
catalog_path = "/srv/movies.json"
query = "batman"
"#,
    )
    .expect("valid config");

    assert_eq!(settings.catalog_path, PathBuf::from("/srv/movies.json"));
    assert_eq!(settings.query, "batman");
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn malformed_file_is_rejected_without_partial_overrides() {
    let mut settings = Settings::default();
    apply_file_overrides(&mut settings, "catalog_path = [1, 2").expect_err("malformed config");
    assert_eq!(settings, Settings::default());
}

#[test]
fn load_settings_reports_malformed_config_path() {
    let dir = temp_dir("bad_cfg");
    let path = dir.join("search_cli.toml");
    fs::write(&path, "query = [unterminated").expect("write config");

    let err = load_settings(&path).expect_err("malformed config");
    assert!(
        err.to_string().contains("search_cli.toml"),
        "unexpected error: {err}"
    );

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let mut settings = Settings::default();
    let vars: HashMap<&str, &str> = HashMap::from([
        ("SEARCH_CLI_QUERY", "matrix"),
        ("APP__QUERY", "batman"),
        ("SEARCH_CLI_CATALOG", "/tmp/catalog.json"),
        ("APP__LOG_FILTER", "debug"),
    ]);

    apply_env_overrides(&mut settings, |key| vars.get(key).map(|v| v.to_string()));

    assert_eq!(settings.query, "batman");
    assert_eq!(settings.catalog_path, PathBuf::from("/tmp/catalog.json"));
    assert_eq!(settings.log_filter, "debug");
}

#[test]
fn loads_catalog_records_from_json() {
    let dir = temp_dir("catalog");
    let path = dir.join("catalog.json");
    fs::write(
        &path,
        r#"[
  {"id": "tt0096895", "title": "Batman", "year": "1989", "type": "movie"},
  {"id": "tt1877830", "title": "The Batman", "watched": true}
]"#,
    )
    .expect("write catalog");

    let records = load_catalog(&path).expect("load catalog");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].kind.as_deref(), Some("movie"));
    assert!(records[1].watched);

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn invalid_catalog_reports_path() {
    let dir = temp_dir("bad_catalog");
    let path = dir.join("catalog.json");
    fs::write(&path, "{not json").expect("write catalog");

    let err = load_catalog(&path).expect_err("invalid json");
    assert!(
        err.to_string().contains("catalog.json"),
        "unexpected error: {err}"
    );

    fs::remove_dir_all(dir).expect("cleanup");
}
