//! Loading `cancelcheck.toml` and its effect on a workspace.

use cancelcheck::config::{
    discover, load_from_path, load_from_str, Config, ConfigError, ValidationIssue,
    CONFIG_FILE_NAME,
};
use cancelcheck::{Severity, Workspace};
use std::fs;
use tempfile::TempDir;

const FLAGGED: &str = "class A {\n    void M(CancellationToken ct) {\n        if (ct.IsCancellationRequested)\n            throw new OperationCanceledException();\n    }\n}\n";

#[test]
fn empty_file_gives_defaults() {
    let config = load_from_str("").unwrap();
    assert_eq!(config, Config::default());
    assert!(config.rule.enabled);
    assert_eq!(config.rule.severity, Severity::Warning);
    assert!(config.fix.format);
    assert_eq!(config.files.extensions, vec!["cs"]);
    assert!(config.files.exclude.iter().any(|dir| dir == "obj"));
}

#[test]
fn full_config() {
    let config = load_from_str(
        r#"
[rule]
enabled = true
severity = "error"

[fix]
format = false

[files]
extensions = ["cs", "csx"]
exclude = ["bin", "obj", "generated"]
"#,
    )
    .unwrap();

    assert_eq!(config.rule.severity, Severity::Error);
    assert!(!config.fix.format);
    assert!(config.is_source_extension("csx"));
    assert!(config.is_source_extension("CS"));
    assert!(!config.is_source_extension("vb"));
    assert_eq!(config.files.exclude, vec!["bin", "obj", "generated"]);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = load_from_str("[rule]\nseverity = \"warning\"\nlevel = 3\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { path: None, .. }));
}

#[test]
fn unknown_severity_is_rejected() {
    let err = load_from_str("[rule]\nseverity = \"fatal\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml { .. }));
}

#[test]
fn invalid_values_are_all_reported() {
    let err = load_from_str("[files]\nextensions = [\".cs\"]\nexclude = [\"a/b\"]\n").unwrap_err();
    let ConfigError::Validation { source, .. } = &err else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(source.issues.len(), 2);
    assert!(matches!(
        &source.issues[0],
        ValidationIssue::InvalidValue { field: "files.extensions", .. }
    ));
    assert!(err.to_string().contains("'files.exclude' has invalid entry 'a/b'"));
}

#[test]
fn empty_extension_list_is_rejected() {
    let err = load_from_str("[files]\nextensions = []\n").unwrap_err();
    assert!(err
        .to_string()
        .contains("'files.extensions' must not be empty"));
}

#[test]
fn load_errors_name_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, "[fix]\nformat = \"yes\"\n").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(err.to_string().contains(CONFIG_FILE_NAME));

    let missing = load_from_path(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io { .. }));
}

#[test]
fn discover_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    assert_eq!(discover(dir.path()).unwrap(), Config::default());

    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[rule]\nseverity = \"info\"\n",
    )
    .unwrap();
    assert_eq!(discover(dir.path()).unwrap().rule.severity, Severity::Info);
}

#[test]
fn configured_severity_reaches_diagnostics() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Worker.cs");
    fs::write(&file, FLAGGED).unwrap();

    let config = load_from_str("[rule]\nseverity = \"error\"\n").unwrap();
    let workspace = Workspace::new(dir.path(), config);
    let analysis = workspace.analyze_file(&file).unwrap();
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].severity, Severity::Error);
}

#[test]
fn excluded_directories_are_not_discovered() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("generated")).unwrap();
    fs::write(dir.path().join("generated/Gen.cs"), FLAGGED).unwrap();
    fs::write(dir.path().join("Worker.cs"), FLAGGED).unwrap();

    let config = load_from_str("[files]\nexclude = [\"generated\"]\n").unwrap();
    let workspace = Workspace::new(dir.path(), config);
    let files = workspace.discover(&[dir.path().to_path_buf()]);
    assert_eq!(files, vec![dir.path().join("Worker.cs")]);
}

#[test]
fn format_off_keeps_raw_trivia() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("Worker.cs");
    fs::write(
        &file,
        "class A {\n    void M(CancellationToken ct) {\n        if (ct.IsCancellationRequested) throw null;\n    }\n}\n",
    )
    .unwrap();

    let config = load_from_str("[fix]\nformat = false\n").unwrap();
    let workspace = Workspace::new(dir.path(), config);
    let analysis = workspace.analyze_file(&file).unwrap();
    let plan = workspace.plan(&analysis).unwrap().unwrap();
    assert_eq!(
        plan.after,
        "class A {\n    void M(CancellationToken ct) {\nct.ThrowIfCancellationRequested();\n    }\n}\n"
    );

    let workspace = Workspace::new(dir.path(), Config::default());
    let plan = workspace.plan(&analysis).unwrap().unwrap();
    assert!(plan
        .after
        .contains("\n        ct.ThrowIfCancellationRequested();\n"));
}
