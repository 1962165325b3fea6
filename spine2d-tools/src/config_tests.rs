use crate::{EditorConfig, ExportSettings, ToolError};
use serde_json::json;
use std::time::Duration;

#[test]
fn config_defaults_timing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    std::fs::write(
        &path,
        r#"{ "editor": "/opt/spine/Spine.sh", "export_settings": "export.json" }"#,
    )
    .unwrap();

    let config = EditorConfig::from_json_file(&path).unwrap();
    assert_eq!(config, EditorConfig::new("/opt/spine/Spine.sh", "export.json"));
    assert_eq!(config.timeout(), Duration::from_secs(30));
    assert_eq!(config.poll_interval(), Duration::from_secs(1));
}

#[test]
fn config_overrides_timing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    std::fs::write(
        &path,
        r#"{ "editor": "spine", "export_settings": "e.json", "timeout_secs": 5, "poll_interval_ms": 250 }"#,
    )
    .unwrap();

    let config = EditorConfig::from_json_file(&path).unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(config.poll_interval(), Duration::from_millis(250));
}

#[test]
fn invalid_config_is_reported_with_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("editor.json");
    std::fs::write(&path, r#"{ "editor": 5 }"#).unwrap();

    let err = EditorConfig::from_json_file(&path).unwrap_err();
    assert!(matches!(err, ToolError::Config { path: p, .. } if p == path));
}

#[test]
fn export_settings_defaults_match_the_editor_descriptor() {
    let value = serde_json::to_value(ExportSettings::default()).unwrap();
    assert_eq!(
        value,
        json!({
            "class": "export-json",
            "name": "JSON",
            "open": false,
            "extension": ".json",
            "format": "JSON",
            "prettyPrint": true,
            "nonessential": true,
            "cleanUp": true,
            "packAtlas": null,
            "packSource": "attachments",
            "packTarget": "perskeleton",
            "warnings": true
        })
    );
}

#[test]
fn export_settings_file_keeps_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");

    let mut settings = ExportSettings::default();
    settings.extra.insert("input".to_string(), json!("project.spine"));
    settings.write_json_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let back: ExportSettings = serde_json::from_str(&text).unwrap();
    assert_eq!(back, settings);
}
