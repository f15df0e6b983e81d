use padboard::settings::Settings;
use tempfile::tempdir;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let settings = Settings::load(path.to_str().unwrap()).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn save_then_load_preserves_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    let path = path.to_str().unwrap();

    let mut settings = Settings::default();
    settings.pen_color = "#ff0000".into();
    settings.history_capacity = 20;
    settings.ai.api_key = Some("abc".into());
    settings.save(path).unwrap();

    let loaded = Settings::load(path).unwrap();
    assert_eq!(loaded, settings);
    assert_eq!(loaded.ai.resolved_api_key().as_deref(), Some("abc"));
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, "{ nope").unwrap();
    assert!(Settings::load(path.to_str().unwrap()).is_err());
}
