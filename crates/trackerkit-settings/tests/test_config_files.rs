use tempfile::TempDir;

use trackerkit_settings::{Config, LogFormat, SettingsError};

fn customized() -> Config {
    let mut config = Config::new();
    config.tracker.platform = "gba".to_string();
    config.tracker.flags = vec!["uat".to_string()];
    config.tracker.poll_interval_ms = 250;
    config.logging.format = LogFormat::Json;
    config.logging.level = "trackerkit_tracker=debug".to_string();
    config
}

#[test]
fn test_toml_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = customized();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let config = customized();
    config.save_to_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"poll_interval_ms\": 250"));
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_invalid_file_is_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[tracker]\npoll_interval_ms = 0\n").unwrap();

    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::InvalidSetting { .. })
    ));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let toml_path = dir.path().join("config.toml");
    let json_path = dir.path().join("config.json");
    std::fs::write(&toml_path, "[tracker\n").unwrap();
    std::fs::write(&json_path, "{").unwrap();

    assert!(matches!(
        Config::load_from_file(&toml_path),
        Err(SettingsError::TomlError(_))
    ));
    assert!(matches!(
        Config::load_from_file(&json_path),
        Err(SettingsError::JsonError(_))
    ));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::IoError(_))
    ));
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::new();
    config.tracker.display_name.clear();

    assert!(config.save_to_file(&path).is_err());
    assert!(!path.exists());
}
