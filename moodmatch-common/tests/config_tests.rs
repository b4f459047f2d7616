//! Configuration resolution tests
//!
//! Uses serial_test to prevent ENV variable race conditions: tests that manipulate
//! MOODMATCH_ROOT_FOLDER or MOODMATCH_CONFIG are marked with #[serial].

use moodmatch_common::config::{
    config_file_path, default_root_folder, resolve_root_folder, TomlConfig, CONFIG_FILE_ENV,
    ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_env_and_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/moodmatch-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/moodmatch-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(Some(Path::new("/tmp/moodmatch-cli")), &toml);
    assert_eq!(root, PathBuf::from("/tmp/moodmatch-cli"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_env_wins_over_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/moodmatch-env");
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/moodmatch-toml")),
        ..Default::default()
    };

    let root = resolve_root_folder(None, &toml);
    assert_eq!(root, PathBuf::from("/tmp/moodmatch-env"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_toml_wins_over_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/moodmatch-toml")),
        ..Default::default()
    };

    assert_eq!(
        resolve_root_folder(None, &toml),
        PathBuf::from("/tmp/moodmatch-toml")
    );
}

#[test]
#[serial]
fn test_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);
    let root = resolve_root_folder(None, &TomlConfig::default());
    assert_eq!(root, default_root_folder());
    assert!(!root.as_os_str().is_empty());
}

#[test]
fn test_missing_config_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = TomlConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_config_file_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "recommendation_limit = 7\nmax_duration_seconds = 30.0\n").unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.recommendation_limit, Some(7));
    assert_eq!(config.max_duration_seconds, Some(30.0));
}

#[test]
fn test_malformed_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "port = [not valid").unwrap();

    assert!(TomlConfig::load(&path).is_err());
}

#[test]
#[serial]
fn test_config_file_path_priority() {
    env::set_var(CONFIG_FILE_ENV, "/tmp/moodmatch-env.toml");
    assert_eq!(
        config_file_path(Some(Path::new("/tmp/cli.toml"))),
        Some(PathBuf::from("/tmp/cli.toml"))
    );
    assert_eq!(
        config_file_path(None),
        Some(PathBuf::from("/tmp/moodmatch-env.toml"))
    );
    env::remove_var(CONFIG_FILE_ENV);
}
