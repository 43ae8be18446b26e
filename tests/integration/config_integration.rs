//! Integration tests for layered configuration loading

use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;
use tokenmix::config::{global_config_path, ConfigLoader, ProviderType, LOCAL_CONFIG_FILE};

/// Serializes tests that modify process environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ENV_KEYS: &[&str] = &[
    "XDG_CONFIG_HOME",
    "TOKENMIX_GENERATION__MIX_RATIO",
    "TOKENMIX_GENERATION__PRIMARY_MODEL",
    "TOKENMIX_PROVIDER__ENDPOINT",
];

/// Run `f` with an isolated global config directory, restoring the environment afterwards.
fn with_isolated_env<F: FnOnce(&Path)>(f: F) {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = ENV_KEYS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();

    let config_home = TempDir::new().unwrap();
    for key in ENV_KEYS {
        std::env::remove_var(key);
    }
    std::env::set_var("XDG_CONFIG_HOME", config_home.path());

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(config_home.path())));

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

fn write_global(config_home: &Path, contents: &str) {
    let dir = config_home.join("tokenmix");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

#[test]
fn test_defaults_without_any_file() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();

        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.generation.primary_model, "gemma3:4b");
        assert_eq!(config.generation.secondary_model, "gemma3:270m");
        assert_eq!(config.generation.mix_ratio, 0.5);
        assert_eq!(config.generation.warmup_count, 10);
        assert_eq!(config.generation.max_tokens, 300);
        assert!(config.validate().is_ok());
    });
}

#[test]
fn test_global_path_follows_xdg_config_home() {
    with_isolated_env(|config_home| {
        let path = global_config_path().unwrap();
        assert_eq!(path, config_home.join("tokenmix").join("config.toml"));
    });
}

#[test]
fn test_local_file_overrides_global() {
    with_isolated_env(|config_home| {
        write_global(
            config_home,
            r#"
[generation]
primary_model = "global-big"
secondary_model = "global-small"
mix_ratio = 0.2
"#,
        );
        let workspace = TempDir::new().unwrap();
        fs::write(
            workspace.path().join(LOCAL_CONFIG_FILE),
            r#"
[generation]
primary_model = "local-big"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.primary_model, "local-big");
        assert_eq!(config.generation.secondary_model, "global-small");
        assert_eq!(config.generation.mix_ratio, 0.2);
    });
}

#[test]
fn test_environment_overrides_files() {
    with_isolated_env(|config_home| {
        write_global(config_home, "[generation]\nmix_ratio = 0.2\n");
        std::env::set_var("TOKENMIX_GENERATION__MIX_RATIO", "0.75");
        std::env::set_var("TOKENMIX_PROVIDER__ENDPOINT", "http://10.0.0.5:11434");

        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.generation.mix_ratio, 0.75);
        assert_eq!(
            config.provider.endpoint.as_deref(),
            Some("http://10.0.0.5:11434")
        );
    });
}

#[test]
fn test_explicit_file_skips_global_and_local() {
    with_isolated_env(|config_home| {
        write_global(config_home, "[generation]\nprimary_model = \"global-big\"\n");
        let workspace = TempDir::new().unwrap();
        fs::write(
            workspace.path().join(LOCAL_CONFIG_FILE),
            "[generation]\nsecondary_model = \"local-small\"\n",
        )
        .unwrap();
        let explicit = workspace.path().join("custom.toml");
        fs::write(
            &explicit,
            "[provider]\nprovider_type = \"local\"\nendpoint = \"http://localhost:8080/v1\"\n",
        )
        .unwrap();

        let config = ConfigLoader::resolve(Some(&explicit), workspace.path()).unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::LocalCustom);
        assert_eq!(config.generation.primary_model, "gemma3:4b");
        assert_eq!(config.generation.secondary_model, "gemma3:270m");
    });
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        let missing = workspace.path().join("missing.toml");
        assert!(ConfigLoader::resolve(Some(&missing), workspace.path()).is_err());
    });
}

#[test]
fn test_invalid_values_fail_validation() {
    with_isolated_env(|_| {
        let workspace = TempDir::new().unwrap();
        fs::write(
            workspace.path().join(LOCAL_CONFIG_FILE),
            "[generation]\nmix_ratio = 1.5\n\n[provider]\ntimeout_secs = 0\n",
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2, "errors: {:?}", errors);
    });
}
