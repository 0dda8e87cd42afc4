// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Web bundle location and configuration loading.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use cobalt_core::{BridgeConfig, BridgeSettings};

const DEFAULT_PACKAGE: &str = "org.cobaltians.demo";

/// Directory holding the web bundle: `COBALT_BUNDLE`, else the working
/// directory.
pub fn bundle_root() -> PathBuf {
    if let Ok(dir) = std::env::var("COBALT_BUNDLE") {
        return PathBuf::from(dir);
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Bridge settings from the environment (`COBALT_PACKAGE`, `COBALT_DEBUG`).
pub fn settings_from_env() -> BridgeSettings {
    BridgeSettings {
        package_name: std::env::var("COBALT_PACKAGE").unwrap_or_else(|_| DEFAULT_PACKAGE.to_owned()),
        debug: std::env::var("COBALT_DEBUG").is_ok_and(|v| is_truthy(&v)),
        ..BridgeSettings::default()
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Pick the configuration document: an explicit path (CLI argument), then
/// `env_path` (`COBALT_CONFIG`), then the bundle's default location.
pub fn config_path(
    explicit: Option<String>,
    env_path: Option<String>,
    settings: &BridgeSettings,
    root: &Path,
) -> PathBuf {
    explicit
        .or(env_path)
        .map(PathBuf::from)
        .unwrap_or_else(|| settings.config_path(root))
}

/// Load `path`, falling back to an empty configuration.
///
/// Without a configuration no controller resolves and no plugin is known
/// by name, but pub/sub and explicit plugin classes still work.
pub fn load_config(path: &Path) -> BridgeConfig {
    match BridgeConfig::load(path) {
        Ok(config) => {
            info!(path = %path.display(), "configuration loaded");
            config
        }
        Err(e) => {
            error!(path = %path.display(), error = %e, "configuration unavailable, continuing with an empty one");
            BridgeConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let settings = BridgeSettings::default();
        let root = Path::new("/bundle");
        assert_eq!(
            config_path(Some("a.json".into()), Some("b.json".into()), &settings, root),
            PathBuf::from("a.json")
        );
        assert_eq!(
            config_path(None, Some("b.json".into()), &settings, root),
            PathBuf::from("b.json")
        );
        assert_eq!(
            config_path(None, None, &settings, root),
            PathBuf::from("/bundle/www/cobalt.json")
        );
    }

    #[test]
    fn loads_bundle_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let www = dir.path().join("www");
        std::fs::create_dir_all(&www).expect("mkdir");
        std::fs::write(
            www.join("cobalt.json"),
            r#"{"controllers":{"default":{"android":".Main"}},"plugins":{}}"#,
        )
        .expect("write");

        let path = config_path(None, None, &BridgeSettings::default(), dir.path());
        let config = load_config(&path);
        assert!(config.controllers.contains_key("default"));
    }

    #[test]
    fn missing_or_broken_config_falls_back_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_config(&dir.path().join("absent.json")).controllers.is_empty());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ nope").expect("write");
        assert!(load_config(&broken).controllers.is_empty());
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy(" TRUE "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
