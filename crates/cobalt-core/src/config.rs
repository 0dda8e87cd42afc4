// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.
//
// The configuration document names, per logical controller, the native screen
// class that hosts it and, per plugin logical name, the native handler id for
// each platform. The routing core only consumes the resolved mappings.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CobaltError, Result};

/// Conventional file name of the configuration document.
pub const CONFIG_FILE: &str = "cobalt.json";

/// Controller entry used when a requested controller is unknown.
pub const DEFAULT_CONTROLLER: &str = "default";

/// Screen class used when a controller entry does not name one.
pub const DEFAULT_SCREEN_CLASS: &str = "org.cobaltians.cobalt.activities.CobaltActivity";

const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";

/// Runtime settings of the bridge itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BridgeSettings {
    /// Directory (relative to the app bundle) holding web resources and the
    /// configuration document.
    pub resource_path: String,
    /// Application package, prepended to screen classes starting with `.`.
    pub package_name: String,
    /// Include raw rejected envelopes in log records.
    pub debug: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            resource_path: "www/".into(),
            package_name: String::new(),
            debug: false,
        }
    }
}

impl BridgeSettings {
    /// Location of the configuration document below `bundle_root`.
    pub fn config_path(&self, bundle_root: &Path) -> std::path::PathBuf {
        bundle_root.join(&self.resource_path).join(CONFIG_FILE)
    }
}

/// One entry of the `controllers` object.
///
/// Fields are read leniently: a missing or mistyped field takes its default
/// instead of rejecting the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub android: Option<String>,
    pub ios: Option<String>,
    pub bars: Option<Value>,
    pub pull_to_refresh: bool,
    pub infinite_scroll: bool,
    pub infinite_scroll_offset: i64,
    pub background_color: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            android: None,
            ios: None,
            bars: None,
            pull_to_refresh: false,
            infinite_scroll: false,
            infinite_scroll_offset: 0,
            background_color: DEFAULT_BACKGROUND_COLOR.into(),
        }
    }
}

impl ControllerConfig {
    /// Read an entry from its JSON value. Non-object entries yield the
    /// defaults.
    pub fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let Some(fields) = value.as_object() else {
            warn!(entry = %value, "controller entry is not an object, using defaults");
            return defaults;
        };
        Self {
            android: opt_string(fields.get("android")),
            ios: opt_string(fields.get("ios")),
            bars: fields.get("bars").filter(|v| v.is_object()).cloned(),
            pull_to_refresh: opt_bool(fields.get("pullToRefresh"), defaults.pull_to_refresh),
            infinite_scroll: opt_bool(fields.get("infiniteScroll"), defaults.infinite_scroll),
            infinite_scroll_offset: opt_i64(
                fields.get("infiniteScrollOffset"),
                defaults.infinite_scroll_offset,
            ),
            background_color: opt_string(fields.get("backgroundColor")).unwrap_or(defaults.background_color),
        }
    }

    /// Screen class declared for `platform`.
    pub fn screen_class(&self, platform: &str) -> Option<&str> {
        match platform {
            "ios" => self.ios.as_deref(),
            "android" => self.android.as_deref(),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ControllerConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

fn opt_string(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_owned)
}

fn opt_bool(value: Option<&Value>, fallback: bool) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        _ => fallback,
    }
}

fn opt_i64(value: Option<&Value>, fallback: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(fallback),
        Some(Value::String(s)) => s.trim().parse::<f64>().map(|f| f as i64).unwrap_or(fallback),
        _ => fallback,
    }
}

/// A controller lookup with fallbacks applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedController {
    /// The controller name that was asked for.
    pub controller: String,
    /// Fully-qualified screen class that hosts it.
    pub screen_class: String,
    pub config: ControllerConfig,
}

/// Parsed configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub controllers: HashMap<String, ControllerConfig>,
    /// Plugin logical name -> `{platform: handlerId}`. Kept loosely typed so
    /// that one bad entry does not invalidate the whole document.
    pub plugins: HashMap<String, Value>,
}

impl BridgeConfig {
    /// Parse the configuration document from a string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| CobaltError::Config(format!("{CONFIG_FILE}: {e}")))
    }

    /// Read and parse the configuration document at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            controllers = config.controllers.len(),
            plugins = config.plugins.len(),
            "bridge configuration loaded"
        );
        Ok(config)
    }

    /// Resolve `controller` for `platform`, falling back to the `default`
    /// entry when the name is absent or unknown.
    ///
    /// Returns `None` when neither the controller nor `default` exist.
    pub fn resolve_controller(
        &self,
        controller: Option<&str>,
        platform: &str,
        settings: &BridgeSettings,
    ) -> Option<ResolvedController> {
        let entry = controller
            .and_then(|name| self.controllers.get(name))
            .or_else(|| self.controllers.get(DEFAULT_CONTROLLER))?;

        let screen_class = match entry.screen_class(platform) {
            None => DEFAULT_SCREEN_CLASS.to_owned(),
            Some(class) if class.starts_with('.') => format!("{}{class}", settings.package_name),
            Some(class) => class.to_owned(),
        };

        Some(ResolvedController {
            controller: controller.unwrap_or(DEFAULT_CONTROLLER).to_owned(),
            screen_class,
            config: entry.clone(),
        })
    }

    /// Plugin logical name -> handler id for `platform`.
    ///
    /// Entries that are not objects or lack a string handler for the
    /// platform are skipped: their messages will never be processed.
    pub fn plugin_handlers(&self, platform: &str) -> HashMap<String, String> {
        let mut handlers = HashMap::with_capacity(self.plugins.len());
        for (name, entry) in &self.plugins {
            match entry.get(platform).and_then(Value::as_str) {
                Some(handler) => {
                    handlers.insert(name.clone(), handler.to_owned());
                }
                None => warn!(
                    plugin = %name,
                    platform,
                    "plugin entry has no string handler for this platform, its messages will not be processed"
                ),
            }
        }
        handlers
    }
}
