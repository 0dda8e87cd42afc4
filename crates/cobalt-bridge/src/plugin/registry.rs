// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin registration table.
//
// Native plugins are registered by handler id at start-up, either as a ready
// singleton or as an accessor that builds the singleton on first use. The
// configuration document adds a second index from plugin logical name to
// handler id for the current platform.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, info, warn};

use cobalt_core::config::BridgeConfig;
use cobalt_core::error::{CobaltError, Result};
use cobalt_core::types::PluginMessage;

use crate::container::WebContainer;
use crate::lock;

/// A native handler invoked by action name from web-originated messages.
///
/// Always called on the UI thread.
pub trait Plugin: Send + Sync {
    /// Handle `action` sent by the web runtime behind `container`.
    ///
    /// A response, if any, is published on `callback_channel` through the
    /// channel broker.
    fn on_message(
        &self,
        container: Arc<dyn WebContainer>,
        action: &str,
        data: Option<Value>,
        callback_channel: Option<String>,
    );
}

type InstanceInit = Box<dyn Fn() -> Result<Arc<dyn Plugin>> + Send + Sync>;

enum Registration {
    Instance(Arc<dyn Plugin>),
    /// Built on first successful call and cached. Failures are not cached,
    /// so the next dispatch tries again.
    Lazy {
        init: InstanceInit,
        instance: Mutex<Option<Arc<dyn Plugin>>>,
    },
}

impl Registration {
    fn get(&self) -> Result<Arc<dyn Plugin>> {
        match self {
            Self::Instance(plugin) => Ok(Arc::clone(plugin)),
            Self::Lazy { init, instance } => {
                let mut cached = lock(instance);
                if let Some(plugin) = cached.as_ref() {
                    return Ok(Arc::clone(plugin));
                }
                let plugin = init()?;
                *cached = Some(Arc::clone(&plugin));
                Ok(plugin)
            }
        }
    }
}

/// Handler id -> implementation, plus logical name -> handler id.
#[derive(Default)]
pub struct PluginRegistry {
    implementations: HashMap<String, Registration>,
    names: HashMap<String, String>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a ready singleton under `handler`.
    pub fn register_instance(&mut self, handler: impl Into<String>, plugin: Arc<dyn Plugin>) -> &mut Self {
        self.insert(handler.into(), Registration::Instance(plugin));
        self
    }

    /// Register an accessor that builds the singleton on first use.
    pub fn register_lazy<F>(&mut self, handler: impl Into<String>, init: F) -> &mut Self
    where
        F: Fn() -> Result<Arc<dyn Plugin>> + Send + Sync + 'static,
    {
        self.insert(
            handler.into(),
            Registration::Lazy {
                init: Box::new(init),
                instance: Mutex::new(None),
            },
        );
        self
    }

    fn insert(&mut self, handler: String, registration: Registration) {
        if self.implementations.insert(handler.clone(), registration).is_some() {
            warn!(plugin = %handler, "plugin handler registered twice, keeping the latest");
        }
    }

    /// Index the configured plugins for `platform`.
    ///
    /// Configured handlers without an implementation are kept in the index
    /// (dispatch reports them) but logged here once.
    pub fn load_config(&mut self, config: &BridgeConfig, platform: &str) -> &mut Self {
        self.names = config.plugin_handlers(platform);
        for (name, handler) in &self.names {
            if !self.is_registered(handler) {
                warn!(
                    plugin = %name,
                    handler = %handler,
                    "configured plugin has no registered implementation, its messages will not be processed"
                );
            }
        }
        info!(
            configured = self.names.len(),
            registered = self.implementations.len(),
            "plugin registry built"
        );
        self
    }

    /// Handler id addressed by `message` on `platform`.
    ///
    /// `classes[platform]` wins; otherwise the logical `name` is looked up in
    /// the configured index.
    pub fn resolve_handler<'a>(&'a self, message: &'a PluginMessage, platform: &str) -> Result<&'a str> {
        if let Some(handler) = message.handler_for(platform) {
            return Ok(handler);
        }
        match message.name.as_deref() {
            Some(name) => self
                .names
                .get(name)
                .map(String::as_str)
                .ok_or_else(|| CobaltError::UnknownPlugin(name.to_owned())),
            None => Err(CobaltError::MalformedMessage(format!(
                "plugin message has neither classes.{platform} nor name"
            ))),
        }
    }

    /// Obtain the singleton registered under `handler`.
    ///
    /// Errors and panics raised by the accessor are caught here and
    /// reported as [`CobaltError::PluginInstance`].
    pub fn instance(&self, handler: &str) -> Result<Arc<dyn Plugin>> {
        let registration = self
            .implementations
            .get(handler)
            .ok_or_else(|| CobaltError::PluginNotRegistered(handler.to_owned()))?;

        let instance_error = |reason: String| CobaltError::PluginInstance {
            handler: handler.to_owned(),
            reason,
        };

        match catch_unwind(AssertUnwindSafe(|| registration.get())) {
            Ok(Ok(plugin)) => {
                debug!(plugin = %handler, "plugin instance obtained");
                Ok(plugin)
            }
            Ok(Err(e)) => Err(instance_error(e.to_string())),
            Err(panic) => Err(instance_error(panic_message(panic.as_ref()))),
        }
    }

    /// Whether an implementation is registered under `handler`.
    pub fn is_registered(&self, handler: &str) -> bool {
        self.implementations.contains_key(handler)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_owned()
    }
}
