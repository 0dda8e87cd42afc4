// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Routes `plugin` envelopes to their native handler on the UI thread.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use cobalt_core::error::Result;
use cobalt_core::types::{PluginMessage, platform_key};

use super::registry::PluginRegistry;
use crate::container::WebContainer;
use crate::ui_thread::UiThread;

/// Resolves plugin messages and schedules the handler call.
#[derive(Clone)]
pub struct PluginDispatcher {
    registry: Arc<PluginRegistry>,
    ui: UiThread,
    platform: &'static str,
}

impl PluginDispatcher {
    pub fn new(registry: PluginRegistry, ui: UiThread) -> Self {
        Self {
            registry: Arc::new(registry),
            ui,
            platform: platform_key(),
        }
    }

    /// Resolve `classes` entries against another platform key.
    pub fn with_platform(mut self, platform: &'static str) -> Self {
        self.platform = platform;
        self
    }

    /// Deliver `message` to its plugin.
    ///
    /// Returns `false` when the handler cannot be resolved or instantiated;
    /// the failure is logged and nothing else happens. On success the call
    /// has run (already on the UI thread) or been queued for it.
    #[instrument(skip_all, fields(action = %message.action))]
    pub fn dispatch(&self, container: Arc<dyn WebContainer>, message: PluginMessage) -> bool {
        match self.try_dispatch(container, message) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "plugin message dropped");
                false
            }
        }
    }

    fn try_dispatch(&self, container: Arc<dyn WebContainer>, message: PluginMessage) -> Result<()> {
        let handler = self.registry.resolve_handler(&message, self.platform)?.to_owned();
        let plugin = self.registry.instance(&handler)?;

        let callback_channel = message.callback_channel().map(str::to_owned);
        let PluginMessage { action, data, .. } = message;

        debug!(plugin = %handler, "dispatching plugin message");
        self.ui
            .run_on_ui(move || plugin.on_message(container, &action, data, callback_channel))
    }
}
