// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Demo plugins bundled with the headless host.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};

use cobalt_bridge::{ChannelBroker, Plugin, PluginRegistry, WebContainer};

pub const ECHO_HANDLER: &str = "org.cobaltians.demo.EchoPlugin";
pub const CLOCK_HANDLER: &str = "org.cobaltians.demo.ClockPlugin";

/// Sends `data` straight back on the callback channel.
pub struct EchoPlugin {
    broker: ChannelBroker,
}

impl Plugin for EchoPlugin {
    fn on_message(
        &self,
        _container: Arc<dyn WebContainer>,
        action: &str,
        data: Option<Value>,
        callback_channel: Option<String>,
    ) {
        match callback_channel {
            Some(channel) => self.broker.publish(data.as_ref(), &channel),
            None => info!(action, "echo without callback channel, nothing to answer"),
        }
    }
}

/// Answers `now` with the current UTC time.
pub struct ClockPlugin {
    broker: ChannelBroker,
}

impl Plugin for ClockPlugin {
    fn on_message(
        &self,
        _container: Arc<dyn WebContainer>,
        action: &str,
        _data: Option<Value>,
        callback_channel: Option<String>,
    ) {
        if action != "now" {
            warn!(action, "clock plugin: unknown action");
            return;
        }
        let Some(channel) = callback_channel else {
            warn!("clock plugin: `now` needs a callback channel");
            return;
        };
        let now = Utc::now();
        self.broker.publish(
            Some(&json!({
                "iso": now.to_rfc3339(),
                "timestamp": now.timestamp_millis(),
            })),
            &channel,
        );
    }
}

/// Registration table for the bundled plugins.
pub fn registry(broker: &ChannelBroker) -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry.register_instance(
        ECHO_HANDLER,
        Arc::new(EchoPlugin {
            broker: broker.clone(),
        }),
    );
    let clock_broker = broker.clone();
    registry.register_lazy(CLOCK_HANDLER, move || {
        Ok(Arc::new(ClockPlugin {
            broker: clock_broker.clone(),
        }) as Arc<dyn Plugin>)
    });
    registry
}
