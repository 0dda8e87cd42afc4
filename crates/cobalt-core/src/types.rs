// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Cobalt bridge: the JSON envelopes exchanged with
// the web runtime, screen identities, and navigation transitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{CobaltError, Result};

// ---------------------------------------------------------------------------
// Wire keywords
// ---------------------------------------------------------------------------

pub const TYPE_PLUGIN: &str = "plugin";
pub const TYPE_PUBSUB: &str = "pubsub";
pub const TYPE_NAVIGATION: &str = "navigation";
pub const TYPE_EVENT: &str = "event";
pub const TYPE_LOG: &str = "log";

/// Handler-id key used in plugin `classes` objects and configuration
/// entries for the platform this crate was compiled for.
pub fn platform_key() -> &'static str {
    #[cfg(target_os = "ios")]
    {
        "ios"
    }
    #[cfg(not(target_os = "ios"))]
    {
        "android"
    }
}

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Unique identifier for a live screen instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(pub Uuid);

impl ScreenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Inbound envelopes (web runtime -> native)
// ---------------------------------------------------------------------------

/// `{type:"plugin", ...}`: an action addressed to a native plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginMessage {
    /// Logical plugin name, as declared in the configuration.
    #[serde(default)]
    pub name: Option<String>,
    /// Handler id per platform key.
    #[serde(default)]
    pub classes: HashMap<String, String>,
    pub action: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub callback_channel: Option<String>,
}

impl PluginMessage {
    /// Handler id declared for `platform`, if any.
    pub fn handler_for(&self, platform: &str) -> Option<&str> {
        self.classes.get(platform).map(String::as_str)
    }

    /// Callback channel, treating an empty string as absent.
    pub fn callback_channel(&self) -> Option<&str> {
        self.callback_channel.as_deref().filter(|c| !c.is_empty())
    }
}

/// Broker operation requested by a web view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PubSubAction {
    Subscribe,
    Unsubscribe,
    Publish,
}

/// `{type:"pubsub", action, channel, message?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubSubMessage {
    pub action: PubSubAction,
    pub channel: String,
    #[serde(default)]
    pub message: Option<Value>,
}

/// Navigation verb requested by a web view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationAction {
    Push,
    Pop,
    Modal,
    Dismiss,
    Replace,
}

fn default_animated() -> bool {
    true
}

/// `{type:"navigation", action, controller?, page?, data?, animated?, clearHistory?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationMessage {
    pub action: NavigationAction,
    #[serde(default)]
    pub controller: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default = "default_animated")]
    pub animated: bool,
    #[serde(default)]
    pub clear_history: bool,
}

/// `{type:"log", value}`: a log line emitted by the web runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    #[serde(default)]
    pub value: Value,
}

/// Every message type the routing core understands.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Plugin(PluginMessage),
    PubSub(PubSubMessage),
    Navigation(NavigationMessage),
    Log(LogMessage),
}

impl InboundMessage {
    /// Parse a raw JSON string received from the web runtime.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| CobaltError::MalformedMessage(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Interpret an already-parsed envelope.
    ///
    /// The `type` discriminator is read first so that an unknown type is
    /// reported as such instead of as a field mismatch.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| CobaltError::MalformedMessage("missing string field `type`".into()))?
            .to_owned();

        let malformed = |e: serde_json::Error| CobaltError::MalformedMessage(format!("{kind}: {e}"));

        match kind.as_str() {
            TYPE_PLUGIN => serde_json::from_value(value).map(Self::Plugin).map_err(malformed),
            TYPE_PUBSUB => serde_json::from_value(value).map(Self::PubSub).map_err(malformed),
            TYPE_NAVIGATION => serde_json::from_value(value)
                .map(Self::Navigation)
                .map_err(malformed),
            TYPE_LOG => serde_json::from_value(value).map(Self::Log).map_err(malformed),
            _ => Err(CobaltError::UnknownMessageType(kind)),
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound envelopes (native -> web runtime)
// ---------------------------------------------------------------------------

/// Process-wide lifecycle notifications sent to the visible web view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    Started,
    Foreground,
    Background,
}

impl AppEvent {
    /// Event name as seen by the web runtime.
    pub fn name(self) -> &'static str {
        match self {
            Self::Started => "cobalt:onAppStarted",
            Self::Foreground => "cobalt:onAppForeground",
            Self::Background => "cobalt:onAppBackground",
        }
    }
}

/// Messages injected into a web runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    /// A channel delivery to a subscribed web view.
    PubSub {
        channel: String,
        message: Option<Value>,
    },
    /// A named event, optionally with data.
    Event { event: String, data: Option<Value> },
}

impl OutboundMessage {
    pub fn app_event(event: AppEvent) -> Self {
        Self::Event {
            event: event.name().to_owned(),
            data: None,
        }
    }

    /// JSON envelope handed to the web runtime. Absent payloads are omitted.
    pub fn into_value(self) -> Value {
        match self {
            Self::PubSub { channel, message } => {
                let mut envelope = json!({ "type": TYPE_PUBSUB, "channel": channel });
                if let Some(message) = message {
                    envelope["message"] = message;
                }
                envelope
            }
            Self::Event { event, data } => {
                let mut envelope = json!({ "type": TYPE_EVENT, "event": event });
                if let Some(data) = data {
                    envelope["data"] = data;
                }
                envelope
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// How a screen was brought on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PushStyle {
    #[default]
    Normal,
    /// Presented with an overlay-style transition.
    Modal,
    /// Revealed underneath a dismissed modal.
    PopAsModal,
}

/// Animation selected for a screen transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Whatever the platform plays by default.
    Default,
    /// Explicitly no animation.
    None,
    ModalOpen,
    ModalClose,
    ModalPush,
    ModalPop,
}
