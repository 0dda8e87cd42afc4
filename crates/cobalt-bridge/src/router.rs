// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Envelope routing by `type`. Runs on the UI context only.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use cobalt_core::config::DEFAULT_CONTROLLER;
use cobalt_core::error::{CobaltError, Result};
use cobalt_core::types::{
    InboundMessage, LogMessage, NavigationAction, NavigationMessage, PubSubAction, PubSubMessage,
};

use crate::container::WebContainer;
use crate::navigation::NavigationRequest;
use crate::services::BridgeServices;

impl BridgeServices {
    pub(crate) fn route(&self, container: Arc<dyn WebContainer>, message: InboundMessage) -> Result<()> {
        match message {
            InboundMessage::Plugin(message) => {
                // The dispatcher logs its own failures.
                self.plugins.dispatch(container, message);
                Ok(())
            }
            InboundMessage::PubSub(message) => self.route_pubsub(&container, message),
            InboundMessage::Navigation(message) => self.route_navigation(&container, message),
            InboundMessage::Log(message) => {
                web_log(message);
                Ok(())
            }
        }
    }

    fn route_pubsub(&self, container: &Arc<dyn WebContainer>, message: PubSubMessage) -> Result<()> {
        if message.channel.is_empty() {
            return Err(CobaltError::MalformedMessage("pubsub message with an empty channel".into()));
        }
        match message.action {
            PubSubAction::Subscribe => self.broker.subscribe_view(container, &message.channel),
            PubSubAction::Unsubscribe => self.broker.unsubscribe_view(container, &message.channel),
            PubSubAction::Publish => self.broker.publish(message.message.as_ref(), &message.channel),
        }
        Ok(())
    }

    fn route_navigation(&self, container: &Arc<dyn WebContainer>, message: NavigationMessage) -> Result<()> {
        let from = self
            .stack
            .find_by_container(container)
            .or_else(|| self.stack.top());

        let NavigationMessage {
            action,
            controller,
            page,
            data,
            animated,
            clear_history,
        } = message;

        if action == NavigationAction::Pop {
            if let Some(controller) = controller.as_deref() {
                return self.stack.pop_to(controller, page.as_deref(), data);
            }
            if data.is_some() {
                self.stack.data_for_pop(data);
            }
            match from {
                Some(screen) => {
                    let transition = self.stack.finish_screen(&screen);
                    debug!(screen = %screen.id(), ?transition, "screen popped");
                }
                None => debug!("pop requested with empty history"),
            }
            return Ok(());
        }

        let resolved = self
            .config
            .resolve_controller(controller.as_deref(), self.platform, &self.settings)
            .ok_or_else(|| {
                CobaltError::UnknownController(controller.unwrap_or_else(|| DEFAULT_CONTROLLER.to_owned()))
            })?;

        info!(
            ?action,
            controller = %resolved.controller,
            screen_class = %resolved.screen_class,
            page = page.as_deref().unwrap_or_default(),
            "navigation requested"
        );
        let request = NavigationRequest {
            action,
            push_style: NavigationRequest::push_style_for(action),
            controller: resolved,
            page,
            data,
            animated,
            clear_history,
        };
        self.navigator.navigate(from, request);
        Ok(())
    }
}

/// Re-emit a web runtime log line.
fn web_log(message: LogMessage) {
    match message.value {
        Value::String(line) => info!(target: "cobalt::web", "{line}"),
        other => info!(target: "cobalt::web", "{other}"),
    }
}
