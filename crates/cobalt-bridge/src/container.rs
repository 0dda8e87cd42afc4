// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The web-content container abstraction.
//
// A container wraps one embedded web runtime. The platform layer owns it; the
// routing core only ever holds weak references (broker) or short-lived strong
// ones for the duration of a plugin call.

use serde_json::Value;

use cobalt_core::types::{AppEvent, OutboundMessage};

/// Something that can inject a JSON envelope into a web runtime.
pub trait WebContainer: Send + Sync {
    /// Push `message` into the web runtime's inbound-message path.
    fn send_message(&self, message: Value);

    /// Send a named event envelope.
    fn send_event(&self, event: &str, data: Option<Value>) {
        self.send_message(
            OutboundMessage::Event {
                event: event.to_owned(),
                data,
            }
            .into_value(),
        );
    }

    /// Send one of the process-wide lifecycle events.
    fn send_app_event(&self, event: AppEvent) {
        self.send_event(event.name(), None);
    }
}
