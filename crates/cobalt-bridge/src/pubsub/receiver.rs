// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subscription records.
//
// A receiver pairs a weakly-held target with the set of channels it listens
// to. The weak handle doubles as the liveness check: once the platform drops
// the last strong reference, delivery reports the target as gone and the
// broker evicts the record.

use std::sync::{Mutex, Weak};

use serde_json::Value;
use tracing::warn;

use cobalt_core::types::OutboundMessage;

use crate::container::WebContainer;
use crate::lock;

/// Native component notified of messages published on its channels.
pub trait PubSubListener: Send + Sync {
    fn on_message(&self, message: Option<&Value>, channel: &str);
}

/// What a receiver delivers to.
pub(crate) enum ReceiverTarget {
    /// A native listener, called directly with `(message, channel)`.
    Callback(Weak<dyn PubSubListener>),
    /// A web container, sent a `{type:"pubsub", channel, message}` envelope.
    View(Weak<dyn WebContainer>),
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    Delivered,
    /// The weak target has been dropped; the receiver should be evicted.
    TargetGone,
}

pub(crate) struct Receiver {
    target: ReceiverTarget,
    /// Insertion-ordered, duplicate-free. Never empty while registered.
    channels: Mutex<Vec<String>>,
}

impl Receiver {
    pub(crate) fn new(target: ReceiverTarget, channel: &str) -> Self {
        Self {
            target,
            channels: Mutex::new(vec![channel.to_owned()]),
        }
    }

    /// Whether this is the callback receiver for the listener at `addr`.
    pub(crate) fn is_callback_for(&self, addr: *const ()) -> bool {
        match &self.target {
            ReceiverTarget::Callback(weak) => std::ptr::addr_eq(weak.as_ptr(), addr),
            ReceiverTarget::View(_) => false,
        }
    }

    /// Whether this is the view receiver for the container at `addr`.
    pub(crate) fn is_view_for(&self, addr: *const ()) -> bool {
        match &self.target {
            ReceiverTarget::View(weak) => std::ptr::addr_eq(weak.as_ptr(), addr),
            ReceiverTarget::Callback(_) => false,
        }
    }

    pub(crate) fn has_subscribed(&self, channel: &str) -> bool {
        lock(&self.channels).iter().any(|c| c == channel)
    }

    /// Add `channel`; no-op when already present.
    pub(crate) fn subscribe(&self, channel: &str) {
        let mut channels = lock(&self.channels);
        if !channels.iter().any(|c| c == channel) {
            channels.push(channel.to_owned());
        }
    }

    /// Remove `channel`. Returns `true` when no channel is left.
    pub(crate) fn unsubscribe(&self, channel: &str) -> bool {
        let mut channels = lock(&self.channels);
        channels.retain(|c| c != channel);
        channels.is_empty()
    }

    pub(crate) fn channels(&self) -> Vec<String> {
        lock(&self.channels).clone()
    }

    pub(crate) fn deliver(&self, message: Option<&Value>, channel: &str) -> Delivery {
        match &self.target {
            ReceiverTarget::Callback(weak) => {
                let Some(listener) = weak.upgrade() else {
                    warn!(channel, "listener dropped before delivery, removing its receiver");
                    return Delivery::TargetGone;
                };
                listener.on_message(message, channel);
            }
            ReceiverTarget::View(weak) => {
                let Some(container) = weak.upgrade() else {
                    warn!(channel, "web container dropped before delivery, removing its receiver");
                    return Delivery::TargetGone;
                };
                let envelope = OutboundMessage::PubSub {
                    channel: channel.to_owned(),
                    message: message.cloned(),
                };
                container.send_message(envelope.into_value());
            }
        }
        Delivery::Delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Silent;

    impl PubSubListener for Silent {
        fn on_message(&self, _message: Option<&Value>, _channel: &str) {}
    }

    fn receiver_for(listener: &Arc<dyn PubSubListener>, channel: &str) -> Receiver {
        Receiver::new(ReceiverTarget::Callback(Arc::downgrade(listener)), channel)
    }

    #[test]
    fn channel_set_stays_duplicate_free() {
        let listener: Arc<dyn PubSubListener> = Arc::new(Silent);
        let receiver = receiver_for(&listener, "a");
        receiver.subscribe("a");
        receiver.subscribe("b");
        assert_eq!(receiver.channels(), vec!["a".to_owned(), "b".to_owned()]);
    }

    #[test]
    fn unsubscribing_last_channel_reports_empty() {
        let listener: Arc<dyn PubSubListener> = Arc::new(Silent);
        let receiver = receiver_for(&listener, "a");
        receiver.subscribe("b");
        assert!(!receiver.unsubscribe("a"));
        assert!(!receiver.unsubscribe("missing"));
        assert!(receiver.unsubscribe("b"));
    }

    #[test]
    fn identity_is_by_target_address() {
        let listener: Arc<dyn PubSubListener> = Arc::new(Silent);
        let other: Arc<dyn PubSubListener> = Arc::new(Silent);
        let receiver = receiver_for(&listener, "a");
        assert!(receiver.is_callback_for(Arc::as_ptr(&listener) as *const ()));
        assert!(!receiver.is_callback_for(Arc::as_ptr(&other) as *const ()));
        assert!(!receiver.is_view_for(Arc::as_ptr(&listener) as *const ()));
    }

    #[test]
    fn dropped_target_reports_gone() {
        let listener: Arc<dyn PubSubListener> = Arc::new(Silent);
        let receiver = receiver_for(&listener, "a");
        assert_eq!(receiver.deliver(None, "a"), Delivery::Delivered);
        drop(listener);
        assert_eq!(receiver.deliver(None, "a"), Delivery::TargetGone);
    }
}
