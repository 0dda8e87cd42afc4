// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel publish/subscribe broker.
//
// Native listeners and web containers subscribe to named channels; publishing
// fans a message out to every receiver subscribed to the channel, in
// registration order. Channels have no object of their own: a channel exists
// for as long as some receiver lists it.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{debug, trace};

use crate::container::WebContainer;
use crate::lock;
use crate::pubsub::receiver::{Delivery, PubSubListener, Receiver, ReceiverTarget};

/// The receiver registry plus the delivery loop.
///
/// Cloning yields another handle to the same registry. Receivers hold only
/// weak references, so the broker never extends a listener's or container's
/// lifetime.
#[derive(Clone, Default)]
pub struct ChannelBroker {
    receivers: Arc<Mutex<Vec<Arc<Receiver>>>>,
}

fn addr<T: ?Sized>(target: &Arc<T>) -> *const () {
    Arc::as_ptr(target) as *const ()
}

impl ChannelBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `message` to every receiver subscribed to `channel`.
    ///
    /// Iterates over a snapshot so that listeners may subscribe or
    /// unsubscribe from inside their callback. Subscription is re-checked at
    /// each receiver's turn. Receivers whose target has been dropped are
    /// evicted instead of delivered to.
    pub fn publish(&self, message: Option<&Value>, channel: &str) {
        let snapshot: Vec<Arc<Receiver>> = lock(&self.receivers).clone();
        let mut delivered = 0usize;

        for receiver in snapshot {
            if !receiver.has_subscribed(channel) {
                continue;
            }
            match receiver.deliver(message, channel) {
                Delivery::Delivered => delivered += 1,
                Delivery::TargetGone => self.on_receiver_empty(&receiver),
            }
        }

        trace!(channel, delivered, "message published");
    }

    /// Subscribe a native listener to `channel`. Idempotent.
    pub fn subscribe_callback(&self, listener: &Arc<dyn PubSubListener>, channel: &str) {
        let target = addr(listener);
        self.subscribe_with(
            |r| r.is_callback_for(target),
            || ReceiverTarget::Callback(Arc::downgrade(listener)),
            channel,
        );
    }

    /// Subscribe a web container to `channel`. Idempotent.
    pub fn subscribe_view(&self, container: &Arc<dyn WebContainer>, channel: &str) {
        let target = addr(container);
        self.subscribe_with(
            |r| r.is_view_for(target),
            || ReceiverTarget::View(Arc::downgrade(container)),
            channel,
        );
    }

    /// Remove `channel` from a native listener's subscriptions.
    pub fn unsubscribe_callback(&self, listener: &Arc<dyn PubSubListener>, channel: &str) {
        let target = addr(listener);
        self.unsubscribe_with(|r| r.is_callback_for(target), channel);
    }

    /// Remove `channel` from a web container's subscriptions.
    pub fn unsubscribe_view(&self, container: &Arc<dyn WebContainer>, channel: &str) {
        let target = addr(container);
        self.unsubscribe_with(|r| r.is_view_for(target), channel);
    }

    /// Channels a native listener is subscribed to, in subscription order.
    pub fn channels_for_listener(&self, listener: &Arc<dyn PubSubListener>) -> Vec<String> {
        let target = addr(listener);
        self.find(|r| r.is_callback_for(target))
            .map(|r| r.channels())
            .unwrap_or_default()
    }

    /// Channels a web container is subscribed to, in subscription order.
    pub fn channels_for_view(&self, container: &Arc<dyn WebContainer>) -> Vec<String> {
        let target = addr(container);
        self.find(|r| r.is_view_for(target))
            .map(|r| r.channels())
            .unwrap_or_default()
    }

    /// Number of registered receivers, stale ones included until evicted.
    pub fn receiver_count(&self) -> usize {
        lock(&self.receivers).len()
    }

    /// Drop `receiver` from the registry: it has no channel left or its
    /// target is gone.
    pub(crate) fn on_receiver_empty(&self, receiver: &Arc<Receiver>) {
        lock(&self.receivers).retain(|r| !Arc::ptr_eq(r, receiver));
        debug!("receiver removed from registry");
    }

    // -- Helpers --------------------------------------------------------------

    fn find(&self, matches: impl Fn(&Receiver) -> bool) -> Option<Arc<Receiver>> {
        lock(&self.receivers)
            .iter()
            .find(|r| matches(r))
            .cloned()
    }

    fn subscribe_with(
        &self,
        matches: impl Fn(&Receiver) -> bool,
        target: impl FnOnce() -> ReceiverTarget,
        channel: &str,
    ) {
        let mut receivers = lock(&self.receivers);
        match receivers.iter().find(|r| matches(r)) {
            Some(existing) => existing.subscribe(channel),
            None => receivers.push(Arc::new(Receiver::new(target(), channel))),
        }
        debug!(channel, receivers = receivers.len(), "subscribed");
    }

    fn unsubscribe_with(&self, matches: impl Fn(&Receiver) -> bool, channel: &str) {
        let Some(receiver) = self.find(matches) else {
            debug!(channel, "unsubscribe from an unknown receiver ignored");
            return;
        };
        if receiver.unsubscribe(channel) {
            self.on_receiver_empty(&receiver);
        }
    }
}
