// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cobalt bridge: the message-routing core between embedded web content and
// native code.
//
// Web runtimes post JSON envelopes; `BridgeServices` marshals each one onto
// the UI-owning context and routes it by `type` to the channel broker, the
// plugin dispatcher, or the navigation stack. Platform concerns (web views,
// screen factories) stay behind the `WebContainer`, `Screen`, and
// `Navigator` traits.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod container;
pub mod lifecycle;
pub mod navigation;
pub mod plugin;
pub mod pubsub;
mod router;
pub mod services;
pub mod ui_thread;

pub use container::WebContainer;
pub use lifecycle::AppLifecycle;
pub use navigation::{ManagedScreen, NavigationRequest, NavigationStack, Navigator, Screen};
pub use plugin::{Plugin, PluginDispatcher, PluginRegistry};
pub use pubsub::{ChannelBroker, PubSubListener};
pub use services::BridgeServices;
pub use ui_thread::{UiLoop, UiThread, ui_channel};

/// Lock `mutex`, recovering the data if a panicking holder poisoned it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
