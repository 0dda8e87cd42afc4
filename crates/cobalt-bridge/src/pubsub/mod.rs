// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Channel-based publish/subscribe between native components and web views.

pub mod broker;
mod receiver;

pub use broker::ChannelBroker;
pub use receiver::PubSubListener;
