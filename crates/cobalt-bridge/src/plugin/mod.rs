// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Native plugins addressed from web content.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::PluginDispatcher;
pub use registry::{Plugin, PluginRegistry};
