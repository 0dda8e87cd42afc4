// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Screen history and transitions.

pub mod navigator;
pub mod screen;
pub mod stack;
mod transition;

pub use navigator::{NavigationRequest, Navigator};
pub use screen::{ManagedScreen, Screen};
pub use stack::NavigationStack;
