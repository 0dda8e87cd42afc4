// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host screen factory seam.
//
// Creating screens is platform work. The bridge resolves the controller and
// hands the host a typed request; the host builds the screen and reports it
// back through `NavigationStack::on_screen_created`.

use std::sync::Arc;

use serde_json::Value;

use cobalt_core::config::ResolvedController;
use cobalt_core::types::{NavigationAction, PushStyle};

use super::screen::Screen;

/// A screen-creating navigation requested by web content.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationRequest {
    pub action: NavigationAction,
    pub controller: ResolvedController,
    pub page: Option<String>,
    pub data: Option<Value>,
    pub animated: bool,
    pub clear_history: bool,
    /// Style the new screen should be created with.
    pub push_style: PushStyle,
}

impl NavigationRequest {
    /// Push style implied by `action`.
    pub fn push_style_for(action: NavigationAction) -> PushStyle {
        match action {
            NavigationAction::Modal => PushStyle::Modal,
            NavigationAction::Dismiss => PushStyle::PopAsModal,
            NavigationAction::Push | NavigationAction::Replace | NavigationAction::Pop => PushStyle::Normal,
        }
    }
}

/// Implemented by the host platform.
pub trait Navigator: Send + Sync {
    /// Carry out `request`. `from` is the screen whose web content asked.
    fn navigate(&self, from: Option<Arc<dyn Screen>>, request: NavigationRequest);
}
