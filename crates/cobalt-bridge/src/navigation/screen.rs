// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Screens as seen by the navigation stack.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use cobalt_core::types::{PushStyle, ScreenId};

use crate::container::WebContainer;
use crate::lock;

/// A live screen instance owned by the host platform.
///
/// The navigation stack only keeps a weak back-reference; the platform's
/// screen-lifecycle owner holds the strong one.
pub trait Screen: Send + Sync {
    fn id(&self) -> ScreenId;

    /// Logical controller this screen was created for.
    fn controller(&self) -> &str;

    /// Logical page, for screens that track one.
    fn page(&self) -> Option<&str> {
        None
    }

    /// Whether the bridge manages this screen. Managed screens track pages
    /// and accept pop data; foreign screens match `pop_to` on controller
    /// alone.
    fn is_managed(&self) -> bool {
        false
    }

    /// Store data to hand over when this screen is shown again.
    fn set_data_for_pop(&self, _data: Option<Value>) {}

    /// Ask the platform to close this screen.
    fn finish(&self);

    fn push_style(&self) -> PushStyle {
        PushStyle::Normal
    }

    fn animated(&self) -> bool {
        true
    }

    /// Web container hosted by this screen, if any.
    fn web_container(&self) -> Option<Arc<dyn WebContainer>> {
        None
    }
}

/// Stock bridge-managed screen.
pub struct ManagedScreen {
    id: ScreenId,
    controller: String,
    page: Option<String>,
    push_style: PushStyle,
    animated: bool,
    container: Option<Arc<dyn WebContainer>>,
    data_for_pop: Mutex<Option<Value>>,
    finished: AtomicBool,
}

impl ManagedScreen {
    pub fn new(controller: impl Into<String>, page: Option<String>) -> Self {
        Self {
            id: ScreenId::new(),
            controller: controller.into(),
            page,
            push_style: PushStyle::Normal,
            animated: true,
            container: None,
            data_for_pop: Mutex::new(None),
            finished: AtomicBool::new(false),
        }
    }

    pub fn with_push_style(mut self, style: PushStyle) -> Self {
        self.push_style = style;
        self
    }

    pub fn with_animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    pub fn with_container(mut self, container: Arc<dyn WebContainer>) -> Self {
        self.container = Some(container);
        self
    }

    /// Pending pop data, cleared on read. The host calls this when the
    /// screen becomes visible again.
    pub fn take_data_for_pop(&self) -> Option<Value> {
        lock(&self.data_for_pop).take()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl Screen for ManagedScreen {
    fn id(&self) -> ScreenId {
        self.id
    }

    fn controller(&self) -> &str {
        &self.controller
    }

    fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    fn is_managed(&self) -> bool {
        true
    }

    fn set_data_for_pop(&self, data: Option<Value>) {
        *lock(&self.data_for_pop) = data;
    }

    fn finish(&self) {
        if !self.finished.swap(true, Ordering::SeqCst) {
            debug!(screen = %self.id, controller = %self.controller, "screen finished");
        }
    }

    fn push_style(&self) -> PushStyle {
        self.push_style
    }

    fn animated(&self) -> bool {
        self.animated
    }

    fn web_container(&self) -> Option<Arc<dyn WebContainer>> {
        self.container.clone()
    }
}
