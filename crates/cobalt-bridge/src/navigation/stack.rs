// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Navigation history.
//
// An ordered list of live screens, oldest first. Screens are held weakly;
// entries whose screen has been dropped without an explicit destroy
// notification are pruned on the next access.

use std::sync::{Arc, Mutex, Weak};

use serde_json::Value;
use tracing::{debug, info};

use cobalt_core::error::{CobaltError, Result};
use cobalt_core::types::{ScreenId, Transition};

use super::screen::Screen;
use super::transition::ModalState;
use crate::container::WebContainer;
use crate::lock;

struct Entry {
    id: ScreenId,
    screen: Weak<dyn Screen>,
}

#[derive(Default)]
struct StackState {
    entries: Vec<Entry>,
    modal: ModalState,
}

impl StackState {
    fn prune(&mut self) {
        self.entries.retain(|e| e.screen.strong_count() > 0);
    }

    fn live(&mut self) -> Vec<Arc<dyn Screen>> {
        self.prune();
        self.entries.iter().filter_map(|e| e.screen.upgrade()).collect()
    }
}

/// Process-wide navigation history shared by every screen.
#[derive(Clone, Default)]
pub struct NavigationStack {
    state: Arc<Mutex<StackState>>,
}

/// `pop_to` target test: controller always, page only for screens that
/// track one.
fn is_pop_target(screen: &dyn Screen, controller: &str, page: Option<&str>) -> bool {
    screen.controller() == controller && (!screen.is_managed() || screen.page() == page)
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live screens, oldest first. The lock is released before returning.
    fn snapshot(&self) -> Vec<Arc<dyn Screen>> {
        lock(&self.state).live()
    }

    /// Append a newly created screen. Returns the transition to play.
    pub fn on_screen_created(&self, screen: &Arc<dyn Screen>) -> Transition {
        let id = screen.id();
        let (style, animated) = (screen.push_style(), screen.animated());
        let (transition, depth) = {
            let mut state = lock(&self.state);
            state.entries.push(Entry {
                id,
                screen: Arc::downgrade(screen),
            });
            (state.modal.on_created(style, animated), state.entries.len())
        };
        debug!(
            screen = %id,
            controller = screen.controller(),
            depth,
            ?transition,
            "screen created"
        );
        transition
    }

    /// A screen is about to finish. Returns the transition to play; the
    /// entry stays until [`Self::on_screen_destroyed`].
    pub fn on_screen_finishing(&self, screen: &dyn Screen) -> Transition {
        let (style, animated) = (screen.push_style(), screen.animated());
        lock(&self.state).modal.on_finishing(style, animated)
    }

    /// Remove `id` wherever it sits. Unknown ids are ignored.
    pub fn on_screen_destroyed(&self, id: ScreenId) {
        let mut state = lock(&self.state);
        let before = state.entries.len();
        state.entries.retain(|e| e.id != id);
        if state.entries.len() != before {
            debug!(screen = %id, depth = state.entries.len(), "screen destroyed");
        }
    }

    /// Finish `screen` on the bridge's initiative and drop it from history.
    pub fn finish_screen(&self, screen: &Arc<dyn Screen>) -> Transition {
        let id = screen.id();
        let (style, animated) = (screen.push_style(), screen.animated());
        let transition = {
            let mut state = lock(&self.state);
            state.entries.retain(|e| e.id != id);
            state.modal.on_finishing(style, animated)
        };
        screen.finish();
        transition
    }

    /// Return to the most recent screen showing `controller` (and `page`,
    /// for screens that track pages), handing it `data`.
    ///
    /// Every later screen is removed and finished, newest first. When no
    /// screen matches nothing changes and [`CobaltError::HistoryMiss`] is
    /// returned.
    pub fn pop_to(&self, controller: &str, page: Option<&str>, data: Option<Value>) -> Result<()> {
        let miss = || CobaltError::HistoryMiss {
            controller: controller.to_owned(),
            page: page.map(str::to_owned),
        };

        let target = self
            .snapshot()
            .into_iter()
            .rev()
            .find(|screen| is_pop_target(screen.as_ref(), controller, page))
            .ok_or_else(miss)?;
        let target_id = target.id();

        let later: Vec<Arc<dyn Screen>> = {
            let mut state = lock(&self.state);
            let index = state
                .entries
                .iter()
                .position(|e| e.id == target_id)
                .ok_or_else(miss)?;
            state
                .entries
                .drain(index + 1..)
                .filter_map(|e| e.screen.upgrade())
                .collect()
        };

        target.set_data_for_pop(data);
        info!(
            controller,
            page = page.unwrap_or_default(),
            removed = later.len(),
            "popping back through history"
        );

        for screen in later.into_iter().rev() {
            let transition = self.on_screen_finishing(screen.as_ref());
            screen.finish();
            debug!(screen = %screen.id(), ?transition, "screen popped");
        }
        Ok(())
    }

    /// Give `data` to the nearest managed screen below the top one.
    ///
    /// Returns `false` (and does nothing) when there are fewer than two
    /// screens or none of the lower ones is managed.
    pub fn data_for_pop(&self, data: Option<Value>) -> bool {
        let screens = self.snapshot();
        let Some((_, below)) = screens.split_last() else {
            return false;
        };
        match below.iter().rev().find(|s| s.is_managed()) {
            Some(screen) => {
                screen.set_data_for_pop(data);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live screen ids, oldest first.
    pub fn ids(&self) -> Vec<ScreenId> {
        self.snapshot().iter().map(|s| s.id()).collect()
    }

    /// The most recent live screen.
    pub fn top(&self) -> Option<Arc<dyn Screen>> {
        self.snapshot().pop()
    }

    pub fn get(&self, id: ScreenId) -> Option<Arc<dyn Screen>> {
        self.snapshot().into_iter().find(|s| s.id() == id)
    }

    /// The screen hosting `container`, newest first.
    pub fn find_by_container(&self, container: &Arc<dyn WebContainer>) -> Option<Arc<dyn Screen>> {
        let addr = Arc::as_ptr(container) as *const ();
        self.snapshot().into_iter().rev().find(|s| {
            s.web_container()
                .is_some_and(|c| std::ptr::addr_eq(Arc::as_ptr(&c), addr))
        })
    }

    pub fn is_modal_active(&self) -> bool {
        lock(&self.state).modal.is_active()
    }
}
