// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application foreground/background tracking.
//
// The host reports each screen start/stop. When the count of started screens
// goes 0 -> 1 the app has come to the foreground (or started, the first
// time); 1 -> 0 means it went to the background. The event goes to the web
// container of the screen that caused the transition.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use cobalt_core::types::AppEvent;

use crate::container::WebContainer;
use crate::lock;

#[derive(Debug, Default)]
struct Counter {
    started: usize,
    launched: bool,
}

/// Started-screen counter emitting app lifecycle events.
#[derive(Clone, Default)]
pub struct AppLifecycle {
    counter: Arc<Mutex<Counter>>,
}

impl AppLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// A screen became visible.
    pub fn on_screen_started(&self, container: Option<Arc<dyn WebContainer>>) -> Option<AppEvent> {
        let event = {
            let mut counter = lock(&self.counter);
            counter.started += 1;
            if counter.started != 1 {
                None
            } else if counter.launched {
                Some(AppEvent::Foreground)
            } else {
                counter.launched = true;
                Some(AppEvent::Started)
            }
        };
        self.emit(event, container)
    }

    /// A screen stopped being visible.
    pub fn on_screen_stopped(&self, container: Option<Arc<dyn WebContainer>>) -> Option<AppEvent> {
        let event = {
            let mut counter = lock(&self.counter);
            match counter.started {
                0 => {
                    warn!("screen stopped without a matching start, ignoring");
                    None
                }
                1 => {
                    counter.started = 0;
                    Some(AppEvent::Background)
                }
                _ => {
                    counter.started -= 1;
                    None
                }
            }
        };
        self.emit(event, container)
    }

    pub fn started_screens(&self) -> usize {
        lock(&self.counter).started
    }

    fn emit(&self, event: Option<AppEvent>, container: Option<Arc<dyn WebContainer>>) -> Option<AppEvent> {
        let event = event?;
        match container {
            Some(container) => {
                debug!(event = event.name(), "sending app lifecycle event");
                container.send_app_event(event);
            }
            None => info!(event = event.name(), "no web container to notify of app lifecycle event"),
        }
        Some(event)
    }
}
