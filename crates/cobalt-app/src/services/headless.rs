// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Headless stand-ins for the platform layer.
//
// One console "web view" shared by every screen writes outbound envelopes as
// JSON lines. The navigator plays screen factory and screen owner: it keeps
// the strong references the navigation stack only points at weakly.

use std::io::Write;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::Value;
use tracing::{debug, info, warn};

use cobalt_bridge::{BridgeServices, ManagedScreen, NavigationRequest, Navigator, Screen, WebContainer};
use cobalt_core::types::{NavigationAction, PushStyle};

/// Writes every envelope it receives to a sink, one JSON document per line.
pub struct ConsoleContainer {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleContainer {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl WebContainer for ConsoleContainer {
    fn send_message(&self, message: Value) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
            warn!(error = %e, "console web view write failed");
        }
    }
}

/// Screen factory and owner for the headless host.
pub struct HeadlessNavigator {
    container: Arc<dyn WebContainer>,
    services: OnceLock<BridgeServices>,
    screens: Mutex<Vec<Arc<ManagedScreen>>>,
}

impl HeadlessNavigator {
    pub fn new(container: Arc<dyn WebContainer>) -> Self {
        Self {
            container,
            services: OnceLock::new(),
            screens: Mutex::new(Vec::new()),
        }
    }

    /// Connect to the bridge. Only the first call has an effect.
    pub fn attach(&self, services: BridgeServices) {
        if self.services.set(services).is_err() {
            warn!("headless navigator already attached");
        }
    }

    /// Open the first screen for `controller`.
    pub fn open_root(&self, controller: &str, page: Option<String>) -> Option<Arc<ManagedScreen>> {
        let services = self.services.get()?;
        Some(self.present(services, controller, page, PushStyle::Normal, true))
    }

    fn present(
        &self,
        services: &BridgeServices,
        controller: &str,
        page: Option<String>,
        style: PushStyle,
        animated: bool,
    ) -> Arc<ManagedScreen> {
        let screen = Arc::new(
            ManagedScreen::new(controller, page)
                .with_push_style(style)
                .with_animated(animated)
                .with_container(Arc::clone(&self.container)),
        );
        let as_screen: Arc<dyn Screen> = Arc::clone(&screen) as Arc<dyn Screen>;
        let transition = services.stack().on_screen_created(&as_screen);
        services.on_screen_started(screen.as_ref());
        info!(
            screen = %screen.id(),
            controller,
            page = screen.page().unwrap_or_default(),
            ?transition,
            "screen shown"
        );

        let mut screens = self.screens.lock().unwrap_or_else(|e| e.into_inner());
        screens.retain(|s| !s.is_finished());
        screens.push(Arc::clone(&screen));
        screen
    }

    fn close(&self, services: &BridgeServices, screen: &Arc<dyn Screen>) {
        let transition = services.stack().finish_screen(screen);
        services.on_screen_stopped(screen.as_ref());
        debug!(screen = %screen.id(), ?transition, "screen closed");
    }

    /// Screens not yet finished.
    pub fn open_screens(&self) -> usize {
        let mut screens = self.screens.lock().unwrap_or_else(|e| e.into_inner());
        screens.retain(|s| !s.is_finished());
        screens.len()
    }
}

impl Navigator for HeadlessNavigator {
    fn navigate(&self, from: Option<Arc<dyn Screen>>, request: NavigationRequest) {
        let Some(services) = self.services.get() else {
            warn!(action = ?request.action, "navigation requested before the navigator was attached");
            return;
        };

        let older = if request.clear_history {
            services.stack().ids()
        } else {
            Vec::new()
        };

        self.present(
            services,
            &request.controller.controller,
            request.page.clone(),
            request.push_style,
            request.animated,
        );

        match request.action {
            NavigationAction::Push | NavigationAction::Modal => {
                if let Some(from) = &from {
                    services.on_screen_stopped(from.as_ref());
                }
            }
            NavigationAction::Replace | NavigationAction::Dismiss => {
                if let Some(from) = &from {
                    self.close(services, from);
                }
            }
            NavigationAction::Pop => debug!("pop is handled by the navigation stack"),
        }

        for id in older {
            if let Some(screen) = services.stack().get(id) {
                self.close(services, &screen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_bridge::{ChannelBroker, PluginRegistry, ui_channel};
    use cobalt_core::{BridgeConfig, BridgeSettings};

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn host() -> (BridgeServices, Arc<HeadlessNavigator>, cobalt_bridge::UiLoop) {
        let (ui, mut ui_loop) = ui_channel();
        ui_loop.run_pending();
        let container: Arc<dyn WebContainer> = Arc::new(ConsoleContainer::with_writer(Box::new(std::io::sink())));
        let navigator = Arc::new(HeadlessNavigator::new(container));
        let config = BridgeConfig::from_json_str(
            r#"{"controllers":{"default":{"android":".Main"},"settings":{"android":".Settings"}}}"#,
        )
        .expect("config");
        let services = BridgeServices::new(
            config,
            BridgeSettings::default(),
            ChannelBroker::new(),
            PluginRegistry::new(),
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            ui,
        );
        navigator.attach(services.clone());
        (services, navigator, ui_loop)
    }

    #[test]
    fn console_writes_json_lines() {
        let buf = SharedBuf::default();
        let console = ConsoleContainer::with_writer(Box::new(buf.clone()));
        console.send_message(serde_json::json!({"type": "event", "event": "x"}));
        console.send_message(serde_json::json!({"type": "event", "event": "y"}));

        let text = String::from_utf8(buf.0.lock().expect("lock").clone()).expect("utf8");
        assert_eq!(
            text,
            "{\"event\":\"x\",\"type\":\"event\"}\n{\"event\":\"y\",\"type\":\"event\"}\n"
        );
    }

    #[test]
    fn push_then_pop_round_trip() {
        let (services, navigator, _ui_loop) = host();
        let root = navigator.open_root("default", Some("index.html".into())).expect("attached");
        let container = root.web_container().expect("container");

        services.on_web_message(
            Arc::clone(&container),
            r#"{"type":"navigation","action":"push","controller":"settings","page":"prefs.html"}"#,
        );
        assert_eq!(services.stack().len(), 2);

        services.on_web_message(
            container,
            r#"{"type":"navigation","action":"pop","controller":"default","page":"index.html","data":{"saved":1}}"#,
        );
        assert_eq!(services.stack().ids(), vec![root.id()]);
        assert_eq!(root.take_data_for_pop(), Some(serde_json::json!({"saved": 1})));
        assert_eq!(navigator.open_screens(), 1);
    }

    #[test]
    fn replace_with_clear_history_leaves_one_screen() {
        let (services, navigator, _ui_loop) = host();
        let root = navigator.open_root("default", None).expect("attached");
        let container = root.web_container().expect("container");

        services.on_web_message(
            container,
            r#"{"type":"navigation","action":"replace","controller":"settings","clearHistory":true}"#,
        );
        assert_eq!(services.stack().len(), 1);
        assert!(root.is_finished());
        assert_eq!(
            services.stack().top().map(|s| s.controller().to_owned()),
            Some("settings".to_owned())
        );
    }
}
