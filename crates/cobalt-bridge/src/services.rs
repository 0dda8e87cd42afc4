// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge service object.
//
// Owns one of each routing component and is built once at start-up, then
// cloned into whatever needs it (web containers, screens, plugins). All
// fields are shared handles, so clones observe the same state.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use cobalt_core::config::{BridgeConfig, BridgeSettings};
use cobalt_core::types::{AppEvent, InboundMessage, platform_key};

use crate::container::WebContainer;
use crate::lifecycle::AppLifecycle;
use crate::navigation::{NavigationStack, Navigator, Screen};
use crate::plugin::{PluginDispatcher, PluginRegistry};
use crate::pubsub::ChannelBroker;
use crate::ui_thread::UiThread;

#[derive(Clone)]
pub struct BridgeServices {
    pub(crate) config: Arc<BridgeConfig>,
    pub(crate) settings: Arc<BridgeSettings>,
    pub(crate) platform: &'static str,
    pub(crate) broker: ChannelBroker,
    pub(crate) stack: NavigationStack,
    pub(crate) plugins: PluginDispatcher,
    pub(crate) lifecycle: AppLifecycle,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) ui: UiThread,
}

impl BridgeServices {
    /// Wire the routing core together.
    ///
    /// `broker` is passed in so plugins registered in `registry` can hold a
    /// clone of it for their callbacks.
    pub fn new(
        config: BridgeConfig,
        settings: BridgeSettings,
        broker: ChannelBroker,
        mut registry: PluginRegistry,
        navigator: Arc<dyn Navigator>,
        ui: UiThread,
    ) -> Self {
        let platform = platform_key();
        registry.load_config(&config, platform);
        info!(
            platform,
            controllers = config.controllers.len(),
            debug = settings.debug,
            "bridge services initialised"
        );
        Self {
            config: Arc::new(config),
            settings: Arc::new(settings),
            platform,
            broker,
            stack: NavigationStack::new(),
            plugins: PluginDispatcher::new(registry, ui.clone()),
            lifecycle: AppLifecycle::new(),
            navigator,
            ui,
        }
    }

    pub fn broker(&self) -> &ChannelBroker {
        &self.broker
    }

    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn plugins(&self) -> &PluginDispatcher {
        &self.plugins
    }

    pub fn lifecycle(&self) -> &AppLifecycle {
        &self.lifecycle
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn ui(&self) -> &UiThread {
        &self.ui
    }

    /// Entry point for envelopes posted by the web runtime in `container`.
    ///
    /// Callable from any thread: the message is parsed and routed on the UI
    /// context. Failures are logged and the message is dropped.
    pub fn on_web_message(&self, container: Arc<dyn WebContainer>, raw: &str) {
        let services = self.clone();
        let raw = raw.to_owned();
        if let Err(e) = self
            .ui
            .run_on_ui(move || services.handle_web_message(container, &raw))
        {
            error!(error = %e, "web message could not be scheduled on the UI thread");
        }
    }

    fn handle_web_message(&self, container: Arc<dyn WebContainer>, raw: &str) {
        if self.settings.debug {
            debug!(raw, "web message received");
        }
        let outcome = InboundMessage::from_json_str(raw).and_then(|message| self.route(container, message));
        if let Err(e) = outcome {
            if self.settings.debug {
                warn!(error = %e, raw, "web message dropped");
            } else {
                warn!(error = %e, "web message dropped");
            }
        }
    }

    /// The host started (made visible) `screen`.
    pub fn on_screen_started(&self, screen: &dyn Screen) -> Option<AppEvent> {
        self.lifecycle.on_screen_started(screen.web_container())
    }

    /// The host stopped `screen`.
    pub fn on_screen_stopped(&self, screen: &dyn Screen) -> Option<AppEvent> {
        self.lifecycle.on_screen_stopped(screen.web_container())
    }

    /// The host destroyed `screen`: drop it from history and release its
    /// web container's subscriptions.
    pub fn on_screen_destroyed(&self, screen: &dyn Screen) {
        self.stack.on_screen_destroyed(screen.id());
        if let Some(container) = screen.web_container() {
            for channel in self.broker.channels_for_view(&container) {
                self.broker.unsubscribe_view(&container, &channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use serde_json::{Value, json};

    use cobalt_core::types::{NavigationAction, PushStyle};

    use crate::navigation::{ManagedScreen, NavigationRequest};
    use crate::plugin::Plugin;
    use crate::pubsub::PubSubListener;
    use crate::ui_thread::{UiLoop, ui_channel};

    const CONFIG: &str = r#"{
        "controllers": {
            "default": {"android": ".DefaultScreen"},
            "detail": {"android": "com.example.DetailScreen"}
        },
        "plugins": {
            "echo": {"android": "impl.echo"}
        }
    }"#;

    #[derive(Default)]
    struct Inbox(Mutex<Vec<Value>>);

    impl Inbox {
        fn messages(&self) -> Vec<Value> {
            self.0.lock().expect("lock").clone()
        }
    }

    impl WebContainer for Inbox {
        fn send_message(&self, message: Value) {
            self.0.lock().expect("lock").push(message);
        }
    }

    #[derive(Default)]
    struct RecordingNavigator(Mutex<Vec<NavigationRequest>>);

    impl Navigator for RecordingNavigator {
        fn navigate(&self, _from: Option<Arc<dyn Screen>>, request: NavigationRequest) {
            self.0.lock().expect("lock").push(request);
        }
    }

    /// Publishes `data` back on the callback channel.
    struct Echo {
        broker: ChannelBroker,
    }

    impl Plugin for Echo {
        fn on_message(
            &self,
            _container: Arc<dyn WebContainer>,
            _action: &str,
            data: Option<Value>,
            callback_channel: Option<String>,
        ) {
            if let Some(channel) = callback_channel {
                self.broker.publish(data.as_ref(), &channel);
            }
        }
    }

    #[derive(Default)]
    struct Listener(Mutex<Vec<(Option<Value>, String)>>);

    impl PubSubListener for Listener {
        fn on_message(&self, message: Option<&Value>, channel: &str) {
            self.0
                .lock()
                .expect("lock")
                .push((message.cloned(), channel.to_owned()));
        }
    }

    struct Harness {
        services: BridgeServices,
        ui_loop: UiLoop,
        navigator: Arc<RecordingNavigator>,
        inbox: Arc<Inbox>,
        container: Arc<dyn WebContainer>,
    }

    fn harness(debug: bool) -> Harness {
        let (ui, mut ui_loop) = ui_channel();
        ui_loop.run_pending();

        let broker = ChannelBroker::new();
        let mut registry = PluginRegistry::new();
        registry.register_instance(
            "impl.echo",
            Arc::new(Echo {
                broker: broker.clone(),
            }) as Arc<dyn Plugin>,
        );
        let navigator = Arc::new(RecordingNavigator::default());
        let settings = BridgeSettings {
            package_name: "com.example".into(),
            debug,
            ..BridgeSettings::default()
        };
        let services = BridgeServices::new(
            BridgeConfig::from_json_str(CONFIG).expect("config"),
            settings,
            broker,
            registry,
            Arc::clone(&navigator) as Arc<dyn Navigator>,
            ui,
        );
        let inbox = Arc::new(Inbox::default());
        let container: Arc<dyn WebContainer> = Arc::clone(&inbox) as Arc<dyn WebContainer>;
        Harness {
            services,
            ui_loop,
            navigator,
            inbox,
            container,
        }
    }

    fn managed_in(h: &Harness, controller: &str, page: Option<&str>) -> Arc<ManagedScreen> {
        let screen = Arc::new(
            ManagedScreen::new(controller, page.map(str::to_owned)).with_container(Arc::clone(&h.container)),
        );
        let dyn_screen: Arc<dyn Screen> = Arc::clone(&screen) as Arc<dyn Screen>;
        h.services.stack().on_screen_created(&dyn_screen);
        screen
    }

    #[test]
    fn web_subscription_receives_native_publish() {
        let h = harness(false);
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"pubsub","action":"subscribe","channel":"news"}"#,
        );
        h.services.broker().publish(Some(&json!({"id": 1})), "news");

        assert_eq!(
            h.inbox.messages(),
            vec![json!({"type": "pubsub", "channel": "news", "message": {"id": 1}})]
        );
    }

    #[test]
    fn web_publish_reaches_native_listener() {
        let h = harness(false);
        let listener = Arc::new(Listener::default());
        let as_listener: Arc<dyn PubSubListener> = Arc::clone(&listener) as Arc<dyn PubSubListener>;
        h.services.broker().subscribe_callback(&as_listener, "native");

        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"pubsub","action":"publish","channel":"native","message":{"ok":true}}"#,
        );
        assert_eq!(
            *listener.0.lock().expect("lock"),
            vec![(Some(json!({"ok": true})), "native".to_owned())]
        );
    }

    #[test]
    fn web_unsubscribe_stops_delivery() {
        let h = harness(false);
        for action in ["subscribe", "unsubscribe"] {
            h.services.on_web_message(
                Arc::clone(&h.container),
                &format!(r#"{{"type":"pubsub","action":"{action}","channel":"news"}}"#),
            );
        }
        h.services.broker().publish(None, "news");
        assert!(h.inbox.messages().is_empty());
        assert_eq!(h.services.broker().receiver_count(), 0);
    }

    #[test]
    fn plugin_callback_round_trips_through_broker() {
        let h = harness(false);
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"pubsub","action":"subscribe","channel":"echo:done"}"#,
        );
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"plugin","name":"echo","action":"say","data":{"text":"hi"},"callbackChannel":"echo:done"}"#,
        );

        assert_eq!(
            h.inbox.messages(),
            vec![json!({"type": "pubsub", "channel": "echo:done", "message": {"text": "hi"}})]
        );
    }

    #[test]
    fn messages_from_other_threads_wait_for_the_ui_loop() {
        let mut h = harness(false);
        let services = h.services.clone();
        let container = Arc::clone(&h.container);
        std::thread::spawn(move || {
            services.on_web_message(
                container,
                r#"{"type":"pubsub","action":"subscribe","channel":"late"}"#,
            );
        })
        .join()
        .expect("join");

        assert_eq!(h.services.broker().receiver_count(), 0);
        assert_eq!(h.ui_loop.run_pending(), 1);
        assert_eq!(h.services.broker().channels_for_view(&h.container), vec!["late".to_owned()]);
    }

    #[test]
    fn push_is_forwarded_with_resolved_controller() {
        let h = harness(false);
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"navigation","action":"modal","controller":"detail","page":"item.html","data":{"id":3}}"#,
        );

        let requests = h.navigator.0.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.action, NavigationAction::Modal);
        assert_eq!(request.push_style, PushStyle::Modal);
        assert_eq!(request.controller.screen_class, "com.example.DetailScreen");
        assert_eq!(request.page.as_deref(), Some("item.html"));
        assert_eq!(request.data, Some(json!({"id": 3})));
        assert!(request.animated);
    }

    #[test]
    fn unknown_controller_falls_back_to_default() {
        let h = harness(false);
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"navigation","action":"push","controller":"nowhere","page":"x.html"}"#,
        );
        let requests = h.navigator.0.lock().expect("lock");
        assert_eq!(requests[0].controller.screen_class, "com.example.DefaultScreen");
    }

    #[test]
    fn pop_with_controller_pops_to_it() {
        let h = harness(false);
        let home = managed_in(&h, "default", Some("home.html"));
        let detail = managed_in(&h, "detail", Some("item.html"));

        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"navigation","action":"pop","controller":"default","page":"home.html","data":{"saved":true}}"#,
        );

        assert_eq!(h.services.stack().ids(), vec![home.id()]);
        assert!(detail.is_finished());
        assert_eq!(home.take_data_for_pop(), Some(json!({"saved": true})));
    }

    #[test]
    fn plain_pop_finishes_top_and_hands_data_down() {
        let h = harness(false);
        let home = managed_in(&h, "default", Some("home.html"));
        let detail = managed_in(&h, "detail", Some("item.html"));

        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"navigation","action":"pop","data":{"n":1}}"#,
        );

        assert!(detail.is_finished());
        assert_eq!(h.services.stack().ids(), vec![home.id()]);
        assert_eq!(home.take_data_for_pop(), Some(json!({"n": 1})));
    }

    #[test]
    fn garbage_is_dropped_quietly() {
        let h = harness(true);
        for raw in [
            "not json",
            r#"{"no":"type"}"#,
            r#"{"type":"telepathy"}"#,
            r#"{"type":"plugin","action":"x"}"#,
            r#"{"type":"navigation","action":"pop","controller":"ghost"}"#,
            r#"{"type":"log","value":"hello from the page"}"#,
        ] {
            h.services.on_web_message(Arc::clone(&h.container), raw);
        }
        assert!(h.inbox.messages().is_empty());
        assert!(h.navigator.0.lock().expect("lock").is_empty());
    }

    #[test]
    fn lifecycle_events_reach_the_screen_container() {
        let h = harness(false);
        let screen = managed_in(&h, "default", None);

        assert_eq!(h.services.on_screen_started(screen.as_ref()), Some(AppEvent::Started));
        assert_eq!(h.services.on_screen_stopped(screen.as_ref()), Some(AppEvent::Background));
        assert_eq!(
            h.inbox.messages(),
            vec![
                json!({"type": "event", "event": "cobalt:onAppStarted"}),
                json!({"type": "event", "event": "cobalt:onAppBackground"}),
            ]
        );
    }

    #[test]
    fn destroying_a_screen_releases_its_subscriptions() {
        let h = harness(false);
        let screen = managed_in(&h, "default", None);
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"pubsub","action":"subscribe","channel":"a"}"#,
        );
        h.services.on_web_message(
            Arc::clone(&h.container),
            r#"{"type":"pubsub","action":"subscribe","channel":"b"}"#,
        );

        h.services.on_screen_destroyed(screen.as_ref());
        assert!(h.services.stack().is_empty());
        assert_eq!(h.services.broker().receiver_count(), 0);
    }
}
