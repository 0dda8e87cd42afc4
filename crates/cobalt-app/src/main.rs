// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cobalt headless host.
//
// Entry point. Initialises logging, loads the bundle configuration, wires the
// bridge services, opens the root screen, and feeds web envelopes read as
// JSON lines from stdin into the bridge. Envelopes the bridge sends to the
// web view are written to stdout; logs go to stderr.

mod plugins;
mod services;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use cobalt_bridge::{BridgeServices, ChannelBroker, Navigator, WebContainer, ui_channel};
use cobalt_core::config::DEFAULT_CONTROLLER;

use services::bundle;
use services::headless::{ConsoleContainer, HeadlessNavigator};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Cobalt starting");

    let settings = bundle::settings_from_env();
    let config_path = bundle::config_path(
        std::env::args().nth(1),
        std::env::var("COBALT_CONFIG").ok(),
        &settings,
        &bundle::bundle_root(),
    );
    let config = bundle::load_config(&config_path);

    let (ui, ui_loop) = ui_channel();
    let broker = ChannelBroker::new();
    let registry = plugins::registry(&broker);
    let console: Arc<dyn WebContainer> = Arc::new(ConsoleContainer::stdout());
    let navigator = Arc::new(HeadlessNavigator::new(Arc::clone(&console)));
    let services = BridgeServices::new(
        config,
        settings,
        broker,
        registry,
        Arc::clone(&navigator) as Arc<dyn Navigator>,
        ui,
    );
    navigator.attach(services.clone());

    let root_navigator = Arc::clone(&navigator);
    if let Err(e) = services.ui().post(move || {
        if root_navigator.open_root(DEFAULT_CONTROLLER, None).is_none() {
            error!("root screen could not be opened");
        }
    }) {
        error!(error = %e, "UI loop unavailable");
        return;
    }

    tokio::select! {
        () = ui_loop.run() => warn!("UI loop stopped"),
        () = read_web_messages(services.clone(), Arc::clone(&console)) => info!("input closed"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("interrupted"),
            Err(e) => error!(error = %e, "signal handler failed"),
        },
    }

    info!(
        screens = navigator.open_screens(),
        receivers = services.broker().receiver_count(),
        "Cobalt stopped"
    );
}

/// Feed stdin lines to the bridge as if posted by `container`'s web runtime.
async fn read_web_messages(services: BridgeServices, container: Arc<dyn WebContainer>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if !line.is_empty() {
                    services.on_web_message(Arc::clone(&container), line);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "reading web messages failed");
                break;
            }
        }
    }
}
