// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Cobalt.
//
// None of these ever reach the host application: the public bridge
// operations log them and degrade to "message dropped".

use thiserror::Error;

/// Top-level error type for all Cobalt operations.
#[derive(Debug, Error)]
pub enum CobaltError {
    // -- Envelope errors --
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    // -- Plugin errors --
    #[error("unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("plugin handler {0} has no registered implementation")]
    PluginNotRegistered(String),

    #[error("plugin {handler} could not provide an instance: {reason}")]
    PluginInstance { handler: String, reason: String },

    // -- Navigation errors --
    #[error("unknown controller: {0}")]
    UnknownController(String),

    #[error("controller {controller} (page {page:?}) not found in history")]
    HistoryMiss {
        controller: String,
        page: Option<String>,
    },

    // -- Scheduling --
    #[error("UI context is no longer running")]
    UiClosed,

    // -- Configuration / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CobaltError>;
