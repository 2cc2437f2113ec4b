// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Error type shared by the client, orchestrator and visualizers.

/// Notification text shown for any transport or server-side failure.
pub const SERVER_ERROR_NOTIFICATION: &str = "sorry, serverside error occurred";

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{SERVER_ERROR_NOTIFICATION}: request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{SERVER_ERROR_NOTIFICATION}: {url} returned {status}")]
    Status { url: String, status: u16 },

    #[error("server rejected '{task}': {message}")]
    Server { task: String, message: String },

    #[error("response has no '{0}' section")]
    MissingTask(String),

    #[error("malformed JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid comparison route '{path}': {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("unknown visualizer '{0}'")]
    UnknownVisualizer(String),

    #[error("visualizer '{visualizer}' cannot display this selection: {reason}")]
    Unsupported { visualizer: String, reason: String },

    #[error("request superseded by a newer comparison")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid_route(path: &str, reason: impl Into<String>) -> Self {
        Error::InvalidRoute {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(visualizer: &str, reason: impl Into<String>) -> Self {
        Error::Unsupported {
            visualizer: visualizer.to_string(),
            reason: reason.into(),
        }
    }
}
