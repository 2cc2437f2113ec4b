// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Client configuration, loaded from an optional YAML file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::route::DEFAULT_PLOT_PLUGIN;

pub const PLOT_DESCRIPTION_FILE: &str = "outputs-default-plots.csv";
pub const OUTPUT_CONTENTS_FILE: &str = "outputs-contents.csv";

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_plot_plugin() -> String {
    DEFAULT_PLOT_PLUGIN.to_string()
}

fn default_plot_description_file() -> String {
    PLOT_DESCRIPTION_FILE.to_string()
}

fn default_output_contents_file() -> String {
    OUTPUT_CONTENTS_FILE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme, host and port of the repository server.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Plugin used for the automatically chosen default plot.
    #[serde(default = "default_plot_plugin")]
    pub default_plot_plugin: String,
    #[serde(default = "default_plot_description_file")]
    pub plot_description_file: String,
    #[serde(default = "default_output_contents_file")]
    pub output_contents_file: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_plot_plugin: default_plot_plugin(),
            plot_description_file: default_plot_description_file(),
            output_contents_file: default_output_contents_file(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Load configuration from `path`, falling back to defaults when no path is
/// given or the file does not exist.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        debug!("No config file given, using defaults");
        return Ok(ClientConfig::default());
    };
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(ClientConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("reading {}: {}", path.display(), e)))?;
    serde_yaml::from_str(&contents)
        .map_err(|e| Error::Config(format!("parsing {}: {}", path.display(), e)))
}
