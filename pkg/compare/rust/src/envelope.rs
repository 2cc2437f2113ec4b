// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Server JSON envelope.
//!
//! Every endpoint answers with
//! `{"notifications": {"errors": [...], "notes": [...]}, "<task>": {...}}`
//! where the task section usually carries `response` and `responseText`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notifications {
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl Notifications {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.notes.is_empty()
    }
}

/// Outcome flag of a task section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    pub response: bool,
    #[serde(default)]
    pub response_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub notifications: Notifications,
    #[serde(flatten)]
    tasks: serde_json::Map<String, serde_json::Value>,
}

impl Envelope {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn status(&self, task: &str) -> Option<TaskStatus> {
        let section = self.tasks.get(task)?;
        serde_json::from_value(section.clone()).ok()
    }

    /// Decode a task section. A section with `response: false` is reported
    /// as a server error carrying its `responseText`; a section without a
    /// `response` flag is taken as successful.
    pub fn task<T: DeserializeOwned>(&self, task: &str) -> Result<T> {
        let section = self
            .tasks
            .get(task)
            .ok_or_else(|| Error::MissingTask(task.to_string()))?;
        if let Some(status) = self.status(task) {
            if !status.response {
                return Err(Error::Server {
                    task: task.to_string(),
                    message: status.response_text,
                });
            }
        }
        Ok(serde_json::from_value(section.clone())?)
    }
}
