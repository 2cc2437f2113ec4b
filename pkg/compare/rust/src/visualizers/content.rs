// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Raw file contents.

use serde::Serialize;

use super::{RenderInput, Visualization, Visualizer};
use crate::entity::EntityFile;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileContents {
    pub label: String,
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentView {
    pub files: Vec<FileContents>,
}

pub struct ContentDump;

impl Visualizer for ContentDump {
    fn id(&self) -> &str {
        "displayContent"
    }

    fn name(&self) -> &str {
        "File contents"
    }

    fn description(&self) -> &str {
        "Shows the raw file contents"
    }

    fn can_display(&self, _file: &EntityFile) -> bool {
        true
    }

    fn render(&self, input: &RenderInput) -> Result<Visualization> {
        if input.sources.is_empty() {
            return Err(Error::unsupported(self.id(), "no files selected"));
        }
        let files = input
            .sources
            .iter()
            .map(|s| FileContents {
                label: s.entity_label.clone(),
                file_name: s.file.name.clone(),
                contents: s.contents.to_string(),
            })
            .collect();
        Ok(Visualization::Content(ContentView { files }))
    }
}
