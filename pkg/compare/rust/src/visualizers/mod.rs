// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Visualizer plugins.
//!
//! A visualizer turns one file (as found in every compared entity) into a
//! payload a front end can draw directly. Plugins are looked up by the id
//! that appears in `/show/{file}/{plugin}` routes.

pub mod content;
pub mod diff;
pub mod plot;
pub mod table;

use std::sync::Arc;

use serde::Serialize;

use crate::csv_table::CsvTable;
use crate::downsample::PlotData;
use crate::entity::EntityFile;
use crate::error::Result;
use crate::metadata::PlotAnnotation;

pub use content::{ContentDump, ContentView};
pub use diff::{DiffView, UnixDiff};
pub use plot::{FlotPlot, FlotView, HighchartsPlot, HighchartsView};
pub use table::{Table, TableView};

/// One entity's copy of the file being displayed.
#[derive(Debug, Clone)]
pub struct RenderSource {
    /// Label of the entity in this comparison.
    pub entity_label: String,
    pub file: EntityFile,
    pub annotation: Option<PlotAnnotation>,
    pub contents: Arc<str>,
    /// Present for CSV files.
    pub table: Option<Arc<CsvTable>>,
    /// Present for CSV files.
    pub plot: Option<Arc<PlotData>>,
    /// Parsed key file, when the annotation names one.
    pub key: Option<Arc<CsvTable>>,
}

/// Everything a visualizer needs to render a file across entities.
#[derive(Debug, Clone)]
pub struct RenderInput {
    pub file_name: String,
    pub sources: Vec<RenderSource>,
}

/// Output of a visualizer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "plugin", content = "data")]
pub enum Visualization {
    #[serde(rename = "displayPlotFlot")]
    Flot(FlotView),
    #[serde(rename = "displayPlotHC")]
    Highcharts(HighchartsView),
    #[serde(rename = "displayTable")]
    Table(TableView),
    #[serde(rename = "displayUnixDiff")]
    Diff(DiffView),
    #[serde(rename = "displayContent")]
    Content(ContentView),
}

/// Metadata about a visualizer for discovery.
#[derive(Debug, Clone, Serialize)]
pub struct VisualizerInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Trait for file visualizers.
pub trait Visualizer: Send + Sync {
    /// Plugin id used in routes.
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Whether this visualizer can show the given file.
    fn can_display(&self, file: &EntityFile) -> bool;

    fn render(&self, input: &RenderInput) -> Result<Visualization>;

    fn info(&self) -> VisualizerInfo {
        VisualizerInfo {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
        }
    }
}

/// Registry of available visualizers, in preference order.
pub struct VisualizerRegistry {
    visualizers: Vec<Box<dyn Visualizer>>,
}

impl VisualizerRegistry {
    /// Create a registry with the default visualizers.
    pub fn new() -> Self {
        let mut registry = Self {
            visualizers: Vec::new(),
        };
        registry.register(Box::new(FlotPlot));
        registry.register(Box::new(HighchartsPlot));
        registry.register(Box::new(Table));
        registry.register(Box::new(UnixDiff));
        registry.register(Box::new(ContentDump));
        registry
    }

    pub fn register(&mut self, visualizer: Box<dyn Visualizer>) {
        self.visualizers.push(visualizer);
    }

    pub fn list(&self) -> Vec<VisualizerInfo> {
        self.visualizers.iter().map(|v| v.info()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&dyn Visualizer> {
        self.visualizers
            .iter()
            .find(|v| v.id() == id)
            .map(|v| v.as_ref())
    }

    /// Visualizers able to show `file`, in preference order.
    pub fn for_file(&self, file: &EntityFile) -> Vec<&dyn Visualizer> {
        self.visualizers
            .iter()
            .filter(|v| v.can_display(file))
            .map(|v| v.as_ref())
            .collect()
    }
}

impl Default for VisualizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::csv_table::parse_csv;

    pub fn file(name: &str) -> EntityFile {
        EntityFile {
            id: None,
            name: name.to_string(),
            file_type: String::new(),
            size: 0,
            url: format!("/download/{}", name),
        }
    }

    pub fn csv_source(label: &str, name: &str, text: &str) -> RenderSource {
        let table = Arc::new(parse_csv(text));
        RenderSource {
            entity_label: label.to_string(),
            file: file(name),
            annotation: None,
            contents: Arc::from(text),
            plot: Some(Arc::new(PlotData::from_table(&table))),
            table: Some(table),
            key: None,
        }
    }

    pub fn text_source(label: &str, name: &str, text: &str) -> RenderSource {
        RenderSource {
            entity_label: label.to_string(),
            file: file(name),
            annotation: None,
            contents: Arc::from(text),
            table: None,
            plot: None,
            key: None,
        }
    }
}
