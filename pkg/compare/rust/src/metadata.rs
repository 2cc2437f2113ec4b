// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Per-entity plot metadata.
//!
//! Experiments publish two descriptor files next to their results:
//!
//! - `outputs-default-plots.csv`: `Plot title, File name, Data file name,
//!   Line style, First variable id, Optional second variable id, Optional key
//!   variable id`
//! - `outputs-contents.csv`: `Variable id, Variable name, Units, Number of
//!   dimensions, File name, Type, Dimensions`
//!
//! Both start with a header row. Cross-referencing them yields titles, axis
//! labels and legend (key) files for the plottable data files.

use std::collections::HashMap;

use serde::Serialize;

use crate::csv_table::read_records;
use crate::downsample::LineStyle;
use crate::entity::EntityVersion;

/// One row of the default-plots file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotDescription {
    pub title: String,
    /// Rendered plot (image) file name.
    pub file_name: String,
    /// CSV the plot is drawn from.
    pub data_file: String,
    pub line_style: LineStyle,
    pub first_variable: Option<String>,
    pub second_variable: Option<String>,
    pub key_variable: Option<String>,
}

/// One row of the contents file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputVariable {
    pub id: String,
    pub name: String,
    pub units: String,
    pub dimensions: Option<usize>,
    pub file_name: Option<String>,
    pub kind: Option<String>,
}

impl OutputVariable {
    /// Axis label, `name (units)`.
    pub fn axis_label(&self) -> String {
        if self.units.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.units)
        }
    }
}

/// Display annotations attached to a plottable data file.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlotAnnotation {
    pub title: String,
    pub line_style: LineStyle,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    /// Name of the file whose first column labels the y-series.
    pub key_file: Option<String>,
}

fn non_empty(cell: Option<&String>) -> Option<String> {
    cell.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse a default-plots file. The header row and rows without a data file
/// are skipped.
pub fn parse_plot_descriptions(text: &str) -> Vec<PlotDescription> {
    read_records(text)
        .into_iter()
        .skip(1)
        .filter(|row| row.len() >= 3 && !row[2].is_empty())
        .map(|row| PlotDescription {
            title: row[0].clone(),
            file_name: row[1].clone(),
            data_file: row[2].clone(),
            line_style: row.get(3).map(|s| LineStyle::parse(s)).unwrap_or_default(),
            first_variable: non_empty(row.get(4)),
            second_variable: non_empty(row.get(5)),
            key_variable: non_empty(row.get(6)),
        })
        .collect()
}

/// Parse a contents file. The header row and rows without an id are skipped.
pub fn parse_output_contents(text: &str) -> Vec<OutputVariable> {
    read_records(text)
        .into_iter()
        .skip(1)
        .filter(|row| row.len() >= 2 && !row[0].is_empty())
        .map(|row| OutputVariable {
            id: row[0].clone(),
            name: row[1].clone(),
            units: row.get(2).cloned().unwrap_or_default(),
            dimensions: row.get(3).and_then(|s| s.parse().ok()),
            file_name: non_empty(row.get(4)),
            kind: non_empty(row.get(5)),
        })
        .collect()
}

/// Both descriptor files of one entity, once parsed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EntityMetadata {
    pub plots: Vec<PlotDescription>,
    pub contents: Vec<OutputVariable>,
}

impl EntityMetadata {
    pub fn parse(plots: &str, contents: &str) -> Self {
        Self {
            plots: parse_plot_descriptions(plots),
            contents: parse_output_contents(contents),
        }
    }

    pub fn variable(&self, id: &str) -> Option<&OutputVariable> {
        self.contents.iter().find(|v| v.id == id)
    }

    /// Plot rows whose data file the entity actually has, in file order.
    pub fn present_plots<'a>(
        &'a self,
        entity: &'a EntityVersion,
    ) -> impl Iterator<Item = &'a PlotDescription> + 'a {
        self.plots.iter().filter(|p| entity.has_file(&p.data_file))
    }

    /// Annotate the entity's plottable files. When several rows name the same
    /// data file, the first one wins.
    pub fn annotate(&self, entity: &EntityVersion) -> HashMap<String, PlotAnnotation> {
        let mut annotations = HashMap::new();
        for plot in self.present_plots(entity) {
            if annotations.contains_key(&plot.data_file) {
                continue;
            }
            let label = |id: &Option<String>| {
                id.as_deref()
                    .and_then(|id| self.variable(id))
                    .map(OutputVariable::axis_label)
            };
            let key_file = plot
                .key_variable
                .as_deref()
                .and_then(|id| self.variable(id))
                .and_then(|v| v.file_name.clone())
                .filter(|name| entity.has_file(name));

            annotations.insert(
                plot.data_file.clone(),
                PlotAnnotation {
                    title: plot.title.clone(),
                    line_style: plot.line_style,
                    x_label: label(&plot.first_variable),
                    y_label: label(&plot.second_variable),
                    key_file,
                },
            );
        }
        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityFile;

    const PLOTS: &str = "\
Plot title,File name,Data file name,Line style,First variable id,Optional second variable id,Optional key variable id
Action potential,AP.png,outputs_AP.csv,lines,time,membrane_voltage,pacing_cycle
Restitution,Rest.png,outputs_Rest.csv,linespoints,PCL,APD90
Missing data,Gone.png,outputs_Gone.csv,lines,time,membrane_voltage
";

    const CONTENTS: &str = "\
Variable id,Variable name,Units,Number of dimensions,File name,Type,Dimensions
time,Time,ms,1,outputs_AP.csv,Raw,
membrane_voltage,Membrane voltage,mV,2,outputs_AP.csv,Raw,
pacing_cycle,Pacing cycle length,ms,1,outputs_PCL.csv,Raw,
PCL,S1-S2 interval,ms,1,outputs_Rest.csv,Raw,
APD90,APD90,,1,outputs_Rest.csv,Raw,
";

    fn entity(files: &[&str]) -> EntityVersion {
        EntityVersion {
            id: "1".into(),
            entity_id: None,
            name: "LR91 & S1S2".into(),
            version: "v1".into(),
            author: None,
            created: None,
            model: None,
            protocol: None,
            files: files
                .iter()
                .map(|name| EntityFile {
                    id: None,
                    name: name.to_string(),
                    file_type: "csv".into(),
                    size: 0,
                    url: format!("/download/1/{}", name),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_plot_descriptions() {
        let plots = parse_plot_descriptions(PLOTS);
        assert_eq!(plots.len(), 3);
        assert_eq!(plots[0].title, "Action potential");
        assert_eq!(plots[0].data_file, "outputs_AP.csv");
        assert_eq!(plots[0].key_variable.as_deref(), Some("pacing_cycle"));
        assert_eq!(plots[1].line_style, LineStyle::LinesPoints);
        assert!(plots[1].key_variable.is_none());
    }

    #[test]
    fn test_parse_output_contents() {
        let contents = parse_output_contents(CONTENTS);
        assert_eq!(contents.len(), 5);
        assert_eq!(contents[1].axis_label(), "Membrane voltage (mV)");
        assert_eq!(contents[1].dimensions, Some(2));
        assert_eq!(contents[4].axis_label(), "APD90");
        assert!(contents[4].kind.is_some());
    }

    #[test]
    fn test_annotate_present_files() {
        let meta = EntityMetadata::parse(PLOTS, CONTENTS);
        let e = entity(&["outputs_AP.csv", "outputs_Rest.csv", "outputs_PCL.csv"]);
        let notes = meta.annotate(&e);
        assert_eq!(notes.len(), 2);

        let ap = &notes["outputs_AP.csv"];
        assert_eq!(ap.title, "Action potential");
        assert_eq!(ap.x_label.as_deref(), Some("Time (ms)"));
        assert_eq!(ap.y_label.as_deref(), Some("Membrane voltage (mV)"));
        assert_eq!(ap.key_file.as_deref(), Some("outputs_PCL.csv"));

        let rest = &notes["outputs_Rest.csv"];
        assert_eq!(rest.line_style, LineStyle::LinesPoints);
        assert!(rest.key_file.is_none());
    }

    #[test]
    fn test_key_file_requires_presence() {
        let meta = EntityMetadata::parse(PLOTS, CONTENTS);
        let e = entity(&["outputs_AP.csv"]);
        let notes = meta.annotate(&e);
        assert!(notes["outputs_AP.csv"].key_file.is_none());
    }

    #[test]
    fn test_present_plots_order() {
        let meta = EntityMetadata::parse(PLOTS, CONTENTS);
        let e = entity(&["outputs_Rest.csv", "outputs_AP.csv"]);
        let present: Vec<&str> = meta.present_plots(&e).map(|p| p.data_file.as_str()).collect();
        assert_eq!(present, vec!["outputs_AP.csv", "outputs_Rest.csv"]);
    }

    #[test]
    fn test_short_rows_skipped() {
        let plots = parse_plot_descriptions("Plot title,File name,Data file name\nonly,two\n");
        assert!(plots.is_empty());
    }
}
