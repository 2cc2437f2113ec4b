// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Line plots of CSV result files, in flot and Highcharts shapes.
//!
//! Every y-series of every compared entity becomes one plotted series.
//! Series use the downsampled points unless the plot's line style draws
//! markers.

use serde::Serialize;

use super::{RenderInput, RenderSource, Visualization, Visualizer};
use crate::downsample::{LineStyle, Point};
use crate::entity::EntityFile;
use crate::error::{Error, Result};

/// Series shared by both plot flavours.
#[derive(Debug, Clone, PartialEq)]
struct LabelledSeries {
    label: String,
    line_style: LineStyle,
    points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
struct PlotModel {
    title: String,
    x_label: Option<String>,
    y_label: Option<String>,
    series: Vec<LabelledSeries>,
}

fn build_model(visualizer: &str, input: &RenderInput) -> Result<PlotModel> {
    let plottable: Vec<&RenderSource> = input.sources.iter().filter(|s| s.plot.is_some()).collect();
    if plottable.is_empty() {
        return Err(Error::unsupported(visualizer, "no CSV data to plot"));
    }

    let annotation = plottable.iter().find_map(|s| s.annotation.as_ref());
    let title = annotation
        .map(|a| a.title.clone())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| input.file_name.clone());
    let x_label = annotation
        .and_then(|a| a.x_label.clone())
        .or_else(|| plottable.iter().find_map(|s| s.plot.as_ref()?.x_label.clone()));
    let y_label = annotation.and_then(|a| a.y_label.clone());

    let multiple = plottable.len() > 1;
    let mut series = Vec::new();
    for source in plottable {
        let Some(plot) = source.plot.as_ref() else {
            continue;
        };
        let line_style = source
            .annotation
            .as_ref()
            .map(|a| a.line_style)
            .unwrap_or_default();
        let key_values = source.key.as_ref().map(|k| {
            let name = k.label(0).unwrap_or("key").to_string();
            (name, k.first_column_text())
        });

        for (i, s) in plot.series_for(line_style).iter().enumerate() {
            let column_label = match key_values {
                Some((ref name, ref values)) if i < values.len() => {
                    format!("{} = {}", name, values[i])
                }
                _ => s
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("column {}", s.column)),
            };
            let label = if multiple {
                format!("{}: {}", source.entity_label, column_label)
            } else {
                column_label
            };
            series.push(LabelledSeries {
                label,
                line_style,
                points: s.points.clone(),
            });
        }
    }

    Ok(PlotModel {
        title,
        x_label,
        y_label,
        series,
    })
}

fn xy_pairs(points: &[Point]) -> Vec<[f64; 2]> {
    points.iter().map(|p| [p.x, p.y]).collect()
}

// --- flot ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlotToggle {
    pub show: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlotSeries {
    pub label: String,
    pub data: Vec<[f64; 2]>,
    pub lines: FlotToggle,
    pub points: FlotToggle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlotView {
    pub title: String,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub series: Vec<FlotSeries>,
}

/// Plot payload for flot.
pub struct FlotPlot;

impl Visualizer for FlotPlot {
    fn id(&self) -> &str {
        "displayPlotFlot"
    }

    fn name(&self) -> &str {
        "Flot plot"
    }

    fn description(&self) -> &str {
        "Line plot of every data column against the first column"
    }

    fn can_display(&self, file: &EntityFile) -> bool {
        file.is_csv()
    }

    fn render(&self, input: &RenderInput) -> Result<Visualization> {
        let model = build_model(self.id(), input)?;
        let series = model
            .series
            .into_iter()
            .map(|s| FlotSeries {
                label: s.label,
                data: xy_pairs(&s.points),
                lines: FlotToggle {
                    show: s.line_style != LineStyle::Points,
                },
                points: FlotToggle {
                    show: s.line_style.needs_all_points(),
                },
            })
            .collect();
        Ok(Visualization::Flot(FlotView {
            title: model.title,
            x_label: model.x_label,
            y_label: model.y_label,
            series,
        }))
    }
}

// --- Highcharts ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighchartsTitle {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighchartsAxis {
    pub title: HighchartsTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighchartsMarker {
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighchartsSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub series_type: &'static str,
    pub data: Vec<[f64; 2]>,
    pub marker: HighchartsMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighchartsView {
    pub title: HighchartsTitle,
    pub x_axis: HighchartsAxis,
    pub y_axis: HighchartsAxis,
    pub series: Vec<HighchartsSeries>,
}

/// Plot payload for Highcharts.
pub struct HighchartsPlot;

impl Visualizer for HighchartsPlot {
    fn id(&self) -> &str {
        "displayPlotHC"
    }

    fn name(&self) -> &str {
        "Highcharts plot"
    }

    fn description(&self) -> &str {
        "Zoomable line plot of every data column against the first column"
    }

    fn can_display(&self, file: &EntityFile) -> bool {
        file.is_csv()
    }

    fn render(&self, input: &RenderInput) -> Result<Visualization> {
        let model = build_model(self.id(), input)?;
        let axis = |label: Option<String>| HighchartsAxis {
            title: HighchartsTitle {
                text: label.unwrap_or_default(),
            },
        };
        let series = model
            .series
            .into_iter()
            .map(|s| HighchartsSeries {
                name: s.label,
                series_type: if s.line_style == LineStyle::Points {
                    "scatter"
                } else {
                    "line"
                },
                data: xy_pairs(&s.points),
                marker: HighchartsMarker {
                    enabled: s.line_style.needs_all_points(),
                },
            })
            .collect();
        Ok(Visualization::Highcharts(HighchartsView {
            title: HighchartsTitle { text: model.title },
            x_axis: axis(model.x_label),
            y_axis: axis(model.y_label),
            series,
        }))
    }
}
