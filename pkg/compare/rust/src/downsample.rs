// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Plot data preparation: column transposition and downsampling.
//!
//! Long simulation traces carry far more points than a chart can show. Each
//! y-series is reduced to the points that change its visual shape: the first
//! and last point, every strict local extremum, and enough other points that
//! no dropped sample lies further than 1/500 of the series range from the
//! line drawn through the kept ones. Both the reduced and the full series are
//! kept because point styles need every sample.

use serde::Serialize;

use crate::csv_table::CsvTable;

/// Fraction of a series' range below which a point counts as collinear.
pub const DOWNSAMPLE_RESOLUTION: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How a series is drawn. Styles that draw markers need every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Lines,
    Points,
    LinesPoints,
}

impl LineStyle {
    /// Parse a style name from a plot description; unknown names draw lines.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" => LineStyle::Points,
            "linespoints" => LineStyle::LinesPoints,
            _ => LineStyle::Lines,
        }
    }

    pub fn needs_all_points(&self) -> bool {
        matches!(self, LineStyle::Points | LineStyle::LinesPoints)
    }
}

/// One y-series against column 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    /// Column index in the permuted table.
    pub column: usize,
    pub label: Option<String>,
    pub points: Vec<Point>,
}

/// Every y-series of a table, in full and downsampled form.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlotData {
    pub x_label: Option<String>,
    pub non_downsampled: Vec<PlotSeries>,
    pub downsampled: Vec<PlotSeries>,
}

impl PlotData {
    pub fn from_table(table: &CsvTable) -> Self {
        let columns = table.columns();
        let Some((x, ys)) = columns.split_first() else {
            return Self::default();
        };

        let mut non_downsampled = Vec::with_capacity(ys.len());
        let mut downsampled = Vec::with_capacity(ys.len());
        for column in ys {
            let points: Vec<Point> = x
                .values
                .iter()
                .zip(&column.values)
                .map(|(&x, &y)| Point::new(x, y))
                .collect();
            let threshold = column.range() / DOWNSAMPLE_RESOLUTION;
            downsampled.push(PlotSeries {
                column: column.index,
                label: column.label.clone(),
                points: downsample_with_threshold(&points, threshold),
            });
            non_downsampled.push(PlotSeries {
                column: column.index,
                label: column.label.clone(),
                points,
            });
        }

        Self {
            x_label: x.label.clone(),
            non_downsampled,
            downsampled,
        }
    }

    /// Series to draw for a line style.
    pub fn series_for(&self, style: LineStyle) -> &[PlotSeries] {
        if style.needs_all_points() {
            &self.non_downsampled
        } else {
            &self.downsampled
        }
    }
}

/// Downsample a series using 1/500 of its own y range as threshold.
pub fn downsample(points: &[Point]) -> Vec<Point> {
    let (min, max) = points
        .iter()
        .map(|p| p.y)
        .filter(|y| y.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| {
            (lo.min(y), hi.max(y))
        });
    let range = if min <= max { max - min } else { 0.0 };
    downsample_with_threshold(points, range / DOWNSAMPLE_RESOLUTION)
}

/// Downsample parallel x and y columns. Extra values in the longer column are
/// ignored.
pub fn downsample_series(xs: &[f64], ys: &[f64]) -> Vec<Point> {
    let points: Vec<Point> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| Point::new(x, y))
        .collect();
    downsample(&points)
}

/// Greedy point dropping against an explicit threshold.
///
/// A point is dropped only while the line from the last kept point to the
/// following sample passes within `threshold` of every point skipped so far,
/// so the drawn line never strays further than that from the input.
pub fn downsample_with_threshold(points: &[Point], threshold: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut kept = Vec::new();
    let mut last = points[0];
    let mut cone = SlopeCone::open();
    kept.push(last);

    for window in points.windows(2).skip(1) {
        let (cur, next) = (window[0], window[1]);
        cone.narrow(last, cur, threshold);
        let is_extremum =
            (cur.y < last.y && cur.y < next.y) || (cur.y > last.y && cur.y > next.y);
        if is_extremum || !chord_fits(&cone, last, cur, next, threshold) {
            kept.push(cur);
            last = cur;
            cone = SlopeCone::open();
        }
    }

    kept.push(points[points.len() - 1]);
    kept
}

/// Slopes of lines through the last kept point that stay within the threshold
/// of every point skipped since.
#[derive(Debug, Clone, Copy)]
struct SlopeCone {
    lo: f64,
    hi: f64,
}

impl SlopeCone {
    fn open() -> Self {
        Self {
            lo: f64::NEG_INFINITY,
            hi: f64::INFINITY,
        }
    }

    fn close(&mut self) {
        self.lo = f64::INFINITY;
        self.hi = f64::NEG_INFINITY;
    }

    fn narrow(&mut self, origin: Point, p: Point, threshold: f64) {
        let dx = p.x - origin.x;
        if dx == 0.0 || !dx.is_finite() {
            // Every line through `origin` meets this x at `origin.y`.
            if !((p.y - origin.y).abs() <= threshold) {
                self.close();
            }
            return;
        }
        // NaN bounds leave the cone unchanged.
        let a = (p.y - threshold - origin.y) / dx;
        let b = (p.y + threshold - origin.y) / dx;
        self.lo = self.lo.max(a.min(b));
        self.hi = self.hi.min(a.max(b));
    }

    fn contains(&self, slope: f64) -> bool {
        slope >= self.lo && slope <= self.hi
    }
}

/// Whether the chord `last -> next` covers every skipped point. A vertical
/// chord falls back to the spread of the three values.
fn chord_fits(cone: &SlopeCone, last: Point, cur: Point, next: Point, threshold: f64) -> bool {
    let dx = next.x - last.x;
    if dx == 0.0 || !dx.is_finite() {
        let hi = last.y.max(cur.y).max(next.y);
        let lo = last.y.min(cur.y).min(next.y);
        return hi - lo <= threshold;
    }
    cone.contains((next.y - last.y) / dx)
}
