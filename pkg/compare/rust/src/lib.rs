// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Side-by-side comparison of Web Lab models, protocols, datasets and
//! experiments.
//!
//! A comparison is addressed by a route such as
//! `/compare/experiment/12/34/show/outputs-trace.csv/displayPlotFlot`. Loading
//! it asks the repository server for the listed versions, groups their files
//! by name across entities, and reads each entity's plot descriptor files to
//! label axes and pick a default plot.
//!
//! ## Architecture
//!
//! 1. **Client** (`client`, `envelope`) - Talks to the repository server and
//!    unwraps its task/notification response envelope.
//!
//! 2. **File store** (`file_store`) - Fetches file contents once and caches
//!    the parsed CSV tables and downsampled plot series.
//!
//! 3. **Orchestrator** (`compare`) - Builds a [`ComparisonSession`] from a
//!    route. A newer load cancels the one in flight (`tracker`).
//!
//! 4. **Visualizers** (`visualizers`) - Turn a grouped file into flot or
//!    Highcharts series, tables, unified diffs or raw contents.
//!
//! ## Usage
//!
//! ```bash
//! weblab-compare compare https://weblab.example.org/compare/model/1/2/ --render
//! weblab-compare plot outputs-trace.csv
//! ```

pub mod client;
pub mod compare;
pub mod config;
pub mod csv_table;
pub mod downsample;
pub mod entity;
pub mod envelope;
pub mod error;
pub mod file_store;
pub mod metadata;
pub mod route;
pub mod tracker;
pub mod visualizers;

pub use compare::{Comparator, ComparisonSession};
pub use config::{ClientConfig, load_config};
pub use error::{Error, Result};
pub use route::CompareRoute;
