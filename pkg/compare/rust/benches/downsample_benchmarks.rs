// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Benchmarks for result file parsing and plot downsampling.
//!
//! Inputs are synthetic action-potential traces: long flat stretches with a
//! sharp upstroke, the shape that downsampling thins the most.
//!
//! ```bash
//! cargo bench
//! cargo bench -- downsample_    # downsampler only
//! ```

use divan::Bencher;
use weblab_compare::csv_table::parse_csv;
use weblab_compare::downsample::{PlotData, Point, downsample};

fn main() {
    divan::main();
}

fn trace_value(t: f64) -> f64 {
    let phase = t % 1000.0;
    if phase < 5.0 {
        -85.0 + 24.0 * phase
    } else if phase < 300.0 {
        35.0 - 0.05 * (phase - 5.0)
    } else if phase < 400.0 {
        20.25 - 1.05 * (phase - 300.0)
    } else {
        -85.0
    }
}

fn trace_points(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.1;
            Point::new(t, trace_value(t))
        })
        .collect()
}

fn trace_csv(n: usize, columns: usize) -> String {
    let mut out = String::from("time");
    for c in 0..columns {
        out.push_str(&format!(",V{}", c));
    }
    out.push('\n');
    for i in 0..n {
        let t = i as f64 * 0.1;
        out.push_str(&format!("{}", t));
        for c in 0..columns {
            out.push_str(&format!(",{:.4}", trace_value(t + c as f64 * 50.0)));
        }
        out.push('\n');
    }
    out
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn downsample_trace(bencher: Bencher, n: usize) {
    bencher
        .with_inputs(|| trace_points(n))
        .bench_refs(|points| downsample(points));
}

#[divan::bench(args = [1_000, 10_000])]
fn parse_csv_trace(bencher: Bencher, n: usize) {
    let text = trace_csv(n, 4);
    bencher.bench(|| parse_csv(&text));
}

#[divan::bench(args = [1_000, 10_000])]
fn plot_data_from_table(bencher: Bencher, n: usize) {
    let table = parse_csv(&trace_csv(n, 4));
    bencher.bench(|| PlotData::from_table(&table));
}
