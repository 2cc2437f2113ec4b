// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Lazily populated cache of result files.
//!
//! Contents are fetched on first request and never evicted for the lifetime
//! of the store; parsed tables and plot data are derived once from the cached
//! contents. Keys are absolute file URLs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::client::WebLabClient;
use crate::csv_table::{CsvTable, parse_csv};
use crate::downsample::PlotData;
use crate::error::Result;

pub struct FileStore {
    client: WebLabClient,
    /// Raw file contents: url -> text.
    contents_cache: RwLock<HashMap<String, Arc<str>>>,
    /// Parsed CSV: url -> table.
    table_cache: RwLock<HashMap<String, Arc<CsvTable>>>,
    /// Plot series: url -> full and downsampled series.
    plot_cache: RwLock<HashMap<String, Arc<PlotData>>>,
}

impl FileStore {
    pub fn new(client: WebLabClient) -> Self {
        Self {
            client,
            contents_cache: RwLock::new(HashMap::new()),
            table_cache: RwLock::new(HashMap::new()),
            plot_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &WebLabClient {
        &self.client
    }

    /// Raw contents of a file, fetched once.
    pub async fn contents(&self, url: &str) -> Result<Arc<str>> {
        let key = self.client.resolve(url)?;
        if let Some(text) = cached(&self.contents_cache, &key) {
            return Ok(text);
        }

        let text: Arc<str> = self.client.fetch_text(&key).await?.into();
        debug!(url = %key, bytes = text.len(), "Cached file contents");
        self.contents_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, text.clone());
        Ok(text)
    }

    /// Parsed CSV table of a file.
    pub async fn table(&self, url: &str) -> Result<Arc<CsvTable>> {
        let key = self.client.resolve(url)?;
        if let Some(table) = cached(&self.table_cache, &key) {
            return Ok(table);
        }

        let text = self.contents(&key).await?;
        let table = Arc::new(parse_csv(&text));
        self.table_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, table.clone());
        Ok(table)
    }

    /// Full and downsampled plot series of a CSV file.
    pub async fn plot_data(&self, url: &str) -> Result<Arc<PlotData>> {
        let key = self.client.resolve(url)?;
        if let Some(data) = cached(&self.plot_cache, &key) {
            return Ok(data);
        }

        let table = self.table(&key).await?;
        let data = Arc::new(PlotData::from_table(&table));
        debug!(
            url = %key,
            series = data.downsampled.len(),
            points = data.non_downsampled.first().map(|s| s.points.len()).unwrap_or(0),
            "Prepared plot data"
        );
        self.plot_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, data.clone());
        Ok(data)
    }

    /// Number of files whose contents are cached.
    pub fn cached_files(&self) -> usize {
        self.contents_cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Clear all caches (useful when server data changes).
    pub fn clear_cache(&self) {
        self.contents_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.table_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.plot_cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn cached<T: ?Sized>(cache: &RwLock<HashMap<String, Arc<T>>>, key: &str) -> Option<Arc<T>> {
    cache
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}
