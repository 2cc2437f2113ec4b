// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Tabular view of CSV files, shown in the file's own column order.

use serde::Serialize;

use super::{RenderInput, Visualization, Visualizer};
use crate::csv_table::Cell;
use crate::entity::EntityFile;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTable {
    pub label: String,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub file_name: String,
    pub tables: Vec<EntityTable>,
}

pub struct Table;

impl Visualizer for Table {
    fn id(&self) -> &str {
        "displayTable"
    }

    fn name(&self) -> &str {
        "Table"
    }

    fn description(&self) -> &str {
        "Shows CSV contents as a table"
    }

    fn can_display(&self, file: &EntityFile) -> bool {
        file.is_csv()
    }

    fn render(&self, input: &RenderInput) -> Result<Visualization> {
        let tables: Vec<EntityTable> = input
            .sources
            .iter()
            .filter_map(|source| {
                let table = source.table.as_ref()?;
                Some(EntityTable {
                    label: source.entity_label.clone(),
                    header: table.header.as_ref().map(|h| table.original_order(h)),
                    rows: table.rows.iter().map(|r| table.original_order(r)).collect(),
                })
            })
            .collect();
        if tables.is_empty() {
            return Err(Error::unsupported(self.id(), "no CSV data to tabulate"));
        }
        Ok(Visualization::Table(TableView {
            file_name: input.file_name.clone(),
            tables,
        }))
    }
}
