// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Comparison page routes.
//!
//! Paths look like `/{prefix...}/compare/{type}/{id1}/{id2}/.../show/{file}/{plugin}`.
//! Everything before `compare` is the deployment's context path and is kept
//! so redirects stay under it.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::entity::EntityType;
use crate::error::{Error, Result};

/// Plugin used when a route names a file without a plugin.
pub const DEFAULT_PLOT_PLUGIN: &str = "displayPlotFlot";

const COMPARE_SEGMENT: &str = "compare";
const SHOW_SEGMENT: &str = "show";

/// File (and optionally plugin) to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSelection {
    pub file_name: String,
    pub plugin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompareRoute {
    /// Context path before `/compare`, empty or starting with `/`.
    pub prefix: String,
    pub entity_type: EntityType,
    /// Version ids in display order.
    pub ids: Vec<String>,
    pub selection: Option<FileSelection>,
}

impl CompareRoute {
    pub fn new(entity_type: EntityType, ids: Vec<String>) -> Self {
        Self {
            prefix: String::new(),
            entity_type,
            ids,
            selection: None,
        }
    }

    pub fn parse(path: &str) -> Result<Self> {
        let trimmed = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        let pos = segments
            .iter()
            .position(|s| *s == COMPARE_SEGMENT)
            .ok_or_else(|| Error::invalid_route(path, "no 'compare' segment"))?;
        let prefix = if pos == 0 {
            String::new()
        } else {
            format!("/{}", segments[..pos].join("/"))
        };

        let type_segment = segments
            .get(pos + 1)
            .ok_or_else(|| Error::invalid_route(path, "missing entity type"))?;
        let entity_type = EntityType::parse(type_segment).ok_or_else(|| {
            Error::invalid_route(path, format!("unknown entity type '{}'", type_segment))
        })?;

        let rest = &segments[pos + 2..];
        let show = rest.iter().position(|s| *s == SHOW_SEGMENT);
        let ids: Vec<String> = rest[..show.unwrap_or(rest.len())]
            .iter()
            .map(|s| s.to_string())
            .collect();
        if ids.is_empty() {
            return Err(Error::invalid_route(path, "no entity ids"));
        }

        let selection = match show {
            Some(i) => {
                let file = rest
                    .get(i + 1)
                    .ok_or_else(|| Error::invalid_route(path, "'show' without a file name"))?;
                let file_name = decode_segment(path, file)?;
                let plugin = rest
                    .get(i + 2)
                    .map(|p| decode_segment(path, p))
                    .transpose()?;
                Some(FileSelection { file_name, plugin })
            }
            None => None,
        };

        Ok(Self {
            prefix,
            entity_type,
            ids,
            selection,
        })
    }

    /// Path of the comparison page itself, with a trailing slash.
    pub fn page_path(&self) -> String {
        format!(
            "{}/{}/{}/{}/",
            self.prefix,
            COMPARE_SEGMENT,
            self.entity_type,
            self.ids.join("/")
        )
    }

    /// Full path including the file selection, if any.
    pub fn to_path(&self) -> String {
        let mut path = self.page_path();
        if let Some(ref sel) = self.selection {
            path.push_str(SHOW_SEGMENT);
            path.push('/');
            path.push_str(&urlencoding::encode(&sel.file_name));
            if let Some(ref plugin) = sel.plugin {
                path.push('/');
                path.push_str(&urlencoding::encode(plugin));
            }
        }
        path
    }

    pub fn with_selection(&self, file_name: &str, plugin: &str) -> Self {
        Self {
            selection: Some(FileSelection {
                file_name: file_name.to_string(),
                plugin: Some(plugin.to_string()),
            }),
            ..self.clone()
        }
    }
}

impl FromStr for CompareRoute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CompareRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_path())
    }
}

fn decode_segment(path: &str, segment: &str) -> Result<String> {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .map_err(|_| Error::invalid_route(path, format!("segment '{}' is not valid UTF-8", segment)))
}

/// Split a full URL into its origin and path. Bare paths have no origin.
pub fn split_origin(input: &str) -> Result<(Option<String>, String)> {
    if !input.starts_with("http://") && !input.starts_with("https://") {
        return Ok((None, input.to_string()));
    }
    let url = reqwest::Url::parse(input).map_err(|_| Error::InvalidUrl(input.to_string()))?;
    Ok((Some(url.origin().ascii_serialization()), url.path().to_string()))
}
