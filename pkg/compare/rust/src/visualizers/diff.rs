// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Unified line diff between two versions of a file.

use serde::Serialize;
use similar::{ChangeTag, TextDiff};

use super::{RenderInput, Visualization, Visualizer};
use crate::entity::EntityFile;
use crate::error::{Error, Result};

/// Lines of context around each hunk.
const CONTEXT_RADIUS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffView {
    pub file_name: String,
    pub from: String,
    pub to: String,
    pub unified: String,
    pub inserted: usize,
    pub deleted: usize,
}

pub struct UnixDiff;

impl Visualizer for UnixDiff {
    fn id(&self) -> &str {
        "displayUnixDiff"
    }

    fn name(&self) -> &str {
        "Unix diff"
    }

    fn description(&self) -> &str {
        "Line-by-line differences between two versions of a file"
    }

    fn can_display(&self, _file: &EntityFile) -> bool {
        true
    }

    fn render(&self, input: &RenderInput) -> Result<Visualization> {
        let [old, new] = input.sources.as_slice() else {
            return Err(Error::unsupported(
                self.id(),
                format!("needs exactly two files, got {}", input.sources.len()),
            ));
        };

        let diff = TextDiff::from_lines(old.contents.as_ref(), new.contents.as_ref());
        let (mut inserted, mut deleted) = (0, 0);
        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => inserted += 1,
                ChangeTag::Delete => deleted += 1,
                ChangeTag::Equal => {}
            }
        }

        let unified = diff
            .unified_diff()
            .context_radius(CONTEXT_RADIUS)
            .header(&old.entity_label, &new.entity_label)
            .to_string();

        Ok(Visualization::Diff(DiffView {
            file_name: input.file_name.clone(),
            from: old.entity_label.clone(),
            to: new.entity_label.clone(),
            unified,
            inserted,
            deleted,
        }))
    }
}
