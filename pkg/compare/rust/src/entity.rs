// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Entities and files as described by the repository server.

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of entity being compared, as it appears in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Model,
    Protocol,
    Dataset,
    Experiment,
}

impl EntityType {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "model" => Some(EntityType::Model),
            "protocol" => Some(EntityType::Protocol),
            "dataset" => Some(EntityType::Dataset),
            "experiment" => Some(EntityType::Experiment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Model => "model",
            EntityType::Protocol => "protocol",
            EntityType::Dataset => "dataset",
            EntityType::Experiment => "experiment",
        }
    }

    /// Capitalized plural for titles ("Models").
    pub fn plural_title(&self) -> &'static str {
        match self {
            EntityType::Model => "Models",
            EntityType::Protocol => "Protocols",
            EntityType::Dataset => "Datasets",
            EntityType::Experiment => "Experiments",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key for files across entities: the 32-bit `String.hashCode` of
/// the file name, as a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileSignature(String);

impl FileSignature {
    pub fn of(name: &str) -> Self {
        let hash = name
            .encode_utf16()
            .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)));
        FileSignature(hash.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ids arrive as JSON numbers or strings depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Str(String),
    Num(i64),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Str(s) => s,
            IdRepr::Num(n) => n.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

/// A file attached to an entity version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFile {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, rename = "filetype")]
    pub file_type: String,
    #[serde(default)]
    pub size: u64,
    /// Download location, absolute or relative to the server root.
    pub url: String,
}

impl EntityFile {
    pub fn signature(&self) -> FileSignature {
        FileSignature::of(&self.name)
    }

    /// Whether the file holds comma-separated data, judged by type then name.
    pub fn is_csv(&self) -> bool {
        let file_type = self.file_type.to_ascii_lowercase();
        file_type.contains("csv") || self.name.to_ascii_lowercase().ends_with(".csv")
    }
}

/// Reference from an experiment to its model or protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub entity_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

impl EntityRef {
    /// Identity used when deciding whether entities share a model/protocol.
    pub fn key(&self) -> &str {
        self.entity_id.as_deref().unwrap_or(&self.id)
    }
}

/// One version of a model, protocol, dataset or experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityVersion {
    /// Version id; what comparison URLs list.
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub entity_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub model: Option<EntityRef>,
    #[serde(default)]
    pub protocol: Option<EntityRef>,
    #[serde(default)]
    pub files: Vec<EntityFile>,
}

impl EntityVersion {
    pub fn file(&self, name: &str) -> Option<&EntityFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file(name).is_some()
    }

    /// Entity id when given, else the version id.
    pub fn entity_key(&self) -> &str {
        self.entity_id.as_deref().unwrap_or(&self.id)
    }
}
