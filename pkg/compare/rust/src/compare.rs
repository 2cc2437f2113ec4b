// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Comparison orchestration.
//!
//! Loading a comparison fetches the listed entity versions, groups their files
//! by signature, fetches and cross-references each entity's plot metadata,
//! and picks the plot to show when the route names no file. Everything ends
//! up in a [`ComparisonSession`] that callers pass back in to render files.

use std::collections::HashMap;

use futures::future::{join_all, try_join_all};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::WebLabClient;
use crate::config::ClientConfig;
use crate::entity::{EntityFile, EntityType, EntityVersion, FileSignature};
use crate::envelope::Notifications;
use crate::error::{Error, Result};
use crate::file_store::FileStore;
use crate::metadata::{EntityMetadata, PlotAnnotation};
use crate::route::CompareRoute;
use crate::tracker::RequestTracker;
use crate::visualizers::{RenderInput, RenderSource, Visualization, VisualizerRegistry};

/// One entity's copy of a grouped file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    /// Index into [`ComparisonSession::entities`].
    pub entity: usize,
    pub file: EntityFile,
}

/// All copies of a file name across the compared entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedFile {
    pub name: String,
    pub signature: FileSignature,
    pub entries: Vec<FileEntry>,
}

impl ComparedFile {
    /// Number of distinct entities holding this file.
    pub fn entity_count(&self) -> usize {
        let mut seen: Vec<usize> = self.entries.iter().map(|e| e.entity).collect();
        seen.dedup();
        seen.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedEntity {
    pub version: EntityVersion,
    /// How this entity is named in series labels and headings.
    pub label: String,
    /// Absent when either descriptor file is missing or failed to load.
    pub metadata: Option<EntityMetadata>,
    /// Plot annotations keyed by data file name.
    pub annotations: HashMap<String, PlotAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultVisualization {
    pub file_name: String,
    pub signature: FileSignature,
    pub plugin: String,
    pub entity_count: usize,
}

/// State of one comparison page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSession {
    pub route: CompareRoute,
    pub title: String,
    /// Entities in route order.
    pub entities: Vec<ComparedEntity>,
    /// Grouped files in order of first appearance.
    pub files: Vec<ComparedFile>,
    pub default_visualization: Option<DefaultVisualization>,
    /// Where to move the page once loading finishes, if the route named no file.
    pub redirect: Option<CompareRoute>,
    pub notifications: Notifications,
}

impl ComparisonSession {
    pub fn file(&self, signature: &FileSignature) -> Option<&ComparedFile> {
        self.files.iter().find(|f| &f.signature == signature)
    }

    pub fn file_by_name(&self, name: &str) -> Option<&ComparedFile> {
        self.file(&FileSignature::of(name))
    }

    /// File and plugin to display: the route's selection, else the default.
    pub fn selection(&self) -> Option<(String, Option<String>)> {
        if let Some(ref sel) = self.route.selection {
            return Some((sel.file_name.clone(), sel.plugin.clone()));
        }
        self.default_visualization
            .as_ref()
            .map(|d| (d.file_name.clone(), Some(d.plugin.clone())))
    }
}

/// Group files by signature across entities, keeping first-appearance order.
pub fn group_files(entities: &[EntityVersion]) -> Vec<ComparedFile> {
    let mut files: Vec<ComparedFile> = Vec::new();
    let mut index: HashMap<FileSignature, usize> = HashMap::new();
    for (entity, version) in entities.iter().enumerate() {
        for file in &version.files {
            let signature = file.signature();
            let slot = *index.entry(signature.clone()).or_insert_with(|| {
                files.push(ComparedFile {
                    name: file.name.clone(),
                    signature,
                    entries: Vec::new(),
                });
                files.len() - 1
            });
            files[slot].entries.push(FileEntry {
                entity,
                file: file.clone(),
            });
        }
    }
    files
}

fn all_equal<'a>(mut keys: impl Iterator<Item = Option<&'a str>>) -> Option<&'a str> {
    let first = keys.next()??;
    keys.all(|k| k == Some(first)).then_some(first)
}

/// Whether every compared entity runs the same protocol.
pub fn shares_protocol(entity_type: EntityType, versions: &[EntityVersion]) -> bool {
    match entity_type {
        EntityType::Experiment => {
            all_equal(versions.iter().map(|v| v.protocol.as_ref().map(|p| p.key()))).is_some()
        }
        EntityType::Protocol => all_equal(versions.iter().map(|v| Some(v.entity_key()))).is_some(),
        EntityType::Model | EntityType::Dataset => false,
    }
}

/// Page title and per-entity labels.
pub fn describe(entity_type: EntityType, versions: &[EntityVersion]) -> (String, Vec<String>) {
    if versions.is_empty() {
        return (
            format!("Comparison of {}", entity_type.plural_title()),
            Vec::new(),
        );
    }
    let version_label = |v: &EntityVersion| {
        if v.version.is_empty() {
            v.id.clone()
        } else {
            v.version.clone()
        }
    };

    if entity_type != EntityType::Experiment {
        if all_equal(versions.iter().map(|v| Some(v.entity_key()))).is_some() {
            let name = &versions[0].name;
            return (
                format!("Comparison of {} versions", name),
                versions.iter().map(version_label).collect(),
            );
        }
        let mut names: Vec<&str> = versions.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        let unique = names.len() == versions.len();
        let labels = versions
            .iter()
            .map(|v| {
                if unique {
                    v.name.clone()
                } else {
                    format!("{} @ {}", v.name, version_label(v))
                }
            })
            .collect();
        return (format!("Comparison of {}", entity_type.plural_title()), labels);
    }

    let model_name = |v: &EntityVersion| v.model.as_ref().map_or(v.name.clone(), |m| m.name.clone());
    let protocol_name =
        |v: &EntityVersion| v.protocol.as_ref().map_or(v.name.clone(), |p| p.name.clone());
    let single_model = all_equal(versions.iter().map(|v| v.model.as_ref().map(|m| m.key()))).is_some();
    let single_protocol = shares_protocol(entity_type, versions);

    match (single_model, single_protocol) {
        (true, true) => (
            format!(
                "Comparison of {} & {} experiment versions",
                model_name(&versions[0]),
                protocol_name(&versions[0])
            ),
            versions.iter().map(version_label).collect(),
        ),
        (true, false) => (
            format!("Comparison of protocols on {}", model_name(&versions[0])),
            versions.iter().map(protocol_name).collect(),
        ),
        (false, true) => (
            format!("Comparison of models under {}", protocol_name(&versions[0])),
            versions.iter().map(model_name).collect(),
        ),
        (false, false) => (
            "Comparison of experiments".to_string(),
            versions
                .iter()
                .map(|v| format!("{} & {}", model_name(v), protocol_name(v)))
                .collect(),
        ),
    }
}

/// Pick the file shown by default.
///
/// Candidates are plot rows in processing order whose data file is present.
/// With a shared protocol the first candidate wins; otherwise the candidate
/// held by the most entities wins, earlier candidates winning ties.
pub fn choose_default<'a>(
    entities: &[ComparedEntity],
    files: &'a [ComparedFile],
    single_protocol: bool,
) -> Option<&'a ComparedFile> {
    let mut candidates: Vec<&ComparedFile> = Vec::new();
    for entity in entities {
        let Some(ref metadata) = entity.metadata else {
            continue;
        };
        for plot in metadata.present_plots(&entity.version) {
            let signature = FileSignature::of(&plot.data_file);
            if candidates.iter().any(|c| c.signature == signature) {
                continue;
            }
            if let Some(file) = files.iter().find(|f| f.signature == signature) {
                candidates.push(file);
            }
        }
    }

    if single_protocol {
        return candidates.first().copied();
    }
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(b) if b.entity_count() >= candidate.entity_count() => Some(b),
        _ => Some(candidate),
    })
}

/// Loads comparisons and renders their files.
pub struct Comparator {
    config: ClientConfig,
    store: FileStore,
    tracker: RequestTracker,
    visualizers: VisualizerRegistry,
}

impl Comparator {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = WebLabClient::new(&config)?;
        Ok(Self {
            config,
            store: FileStore::new(client),
            tracker: RequestTracker::new(),
            visualizers: VisualizerRegistry::new(),
        })
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    pub fn visualizers(&self) -> &VisualizerRegistry {
        &self.visualizers
    }

    /// Load a comparison. Starting another load cancels this one, which then
    /// returns [`Error::Cancelled`].
    pub async fn load(&self, route: &CompareRoute) -> Result<ComparisonSession> {
        let ticket = self.tracker.begin();
        let result = ticket.run(self.load_session(route)).await;
        self.tracker.finish(&ticket);
        if ticket.is_cancelling() {
            debug!(request = ticket.id, "Comparison load superseded");
        }
        result
    }

    async fn load_session(&self, route: &CompareRoute) -> Result<ComparisonSession> {
        let (mut versions, mut notifications) =
            match self.store.client().get_entity_infos(route).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(route = %route, error = %e, "Failed to fetch entity infos");
                    return Err(e);
                }
            };

        let mut ordered = Vec::with_capacity(route.ids.len());
        for id in &route.ids {
            match versions.iter().position(|v| &v.id == id) {
                Some(pos) => ordered.push(versions.swap_remove(pos)),
                None => notifications
                    .notes
                    .push(format!("{} version {} not found", route.entity_type, id)),
            }
        }
        if !versions.is_empty() {
            debug!(extra = versions.len(), "Ignoring versions not named in the route");
        }

        let (title, labels) = describe(route.entity_type, &ordered);

        // Join on every entity's descriptor files before picking a default.
        let metadata = join_all(ordered.iter().map(|v| self.load_metadata(v))).await;

        let entities: Vec<ComparedEntity> = ordered
            .into_iter()
            .zip(labels)
            .zip(metadata)
            .map(|((version, label), metadata)| {
                let annotations = metadata
                    .as_ref()
                    .map(|m| m.annotate(&version))
                    .unwrap_or_default();
                ComparedEntity {
                    version,
                    label,
                    metadata,
                    annotations,
                }
            })
            .collect();

        let versions: Vec<EntityVersion> = entities.iter().map(|e| e.version.clone()).collect();
        let files = group_files(&versions);
        let single_protocol = shares_protocol(route.entity_type, &versions);

        let default_visualization =
            choose_default(&entities, &files, single_protocol).map(|f| DefaultVisualization {
                file_name: f.name.clone(),
                signature: f.signature.clone(),
                plugin: self.config.default_plot_plugin.clone(),
                entity_count: f.entity_count(),
            });

        let redirect = match (&route.selection, &default_visualization) {
            (None, Some(d)) => Some(route.with_selection(&d.file_name, &d.plugin)),
            _ => None,
        };

        info!(
            route = %route,
            entities = entities.len(),
            files = files.len(),
            default = ?default_visualization.as_ref().map(|d| d.file_name.as_str()),
            "Loaded comparison"
        );

        Ok(ComparisonSession {
            route: route.clone(),
            title,
            entities,
            files,
            default_visualization,
            redirect,
            notifications,
        })
    }

    /// Fetch and parse both descriptor files of an entity. Any failure leaves
    /// the entity without metadata.
    async fn load_metadata(&self, version: &EntityVersion) -> Option<EntityMetadata> {
        let plots_file = version.file(&self.config.plot_description_file)?;
        let contents_file = version.file(&self.config.output_contents_file)?;

        let (plots, contents) = tokio::join!(
            self.store.contents(&plots_file.url),
            self.store.contents(&contents_file.url)
        );
        match (plots, contents) {
            (Ok(plots), Ok(contents)) => Some(EntityMetadata::parse(&plots, &contents)),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    version = %version.id,
                    name = %version.name,
                    error = %e,
                    "Plot metadata unavailable"
                );
                None
            }
        }
    }

    /// Render `file_name` from every entity that has it with `plugin`.
    pub async fn render(
        &self,
        session: &ComparisonSession,
        file_name: &str,
        plugin: &str,
    ) -> Result<Visualization> {
        let visualizer = self
            .visualizers
            .get(plugin)
            .ok_or_else(|| Error::UnknownVisualizer(plugin.to_string()))?;
        let compared = session
            .file_by_name(file_name)
            .ok_or_else(|| Error::unsupported(plugin, format!("no file named '{}'", file_name)))?;
        if let Some(entry) = compared.entries.first() {
            if !visualizer.can_display(&entry.file) {
                return Err(Error::unsupported(
                    plugin,
                    format!("cannot display '{}'", file_name),
                ));
            }
        }

        let sources = try_join_all(
            compared
                .entries
                .iter()
                .map(|entry| self.render_source(session, entry)),
        )
        .await?;

        visualizer.render(&RenderInput {
            file_name: compared.name.clone(),
            sources,
        })
    }

    /// Render the route's selection, or the default visualization.
    pub async fn render_selection(
        &self,
        session: &ComparisonSession,
    ) -> Result<Option<Visualization>> {
        let Some((file_name, plugin)) = session.selection() else {
            return Ok(None);
        };
        let plugin = match plugin {
            Some(p) => p,
            None => {
                let file = session
                    .file_by_name(&file_name)
                    .and_then(|f| f.entries.first())
                    .map(|e| &e.file);
                file.and_then(|f| self.visualizers.for_file(f).first().map(|v| v.id().to_string()))
                    .unwrap_or_else(|| self.config.default_plot_plugin.clone())
            }
        };
        self.render(session, &file_name, &plugin).await.map(Some)
    }

    async fn render_source(
        &self,
        session: &ComparisonSession,
        entry: &FileEntry,
    ) -> Result<RenderSource> {
        let entity = &session.entities[entry.entity];
        let url = &entry.file.url;
        let contents = self.store.contents(url).await?;
        let (table, plot) = if entry.file.is_csv() {
            (
                Some(self.store.table(url).await?),
                Some(self.store.plot_data(url).await?),
            )
        } else {
            (None, None)
        };

        let annotation = entity.annotations.get(&entry.file.name).cloned();
        let key_file = annotation
            .as_ref()
            .and_then(|a| a.key_file.as_deref())
            .and_then(|name| entity.version.file(name));
        let key = match key_file {
            Some(file) => match self.store.table(&file.url).await {
                Ok(table) => Some(table),
                Err(e) => {
                    warn!(file = %file.name, error = %e, "Key file unavailable");
                    None
                }
            },
            None => None,
        };

        Ok(RenderSource {
            entity_label: entity.label.clone(),
            file: entry.file.clone(),
            annotation,
            contents,
            table,
            plot,
            key,
        })
    }
}
