//! Batch orchestration: provision or verify the target, then extract, build
//! and insert each video in order.

use std::path::Path;

use qtd2pg_core::{build_geometry, Credentials, Settings, TargetTables};
use qtd2pg_exif::{ExtractOptions, Extractor, MetadataTool};

use crate::error::PackError;
use crate::request::{DatabaseTarget, PackOutcome, PackRequest, VideoInput};
use crate::store::{SpatialStore, StoreSession};

pub struct RecordPacker<T, S> {
    extractor: Extractor<T>,
    store: S,
    default_prefix: String,
    identifier_length: usize,
}

impl<T: MetadataTool, S: SpatialStore> RecordPacker<T, S> {
    pub fn new(settings: &Settings, tool: T, store: S) -> Self {
        Self {
            extractor: Extractor::new(tool, ExtractOptions::from_settings(settings)),
            store,
            default_prefix: settings.default_prefix.clone(),
            identifier_length: usize::from(settings.identifier_length),
        }
    }

    /// Pack every video of `request`, returning one outcome per video in
    /// input order.
    ///
    /// An empty request yields no outcomes and touches no database. If the
    /// batch cannot start (provisioning failure, schema mismatch) the result
    /// is a single [`PackOutcome::Aborted`] carrying any provisioning
    /// messages so far, and nothing is inserted.
    pub async fn pack(&self, request: &PackRequest) -> Vec<PackOutcome> {
        if request.videos.is_empty() {
            tracing::debug!(database = request.target.name(), "empty batch");
            return Vec::new();
        }

        let mut preamble = Vec::new();
        let session = match self.prepare(request, &mut preamble).await {
            Ok(session) => session,
            Err(error) => {
                tracing::error!(
                    database = request.target.name(),
                    error = %error,
                    "batch aborted"
                );
                return vec![PackOutcome::Aborted {
                    messages: preamble,
                    error,
                }];
            }
        };

        let mut outcomes = Vec::with_capacity(request.videos.len());
        for (index, video) in request.videos.iter().enumerate() {
            let mut messages = if index == 0 {
                std::mem::take(&mut preamble)
            } else {
                Vec::new()
            };

            let outcome = match self
                .pack_video(&session, &request.tables, video, &mut messages)
                .await
            {
                Ok(identifier) => PackOutcome::Inserted {
                    folder: video.folder.clone(),
                    identifier,
                    messages,
                },
                Err(error) => {
                    tracing::warn!(
                        folder = %video.folder.display(),
                        error = %error,
                        "video failed"
                    );
                    PackOutcome::Failed {
                        folder: video.folder.clone(),
                        messages,
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let inserted = outcomes.iter().filter(|o| o.is_success()).count();
        tracing::info!(
            database = request.target.name(),
            videos = outcomes.len(),
            inserted,
            "batch finished"
        );
        outcomes
    }

    /// Create or verify the target and return a session for the inserts.
    async fn prepare(
        &self,
        request: &PackRequest,
        preamble: &mut Vec<String>,
    ) -> Result<S::Session, PackError> {
        match &request.target {
            DatabaseTarget::New(name) => {
                self.provision(name, &request.credentials, &request.tables, preamble)
                    .await
            }
            DatabaseTarget::Existing(name) => {
                let session = self.store.open(name, &request.credentials).await?;
                let mismatches = session.check_tables(&request.tables).await?;
                if !mismatches.is_empty() {
                    return Err(PackError::SchemaMismatch(mismatches));
                }
                Ok(session)
            }
        }
    }

    async fn provision(
        &self,
        name: &str,
        credentials: &Credentials,
        tables: &TargetTables,
        preamble: &mut Vec<String>,
    ) -> Result<S::Session, PackError> {
        self.store.create_database(name, credentials).await?;
        preamble.push(format!("{name} Database created"));

        let session = self.store.open(name, credentials).await?;
        session.create_tables(tables).await?;
        tracing::info!(database = name, mode = %tables.mode(), "target provisioned");
        Ok(session)
    }

    async fn pack_video(
        &self,
        session: &S::Session,
        tables: &TargetTables,
        video: &VideoInput,
        messages: &mut Vec<String>,
    ) -> Result<String, PackError> {
        let extraction = self.extractor.extract(&video.folder).await?;
        messages.push(format!(
            "Data extracted ({} samples)",
            extraction.samples.len()
        ));

        let identifier = self.resolve_identifier(
            &video.folder,
            video.alias.as_deref(),
            extraction.default_identifier,
        )?;
        let geometry = build_geometry(tables.mode(), &identifier, &extraction.samples)?;

        let summary = session
            .insert_video(tables, &geometry)
            .await
            .map_err(PackError::insert)?;

        match tables {
            TargetTables::Point { point } => {
                messages.push(point_message(summary.points, point));
            }
            TargetTables::Line { line } => {
                messages.push(line_message(line, summary.line_length_km));
            }
            TargetTables::Both { point, line } => {
                messages.push(point_message(summary.points, point));
                messages.push(line_message(line, summary.line_length_km));
            }
        }

        tracing::info!(
            folder = %video.folder.display(),
            identifier = %identifier,
            points = summary.points,
            "video packed"
        );
        Ok(identifier)
    }

    /// The alias wins unless it is blank or still the untouched prefix.
    fn resolve_identifier(
        &self,
        folder: &Path,
        alias: Option<&str>,
        default_identifier: String,
    ) -> Result<String, PackError> {
        let identifier = match alias.map(str::trim) {
            Some(alias) if !alias.is_empty() && alias != self.default_prefix => {
                alias.to_string()
            }
            _ => default_identifier,
        };

        if identifier.chars().count() > self.identifier_length {
            return Err(PackError::InvalidInput(format!(
                "identifier \"{identifier}\" for {} is longer than {} characters",
                folder.display(),
                self.identifier_length
            )));
        }
        Ok(identifier)
    }
}

fn point_message(points: u64, table: &str) -> String {
    format!("Point data inserted ({points} points into {table})")
}

fn line_message(table: &str, length_km: Option<f64>) -> String {
    match length_km {
        Some(km) => format!("Line data inserted into {table} (length {km:.3} km)"),
        None => format!("Line data inserted into {table}"),
    }
}
