use std::path::Path;

use qtd2pg_core::{AltitudeType, ExtractionResult, Settings};

use crate::error::ExtractError;
use crate::parse::{default_identifier, parse_samples};
use crate::tool::MetadataTool;

/// The parts of [`Settings`] the extractor needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    pub target_filename: String,
    pub prefix: String,
    pub altitude_type: AltitudeType,
}

impl ExtractOptions {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            target_filename: settings.default_filename.clone(),
            prefix: settings.default_prefix.clone(),
            altitude_type: settings.altitude_type,
        }
    }
}

/// Reads the GPS track and creation date of the target video in a folder.
#[derive(Debug, Clone)]
pub struct Extractor<T> {
    tool: T,
    options: ExtractOptions,
}

impl<T: MetadataTool> Extractor<T> {
    pub fn new(tool: T, options: ExtractOptions) -> Self {
        Self { tool, options }
    }

    #[must_use]
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract samples and the default identifier for the video in `folder`.
    ///
    /// The folder and the target file are checked before the tool is run.
    ///
    /// # Errors
    ///
    /// - [`ExtractError::InvalidInput`] if the folder or target file is missing
    /// - [`ExtractError::ToolInvocation`] / [`ExtractError::NonUtf8Output`] if
    ///   the tool cannot be run or its output cannot be read
    /// - [`ExtractError::MalformedSample`] if any GPS line fails to parse
    /// - [`ExtractError::MissingMetadata`] if there is no GPS track or no
    ///   `CreateDate` tag
    pub async fn extract(&self, folder: &Path) -> Result<ExtractionResult, ExtractError> {
        if !folder.is_dir() {
            return Err(ExtractError::InvalidInput {
                path: folder.to_path_buf(),
                reason: "folder does not exist".to_string(),
            });
        }

        let video = folder.join(&self.options.target_filename);
        if !video.is_file() {
            return Err(ExtractError::InvalidInput {
                path: folder.to_path_buf(),
                reason: format!(
                    "folder does not contain {}",
                    self.options.target_filename
                ),
            });
        }

        let raw_track = self.tool.gps_track(&video).await?;
        let samples = parse_samples(&raw_track, self.options.altitude_type)?;
        if samples.is_empty() {
            return Err(ExtractError::MissingMetadata("GPS track"));
        }

        let raw_date = self.tool.create_date(&video).await?;
        let default_identifier = default_identifier(&self.options.prefix, &raw_date)?;

        tracing::info!(
            video = %video.display(),
            samples = samples.len(),
            identifier = %default_identifier,
            "data extracted"
        );

        Ok(ExtractionResult {
            samples,
            default_identifier,
        })
    }
}
