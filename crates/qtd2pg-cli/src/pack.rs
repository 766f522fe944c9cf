//! The `pack` command: build a batch from the command line and run it.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args};
use qtd2pg_core::{AppConfig, Settings};
use qtd2pg_exif::ExifTool;
use qtd2pg_packer::{DatabaseTarget, PackOutcome, PackRequest, PgStore, RecordPacker, VideoInput};

use crate::TableArgs;

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("target").required(true).args(["new_db", "db"])))]
pub struct PackArgs {
    /// Create this database and its tables before packing
    #[arg(long, value_name = "NAME")]
    pub new_db: Option<String>,
    /// Pack into this existing database
    #[arg(long, value_name = "NAME")]
    pub db: Option<String>,
    #[command(flatten)]
    pub tables: TableArgs,
    /// Video folder, optionally with an identifier alias
    #[arg(long = "video", value_name = "FOLDER[=ALIAS]", value_parser = parse_video)]
    pub videos: Vec<VideoInput>,
    /// Add every direct subfolder of this directory
    #[arg(long, value_name = "PARENT")]
    pub subfolders: Option<PathBuf>,
    /// Maximum number of videos in one batch (defaults to the settings value)
    #[arg(long)]
    pub input_limit: Option<usize>,
    /// Database user (falls back to settings, then `postgres`)
    #[arg(long, env = "QTD2PG_DB_USER")]
    pub user: Option<String>,
}

impl PackArgs {
    fn target(&self) -> anyhow::Result<DatabaseTarget> {
        match (&self.new_db, &self.db) {
            (Some(name), None) => Ok(DatabaseTarget::New(name.clone())),
            (None, Some(name)) => Ok(DatabaseTarget::Existing(name.clone())),
            _ => anyhow::bail!("exactly one of --new-db or --db is required"),
        }
    }
}

/// `folder` or `folder=alias`.
pub(crate) fn parse_video(raw: &str) -> Result<VideoInput, String> {
    let (folder, alias) = match raw.split_once('=') {
        Some((folder, alias)) => (folder, Some(alias.trim())),
        None => (raw, None),
    };
    if folder.trim().is_empty() {
        return Err(format!("missing folder in '{raw}'"));
    }

    let video = VideoInput::new(folder);
    Ok(match alias.filter(|a| !a.is_empty()) {
        Some(alias) => video.with_alias(alias),
        None => video,
    })
}

/// Direct subdirectories of `parent`, sorted by path.
pub(crate) fn list_subfolders(parent: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(parent)
        .with_context(|| format!("failed to read directory {}", parent.display()))?;

    let mut folders = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Explicit videos first, then subfolders; duplicates keep their first
/// occurrence. More than `limit` videos is an error.
pub(crate) fn collect_videos(
    explicit: Vec<VideoInput>,
    subfolders: Vec<PathBuf>,
    limit: usize,
) -> anyhow::Result<Vec<VideoInput>> {
    let mut seen = HashSet::new();
    let videos: Vec<VideoInput> = explicit
        .into_iter()
        .chain(subfolders.into_iter().map(VideoInput::new))
        .filter(|video| seen.insert(video.folder.clone()))
        .collect();

    if videos.is_empty() {
        anyhow::bail!("no videos given; use --video or --subfolders");
    }
    if videos.len() > limit {
        anyhow::bail!(
            "{} videos exceed the input limit of {limit}; split the batch",
            videos.len()
        );
    }
    Ok(videos)
}

pub(crate) async fn run_pack(
    config: &AppConfig,
    settings: &Settings,
    args: PackArgs,
) -> anyhow::Result<()> {
    let target = args.target()?;
    let tables = args.tables.resolve(settings)?;

    let parent = args
        .subfolders
        .clone()
        .or_else(|| {
            args.videos
                .is_empty()
                .then(|| settings.default_directory.as_deref().map(PathBuf::from))
                .flatten()
        });
    let subfolders = match parent {
        Some(parent) => list_subfolders(&parent)?,
        None => Vec::new(),
    };
    let limit = args.input_limit.unwrap_or(settings.input_limit);
    let videos = collect_videos(args.videos, subfolders, limit)?;

    let request = PackRequest {
        target,
        credentials: crate::credentials(config, settings, args.user),
        tables,
        videos,
    };
    tracing::info!(
        database = request.target.name(),
        mode = %request.tables.mode(),
        videos = request.videos.len(),
        "packing"
    );

    let packer = RecordPacker::new(
        settings,
        ExifTool::new(&config.exiftool_path),
        PgStore::from_config(config, settings),
    );
    let outcomes = packer.pack(&request).await;

    for outcome in &outcomes {
        print_outcome(outcome);
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} outcomes failed", outcomes.len());
    }
    println!("packed {} videos into {}", outcomes.len(), request.target.name());
    Ok(())
}

fn print_outcome(outcome: &PackOutcome) {
    match outcome {
        PackOutcome::Inserted {
            folder,
            identifier,
            messages,
        } => {
            println!("ok      {} ({identifier})", folder.display());
            for message in messages {
                println!("        {message}");
            }
        }
        PackOutcome::Failed {
            folder,
            messages,
            error,
        } => {
            println!("failed  {}: {error}", folder.display());
            for message in messages {
                println!("        {message}");
            }
        }
        PackOutcome::Aborted { messages, error } => {
            println!("aborted {error}");
            for message in messages {
                println!("        {message}");
            }
        }
    }
}
