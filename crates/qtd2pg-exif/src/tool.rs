//! The `ExifTool` subprocess boundary.
//!
//! Only stdout is read. Stderr is discarded and the exit status is logged but
//! not acted on: `ExifTool` exits non-zero for warnings on otherwise usable
//! files, and an empty stdout is handled by the parser.

use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use crate::error::ExtractError;

/// Per-frame print format: longitude, latitude, numeric altitude.
pub const GPS_TRACK_FORMAT: &str = "$gpslongitude, $gpslatitude, $gpsaltitude#";

/// Coordinate format passed to `-c`.
pub const COORDINATE_FORMAT: &str = "%.8f";

/// Source of raw metadata text for one video file.
pub trait MetadataTool: Sync {
    /// Raw per-frame GPS lines.
    fn gps_track(&self, video: &Path) -> impl Future<Output = Result<String, ExtractError>> + Send;

    /// Raw `CreateDate` tag output.
    fn create_date(&self, video: &Path) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// Runs the `exiftool` binary.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: PathBuf,
}

impl ExifTool {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: Vec<OsString>) -> Result<String, ExtractError> {
        let program = self.program.display().to_string();

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ExtractError::ToolInvocation {
                program: program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            tracing::debug!(program = %program, status = %output.status, "exiftool exited non-zero");
        }

        String::from_utf8(output.stdout).map_err(|_| ExtractError::NonUtf8Output { program })
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl MetadataTool for ExifTool {
    async fn gps_track(&self, video: &Path) -> Result<String, ExtractError> {
        tracing::debug!(video = %video.display(), "extracting GPS track");
        self.run(gps_track_args(video)).await
    }

    async fn create_date(&self, video: &Path) -> Result<String, ExtractError> {
        tracing::debug!(video = %video.display(), "extracting CreateDate");
        self.run(create_date_args(video)).await
    }
}

/// Arguments for the per-frame GPS extraction.
#[must_use]
pub fn gps_track_args(video: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-G1",
        "-a",
        "-s",
        "-ee3",
        "-p",
        GPS_TRACK_FORMAT,
        "-api",
        "largefilesupport=1",
        "-c",
        COORDINATE_FORMAT,
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(video.as_os_str().to_owned());
    args
}

/// Arguments for the single `CreateDate` tag read.
#[must_use]
pub fn create_date_args(video: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-G1", "-a", "-s", "-createdate", "-api", "largefilesupport=1"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(video.as_os_str().to_owned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gps_track_args_request_per_frame_format() {
        let args = gps_track_args(Path::new("/data/clip/origin_6_lrv.mp4"));
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-G1",
                "-a",
                "-s",
                "-ee3",
                "-p",
                "$gpslongitude, $gpslatitude, $gpsaltitude#",
                "-api",
                "largefilesupport=1",
                "-c",
                "%.8f",
                "/data/clip/origin_6_lrv.mp4",
            ]
        );
    }

    #[test]
    fn create_date_args_read_single_tag() {
        let args = create_date_args(Path::new("video.mp4"));
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(
            args,
            vec![
                "-G1",
                "-a",
                "-s",
                "-createdate",
                "-api",
                "largefilesupport=1",
                "video.mp4"
            ]
        );
    }

    #[tokio::test]
    async fn missing_binary_is_tool_invocation_failure() {
        let tool = ExifTool::new("/nonexistent/qtd2pg/exiftool");
        let err = tool.gps_track(Path::new("video.mp4")).await.unwrap_err();
        assert!(
            matches!(err, ExtractError::ToolInvocation { ref program, .. } if program.contains("exiftool")),
            "expected ToolInvocation, got: {err:?}"
        );
    }
}
