//! # Compression Invoker Module
//!
//! Wraps one zopflipng invocation per file.
//!
//! ## Invocation:
//! `zopflipng [shared flags...] -y <input> <output>`
//!
//! The shared flags are built once per run (`ZopfliFlags::to_args`) and
//! cloned by reference into every task.
//!
//! ## Output modes:
//! - **In-place**: `output == input`. zopflipng overwrites the file itself.
//!   If it fails mid-write the file is left as zopflipng left it, no rollback.
//! - **Temp-replace**: zopflipng writes `<name>.optimized.tmp` next to the
//!   input; on success the result is checked to be a PNG and renamed over the
//!   original. On failure the sibling may stay behind and is not cleaned up.
//!   The temp name never ends in `.png`, so a glob can never hand it to
//!   another task.
//!
//! The invoker never touches the ledger: it returns the new size or an error.

use crate::config::OutputMode;
use crate::error::OptimizeError;
use crate::file_manager::FileManager;
use image::ImageFormat;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

/// Overwrite the output without prompting
pub const OVERWRITE_FLAG: &str = "-y";

const TEMP_SUFFIX: &str = "optimized.tmp";

/// Runs zopflipng on single files with a flag set shared across the run
#[derive(Debug, Clone)]
pub struct Compressor {
    tool: PathBuf,
    flags: Arc<[String]>,
    mode: OutputMode,
}

impl Compressor {
    pub fn new(tool: PathBuf, flags: Arc<[String]>, mode: OutputMode) -> Self {
        Self { tool, flags, mode }
    }

    /// Where zopflipng should write its result for `input`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match self.mode {
            OutputMode::InPlace => input.to_path_buf(),
            OutputMode::TempReplace => {
                let mut name = input.file_name().unwrap_or_default().to_os_string();
                name.push(".");
                name.push(TEMP_SUFFIX);
                input.with_file_name(name)
            }
        }
    }

    /// Full argument list: shared flags, overwrite flag, input, output
    pub fn build_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        self.flags
            .iter()
            .map(OsString::from)
            .chain([
                OsString::from(OVERWRITE_FLAG),
                input.as_os_str().to_owned(),
                output.as_os_str().to_owned(),
            ])
            .collect()
    }

    /// Compress `input` once and return its size afterwards
    pub async fn compress(&self, input: &Path) -> Result<u64, OptimizeError> {
        let output = self.output_path(input);
        let args = self.build_args(input, &output);

        debug!(
            "> {} {}",
            self.tool.file_name().unwrap_or_default().to_string_lossy(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let result = Command::new(&self.tool)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| OptimizeError::Spawn {
                path: input.to_path_buf(),
                source,
            })?;

        if !result.status.success() {
            return Err(OptimizeError::ToolFailed {
                path: input.to_path_buf(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if self.mode == OutputMode::TempReplace {
            Self::replace_with(input, &output).await?;
        }

        FileManager::file_size(input).await
    }

    /// Check that `output` is a PNG, then rename it over `input`
    async fn replace_with(input: &Path, output: &Path) -> Result<(), OptimizeError> {
        let mut header = Vec::with_capacity(16);
        tokio::fs::File::open(output)
            .await?
            .take(16)
            .read_to_end(&mut header)
            .await?;

        if !matches!(image::guess_format(&header), Ok(ImageFormat::Png)) {
            return Err(OptimizeError::InvalidOutput {
                path: output.to_path_buf(),
            });
        }

        debug!("Replacing {} with {}", input.display(), output.display());
        tokio::fs::rename(output, input)
            .await
            .map_err(|source| OptimizeError::Replace {
                path: input.to_path_buf(),
                source,
            })
    }
}
