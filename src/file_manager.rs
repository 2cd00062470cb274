//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei PNG e le utilità sulle dimensioni.
//!
//! ## Responsabilità:
//! - Espansione lazy di un glob pattern in una sequenza di file
//! - Normalizzazione dei separatori (`\` -> `/`) prima del matching
//! - Filtro dei soli file regolari con estensione `png` (case-sensitive)
//! - Lettura dimensione file e formattazione human-readable
//!
//! ## Esempio:
//! ```rust,ignore
//! for entry in FileManager::find_png_files("assets/**/*.png")? {
//!     let path = entry?;
//!     let size = FileManager::file_size(&path).await?;
//! }
//! ```

use crate::error::OptimizeError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Manages file discovery and size helpers
pub struct FileManager;

impl FileManager {
    /// Lazily expand `pattern` into the PNG files it matches.
    ///
    /// The pattern is validated up front. Listing errors surface as
    /// `OptimizeError::Enumeration` items, directories and non-PNG
    /// entries are skipped.
    pub fn find_png_files(
        pattern: &str,
    ) -> Result<impl Iterator<Item = Result<PathBuf, OptimizeError>>, OptimizeError> {
        let pattern = normalize_pattern(pattern);
        let paths = glob::glob(&pattern)?;

        Ok(paths.filter_map(|entry| match entry {
            Ok(path) if Self::is_png(&path) && path.is_file() => Some(Ok(path)),
            Ok(_) => None,
            Err(e) => Some(Err(OptimizeError::Enumeration(e))),
        }))
    }

    /// Check for a `.png` extension, case-sensitive
    pub fn is_png(path: &Path) -> bool {
        path.extension() == Some(OsStr::new("png"))
    }

    /// Get the size of a file in bytes
    pub async fn file_size(path: &Path) -> Result<u64, OptimizeError> {
        tokio::fs::metadata(path)
            .await
            .map(|metadata| metadata.len())
            .map_err(|source| OptimizeError::SizeProbe {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}

/// Convert backslash separators to forward slashes so the glob matcher sees
/// the same pattern on every platform. Extended-length `\\?\` paths are
/// returned untouched.
pub fn normalize_pattern(pattern: &str) -> String {
    if pattern.starts_with(r"\\?\") {
        pattern.to_string()
    } else {
        pattern.replace('\\', "/")
    }
}
