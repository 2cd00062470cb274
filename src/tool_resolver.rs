//! # Tool Path Resolver
//!
//! Finds the zopflipng executable:
//! - Explicit path from the command line
//! - `ZOPFLIPNG` environment variable
//! - System `PATH`

use crate::error::OptimizeError;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TOOL_NAME: &str = "zopflipng";
pub const TOOL_ENV_VAR: &str = "ZOPFLIPNG";

/// Tool path resolver for the compressor executable
pub struct ToolPathResolver {
    /// Path given explicitly by the user, wins over everything else
    explicit: Option<PathBuf>,
}

impl ToolPathResolver {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Resolve the path to zopflipng
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(ref path) = self.explicit {
            debug!("Checking explicit compressor path: {:?}", path);
            return Self::existing_file(path);
        }

        if let Some(path) = env::var_os(TOOL_ENV_VAR).map(PathBuf::from) {
            debug!("Checking {} environment variable: {:?}", TOOL_ENV_VAR, path);
            if let Some(found) = Self::existing_file(&path) {
                return Some(found);
            }
            warn!("{} points to a missing file: {:?}", TOOL_ENV_VAR, path);
        }

        let found = Self::find_in_system_path(TOOL_NAME);
        debug!("Resolved {} from PATH: {:?}", TOOL_NAME, found);
        found
    }

    /// Resolve or fail with installation instructions
    pub fn require(&self) -> Result<PathBuf, OptimizeError> {
        self.resolve().ok_or_else(|| {
            let location = match self.explicit {
                Some(ref path) => format!("'{}' does not exist", path.display()),
                None => format!("'{}' not found in {} or PATH", TOOL_NAME, TOOL_ENV_VAR),
            };
            OptimizeError::MissingDependency(format!(
                "{}.\nTo install, run:\n  {}",
                location,
                Self::install_instructions()
            ))
        })
    }

    fn existing_file(path: &Path) -> Option<PathBuf> {
        path.is_file().then(|| path.to_path_buf())
    }

    /// Find tool in system PATH
    fn find_in_system_path(tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file())
    }

    fn install_instructions() -> &'static str {
        if cfg!(target_os = "linux") {
            "sudo apt-get install zopfli  # provides zopflipng"
        } else if cfg!(target_os = "macos") {
            "brew install zopfli"
        } else {
            "download zopflipng from https://github.com/google/zopfli and add it to PATH"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_found() {
        let temp_dir = TempDir::new().unwrap();
        let tool = temp_dir.path().join("my-zopflipng");
        std::fs::write(&tool, b"").unwrap();

        let resolver = ToolPathResolver::new(Some(tool.clone()));
        assert_eq!(resolver.resolve(), Some(tool.clone()));
        assert_eq!(resolver.require().unwrap(), tool);
    }

    #[test]
    fn test_explicit_path_missing() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ToolPathResolver::new(Some(temp_dir.path().join("nope")));

        assert!(resolver.resolve().is_none());
        let err = resolver.require().unwrap_err();
        assert!(matches!(err, OptimizeError::MissingDependency(_)));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_explicit_directory_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let resolver = ToolPathResolver::new(Some(temp_dir.path().to_path_buf()));
        assert!(resolver.resolve().is_none());
    }
}
