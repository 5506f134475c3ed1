//! `.env` loading

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Load `.env` from the working directory (or a parent), overriding variables
/// that are already set. A missing file is not an error.
///
/// Returns the path that was loaded.
pub fn load_dotenv() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    load_dotenv_from(&cwd)
}

/// Load the nearest `.env` in `dir` or its ancestors, overriding existing
/// variables
pub fn load_dotenv_from(dir: &Path) -> Option<PathBuf> {
    let path = dir
        .ancestors()
        .map(|d| d.join(".env"))
        .find(|candidate| candidate.is_file())?;

    match dotenvy::from_path_override(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "Loaded environment file");
            Some(path)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to load .env file");
            None
        }
    }
}
