use crate::utils::error::BuildError;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const VERSION_FILE: &str = "VERSION";

pub fn marker_path(component_dir: &Path) -> PathBuf {
    component_dir.join(VERSION_FILE)
}

/// Reads the first line of `<component_dir>/VERSION`, without its line terminator.
pub async fn read_version(component_dir: &Path) -> Result<String, BuildError> {
    let path = marker_path(component_dir);
    let unreadable = |source| BuildError::MarkerUnreadable {
        path: path.clone(),
        source,
    };

    let file = File::open(&path).await.map_err(unreadable)?;
    let mut line = String::new();
    BufReader::new(file)
        .read_line(&mut line)
        .await
        .map_err(unreadable)?;

    let trimmed = line.strip_suffix('\n').unwrap_or(&line);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}
