use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "era5vis";
const POINTER_FILE_NAME: &str = ".era5vis";
const DATA_DIR_ENV: &str = "ERA5VIS_DATA_DIR";

/// Resolves the directory downloaded NetCDF files live in.
///
/// Resolution order: the `ERA5VIS_DATA_DIR` environment variable, then the
/// first non-empty line of a `~/.era5vis` pointer file, then the platform
/// data directory with an `era5vis` subfolder.
pub fn get_data_dir() -> Result<PathBuf, io::Error> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    if let Some(home) = dirs::home_dir() {
        if let Ok(contents) = std::fs::read_to_string(home.join(POINTER_FILE_NAME)) {
            if let Some(dir) = first_non_empty_line(&contents) {
                return Ok(PathBuf::from(dir));
            }
        }
    }

    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine a system data directory",
            )
        })
}

pub async fn ensure_data_dir_exists(path: &Path) -> Result<(), io::Error> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("data path exists but is not a directory: {}", path.display()),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Creating data directory: {}", path.display());
            tokio::fs::create_dir_all(path).await
        }
        Err(e) => Err(e),
    }
}

fn first_non_empty_line(contents: &str) -> Option<&str> {
    contents
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_file_parsing_skips_blank_lines() {
        assert_eq!(
            first_non_empty_line("\n  \n/data/era5\nother\n"),
            Some("/data/era5")
        );
        assert_eq!(first_non_empty_line("  \n\t\n"), None);
        assert_eq!(first_non_empty_line(""), None);
    }

    #[tokio::test]
    async fn ensure_data_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("data");

        ensure_data_dir_exists(&target).await.unwrap();
        assert!(target.is_dir());

        // Idempotent on an existing directory.
        ensure_data_dir_exists(&target).await.unwrap();
    }

    #[tokio::test]
    async fn ensure_data_dir_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::write(&target, b"not a directory").unwrap();

        let err = ensure_data_dir_exists(&target).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
