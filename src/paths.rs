use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

const DEFAULT_DB_NAME: &str = "pokedex.db";
const LOG_FILE_NAME: &str = "pokedex-etl.log";

/// Where outputs and logs land when no path is given.
///
/// Nothing touches the filesystem until a path is asked for.
pub struct DataDirs {
    data_dir: PathBuf,
}

impl DataDirs {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "pokedex-etl")
                    .context("Could not determine data directory")?;
                proj_dirs.data_dir().to_path_buf()
            }
        };

        Ok(Self { data_dir })
    }

    /// Output database used when the command line names none. The writer
    /// creates its parent directory.
    pub fn default_output_db(&self) -> PathBuf {
        self.data_dir.join(DEFAULT_DB_NAME)
    }

    /// Log destination while the terminal UI owns the screen
    pub fn log_file(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        Ok(self.data_dir.join(LOG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_created_only_for_log_file() {
        let root = tempfile::tempdir().unwrap();
        let custom = root.path().join("nested").join("data");
        let dirs = DataDirs::new(Some(custom.clone())).unwrap();

        assert_eq!(dirs.default_output_db(), custom.join("pokedex.db"));
        assert!(!custom.exists());

        assert_eq!(dirs.log_file().unwrap(), custom.join("pokedex-etl.log"));
        assert!(custom.is_dir());
    }
}
