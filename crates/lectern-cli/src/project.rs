//! Locating the `.lectern/` directory and opening its store.

use crate::output::{CliError, OutputMode, fail};
use lectern_core::Store;
use lectern_core::config::{self, PROJECT_DIR, ProjectConfig};
use lectern_core::error::ErrorCode;
use lectern_core::lock::StoreLock;
use lectern_core::store::persist::STORE_FILE;
use std::path::{Path, PathBuf};

pub const LOCK_FILE: &str = "lock";

/// Walk upward from `start` to the nearest directory containing `.lectern/`.
pub fn find_project_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[derive(Debug)]
pub struct Project {
    pub root: PathBuf,
    pub dir: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Find the enclosing project and load its config.
    pub fn discover(start: &Path, output: OutputMode) -> anyhow::Result<Self> {
        let Some(dir) = find_project_dir(start) else {
            return Err(fail(
                output,
                &CliError::coded(
                    ErrorCode::NotInitialized,
                    "Not a lectern project: .lectern directory not found",
                ),
            ));
        };
        let root = dir.parent().map_or_else(|| dir.clone(), Path::to_path_buf);

        let config = config::load_project_config(&root).map_err(|err| {
            fail(
                output,
                &CliError::coded(ErrorCode::ConfigParseError, format!("{err:#}")),
            )
        })?;

        tracing::debug!(root = %root.display(), "project discovered");
        Ok(Self { root, dir, config })
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    pub fn open_store(&self) -> Store {
        Store::open(self.store_path())
    }

    /// Take the exclusive store lock for a mutating command.
    pub fn lock(&self, output: OutputMode) -> anyhow::Result<StoreLock> {
        StoreLock::acquire(&self.dir.join(LOCK_FILE), self.config.store.lock_timeout())
            .map_err(|err| fail(output, &CliError::from(&err)))
    }
}
