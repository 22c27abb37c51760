use crate::output::{CliError, OutputMode, fail, render_success};
use crate::project::LOCK_FILE;
use anyhow::{Context as _, Result};
use clap::Args;
use lectern_core::Graph;
use lectern_core::config::{self, PROJECT_DIR, StoreConfig};
use lectern_core::error::ErrorCode;
use lectern_core::lock::StoreLock;
use lectern_core::store::persist::{self, STORE_FILE};
use std::path::Path;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Reset the store to the seed data even if `.lectern/` already exists.
    #[arg(long)]
    pub force: bool,
}

const GITIGNORE: &str = "lock\n*.tmp\n";

/// Execute `lec init`. Creates the project skeleton:
///
/// ```text
/// .lectern/
///   store.json   (seed graph: no items, two demo users)
///   config.toml  (default project config, kept on --force)
///   .gitignore   (lock file and write temporaries)
/// ```
///
/// # Errors
///
/// Returns an error if `.lectern/` already exists and `--force` is not set,
/// or if any filesystem operation fails.
pub fn run_init(args: &InitArgs, output: OutputMode, project_root: &Path) -> Result<()> {
    let dir = project_root.join(PROJECT_DIR);

    if dir.exists() && !args.force {
        return Err(fail(
            output,
            &CliError::with_details(
                ".lectern/ already exists",
                "Use `lec init --force` to reset the store",
                "already_initialized",
            ),
        ));
    }

    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    // A forced reset must not race a running command.
    let timeout = config::load_project_config(project_root)
        .map_or_else(|_| StoreConfig::default().lock_timeout(), |cfg| cfg.store.lock_timeout());
    let _lock = StoreLock::acquire(&dir.join(LOCK_FILE), timeout)
        .map_err(|err| fail(output, &CliError::from(&err)))?;

    let store_path = dir.join(STORE_FILE);
    persist::save(&store_path, &Graph::seed()).map_err(|err| {
        fail(
            output,
            &CliError::coded(
                ErrorCode::StoreWriteFailed,
                format!("failed to write {}: {err}", store_path.display()),
            ),
        )
    })?;

    let wrote_config = config::write_default_project_config(project_root)?;

    let gitignore_path = dir.join(".gitignore");
    std::fs::write(&gitignore_path, GITIGNORE)
        .with_context(|| format!("Failed to write {}", gitignore_path.display()))?;

    tracing::info!(dir = %dir.display(), wrote_config, "initialized");
    render_success(output, "Initialized .lectern/ project structure.")?;
    if output.is_pretty() {
        println!();
        println!("  Store:  .lectern/{STORE_FILE}");
        println!("  Config: .lectern/config.toml");
        println!();
        println!("Next steps:");
        println!("  lec create subject --name \"My first subject\"");
        println!("  lec user list");
    }
    Ok(())
}
