//! Load/save cycle for the persistence slot (`.lectern/store.json`).
//!
//! Loading fails open: a missing or unreadable slot yields the seed graph.
//! Saving serializes the whole graph, writes a sibling temp file, and renames
//! it over the slot so readers see either the old or the new document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::model::Graph;

/// File name of the persistence slot inside `.lectern/`.
pub const STORE_FILE: &str = "store.json";

/// Read the graph stored at `path`, falling back to [`Graph::seed`].
#[must_use]
pub fn load(path: &Path) -> Graph {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no store yet, using seed graph");
            return Graph::seed();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "store unreadable, using seed graph");
            return Graph::seed();
        }
    };

    match serde_json::from_slice::<Graph>(&bytes) {
        Ok(graph) => {
            debug!(
                path = %path.display(),
                subjects = graph.subjects.len(),
                trainings = graph.trainings.len(),
                topics = graph.topics.len(),
                units = graph.units.len(),
                "store loaded"
            );
            graph
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "store unparsable, using seed graph");
            Graph::seed()
        }
    }
}

/// Overwrite the slot at `path` with the serialized graph.
///
/// # Errors
///
/// Returns any serialization, write, or rename failure.
pub fn save(path: &Path, graph: &Graph) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let body = serde_json::to_vec_pretty(graph)?;
    let tmp = temp_path(path);
    fs::write(&tmp, &body)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), bytes = body.len(), "store saved");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
