//! lectern-core library.
//!
//! Four-level content hierarchy (subject → training → topic → unit) with
//! status tracking, comments, a small user list, and derived views, persisted
//! as a single JSON document.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::StoreError`]; I/O-heavy
//!   helpers such as config loading use `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod lock;
pub mod model;
pub mod store;
pub mod view;

pub use error::{ErrorCode, StoreError};
pub use model::{Graph, Item, ItemPatch, Level, Status};
pub use store::{DeleteReport, Store};
