//! Read-only projections over a [`crate::model::Graph`].

pub mod board;
pub mod breadcrumb;
pub mod export;
pub mod listing;
pub mod stats;

pub use board::{Board, Card, Column, board};
pub use breadcrumb::{Crumb, ancestry, breadcrumbs};
pub use export::{ExportFormat, ExportOptions, export, flatten_markdown};
pub use listing::{ListQuery, list};
pub use stats::{Dashboard, LevelTotals, RecentItem, StatusCounts, dashboard, status_counts};
