use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Graph, Level, Status};

/// Item counts per status across all four levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub backlog: usize,
    pub draft: usize,
    pub ready: usize,
    pub published: usize,
}

impl StatusCounts {
    #[must_use]
    pub const fn get(&self, status: Status) -> usize {
        match status {
            Status::Backlog => self.backlog,
            Status::Draft => self.draft,
            Status::Ready => self.ready,
            Status::Published => self.published,
        }
    }

    fn bump(&mut self, status: Status) {
        match status {
            Status::Backlog => self.backlog += 1,
            Status::Draft => self.draft += 1,
            Status::Ready => self.ready += 1,
            Status::Published => self.published += 1,
        }
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.backlog + self.draft + self.ready + self.published
    }
}

#[must_use]
pub fn status_counts(graph: &Graph) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for node in graph.all_nodes() {
        counts.bump(node.fields.status);
    }
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelTotals {
    pub subjects: usize,
    pub trainings: usize,
    pub topics: usize,
    pub units: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub level: Level,
    pub id: String,
    pub name: String,
    pub status: Status,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub totals: LevelTotals,
    pub status: StatusCounts,
    pub recent: Vec<RecentItem>,
}

/// Totals plus the `recent` most recently updated items, newest first.
#[must_use]
pub fn dashboard(graph: &Graph, recent: usize) -> Dashboard {
    let mut items: Vec<RecentItem> = graph
        .all_nodes()
        .map(|node| RecentItem {
            level: node.level,
            id: node.fields.id.clone(),
            name: node.fields.name.clone(),
            status: node.fields.status,
            updated_at: node.fields.updated_at,
        })
        .collect();
    // stable sort keeps collection order among equal timestamps
    items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    items.truncate(recent);

    Dashboard {
        totals: LevelTotals {
            subjects: graph.count(Level::Subject),
            trainings: graph.count(Level::Training),
            topics: graph.count(Level::Topic),
            units: graph.count(Level::Unit),
        },
        status: status_counts(graph),
        recent: items,
    }
}
