use crate::model::{Graph, Item, Level, Status};

/// Filter for [`list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub level: Level,
    /// Restrict to direct children of this parent.
    pub parent_id: Option<String>,
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    pub status: Option<Status>,
}

impl ListQuery {
    #[must_use]
    pub const fn new(level: Level) -> Self {
        Self {
            level,
            parent_id: None,
            search: None,
            status: None,
        }
    }

    #[must_use]
    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn matching(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub const fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Items of `query.level` that pass every filter, in insertion order.
#[must_use]
pub fn list(graph: &Graph, query: &ListQuery) -> Vec<Item> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    graph
        .items(query.level)
        .into_iter()
        .filter(|item| {
            query
                .parent_id
                .as_deref()
                .is_none_or(|parent| item.parent_id() == Some(parent))
        })
        .filter(|item| query.status.is_none_or(|status| item.status() == status))
        .filter(|item| needle.as_deref().is_none_or(|needle| matches_search(item, needle)))
        .collect()
}

fn matches_search(item: &Item, needle: &str) -> bool {
    let fields = item.fields();
    fields.name.to_lowercase().contains(needle)
        || fields
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}
