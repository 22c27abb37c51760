//! Kanban projection: one column per status, in workflow order.

use serde::Serialize;

use super::breadcrumb::ancestry;
use crate::model::{Graph, Level, Status};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub level: Level,
    pub id: String,
    pub name: String,
    /// Ancestor names, root first, joined with `" > "`.
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub status: Status,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    #[must_use]
    pub fn column(&self, status: Status) -> Option<&Column> {
        self.columns.iter().find(|column| column.status == status)
    }

    #[must_use]
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|column| column.cards.len()).sum()
    }
}

/// Partition every item (or only those of `level`) by status.
#[must_use]
pub fn board(graph: &Graph, level: Option<Level>) -> Board {
    let mut columns: Vec<Column> = Status::ALL
        .into_iter()
        .map(|status| Column {
            status,
            cards: Vec::new(),
        })
        .collect();

    let nodes = graph
        .all_nodes()
        .filter(|node| level.is_none_or(|level| node.level == level));
    for node in nodes {
        let card = Card {
            level: node.level,
            id: node.fields.id.clone(),
            name: node.fields.name.clone(),
            parent: ancestry(graph, node.level, &node.fields.id),
        };
        if let Some(column) = columns.iter_mut().find(|c| c.status == node.fields.status) {
            column.cards.push(card);
        }
    }

    Board { columns }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemPatch;
    use crate::store::Store;

    fn populated() -> Store {
        let mut store = Store::in_memory(Graph::seed());
        let s = store
            .create(
                Level::Subject,
                ItemPatch {
                    status: Some(Status::Published),
                    ..ItemPatch::named("Cloud")
                },
            )
            .unwrap();
        let t = store
            .create(Level::Training, ItemPatch::named("K8s").with_parent(s.id()))
            .unwrap();
        store
            .create(
                Level::Topic,
                ItemPatch {
                    status: Some(Status::Draft),
                    ..ItemPatch::named("Pods").with_parent(t.id())
                },
            )
            .unwrap();
        store
    }

    #[test]
    fn columns_follow_status_order_and_partition_items() {
        let store = populated();
        let board = board(store.graph(), None);
        let order: Vec<Status> = board.columns.iter().map(|c| c.status).collect();
        assert_eq!(order, Status::ALL);
        assert_eq!(board.card_count(), 3);
        assert_eq!(board.column(Status::Published).unwrap().cards[0].name, "Cloud");
        assert_eq!(board.column(Status::Ready).unwrap().cards.len(), 0);
    }

    #[test]
    fn cards_carry_ancestry() {
        let store = populated();
        let board = board(store.graph(), None);
        let pods = &board.column(Status::Draft).unwrap().cards[0];
        assert_eq!(pods.parent.as_deref(), Some("Cloud > K8s"));
        let cloud = &board.column(Status::Published).unwrap().cards[0];
        assert_eq!(cloud.parent, None);
    }

    #[test]
    fn level_filter_limits_cards() {
        let store = populated();
        let board = board(store.graph(), Some(Level::Training));
        assert_eq!(board.card_count(), 1);
        assert_eq!(board.column(Status::Backlog).unwrap().cards[0].name, "K8s");
    }
}
