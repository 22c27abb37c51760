use serde::Serialize;

use crate::model::{Graph, Level};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    pub name: String,
    pub level: Level,
    pub id: String,
}

/// Path from the root subject down to `(level, id)`.
///
/// The walk stops at the first parent reference that does not resolve, so a
/// partially orphaned item yields a shorter trail. Empty when the item itself
/// is missing.
#[must_use]
pub fn breadcrumbs(graph: &Graph, level: Level, id: &str) -> Vec<Crumb> {
    let mut trail = Vec::new();
    let mut cursor = graph.node(level, id);

    while let Some(node) = cursor {
        trail.push(Crumb {
            name: node.fields.name.clone(),
            level: node.level,
            id: node.fields.id.clone(),
        });
        cursor = match (node.level.parent(), node.parent_id) {
            (Some(parent_level), Some(parent_id)) => graph.node(parent_level, parent_id),
            _ => None,
        };
    }

    trail.reverse();
    trail
}

/// Ancestor names joined with `" > "`, excluding the item itself.
#[must_use]
pub fn ancestry(graph: &Graph, level: Level, id: &str) -> Option<String> {
    let trail = breadcrumbs(graph, level, id);
    let (_, ancestors) = trail.split_last()?;
    if ancestors.is_empty() {
        return None;
    }
    Some(
        ancestors
            .iter()
            .map(|crumb| crumb.name.as_str())
            .collect::<Vec<_>>()
            .join(" > "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemPatch;
    use crate::store::Store;

    fn chain() -> (Store, [String; 4]) {
        let mut store = Store::in_memory(Graph::seed());
        let s = store.create(Level::Subject, ItemPatch::named("Cloud")).unwrap();
        let t = store
            .create(Level::Training, ItemPatch::named("K8s").with_parent(s.id()))
            .unwrap();
        let p = store
            .create(Level::Topic, ItemPatch::named("Pods").with_parent(t.id()))
            .unwrap();
        let u = store
            .create(Level::Unit, ItemPatch::named("Intro").with_parent(p.id()))
            .unwrap();
        let ids = [s, t, p, u].map(|item| item.id().to_string());
        (store, ids)
    }

    #[test]
    fn full_trail_is_root_first() {
        let (store, ids) = chain();
        let trail = breadcrumbs(store.graph(), Level::Unit, &ids[3]);
        let names: Vec<_> = trail.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Cloud", "K8s", "Pods", "Intro"]);
        assert_eq!(trail[0].level, Level::Subject);
        assert_eq!(trail[3].id, ids[3]);
    }

    #[test]
    fn trail_stops_at_missing_parent() {
        let (store, ids) = chain();
        let mut graph = store.into_graph();
        graph.trainings.clear();

        let trail = breadcrumbs(&graph, Level::Unit, &ids[3]);
        let names: Vec<_> = trail.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Pods", "Intro"]);
    }

    #[test]
    fn missing_item_has_no_trail() {
        let (store, _) = chain();
        assert!(breadcrumbs(store.graph(), Level::Topic, "ghost").is_empty());
    }

    #[test]
    fn ancestry_joins_parent_names() {
        let (store, ids) = chain();
        let graph = store.graph();
        assert_eq!(
            ancestry(graph, Level::Unit, &ids[3]).as_deref(),
            Some("Cloud > K8s > Pods")
        );
        assert_eq!(ancestry(graph, Level::Subject, &ids[0]), None);
    }
}
