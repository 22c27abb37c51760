use lectern_core::{Graph, ItemPatch, Level, Store};
use proptest::prelude::*;
use std::collections::HashSet;

/// A random forest: each entry picks a parent among the items created so far
/// one level up, by index modulo their count.
fn arb_shape() -> impl Strategy<Value = Vec<(Level, usize)>> {
    prop::collection::vec(
        (
            prop_oneof![
                Just(Level::Subject),
                Just(Level::Training),
                Just(Level::Topic),
                Just(Level::Unit),
            ],
            any::<usize>(),
        ),
        1..40,
    )
}

fn build(shape: &[(Level, usize)]) -> Store {
    let mut store = Store::in_memory(Graph::seed());
    for (index, (level, pick)) in shape.iter().enumerate() {
        let draft = ItemPatch::named(format!("item-{index}"));
        let draft = match level.parent() {
            None => draft,
            Some(parent_level) => {
                let parents = store.graph().nodes(parent_level);
                if parents.is_empty() {
                    continue;
                }
                let parent = parents[pick % parents.len()].fields.id.clone();
                draft.with_parent(parent)
            }
        };
        store.create(*level, draft).expect("valid create");
    }
    store
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(200))]

    #[test]
    fn ids_are_unique_per_level(shape in arb_shape()) {
        let store = build(&shape);
        for level in Level::ALL {
            let nodes = store.graph().nodes(level);
            let ids: HashSet<&str> = nodes.iter().map(|n| n.fields.id.as_str()).collect();
            prop_assert_eq!(ids.len(), nodes.len());
        }
    }

    #[test]
    fn cascade_leaves_no_orphans(shape in arb_shape(), pick in any::<usize>()) {
        let mut store = build(&shape);
        let subjects = store.graph().nodes(Level::Subject);
        prop_assume!(!subjects.is_empty());
        let victim = subjects[pick % subjects.len()].fields.id.clone();

        let before: usize = Level::ALL.iter().map(|l| store.graph().count(*l)).sum();
        let report = store.delete(Level::Subject, &victim).expect("delete");
        let after: usize = Level::ALL.iter().map(|l| store.graph().count(*l)).sum();
        prop_assert_eq!(before - after, report.total());

        let graph = store.graph();
        for level in [Level::Training, Level::Topic, Level::Unit] {
            let parent_level = level.parent().expect("non-root level");
            for node in graph.nodes(level) {
                let parent = node.parent_id.expect("child has parent");
                prop_assert!(graph.contains(parent_level, parent));
            }
        }
    }
}
