//! The persisted object graph: four hierarchy collections plus the user list.
//!
//! Collections keep insertion order; every derived view relies on it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::item::{Item, ItemFields, Level, Record, Subject, Topic, Training, Unit};
use super::user::{User, seed_users};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Graph {
    pub subjects: Vec<Subject>,
    pub trainings: Vec<Training>,
    pub topics: Vec<Topic>,
    pub units: Vec<Unit>,
    pub users: Vec<User>,
}

/// A borrowed view of one record, enough for navigation and aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node<'a> {
    pub level: Level,
    pub fields: &'a ItemFields,
    pub parent_id: Option<&'a str>,
}

impl<'a> Node<'a> {
    fn of<R: Record>(record: &'a R) -> Self {
        Self {
            level: R::LEVEL,
            fields: record.fields(),
            parent_id: record.parent_id(),
        }
    }
}

/// A mutable handle to one record of any level.
#[derive(Debug)]
pub enum ItemMut<'a> {
    Subject(&'a mut Subject),
    Training(&'a mut Training),
    Topic(&'a mut Topic),
    Unit(&'a mut Unit),
}

impl ItemMut<'_> {
    pub fn fields_mut(&mut self) -> &mut ItemFields {
        match self {
            Self::Subject(s) => s.fields_mut(),
            Self::Training(t) => t.fields_mut(),
            Self::Topic(t) => t.fields_mut(),
            Self::Unit(u) => u.fields_mut(),
        }
    }

    pub fn set_parent_id(&mut self, parent_id: String) {
        match self {
            Self::Subject(s) => s.set_parent_id(parent_id),
            Self::Training(t) => t.set_parent_id(parent_id),
            Self::Topic(t) => t.set_parent_id(parent_id),
            Self::Unit(u) => u.set_parent_id(parent_id),
        }
    }

    pub fn unit_mut(&mut self) -> Option<&mut Unit> {
        match self {
            Self::Unit(u) => Some(&mut **u),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_item(&self) -> Item {
        match self {
            Self::Subject(s) => Item::Subject((**s).clone()),
            Self::Training(t) => Item::Training((**t).clone()),
            Self::Topic(t) => Item::Topic((**t).clone()),
            Self::Unit(u) => Item::Unit((**u).clone()),
        }
    }
}

/// Ids removed by a cascading delete, grouped by level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Subtree {
    pub subjects: HashSet<String>,
    pub trainings: HashSet<String>,
    pub topics: HashSet<String>,
    pub units: HashSet<String>,
}

impl Subtree {
    fn ids_mut(&mut self, level: Level) -> &mut HashSet<String> {
        match level {
            Level::Subject => &mut self.subjects,
            Level::Training => &mut self.trainings,
            Level::Topic => &mut self.topics,
            Level::Unit => &mut self.units,
        }
    }

    #[must_use]
    pub const fn ids(&self, level: Level) -> &HashSet<String> {
        match level {
            Level::Subject => &self.subjects,
            Level::Training => &self.trainings,
            Level::Topic => &self.topics,
            Level::Unit => &self.units,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        Level::ALL.iter().map(|level| self.ids(*level).len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Graph {
    /// Empty hierarchy with the two demo users.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            users: seed_users(),
            ..Self::default()
        }
    }

    /// Borrowed nodes of one level, in insertion order.
    #[must_use]
    pub fn nodes(&self, level: Level) -> Vec<Node<'_>> {
        match level {
            Level::Subject => self.subjects.iter().map(Node::of).collect(),
            Level::Training => self.trainings.iter().map(Node::of).collect(),
            Level::Topic => self.topics.iter().map(Node::of).collect(),
            Level::Unit => self.units.iter().map(Node::of).collect(),
        }
    }

    /// Every node of every level, subjects first.
    pub fn all_nodes(&self) -> impl Iterator<Item = Node<'_>> {
        Level::ALL.into_iter().flat_map(|level| self.nodes(level))
    }

    #[must_use]
    pub fn node(&self, level: Level, id: &str) -> Option<Node<'_>> {
        match level {
            Level::Subject => self.subjects.iter().find(|r| r.fields.id == id).map(Node::of),
            Level::Training => self.trainings.iter().find(|r| r.fields.id == id).map(Node::of),
            Level::Topic => self.topics.iter().find(|r| r.fields.id == id).map(Node::of),
            Level::Unit => self.units.iter().find(|r| r.fields.id == id).map(Node::of),
        }
    }

    #[must_use]
    pub fn contains(&self, level: Level, id: &str) -> bool {
        self.node(level, id).is_some()
    }

    /// Number of records at `level`.
    #[must_use]
    pub fn count(&self, level: Level) -> usize {
        match level {
            Level::Subject => self.subjects.len(),
            Level::Training => self.trainings.len(),
            Level::Topic => self.topics.len(),
            Level::Unit => self.units.len(),
        }
    }

    /// Owned copy of one record.
    #[must_use]
    pub fn item(&self, level: Level, id: &str) -> Option<Item> {
        match level {
            Level::Subject => find(&self.subjects, id).cloned().map(Item::from),
            Level::Training => find(&self.trainings, id).cloned().map(Item::from),
            Level::Topic => find(&self.topics, id).cloned().map(Item::from),
            Level::Unit => find(&self.units, id).cloned().map(Item::from),
        }
    }

    /// Owned copies of all records of one level, in insertion order.
    #[must_use]
    pub fn items(&self, level: Level) -> Vec<Item> {
        match level {
            Level::Subject => self.subjects.iter().cloned().map(Item::from).collect(),
            Level::Training => self.trainings.iter().cloned().map(Item::from).collect(),
            Level::Topic => self.topics.iter().cloned().map(Item::from).collect(),
            Level::Unit => self.units.iter().cloned().map(Item::from).collect(),
        }
    }

    pub fn item_mut(&mut self, level: Level, id: &str) -> Option<ItemMut<'_>> {
        match level {
            Level::Subject => find_mut(&mut self.subjects, id).map(ItemMut::Subject),
            Level::Training => find_mut(&mut self.trainings, id).map(ItemMut::Training),
            Level::Topic => find_mut(&mut self.topics, id).map(ItemMut::Topic),
            Level::Unit => find_mut(&mut self.units, id).map(ItemMut::Unit),
        }
    }

    /// Append a record to its collection.
    pub fn push(&mut self, item: Item) {
        match item {
            Item::Subject(s) => self.subjects.push(s),
            Item::Training(t) => self.trainings.push(t),
            Item::Topic(t) => self.topics.push(t),
            Item::Unit(u) => self.units.push(u),
        }
    }

    /// The record at `(level, id)` plus every transitive descendant.
    ///
    /// Empty when the root does not exist.
    #[must_use]
    pub fn subtree(&self, level: Level, id: &str) -> Subtree {
        let mut tree = Subtree::default();
        if !self.contains(level, id) {
            return tree;
        }
        tree.ids_mut(level).insert(id.to_string());

        let mut current = level;
        while let Some(child) = current.child() {
            let found: HashSet<String> = self
                .nodes(child)
                .into_iter()
                .filter(|node| {
                    node.parent_id
                        .is_some_and(|parent| tree.ids(current).contains(parent))
                })
                .map(|node| node.fields.id.clone())
                .collect();
            *tree.ids_mut(child) = found;
            current = child;
        }
        tree
    }

    /// Drop every record listed in `tree`.
    pub fn remove_subtree(&mut self, tree: &Subtree) {
        self.subjects.retain(|r| !tree.subjects.contains(&r.fields.id));
        self.trainings.retain(|r| !tree.trainings.contains(&r.fields.id));
        self.topics.retain(|r| !tree.topics.contains(&r.fields.id));
        self.units.retain(|r| !tree.units.contains(&r.fields.id));
    }
}

fn find<'a, R: Record>(records: &'a [R], id: &str) -> Option<&'a R> {
    records.iter().find(|r| r.fields().id == id)
}

fn find_mut<'a, R: Record>(records: &'a mut [R], id: &str) -> Option<&'a mut R> {
    records.iter_mut().find(|r| r.fields().id == id)
}
