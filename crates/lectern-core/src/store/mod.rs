//! The mutation API over the persisted graph.
//!
//! A [`Store`] owns one [`Graph`] and, unless it was built with
//! [`Store::in_memory`], the path of its persistence slot. Every successful
//! mutation rewrites the slot exactly once before returning. A mutation whose
//! write fails leaves the graph as it was.

pub mod persist;

use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{
    Comment, Graph, Item, ItemFields, ItemPatch, Level, NewComment, NewUser, SpeechEdit, Status,
    Subject, Topic, Training, Unit, User, UserPatch,
};

/// Records removed by a cascading delete, per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub subjects: usize,
    pub trainings: usize,
    pub topics: usize,
    pub units: usize,
}

impl DeleteReport {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.subjects + self.trainings + self.topics + self.units
    }

    #[must_use]
    pub const fn count(&self, level: Level) -> usize {
        match level {
            Level::Subject => self.subjects,
            Level::Training => self.trainings,
            Level::Topic => self.topics,
            Level::Unit => self.units,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Store {
    graph: Graph,
    path: Option<PathBuf>,
}

impl Store {
    /// Load the slot at `path` (seed graph if absent) and persist there.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let graph = persist::load(&path);
        Self {
            graph,
            path: Some(path),
        }
    }

    /// A store that never touches disk.
    #[must_use]
    pub const fn in_memory(graph: Graph) -> Self {
        Self { graph, path: None }
    }

    #[must_use]
    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Rewrite the slot with the current graph. No-op for in-memory stores.
    ///
    /// # Errors
    ///
    /// [`StoreError::Persist`] when the write or rename fails.
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        persist::save(path, &self.graph).map_err(|source| StoreError::Persist {
            path: path.clone(),
            source,
        })
    }

    /// Copy of the graph to fall back on if persisting a mutation fails.
    fn snapshot(&self) -> Option<Graph> {
        self.path.as_ref().map(|_| self.graph.clone())
    }

    /// Persist the mutated graph, or put `before` back when the write fails
    /// so the in-memory graph always matches the slot.
    fn commit(&mut self, before: Option<Graph>) -> Result<(), StoreError> {
        let result = self.save();
        if result.is_err()
            && let Some(before) = before
        {
            self.graph = before;
        }
        result
    }

    #[must_use]
    pub fn get(&self, level: Level, id: &str) -> Option<Item> {
        self.graph.item(level, id)
    }

    /// Records of `level` whose parent reference equals `parent_id`.
    #[must_use]
    pub fn children_of(&self, level: Level, parent_id: &str) -> Vec<Item> {
        self.graph
            .items(level)
            .into_iter()
            .filter(|item| item.parent_id() == Some(parent_id))
            .collect()
    }

    /// Create a record of `level` from `draft`.
    ///
    /// # Errors
    ///
    /// Parent reference missing or dangling, unit-only fields on another
    /// level, too many URLs, or a failed write.
    pub fn create(&mut self, level: Level, draft: ItemPatch) -> Result<Item, StoreError> {
        let before = self.snapshot();
        draft.check_level(level)?;
        let urls = draft.cleaned_urls()?;
        let parent_id = match level.parent() {
            None => String::new(),
            Some(parent_level) => {
                let parent_id = draft
                    .parent_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or(StoreError::MissingParentReference {
                        level,
                        parent_level,
                    })?;
                self.check_parent(level, parent_id)?;
                parent_id.to_string()
            }
        };

        let mut fields = ItemFields::new(self.fresh_id(level), Utc::now());
        draft.apply_fields(&mut fields, urls);

        let item = match level {
            Level::Subject => Item::Subject(Subject { fields }),
            Level::Training => Item::Training(Training {
                fields,
                subject_id: parent_id,
            }),
            Level::Topic => Item::Topic(Topic {
                fields,
                training_id: parent_id,
            }),
            Level::Unit => {
                let mut unit = Unit {
                    fields,
                    topic_id: parent_id,
                    speech_texts: Vec::new(),
                    explanation_text: String::new(),
                };
                draft.apply_unit(&mut unit);
                Item::Unit(unit)
            }
        };

        debug!(%level, id = item.id(), parent = ?item.parent_id(), "create");
        self.graph.push(item.clone());
        self.commit(before)?;
        Ok(item)
    }

    /// Merge-patch the record at `(level, id)`.
    ///
    /// # Errors
    ///
    /// Unknown id, dangling new parent, inapplicable fields, too many URLs,
    /// or a failed write.
    pub fn update(&mut self, level: Level, id: &str, patch: ItemPatch) -> Result<Item, StoreError> {
        let before = self.snapshot();
        patch.check_level(level)?;
        let urls = patch.cleaned_urls()?;
        if !self.graph.contains(level, id) {
            return Err(not_found(level, id));
        }
        if let Some(parent_id) = &patch.parent_id {
            self.check_parent(level, parent_id)?;
        }

        let mut handle = self
            .graph
            .item_mut(level, id)
            .ok_or_else(|| not_found(level, id))?;
        let fields = handle.fields_mut();
        patch.apply_fields(fields, urls);
        fields.updated_at = Utc::now();
        if let Some(parent_id) = &patch.parent_id {
            handle.set_parent_id(parent_id.clone());
        }
        if let Some(unit) = handle.unit_mut() {
            patch.apply_unit(unit);
        }
        let item = handle.to_item();

        debug!(%level, id, "update");
        self.commit(before)?;
        Ok(item)
    }

    /// Change only the status of `(level, id)`.
    ///
    /// # Errors
    ///
    /// Unknown id or a failed write.
    pub fn set_status(
        &mut self,
        level: Level,
        id: &str,
        status: Status,
    ) -> Result<Item, StoreError> {
        self.update(level, id, ItemPatch::status(status))
    }

    /// Remove `(level, id)` and everything below it.
    ///
    /// # Errors
    ///
    /// Unknown id or a failed write.
    pub fn delete(&mut self, level: Level, id: &str) -> Result<DeleteReport, StoreError> {
        let before = self.snapshot();
        let tree = self.graph.subtree(level, id);
        if tree.is_empty() {
            return Err(not_found(level, id));
        }

        let report = DeleteReport {
            subjects: tree.subjects.len(),
            trainings: tree.trainings.len(),
            topics: tree.topics.len(),
            units: tree.units.len(),
        };
        self.graph.remove_subtree(&tree);

        debug!(%level, id, removed = report.total(), "delete");
        self.commit(before)?;
        Ok(report)
    }

    /// Append a comment to `(level, id)`.
    ///
    /// # Errors
    ///
    /// Unknown id or a failed write.
    pub fn add_comment(
        &mut self,
        level: Level,
        id: &str,
        comment: NewComment,
    ) -> Result<Comment, StoreError> {
        let before = self.snapshot();
        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            text: comment.text,
            author: comment.author,
            rating: comment.rating,
            created_at: now,
        };

        let mut handle = self
            .graph
            .item_mut(level, id)
            .ok_or_else(|| not_found(level, id))?;
        let fields = handle.fields_mut();
        fields.comments.push(comment.clone());
        fields.updated_at = now;

        debug!(%level, id, rating = comment.rating.get(), "add comment");
        self.commit(before)?;
        Ok(comment)
    }

    /// Apply a speech text edit to unit `unit_id`.
    ///
    /// # Errors
    ///
    /// Unknown unit, index out of range, or a failed write.
    pub fn edit_speech(&mut self, unit_id: &str, edit: SpeechEdit) -> Result<Unit, StoreError> {
        let before = self.snapshot();
        let unit = self
            .graph
            .units
            .iter_mut()
            .find(|unit| unit.fields.id == unit_id)
            .ok_or_else(|| not_found(Level::Unit, unit_id))?;
        unit.apply_speech_edit(edit)?;
        unit.fields.updated_at = Utc::now();
        let unit = unit.clone();

        debug!(id = unit_id, speech_texts = unit.speech_texts.len(), "edit speech");
        self.commit(before)?;
        Ok(unit)
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.graph.users
    }

    #[must_use]
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.graph
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Look a user up by id or email.
    #[must_use]
    pub fn find_user(&self, ident: &str) -> Option<&User> {
        self.graph.users.iter().find(|user| user.matches(ident))
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Persist`] when the write fails.
    pub fn add_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        let before = self.snapshot();
        let mut id = Uuid::new_v4().to_string();
        while self.graph.users.iter().any(|user| user.id == id) {
            id = Uuid::new_v4().to_string();
        }
        let user = User {
            id,
            name: new.name,
            email: new.email,
            role: new.role,
            avatar: None,
            created_at: Some(Utc::now()),
        };

        debug!(id = %user.id, role = %user.role, "add user");
        self.graph.users.push(user.clone());
        self.commit(before)?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Unknown user or a failed write.
    pub fn update_user(&mut self, id: &str, patch: UserPatch) -> Result<User, StoreError> {
        let before = self.snapshot();
        let user = self
            .graph
            .users
            .iter_mut()
            .find(|user| user.id == id)
            .ok_or_else(|| StoreError::UserNotFound(id.to_string()))?;
        patch.apply(user);
        let user = user.clone();

        debug!(id, "update user");
        self.commit(before)?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Unknown user or a failed write.
    pub fn remove_user(&mut self, id: &str) -> Result<User, StoreError> {
        let before = self.snapshot();
        let index = self
            .graph
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| StoreError::UserNotFound(id.to_string()))?;
        let user = self.graph.users.remove(index);

        debug!(id, "remove user");
        self.commit(before)?;
        Ok(user)
    }

    fn check_parent(&self, level: Level, parent_id: &str) -> Result<(), StoreError> {
        let Some(parent_level) = level.parent() else {
            return Ok(());
        };
        if self.graph.contains(parent_level, parent_id) {
            Ok(())
        } else {
            Err(StoreError::InvalidParentReference {
                level,
                parent_level,
                parent_id: parent_id.to_string(),
            })
        }
    }

    fn fresh_id(&self, level: Level) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if !self.graph.contains(level, &id) {
                return id;
            }
        }
    }
}

fn not_found(level: Level, id: &str) -> StoreError {
    StoreError::NotFound {
        level,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Rating, Role, SpeechText};

    fn store() -> Store {
        Store::in_memory(Graph::seed())
    }

    fn subject(store: &mut Store, name: &str) -> String {
        store
            .create(Level::Subject, ItemPatch::named(name))
            .unwrap()
            .id()
            .to_string()
    }

    fn child(store: &mut Store, level: Level, parent: &str, name: &str) -> String {
        store
            .create(level, ItemPatch::named(name).with_parent(parent))
            .unwrap()
            .id()
            .to_string()
    }

    #[test]
    fn create_assigns_id_and_backlog() {
        let mut store = store();
        let item = store
            .create(Level::Subject, ItemPatch::named("Networking"))
            .unwrap();
        assert!(!item.id().is_empty());
        assert_eq!(item.status(), Status::Backlog);
        assert_eq!(item.fields().created_at, item.fields().updated_at);
        assert_eq!(store.graph().subjects.len(), 1);
    }

    #[test]
    fn create_requires_existing_parent() {
        let mut store = store();
        let err = store
            .create(Level::Training, ItemPatch::named("Orphan"))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingParentReference { .. }));

        let err = store
            .create(Level::Training, ItemPatch::named("Orphan").with_parent("ghost"))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidParentReference {
                parent_level: Level::Subject,
                ..
            }
        ));
        assert!(store.graph().trainings.is_empty());
    }

    #[test]
    fn subject_rejects_parent_field() {
        let mut store = store();
        let err = store
            .create(Level::Subject, ItemPatch::named("S").with_parent("x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::FieldNotApplicable { field: "parentId", .. }));
    }

    #[test]
    fn unit_create_takes_speech_and_explanation() {
        let mut store = store();
        let s = subject(&mut store, "S");
        let t = child(&mut store, Level::Training, &s, "T");
        let p = child(&mut store, Level::Topic, &t, "P");
        let draft = ItemPatch {
            speech_texts: Some(vec![SpeechText::new("Hi")]),
            explanation_text: Some("**bold**".into()),
            ..ItemPatch::named("U").with_parent(&p)
        };
        let item = store.create(Level::Unit, draft).unwrap();
        let unit = item.as_unit().unwrap();
        assert_eq!(unit.topic_id, p);
        assert_eq!(unit.speech_texts.len(), 1);
        assert_eq!(unit.explanation_text, "**bold**");
    }

    #[test]
    fn status_patch_touches_only_status_and_timestamp() {
        let mut store = store();
        let draft = ItemPatch {
            description: Some("desc".into()),
            urls: Some(vec!["https://a".into()]),
            ..ItemPatch::named("S")
        };
        let before = store.create(Level::Subject, draft).unwrap();
        let after = store
            .set_status(Level::Subject, before.id(), Status::Ready)
            .unwrap();

        let mut expected = before.fields().clone();
        expected.status = Status::Ready;
        expected.updated_at = after.fields().updated_at;
        assert_eq!(after.fields(), &expected);
        assert!(after.fields().updated_at >= before.fields().updated_at);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = store();
        let err = store
            .update(Level::Topic, "nope", ItemPatch::named("x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { level: Level::Topic, .. }));
    }

    #[test]
    fn update_rejects_dangling_parent_change() {
        let mut store = store();
        let s = subject(&mut store, "S");
        let t = child(&mut store, Level::Training, &s, "T");
        let err = store
            .update(Level::Training, &t, ItemPatch::default().with_parent("ghost"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidParentReference { .. }));

        let s2 = subject(&mut store, "S2");
        let moved = store
            .update(Level::Training, &t, ItemPatch::default().with_parent(&s2))
            .unwrap();
        assert_eq!(moved.parent_id(), Some(s2.as_str()));
    }

    #[test]
    fn delete_cascades_and_reports() {
        let mut store = store();
        let s1 = subject(&mut store, "S1");
        let s2 = subject(&mut store, "S2");
        let t1 = child(&mut store, Level::Training, &s1, "T1");
        let t2 = child(&mut store, Level::Training, &s2, "T2");
        let p1 = child(&mut store, Level::Topic, &t1, "P1");
        child(&mut store, Level::Unit, &p1, "U1");
        child(&mut store, Level::Unit, &p1, "U2");

        let report = store.delete(Level::Subject, &s1).unwrap();
        assert_eq!(
            report,
            DeleteReport {
                subjects: 1,
                trainings: 1,
                topics: 1,
                units: 2
            }
        );
        assert_eq!(store.graph().subjects.len(), 1);
        assert_eq!(store.graph().trainings[0].fields.id, t2);
        assert!(store.graph().units.is_empty());
        assert!(matches!(
            store.delete(Level::Subject, &s1),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn children_of_keeps_insertion_order() {
        let mut store = store();
        let s1 = subject(&mut store, "S1");
        let s2 = subject(&mut store, "S2");
        let a = child(&mut store, Level::Training, &s1, "A");
        child(&mut store, Level::Training, &s2, "B");
        let c = child(&mut store, Level::Training, &s1, "C");

        let ids: Vec<String> = store
            .children_of(Level::Training, &s1)
            .iter()
            .map(|item| item.id().to_string())
            .collect();
        assert_eq!(ids, [a, c]);
    }

    #[test]
    fn comments_append_with_rating() {
        let mut store = store();
        let s = subject(&mut store, "S");
        let comment = store
            .add_comment(
                Level::Subject,
                &s,
                NewComment {
                    text: "Looks good".into(),
                    author: "Demo User".into(),
                    rating: Rating::new(4).unwrap(),
                },
            )
            .unwrap();
        let item = store.get(Level::Subject, &s).unwrap();
        assert_eq!(item.fields().comments, vec![comment]);
    }

    #[test]
    fn speech_edit_on_missing_unit_fails() {
        let mut store = store();
        let err = store
            .edit_speech("nope", SpeechEdit::Push(SpeechText::new("x")))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { level: Level::Unit, .. }));
    }

    #[test]
    fn user_lifecycle() {
        let mut store = store();
        let user = store
            .add_user(NewUser {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                role: Role::Author,
            })
            .unwrap();
        assert_eq!(store.users().len(), 3);
        assert_eq!(store.user_by_email("ADA@example.com").unwrap().id, user.id);

        let updated = store
            .update_user(
                &user.id,
                UserPatch {
                    role: Some(Role::Admin),
                    ..UserPatch::default()
                },
            )
            .unwrap();
        assert!(updated.is_admin());

        store.remove_user(&user.id).unwrap();
        assert!(store.find_user(&user.id).is_none());
        assert!(matches!(
            store.remove_user(&user.id),
            Err(StoreError::UserNotFound(_))
        ));
    }

    #[test]
    fn open_persists_each_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(persist::STORE_FILE);
        let mut store = Store::open(&path);
        let s = subject(&mut store, "Saved");

        let reopened = Store::open(&path);
        assert_eq!(reopened.get(Level::Subject, &s).unwrap().name(), "Saved");
        assert_eq!(reopened.graph(), store.graph());
    }
}
