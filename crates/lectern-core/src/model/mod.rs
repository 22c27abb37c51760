//! Typed records for the four hierarchy levels, users, and the graph that
//! holds them.

pub mod graph;
pub mod item;
pub mod user;

pub use graph::{Graph, ItemMut, Node, Subtree};
pub use item::{
    Comment, Item, ItemFields, ItemPatch, Level, NewComment, ParseEnumError, Rating, Record,
    SpeechEdit, SpeechText, Status, Subject, Topic, Training, Unit,
};
pub use user::{NewUser, Role, User, UserPatch};
