//! The state container and the mutations that change it.
//!
//! # Design
//! Mutations are values. `ResourceState::commit` is the only place the state
//! changes, and it is a plain synchronous match over `Mutation`, so every
//! transition can be tested without any I/O.

use std::fmt;

use serde_json::Value;

use crate::error::ApiError;
use crate::types::Item;

/// What the state's `error` field holds after a failed action.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredError {
    /// The body the server answered with.
    Payload(Value),
    /// The error itself, when there was no response body to keep.
    Raw(ApiError),
}

impl From<ApiError> for StoredError {
    fn from(err: ApiError) -> Self {
        match err.response_payload() {
            Some(payload) => StoredError::Payload(payload),
            None => StoredError::Raw(err),
        }
    }
}

/// Name of a mutation, as it appears in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    All,
    Get,
    Create,
    Update,
    Destroy,
    Error,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::All => "ALL",
            MutationKind::Get => "GET",
            MutationKind::Create => "CREATE",
            MutationKind::Update => "UPDATE",
            MutationKind::Destroy => "DESTROY",
            MutationKind::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A state transition together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    All(Vec<Item>),
    Get(Item),
    Create(Item),
    Update(Item),
    Destroy(Item),
    Error(StoredError),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::All(_) => MutationKind::All,
            Mutation::Get(_) => MutationKind::Get,
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Update(_) => MutationKind::Update,
            Mutation::Destroy(_) => MutationKind::Destroy,
            Mutation::Error(_) => MutationKind::Error,
        }
    }
}

/// Client-side mirror of one resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceState {
    /// Items in the order the server last returned them.
    pub all: Vec<Item>,
    /// The item most recently fetched, created or updated.
    pub current: Option<Item>,
    /// The most recent failure; cleared by every successful mutation.
    pub error: Option<StoredError>,
}

impl ResourceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commit(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::All(items) => {
                self.error = None;
                self.all = items;
            }
            Mutation::Get(item) | Mutation::Update(item) => {
                self.error = None;
                replace_or_remove(&mut self.all, &item, false);
                self.current = Some(item);
            }
            Mutation::Create(item) => {
                self.error = None;
                if self.all.iter().any(|existing| existing.same_id(&item)) {
                    replace_or_remove(&mut self.all, &item, false);
                } else {
                    self.all.push(item.clone());
                }
                self.current = Some(item);
            }
            Mutation::Destroy(item) => {
                self.error = None;
                self.current = None;
                replace_or_remove(&mut self.all, &item, true);
            }
            Mutation::Error(err) => {
                self.error = Some(err);
            }
        }
    }

    /// Look up an item in `all` by id.
    pub fn find(&self, id: &Value) -> Option<&Item> {
        self.all.iter().find(|item| item.id() == Some(id))
    }
}

/// Overwrite or remove the first entry of `all` sharing `item`'s id.
///
/// Does nothing when no entry matches. Returns whether one did.
pub fn replace_or_remove(all: &mut Vec<Item>, item: &Item, remove: bool) -> bool {
    let Some(index) = all.iter().position(|existing| existing.same_id(item)) else {
        return false;
    };
    if remove {
        all.remove(index);
    } else {
        all[index] = item.clone();
    }
    true
}
