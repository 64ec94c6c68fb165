//! Notes and the action items extracted from them.
//!
//! The server only talks to [`NoteStore`], so a durable backend can replace
//! [`InMemoryStore`] without touching the routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: i64,
    pub text: String,
    pub note_id: Option<i64>,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait NoteStore: Send + Sync {
    fn insert_note(&self, content: &str) -> Note;
    fn get_note(&self, id: i64) -> StoreResult<Note>;
    /// All notes, newest first
    fn list_notes(&self) -> Vec<Note>;
    /// Remove a note together with its action items
    fn delete_note(&self, id: i64) -> StoreResult<()>;

    fn insert_action_items(&self, items: &[String], note_id: Option<i64>) -> Vec<ActionItem>;
    fn list_action_items(&self, note_id: Option<i64>) -> Vec<ActionItem>;
    fn get_action_item(&self, id: i64) -> StoreResult<ActionItem>;
    fn mark_done(&self, id: i64, done: bool) -> StoreResult<ActionItem>;
}

#[derive(Default)]
struct Tables {
    notes: BTreeMap<i64, Note>,
    action_items: BTreeMap<i64, ActionItem>,
    last_note_id: i64,
    last_item_id: i64,
}

/// Mutex-guarded store; ids start at 1 and are never reused
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        // a panic while holding the lock cannot leave the maps half-written
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NoteStore for InMemoryStore {
    fn insert_note(&self, content: &str) -> Note {
        let mut tables = self.tables();
        tables.last_note_id += 1;
        let note = Note {
            id: tables.last_note_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        tables.notes.insert(note.id, note.clone());
        note
    }

    fn get_note(&self, id: i64) -> StoreResult<Note> {
        self.tables()
            .notes
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { kind: "Note", id })
    }

    fn list_notes(&self) -> Vec<Note> {
        self.tables().notes.values().rev().cloned().collect()
    }

    fn delete_note(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables();
        if tables.notes.remove(&id).is_none() {
            return Err(StoreError::NotFound { kind: "Note", id });
        }
        tables
            .action_items
            .retain(|_, item| item.note_id != Some(id));
        Ok(())
    }

    fn insert_action_items(&self, items: &[String], note_id: Option<i64>) -> Vec<ActionItem> {
        let mut tables = self.tables();
        let created_at = Utc::now();
        items
            .iter()
            .map(|text| {
                tables.last_item_id += 1;
                let item = ActionItem {
                    id: tables.last_item_id,
                    text: text.clone(),
                    note_id,
                    done: false,
                    created_at,
                };
                tables.action_items.insert(item.id, item.clone());
                item
            })
            .collect()
    }

    fn list_action_items(&self, note_id: Option<i64>) -> Vec<ActionItem> {
        self.tables()
            .action_items
            .values()
            .filter(|item| note_id.is_none() || item.note_id == note_id)
            .cloned()
            .collect()
    }

    fn get_action_item(&self, id: i64) -> StoreResult<ActionItem> {
        self.tables()
            .action_items
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                kind: "Action item",
                id,
            })
    }

    fn mark_done(&self, id: i64, done: bool) -> StoreResult<ActionItem> {
        let mut tables = self.tables();
        let item = tables
            .action_items
            .get_mut(&id)
            .ok_or(StoreError::NotFound {
                kind: "Action item",
                id,
            })?;
        item.done = done;
        Ok(item.clone())
    }
}
