//! Grouping of frame rows by a derived key.
//!
//! A grouped frame stores one row per distinct key. That row has the single
//! column [`GROUP_COLUMN`], holding a [`Group`] of the source rows sharing the
//! key in ascending source order.

use std::rc::Rc;
use std::slice;

use tracing::debug;

use crate::error::FrameResult;
use crate::frame::Frame;
use crate::indexer::Indexer;
use crate::key::Key;
use crate::row::{Row, SharedRow};
use crate::value::Value;

/// Column under which a grouped frame stores its [`Group`].
pub const GROUP_COLUMN: &str = "Group";

/// Ordered list of rows sharing a grouping key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    rows: Vec<SharedRow>,
}

impl Group {
    pub fn new(rows: impl IntoIterator<Item = SharedRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn push(&mut self, row: SharedRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SharedRow] {
        &self.rows
    }

    pub fn iter(&self) -> slice::Iter<'_, SharedRow> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a SharedRow;
    type IntoIter = slice::Iter<'a, SharedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Keys grouped rows with the grouping indexer.
///
/// A row carrying a non-empty [`Group`] is keyed by its first member; any
/// other row is treated as a probe and indexed directly.
#[derive(Debug, Clone)]
pub struct GroupIndexer {
    inner: Rc<dyn Indexer>,
}

impl GroupIndexer {
    pub fn new(inner: Rc<dyn Indexer>) -> Self {
        Self { inner }
    }
}

impl Indexer for GroupIndexer {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        match row.get(GROUP_COLUMN).and_then(Value::as_group) {
            Some(group) => match group.rows().first() {
                Some(first) => self.inner.index(first),
                None => self.inner.index(row),
            },
            None => self.inner.index(row),
        }
    }
}

impl Frame {
    /// Groups rows by the key `indexer` computes for them.
    pub fn group_by<I: Indexer + 'static>(&self, indexer: I) -> FrameResult<Frame> {
        let indexer: Rc<dyn Indexer> = Rc::new(indexer);
        let mut grouped = Frame::new(GroupIndexer::new(Rc::clone(&indexer)));

        for (_, row) in self {
            let key = indexer.index(row)?;
            append_to_group(&mut grouped, key, Rc::clone(row))?;
        }

        debug!(rows = self.len(), groups = grouped.len(), "grouped frame");
        Ok(grouped)
    }
}

fn append_to_group(grouped: &mut Frame, key: Key, row: SharedRow) -> FrameResult<()> {
    match grouped.get_by_key_mut(&key)? {
        Some(existing) => {
            // The grouped frame holds the only reference, so this never copies.
            let stored = Rc::make_mut(existing);
            match stored.get_mut(GROUP_COLUMN) {
                Some(Value::Group(group)) => group.push(row),
                _ => {
                    stored.insert(GROUP_COLUMN, Group::new([row]));
                }
            }
        }
        None => {
            let stored = Row::new().with(GROUP_COLUMN, Group::new([row]));
            grouped.insert_by_key(key, Rc::new(stored))?;
        }
    }
    Ok(())
}
