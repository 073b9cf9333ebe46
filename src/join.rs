use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::error::{FrameError, FrameResult};
use crate::frame::Frame;
use crate::indexer::Indexer;
use crate::key::Key;
use crate::row::Row;
use crate::value::Value;

/// One column of an outer join: the left and right contents for a key.
///
/// A side is `None` when its frame had no row for the key, or its row had no
/// such column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinResult {
    pub left: Option<Value>,
    pub right: Option<Value>,
}

impl JoinResult {
    pub fn left(value: Value) -> Self {
        Self {
            left: Some(value),
            right: None,
        }
    }

    pub fn right(value: Value) -> Self {
        Self {
            left: None,
            right: Some(value),
        }
    }

    pub fn both(left: Value, right: Value) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// Returns the left contents if present, otherwise the right ones.
    pub fn either(&self) -> Option<&Value> {
        self.left.as_ref().or(self.right.as_ref())
    }
}

impl fmt::Display for JoinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => write!(f, "JoinResult{{Left: {}, Right: {}}}", left, right),
            (Some(left), None) => write!(f, "JoinResult{{Left: {}}}", left),
            (None, Some(right)) => write!(f, "JoinResult{{Right: {}}}", right),
            (None, None) => f.write_str("JoinResult{}"),
        }
    }
}

/// Keys joined rows with the indexer of the left frame.
///
/// Each [`JoinResult`] column is projected to its left contents when present
/// and its right contents otherwise; plain values pass through unchanged, so
/// ordinary rows work as probes against a joined frame.
#[derive(Debug, Clone)]
pub struct JoinResultIndexer {
    inner: Rc<dyn Indexer>,
}

impl JoinResultIndexer {
    pub fn new(inner: Rc<dyn Indexer>) -> Self {
        Self { inner }
    }
}

impl Indexer for JoinResultIndexer {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        let projection: Row = row
            .iter()
            .map(|(column, value)| {
                let projected = match value {
                    Value::Join(pair) => pair.either().cloned().unwrap_or(Value::Null),
                    other => other.clone(),
                };
                (column.as_str(), projected)
            })
            .collect();
        self.inner.index(&projection)
    }
}

impl Frame {
    /// Outer-joins this frame (left) with `right`.
    ///
    /// The result holds one row per key present in either frame; every column
    /// is a [`Value::Join`]. The result is keyed by a [`JoinResultIndexer`]
    /// over this frame's indexer, so both input frames must use compatible
    /// keys.
    pub fn joined(&self, right: &Frame) -> FrameResult<Frame> {
        let mut result = Frame::new(JoinResultIndexer::new(self.indexer()));

        for (_, row) in self {
            let projected: Row = row
                .iter()
                .map(|(column, value)| (column.as_str(), JoinResult::left(value.clone())))
                .collect();
            result.put(projected)?;
        }

        let mut matched = 0usize;
        for (_, row) in right {
            let mut projected = match result.get(row)? {
                Some(existing) => {
                    matched += 1;
                    Row::clone(&existing)
                }
                None => Row::new(),
            };
            for (column, value) in row.iter() {
                match projected.get_mut(column) {
                    Some(Value::Join(pair)) => pair.right = Some(value.clone()),
                    Some(other) => return Err(FrameError::structural_join(column.as_str(), other.kind())),
                    None => {
                        projected.insert(column.as_str(), JoinResult::right(value.clone()));
                    }
                }
            }
            result.put(projected)?;
        }

        debug!(
            left = self.len(),
            right = right.len(),
            matched,
            rows = result.len(),
            "joined frames"
        );
        Ok(result)
    }
}
