use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{FrameError, FrameResult};
use crate::key::Key;
use crate::row::Row;
use crate::value::{Value, ValueKind};

/// Computes the [`Key`] a row is stored under.
///
/// The same indexer is used for stored rows and for lookup probes, so a probe
/// only needs the columns the indexer reads.
pub trait Indexer: fmt::Debug {
    /// Returns the key for `row`.
    fn index(&self, row: &Row) -> FrameResult<Key>;
}

impl<I: Indexer + ?Sized> Indexer for Rc<I> {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        (**self).index(row)
    }
}

impl<I: Indexer + ?Sized> Indexer for Box<I> {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        (**self).index(row)
    }
}

/// Indexes rows by a fixed, ordered list of columns.
///
/// The first non-null value seen for a column fixes its [`ValueKind`] for
/// the lifetime of the indexer; rows presenting another kind for that column
/// fail with [`FrameError::TypeDrift`]. The kind memory sits in a `RefCell`,
/// so an indexer cannot be shared across threads.
#[derive(Debug, Default)]
pub struct ColumnIndexer {
    columns: Vec<String>,
    kinds: RefCell<HashMap<String, ValueKind>>,
}

impl ColumnIndexer {
    /// Creates an indexer over `columns`, compared in the given order.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            kinds: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the indexed column names in comparison order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the kind fixed for `column`, if a value has been indexed yet.
    pub fn kind_of(&self, column: &str) -> Option<ValueKind> {
        self.kinds.borrow().get(column).copied()
    }
}

impl Indexer for ColumnIndexer {
    fn index(&self, row: &Row) -> FrameResult<Key> {
        let mut values: Vec<&Value> = Vec::with_capacity(self.columns.len());
        let mut observed: Vec<(&str, ValueKind)> = Vec::new();
        {
            let kinds = self.kinds.borrow();
            for column in &self.columns {
                let value = row
                    .get(column)
                    .ok_or_else(|| FrameError::missing_column(column.as_str()))?;
                if !value.is_null() {
                    let found = value.kind();
                    match kinds.get(column.as_str()) {
                        Some(&expected) if expected != found => {
                            return Err(FrameError::type_drift(column.as_str(), expected, found));
                        }
                        Some(_) => {}
                        None => observed.push((column.as_str(), found)),
                    }
                }
                values.push(value);
            }
        }
        let key = Key::from_values(&values)?;

        if !observed.is_empty() {
            let mut kinds = self.kinds.borrow_mut();
            for (column, kind) in observed {
                kinds.entry(column.to_string()).or_insert(kind);
            }
        }
        Ok(key)
    }
}
