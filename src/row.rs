use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Row payload as stored in a [`Frame`](crate::Frame).
///
/// Frames never hand out mutable access to stored rows. Updating a row means
/// cloning it (or `Rc::make_mut`) and putting it back.
pub type SharedRow = Rc<Row>;

/// Mapping from column name to [`Value`].
///
/// Columns are kept sorted by name; insertion order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    /// Creates a row without columns.
    pub fn new() -> Self {
        Self {
            columns: BTreeMap::new(),
        }
    }

    /// Adds a column and returns the row for chaining.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets `column` to `value`, returning the value it replaced.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut Value> {
        self.columns.get_mut(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column names in ascending order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterates `(column, value)` pairs in ascending column order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.columns.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (column, value)) in self.columns.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", column, value)?;
        }
        f.write_str("}")
    }
}

/// Builds a [`Row`] from `column => value` pairs.
///
/// ```
/// use rowframe::{row, Value};
///
/// let row = row! { "id" => 1, "name" => "alpha" };
/// assert_eq!(row.get("name"), Some(&Value::Str("alpha".into())));
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::Row::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {
        $crate::Row::new()$(.with($column, $value))+
    };
}
