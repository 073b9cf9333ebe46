use std::ops::ControlFlow;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::{FrameError, FrameResult};
use crate::indexer::Indexer;
use crate::key::Key;
use crate::row::{Row, SharedRow};
use crate::tree::{KeyTree, KeyTreeIter};

/// Rows ordered by the [`Key`] their [`Indexer`] computes.
///
/// Rows are stored as [`SharedRow`]s. Frames derived through
/// [`Frame::with_indexer`] hold the same `Rc`s as their source, but entries
/// added to or removed from one frame never show up in the other.
#[derive(Debug)]
pub struct Frame {
    tree: KeyTree<SharedRow>,
    indexer: Rc<dyn Indexer>,
}

/// Optional lower (inclusive) and upper (exclusive) probes for range scans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    greater_or_equal: Option<Row>,
    less_than: Option<Row>,
}

impl Bounds {
    /// Bounds covering the whole frame.
    pub fn all() -> Self {
        Self::default()
    }

    /// Keeps rows whose key is greater than or equal to the key of `probe`.
    pub fn greater_or_equal(mut self, probe: Row) -> Self {
        self.greater_or_equal = Some(probe);
        self
    }

    /// Keeps rows whose key is less than the key of `probe`.
    pub fn less_than(mut self, probe: Row) -> Self {
        self.less_than = Some(probe);
        self
    }
}

/// Shorthand for `Bounds::all().greater_or_equal(probe)`.
pub fn greater_or_equal(probe: Row) -> Bounds {
    Bounds::all().greater_or_equal(probe)
}

/// Shorthand for `Bounds::all().less_than(probe)`.
pub fn less_than(probe: Row) -> Bounds {
    Bounds::all().less_than(probe)
}

impl Frame {
    /// Creates an empty frame keyed by `indexer`.
    pub fn new<I: Indexer + 'static>(indexer: I) -> Self {
        Self::from_shared(Rc::new(indexer))
    }

    /// Creates an empty frame keyed by an indexer shared with other frames.
    pub fn from_shared(indexer: Rc<dyn Indexer>) -> Self {
        Self {
            tree: KeyTree::new(),
            indexer,
        }
    }

    /// Returns the frame's indexer.
    pub fn indexer(&self) -> Rc<dyn Indexer> {
        Rc::clone(&self.indexer)
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` when the frame holds no rows.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Iterates `(key, row)` pairs in ascending key order.
    pub fn iter(&self) -> KeyTreeIter<'_, SharedRow> {
        self.tree.iter()
    }

    /// Computes the key `row` would be stored under.
    pub fn key_of(&self, row: &Row) -> FrameResult<Key> {
        self.indexer.index(row)
    }

    /// Inserts `row`, returning the row previously stored under its key.
    pub fn put(&mut self, row: Row) -> FrameResult<Option<SharedRow>> {
        self.put_shared(Rc::new(row))
    }

    /// Inserts an already shared row without copying it.
    pub fn put_shared(&mut self, row: SharedRow) -> FrameResult<Option<SharedRow>> {
        let key = self.indexer.index(&row)?;
        let previous = self.tree.insert(key, row)?;
        if previous.is_some() {
            trace!("put replaced an existing row");
        }
        Ok(previous)
    }

    /// Returns the row stored under the key of `probe`.
    pub fn get(&self, probe: &Row) -> FrameResult<Option<SharedRow>> {
        let key = self.indexer.index(probe)?;
        Ok(self.tree.get(&key)?.cloned())
    }

    /// Removes and returns the row stored under the key of `probe`.
    pub fn pop(&mut self, probe: &Row) -> FrameResult<Option<SharedRow>> {
        let key = self.indexer.index(probe)?;
        Ok(self.tree.remove(&key)?)
    }

    /// Returns the row stored under an already computed key.
    pub fn get_by_key(&self, key: &Key) -> FrameResult<Option<SharedRow>> {
        Ok(self.tree.get(key)?.cloned())
    }

    pub(crate) fn get_by_key_mut(&mut self, key: &Key) -> FrameResult<Option<&mut SharedRow>> {
        Ok(self.tree.get_mut(key)?)
    }

    /// Stores `row` under `key` without consulting the indexer. Callers must
    /// pass the key the indexer would compute for `row`.
    pub(crate) fn insert_by_key(&mut self, key: Key, row: SharedRow) -> FrameResult<Option<SharedRow>> {
        Ok(self.tree.insert(key, row)?)
    }

    /// Applies `action` to every row within `bounds`, in ascending order,
    /// collecting the values it continues with.
    ///
    /// `ControlFlow::Break` ends the scan early and keeps what was collected.
    /// An error aborts the scan and is returned as is.
    pub fn for_range<T, E, F>(&self, bounds: &Bounds, mut action: F) -> Result<Vec<T>, E>
    where
        E: From<FrameError>,
        F: FnMut(&SharedRow) -> Result<ControlFlow<(), T>, E>,
    {
        let (start, end) = self.select(bounds)?;
        let mut results = Vec::with_capacity(end - start);
        for (_, row) in self.tree.iter_from(start).take(end - start) {
            match action(row)? {
                ControlFlow::Continue(value) => results.push(value),
                ControlFlow::Break(()) => break,
            }
        }
        Ok(results)
    }

    /// Returns the rows within `bounds` in ascending order.
    pub fn range(&self, bounds: &Bounds) -> FrameResult<Vec<SharedRow>> {
        self.for_range(bounds, |row| Ok(ControlFlow::Continue(Rc::clone(row))))
    }

    /// Removes and returns the rows within `bounds`.
    pub fn pop_range(&mut self, bounds: &Bounds) -> FrameResult<Vec<SharedRow>> {
        self.pop_range_with(bounds, |row| Ok(ControlFlow::Continue(Rc::clone(row))))
    }

    /// Like [`Frame::for_range`], additionally removing every row `action`
    /// accepted.
    ///
    /// Rows are selected during the scan and deleted once it ends. When the
    /// action stops or fails, the rows accepted before that point are still
    /// deleted; the rest of the range stays in the frame.
    pub fn pop_range_with<T, E, F>(&mut self, bounds: &Bounds, mut action: F) -> Result<Vec<T>, E>
    where
        E: From<FrameError>,
        F: FnMut(&SharedRow) -> Result<ControlFlow<(), T>, E>,
    {
        let (start, end) = self.select(bounds)?;
        let mut results = Vec::with_capacity(end - start);
        let mut outcome = Ok(());
        for (_, row) in self.tree.iter_from(start).take(end - start) {
            match action(row) {
                Ok(ControlFlow::Continue(value)) => results.push(value),
                Ok(ControlFlow::Break(())) => break,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }

        // Accepted rows are contiguous from `start`.
        let selected = results.len();
        for _ in 0..selected {
            self.tree.remove_at(start);
        }
        debug!(removed = selected, remaining = self.tree.len(), "pop_range");
        outcome.map(|()| results)
    }

    /// Returns a frame holding the same rows keyed by `indexer`.
    ///
    /// Rows are re-inserted in this frame's ascending order. `indexer` should
    /// give every row a distinct key; when two rows collide the later one
    /// replaces the earlier, which callers should not rely on.
    pub fn with_indexer<I: Indexer + 'static>(&self, indexer: I) -> FrameResult<Frame> {
        self.with_shared_indexer(Rc::new(indexer))
    }

    /// Like [`Frame::with_indexer`] for an indexer shared with other frames.
    pub fn with_shared_indexer(&self, indexer: Rc<dyn Indexer>) -> FrameResult<Frame> {
        let mut frame = Frame::from_shared(indexer);
        let mut collisions = 0usize;
        for (_, row) in self.tree.iter() {
            if frame.put_shared(Rc::clone(row))?.is_some() {
                collisions += 1;
            }
        }
        if collisions > 0 {
            debug!(collisions, rows = frame.len(), "with_indexer dropped colliding rows");
        }
        Ok(frame)
    }

    /// Resolves `bounds` into the half-open rank range `[start, end)`.
    fn select(&self, bounds: &Bounds) -> FrameResult<(usize, usize)> {
        let start = match &bounds.greater_or_equal {
            Some(probe) => self.tree.lower_bound(&self.indexer.index(probe)?)?,
            None => 0,
        };
        let end = match &bounds.less_than {
            Some(probe) => self.tree.lower_bound(&self.indexer.index(probe)?)?,
            None => self.tree.len(),
        };
        Ok((start, end.max(start)))
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = (&'a Key, &'a SharedRow);
    type IntoIter = KeyTreeIter<'a, SharedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
