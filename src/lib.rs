//! In-memory row store ordered by composite keys.
//!
//! This crate provides:
//! - [`Frame`]: rows of named [`Value`]s kept in ascending [`Key`] order, with
//!   point lookups, range scans, bulk removal and re-indexing.
//! - [`Indexer`] and [`ColumnIndexer`]: derive a row's key from a fixed list
//!   of columns while rejecting per-column type drift.
//! - [`Frame::joined`] and [`Frame::group_by`]: outer join and grouping, both
//!   producing new frames that can be joined or grouped again.
//!
//! Frames and indexers are single-threaded: they hold `Rc` and `RefCell`
//! internally and are neither `Send` nor `Sync`.

pub mod error;
pub mod frame;
pub mod group;
pub mod indexer;
pub mod join;
pub mod key;
pub mod row;
pub mod tree;
pub mod value;

pub use error::{FrameError, FrameResult};
pub use frame::{greater_or_equal, less_than, Bounds, Frame};
pub use group::{Group, GroupIndexer, GROUP_COLUMN};
pub use indexer::{ColumnIndexer, Indexer};
pub use join::{JoinResult, JoinResultIndexer};
pub use key::{Key, KeyError, KeyResult};
pub use row::{Row, SharedRow};
pub use tree::{KeyTree, KeyTreeIter};
pub use value::{Value, ValueKind};
