use std::cmp::Ordering;
use std::fmt;

use crate::key::{Key, KeyResult};

/// Balanced binary tree of `(Key, V)` entries kept in ascending key order.
///
/// Nodes track subtree sizes and heights, so besides key lookups the tree
/// supports `O(log n)` access by rank. Every key comparison of a mutation
/// happens while locating the rank, before the structure is touched; a
/// failed comparison therefore leaves the tree unchanged.
pub struct KeyTree<V> {
    root: Option<Box<Node<V>>>,
}

impl<V> Default for KeyTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyTree<V> {
    /// Creates an empty [`KeyTree`].
    pub fn new() -> Self {
        Self { root: None }
    }

    /// Returns the number of entries stored in the tree.
    pub fn len(&self) -> usize {
        size(&self.root)
    }

    /// Returns `true` when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Locates `key`: `Ok(rank)` when present, `Err(rank)` with the insertion
    /// rank otherwise.
    pub fn search(&self, key: &Key) -> KeyResult<Result<usize, usize>> {
        let mut node = self.root.as_deref();
        let mut base = 0;
        while let Some(current) = node {
            let left_size = size(&current.left);
            match key.compare(&current.key)? {
                Ordering::Less => node = current.left.as_deref(),
                Ordering::Equal => return Ok(Ok(base + left_size)),
                Ordering::Greater => {
                    base += left_size + 1;
                    node = current.right.as_deref();
                }
            }
        }
        Ok(Err(base))
    }

    /// Returns the rank of the first entry whose key is not less than `key`.
    pub fn lower_bound(&self, key: &Key) -> KeyResult<usize> {
        Ok(self.search(key)?.unwrap_or_else(|rank| rank))
    }

    /// Borrows the value stored under `key`.
    pub fn get(&self, key: &Key) -> KeyResult<Option<&V>> {
        Ok(match self.search(key)? {
            Ok(rank) => self.get_at(rank).map(|(_, value)| value),
            Err(_) => None,
        })
    }

    /// Mutably borrows the value stored under `key`.
    pub fn get_mut(&mut self, key: &Key) -> KeyResult<Option<&mut V>> {
        Ok(match self.search(key)? {
            Ok(rank) => Self::get_node_mut(&mut self.root, rank).map(|node| &mut node.value),
            Err(_) => None,
        })
    }

    /// Borrows the entry at `rank`.
    pub fn get_at(&self, rank: usize) -> Option<(&Key, &V)> {
        Self::get_node_ref(&self.root, rank).map(|node| (&node.key, &node.value))
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: Key, value: V) -> KeyResult<Option<V>> {
        match self.search(&key)? {
            Ok(rank) => Ok(Self::get_node_mut(&mut self.root, rank)
                .map(|node| std::mem::replace(&mut node.value, value))),
            Err(rank) => {
                self.root = Some(Self::insert_node(self.root.take(), rank, key, value));
                Ok(None)
            }
        }
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &Key) -> KeyResult<Option<V>> {
        Ok(match self.search(key)? {
            Ok(rank) => self.remove_at(rank).map(|(_, value)| value),
            Err(_) => None,
        })
    }

    /// Removes and returns the entry at `rank`.
    pub fn remove_at(&mut self, rank: usize) -> Option<(Key, V)> {
        if rank >= self.len() {
            return None;
        }
        let mut removed = None;
        self.root = Self::delete_node(self.root.take(), rank, &mut removed);
        removed
    }

    /// Iterates entries in ascending key order.
    pub fn iter(&self) -> KeyTreeIter<'_, V> {
        self.iter_from(0)
    }

    /// Iterates entries in ascending key order, starting at `rank`.
    pub fn iter_from(&self, rank: usize) -> KeyTreeIter<'_, V> {
        KeyTreeIter::seek(&self.root, rank)
    }
}

impl<V: fmt::Debug> fmt::Debug for KeyTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

fn size<V>(node: &Option<Box<Node<V>>>) -> usize {
    node.as_ref().map_or(0, |n| n.size)
}

impl<V> KeyTree<V> {
    fn get_node_ref(node: &Option<Box<Node<V>>>, rank: usize) -> Option<&Node<V>> {
        let node = node.as_ref()?;
        let left_size = size(&node.left);
        match rank.cmp(&left_size) {
            Ordering::Less => Self::get_node_ref(&node.left, rank),
            Ordering::Equal => Some(&**node),
            Ordering::Greater => Self::get_node_ref(&node.right, rank - left_size - 1),
        }
    }

    fn get_node_mut(node: &mut Option<Box<Node<V>>>, rank: usize) -> Option<&mut Node<V>> {
        let node = node.as_mut()?;
        let left_size = size(&node.left);
        match rank.cmp(&left_size) {
            Ordering::Less => Self::get_node_mut(&mut node.left, rank),
            Ordering::Equal => Some(&mut **node),
            Ordering::Greater => Self::get_node_mut(&mut node.right, rank - left_size - 1),
        }
    }

    fn insert_node(node: Option<Box<Node<V>>>, rank: usize, key: Key, value: V) -> Box<Node<V>> {
        let mut node = match node {
            Some(node) => node,
            None => return Box::new(Node::new(key, value)),
        };
        let left_size = size(&node.left);
        if rank <= left_size {
            node.left = Some(Self::insert_node(node.left.take(), rank, key, value));
        } else {
            node.right = Some(Self::insert_node(
                node.right.take(),
                rank - left_size - 1,
                key,
                value,
            ));
        }
        Self::balance(node)
    }

    fn delete_node(
        node: Option<Box<Node<V>>>,
        rank: usize,
        removed: &mut Option<(Key, V)>,
    ) -> Option<Box<Node<V>>> {
        let mut node = node?;
        let left_size = size(&node.left);
        if rank < left_size {
            node.left = Self::delete_node(node.left.take(), rank, removed);
        } else if rank > left_size {
            node.right = Self::delete_node(node.right.take(), rank - left_size - 1, removed);
        } else {
            let Node {
                key,
                value,
                left,
                right,
                ..
            } = *node;
            *removed = Some((key, value));
            let right = match (left.is_some(), right) {
                (_, None) => return left,
                (false, right) => return right,
                (true, Some(right)) => right,
            };
            let (mut successor, new_right) = Self::take_min(right);
            successor.left = left;
            successor.right = new_right;
            return Some(Self::balance(successor));
        }
        Some(Self::balance(node))
    }

    /// Detaches the leftmost node of `node`, returning it together with the
    /// rebalanced remainder.
    fn take_min(mut node: Box<Node<V>>) -> (Box<Node<V>>, Option<Box<Node<V>>>) {
        match node.left.take() {
            None => {
                let rest = node.right.take();
                (node, rest)
            }
            Some(left) => {
                let (min, new_left) = Self::take_min(left);
                node.left = new_left;
                (min, Some(Self::balance(node)))
            }
        }
    }

    fn rotate_left(mut node: Box<Node<V>>) -> Box<Node<V>> {
        let mut right = match node.right.take() {
            Some(right) => right,
            None => return node,
        };
        node.right = right.left.take();
        node.update();
        right.left = Some(node);
        right.update();
        right
    }

    fn rotate_right(mut node: Box<Node<V>>) -> Box<Node<V>> {
        let mut left = match node.left.take() {
            Some(left) => left,
            None => return node,
        };
        node.left = left.right.take();
        node.update();
        left.right = Some(node);
        left.update();
        left
    }

    fn balance(mut node: Box<Node<V>>) -> Box<Node<V>> {
        node.update();
        let balance = node.balance_factor();
        if balance > 1 {
            if node.left.as_ref().map_or(0, |l| l.balance_factor()) < 0 {
                node.left = node.left.take().map(Self::rotate_left);
            }
            return Self::rotate_right(node);
        }
        if balance < -1 {
            if node.right.as_ref().map_or(0, |r| r.balance_factor()) > 0 {
                node.right = node.right.take().map(Self::rotate_right);
            }
            return Self::rotate_left(node);
        }
        node
    }
}

struct Node<V> {
    key: Key,
    value: V,
    height: usize,
    size: usize,
    left: Option<Box<Node<V>>>,
    right: Option<Box<Node<V>>>,
}

impl<V> Node<V> {
    fn new(key: Key, value: V) -> Self {
        Self {
            key,
            value,
            height: 1,
            size: 1,
            left: None,
            right: None,
        }
    }

    fn update(&mut self) {
        let left_height = self.left.as_ref().map_or(0, |n| n.height);
        let right_height = self.right.as_ref().map_or(0, |n| n.height);
        self.height = 1 + left_height.max(right_height);
        self.size = 1 + size(&self.left) + size(&self.right);
    }

    fn balance_factor(&self) -> isize {
        let left_height = self.left.as_ref().map_or(0, |n| n.height as isize);
        let right_height = self.right.as_ref().map_or(0, |n| n.height as isize);
        left_height - right_height
    }
}

/// Iterator over `(key, value)` references in ascending key order.
pub struct KeyTreeIter<'a, V> {
    stack: Vec<&'a Node<V>>,
}

impl<'a, V> KeyTreeIter<'a, V> {
    /// Positions the iterator on the entry at `rank`. The stack holds the
    /// pending ancestors, nearest successor on top.
    fn seek(root: &'a Option<Box<Node<V>>>, mut rank: usize) -> Self {
        let mut stack = Vec::new();
        let mut node = root.as_deref();
        while let Some(current) = node {
            let left_size = size(&current.left);
            match rank.cmp(&left_size) {
                Ordering::Less => {
                    stack.push(current);
                    node = current.left.as_deref();
                }
                Ordering::Equal => {
                    stack.push(current);
                    break;
                }
                Ordering::Greater => {
                    rank -= left_size + 1;
                    node = current.right.as_deref();
                }
            }
        }
        Self { stack }
    }

    fn push_left(mut node: Option<&'a Node<V>>, stack: &mut Vec<&'a Node<V>>) {
        while let Some(n) = node {
            stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl<'a, V> Iterator for KeyTreeIter<'a, V> {
    type Item = (&'a Key, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        Self::push_left(node.right.as_deref(), &mut self.stack);
        Some((&node.key, &node.value))
    }
}

impl<'a, V> IntoIterator for &'a KeyTree<V> {
    type Item = (&'a Key, &'a V);
    type IntoIter = KeyTreeIter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
