use std::borrow::Borrow;
use std::hash::Hash;

use hashbrown::HashMap;

/// A doubly linked list arena
///
/// Nodes live in a `Vec` and point at each other by index, the head is the most recently touched
/// node and the tail the least recently touched one.
pub(crate) struct LinkedArena<K, V> {
    pub(crate) idx_of: HashMap<K, usize>,
    pub(crate) nodes: Vec<LinkedNode<K, V>>,
    pub(crate) head: Option<usize>,
    pub(crate) tail: Option<usize>,
}

pub(crate) struct LinkedNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    parent: Option<usize>,
    child: Option<usize>,
}

impl<K, V> LinkedNode<K, V> {
    fn new(key: K, value: V, parent: Option<usize>, child: Option<usize>) -> Self {
        LinkedNode {
            key,
            value,
            parent,
            child,
        }
    }
}

impl<K, V> LinkedArena<K, V> {
    pub fn new() -> Self {
        LinkedArena {
            idx_of: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl<K, V> LinkedArena<K, V>
where
    K: Clone + Hash + Eq,
{
    pub(crate) fn index_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.idx_of.get(key).copied()
    }

    // Insert a new node at the front of the list
    pub(crate) fn insert_head(&mut self, key: K, value: V) {
        debug_assert!(!self.idx_of.contains_key(&key));

        let new_start = self.nodes.len();
        self.idx_of.insert(key.clone(), new_start);

        if let Some(old_start) = self.head {
            self.nodes
                .push(LinkedNode::new(key, value, None, Some(old_start)));
            self.nodes[old_start].parent = Some(new_start);
        } else {
            self.nodes.push(LinkedNode::new(key, value, None, None));
            self.tail = Some(new_start);
        }

        self.head = Some(new_start);
    }

    /// Ensures the node at idx has the correct parent and child relationships
    ///
    /// # Note:
    /// noop if the idx is out of bounds
    fn relink(&mut self, idx: usize) {
        if let Some(node) = self.nodes.get(idx) {
            let parent = node.parent;
            let child = node.child;

            if let Some(parent) = parent {
                self.nodes[parent].child = Some(idx);
            } else {
                self.head = Some(idx);
            }

            if let Some(child) = child {
                self.nodes[child].parent = Some(idx);
            } else {
                self.tail = Some(idx);
            }
        }
    }

    /// Remove the node at idx from the list
    /// passing through any parent/child relationships
    ///
    /// # Panics
    /// if idx is out of bounds
    fn unlink(&mut self, idx: usize) {
        let node = &self.nodes[idx];
        let parent = node.parent;
        let child = node.child;

        if let Some(parent) = parent {
            self.nodes[parent].child = child;
        } else {
            self.head = child;
        }

        if let Some(child) = child {
            self.nodes[child].parent = parent;
        } else {
            self.tail = parent;
        }
    }

    /// Move the node at idx to the front of the list
    ///
    /// # Panics
    /// Panics if new_head is out of bounds
    pub(crate) fn move_to_head(&mut self, new_head: usize) {
        if self.head == Some(new_head) {
            return;
        }

        self.unlink(new_head);

        let node = &mut self.nodes[new_head];
        node.child = self.head;
        node.parent = None;

        match self.head.replace(new_head) {
            Some(old) => self.nodes[old].parent = Some(new_head),
            // the list only held this node
            None => self.tail = Some(new_head),
        }
    }

    /// Remove the node from the given index, updating the start or end bounds as needed
    /// and returning the removed node.
    ///
    /// The last node of the arena is moved into the freed slot.
    ///
    /// # Panics
    /// IF idx is out of bounds
    pub(crate) fn remove(&mut self, idx: usize) -> LinkedNode<K, V> {
        self.unlink(idx);

        let removed = self.nodes.swap_remove(idx);
        self.idx_of.remove(&removed.key);

        // if the last element was just removed than this index will be out of bounds
        // and theres nothing to relink cause nothing was moved
        if idx != self.nodes.len() {
            if let Some(moved) = self.idx_of.get_mut(&self.nodes[idx].key) {
                *moved = idx;
            }

            self.relink(idx);
        }

        removed
    }

    pub(crate) fn pop_tail(&mut self) -> Option<LinkedNode<K, V>> {
        self.tail.map(|tail| self.remove(tail))
    }

    #[cfg(test)]
    pub(crate) fn keys_in_order(&self) -> Vec<K> {
        let mut keys = Vec::with_capacity(self.nodes.len());
        let mut next = self.head;

        while let Some(idx) = next {
            keys.push(self.nodes[idx].key.clone());
            next = self.nodes[idx].child;
        }

        keys
    }
}
