//! Ordered task collection.
//!
//! A double-ended sequence with O(1) push/pop at either end and a mutable
//! cursor for relative insertion and removal. Policies keep their ready
//! queues in it.
//!
//! # Layout
//! Nodes live in a slot arena (`Vec<Option<Node>>`) linked by index, with a
//! free list for vacated slots. Every operation except drop is O(1).
//!
//! # Cursor
//! [`TaskList::iter_start`] returns a [`CursorMut`] that mutably borrows the
//! list, so at most one cursor exists at a time. A cursor that has walked
//! past the end is inactive: `next`, `insert_*` and `remove` on it fail with
//! `Usage`, except that `next` after a `remove` emptied the cursor re-anchors
//! at the starting end.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SchedError};

/// One end of a [`TaskList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum End {
    /// Front of the list.
    Head,
    /// Back of the list.
    Tail,
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Double-ended ordered collection with a relative-insertion cursor.
pub struct TaskList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T> TaskList<T> {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pushes `value` at the given end.
    pub fn push(&mut self, value: T, end: End) -> Result<()> {
        match end {
            End::Head => {
                let idx = self.alloc(value, None, self.head)?;
                match self.head {
                    Some(old) => self.set_prev(old, Some(idx)),
                    None => self.tail = Some(idx),
                }
                self.head = Some(idx);
            }
            End::Tail => {
                let idx = self.alloc(value, self.tail, None)?;
                match self.tail {
                    Some(old) => self.set_next(old, Some(idx)),
                    None => self.head = Some(idx),
                }
                self.tail = Some(idx);
            }
        }
        Ok(())
    }

    /// Pops the entry at the given end.
    pub fn pop(&mut self, end: End) -> Option<T> {
        let idx = match end {
            End::Head => self.head?,
            End::Tail => self.tail?,
        };
        self.unlink(idx)
    }

    /// Peeks at the entry at the given end.
    pub fn peek(&self, end: End) -> Option<&T> {
        let idx = match end {
            End::Head => self.head?,
            End::Tail => self.tail?,
        };
        self.node(idx).map(|n| &n.value)
    }

    /// Peeks at the head.
    pub fn front(&self) -> Option<&T> {
        self.peek(End::Head)
    }

    /// Peeks at the tail.
    pub fn back(&self) -> Option<&T> {
        self.peek(End::Tail)
    }

    /// Positions a cursor at `end`. The cursor walks away from that end.
    pub fn iter_start(&mut self, end: End) -> CursorMut<'_, T> {
        let current = match end {
            End::Head => self.head,
            End::Tail => self.tail,
        };
        CursorMut {
            list: self,
            current,
            direction: end,
            reanchor: false,
        }
    }

    /// Read-only head-to-tail iteration.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Takes every entry, head first, leaving the list empty.
    pub fn drain(&mut self) -> IntoIter<T> {
        IntoIter {
            list: std::mem::take(self),
        }
    }

    /// Moves every entry of `other` to the tail of this list.
    pub fn append(&mut self, other: TaskList<T>) -> Result<()> {
        for value in other {
            self.push(value, End::Tail)?;
        }
        Ok(())
    }

    fn alloc(&mut self, value: T, prev: Option<usize>, next: Option<usize>) -> Result<usize> {
        let node = Node { value, prev, next };
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                idx
            }
            None => {
                self.slots
                    .try_reserve(1)
                    .map_err(|_| SchedError::OutOfMemory)?;
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };
        self.len += 1;
        Ok(idx)
    }

    fn unlink(&mut self, idx: usize) -> Option<T> {
        let node = self.slots.get_mut(idx)?.take()?;
        match node.prev {
            Some(prev) => self.set_next(prev, node.next),
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.set_prev(next, node.prev),
            None => self.tail = node.prev,
        }
        self.free.push(idx);
        self.len -= 1;
        Some(node.value)
    }

    /// Links `value` directly before (`End::Head` side) or after (`End::Tail`
    /// side) the node at `idx`.
    fn link_beside(&mut self, idx: usize, value: T, side: End) -> Result<()> {
        match side {
            End::Head => {
                let prev = self.node(idx).and_then(|n| n.prev);
                let new = self.alloc(value, prev, Some(idx))?;
                match prev {
                    Some(prev) => self.set_next(prev, Some(new)),
                    None => self.head = Some(new),
                }
                self.set_prev(idx, Some(new));
            }
            End::Tail => {
                let next = self.node(idx).and_then(|n| n.next);
                let new = self.alloc(value, Some(idx), next)?;
                match next {
                    Some(next) => self.set_prev(next, Some(new)),
                    None => self.tail = Some(new),
                }
                self.set_next(idx, Some(new));
            }
        }
        Ok(())
    }

    fn node(&self, idx: usize) -> Option<&Node<T>> {
        self.slots.get(idx)?.as_ref()
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node<T>> {
        self.slots.get_mut(idx)?.as_mut()
    }

    fn set_prev(&mut self, idx: usize, prev: Option<usize>) {
        if let Some(node) = self.node_mut(idx) {
            node.prev = prev;
        }
    }

    fn set_next(&mut self, idx: usize, next: Option<usize>) {
        if let Some(node) = self.node_mut(idx) {
            node.next = next;
        }
    }

    fn step(&self, idx: usize, direction: End) -> Option<usize> {
        let node = self.node(idx)?;
        match direction {
            End::Head => node.next,
            End::Tail => node.prev,
        }
    }
}

impl<T> Default for TaskList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for TaskList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Mutable cursor over a [`TaskList`].
pub struct CursorMut<'a, T> {
    list: &'a mut TaskList<T>,
    current: Option<usize>,
    direction: End,
    reanchor: bool,
}

impl<T> CursorMut<'_, T> {
    /// Entry under the cursor, `None` when inactive.
    pub fn current(&self) -> Option<&T> {
        self.list.node(self.current?).map(|n| &n.value)
    }

    /// Mutable entry under the cursor.
    pub fn current_mut(&mut self) -> Option<&mut T> {
        let idx = self.current?;
        self.list.node_mut(idx).map(|n| &mut n.value)
    }

    /// Whether the cursor points at an entry.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Advances the cursor away from its starting end.
    ///
    /// Returns `Ok(None)` when stepping past the last entry; calling again
    /// after that fails with `Usage`.
    pub fn next(&mut self) -> Result<Option<&T>> {
        if self.reanchor {
            self.reanchor = false;
            self.current = match self.direction {
                End::Head => self.list.head,
                End::Tail => self.list.tail,
            };
        } else {
            let idx = self
                .current
                .ok_or_else(|| SchedError::usage("list iterator not started"))?;
            self.current = self.list.step(idx, self.direction);
        }
        Ok(self.current())
    }

    /// Inserts `value` on the starting-end side of the cursor.
    pub fn insert_before(&mut self, value: T) -> Result<()> {
        let side = self.direction;
        self.insert(value, side)
    }

    /// Inserts `value` on the far side of the cursor.
    pub fn insert_after(&mut self, value: T) -> Result<()> {
        let side = match self.direction {
            End::Head => End::Tail,
            End::Tail => End::Head,
        };
        self.insert(value, side)
    }

    /// Removes the entry under the cursor.
    ///
    /// The cursor moves back to the neighbour it came from, so the following
    /// `next` yields the entry after the removed one.
    pub fn remove(&mut self) -> Result<T> {
        let idx = self
            .current
            .ok_or_else(|| SchedError::usage("list iterator not started"))?;
        let back = match self.direction {
            End::Head => End::Tail,
            End::Tail => End::Head,
        };
        let neighbour = self.list.step(idx, back);
        let value = self
            .list
            .unlink(idx)
            .ok_or_else(|| SchedError::usage("cursor points at a vacant slot"))?;
        self.current = neighbour;
        self.reanchor = neighbour.is_none();
        Ok(value)
    }

    fn insert(&mut self, value: T, side: End) -> Result<()> {
        let idx = self
            .current
            .ok_or_else(|| SchedError::usage("list iterator not started"))?;
        self.list.link_beside(idx, value, side)
    }
}

/// Head-to-tail iterator over a [`TaskList`].
pub struct Iter<'a, T> {
    list: &'a TaskList<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = list.node(self.next?)?;
        self.next = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

/// Owning head-to-tail iterator over a [`TaskList`].
pub struct IntoIter<T> {
    list: TaskList<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop(End::Head)
    }
}

impl<T> IntoIterator for TaskList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

impl<'a, T> IntoIterator for &'a TaskList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
