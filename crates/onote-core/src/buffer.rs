//! Positional character store.
//!
//! Characters live in a doubly linked sequence whose nodes are kept in an
//! arena and addressed by slot index. Slot 0 is a permanent sentinel that
//! never carries a character; the document is the chain that follows it.
//! Deleted slots go on a free list and are handed out again by later inserts.

use std::fmt;

use crate::error::EditError;

const SENTINEL: usize = 0;

#[derive(Debug, Clone)]
struct Node {
    ch: Option<char>,
    prev: Option<usize>,
    next: Option<usize>,
}

impl Node {
    fn sentinel() -> Self {
        Self {
            ch: None,
            prev: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextBuffer {
    nodes: Vec<Node>,
    free: Vec<usize>,
    /// Last node in the chain; the sentinel when the buffer is empty.
    tail: usize,
    len: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::sentinel()],
            free: Vec::new(),
            tail: SENTINEL,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts `ch` so that it becomes the element at `position`.
    ///
    /// Positions past the end clamp to an append. Returns the index the
    /// character actually landed at.
    pub fn insert(&mut self, position: usize, ch: char) -> usize {
        let (before, landed) = self.node_before(position);
        let next = self.nodes[before].next;
        let id = self.alloc(Node {
            ch: Some(ch),
            prev: Some(before),
            next,
        });

        match next {
            Some(n) => self.nodes[n].prev = Some(id),
            None => self.tail = id,
        }
        self.nodes[before].next = Some(id);
        self.len += 1;
        landed
    }

    /// Like [`insert`](Self::insert) but rejects positions past the end.
    pub fn try_insert(&mut self, position: usize, ch: char) -> Result<usize, EditError> {
        if position > self.len {
            return Err(EditError::OutOfRange {
                position,
                len: self.len,
            });
        }
        Ok(self.insert(position, ch))
    }

    /// Removes and returns the character at `position`, or `None` if there
    /// is nothing there.
    pub fn delete(&mut self, position: usize) -> Option<char> {
        if position >= self.len {
            return None;
        }

        let (before, _) = self.node_before(position);
        let target = self.nodes[before].next?;
        let next = self.nodes[target].next;

        self.nodes[before].next = next;
        match next {
            Some(n) => self.nodes[n].prev = Some(before),
            None => self.tail = before,
        }

        let node = &mut self.nodes[target];
        let ch = node.ch.take();
        node.prev = None;
        node.next = None;
        self.free.push(target);
        self.len -= 1;
        ch
    }

    /// Like [`delete`](Self::delete) but reports a missing position.
    pub fn try_delete(&mut self, position: usize) -> Result<char, EditError> {
        let len = self.len;
        self.delete(position)
            .ok_or(EditError::OutOfRange { position, len })
    }

    pub fn char_at(&self, position: usize) -> Option<char> {
        self.chars().nth(position)
    }

    pub fn chars(&self) -> Chars<'_> {
        Chars {
            buffer: self,
            next: self.nodes[SENTINEL].next,
        }
    }

    /// The whole document in display order. Walks every node.
    pub fn text(&self) -> String {
        self.chars().collect()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Drops the current content and loads `text` in its place.
    pub fn replace(&mut self, text: &str) {
        self.clear();
        self.nodes.reserve(text.len());
        for ch in text.chars() {
            self.insert(self.len, ch);
        }
    }

    /// Finds the node an element at `position` would follow, along with the
    /// index that element ends up at once the walk is clamped.
    fn node_before(&self, position: usize) -> (usize, usize) {
        if position >= self.len {
            return (self.tail, self.len);
        }

        let mut curr = SENTINEL;
        for _ in 0..position {
            match self.nodes[curr].next {
                Some(next) => curr = next,
                None => break,
            }
        }
        (curr, position)
    }

    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.replace(text);
        buffer
    }
}

impl fmt::Display for TextBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in self.chars() {
            write!(f, "{}", ch)?;
        }
        Ok(())
    }
}

/// Iterator over the characters of a [`TextBuffer`] in link order.
pub struct Chars<'a> {
    buffer: &'a TextBuffer,
    next: Option<usize>,
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let id = self.next?;
        let node = &self.buffer.nodes[id];
        self.next = node.next;
        node.ch
    }
}
