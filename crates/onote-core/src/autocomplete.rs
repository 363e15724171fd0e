//! Prefix tree of known words.
//!
//! Children are kept in the order they were first created, so completions
//! come back "stable by first use" rather than sorted.

use crate::error::EditError;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: Vec<(char, usize)>,
    terminal: bool,
}

impl TrieNode {
    fn child(&self, ch: char) -> Option<usize> {
        self.children
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, id)| *id)
    }
}

#[derive(Debug, Clone)]
pub struct AutocompleteIndex {
    nodes: Vec<TrieNode>,
    words: usize,
}

impl AutocompleteIndex {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            words: 0,
        }
    }

    pub fn with_vocabulary<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut index = Self::new();
        for word in words {
            index.insert(word.as_ref());
        }
        index
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    /// Adds `word`. Returns `false` if it was already known or is empty.
    pub fn insert(&mut self, word: &str) -> bool {
        if word.is_empty() {
            return false;
        }

        let mut node = ROOT;
        for ch in word.chars() {
            node = match self.nodes[node].child(ch) {
                Some(next) => next,
                None => {
                    self.nodes.push(TrieNode::default());
                    let id = self.nodes.len() - 1;
                    self.nodes[node].children.push((ch, id));
                    id
                }
            };
        }

        if self.nodes[node].terminal {
            return false;
        }
        self.nodes[node].terminal = true;
        self.words += 1;
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        !word.is_empty()
            && self
                .find_prefix(word)
                .map(|node| self.nodes[node].terminal)
                .unwrap_or(false)
    }

    /// Every known word starting with `prefix`, in depth-first
    /// first-use order. An empty prefix lists the whole vocabulary.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        match self.find_prefix(prefix) {
            Ok(node) => {
                let mut words = Vec::new();
                let mut current = prefix.to_string();
                self.collect(node, &mut current, &mut words);
                words
            }
            Err(e) => {
                log::trace!("{}", e);
                Vec::new()
            }
        }
    }

    fn find_prefix(&self, prefix: &str) -> Result<usize, EditError> {
        let mut node = ROOT;
        for ch in prefix.chars() {
            node = self.nodes[node]
                .child(ch)
                .ok_or_else(|| EditError::NotFound(prefix.to_string()))?;
        }
        Ok(node)
    }

    /// Depth-first walk from `start`, emitting each word before its
    /// extensions and siblings in creation order. Uses an explicit stack so
    /// word length is not bounded by the thread's stack.
    fn collect(&self, start: usize, current: &mut String, out: &mut Vec<String>) {
        let mut stack = vec![(start, current.len(), None)];
        while let Some((id, len, ch)) = stack.pop() {
            current.truncate(len);
            if let Some(ch) = ch {
                current.push(ch);
            }

            let node = &self.nodes[id];
            if node.terminal {
                out.push(current.clone());
            }
            for &(ch, child) in node.children.iter().rev() {
                stack.push((child, current.len(), Some(ch)));
            }
        }
    }
}

impl Default for AutocompleteIndex {
    fn default() -> Self {
        Self::new()
    }
}
