//! Subscription trie keyed by address segment

use std::collections::HashMap;

use crate::subscription::{remove_token, Subscription, Token};

pub(crate) struct TrieNode<T> {
    children: HashMap<String, TrieNode<T>>,
    subscriptions: Vec<Subscription<T>>,
}

impl<T> TrieNode<T> {
    pub(crate) fn new() -> Self {
        Self {
            children: HashMap::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Walk the path, creating missing nodes, and append at the terminal node
    pub(crate) fn insert(&mut self, segments: &[String], sub: Subscription<T>) {
        let mut node = self;
        for seg in segments {
            node = node.children.entry(seg.clone()).or_insert_with(TrieNode::new);
        }
        node.subscriptions.push(sub);
    }

    /// Exact-path lookup. A missing segment anywhere is a miss.
    pub(crate) fn find(&self, segments: &[String]) -> Option<&TrieNode<T>> {
        let mut node = self;
        for seg in segments {
            node = node.children.get(seg)?;
        }
        Some(node)
    }

    /// Remove `token` at the exact path, pruning branches left empty
    pub(crate) fn remove(&mut self, segments: &[String], token: &Token) -> bool {
        let Some((head, rest)) = segments.split_first() else {
            return remove_token(&mut self.subscriptions, token);
        };

        let Some(child) = self.children.get_mut(head) else {
            return false;
        };

        let removed = child.remove(rest, token);
        if removed && child.is_empty() {
            self.children.remove(head);
        }
        removed
    }

    pub(crate) fn subscriptions(&self) -> &[Subscription<T>] {
        &self.subscriptions
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.subscriptions.is_empty() && self.children.is_empty()
    }

    /// Total subscriptions in this subtree
    pub(crate) fn count(&self) -> usize {
        self.subscriptions.len() + self.children.values().map(TrieNode::count).sum::<usize>()
    }

    #[cfg(test)]
    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }
}
