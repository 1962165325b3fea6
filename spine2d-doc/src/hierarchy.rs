//! Single-parent named node store with cycle rejection.
//!
//! Nodes are keyed by name and keep insertion order. Parent links are plain names, so a node may
//! reference a parent that is not (yet) stored; such a link simply ends a parent walk.

use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// A node that can live in a [`Hierarchy`].
pub trait HierarchyNode {
    fn name(&self) -> &str;
    fn parent(&self) -> Option<&str>;
}

impl<T: HierarchyNode + ?Sized> HierarchyNode for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn parent(&self) -> Option<&str> {
        (**self).parent()
    }
}

#[derive(Clone, Debug)]
pub struct Hierarchy<T> {
    nodes: IndexMap<String, T>,
}

impl<T> Default for Hierarchy<T> {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
        }
    }
}

impl<T: HierarchyNode> Hierarchy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = T>) -> Result<Self> {
        let mut out = Self::new();
        out.insert(nodes)?;
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.nodes.get(name)
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.nodes.values()
    }

    /// Inserts nodes one at a time.
    ///
    /// Each node is validated on its own: a failing node leaves the nodes inserted before it in
    /// place. A node is rejected with [`Error::Cycle`] when its parent chain leads back to its own
    /// name, and with [`Error::DuplicateBone`] when the name is taken.
    pub fn insert(&mut self, nodes: impl IntoIterator<Item = T>) -> Result<()> {
        for node in nodes {
            self.insert_one(node)?;
        }
        Ok(())
    }

    fn insert_one(&mut self, node: T) -> Result<()> {
        let name = node.name();
        let chain = if self.nodes.contains_key(name) {
            self.would_form_cycle(name)?
        } else {
            self.chain_back_to(name, node.parent(), vec![name.to_string()])?
        };
        if let Some(chain) = chain {
            return Err(Error::Cycle {
                bone: name.to_string(),
                chain,
            });
        }
        if self.nodes.contains_key(name) {
            return Err(Error::DuplicateBone {
                name: name.to_string(),
            });
        }
        self.nodes.insert(name.to_string(), node);
        Ok(())
    }

    /// Removes the named nodes. Absent names are ignored.
    pub fn remove<S: AsRef<str>>(&mut self, names: impl IntoIterator<Item = S>) {
        for name in names {
            self.nodes.shift_remove(name.as_ref());
        }
    }

    /// Walks the parent chain of the stored node `name` and returns the visited chain if it leads
    /// back to `name`. Returns `None` when `name` is not stored or the chain ends.
    pub fn would_form_cycle(&self, name: &str) -> Result<Option<Vec<String>>> {
        let Some(node) = self.nodes.get(name) else {
            return Ok(None);
        };
        self.chain_back_to(name, node.parent(), vec![name.to_string()])
    }

    fn chain_back_to<'a>(
        &'a self,
        target: &str,
        mut parent: Option<&'a str>,
        mut chain: Vec<String>,
    ) -> Result<Option<Vec<String>>> {
        // A sound chain visits every stored node at most once.
        let limit = self.nodes.len() + 1;
        while let Some(parent_name) = parent {
            if parent_name == target {
                return Ok(Some(chain));
            }
            let Some(next) = self.nodes.get(parent_name) else {
                return Ok(None);
            };
            chain.push(parent_name.to_string());
            if chain.len() > limit {
                return Err(Error::GraphCorruption {
                    bone: target.to_string(),
                    limit,
                });
            }
            parent = next.parent();
        }
        Ok(None)
    }

    pub fn require(&self, name: &str) -> Result<&T> {
        self.nodes.get(name).ok_or_else(|| Error::UnknownBone {
            name: name.to_string(),
        })
    }

    /// Depth-first walk from `root`.
    ///
    /// Nodes are returned in stack pop order, so every parent precedes its children. Children of
    /// a node at `max_depth` are not explored, but the node itself is included.
    pub fn traverse(&self, root: &str, max_depth: Option<usize>) -> Result<Vec<&T>> {
        let root = self.require(root)?;

        let mut children = HashMap::<&str, Vec<&T>>::new();
        for node in self.nodes.values() {
            if let Some(parent) = node.parent() {
                children.entry(parent).or_default().push(node);
            }
        }

        let mut visited = HashSet::<&str>::new();
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(root, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            if !visited.insert(node.name()) {
                continue;
            }
            out.push(node);
            if max_depth.is_none_or(|max| depth < max) {
                // Reversed so siblings pop in stored order.
                if let Some(kids) = children.get(node.name()) {
                    stack.extend(kids.iter().rev().map(|&kid| (kid, depth + 1)));
                }
            }
        }
        Ok(out)
    }

    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, name: &str) -> Option<&mut T> {
        self.nodes.get_mut(name)
    }
}
