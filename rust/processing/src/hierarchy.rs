// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parent/child hierarchy between city objects
//!
//! Nodes live in a [`SlotMap`] arena and refer to each other by key, so the
//! tree has no owning back-pointers. Only the first declared parent of an
//! object is honoured.

use cityjson_lite_core::CityModel;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

use crate::error::{Error, Result};

new_key_type! {
    /// Key of a node in a [`Hierarchy`].
    pub struct NodeKey;
}

/// One city object in the hierarchy.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub id: String,
    pub parent: Option<NodeKey>,
    /// Children in document order.
    pub children: Vec<NodeKey>,
}

/// Containment tree over every city object of a document.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    nodes: SlotMap<NodeKey, HierarchyNode>,
    index: FxHashMap<String, NodeKey>,
    order: Vec<NodeKey>,
}

impl Hierarchy {
    /// Link every object to its first declared parent.
    ///
    /// Fails with [`Error::DanglingReference`] when a parent id is not an
    /// object of the document.
    pub fn build(model: &CityModel) -> Result<Self> {
        let mut hierarchy = Hierarchy {
            nodes: SlotMap::with_capacity_and_key(model.len()),
            index: FxHashMap::default(),
            order: Vec::with_capacity(model.len()),
        };

        for object in model.objects() {
            let key = hierarchy.nodes.insert(HierarchyNode {
                id: object.id.clone(),
                parent: None,
                children: Vec::new(),
            });
            hierarchy.index.insert(object.id.clone(), key);
            hierarchy.order.push(key);
        }

        for (object, &child) in model.objects().iter().zip(&hierarchy.order) {
            let Some(parent_id) = object.primary_parent() else {
                continue;
            };
            if object.parents.len() > 1 {
                debug!(
                    object = %object.id,
                    parents = object.parents.len(),
                    "Multiple parents declared, using the first"
                );
            }

            let parent = *hierarchy.index.get(parent_id).ok_or_else(|| {
                Error::DanglingReference {
                    child: object.id.clone(),
                    parent: parent_id.to_string(),
                }
            })?;

            hierarchy.nodes[child].parent = Some(parent);
            hierarchy.nodes[parent].children.push(child);
        }

        Ok(hierarchy)
    }

    pub fn key(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn node(&self, key: NodeKey) -> Option<&HierarchyNode> {
        self.nodes.get(key)
    }

    /// Id of the parent of `id`, if it has one.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        let node = self.nodes.get(self.key(id)?)?;
        let parent = self.nodes.get(node.parent?)?;
        Some(parent.id.as_str())
    }

    /// Ids of the children of `id`, in document order.
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.key(id)
            .and_then(|key| self.nodes.get(key))
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&c| self.nodes.get(c))
                    .map(|c| c.id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ids of parentless objects, in document order.
    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter_map(|&key| self.nodes.get(key))
            .filter(|node| node.parent.is_none())
            .map(|node| node.id.as_str())
    }

    /// Number of ancestors of `id`. Stops at the first repeated node so a
    /// cyclic document cannot loop.
    pub fn depth(&self, id: &str) -> usize {
        let Some(mut key) = self.key(id) else {
            return 0;
        };
        let mut depth = 0;
        while let Some(parent) = self.nodes.get(key).and_then(|n| n.parent) {
            depth += 1;
            if depth > self.nodes.len() {
                break;
            }
            key = parent;
        }
        depth
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
