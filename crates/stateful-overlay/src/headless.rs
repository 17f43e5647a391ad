//! In-memory view hierarchy.
//!
//! Stands in for a real view system in tests and tooling. Clones share the same
//! tree, so a caller can hand one clone to a state machine and inspect another.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::hierarchy::ViewHierarchy;

/// Identity of a headless view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewId(Uuid);

impl ViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Layer {
    view: ViewId,
    opacity: f32,
}

#[derive(Debug, Default)]
struct Tree {
    labels: HashMap<ViewId, String>,
    base: Option<ViewId>,
    /// Overlays above the base, bottom to top.
    layers: Vec<Layer>,
    mutations: u64,
}

impl Tree {
    fn position(&self, view: &ViewId) -> Option<usize> {
        self.layers.iter().position(|l| l.view == *view)
    }

    fn label(&self, view: &ViewId) -> String {
        self.labels
            .get(view)
            .cloned()
            .unwrap_or_else(|| view.to_string())
    }
}

/// A shared, thread-safe, in-memory overlay tree.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHierarchy {
    tree: Arc<Mutex<Tree>>,
}

impl HeadlessHierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view with a human-readable label.
    pub fn create_view(&self, label: impl Into<String>) -> ViewId {
        let id = ViewId::new();
        self.tree.lock().labels.insert(id, label.into());
        id
    }

    /// Label given to `view` at creation.
    pub fn label(&self, view: &ViewId) -> Option<String> {
        self.tree.lock().labels.get(view).cloned()
    }

    /// Attached overlays, bottom to top.
    pub fn attached(&self) -> Vec<ViewId> {
        self.tree.lock().layers.iter().map(|l| l.view).collect()
    }

    /// Attached overlays with non-zero opacity, bottom to top.
    pub fn visible(&self) -> Vec<ViewId> {
        self.tree
            .lock()
            .layers
            .iter()
            .filter(|l| l.opacity > 0.0)
            .map(|l| l.view)
            .collect()
    }

    /// Labels of the visible overlays, bottom to top.
    pub fn visible_labels(&self) -> Vec<String> {
        let tree = self.tree.lock();
        tree.layers
            .iter()
            .filter(|l| l.opacity > 0.0)
            .map(|l| tree.label(&l.view))
            .collect()
    }

    /// Opacity of an attached view.
    pub fn opacity(&self, view: &ViewId) -> Option<f32> {
        let tree = self.tree.lock();
        tree.position(view).map(|i| tree.layers[i].opacity)
    }

    /// Topmost attached overlay.
    pub fn top(&self) -> Option<ViewId> {
        self.tree.lock().layers.last().map(|l| l.view)
    }

    /// Number of mutations that actually changed the tree.
    pub fn mutation_count(&self) -> u64 {
        self.tree.lock().mutations
    }

    /// Serializable picture of the tree.
    pub fn snapshot(&self) -> HierarchySnapshot {
        let tree = self.tree.lock();
        HierarchySnapshot {
            base: tree.base.map(|b| tree.label(&b)),
            overlays: tree
                .layers
                .iter()
                .map(|l| LayerSnapshot {
                    label: tree.label(&l.view),
                    opacity: l.opacity,
                })
                .collect(),
        }
    }
}

impl ViewHierarchy for HeadlessHierarchy {
    type View = ViewId;

    fn attach_above(&mut self, base: &ViewId, overlay: &ViewId) {
        let mut tree = self.tree.lock();
        tree.base = Some(*base);
        let layer = match tree.position(overlay) {
            Some(i) if i + 1 == tree.layers.len() => return,
            Some(i) => tree.layers.remove(i),
            None => Layer {
                view: *overlay,
                opacity: 1.0,
            },
        };
        tree.layers.push(layer);
        tree.mutations += 1;
    }

    fn detach(&mut self, view: &ViewId) {
        let mut tree = self.tree.lock();
        if let Some(i) = tree.position(view) {
            tree.layers.remove(i);
            tree.mutations += 1;
        }
    }

    fn is_attached(&self, view: &ViewId) -> bool {
        self.tree.lock().position(view).is_some()
    }

    fn set_opacity(&mut self, view: &ViewId, opacity: f32) {
        let mut tree = self.tree.lock();
        let opacity = opacity.clamp(0.0, 1.0);
        if let Some(i) = tree.position(view) {
            if tree.layers[i].opacity != opacity {
                tree.layers[i].opacity = opacity;
                tree.mutations += 1;
            }
        }
    }
}

/// Serializable view of a [`HeadlessHierarchy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchySnapshot {
    /// Label of the base view, once an overlay has been attached above it.
    pub base: Option<String>,
    /// Overlays, bottom to top.
    pub overlays: Vec<LayerSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub label: String,
    pub opacity: f32,
}
