//! Minimal visual scene model consumed by an external renderer.
//!
//! Nodes mirror simulation state one way (physics to visuals); nothing in
//! the experience ever reads a transform back out of the renderer.

use std::collections::HashMap;

pub type NodeId = u64;

/// A renderable node: a named transform plus the asset id of its model
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    /// Asset id of the model backing this node, if any
    pub model: Option<String>,
    pub position: [f32; 3],
    pub yaw: f32,
}

/// Scene background: HDR environment when it loads, flat color otherwise
#[derive(Debug, Clone, PartialEq)]
pub enum Background {
    Sky { asset: String },
    FlatColor([f32; 3]),
}

/// Fallback background when the HDR environment is missing or failed
pub const FALLBACK_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

pub struct Scene {
    nodes: HashMap<NodeId, SceneNode>,
    next_id: NodeId,
    pub background: Background,
    /// Asset id of the terrain texture once it resolves
    pub terrain_texture: Option<String>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 1,
            background: Background::FlatColor(FALLBACK_COLOR),
            terrain_texture: None,
        }
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        model: Option<String>,
        position: [f32; 3],
    ) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                id,
                name: name.into(),
                model,
                position,
                yaw: 0.0,
            },
        );
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.values()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
