//! Intermediate scene representation produced by import and consumed by export.
//!
//! [`ObjScene`] is the root of one file. It owns the vertex and index tables,
//! every triangle batch and light, the level-of-detail ranges, the header
//! options, and a tree of [`SceneNode`]s that mirrors the file's animation
//! nesting. Nodes refer to batches and lights by index, in the order they
//! appeared, so the tree can be walked to rebuild the file or to create
//! objects in a host application through [`SceneSink`].

use std::path::PathBuf;

use obj8_math::DVec3;
use serde::Serialize;

use crate::attribute::{AttrValue, AttributeTable};
use crate::header::{Header, HeaderOptions, PointCounts};
use crate::mesh::{Bounds, Mesh, Vertex};

/// A `TRIS` draw: a contiguous run of the index table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TriangleBatch {
    /// First index in the shared index table
    pub offset: usize,

    /// Number of indices drawn
    pub count: usize,

    /// Label captured from a preceding comment
    pub name_hint: Option<String>,

    /// Render-state attributes active when the batch was drawn
    pub state: AttributeTable<AttrValue>,

    /// Level of detail this batch belongs to
    pub lod: Option<usize>,

    /// Source line of the `TRIS` directive
    pub line: usize,
}

/// What an animation scope does.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum AnimKind {
    /// `ANIM_begin` scope: groups content without a dataref of its own.
    Static,
    /// `ANIM_trans_begin` keyframe table.
    Translate,
    /// `ANIM_rotate_begin` keyframe table around `axis` (scene axes).
    Rotate { axis: DVec3 },
}

impl AnimKind {
    pub fn begin_keyword(&self) -> &'static str {
        match self {
            AnimKind::Static => "ANIM_begin",
            AnimKind::Translate => "ANIM_trans_begin",
            AnimKind::Rotate { .. } => "ANIM_rotate_begin",
        }
    }

    pub fn end_keyword(&self) -> &'static str {
        match self {
            AnimKind::Static => "ANIM_end",
            AnimKind::Translate => "ANIM_trans_end",
            AnimKind::Rotate { .. } => "ANIM_rotate_end",
        }
    }
}

/// Sample stored at a keyframe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum KeySample {
    /// Location in scene axes.
    Translation(DVec3),
    /// Angle in degrees around the block's axis.
    Rotation(f64),
}

/// Dataref value -> sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Keyframe {
    pub value: f64,
    pub sample: KeySample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum VisibilityKind {
    Hide,
    Show,
}

impl VisibilityKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VisibilityKind::Hide => "ANIM_hide",
            VisibilityKind::Show => "ANIM_show",
        }
    }
}

/// Hide or show the scope while the dataref is within `[v1, v2]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisibilityCondition {
    pub kind: VisibilityKind,
    pub v1: f64,
    pub v2: f64,
    pub dataref: String,
}

/// One animation scope.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnimationBlock {
    pub kind: AnimKind,

    /// Dataref driving the keyframes (none for static scopes)
    pub dataref: Option<String>,

    /// Keyframes in file order
    pub keyframes: Vec<Keyframe>,

    /// Loop period from `ANIM_keyframe_loop`
    pub loop_period: Option<f64>,

    /// Hide/show conditions in file order
    pub visibility: Vec<VisibilityCondition>,

    pub name_hint: Option<String>,

    /// Level of detail active when the scope opened
    pub lod: Option<usize>,

    /// Source line of the opening directive
    pub line: usize,
}

impl AnimationBlock {
    pub fn new(kind: AnimKind, dataref: Option<String>, line: usize) -> Self {
        Self {
            kind,
            dataref,
            keyframes: Vec::new(),
            loop_period: None,
            visibility: Vec::new(),
            name_hint: None,
            lod: None,
            line,
        }
    }
}

/// How a light was declared.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum LightKind {
    /// `LIGHT_NAMED`
    Named,
    /// `LIGHT_PARAM` with its free-text parameters
    Param(String),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Light {
    pub name: String,
    /// Position in scene axes
    pub position: DVec3,
    pub kind: LightKind,
    pub lod: Option<usize>,
}

/// Distance range a level of detail is shown over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LodRange {
    pub near: f64,
    pub far: f64,
}

/// An entry of a node, in file order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NodeItem {
    /// Index into [`ObjScene::batches`]
    Batch(usize),
    /// Index into [`ObjScene::lights`]
    Light(usize),
    /// A nested animation scope
    Node(SceneNode),
}

/// A node of the hierarchy. The root has no block.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SceneNode {
    pub block: Option<AnimationBlock>,
    pub items: Vec<NodeItem>,
}

impl SceneNode {
    pub fn new(block: AnimationBlock) -> Self {
        Self {
            block: Some(block),
            items: Vec::new(),
        }
    }

    /// Direct child nodes.
    pub fn children(&self) -> impl Iterator<Item = &SceneNode> {
        self.items.iter().filter_map(|item| match item {
            NodeItem::Node(node) => Some(node),
            _ => None,
        })
    }

    /// Batch indices attached directly to this node.
    pub fn batches(&self) -> impl Iterator<Item = usize> + '_ {
        self.items.iter().filter_map(|item| match item {
            NodeItem::Batch(idx) => Some(*idx),
            _ => None,
        })
    }

    /// Maximum number of nested blocks below this node.
    pub fn depth(&self) -> usize {
        self.children().map(|c| 1 + c.depth()).max().unwrap_or(0)
    }

    /// Number of nodes in this subtree, excluding `self`.
    pub fn descendant_count(&self) -> usize {
        self.children().map(|c| 1 + c.descendant_count()).sum()
    }
}

/// Resolved texture files (paths that exist on disk).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TextureSet {
    pub diffuse: Option<PathBuf>,
    pub lit: Option<PathBuf>,
    pub normal: Option<PathBuf>,
}

/// Host side of materialization.
///
/// [`ObjScene::materialize`] walks the node tree depth-first and calls these
/// in file order. Implementations create whatever objects the host needs.
pub trait SceneSink {
    fn begin_node(&mut self, block: &AnimationBlock, depth: usize);
    fn end_node(&mut self, block: &AnimationBlock, depth: usize);
    fn batch(&mut self, batch: &TriangleBatch, mesh: Mesh, depth: usize);
    fn light(&mut self, light: &Light, depth: usize);
}

/// Root of one imported or to-be-exported file.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ObjScene {
    /// Scene name (usually the file stem)
    pub name: String,

    pub textures: TextureSet,

    /// Material name derived when a diffuse texture resolves
    pub material_name: Option<String>,

    /// Header-level options
    pub options: HeaderOptions,

    pub vertices: Vec<Vertex>,

    /// Shared index table (may hold the sentinel)
    pub indices: Vec<i32>,

    pub batches: Vec<TriangleBatch>,

    pub lights: Vec<Light>,

    /// Level-of-detail ranges in first-seen order
    pub lods: Vec<LodRange>,

    pub root: SceneNode,
}

impl ObjScene {
    /// Create an empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Counts written to `POINT_COUNTS`.
    pub fn point_counts(&self) -> PointCounts {
        PointCounts {
            vertices: self.vertices.len(),
            lines: 0,
            lights: self.lights.len(),
            indices: self.indices.len(),
        }
    }

    /// Collect the header for a target simulator version.
    pub fn header(&self, version: u32) -> Header {
        Header::collect(&self.options, self.point_counts(), version)
    }

    /// The slice of the index table a batch draws.
    pub fn batch_indices(&self, batch: &TriangleBatch) -> &[i32] {
        let end = batch.offset.saturating_add(batch.count).min(self.indices.len());
        let start = batch.offset.min(end);
        &self.indices[start..end]
    }

    /// Extract a standalone mesh for one batch.
    pub fn batch_mesh(&self, batch_index: usize) -> Option<Mesh> {
        self.batches
            .get(batch_index)
            .map(|batch| Mesh::from_indices(&self.vertices, self.batch_indices(batch)))
    }

    pub fn lod_count(&self) -> usize {
        self.lods.len()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Triangles drawn across all batches.
    pub fn total_triangle_count(&self) -> usize {
        self.batches.iter().map(|b| b.count / 3).sum()
    }

    /// Maximum animation nesting depth.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Bounds of the whole vertex table.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Walk the node tree into a host.
    pub fn materialize(&self, sink: &mut dyn SceneSink) {
        self.materialize_items(&self.root, sink, 0);
    }

    fn materialize_items(&self, node: &SceneNode, sink: &mut dyn SceneSink, depth: usize) {
        for item in &node.items {
            match item {
                NodeItem::Batch(idx) => {
                    if let Some(mesh) = self.batch_mesh(*idx) {
                        sink.batch(&self.batches[*idx], mesh, depth);
                    }
                }
                NodeItem::Light(idx) => {
                    if let Some(light) = self.lights.get(*idx) {
                        sink.light(light, depth);
                    }
                }
                NodeItem::Node(child) => {
                    if let Some(block) = &child.block {
                        sink.begin_node(block, depth + 1);
                        self.materialize_items(child, sink, depth + 1);
                        sink.end_node(block, depth + 1);
                    }
                }
            }
        }
    }
}
