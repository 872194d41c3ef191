//! Command builder: turns coerced directives into an [`ObjScene`].
//!
//! The builder owns the open-block stack, the render state, the current
//! level of detail and the diagnostics collector for one import. Nodes are
//! built bottom-up: a block is pushed when it opens and attached to its
//! parent (or the root) when its matching end arrives.

use std::path::PathBuf;

use obj8_math::DVec3;

use crate::attribute::{AttrValue, AttributeTable};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::header::{BlendMode, PointCounts, RequireSurface};
use crate::scene::{
    AnimKind, AnimationBlock, KeySample, Keyframe, Light, LightKind, NodeItem, ObjScene,
    SceneNode, TriangleBatch, VisibilityCondition,
};
use crate::texture::{material_name, TextureResolver};

use super::loader::{ImportError, ImportResult};
use super::state::{self, clear_group, group_of, group_reset_by};
use super::types::{Directive, DirectiveKind, GlobalSetting, TextureSlot};

/// Dataref written for deprecated animations that carry none.
pub const PLACEHOLDER_DATAREF: &str = "none";

/// Builds one scene from a directive stream.
pub struct CommandBuilder {
    scene: ObjScene,
    /// Open animation scopes, innermost last
    open: Vec<SceneNode>,
    /// Active render state, snapshotted into every batch
    state: AttributeTable<AttrValue>,
    current_lod: Option<usize>,
    textures: TextureResolver,
    /// Line and values of the last `POINT_COUNTS`
    declared_counts: Option<(usize, PointCounts)>,
    diagnostics: Diagnostics,
}

impl CommandBuilder {
    pub fn new(name: &str, base_dir: Option<PathBuf>) -> Self {
        Self {
            scene: ObjScene::new(name),
            open: Vec::new(),
            state: state::render_state_table(),
            current_lod: None,
            textures: TextureResolver::new(base_dir),
            declared_counts: None,
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Apply one directive. Only structural defects return `Err`.
    pub fn apply(
        &mut self,
        line: usize,
        directive: Directive,
        name_hint: Option<String>,
    ) -> ImportResult<()> {
        match directive {
            Directive::Texture { slot, path } => self.apply_texture(line, slot, path),
            Directive::Global(setting) => self.apply_global(setting),
            Directive::PointCounts(counts) => {
                log::info!(
                    "POINT_COUNTS {} {} {} {}",
                    counts.vertices,
                    counts.lines,
                    counts.lights,
                    counts.indices
                );
                self.declared_counts = Some((line, counts));
            }

            Directive::Vertex(vertex) => self.scene.vertices.push(vertex),
            Directive::Index(index) => {
                if self.check_index(line, "IDX", index) {
                    self.scene.indices.push(index);
                }
            }
            Directive::Index10(indices) => {
                if indices.iter().all(|&i| self.check_index(line, "IDX10", i)) {
                    self.scene.indices.extend_from_slice(&indices);
                }
            }
            Directive::Tris { offset, count } => self.add_batch(line, offset, count, name_hint),
            Directive::Lod(range) => {
                if !self.open.is_empty() {
                    self.diagnostics.warn(
                        line,
                        Some("ATTR_LOD"),
                        DiagnosticKind::Misplaced,
                        "level of detail starts inside an animation block",
                    );
                }
                self.scene.lods.push(range);
                self.current_lod = Some(self.scene.lods.len() - 1);
                self.state.clear_all();
            }

            Directive::AnimBegin => self.open_block(line, AnimKind::Static, None, name_hint),
            Directive::TransBegin { dataref } => {
                self.open_block(line, AnimKind::Translate, Some(dataref), name_hint)
            }
            Directive::RotateBegin { axis, dataref } => {
                self.open_block(line, AnimKind::Rotate { axis }, Some(dataref), name_hint)
            }
            Directive::AnimEnd => self.close_block(line, DirectiveKind::AnimEnd)?,
            Directive::TransEnd => self.close_block(line, DirectiveKind::TransEnd)?,
            Directive::RotateEnd => self.close_block(line, DirectiveKind::RotateEnd)?,
            Directive::TransKey { value, location } => {
                self.add_key(line, "ANIM_trans_key", value, KeySample::Translation(location))
            }
            Directive::RotateKey { value, degrees } => {
                self.add_key(line, "ANIM_rotate_key", value, KeySample::Rotation(degrees))
            }
            Directive::Visibility {
                kind,
                v1,
                v2,
                dataref,
            } => {
                if let Some(block) = self.innermost(line, kind.keyword()) {
                    block.visibility.push(VisibilityCondition {
                        kind,
                        v1,
                        v2,
                        dataref,
                    });
                }
            }
            Directive::KeyframeLoop(period) => {
                if let Some(block) = self.innermost(line, "ANIM_keyframe_loop") {
                    block.loop_period = Some(period);
                }
            }
            Directive::Trans { from, to, range } => {
                let keys = expand_keys(range.as_ref(), KeySample::Translation(from), KeySample::Translation(to));
                self.add_expanded(line, AnimKind::Translate, range, keys, name_hint);
            }
            Directive::Rotate { axis, r1, r2, range } => {
                let keys = expand_keys(range.as_ref(), KeySample::Rotation(r1), KeySample::Rotation(r2));
                self.add_expanded(line, AnimKind::Rotate { axis }, range, keys, name_hint);
            }

            Directive::SetState { name, value } => {
                if let Some(group) = group_of(name).filter(|g| g.exclusive) {
                    clear_group(&mut self.state, group);
                }
                self.state.set(name, value);
            }
            Directive::ResetState(kind) => {
                if let Some(group) = group_reset_by(kind.keyword()) {
                    clear_group(&mut self.state, group);
                }
            }
            Directive::Manip { kind, value } => {
                if let Some(group) = group_of(kind.keyword()) {
                    clear_group(&mut self.state, group);
                }
                self.state.set(kind.keyword(), value);
            }
            Directive::Modifier { kind, value } => {
                if !self.has_manipulator() {
                    self.diagnostics.warn(
                        line,
                        Some(kind.keyword()),
                        DiagnosticKind::Misplaced,
                        "modifier has no active manipulator",
                    );
                } else if kind.is_multi_valued() {
                    self.state.append(kind.keyword(), value);
                } else {
                    self.state.set(kind.keyword(), value);
                }
            }

            Directive::LightNamed { name, position } => {
                self.add_light(name, position, LightKind::Named)
            }
            Directive::LightParam {
                name,
                position,
                params,
            } => self.add_light(name, position, LightKind::Param(params)),

            Directive::Unsupported(kind) => self.diagnostics.warn(
                line,
                Some(kind.keyword()),
                DiagnosticKind::Unsupported,
                "directive is not supported yet",
            ),
        }
        Ok(())
    }

    fn apply_texture(&mut self, line: usize, slot: TextureSlot, path: String) {
        let lookup = self.textures.resolve(&path);
        let resolved = lookup.path().map(|p| p.to_path_buf());
        if resolved.is_none() {
            let keyword = match slot {
                TextureSlot::Diffuse => "TEXTURE",
                TextureSlot::Lit => "TEXTURE_LIT",
                TextureSlot::Normal => "TEXTURE_NORMAL",
            };
            self.diagnostics.warn(
                line,
                Some(keyword),
                DiagnosticKind::MissingTexture,
                format!("'{}' does not exist and no fallback was found", path),
            );
        }

        let options = &mut self.scene.options;
        let textures = &mut self.scene.textures;
        match slot {
            TextureSlot::Diffuse => {
                options.texture = Some(path);
                if resolved.is_some() {
                    self.scene.material_name = Some(material_name(&self.scene.name));
                }
                textures.diffuse = resolved;
            }
            TextureSlot::Lit => {
                options.texture_lit = Some(path);
                textures.lit = resolved;
            }
            TextureSlot::Normal => {
                options.texture_normal = Some(path);
                textures.normal = resolved;
            }
        }
    }

    fn apply_global(&mut self, setting: GlobalSetting) {
        let options = &mut self.scene.options;
        match setting {
            GlobalSetting::NormalMetalness => options.normal_metalness = true,
            GlobalSetting::BlendGlass => options.blend_glass = true,
            GlobalSetting::Luminance(value) => options.luminance = Some(value),
            GlobalSetting::SlungLoadWeight(weight) => options.slung_load_weight = weight,
            GlobalSetting::CockpitRegion(region) => options.cockpit_regions.push(region),
            GlobalSetting::NoBlend(ratio) => options.blend = BlendMode::Off(ratio),
            GlobalSetting::ShadowBlend => options.blend = BlendMode::Shadow,
            GlobalSetting::Specular(value) => options.specular = Some(value),
            GlobalSetting::NoShadow => options.shadow = false,
            GlobalSetting::SlopeLimit(limit) => options.slope_limit = Some(limit),
            GlobalSetting::Tilted => options.tilted = true,
            GlobalSetting::RequireWet => options.require_surface = RequireSurface::Wet,
            GlobalSetting::RequireDry => options.require_surface = RequireSurface::Dry,
            GlobalSetting::CockpitLit => options.cockpit_lit = true,
        }
    }

    fn check_index(&mut self, line: usize, keyword: &str, index: i32) -> bool {
        let vertex_count = self.scene.vertices.len();
        if index >= 0 && index as usize >= vertex_count {
            self.diagnostics.warn(
                line,
                Some(keyword),
                DiagnosticKind::OutOfRange,
                format!("index {} is past the vertex table ({} vertices)", index, vertex_count),
            );
            return false;
        }
        true
    }

    fn add_batch(&mut self, line: usize, offset: usize, count: usize, name_hint: Option<String>) {
        let available = self.scene.indices.len();
        if offset.checked_add(count).map_or(true, |end| end > available) {
            self.diagnostics.warn(
                line,
                Some("TRIS"),
                DiagnosticKind::OutOfRange,
                format!(
                    "range {}+{} exceeds the index table ({} indices)",
                    offset, count, available
                ),
            );
            return;
        }
        if count % 3 != 0 {
            log::debug!("TRIS at line {} draws {} indices, not a multiple of 3", line, count);
        }

        let index = self.scene.batches.len();
        self.scene.batches.push(TriangleBatch {
            offset,
            count,
            name_hint,
            state: self.state.clone(),
            lod: self.current_lod,
            line,
        });
        self.push_item(NodeItem::Batch(index));
    }

    fn add_light(&mut self, name: String, position: DVec3, kind: LightKind) {
        let index = self.scene.lights.len();
        self.scene.lights.push(Light {
            name,
            position,
            kind,
            lod: self.current_lod,
        });
        self.push_item(NodeItem::Light(index));
    }

    fn has_manipulator(&self) -> bool {
        state::manipulator_names()
            .iter()
            .any(|name| self.state.is_set(name))
    }

    fn push_item(&mut self, item: NodeItem) {
        match self.open.last_mut() {
            Some(node) => node.items.push(item),
            None => self.scene.root.items.push(item),
        }
    }

    fn new_block(
        &self,
        line: usize,
        kind: AnimKind,
        dataref: Option<String>,
        name_hint: Option<String>,
    ) -> AnimationBlock {
        let mut block = AnimationBlock::new(kind, dataref, line);
        block.name_hint = name_hint;
        block.lod = self.current_lod;
        block
    }

    fn open_block(
        &mut self,
        line: usize,
        kind: AnimKind,
        dataref: Option<String>,
        name_hint: Option<String>,
    ) {
        let block = self.new_block(line, kind, dataref, name_hint);
        log::debug!("{} at line {} (depth {})", kind.begin_keyword(), line, self.open.len() + 1);
        self.open.push(SceneNode::new(block));
    }

    /// Pop the innermost block; it must be the one `end` closes.
    fn close_block(&mut self, line: usize, end: DirectiveKind) -> ImportResult<()> {
        let node = self.open.pop().ok_or(ImportError::UnmatchedEnd {
            line,
            keyword: end.keyword(),
        })?;

        if let Some(block) = &node.block {
            if block.kind.end_keyword() != end.keyword() {
                return Err(ImportError::MismatchedEnd {
                    line,
                    keyword: end.keyword(),
                    open: block.kind.begin_keyword(),
                    open_line: block.line,
                });
            }
        }
        self.push_item(NodeItem::Node(node));
        Ok(())
    }

    fn innermost(&mut self, line: usize, keyword: &str) -> Option<&mut AnimationBlock> {
        if self.open.is_empty() {
            self.diagnostics.warn(
                line,
                Some(keyword),
                DiagnosticKind::Misplaced,
                "no animation block is open",
            );
            return None;
        }
        self.open.last_mut().and_then(|node| node.block.as_mut())
    }

    fn add_key(&mut self, line: usize, keyword: &str, value: f64, sample: KeySample) {
        let matches = match self.open.last().and_then(|n| n.block.as_ref()) {
            Some(block) => matches!(
                (&block.kind, &sample),
                (AnimKind::Translate, KeySample::Translation(_))
                    | (AnimKind::Rotate { .. }, KeySample::Rotation(_))
            ),
            None => false,
        };
        if !matches {
            self.diagnostics.warn(
                line,
                Some(keyword),
                DiagnosticKind::Misplaced,
                "key is outside a matching keyframe table",
            );
            return;
        }
        if let Some(block) = self.open.last_mut().and_then(|n| n.block.as_mut()) {
            block.keyframes.push(Keyframe { value, sample });
        }
    }

    /// Attach an already-closed block for a deprecated single-line animation.
    fn add_expanded(
        &mut self,
        line: usize,
        kind: AnimKind,
        range: Option<(f64, f64, String)>,
        keyframes: Vec<Keyframe>,
        name_hint: Option<String>,
    ) {
        let dataref = range
            .map(|(_, _, dataref)| dataref)
            .unwrap_or_else(|| PLACEHOLDER_DATAREF.to_string());
        let mut block = self.new_block(line, kind, Some(dataref), name_hint);
        block.keyframes = keyframes;
        self.push_item(NodeItem::Node(SceneNode::new(block)));
    }

    /// Finish the stream. With `stopped`, open blocks are closed with a warning each.
    pub fn finalize(mut self, stopped: bool) -> ImportResult<(ObjScene, Diagnostics)> {
        while let Some(node) = self.open.pop() {
            let (keyword, open_line) = node
                .block
                .as_ref()
                .map(|b| (b.kind.begin_keyword(), b.line))
                .unwrap_or(("ANIM_begin", 0));
            if !stopped {
                return Err(ImportError::UnclosedBlock {
                    line: open_line,
                    keyword,
                });
            }
            self.diagnostics.warn(
                open_line,
                Some(keyword),
                DiagnosticKind::Misplaced,
                "block still open at STOP, closed automatically",
            );
            self.push_item(NodeItem::Node(node));
        }

        if let Some((line, declared)) = self.declared_counts {
            let actual = self.scene.point_counts();
            if declared != actual {
                self.diagnostics.info(
                    line,
                    Some("POINT_COUNTS"),
                    DiagnosticKind::CountMismatch,
                    format!(
                        "declared {} {} {} {}, read {} {} {} {}",
                        declared.vertices,
                        declared.lines,
                        declared.lights,
                        declared.indices,
                        actual.vertices,
                        actual.lines,
                        actual.lights,
                        actual.indices
                    ),
                );
            }
        }

        log::debug!(
            "Built {} batches, {} lights, {} LODs, depth {}",
            self.scene.batches.len(),
            self.scene.lights.len(),
            self.scene.lods.len(),
            self.scene.depth()
        );
        Ok((self.scene, self.diagnostics))
    }
}

/// Keys for a deprecated single-line animation.
///
/// Without a range both samples sit at dataref value 0.
fn expand_keys(range: Option<&(f64, f64, String)>, first: KeySample, second: KeySample) -> Vec<Keyframe> {
    let (v1, v2) = range.map_or((0.0, 0.0), |(v1, v2, _)| (*v1, *v2));
    vec![
        Keyframe {
            value: v1,
            sample: first,
        },
        Keyframe {
            value: v2,
            sample: second,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Vertex;
    use crate::scene::VisibilityKind;
    use crate::obj8::types::ManipKind;
    use obj8_math::DVec2;

    fn builder_with_triangle() -> CommandBuilder {
        let mut builder = CommandBuilder::new("test", None);
        for _ in 0..3 {
            builder
                .apply(1, Directive::Vertex(Vertex::new(DVec3::ZERO, DVec3::Z, DVec2::ZERO)), None)
                .unwrap();
        }
        for i in 0..3 {
            builder.apply(2, Directive::Index(i), None).unwrap();
        }
        builder
    }

    fn manip(kind: ManipKind) -> Directive {
        Directive::Manip {
            kind,
            value: AttrValue::List(vec![AttrValue::text("hand"), AttrValue::text("sim/cmd")]),
        }
    }

    #[test]
    fn test_tris_snapshots_state() {
        let mut builder = builder_with_triangle();
        builder
            .apply(
                3,
                Directive::SetState {
                    name: "ATTR_draw_disable",
                    value: AttrValue::Flag,
                },
                None,
            )
            .unwrap();
        builder
            .apply(4, Directive::Tris { offset: 0, count: 3 }, Some("Tri".into()))
            .unwrap();
        builder
            .apply(5, Directive::ResetState(DirectiveKind::DrawEnable), None)
            .unwrap();

        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(scene.batches.len(), 1);
        assert_eq!(scene.batches[0].name_hint.as_deref(), Some("Tri"));
        assert!(scene.batches[0].state.is_set("ATTR_draw_disable"));
    }

    #[test]
    fn test_index_past_vertex_table_is_skipped() {
        let mut builder = builder_with_triangle();
        builder.apply(9, Directive::Index(3), None).unwrap();
        builder.apply(10, Directive::Index(-1), None).unwrap();
        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert_eq!(scene.indices, vec![0, 1, 2, -1]);
        assert_eq!(diagnostics.count_kind(&DiagnosticKind::OutOfRange), 1);
        assert_eq!(diagnostics.entries()[0].line, 9);
    }

    #[test]
    fn test_tris_past_index_table_is_skipped() {
        let mut builder = builder_with_triangle();
        builder.apply(7, Directive::Tris { offset: 3, count: 3 }, None).unwrap();
        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert!(scene.batches.is_empty());
        assert!(diagnostics.has_warnings());
    }

    #[test]
    fn test_nested_blocks_attach_batches() {
        let mut builder = builder_with_triangle();
        builder.apply(3, Directive::AnimBegin, Some("Door".into())).unwrap();
        builder
            .apply(4, Directive::TransBegin { dataref: "sim/door".into() }, None)
            .unwrap();
        builder
            .apply(5, Directive::TransKey { value: 0.0, location: DVec3::ZERO }, None)
            .unwrap();
        builder
            .apply(6, Directive::TransKey { value: 1.0, location: DVec3::X }, None)
            .unwrap();
        builder.apply(7, Directive::TransEnd, None).unwrap();
        builder.apply(8, Directive::Tris { offset: 0, count: 3 }, None).unwrap();
        builder.apply(9, Directive::AnimEnd, None).unwrap();

        let (scene, _) = builder.finalize(false).unwrap();
        assert_eq!(scene.depth(), 2);

        let outer = match &scene.root.items[0] {
            NodeItem::Node(node) => node,
            other => panic!("unexpected {:?}", other),
        };
        let block = outer.block.as_ref().unwrap();
        assert_eq!(block.name_hint.as_deref(), Some("Door"));
        assert_eq!(outer.batches().collect::<Vec<_>>(), vec![0]);

        let table = outer.children().next().unwrap().block.as_ref().unwrap();
        assert_eq!(table.keyframes.len(), 2);
        assert_eq!(table.dataref.as_deref(), Some("sim/door"));
    }

    #[test]
    fn test_keyframe_loop_sets_innermost_period() {
        let mut builder = CommandBuilder::new("test", None);
        builder.apply(4, Directive::AnimBegin, None).unwrap();
        builder
            .apply(5, Directive::RotateBegin { axis: DVec3::Z, dataref: "sim/fan".into() }, None)
            .unwrap();
        builder
            .apply(6, Directive::RotateKey { value: 0.0, degrees: 0.0 }, None)
            .unwrap();
        builder
            .apply(7, Directive::RotateKey { value: 1.0, degrees: 360.0 }, None)
            .unwrap();
        builder.apply(8, Directive::KeyframeLoop(2.5), None).unwrap();
        builder.apply(9, Directive::RotateEnd, None).unwrap();
        builder.apply(10, Directive::AnimEnd, None).unwrap();

        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert!(!diagnostics.has_warnings());
        let outer = scene.root.children().next().unwrap();
        assert_eq!(outer.block.as_ref().unwrap().loop_period, None);
        let table = outer.children().next().unwrap().block.as_ref().unwrap();
        assert_eq!(table.loop_period, Some(2.5));
    }

    #[test]
    fn test_mismatched_end_is_fatal() {
        let mut builder = CommandBuilder::new("test", None);
        builder.apply(4, Directive::AnimBegin, None).unwrap();
        let err = builder.apply(5, Directive::RotateEnd, None).unwrap_err();
        assert!(matches!(err, ImportError::MismatchedEnd { line: 5, open_line: 4, .. }));
    }

    #[test]
    fn test_unmatched_end_is_fatal() {
        let mut builder = CommandBuilder::new("test", None);
        let err = builder.apply(4, Directive::AnimEnd, None).unwrap_err();
        assert!(matches!(err, ImportError::UnmatchedEnd { line: 4, .. }));
    }

    #[test]
    fn test_unclosed_block_at_end_is_fatal() {
        let mut builder = CommandBuilder::new("test", None);
        builder.apply(4, Directive::AnimBegin, None).unwrap();
        assert!(matches!(
            builder.finalize(false),
            Err(ImportError::UnclosedBlock { line: 4, .. })
        ));
    }

    #[test]
    fn test_stop_closes_open_blocks() {
        let mut builder = CommandBuilder::new("test", None);
        builder.apply(4, Directive::AnimBegin, None).unwrap();
        builder.apply(5, Directive::AnimBegin, None).unwrap();
        let (scene, diagnostics) = builder.finalize(true).unwrap();
        assert_eq!(scene.depth(), 2);
        assert_eq!(diagnostics.count_kind(&DiagnosticKind::Misplaced), 2);
    }

    #[test]
    fn test_visibility_needs_open_block() {
        let mut builder = CommandBuilder::new("test", None);
        let hide = Directive::Visibility {
            kind: VisibilityKind::Hide,
            v1: 0.0,
            v2: 1.0,
            dataref: "sim/x".into(),
        };
        builder.apply(4, hide.clone(), None).unwrap();
        builder.apply(5, Directive::AnimBegin, None).unwrap();
        builder.apply(6, hide, None).unwrap();
        builder.apply(7, Directive::AnimEnd, None).unwrap();

        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert_eq!(diagnostics.warning_count(), 1);
        let node = scene.root.children().next().unwrap();
        assert_eq!(node.block.as_ref().unwrap().visibility.len(), 1);
    }

    #[test]
    fn test_deprecated_trans_expands() {
        let mut builder = CommandBuilder::new("test", None);
        builder
            .apply(
                4,
                Directive::Trans {
                    from: DVec3::ZERO,
                    to: DVec3::X,
                    range: Some((0.0, 1.0, "sim/x".into())),
                },
                Some("Slide".into()),
            )
            .unwrap();
        builder
            .apply(
                5,
                Directive::Rotate {
                    axis: DVec3::Z,
                    r1: 0.0,
                    r2: 90.0,
                    range: None,
                },
                None,
            )
            .unwrap();

        let (scene, _) = builder.finalize(false).unwrap();
        let blocks: Vec<_> = scene
            .root
            .children()
            .map(|n| n.block.as_ref().unwrap())
            .collect();
        assert_eq!(blocks[0].keyframes.len(), 2);
        assert_eq!(blocks[0].name_hint.as_deref(), Some("Slide"));
        assert_eq!(blocks[1].dataref.as_deref(), Some(PLACEHOLDER_DATAREF));
        let rotation: Vec<_> = blocks[1]
            .keyframes
            .iter()
            .map(|k| (k.value, k.sample))
            .collect();
        assert_eq!(
            rotation,
            vec![
                (0.0, KeySample::Rotation(0.0)),
                (0.0, KeySample::Rotation(90.0)),
            ]
        );
    }

    #[test]
    fn test_manipulators_are_exclusive() {
        let mut builder = builder_with_triangle();
        builder.apply(3, manip(ManipKind::Command), None).unwrap();
        builder.apply(4, manip(ManipKind::CommandKnob2), None).unwrap();
        builder.apply(5, Directive::Tris { offset: 0, count: 3 }, None).unwrap();

        let (scene, _) = builder.finalize(false).unwrap();
        let state = &scene.batches[0].state;
        assert!(!state.is_set("ATTR_manip_command"));
        assert!(state.is_set("ATTR_manip_command_knob2"));
    }

    #[test]
    fn test_modifier_needs_manipulator() {
        use crate::obj8::types::ModifierKind;

        let wheel = Directive::Modifier {
            kind: ModifierKind::Wheel,
            value: AttrValue::List(vec![AttrValue::Float(0.5)]),
        };
        let mut builder = builder_with_triangle();
        builder.apply(3, wheel.clone(), None).unwrap();
        builder.apply(4, manip(ManipKind::Command), None).unwrap();
        builder.apply(5, wheel, None).unwrap();
        builder.apply(6, Directive::Tris { offset: 0, count: 3 }, None).unwrap();

        let (scene, diagnostics) = builder.finalize(false).unwrap();
        assert_eq!(diagnostics.count_kind(&DiagnosticKind::Misplaced), 1);
        assert!(scene.batches[0].state.is_set("ATTR_manip_wheel"));
    }

    #[test]
    fn test_lod_resets_state() {
        use crate::scene::LodRange;

        let mut builder = builder_with_triangle();
        builder
            .apply(3, Directive::SetState { name: "ATTR_solid_camera", value: AttrValue::Flag }, None)
            .unwrap();
        builder
            .apply(4, Directive::Lod(LodRange { near: 0.0, far: 1000.0 }), None)
            .unwrap();
        builder.apply(5, Directive::Tris { offset: 0, count: 3 }, None).unwrap();

        let (scene, _) = builder.finalize(false).unwrap();
        assert_eq!(scene.lod_count(), 1);
        assert_eq!(scene.batches[0].lod, Some(0));
        assert!(scene.batches[0].state.is_empty());
    }

    #[test]
    fn test_point_counts_mismatch_is_info() {
        let mut builder = builder_with_triangle();
        builder
            .apply(
                4,
                Directive::PointCounts(PointCounts {
                    vertices: 4,
                    lines: 0,
                    lights: 0,
                    indices: 3,
                }),
                None,
            )
            .unwrap();
        let (_, diagnostics) = builder.finalize(false).unwrap();
        assert!(!diagnostics.has_warnings());
        assert_eq!(diagnostics.entries().len(), 1);
    }
}
