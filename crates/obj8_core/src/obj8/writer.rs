//! OBJ8 export.
//!
//! Writes the header, the `VT` table, the index table and then the body,
//! walking the node tree in file order. The body only emits render-state
//! lines where the state differs from the previous batch, so a file that
//! was imported and written once comes back unchanged on the next cycle.

use std::path::Path;

use obj8_math::{format_float, scene_to_obj, DVec3};
use serde::Serialize;

use crate::attribute::{directive_line, AttrValue, AttributeTable};
use crate::header::{LineEnding, DEFAULT_TARGET_VERSION};
use crate::scene::{AnimKind, AnimationBlock, KeySample, LightKind, NodeItem, ObjScene, SceneNode};

use super::builder::PLACEHOLDER_DATAREF;
use super::state::{clear_group, group_matches, render_state_table, STATE_GROUPS};

/// Number of indices on one `IDX10` line.
const IDX10_WIDTH: usize = 10;

/// Serializer settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExportOptions {
    /// Marker written on the first line
    pub line_ending: LineEnding,
    /// Target simulator version; gates tiered header attributes
    pub version: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            line_ending: LineEnding::Unix,
            version: DEFAULT_TARGET_VERSION,
        }
    }
}

/// Render a scene as OBJ8 text.
pub fn write_obj(scene: &ObjScene, options: &ExportOptions) -> String {
    let mut out = scene.header(options.version).write(options.line_ending);

    if !scene.vertices.is_empty() {
        out.push('\n');
        for v in &scene.vertices {
            let p = scene_to_obj(v.position);
            let n = scene_to_obj(v.normal);
            out.push_str(&format!(
                "VT\t{}\t{}\t{}\t{}\n",
                vec3_fields(p),
                vec3_fields(n),
                format_float(v.uv.x),
                format_float(v.uv.y)
            ));
        }
    }

    if !scene.indices.is_empty() {
        out.push('\n');
        for chunk in scene.indices.chunks(IDX10_WIDTH) {
            if chunk.len() == IDX10_WIDTH {
                let row: Vec<String> = chunk.iter().map(|i| i.to_string()).collect();
                out.push_str(&format!("IDX10\t{}\n", row.join(" ")));
            } else {
                for i in chunk {
                    out.push_str(&format!("IDX\t{}\n", i));
                }
            }
        }
    }

    let mut body = BodyWriter::new(scene);
    body.write_items(&scene.root, 0);
    if let Some(last) = scene.lods.len().checked_sub(1) {
        body.enter_lod(Some(last), 0);
    }
    if !body.out.is_empty() {
        out.push('\n');
        out.push_str(&body.out);
    }

    log::debug!(
        "Wrote {}: {} vertices, {} indices, {} batches",
        scene.name,
        scene.vertices.len(),
        scene.indices.len(),
        scene.batches.len()
    );
    out
}

/// Write a scene to disk.
pub fn export_obj<P: AsRef<Path>>(
    scene: &ObjScene,
    path: P,
    options: &ExportOptions,
) -> std::io::Result<()> {
    std::fs::write(path, write_obj(scene, options))
}

/// Tab-separated components of a vector.
fn vec3_fields(v: DVec3) -> String {
    format!(
        "{}\t{}\t{}",
        format_float(v.x),
        format_float(v.y),
        format_float(v.z)
    )
}

struct BodyWriter<'a> {
    scene: &'a ObjScene,
    out: String,
    /// Render state as a reader of `out` would have it
    state: AttributeTable<AttrValue>,
    /// Last level of detail written
    lod: Option<usize>,
}

impl<'a> BodyWriter<'a> {
    fn new(scene: &'a ObjScene) -> Self {
        Self {
            scene,
            out: String::new(),
            state: render_state_table(),
            lod: None,
        }
    }

    /// One directive line; `#` in the text is escaped.
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push('\t');
        }
        self.out.push_str(&text.replace('#', "\\#"));
        self.out.push('\n');
    }

    fn name_hint(&mut self, depth: usize, hint: Option<&str>) {
        if let Some(hint) = hint {
            for _ in 0..depth {
                self.out.push('\t');
            }
            self.out.push_str(&format!("# name_hint: {}\n", hint));
        }
    }

    /// Emit `ATTR_LOD` for every level up to `target`.
    fn enter_lod(&mut self, target: Option<usize>, depth: usize) {
        let Some(target) = target else {
            return;
        };
        while self.lod.map_or(true, |current| current < target) {
            let next = self.lod.map_or(0, |current| current + 1);
            let Some(range) = self.scene.lods.get(next) else {
                return;
            };
            let text = format!("ATTR_LOD\t{}\t{}", format_float(range.near), format_float(range.far));
            self.line(depth, &text);
            self.lod = Some(next);
            self.state = render_state_table();
        }
    }

    /// Bring the written render state in line with a batch's state.
    fn transition(&mut self, target: &AttributeTable<AttrValue>, depth: usize) {
        for group in STATE_GROUPS {
            if group_matches(&self.state, target, group) {
                continue;
            }

            let removed = group
                .members
                .iter()
                .any(|name| self.state.is_set(name) && !target.is_set(name));
            let replaced = group.exclusive && group.members.iter().any(|name| target.is_set(name));
            if removed && !replaced {
                self.line(depth, group.reset);
            }

            clear_group(&mut self.state, group);
            for name in group.members {
                for value in target.values(name) {
                    self.line(depth, &directive_line(name, value));
                    self.state.append(name, value.clone());
                }
            }
        }
    }

    fn write_items(&mut self, node: &SceneNode, depth: usize) {
        let scene = self.scene;
        for item in &node.items {
            match item {
                NodeItem::Batch(index) => {
                    let Some(batch) = scene.batches.get(*index) else {
                        continue;
                    };
                    self.enter_lod(batch.lod, depth);
                    self.transition(&batch.state, depth);
                    self.name_hint(depth, batch.name_hint.as_deref());
                    self.line(depth, &format!("TRIS\t{}\t{}", batch.offset, batch.count));
                }
                NodeItem::Light(index) => {
                    let Some(light) = scene.lights.get(*index) else {
                        continue;
                    };
                    self.enter_lod(light.lod, depth);
                    let position = vec3_fields(scene_to_obj(light.position));
                    let text = match &light.kind {
                        LightKind::Named => format!("LIGHT_NAMED\t{}\t{}", light.name, position),
                        LightKind::Param(params) if params.is_empty() => {
                            format!("LIGHT_PARAM\t{}\t{}", light.name, position)
                        }
                        LightKind::Param(params) => {
                            format!("LIGHT_PARAM\t{}\t{}\t{}", light.name, position, params)
                        }
                    };
                    self.line(depth, &text);
                }
                NodeItem::Node(child) => {
                    if let Some(block) = &child.block {
                        self.enter_lod(block.lod, depth);
                        self.write_block(child, block, depth);
                    }
                }
            }
        }
    }

    fn write_block(&mut self, node: &SceneNode, block: &AnimationBlock, depth: usize) {
        self.name_hint(depth, block.name_hint.as_deref());

        let dataref = block.dataref.as_deref().unwrap_or(PLACEHOLDER_DATAREF);
        let begin = match block.kind {
            AnimKind::Static => block.kind.begin_keyword().to_string(),
            AnimKind::Translate => format!("{}\t{}", block.kind.begin_keyword(), dataref),
            AnimKind::Rotate { axis } => format!(
                "{}\t{}\t{}",
                block.kind.begin_keyword(),
                vec3_fields(scene_to_obj(axis)),
                dataref
            ),
        };
        self.line(depth, &begin);

        let inner = depth + 1;
        for condition in &block.visibility {
            let text = format!(
                "{}\t{}\t{}\t{}",
                condition.kind.keyword(),
                format_float(condition.v1),
                format_float(condition.v2),
                condition.dataref
            );
            self.line(inner, &text);
        }
        for key in &block.keyframes {
            let text = match key.sample {
                KeySample::Translation(location) => format!(
                    "ANIM_trans_key\t{}\t{}",
                    format_float(key.value),
                    vec3_fields(scene_to_obj(location))
                ),
                KeySample::Rotation(degrees) => format!(
                    "ANIM_rotate_key\t{}\t{}",
                    format_float(key.value),
                    format_float(degrees)
                ),
            };
            self.line(inner, &text);
        }
        if let Some(period) = block.loop_period {
            self.line(inner, &format!("ANIM_keyframe_loop\t{}", format_float(period)));
        }

        self.write_items(node, inner);
        self.line(depth, block.kind.end_keyword());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::header::{BlendMode, HeaderOptions};
    use crate::obj8::loader::import_obj_from_str;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Import, write, import again, write again; the two outputs must match.
    fn assert_idempotent(input: &str) -> String {
        let first = import_obj_from_str(input, "first", None).unwrap();
        let written = write_obj(&first.scene, &ExportOptions::default());
        let second = import_obj_from_str(&written, "second", None).unwrap();
        let rewritten = write_obj(&second.scene, &ExportOptions::default());
        assert_eq!(written, rewritten);
        // Texture files do not exist next to in-memory inputs
        assert!(
            second
                .diagnostics
                .warnings()
                .all(|d| d.kind == DiagnosticKind::MissingTexture),
            "{:?}",
            second.diagnostics
        );
        written
    }

    const ANIMATED: &str = "I
800
OBJ

TEXTURE cockpit.png
GLOBAL_specular 0.50
GLOBAL_no_blend 0.5
TILTED
COCKPIT_REGION 0 0 1024 1024
COCKPIT_REGION 1024 0 2048 512
POINT_COUNTS 4 0 1 6

VT 0 0 0 0 1 0 0 0
VT 1 0 0 0 1 0 1 0
VT 1 0 1 0 1 0 1 1
VT 0 0 1 0 1 0 0 1

IDX 0
IDX 1
IDX 2
IDX 0
IDX 2
IDX 3

ATTR_LOD 0 1000
ATTR_light_level 0.25 1 sim/lights/panel
# name_hint: Panel
TRIS 0 3
ATTR_light_level_reset
ATTR_draw_disable
# name_hint: Door
ANIM_begin
	ANIM_hide 0 0.5 sim/door/hidden
	ANIM_trans_begin sim/door/ratio
		ANIM_trans_key 0 0 0 0
		ANIM_trans_key 1 0 0.5 0
	ANIM_trans_end
	ANIM_rotate_begin 0 1 0 sim/door/angle
		ANIM_rotate_key 0 0
		ANIM_rotate_key 1 90
		ANIM_keyframe_loop 2
	ANIM_rotate_end
	ATTR_manip_push hand 1 0 sim/door/open Open the \\# door
	ATTR_manip_wheel 0.1
	TRIS 3 3
ANIM_end
LIGHT_NAMED airplane_beacon 0 2 0
ATTR_LOD 1000 5000
";

    #[test]
    fn test_round_trip_is_idempotent() {
        init_logger();
        let written = assert_idempotent(ANIMATED);

        assert!(written.starts_with("I\n800\nOBJ\n\nTEXTURE\tcockpit.png\nPOINT_COUNTS\t4\t0\t1\t6\n"));
        assert!(written.contains("COCKPIT_REGION\t0\t0\t1024\t1024\nCOCKPIT_REGION\t1024\t0\t2048\t512\n"));
        assert!(written.contains("GLOBAL_specular\t0.5\n"));
        assert!(written.contains("ATTR_LOD\t1000\t5000\n"));
        assert!(written.contains("ATTR_manip_push\thand\t1\t0\tsim/door/open\tOpen the \\# door\n"));
        assert!(written.contains("ATTR_light_level_reset\n"));
    }

    #[test]
    fn test_round_trip_preserves_structure() {
        let first = import_obj_from_str(ANIMATED, "first", None).unwrap();
        let written = write_obj(&first.scene, &ExportOptions::default());
        let second = import_obj_from_str(&written, "second", None).unwrap();

        assert_eq!(first.scene.options, second.scene.options);
        assert_eq!(first.scene.vertices, second.scene.vertices);
        assert_eq!(first.scene.indices, second.scene.indices);
        assert_eq!(first.scene.lods, second.scene.lods);
        assert_eq!(first.scene.lights, second.scene.lights);
        assert_eq!(first.scene.depth(), second.scene.depth());
        let states = |r: &crate::obj8::ImportReport| {
            r.scene.batches.iter().map(|b| b.state.clone()).collect::<Vec<_>>()
        };
        assert_eq!(states(&first), states(&second));
    }

    #[test]
    fn test_vertex_axes_written_back() {
        let text = "I\n800\nOBJ\nVT 1 2 3 0 0 -1 0.5 0.25\n";
        let report = import_obj_from_str(text, "v", None).unwrap();
        let written = write_obj(&report.scene, &ExportOptions::default());
        assert!(written.contains("VT\t1\t2\t3\t0\t0\t-1\t0.5\t0.25\n"));
    }

    #[test]
    fn test_index_rows() {
        let mut text = String::from("I\n800\nOBJ\n");
        for _ in 0..3 {
            text.push_str("VT 0 0 0 0 1 0 0 0\n");
        }
        for i in 0..12 {
            text.push_str(&format!("IDX {}\n", i % 3));
        }
        let report = import_obj_from_str(&text, "i", None).unwrap();
        let written = write_obj(&report.scene, &ExportOptions::default());
        assert!(written.contains("IDX10\t0 1 2 0 1 2 0 1 2 0\nIDX\t1\nIDX\t2\n"));
    }

    #[test]
    fn test_deprecated_forms_written_as_blocks() {
        let text = "I\n800\nOBJ\nANIM_begin\nANIM_rotate 0 1 0 0 90 0 1 sim/x\nANIM_trans 0 0 0 0 1 0\nANIM_end\n";
        let written = assert_idempotent(text);
        assert!(written.contains("ANIM_rotate_begin\t0\t1\t0\tsim/x\n"));
        assert!(written.contains("ANIM_rotate_key\t1\t90\n"));
        assert!(written.contains("ANIM_trans_begin\tnone\n"));
        assert!(!written.contains("ANIM_trans\t"));
    }

    #[test]
    fn test_deprecated_forms_without_range_keep_both_samples() {
        let text = "I\n800\nOBJ\nANIM_begin\nANIM_rotate 0 1 0 0 90\nANIM_trans 0 0 0 1 2 3\nANIM_end\n";
        let written = assert_idempotent(text);
        assert!(written.contains("ANIM_rotate_begin\t0\t1\t0\tnone\n"));
        assert!(written.contains("ANIM_rotate_key\t0\t0\n"));
        assert!(written.contains("ANIM_rotate_key\t0\t90\n"));
        assert!(written.contains("ANIM_trans_key\t0\t0\t0\t0\n"));
        assert!(written.contains("ANIM_trans_key\t0\t1\t2\t3\n"));
    }

    #[test]
    fn test_version_gates_header() {
        let mut scene = ObjScene::new("gated");
        scene.options = HeaderOptions {
            blend: BlendMode::Shadow,
            cockpit_lit: true,
            ..Default::default()
        };
        let old = write_obj(
            &scene,
            &ExportOptions {
                line_ending: LineEnding::Apple,
                version: 900,
            },
        );
        assert_eq!(old, "A\n800\nOBJ\n\nPOINT_COUNTS\t0\t0\t0\t0\n");

        let new = write_obj(&scene, &ExportOptions::default());
        assert!(new.contains("GLOBAL_shadow_blend\n"));
        assert!(new.contains("GLOBAL_cockpit_lit\n"));
    }

    #[test]
    fn test_cockpit_group_switch_needs_no_reset() {
        let text = "I\n800\nOBJ\nVT 0 0 0 0 1 0 0 0\nIDX 0\nIDX 0\nIDX 0\nATTR_cockpit\nTRIS 0 3\nATTR_cockpit_lit_only\nTRIS 0 3\nATTR_no_cockpit\nTRIS 0 3\n";
        let written = assert_idempotent(text);
        let body: Vec<_> = written
            .lines()
            .filter(|l| l.starts_with("ATTR_"))
            .collect();
        assert_eq!(body, vec!["ATTR_cockpit", "ATTR_cockpit_lit_only", "ATTR_no_cockpit"]);
    }
}
