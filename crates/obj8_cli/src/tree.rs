//! Text outline of a scene, built through [`SceneSink`].

use obj8_core::scene::{AnimKind, AnimationBlock, Light, SceneSink, TriangleBatch};
use obj8_core::Mesh;
use obj8_math::format_float;

/// Collects one indented line per node, batch and light.
#[derive(Default)]
pub struct TreePrinter {
    pub out: String,
}

impl TreePrinter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl SceneSink for TreePrinter {
    fn begin_node(&mut self, block: &AnimationBlock, depth: usize) {
        let kind = match block.kind {
            AnimKind::Static => "static".to_string(),
            AnimKind::Translate => "translate".to_string(),
            AnimKind::Rotate { axis } => format!(
                "rotate ({}, {}, {})",
                format_float(axis.x),
                format_float(axis.y),
                format_float(axis.z)
            ),
        };
        let mut text = format!("+ {}", kind);
        if let Some(dataref) = &block.dataref {
            text.push_str(&format!(" [{}]", dataref));
        }
        if !block.keyframes.is_empty() {
            text.push_str(&format!(" {} keys", block.keyframes.len()));
        }
        if let Some(hint) = &block.name_hint {
            text.push_str(&format!(" \"{}\"", hint));
        }
        // Node headers sit at their parent's indent
        self.push(depth.saturating_sub(1), &text);
    }

    fn end_node(&mut self, _block: &AnimationBlock, _depth: usize) {}

    fn batch(&mut self, batch: &TriangleBatch, mesh: Mesh, depth: usize) {
        let mut text = format!(
            "- tris {}+{} ({} triangles, {} vertices)",
            batch.offset,
            batch.count,
            mesh.triangle_count(),
            mesh.vertex_count()
        );
        if let Some(hint) = &batch.name_hint {
            text.push_str(&format!(" \"{}\"", hint));
        }
        self.push(depth, &text);
    }

    fn light(&mut self, light: &Light, depth: usize) {
        self.push(depth, &format!("* light {}", light.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obj8_core::import_obj_from_str;

    #[test]
    fn test_tree_follows_nesting() {
        let content = "I\n800\nOBJ\n\n\
            VT 0 0 0 0 1 0 0 0\nVT 1 0 0 0 1 0 1 0\nVT 0 0 1 0 1 0 0 1\n\
            IDX 0\nIDX 1\nIDX 2\n\
            # name_hint: Base\nTRIS 0 3\n\
            ANIM_begin\n\
            ANIM_trans_begin sim/lever\nANIM_trans_key 0 0 0 0\nANIM_trans_key 1 0 1 0\nANIM_trans_end\n\
            TRIS 0 3\n\
            ANIM_end\n\
            LIGHT_NAMED beacon 0 1 0\n";
        let report = import_obj_from_str(content, "lever", None).unwrap();

        let mut printer = TreePrinter::new();
        report.scene.materialize(&mut printer);

        let lines: Vec<&str> = printer.out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "- tris 0+3 (1 triangles, 3 vertices) \"Base\"",
                "+ static",
                "  + translate [sim/lever] 2 keys",
                "  - tris 0+3 (1 triangles, 3 vertices)",
                "* light beacon",
            ]
        );
    }
}
