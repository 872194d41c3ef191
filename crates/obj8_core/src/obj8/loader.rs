//! High-level OBJ8 import.
//!
//! Checks the three-line header, then feeds every following line through the
//! classifier, the dispatcher and the command builder. Recoverable problems
//! end up in the returned [`Diagnostics`]; structural defects abort with an
//! [`ImportError`] and no scene.

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::header::{LineEnding, FORMAT_KIND, FORMAT_VERSION};
use crate::scene::ObjScene;

use super::builder::CommandBuilder;
use super::classify::{LineClass, LineClassifier};
use super::parser::parse_directive;
use super::types::DirectiveKind;

/// Errors that abort an import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed OBJ header at line {line}: expected '{expected}', found '{found}'")]
    MalformedHeader {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("{keyword} at line {line} has no open block")]
    UnmatchedEnd { line: usize, keyword: &'static str },

    #[error("{keyword} at line {line} does not close {open} opened at line {open_line}")]
    MismatchedEnd {
        line: usize,
        keyword: &'static str,
        open: &'static str,
        open_line: usize,
    },

    #[error("{keyword} opened at line {line} is never closed")]
    UnclosedBlock { line: usize, keyword: &'static str },
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Whether an import saw everything cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ImportStatus {
    /// Whole stream processed, no warnings.
    Complete,
    /// Warnings were recorded or `STOP` ended the stream early.
    Partial,
}

/// A finished import.
#[derive(Debug, Serialize)]
pub struct ImportReport {
    pub scene: ObjScene,
    pub diagnostics: Diagnostics,
    /// Line-ending marker found in the header
    pub line_ending: LineEnding,
    /// Line of the `STOP` directive, if one ended the stream
    pub stopped_at: Option<usize>,
}

impl ImportReport {
    pub fn status(&self) -> ImportStatus {
        if self.stopped_at.is_some() || self.diagnostics.has_warnings() {
            ImportStatus::Partial
        } else {
            ImportStatus::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status() == ImportStatus::Complete
    }
}

/// Import an OBJ8 file. Textures resolve against the file's directory.
///
/// # Example
///
/// ```ignore
/// use obj8_core::obj8::import_obj;
///
/// let report = import_obj("cockpit.obj")?;
/// println!("{} batches, {:?}", report.scene.batch_count(), report.status());
/// ```
pub fn import_obj<P: AsRef<Path>>(path: P) -> ImportResult<ImportReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let base_dir = path.parent().map(|p| p.to_path_buf());
    import_obj_from_str(&content, name, base_dir)
}

/// Import OBJ8 text (useful for testing).
pub fn import_obj_from_str(
    content: &str,
    name: &str,
    base_dir: Option<PathBuf>,
) -> ImportResult<ImportReport> {
    let lines = split_lines(content);
    let line_ending = check_header(&lines)?;

    let mut classifier = LineClassifier::new();
    let mut builder = CommandBuilder::new(name, base_dir);
    let mut stopped_at = None;

    for (i, raw) in lines.iter().enumerate().skip(3) {
        let line_no = i + 1;
        let (keyword, tokens) = match classifier.classify(raw) {
            LineClass::Empty | LineClass::Skipped => continue,
            LineClass::Stop => {
                log::info!("STOP at line {}, ignoring the rest of {}", line_no, name);
                stopped_at = Some(line_no);
                break;
            }
            LineClass::Directive { keyword, tokens } => (keyword, tokens),
        };

        let kind = match DirectiveKind::from_keyword(&keyword) {
            Some(kind) => kind,
            None => {
                builder.diagnostics_mut().warn(
                    line_no,
                    Some(&keyword),
                    DiagnosticKind::UnknownDirective,
                    "directive is not recognised",
                );
                continue;
            }
        };

        let directive = match parse_directive(kind, &tokens) {
            Ok(directive) => directive,
            Err(err) => {
                builder.diagnostics_mut().warn(
                    line_no,
                    Some(kind.keyword()),
                    err.kind(),
                    err.to_string(),
                );
                continue;
            }
        };

        let name_hint = if directive.takes_name_hint() {
            classifier.take_name_hint()
        } else {
            None
        };
        builder.apply(line_no, directive, name_hint)?;
    }

    if stopped_at.is_none() && classifier.is_skipping() {
        log::debug!("{} ends inside a SKIP section", name);
    }

    let (scene, diagnostics) = builder.finalize(stopped_at.is_some())?;
    log::info!(
        "Imported {}: {} vertices, {} batches, {} warnings",
        name,
        scene.vertices.len(),
        scene.batches.len(),
        diagnostics.warning_count()
    );

    Ok(ImportReport {
        scene,
        diagnostics,
        line_ending,
        stopped_at,
    })
}

/// Split on `\n` (with optional `\r`), or on bare `\r` for classic Mac files.
fn split_lines(content: &str) -> Vec<&str> {
    if content.contains('\n') {
        content.lines().collect()
    } else {
        content.split('\r').collect()
    }
}

/// Validate the marker, version and kind lines.
fn check_header(lines: &[&str]) -> ImportResult<LineEnding> {
    let field = |i: usize| lines.get(i).map(|l| l.trim()).unwrap_or("");

    let marker = field(0).trim_start_matches('\u{feff}');
    let line_ending = LineEnding::from_marker(marker).ok_or_else(|| ImportError::MalformedHeader {
        line: 1,
        expected: "A or I",
        found: marker.to_string(),
    })?;

    for (i, expected) in [(1, FORMAT_VERSION), (2, FORMAT_KIND)] {
        if field(i) != expected {
            return Err(ImportError::MalformedHeader {
                line: i + 1,
                expected,
                found: field(i).to_string(),
            });
        }
    }
    Ok(line_ending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const TRIANGLE: &str = "I
800
OBJ

POINT_COUNTS 3 0 0 3

VT 0 0 0 0 1 0 0 0
VT 1 0 0 0 1 0 1 0
VT 0 0 1 0 1 0 0 1

IDX 0
IDX 1
IDX 2

# name_hint: Floor
TRIS 0 3
";

    #[test]
    fn test_triangle_import() {
        init_logger();
        let report = import_obj_from_str(TRIANGLE, "tri", None).unwrap();
        assert_eq!(report.status(), ImportStatus::Complete);
        assert_eq!(report.line_ending, LineEnding::Unix);

        let scene = &report.scene;
        assert_eq!(scene.vertices.len(), 3);
        assert_eq!(scene.batches.len(), 1);
        assert_eq!(scene.batches[0].offset, 0);
        assert_eq!(scene.batches[0].count, 3);
        assert_eq!(scene.batches[0].name_hint.as_deref(), Some("Floor"));
        assert_eq!(scene.batch_indices(&scene.batches[0]), &[0, 1, 2]);
        assert_eq!(scene.batch_mesh(0).unwrap().triangle_count(), 1);
    }

    #[test]
    fn test_header_variants() {
        for marker in ["A", "I", "  I  ", "\u{feff}I"] {
            let text = format!("{}\n800\nOBJ\n", marker);
            assert!(import_obj_from_str(&text, "h", None).is_ok(), "marker {:?}", marker);
        }

        for bad in ["X\n800\nOBJ\n", "I\n850\nOBJ\n", "I\n800\nOBJ8\n", "I\n800\n", ""] {
            assert!(
                matches!(
                    import_obj_from_str(bad, "h", None),
                    Err(ImportError::MalformedHeader { .. })
                ),
                "header {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_bad_header_reports_line() {
        match import_obj_from_str("I\n800\nFOO\nVT 0 0 0 0 0 0 0 0\n", "h", None) {
            Err(ImportError::MalformedHeader { line, found, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(found, "FOO");
            }
            other => panic!("unexpected {:?}", other.map(|r| r.status())),
        }
    }

    #[test]
    fn test_skip_parity() {
        for skips in 0..4 {
            let mut text = String::from("I\n800\nOBJ\n");
            for _ in 0..skips {
                text.push_str("SKIP\n");
            }
            text.push_str("VT 0 0 0 0 1 0 0 0\n");
            let report = import_obj_from_str(&text, "skip", None).unwrap();
            let expected = if skips % 2 == 0 { 1 } else { 0 };
            assert_eq!(report.scene.vertices.len(), expected, "{} SKIP lines", skips);
        }
    }

    #[test]
    fn test_stop_is_partial_success() {
        let text = "I\n800\nOBJ\nVT 0 0 0 0 1 0 0 0\nSTOP\nVT 1 1 1 0 1 0 0 0\nANIM_end\n";
        let report = import_obj_from_str(text, "stop", None).unwrap();
        assert_eq!(report.stopped_at, Some(5));
        assert_eq!(report.status(), ImportStatus::Partial);
        assert_eq!(report.scene.vertices.len(), 1);
    }

    #[test]
    fn test_unknown_directive_is_recoverable() {
        let text = format!("{}FOO_BAR 1 2 3\n", TRIANGLE);
        let report = import_obj_from_str(&text, "tri", None).unwrap();
        let baseline = import_obj_from_str(TRIANGLE, "tri", None).unwrap();

        assert_eq!(report.status(), ImportStatus::Partial);
        let warning = report.diagnostics.warnings().next().unwrap();
        assert_eq!(warning.kind, DiagnosticKind::UnknownDirective);
        assert_eq!(warning.directive.as_deref(), Some("FOO_BAR"));
        assert_eq!(warning.line, 17);

        assert_eq!(report.scene.batches, baseline.scene.batches);
        assert_eq!(report.scene.root, baseline.scene.root);
        assert_eq!(report.scene.options, baseline.scene.options);
    }

    #[test]
    fn test_bad_arguments_skip_the_line() {
        let text = "I\n800\nOBJ\nVT 0 0 0 0 1 0 0\nVT 0 0 zero 0 1 0 0 0\nVT 0 0 0 0 1 0 0 0\nIDX -2\n";
        let report = import_obj_from_str(text, "bad", None).unwrap();
        assert_eq!(report.scene.vertices.len(), 1);
        assert!(report.scene.indices.is_empty());

        let kinds: Vec<_> = report.diagnostics.warnings().map(|d| d.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::MissingArgument,
                DiagnosticKind::InvalidNumber,
                DiagnosticKind::OutOfRange,
            ]
        );
        assert!(report.diagnostics.entries()[1].message.contains("'zero'"));
    }

    #[test]
    fn test_nesting_balance() {
        let balanced = "I\n800\nOBJ\nANIM_begin\nANIM_begin\nANIM_end\nANIM_begin\nANIM_begin\nANIM_begin\nANIM_end\nANIM_end\nANIM_end\nANIM_end\n";
        let report = import_obj_from_str(balanced, "n", None).unwrap();
        assert_eq!(report.scene.depth(), 4);

        let unclosed = "I\n800\nOBJ\nANIM_begin\nANIM_begin\nANIM_end\n";
        assert!(matches!(
            import_obj_from_str(unclosed, "n", None),
            Err(ImportError::UnclosedBlock { line: 4, .. })
        ));

        let extra_end = "I\n800\nOBJ\nANIM_begin\nANIM_end\nANIM_end\n";
        assert!(matches!(
            import_obj_from_str(extra_end, "n", None),
            Err(ImportError::UnmatchedEnd { line: 6, .. })
        ));
    }

    #[test]
    fn test_carriage_return_only_lines() {
        let text = "A\r800\rOBJ\rVT 0 0 0 0 1 0 0 0\r";
        let report = import_obj_from_str(text, "mac", None).unwrap();
        assert_eq!(report.line_ending, LineEnding::Apple);
        assert_eq!(report.scene.vertices.len(), 1);
    }

    #[test]
    fn test_texture_fallback_keeps_literal() {
        init_logger();
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("foo.dds"), b"").unwrap();
        let path = dir.path().join("panel.obj");
        fs::write(&path, "I\n800\nOBJ\nTEXTURE foo.png\n").unwrap();

        let report = import_obj(&path).unwrap();
        let scene = &report.scene;
        assert_eq!(scene.name, "panel");
        assert_eq!(scene.textures.diffuse, Some(dir.path().join("foo.dds")));
        assert_eq!(scene.options.texture.as_deref(), Some("foo.png"));
        assert_eq!(scene.material_name.as_deref(), Some("Material_panel"));
        assert_eq!(report.status(), ImportStatus::Complete);

        let header = scene.header(1100).lines();
        assert_eq!(header[0], "TEXTURE\tfoo.png");
    }

    #[test]
    fn test_missing_texture_warns() {
        let dir = tempfile::tempdir().unwrap();
        let text = "I\n800\nOBJ\nTEXTURE_LIT nothing.png\n";
        let report = import_obj_from_str(text, "t", Some(dir.path().to_path_buf())).unwrap();
        assert!(report.scene.textures.lit.is_none());
        assert_eq!(report.diagnostics.count_kind(&DiagnosticKind::MissingTexture), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            import_obj(dir.path().join("absent.obj")),
            Err(ImportError::Io(_))
        ));
    }
}
