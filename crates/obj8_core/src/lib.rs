//! OBJ8 Core - scene model and directive-stream import/export for X-Plane objects.
//!
//! This crate provides:
//!
//! - **Scene types**: `ObjScene`, `SceneNode`, `TriangleBatch`, `AnimationBlock`
//! - **Attribute tables**: ordered, resettable header and render-state attributes
//! - **OBJ8 support**: tolerant line-by-line import and a deterministic writer
//!
//! # Example
//!
//! ```ignore
//! use obj8_core::obj8::import_obj;
//!
//! let report = import_obj("cockpit.obj")?;
//! println!("Loaded {} batches, {} warnings",
//!     report.scene.batch_count(),
//!     report.diagnostics.warning_count());
//! ```

pub mod attribute;
pub mod diagnostics;
pub mod header;
pub mod mesh;
pub mod obj8;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use attribute::{AttrValue, AttributeTable};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use header::{Header, HeaderOptions, LineEnding};
pub use mesh::{Mesh, Vertex};
pub use obj8::{
    export_obj, import_obj, import_obj_from_str, write_obj, ExportOptions, ImportError,
    ImportReport, ImportStatus,
};
pub use scene::{AnimationBlock, NodeItem, ObjScene, SceneNode, SceneSink, TriangleBatch};
