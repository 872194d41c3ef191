//! OBJ8 directive-stream support.
//!
//! Import runs each line through four stages:
//!
//! 1. [`classify`]: comments, name hints, `SKIP`/`STOP`
//! 2. [`args`]: typed argument reads and axis conversion
//! 3. [`parser`]: keyword whitelist -> [`Directive`]
//! 4. [`builder`]: nesting stack, buffers, batches -> [`ObjScene`](crate::scene::ObjScene)
//!
//! Export is [`write_obj`]: header, vertex and index tables, then the body
//! rebuilt from the node tree.
//!
//! ## Not Yet Supported
//!
//! - Line and custom-light geometry (`VLINE`, `LINES`, `LIGHT_CUSTOM`)
//! - `ATTR_manip_keyframe`, `ATTR_cockpit_region` (reported, not applied)
//! - Material directives (`ATTR_shiny_rat`, `ATTR_hard`, ...)
//!
//! # Example
//!
//! ```ignore
//! use obj8_core::obj8::{import_obj, write_obj, ExportOptions};
//!
//! let report = import_obj("cockpit.obj")?;
//! let text = write_obj(&report.scene, &ExportOptions::default());
//! ```

pub mod args;
pub mod builder;
pub mod classify;
pub mod state;

mod loader;
mod parser;
mod types;
mod writer;

pub use loader::*;
pub use parser::*;
pub use types::*;
pub use writer::*;
