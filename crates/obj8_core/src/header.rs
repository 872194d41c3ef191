//! OBJ8 file header: options, attribute registration, and serialization.
//!
//! The header is an [`AttributeTable`] whose slots are registered in a fixed
//! order when the header is created, so output is stable no matter which
//! option was set first. Some attributes belong to a format tier and are only
//! written when the target simulator version reaches it.

use serde::Serialize;

use crate::attribute::{AttrValue, AttributeTable};

/// Format version line that follows the line-ending marker.
pub const FORMAT_VERSION: &str = "800";

/// Format kind line that follows the version.
pub const FORMAT_KIND: &str = "OBJ";

/// Target simulator version used when nothing else is requested.
pub const DEFAULT_TARGET_VERSION: u32 = 1100;

/// Line-ending convention marker on the first line of the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum LineEnding {
    /// `I`: UNIX/DOS line endings.
    #[default]
    Unix,
    /// `A`: classic Mac line endings.
    Apple,
}

impl LineEnding {
    /// Parse the marker line.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "I" => Some(LineEnding::Unix),
            "A" => Some(LineEnding::Apple),
            _ => None,
        }
    }

    /// The marker written on the first line.
    pub fn marker(&self) -> &'static str {
        match self {
            LineEnding::Unix => "I",
            LineEnding::Apple => "A",
        }
    }
}

/// Minimum simulator version an attribute needs before it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FormatTier {
    Base,
    V1000,
    V1010,
    V1100,
}

impl FormatTier {
    pub fn min_version(&self) -> u32 {
        match self {
            FormatTier::Base => 0,
            FormatTier::V1000 => 1000,
            FormatTier::V1010 => 1010,
            FormatTier::V1100 => 1100,
        }
    }

    pub fn enabled_for(&self, version: u32) -> bool {
        version >= self.min_version()
    }
}

/// Header attributes in output order, with their tier.
const HEADER_ATTRIBUTES: &[(&str, FormatTier)] = &[
    ("TEXTURE", FormatTier::Base),
    ("TEXTURE_LIT", FormatTier::Base),
    ("TEXTURE_NORMAL", FormatTier::Base),
    ("NORMAL_METALNESS", FormatTier::V1100),
    ("POINT_COUNTS", FormatTier::Base),
    ("slung_load_weight", FormatTier::Base),
    ("COCKPIT_REGION", FormatTier::Base),
    ("GLOBAL_no_blend", FormatTier::V1000),
    ("GLOBAL_shadow_blend", FormatTier::V1000),
    ("GLOBAL_specular", FormatTier::V1000),
    ("GLOBAL_no_shadow", FormatTier::V1010),
    ("SLOPE_LIMIT", FormatTier::V1000),
    ("TILTED", FormatTier::V1000),
    ("REQUIRE_WET", FormatTier::V1000),
    ("REQUIRE_DRY", FormatTier::V1000),
    ("GLOBAL_cockpit_lit", FormatTier::V1010),
    ("BLEND_GLASS", FormatTier::V1100),
    ("GLOBAL_luminance", FormatTier::V1100),
];

/// Tier of a header attribute; custom attributes are always written.
pub fn header_tier(name: &str) -> FormatTier {
    HEADER_ATTRIBUTES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, tier)| *tier)
        .unwrap_or(FormatTier::Base)
}

/// How the object blends alpha.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub enum BlendMode {
    /// Normal alpha blending (nothing written).
    #[default]
    On,
    /// Alpha test with the given cutoff ratio.
    Off(f64),
    /// Blending only for shadows.
    Shadow,
}

/// Surface the object requires to be placed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum RequireSurface {
    #[default]
    Any,
    Wet,
    Dry,
}

/// Pitch and roll limits for sloped placement, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SlopeLimit {
    pub min_pitch: f64,
    pub max_pitch: f64,
    pub min_roll: f64,
    pub max_roll: f64,
}

/// A panel texture region, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CockpitRegion {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CockpitRegion {
    /// Build a region from its origin and power-of-two size exponents.
    pub fn from_exponents(left: i64, top: i64, width_exp: u32, height_exp: u32) -> Self {
        Self {
            left,
            top,
            right: left + (1i64 << width_exp),
            bottom: top + (1i64 << height_exp),
        }
    }
}

/// A user-supplied attribute appended after all known header attributes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CustomAttribute {
    pub name: String,
    pub value: String,
}

/// Counts written in `POINT_COUNTS`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PointCounts {
    pub vertices: usize,
    pub lines: usize,
    pub lights: usize,
    pub indices: usize,
}

/// Scene-level options the header is collected from.
///
/// Texture fields hold the path exactly as written in the file, relative to
/// the file's directory.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderOptions {
    pub texture: Option<String>,
    pub texture_lit: Option<String>,
    pub texture_normal: Option<String>,
    pub normal_metalness: bool,
    pub blend_glass: bool,
    pub luminance: Option<i64>,
    pub slung_load_weight: f64,
    pub cockpit_regions: Vec<CockpitRegion>,
    pub blend: BlendMode,
    pub specular: Option<f64>,
    pub tilted: bool,
    pub slope_limit: Option<SlopeLimit>,
    pub require_surface: RequireSurface,
    pub shadow: bool,
    pub cockpit_lit: bool,
    pub custom_attributes: Vec<CustomAttribute>,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            texture: None,
            texture_lit: None,
            texture_normal: None,
            normal_metalness: false,
            blend_glass: false,
            luminance: None,
            slung_load_weight: 0.0,
            cockpit_regions: Vec::new(),
            blend: BlendMode::On,
            specular: None,
            tilted: false,
            slope_limit: None,
            require_surface: RequireSurface::Any,
            shadow: true,
            cockpit_lit: false,
            custom_attributes: Vec::new(),
        }
    }
}

/// The header attribute table for one file.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Header {
    /// Target simulator version; attributes above it are not written.
    pub version: u32,
    pub attributes: AttributeTable<AttrValue>,
}

impl Header {
    /// Create an empty header with every known attribute registered.
    pub fn new(version: u32) -> Self {
        let mut attributes = AttributeTable::new();
        for (name, _) in HEADER_ATTRIBUTES {
            attributes.register(name);
        }
        Self { version, attributes }
    }

    /// Fill the header from scene options and geometry counts.
    pub fn collect(options: &HeaderOptions, counts: PointCounts, version: u32) -> Self {
        let mut header = Self::new(version);
        let attrs = &mut header.attributes;

        if let Some(path) = &options.texture {
            attrs.set("TEXTURE", AttrValue::text(path));
        }
        if let Some(path) = &options.texture_lit {
            attrs.set("TEXTURE_LIT", AttrValue::text(path));
        }
        if let Some(path) = &options.texture_normal {
            attrs.set("TEXTURE_NORMAL", AttrValue::text(path));
        }
        if options.normal_metalness {
            attrs.set("NORMAL_METALNESS", AttrValue::Flag);
        }

        attrs.set(
            "POINT_COUNTS",
            AttrValue::List(vec![
                AttrValue::Int(counts.vertices as i64),
                AttrValue::Int(counts.lines as i64),
                AttrValue::Int(counts.lights as i64),
                AttrValue::Int(counts.indices as i64),
            ]),
        );

        if options.slung_load_weight > 0.0 {
            attrs.set("slung_load_weight", AttrValue::Float(options.slung_load_weight));
        }

        for region in &options.cockpit_regions {
            attrs.append(
                "COCKPIT_REGION",
                AttrValue::List(vec![
                    AttrValue::Int(region.left),
                    AttrValue::Int(region.top),
                    AttrValue::Int(region.right),
                    AttrValue::Int(region.bottom),
                ]),
            );
        }

        match options.blend {
            BlendMode::On => {}
            BlendMode::Off(ratio) => attrs.set("GLOBAL_no_blend", AttrValue::Float(ratio)),
            BlendMode::Shadow => attrs.set("GLOBAL_shadow_blend", AttrValue::Flag),
        }

        if let Some(specular) = options.specular {
            attrs.set("GLOBAL_specular", AttrValue::Float(specular));
        }
        if !options.shadow {
            attrs.set("GLOBAL_no_shadow", AttrValue::Flag);
        }
        if let Some(limit) = options.slope_limit {
            attrs.set(
                "SLOPE_LIMIT",
                AttrValue::List(vec![
                    AttrValue::Float(limit.min_pitch),
                    AttrValue::Float(limit.max_pitch),
                    AttrValue::Float(limit.min_roll),
                    AttrValue::Float(limit.max_roll),
                ]),
            );
        }
        if options.tilted {
            attrs.set("TILTED", AttrValue::Flag);
        }
        match options.require_surface {
            RequireSurface::Any => {}
            RequireSurface::Wet => attrs.set("REQUIRE_WET", AttrValue::Flag),
            RequireSurface::Dry => attrs.set("REQUIRE_DRY", AttrValue::Flag),
        }
        if options.cockpit_lit {
            attrs.set("GLOBAL_cockpit_lit", AttrValue::Flag);
        }
        if options.blend_glass {
            attrs.set("BLEND_GLASS", AttrValue::Flag);
        }
        if let Some(luminance) = options.luminance {
            attrs.set("GLOBAL_luminance", AttrValue::Int(luminance));
        }

        for custom in &options.custom_attributes {
            let value = if custom.value.is_empty() {
                AttrValue::Flag
            } else {
                AttrValue::text(custom.value.clone())
            };
            attrs.append(&custom.name, value);
        }

        header
    }

    /// Attribute lines in registration order, skipping tiers above `version`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for attr in self.attributes.iter_set() {
            if !header_tier(&attr.name).enabled_for(self.version) {
                log::debug!(
                    "Skipping {} (needs version {}, target is {})",
                    attr.name,
                    header_tier(&attr.name).min_version(),
                    self.version
                );
                continue;
            }
            for value in &attr.values {
                lines.push(crate::attribute::directive_line(&attr.name, value));
            }
        }
        lines
    }

    /// Render the full header block: marker, version, kind, blank line, attributes.
    pub fn write(&self, line_ending: LineEnding) -> String {
        let mut out = String::new();
        out.push_str(line_ending.marker());
        out.push('\n');
        out.push_str(FORMAT_VERSION);
        out.push('\n');
        out.push_str(FORMAT_KIND);
        out.push_str("\n\n");
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}
