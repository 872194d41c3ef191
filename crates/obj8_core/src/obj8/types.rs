//! Directive table and coerced directive values.
//!
//! [`DirectiveKind`] is the closed whitelist of keywords the importer
//! dispatches. [`Directive`] is one line after argument coercion, ready for
//! the command builder.

use obj8_math::DVec3;
use serde::Serialize;

use crate::attribute::AttrValue;
use crate::header::{CockpitRegion, PointCounts, SlopeLimit};
use crate::mesh::Vertex;
use crate::scene::{LodRange, VisibilityKind};

/// Handler family a directive belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DirectiveFamily {
    Texture,
    Header,
    Geometry,
    Animation,
    RenderState,
    Cockpit,
    Manipulator,
    Light,
    Diagnostic,
}

/// One field of a manipulator signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManipField {
    Cursor,
    Float,
    Dataref,
    Command,
}

use ManipField::{Command as C, Cursor as K, Dataref as D, Float as F};

/// Manipulator kinds. Each takes a fixed signature followed by a tooltip tail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ManipKind {
    DragXy,
    DragAxis,
    Command,
    CommandAxis,
    Noop,
    Push,
    Radio,
    Toggle,
    Delta,
    Wrap,
    DragAxisPix,
    CommandKnob,
    CommandKnob2,
    CommandSwitchUpDown,
    CommandSwitchUpDown2,
    CommandSwitchLeftRight,
    CommandSwitchLeftRight2,
    AxisKnob,
    AxisSwitchUpDown,
    AxisSwitchLeftRight,
    DragRotate,
}

impl ManipKind {
    pub const ALL: [ManipKind; 21] = [
        ManipKind::DragXy,
        ManipKind::DragAxis,
        ManipKind::Command,
        ManipKind::CommandAxis,
        ManipKind::Noop,
        ManipKind::Push,
        ManipKind::Radio,
        ManipKind::Toggle,
        ManipKind::Delta,
        ManipKind::Wrap,
        ManipKind::DragAxisPix,
        ManipKind::CommandKnob,
        ManipKind::CommandKnob2,
        ManipKind::CommandSwitchUpDown,
        ManipKind::CommandSwitchUpDown2,
        ManipKind::CommandSwitchLeftRight,
        ManipKind::CommandSwitchLeftRight2,
        ManipKind::AxisKnob,
        ManipKind::AxisSwitchUpDown,
        ManipKind::AxisSwitchLeftRight,
        ManipKind::DragRotate,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ManipKind::DragXy => "ATTR_manip_drag_xy",
            ManipKind::DragAxis => "ATTR_manip_drag_axis",
            ManipKind::Command => "ATTR_manip_command",
            ManipKind::CommandAxis => "ATTR_manip_command_axis",
            ManipKind::Noop => "ATTR_manip_noop",
            ManipKind::Push => "ATTR_manip_push",
            ManipKind::Radio => "ATTR_manip_radio",
            ManipKind::Toggle => "ATTR_manip_toggle",
            ManipKind::Delta => "ATTR_manip_delta",
            ManipKind::Wrap => "ATTR_manip_wrap",
            ManipKind::DragAxisPix => "ATTR_manip_drag_axis_pix",
            ManipKind::CommandKnob => "ATTR_manip_command_knob",
            ManipKind::CommandKnob2 => "ATTR_manip_command_knob2",
            ManipKind::CommandSwitchUpDown => "ATTR_manip_command_switch_up_down",
            ManipKind::CommandSwitchUpDown2 => "ATTR_manip_command_switch_up_down2",
            ManipKind::CommandSwitchLeftRight => "ATTR_manip_command_switch_left_right",
            ManipKind::CommandSwitchLeftRight2 => "ATTR_manip_command_switch_left_right2",
            ManipKind::AxisKnob => "ATTR_manip_axis_knob",
            ManipKind::AxisSwitchUpDown => "ATTR_manip_axis_switch_up_down",
            ManipKind::AxisSwitchLeftRight => "ATTR_manip_axis_switch_left_right",
            ManipKind::DragRotate => "ATTR_manip_drag_rotate",
        }
    }

    /// Fields before the tooltip.
    pub fn signature(&self) -> &'static [ManipField] {
        match self {
            // cursor dx dy v1min v1max v2min v2max dref1 dref2
            ManipKind::DragXy => &[K, F, F, F, F, F, F, D, D],
            // cursor dx dy dz v1 v2 dref
            ManipKind::DragAxis => &[K, F, F, F, F, F, D],
            ManipKind::Command => &[K, C],
            // cursor dx dy dz cmd_pos cmd_neg
            ManipKind::CommandAxis => &[K, F, F, F, C, C],
            ManipKind::Noop => &[],
            // cursor v_down v_up dref
            ManipKind::Push => &[K, F, F, D],
            ManipKind::Radio => &[K, F, D],
            // cursor v_on v_off dref
            ManipKind::Toggle => &[K, F, F, D],
            // cursor v_down v_hold v_min v_max dref
            ManipKind::Delta | ManipKind::Wrap => &[K, F, F, F, F, D],
            // cursor dx step exp v_min v_max dref
            ManipKind::DragAxisPix => &[K, F, F, F, F, F, D],
            ManipKind::CommandKnob
            | ManipKind::CommandSwitchUpDown
            | ManipKind::CommandSwitchLeftRight => &[K, C, C],
            ManipKind::CommandKnob2
            | ManipKind::CommandSwitchUpDown2
            | ManipKind::CommandSwitchLeftRight2 => &[K, C],
            // cursor v_min v_max click hold dref
            ManipKind::AxisKnob
            | ManipKind::AxisSwitchUpDown
            | ManipKind::AxisSwitchLeftRight => &[K, F, F, F, F, D],
            // cursor x y z dx dy dz angle1 angle2 lift v1min v1max v2min v2max dref1 dref2
            ManipKind::DragRotate => &[K, F, F, F, F, F, F, F, F, F, F, F, F, F, D, D],
        }
    }
}

/// Modifiers that refine the active manipulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ModifierKind {
    Wheel,
    AxisDetented,
    AxisDetentRange,
}

impl ModifierKind {
    pub const ALL: [ModifierKind; 3] = [
        ModifierKind::Wheel,
        ModifierKind::AxisDetented,
        ModifierKind::AxisDetentRange,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            ModifierKind::Wheel => "ATTR_manip_wheel",
            ModifierKind::AxisDetented => "ATTR_axis_detented",
            ModifierKind::AxisDetentRange => "ATTR_axis_detent_range",
        }
    }

    pub fn signature(&self) -> &'static [ManipField] {
        match self {
            ModifierKind::Wheel => &[F],
            // dx dy dz v1 v2 dref
            ModifierKind::AxisDetented => &[F, F, F, F, F, D],
            // start end height
            ModifierKind::AxisDetentRange => &[F, F, F],
        }
    }

    /// Whether repeated lines accumulate instead of replacing.
    pub fn is_multi_valued(&self) -> bool {
        matches!(self, ModifierKind::AxisDetentRange)
    }
}

/// Which texture slot a texture directive fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TextureSlot {
    Diffuse,
    Lit,
    Normal,
}

/// Every keyword the dispatcher recognises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DirectiveKind {
    Texture(TextureSlot),
    NormalMetalness,
    BlendGlass,
    GlobalLuminance,
    SlungLoadWeight,
    CockpitRegion,
    GlobalNoBlend,
    GlobalShadowBlend,
    GlobalSpecular,
    GlobalNoShadow,
    SlopeLimit,
    Tilted,
    RequireWet,
    RequireDry,
    GlobalCockpitLit,
    PointCounts,
    Vt,
    Idx,
    Idx10,
    Tris,
    Lod,
    AnimBegin,
    AnimEnd,
    TransBegin,
    TransKey,
    TransEnd,
    RotateBegin,
    RotateKey,
    RotateEnd,
    Hide,
    Show,
    KeyframeLoop,
    Trans,
    Rotate,
    LightLevel,
    LightLevelReset,
    DrawDisable,
    DrawEnable,
    SolidCamera,
    NoSolidCamera,
    Cockpit,
    CockpitLitOnly,
    CockpitDevice,
    NoCockpit,
    CockpitRegionAttr,
    ManipNone,
    Manip(ManipKind),
    Modifier(ModifierKind),
    ManipKeyframe,
    LightNamed,
    LightParam,
}

impl DirectiveKind {
    const FIXED: [DirectiveKind; 51] = [
        DirectiveKind::Texture(TextureSlot::Diffuse),
        DirectiveKind::Texture(TextureSlot::Lit),
        DirectiveKind::Texture(TextureSlot::Normal),
        DirectiveKind::NormalMetalness,
        DirectiveKind::BlendGlass,
        DirectiveKind::GlobalLuminance,
        DirectiveKind::SlungLoadWeight,
        DirectiveKind::CockpitRegion,
        DirectiveKind::GlobalNoBlend,
        DirectiveKind::GlobalShadowBlend,
        DirectiveKind::GlobalSpecular,
        DirectiveKind::GlobalNoShadow,
        DirectiveKind::SlopeLimit,
        DirectiveKind::Tilted,
        DirectiveKind::RequireWet,
        DirectiveKind::RequireDry,
        DirectiveKind::GlobalCockpitLit,
        DirectiveKind::PointCounts,
        DirectiveKind::Vt,
        DirectiveKind::Idx,
        DirectiveKind::Idx10,
        DirectiveKind::Tris,
        DirectiveKind::Lod,
        DirectiveKind::AnimBegin,
        DirectiveKind::AnimEnd,
        DirectiveKind::TransBegin,
        DirectiveKind::TransKey,
        DirectiveKind::TransEnd,
        DirectiveKind::RotateBegin,
        DirectiveKind::RotateKey,
        DirectiveKind::RotateEnd,
        DirectiveKind::Hide,
        DirectiveKind::Show,
        DirectiveKind::KeyframeLoop,
        DirectiveKind::Trans,
        DirectiveKind::Rotate,
        DirectiveKind::LightLevel,
        DirectiveKind::LightLevelReset,
        DirectiveKind::DrawDisable,
        DirectiveKind::DrawEnable,
        DirectiveKind::SolidCamera,
        DirectiveKind::NoSolidCamera,
        DirectiveKind::Cockpit,
        DirectiveKind::CockpitLitOnly,
        DirectiveKind::CockpitDevice,
        DirectiveKind::NoCockpit,
        DirectiveKind::CockpitRegionAttr,
        DirectiveKind::ManipNone,
        DirectiveKind::ManipKeyframe,
        DirectiveKind::LightNamed,
        DirectiveKind::LightParam,
    ];

    /// Look up a keyword in the whitelist.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::FIXED
            .iter()
            .copied()
            .chain(ManipKind::ALL.iter().map(|&k| DirectiveKind::Manip(k)))
            .chain(ModifierKind::ALL.iter().map(|&k| DirectiveKind::Modifier(k)))
            .find(|kind| kind.keyword() == keyword)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            DirectiveKind::Texture(TextureSlot::Diffuse) => "TEXTURE",
            DirectiveKind::Texture(TextureSlot::Lit) => "TEXTURE_LIT",
            DirectiveKind::Texture(TextureSlot::Normal) => "TEXTURE_NORMAL",
            DirectiveKind::NormalMetalness => "NORMAL_METALNESS",
            DirectiveKind::BlendGlass => "BLEND_GLASS",
            DirectiveKind::GlobalLuminance => "GLOBAL_luminance",
            DirectiveKind::SlungLoadWeight => "slung_load_weight",
            DirectiveKind::CockpitRegion => "COCKPIT_REGION",
            DirectiveKind::GlobalNoBlend => "GLOBAL_no_blend",
            DirectiveKind::GlobalShadowBlend => "GLOBAL_shadow_blend",
            DirectiveKind::GlobalSpecular => "GLOBAL_specular",
            DirectiveKind::GlobalNoShadow => "GLOBAL_no_shadow",
            DirectiveKind::SlopeLimit => "SLOPE_LIMIT",
            DirectiveKind::Tilted => "TILTED",
            DirectiveKind::RequireWet => "REQUIRE_WET",
            DirectiveKind::RequireDry => "REQUIRE_DRY",
            DirectiveKind::GlobalCockpitLit => "GLOBAL_cockpit_lit",
            DirectiveKind::PointCounts => "POINT_COUNTS",
            DirectiveKind::Vt => "VT",
            DirectiveKind::Idx => "IDX",
            DirectiveKind::Idx10 => "IDX10",
            DirectiveKind::Tris => "TRIS",
            DirectiveKind::Lod => "ATTR_LOD",
            DirectiveKind::AnimBegin => "ANIM_begin",
            DirectiveKind::AnimEnd => "ANIM_end",
            DirectiveKind::TransBegin => "ANIM_trans_begin",
            DirectiveKind::TransKey => "ANIM_trans_key",
            DirectiveKind::TransEnd => "ANIM_trans_end",
            DirectiveKind::RotateBegin => "ANIM_rotate_begin",
            DirectiveKind::RotateKey => "ANIM_rotate_key",
            DirectiveKind::RotateEnd => "ANIM_rotate_end",
            DirectiveKind::Hide => "ANIM_hide",
            DirectiveKind::Show => "ANIM_show",
            DirectiveKind::KeyframeLoop => "ANIM_keyframe_loop",
            DirectiveKind::Trans => "ANIM_trans",
            DirectiveKind::Rotate => "ANIM_rotate",
            DirectiveKind::LightLevel => "ATTR_light_level",
            DirectiveKind::LightLevelReset => "ATTR_light_level_reset",
            DirectiveKind::DrawDisable => "ATTR_draw_disable",
            DirectiveKind::DrawEnable => "ATTR_draw_enable",
            DirectiveKind::SolidCamera => "ATTR_solid_camera",
            DirectiveKind::NoSolidCamera => "ATTR_no_solid_camera",
            DirectiveKind::Cockpit => "ATTR_cockpit",
            DirectiveKind::CockpitLitOnly => "ATTR_cockpit_lit_only",
            DirectiveKind::CockpitDevice => "ATTR_cockpit_device",
            DirectiveKind::NoCockpit => "ATTR_no_cockpit",
            DirectiveKind::CockpitRegionAttr => "ATTR_cockpit_region",
            DirectiveKind::ManipNone => "ATTR_manip_none",
            DirectiveKind::Manip(kind) => kind.keyword(),
            DirectiveKind::Modifier(kind) => kind.keyword(),
            DirectiveKind::ManipKeyframe => "ATTR_manip_keyframe",
            DirectiveKind::LightNamed => "LIGHT_NAMED",
            DirectiveKind::LightParam => "LIGHT_PARAM",
        }
    }

    pub fn family(&self) -> DirectiveFamily {
        match self {
            DirectiveKind::Texture(_) => DirectiveFamily::Texture,
            DirectiveKind::NormalMetalness
            | DirectiveKind::BlendGlass
            | DirectiveKind::GlobalLuminance
            | DirectiveKind::SlungLoadWeight
            | DirectiveKind::CockpitRegion
            | DirectiveKind::GlobalNoBlend
            | DirectiveKind::GlobalShadowBlend
            | DirectiveKind::GlobalSpecular
            | DirectiveKind::GlobalNoShadow
            | DirectiveKind::SlopeLimit
            | DirectiveKind::Tilted
            | DirectiveKind::RequireWet
            | DirectiveKind::RequireDry
            | DirectiveKind::GlobalCockpitLit => DirectiveFamily::Header,
            DirectiveKind::PointCounts => DirectiveFamily::Diagnostic,
            DirectiveKind::Vt
            | DirectiveKind::Idx
            | DirectiveKind::Idx10
            | DirectiveKind::Tris
            | DirectiveKind::Lod => DirectiveFamily::Geometry,
            DirectiveKind::AnimBegin
            | DirectiveKind::AnimEnd
            | DirectiveKind::TransBegin
            | DirectiveKind::TransKey
            | DirectiveKind::TransEnd
            | DirectiveKind::RotateBegin
            | DirectiveKind::RotateKey
            | DirectiveKind::RotateEnd
            | DirectiveKind::Hide
            | DirectiveKind::Show
            | DirectiveKind::KeyframeLoop
            | DirectiveKind::Trans
            | DirectiveKind::Rotate => DirectiveFamily::Animation,
            DirectiveKind::LightLevel
            | DirectiveKind::LightLevelReset
            | DirectiveKind::DrawDisable
            | DirectiveKind::DrawEnable
            | DirectiveKind::SolidCamera
            | DirectiveKind::NoSolidCamera => DirectiveFamily::RenderState,
            DirectiveKind::Cockpit
            | DirectiveKind::CockpitLitOnly
            | DirectiveKind::CockpitDevice
            | DirectiveKind::NoCockpit
            | DirectiveKind::CockpitRegionAttr => DirectiveFamily::Cockpit,
            DirectiveKind::ManipNone
            | DirectiveKind::Manip(_)
            | DirectiveKind::Modifier(_)
            | DirectiveKind::ManipKeyframe => DirectiveFamily::Manipulator,
            DirectiveKind::LightNamed | DirectiveKind::LightParam => DirectiveFamily::Light,
        }
    }
}

/// Header-level settings carried by global directives.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum GlobalSetting {
    NormalMetalness,
    BlendGlass,
    Luminance(i64),
    SlungLoadWeight(f64),
    CockpitRegion(CockpitRegion),
    NoBlend(f64),
    ShadowBlend,
    Specular(f64),
    NoShadow,
    SlopeLimit(SlopeLimit),
    Tilted,
    RequireWet,
    RequireDry,
    CockpitLit,
}

/// One directive after argument coercion. Spatial vectors are in scene axes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Directive {
    Texture { slot: TextureSlot, path: String },
    Global(GlobalSetting),
    PointCounts(PointCounts),

    Vertex(Vertex),
    Index(i32),
    Index10([i32; 10]),
    Tris { offset: usize, count: usize },
    Lod(LodRange),

    AnimBegin,
    AnimEnd,
    TransBegin { dataref: String },
    TransKey { value: f64, location: DVec3 },
    TransEnd,
    RotateBegin { axis: DVec3, dataref: String },
    RotateKey { value: f64, degrees: f64 },
    RotateEnd,
    Visibility {
        kind: VisibilityKind,
        v1: f64,
        v2: f64,
        dataref: String,
    },
    KeyframeLoop(f64),
    /// Deprecated single-line translation.
    Trans {
        from: DVec3,
        to: DVec3,
        range: Option<(f64, f64, String)>,
    },
    /// Deprecated single-line rotation.
    Rotate {
        axis: DVec3,
        r1: f64,
        r2: f64,
        range: Option<(f64, f64, String)>,
    },

    /// Render-state attribute set to a value.
    SetState { name: &'static str, value: AttrValue },
    /// Clears the attributes of a render-state group.
    ResetState(DirectiveKind),

    Manip { kind: ManipKind, value: AttrValue },
    Modifier { kind: ModifierKind, value: AttrValue },

    LightNamed { name: String, position: DVec3 },
    LightParam {
        name: String,
        position: DVec3,
        params: String,
    },

    /// Recognised but not supported yet.
    Unsupported(DirectiveKind),
}

impl Directive {
    /// Directives that consume the pending name hint.
    pub fn takes_name_hint(&self) -> bool {
        matches!(
            self,
            Directive::Tris { .. }
                | Directive::AnimBegin
                | Directive::TransBegin { .. }
                | Directive::RotateBegin { .. }
                | Directive::Trans { .. }
                | Directive::Rotate { .. }
        )
    }
}
