//! Directive dispatcher.
//!
//! Maps a whitelisted keyword plus its raw tokens to a typed [`Directive`].
//! All coercion happens here; the builder never sees raw tokens.

use crate::attribute::AttrValue;
use crate::header::{CockpitRegion, PointCounts, SlopeLimit};
use crate::mesh::Vertex;
use crate::scene::{LodRange, VisibilityKind};

use super::args::{ArgResult, Args};
use super::types::*;

/// Coerce the tokens of one directive.
pub fn parse_directive(kind: DirectiveKind, tokens: &[String]) -> ArgResult<Directive> {
    let mut args = Args::new(tokens);
    let directive = match kind.family() {
        DirectiveFamily::Texture | DirectiveFamily::Header => parse_global(kind, &mut args)?,
        DirectiveFamily::Diagnostic => Directive::PointCounts(PointCounts {
            vertices: args.count()?,
            lines: args.count()?,
            lights: args.count()?,
            indices: args.count()?,
        }),
        DirectiveFamily::Geometry => parse_geometry(kind, &mut args)?,
        DirectiveFamily::Animation => parse_animation(kind, &mut args)?,
        DirectiveFamily::RenderState | DirectiveFamily::Cockpit => {
            parse_render_state(kind, &mut args)?
        }
        DirectiveFamily::Manipulator => parse_manipulator(kind, &mut args)?,
        DirectiveFamily::Light => parse_light(kind, &mut args)?,
    };

    if !args.is_empty() {
        log::debug!(
            "{}: ignoring {} trailing token(s)",
            kind.keyword(),
            args.remaining()
        );
    }
    Ok(directive)
}

fn parse_global(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    let setting = match kind {
        DirectiveKind::Texture(slot) => {
            return Ok(Directive::Texture {
                slot,
                path: args.word("texture path")?,
            })
        }
        DirectiveKind::NormalMetalness => GlobalSetting::NormalMetalness,
        DirectiveKind::BlendGlass => GlobalSetting::BlendGlass,
        DirectiveKind::GlobalLuminance => GlobalSetting::Luminance(args.int()?),
        DirectiveKind::SlungLoadWeight => GlobalSetting::SlungLoadWeight(args.float()?),
        DirectiveKind::CockpitRegion => GlobalSetting::CockpitRegion(CockpitRegion {
            left: args.int()?,
            top: args.int()?,
            right: args.int()?,
            bottom: args.int()?,
        }),
        DirectiveKind::GlobalNoBlend => GlobalSetting::NoBlend(args.float()?),
        DirectiveKind::GlobalShadowBlend => GlobalSetting::ShadowBlend,
        DirectiveKind::GlobalSpecular => GlobalSetting::Specular(args.float()?),
        DirectiveKind::GlobalNoShadow => GlobalSetting::NoShadow,
        DirectiveKind::SlopeLimit => GlobalSetting::SlopeLimit(SlopeLimit {
            min_pitch: args.float()?,
            max_pitch: args.float()?,
            min_roll: args.float()?,
            max_roll: args.float()?,
        }),
        DirectiveKind::Tilted => GlobalSetting::Tilted,
        DirectiveKind::RequireWet => GlobalSetting::RequireWet,
        DirectiveKind::RequireDry => GlobalSetting::RequireDry,
        DirectiveKind::GlobalCockpitLit => GlobalSetting::CockpitLit,
        other => return Ok(Directive::Unsupported(other)),
    };
    Ok(Directive::Global(setting))
}

fn parse_geometry(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    Ok(match kind {
        DirectiveKind::Vt => Directive::Vertex(Vertex::new(args.vec3()?, args.vec3()?, args.vec2()?)),
        DirectiveKind::Idx => Directive::Index(args.index()?),
        DirectiveKind::Idx10 => {
            let mut indices = [0i32; 10];
            for slot in indices.iter_mut() {
                *slot = args.index()?;
            }
            Directive::Index10(indices)
        }
        DirectiveKind::Tris => Directive::Tris {
            offset: args.count()?,
            count: args.count()?,
        },
        DirectiveKind::Lod => Directive::Lod(LodRange {
            near: args.float()?,
            far: args.float()?,
        }),
        other => Directive::Unsupported(other),
    })
}

/// `v1 v2 dataref` suffix of the deprecated forms, absent for static offsets.
fn optional_range(args: &mut Args) -> ArgResult<Option<(f64, f64, String)>> {
    if args.is_empty() {
        return Ok(None);
    }
    Ok(Some((args.float()?, args.float()?, args.word("dataref")?)))
}

fn parse_animation(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    Ok(match kind {
        DirectiveKind::AnimBegin => Directive::AnimBegin,
        DirectiveKind::AnimEnd => Directive::AnimEnd,
        DirectiveKind::TransBegin => Directive::TransBegin {
            dataref: args.word("dataref")?,
        },
        DirectiveKind::TransKey => Directive::TransKey {
            value: args.float()?,
            location: args.vec3()?,
        },
        DirectiveKind::TransEnd => Directive::TransEnd,
        DirectiveKind::RotateBegin => Directive::RotateBegin {
            axis: args.vec3()?,
            dataref: args.word("dataref")?,
        },
        DirectiveKind::RotateKey => Directive::RotateKey {
            value: args.float()?,
            degrees: args.float()?,
        },
        DirectiveKind::RotateEnd => Directive::RotateEnd,
        DirectiveKind::Hide | DirectiveKind::Show => Directive::Visibility {
            kind: if kind == DirectiveKind::Hide {
                VisibilityKind::Hide
            } else {
                VisibilityKind::Show
            },
            v1: args.float()?,
            v2: args.float()?,
            dataref: args.word("dataref")?,
        },
        DirectiveKind::KeyframeLoop => Directive::KeyframeLoop(args.float()?),
        DirectiveKind::Trans => Directive::Trans {
            from: args.vec3()?,
            to: args.vec3()?,
            range: optional_range(args)?,
        },
        DirectiveKind::Rotate => Directive::Rotate {
            axis: args.vec3()?,
            r1: args.float()?,
            r2: args.float()?,
            range: optional_range(args)?,
        },
        other => Directive::Unsupported(other),
    })
}

fn parse_render_state(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    let name = kind.keyword();
    Ok(match kind {
        DirectiveKind::LightLevel => Directive::SetState {
            name,
            value: AttrValue::List(vec![
                AttrValue::Float(args.float()?),
                AttrValue::Float(args.float()?),
                AttrValue::Text(args.word("dataref")?),
            ]),
        },
        DirectiveKind::DrawDisable
        | DirectiveKind::SolidCamera
        | DirectiveKind::Cockpit
        | DirectiveKind::CockpitLitOnly => Directive::SetState {
            name,
            value: AttrValue::Flag,
        },
        DirectiveKind::CockpitDevice => Directive::SetState {
            name,
            value: AttrValue::List(vec![
                AttrValue::Text(args.word("device name")?),
                AttrValue::Int(args.int()?),
                AttrValue::Int(args.int()?),
                AttrValue::Int(args.int()?),
            ]),
        },
        DirectiveKind::LightLevelReset
        | DirectiveKind::DrawEnable
        | DirectiveKind::NoSolidCamera
        | DirectiveKind::NoCockpit => Directive::ResetState(kind),
        other => Directive::Unsupported(other),
    })
}

/// Read fields per signature, then the tooltip tail when `with_tooltip`.
fn signature_value(args: &mut Args, signature: &[ManipField], with_tooltip: bool) -> ArgResult<AttrValue> {
    let mut fields = Vec::with_capacity(signature.len() + 1);
    for field in signature {
        let value = match field {
            ManipField::Cursor => AttrValue::Text(args.word("cursor")?),
            ManipField::Float => AttrValue::Float(args.float()?),
            ManipField::Dataref => AttrValue::Text(args.word("dataref")?),
            ManipField::Command => AttrValue::Text(args.word("command")?),
        };
        fields.push(value);
    }
    if with_tooltip {
        let tooltip = args.tail();
        if !tooltip.is_empty() {
            fields.push(AttrValue::Text(tooltip));
        }
    }
    Ok(AttrValue::List(fields))
}

fn parse_manipulator(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    Ok(match kind {
        DirectiveKind::ManipNone => Directive::ResetState(kind),
        DirectiveKind::Manip(manip) => Directive::Manip {
            kind: manip,
            value: signature_value(args, manip.signature(), true)?,
        },
        DirectiveKind::Modifier(modifier) => Directive::Modifier {
            kind: modifier,
            value: signature_value(args, modifier.signature(), false)?,
        },
        other => Directive::Unsupported(other),
    })
}

fn parse_light(kind: DirectiveKind, args: &mut Args) -> ArgResult<Directive> {
    let name = args.word("light name")?;
    let position = args.vec3()?;
    Ok(match kind {
        DirectiveKind::LightParam => Directive::LightParam {
            name,
            position,
            params: args.tail(),
        },
        _ => Directive::LightNamed { name, position },
    })
}
