//! Render-state groups.
//!
//! Render-state attributes come in groups that one directive resets
//! together. The builder uses the groups to apply `_reset`-style directives
//! and the writer uses them to decide which reset to emit when an attribute
//! goes away between two batches.

use crate::attribute::{AttrValue, AttributeTable};

/// Attributes cleared together by one reset directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateGroup {
    /// Member attributes in output order
    pub members: &'static [&'static str],
    /// Directive that clears every member
    pub reset: &'static str,
    /// Whether setting one member clears the others
    pub exclusive: bool,
}

/// Manipulator kinds first, then modifiers, so modifiers always follow their manipulator.
const MANIP_MEMBERS: &[&str] = &[
    "ATTR_manip_drag_xy",
    "ATTR_manip_drag_axis",
    "ATTR_manip_command",
    "ATTR_manip_command_axis",
    "ATTR_manip_noop",
    "ATTR_manip_push",
    "ATTR_manip_radio",
    "ATTR_manip_toggle",
    "ATTR_manip_delta",
    "ATTR_manip_wrap",
    "ATTR_manip_drag_axis_pix",
    "ATTR_manip_command_knob",
    "ATTR_manip_command_knob2",
    "ATTR_manip_command_switch_up_down",
    "ATTR_manip_command_switch_up_down2",
    "ATTR_manip_command_switch_left_right",
    "ATTR_manip_command_switch_left_right2",
    "ATTR_manip_axis_knob",
    "ATTR_manip_axis_switch_up_down",
    "ATTR_manip_axis_switch_left_right",
    "ATTR_manip_drag_rotate",
    "ATTR_manip_wheel",
    "ATTR_axis_detented",
    "ATTR_axis_detent_range",
];

/// Number of leading [`MANIP_MEMBERS`] that are manipulator kinds.
const MANIP_KIND_COUNT: usize = 21;

pub const STATE_GROUPS: &[StateGroup] = &[
    StateGroup {
        members: &["ATTR_light_level"],
        reset: "ATTR_light_level_reset",
        exclusive: false,
    },
    StateGroup {
        members: &["ATTR_draw_disable"],
        reset: "ATTR_draw_enable",
        exclusive: false,
    },
    StateGroup {
        members: &["ATTR_solid_camera"],
        reset: "ATTR_no_solid_camera",
        exclusive: false,
    },
    StateGroup {
        members: &["ATTR_cockpit", "ATTR_cockpit_lit_only", "ATTR_cockpit_device"],
        reset: "ATTR_no_cockpit",
        exclusive: true,
    },
    StateGroup {
        members: MANIP_MEMBERS,
        reset: "ATTR_manip_none",
        exclusive: false,
    },
];

/// Group an attribute belongs to.
pub fn group_of(name: &str) -> Option<&'static StateGroup> {
    STATE_GROUPS.iter().find(|g| g.members.contains(&name))
}

/// Group cleared by a reset directive.
pub fn group_reset_by(reset: &str) -> Option<&'static StateGroup> {
    STATE_GROUPS.iter().find(|g| g.reset == reset)
}

/// Manipulator kind keywords (without modifiers).
pub fn manipulator_names() -> &'static [&'static str] {
    &MANIP_MEMBERS[..MANIP_KIND_COUNT]
}

/// Empty render-state table with every member registered in group order.
pub fn render_state_table() -> AttributeTable<AttrValue> {
    let mut table = AttributeTable::new();
    for group in STATE_GROUPS {
        for name in group.members {
            table.register(name);
        }
    }
    table
}

/// Clear every member of a group.
pub fn clear_group(table: &mut AttributeTable<AttrValue>, group: &StateGroup) {
    for name in group.members {
        table.clear(name);
    }
}

/// Whether two tables agree on every member of a group.
pub fn group_matches(
    a: &AttributeTable<AttrValue>,
    b: &AttributeTable<AttrValue>,
    group: &StateGroup,
) -> bool {
    group.members.iter().all(|name| a.values(name) == b.values(name))
}
