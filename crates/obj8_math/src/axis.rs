// Axis conventions for OBJ8 <-> scene conversion
//
// OBJ8 files are Y-up, the scene side is Z-up. The mapping is a fixed
// permutation with one sign flip:
//
//   scene = ( obj.x, -obj.z, obj.y )
//   obj   = ( scene.x, scene.z, -scene.y )
//
// Every spatial vector crossing the boundary (vertex positions and normals,
// translation keys, rotation axes, light positions) goes through here.

use glam::DVec3;

/// Convert a vector from OBJ8 axes to scene axes.
pub fn obj_to_scene(v: DVec3) -> DVec3 {
    DVec3::new(v.x, -v.z, v.y)
}

/// Convert a vector from scene axes back to OBJ8 axes.
pub fn scene_to_obj(v: DVec3) -> DVec3 {
    DVec3::new(v.x, v.z, -v.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obj_up_becomes_scene_up() {
        // OBJ +Y is up; scene +Z is up
        let up = obj_to_scene(DVec3::Y);
        assert_eq!(up, DVec3::Z);
    }

    #[test]
    fn test_obj_forward_flips_sign() {
        // OBJ +Z maps onto scene -Y
        let v = obj_to_scene(DVec3::Z);
        assert_eq!(v, DVec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_round_trip_is_identity() {
        let original = DVec3::new(1.5, -2.25, 3.125);
        let back = scene_to_obj(obj_to_scene(original));
        assert_eq!(back, original);

        let back = obj_to_scene(scene_to_obj(original));
        assert_eq!(back, original);
    }

    #[test]
    fn test_conversion_preserves_length() {
        let v = DVec3::new(3.0, 4.0, 12.0);
        assert!((obj_to_scene(v).length() - 13.0).abs() < 1e-12);
    }
}
