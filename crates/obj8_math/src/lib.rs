// Re-export glam for convenience
pub use glam::*;

// OBJ8 math helpers
mod axis;
mod format;

pub use axis::{obj_to_scene, scene_to_obj};
pub use format::format_float;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dvec3_creation() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.x, 1.0);
        assert_eq!(v.y, 2.0);
        assert_eq!(v.z, 3.0);
    }

    #[test]
    fn test_reexported_helpers() {
        let v = obj_to_scene(DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(format_float(v.y), "-3");
    }
}
