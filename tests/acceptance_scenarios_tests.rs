//! CPU-only exercises of the host-facing acceptance scenarios that don't
//! need a live GPU adapter: empty scene, single-triangle scene, and
//! ten-frame determinism. Scenarios requiring an actual device (startup,
//! resize storm, present-mode switch) are the host harness's job and are
//! not re-implemented here.

use forma::bindless_scene::{BindlessScene, MATERIAL_TEMPLATE_COUNT};
use forma::culling::frustum_cull;
use forma::Name;
use glam::{Mat4, Vec4};

#[test]
fn empty_scene_has_zero_objects_in_every_material_template() {
    let scene = BindlessScene::new();
    for template in 0..MATERIAL_TEMPLATE_COUNT {
        let (start, end) = scene.material_template_range(template);
        assert_eq!(start, end);
    }
    assert_eq!(scene.object_count(), 0);
}

#[test]
fn single_triangle_scene_registers_exactly_one_texture() {
    let mut scene = BindlessScene::new();
    let id = scene.register_texture(Name::new("triangle.albedo"));
    assert_eq!(id, 0);
    assert_eq!(scene.scene_texture_refs().len(), 1);
}

#[test]
fn ten_consecutive_frames_with_a_fixed_camera_and_scene_agree_on_visibility() {
    let view_proj = Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0);
    let objects = [
        Vec4::new(0.0, 0.0, -10.0, 1.0),
        Vec4::new(100.0, 0.0, -10.0, 1.0),
        Vec4::new(0.0, 0.0, 50.0, 1.0),
    ];

    let first_frame: Vec<bool> = objects.iter().map(|&o| frustum_cull(o, view_proj)).collect();
    for _ in 0..9 {
        let frame: Vec<bool> = objects.iter().map(|&o| frustum_cull(o, view_proj)).collect();
        assert_eq!(frame, first_frame, "visibility must be identical frame to frame with a fixed camera and scene");
    }
}
