// Host-side tests for camera and uniform derivation.

use glam::{Mat4, Quat, Vec3, Vec4};
use primavera_core::*;

fn approx_mat(a: Mat4, b: Mat4) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() < 1e-4)
}

#[test]
fn default_camera_looks_at_the_vessel() {
    let camera = Camera::default();
    assert_eq!(camera.eye, Vec3::new(0.0, 0.0, CAMERA_DISTANCE));
    let in_view = camera.view_matrix().transform_point3(Vec3::ZERO);
    assert!((in_view.z + CAMERA_DISTANCE).abs() < 1e-4);
}

#[test]
fn viewport_sets_aspect_and_survives_zero_height() {
    let mut camera = Camera::default();
    camera.set_viewport(1600, 800);
    assert_eq!(camera.aspect, 2.0);
    camera.set_viewport(300, 0);
    assert_eq!(camera.aspect, 300.0);
}

#[test]
fn rotation_normal_matrix_is_the_rotation() {
    let rotation = Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 0.7);
    let uniforms = DrawUniforms::new(&Camera::default(), rotation);
    assert!(approx_mat(uniforms.world_inverse_transpose, uniforms.world));
}

#[test]
fn back_faces_flip_normals() {
    let uniforms = DrawUniforms::new(&Camera::default(), Quat::IDENTITY);
    let n = uniforms.back_face_normal_matrix() * Vec4::new(0.0, 0.0, 1.0, 0.0);
    assert!((n.truncate() - Vec3::NEG_Z).length() < 1e-5);
}

#[test]
fn plant_world_applies_model_first() {
    let uniforms = DrawUniforms::new(&Camera::default(), Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
    let model = Mat4::from_translation(Vec3::new(0.0, -25.0, 0.0));
    let p = uniforms.plant_world(model).transform_point3(Vec3::ZERO);
    // (0, -25, 0) rotated a quarter turn about z
    assert!((p - Vec3::new(25.0, 0.0, 0.0)).length() < 1e-4);
}
