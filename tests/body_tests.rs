use approx::assert_relative_eq;
use glam::Vec2;
use impulse2d::{Body, BodyKind, Shape, Space};

const DT: f32 = 1.0 / 60.0;

fn dynamic_box(x: f32, y: f32, w: f32, h: f32) -> Body {
    let mut body = Body::new(BodyKind::Dynamic, Vec2::new(x, y), 0.0);
    body.add_shape(Shape::new_box(0.0, 0.0, w, h));
    body
}

fn velocity_at(body: &Body, point: Vec2) -> Vec2 {
    let r = point - body.position;
    body.linear_velocity + Vec2::new(-r.y, r.x) * body.angular_velocity
}

#[test]
fn box_mass_properties() {
    let body = dynamic_box(0.0, 0.0, 2.0, 2.0);

    // Unit density: m = w * h, I = m * (w^2 + h^2) / 12
    assert_relative_eq!(body.mass(), 4.0, epsilon = 1e-4);
    assert_relative_eq!(body.inertia(), 4.0 * 8.0 / 12.0, epsilon = 1e-3);
    assert_relative_eq!(body.mass_inv(), 0.25, epsilon = 1e-5);
}

#[test]
fn static_body_has_no_mass() {
    let mut body = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    body.add_shape(Shape::new_box(0.0, 0.0, 2.0, 2.0));

    assert_eq!(body.mass(), 0.0);
    assert_eq!(body.mass_inv(), 0.0);
    assert_eq!(body.inertia_inv(), 0.0);
}

#[test]
fn offset_shape_moves_center_of_mass() {
    let mut body = Body::new(BodyKind::Dynamic, Vec2::ZERO, 0.0);
    body.add_shape(Shape::circle(3.0, 0.0, 1.0));

    // The origin stays put, the tracked center of mass moves to the shape.
    assert_relative_eq!(body.centroid.x, 3.0, epsilon = 1e-5);
    assert_relative_eq!(body.position.x, 3.0, epsilon = 1e-5);
    assert_relative_eq!(body.transform.position.x, 0.0, epsilon = 1e-5);
}

#[test]
fn recalculating_mass_keeps_world_geometry_fixed() {
    let mut body = Body::new(BodyKind::Dynamic, Vec2::new(2.0, 3.0), 0.6);
    body.add_shape(Shape::circle(0.0, 0.0, 0.5));
    body.linear_velocity = Vec2::new(1.0, -0.5);
    body.angular_velocity = 2.0;

    let probe = Vec2::new(0.25, -0.1);
    let world_before = body.world_point(probe);
    let material_velocity_before = velocity_at(&body, world_before);

    // Attaching an offset shape shifts the tracked center of mass.
    body.add_shape(Shape::circle(1.5, 0.0, 0.5));
    assert!(body.centroid.x > 0.5);

    // The shapes must not jump: the same local point maps to the same world
    // point, and the existing material keeps its velocity.
    let world_after = body.world_point(probe);
    assert_relative_eq!(world_after.x, world_before.x, epsilon = 1e-5);
    assert_relative_eq!(world_after.y, world_before.y, epsilon = 1e-5);

    let material_velocity_after = velocity_at(&body, world_before);
    assert_relative_eq!(
        material_velocity_after.x,
        material_velocity_before.x,
        epsilon = 1e-5
    );
    assert_relative_eq!(
        material_velocity_after.y,
        material_velocity_before.y,
        epsilon = 1e-5
    );
}

#[test]
fn forces_ignored_on_non_dynamic_bodies() {
    let mut body = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    body.add_shape(Shape::circle(0.0, 0.0, 1.0));
    body.apply_force_to_center(Vec2::new(100.0, 0.0));
    body.apply_linear_impulse(Vec2::new(100.0, 0.0), Vec2::ZERO);
    body.apply_angular_impulse(50.0);

    assert_eq!(body.linear_velocity, Vec2::ZERO);
    assert_eq!(body.angular_velocity, 0.0);

    let mut body = Body::new(BodyKind::Kinetic, Vec2::ZERO, 0.0);
    body.add_shape(Shape::circle(0.0, 0.0, 1.0));
    body.apply_linear_impulse(Vec2::new(100.0, 0.0), Vec2::ZERO);
    assert_eq!(body.linear_velocity, Vec2::ZERO);
}

#[test]
fn set_kind_clears_motion() {
    let mut body = dynamic_box(0.0, 0.0, 1.0, 1.0);
    body.linear_velocity = Vec2::new(5.0, 0.0);
    body.angular_velocity = 3.0;

    body.set_kind(BodyKind::Static);

    assert_eq!(body.linear_velocity, Vec2::ZERO);
    assert_eq!(body.angular_velocity, 0.0);
    assert_eq!(body.mass(), 0.0);
}

#[test]
fn fixed_rotation_zeroes_inertia() {
    let mut body = dynamic_box(0.0, 0.0, 1.0, 1.0);
    body.set_fixed_rotation(true);

    assert_eq!(body.inertia_inv(), 0.0);
    assert!(body.mass() > 0.0);

    body.apply_angular_impulse(10.0);
    assert_eq!(body.angular_velocity, 0.0);
}

#[test]
fn kinetic_body_moves_by_velocity_and_ignores_gravity() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));

    let mut platform = Body::new(BodyKind::Kinetic, Vec2::ZERO, 0.0);
    platform.add_shape(Shape::new_box(0.0, 0.0, 2.0, 0.5));
    platform.linear_velocity = Vec2::new(1.0, 0.0);
    let id = space.add_body(platform);

    for _ in 0..60 {
        space.step(DT, 8, 3, true);
    }

    let platform = space.body(id).unwrap();
    println!("kinetic platform at {:?}", platform.position);
    assert_relative_eq!(platform.position.x, 1.0, epsilon = 1e-3);
    assert_relative_eq!(platform.position.y, 0.0, epsilon = 1e-4);
    // Gravity never touched the velocity.
    assert_relative_eq!(platform.linear_velocity.x, 1.0, epsilon = 1e-5);
}

#[test]
fn gravity_free_fall() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));
    let id = space.add_body(dynamic_box(0.0, 100.0, 1.0, 1.0));

    for _ in 0..60 {
        space.step(DT, 8, 3, true);
    }

    let body = space.body(id).unwrap();
    // Semi-implicit Euler: v = g*t, y = y0 - g * dt^2 * n(n+1)/2
    assert_relative_eq!(body.linear_velocity.y, -10.0, epsilon = 0.05);
    assert!(body.position.y < 96.0 && body.position.y > 94.0);
}
