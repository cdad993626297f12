use approx::assert_relative_eq;
use glam::Vec2;
use impulse2d::{Body, BodyKind, Ray, Shape, Space};

fn circle_body(space: &mut Space, x: f32, y: f32, r: f32) -> impulse2d::BodyId {
    let mut body = Body::new(BodyKind::Static, Vec2::new(x, y), 0.0);
    body.add_shape(Shape::circle(0.0, 0.0, r));
    space.add_body(body)
}

#[test]
fn raycast_returns_nearest_body() {
    let mut space = Space::new(Vec2::ZERO);
    let near = circle_body(&mut space, 5.0, 0.0, 1.0);
    let far = circle_body(&mut space, 10.0, 0.0, 1.0);

    let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
    let hit = space.raycast(&ray, None).unwrap();

    assert_eq!(hit.body, near);
    assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
    assert_relative_eq!(hit.point.x, 4.0, epsilon = 1e-4);
    assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-4);

    let hit = space.raycast(&ray, Some(near)).unwrap();
    assert_eq!(hit.body, far);
    assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);
}

#[test]
fn raycast_respects_max_distance() {
    let mut space = Space::new(Vec2::ZERO);
    circle_body(&mut space, 50.0, 0.0, 1.0);

    let short = Ray::new(Vec2::ZERO, Vec2::X, 10.0);
    assert!(space.raycast(&short, None).is_none());

    let long = Ray::new(Vec2::ZERO, Vec2::X, 60.0);
    assert!(space.raycast(&long, None).is_some());
}

#[test]
fn raycast_misses_everything_off_axis() {
    let mut space = Space::new(Vec2::ZERO);
    circle_body(&mut space, 5.0, 0.0, 1.0);

    let ray = Ray::new(Vec2::ZERO, Vec2::Y, 100.0);
    assert!(space.raycast(&ray, None).is_none());
}

#[test]
fn raycast_hits_rotated_box_face() {
    let mut space = Space::new(Vec2::ZERO);
    let mut body = Body::new(
        BodyKind::Static,
        Vec2::new(5.0, 0.0),
        std::f32::consts::FRAC_PI_4,
    );
    body.add_shape(Shape::new_box(0.0, 0.0, 2.0, 2.0));
    let id = space.add_body(body);

    // A 2x2 box rotated 45 degrees presents a corner at sqrt(2) toward us.
    let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
    let hit = space.raycast(&ray, None).unwrap();
    assert_eq!(hit.body, id);
    assert_relative_eq!(hit.distance, 5.0 - std::f32::consts::SQRT_2, epsilon = 1e-3);
}

#[test]
fn raycast_hits_rounded_segment() {
    let mut space = Space::new(Vec2::ZERO);
    let mut body = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    body.add_shape(Shape::segment(
        Vec2::new(5.0, -2.0),
        Vec2::new(5.0, 2.0),
        0.5,
    ));
    space.add_body(body);

    let ray = Ray::new(Vec2::ZERO, Vec2::X, 100.0);
    let hit = space.raycast(&ray, None).unwrap();
    assert_relative_eq!(hit.distance, 4.5, epsilon = 1e-4);
    assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-4);
}
