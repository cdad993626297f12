//! Sweeps a fan of rays across a small scene and prints what they hit.

use glam::Vec2;
use impulse2d::{Body, BodyKind, Ray, Shape, Space};

fn main() {
    let mut space = Space::new(Vec2::ZERO);

    let mut circle = Body::new(BodyKind::Static, Vec2::new(6.0, 2.0), 0.0);
    circle.add_shape(Shape::circle(0.0, 0.0, 1.0));
    space.add_body(circle);

    let mut boxy = Body::new(BodyKind::Static, Vec2::new(6.0, -2.0), 0.4);
    boxy.add_shape(Shape::new_box(0.0, 0.0, 2.0, 2.0));
    space.add_body(boxy);

    let mut wall = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    wall.add_shape(Shape::segment(
        Vec2::new(10.0, -5.0),
        Vec2::new(10.0, 5.0),
        0.2,
    ));
    space.add_body(wall);

    let origin = Vec2::ZERO;
    let rays = 21;
    for i in 0..rays {
        let angle = (i as f32 / (rays - 1) as f32 - 0.5) * std::f32::consts::FRAC_PI_2;
        let direction = Vec2::new(angle.cos(), angle.sin());
        let ray = Ray::new(origin, direction, 50.0);

        match space.raycast(&ray, None) {
            Some(hit) => println!(
                "ray {:5.1}°  hit at ({:5.2}, {:5.2})  normal ({:5.2}, {:5.2})  dist {:.2}",
                angle.to_degrees(),
                hit.point.x,
                hit.point.y,
                hit.normal.x,
                hit.normal.y,
                hit.distance
            ),
            None => println!("ray {:5.1}°  no hit", angle.to_degrees()),
        }
    }
}
