//! Drops a pyramid of boxes onto the ground and prints how the stack settles.

use glam::Vec2;
use impulse2d::{Body, BodyKind, Shape, Space};

const DT: f32 = 1.0 / 60.0;

fn main() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));

    let mut ground = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    ground.add_shape(Shape::segment(
        Vec2::new(-30.0, 0.0),
        Vec2::new(30.0, 0.0),
        0.0,
    ));
    space.add_body(ground);

    let rows = 8;
    let mut ids = Vec::new();
    for row in 0..rows {
        let count = rows - row;
        let x0 = -(count as f32 - 1.0) * 0.55;
        for i in 0..count {
            let mut body = Body::new(
                BodyKind::Dynamic,
                Vec2::new(x0 + i as f32 * 1.1, 0.6 + row as f32 * 1.05),
                0.0,
            );
            body.add_shape(Shape::new_box(0.0, 0.0, 1.0, 1.0));
            ids.push(space.add_body(body));
        }
    }

    for second in 0..5 {
        for _ in 0..60 {
            space.step(DT, 8, 3, true);
        }

        let energy: f32 = ids
            .iter()
            .filter_map(|id| space.body(*id))
            .map(|b| b.kinetic_energy())
            .sum();
        println!(
            "t = {}s  contacts = {:3}  kinetic energy = {:.4}",
            second + 1,
            space.contact_count(),
            energy
        );
    }

    let top = ids
        .iter()
        .filter_map(|id| space.body(*id))
        .map(|b| b.position.y)
        .fold(f32::MIN, f32::max);
    println!("tallest box rests at y = {:.3}", top);
}
