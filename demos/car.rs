//! A motorized two-wheel car driving over a bumpy strip of ground.

use glam::Vec2;
use impulse2d::{Body, BodyKind, Joint, Shape, Space};

const DT: f32 = 1.0 / 60.0;

fn main() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));

    // Ground: a chain of segments with a few bumps.
    let mut ground = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    let profile = [
        Vec2::new(-10.0, 0.0),
        Vec2::new(10.0, 0.0),
        Vec2::new(15.0, 0.5),
        Vec2::new(20.0, 0.0),
        Vec2::new(28.0, 1.0),
        Vec2::new(40.0, 0.0),
        Vec2::new(60.0, 0.0),
    ];
    for pair in profile.windows(2) {
        ground.add_shape(Shape::segment(pair[0], pair[1], 0.1));
    }
    space.add_body(ground);

    // Chassis plus two wheels on suspension.
    let mut chassis = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 2.0), 0.0);
    chassis.add_shape(Shape::new_box(0.0, 0.0, 3.0, 0.6));
    let chassis_id = space.add_body(chassis);

    let mut wheel_ids = Vec::new();
    for x in [-1.1, 1.1] {
        let mut wheel = Body::new(BodyKind::Dynamic, Vec2::new(x, 1.2), 0.0);
        let mut tire = Shape::circle(0.0, 0.0, 0.45);
        tire.friction = 1.2;
        wheel.add_shape(tire);
        let wheel_id = space.add_body(wheel);

        let mut joint = {
            let b1 = space.body(chassis_id).unwrap();
            let b2 = space.body(wheel_id).unwrap();
            Joint::wheel(
                b1,
                chassis_id,
                b2,
                wheel_id,
                Vec2::new(x, 2.0),
                Vec2::new(x, 1.2),
            )
        };
        if let Some(wheel) = joint.as_wheel_mut() {
            wheel.set_spring_frequency_hz(5.0);
            wheel.set_spring_damping_ratio(0.8);
            wheel.enable_motor(true);
            wheel.set_motor_speed(-8.0);
            wheel.set_max_motor_torque(30.0);
        }
        space.add_joint(joint).expect("wheel joint");
        wheel_ids.push(wheel_id);
    }

    for second in 0..10 {
        for _ in 0..60 {
            space.step(DT, 8, 3, true);
        }
        let chassis = space.body(chassis_id).unwrap();
        println!(
            "t = {:2}s  chassis at ({:6.2}, {:5.2})  speed = {:5.2}",
            second + 1,
            chassis.position.x,
            chassis.position.y,
            chassis.linear_velocity.length()
        );
    }
}
