use approx::assert_relative_eq;
use glam::Vec2;
use impulse2d::collision::narrowphase::collide;
use impulse2d::config::COLLISION_SLOP;
use impulse2d::utils::Transform2;
use impulse2d::{Body, BodyKind, Shape, Space};

const DT: f32 = 1.0 / 60.0;

fn cached(mut shape: Shape, position: Vec2) -> Shape {
    shape.cache_data(&Transform2::new(position, 0.0));
    shape
}

fn ground(space: &mut Space) {
    let mut body = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    body.add_shape(Shape::segment(
        Vec2::new(-50.0, 0.0),
        Vec2::new(50.0, 0.0),
        0.0,
    ));
    space.add_body(body);
}

#[test]
fn circle_circle_manifold() {
    let a = cached(Shape::circle(0.0, 0.0, 0.5), Vec2::ZERO);
    let b = cached(Shape::circle(0.0, 0.0, 0.5), Vec2::new(0.8, 0.0));

    let mut contacts = Vec::new();
    let count = collide(&a, &b, &mut contacts);

    assert_eq!(count, 1);
    let con = &contacts[0];
    assert_relative_eq!(con.depth, -0.2, epsilon = 1e-5);
    assert_relative_eq!(con.normal.x, 1.0, epsilon = 1e-5);
    assert_relative_eq!(con.position.x, 0.4, epsilon = 1e-5);
}

#[test]
fn separated_circles_produce_nothing() {
    let a = cached(Shape::circle(0.0, 0.0, 0.5), Vec2::ZERO);
    let b = cached(Shape::circle(0.0, 0.0, 0.5), Vec2::new(2.0, 0.0));

    let mut contacts = Vec::new();
    assert_eq!(collide(&a, &b, &mut contacts), 0);
    assert!(contacts.is_empty());
}

#[test]
fn box_box_manifold_has_two_points() {
    let a = cached(Shape::new_box(0.0, 0.0, 2.0, 2.0), Vec2::ZERO);
    let b = cached(Shape::new_box(0.0, 0.0, 2.0, 2.0), Vec2::new(0.5, 1.9));

    let mut contacts = Vec::new();
    let count = collide(&a, &b, &mut contacts);

    // Offset face-on-face overlap keeps one supporting corner from each box.
    assert_eq!(count, 2);
    for con in &contacts {
        assert!(con.depth < 0.0, "depth {} should be penetrating", con.depth);
        assert_relative_eq!(con.normal.y.abs(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn circle_box_manifold() {
    let a = cached(Shape::circle(0.0, 0.0, 0.5), Vec2::new(0.0, 1.4));
    let b = cached(Shape::new_box(0.0, 0.0, 2.0, 2.0), Vec2::ZERO);

    let mut contacts = Vec::new();
    let count = collide(&a, &b, &mut contacts);

    assert_eq!(count, 1);
    assert_relative_eq!(contacts[0].depth, -0.1, epsilon = 1e-4);
}

#[test]
fn ball_settles_on_ground() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));
    ground(&mut space);

    let mut ball = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 2.0), 0.0);
    ball.add_shape(Shape::circle(0.0, 0.0, 0.5));
    let id = space.add_body(ball);

    for _ in 0..240 {
        space.step(DT, 8, 3, true);
    }

    let ball = space.body(id).unwrap();
    let penetration = 0.5 - ball.position.y;
    println!("resting ball: y = {}", ball.position.y);
    assert!(
        penetration < 3.0 * COLLISION_SLOP,
        "resting penetration {} exceeds the solver tolerance",
        penetration
    );
    assert!(
        penetration > -1e-3,
        "ball hovering above the ground at y = {}",
        ball.position.y
    );
    assert!(ball.linear_velocity.length() < 0.1);
}

#[test]
fn box_stack_stays_up() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));
    ground(&mut space);

    let mut ids = Vec::new();
    for i in 0..3 {
        let mut body = Body::new(
            BodyKind::Dynamic,
            Vec2::new(0.0, 0.5 + i as f32 * 1.0),
            0.0,
        );
        body.add_shape(Shape::new_box(0.0, 0.0, 1.0, 1.0));
        ids.push(space.add_body(body));
    }

    for _ in 0..240 {
        space.step(DT, 8, 3, true);
    }

    for (i, id) in ids.iter().enumerate() {
        let body = space.body(*id).unwrap();
        let expected = 0.5 + i as f32 * 1.0;
        println!("box {} at y = {}", i, body.position.y);
        assert!(
            (body.position.y - expected).abs() < 0.1,
            "box {} drifted to {}",
            i,
            body.position.y
        );
        assert!(body.position.x.abs() < 0.1);
    }
}

#[test]
fn elastic_ball_bounces_back() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));
    ground(&mut space);

    let mut ball = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 2.0), 0.0);
    let mut shape = Shape::circle(0.0, 0.0, 0.5);
    shape.elasticity = 1.0;
    ball.add_shape(shape);
    let id = space.add_body(ball);

    let mut peak_after_bounce = f32::MIN;
    let mut bounced = false;
    for _ in 0..300 {
        space.step(DT, 8, 3, true);
        let ball = space.body(id).unwrap();
        if ball.linear_velocity.y > 0.5 {
            bounced = true;
        }
        if bounced {
            peak_after_bounce = peak_after_bounce.max(ball.position.y);
        }
    }

    println!("rebound peak: {}", peak_after_bounce);
    assert!(bounced, "ball never bounced");
    assert!(
        peak_after_bounce > 1.2,
        "near-elastic bounce should recover most of the drop, peaked at {}",
        peak_after_bounce
    );
}

#[test]
fn friction_stops_sliding_box() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));
    ground(&mut space);

    let mut boxy = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 0.5), 0.0);
    boxy.add_shape(Shape::new_box(0.0, 0.0, 1.0, 1.0));
    boxy.linear_velocity = Vec2::new(2.0, 0.0);
    let id = space.add_body(boxy);

    for _ in 0..180 {
        space.step(DT, 8, 3, true);
    }

    let boxy = space.body(id).unwrap();
    println!("slid box velocity: {:?}", boxy.linear_velocity);
    assert!(
        boxy.linear_velocity.length() < 0.1,
        "friction should have stopped the box, still moving at {:?}",
        boxy.linear_velocity
    );
}

#[test]
fn distant_bodies_make_no_contacts() {
    let mut space = Space::new(Vec2::ZERO);

    for i in 0..4 {
        let mut body = Body::new(BodyKind::Dynamic, Vec2::new(i as f32 * 20.0, 0.0), 0.0);
        body.add_shape(Shape::circle(0.0, 0.0, 0.5));
        space.add_body(body);
    }

    space.step(DT, 8, 3, true);
    assert_eq!(space.contact_count(), 0);
}
