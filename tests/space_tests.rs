use glam::Vec2;
use impulse2d::config::COLLISION_SLOP;
use impulse2d::{Body, BodyKind, Joint, Shape, Space, SpaceError};

const DT: f32 = 1.0 / 60.0;

fn ball(x: f32, y: f32) -> Body {
    let mut body = Body::new(BodyKind::Dynamic, Vec2::new(x, y), 0.0);
    body.add_shape(Shape::circle(0.0, 0.0, 0.5));
    body
}

#[test]
fn removed_body_ids_go_stale() {
    let mut space = Space::new(Vec2::ZERO);
    let id = space.add_body(ball(0.0, 0.0));
    assert!(space.body(id).is_some());

    space.remove_body(id).unwrap();
    assert!(space.body(id).is_none());
    assert_eq!(
        space.remove_body(id).err(),
        Some(SpaceError::UnknownBody(id))
    );

    // Reusing the slot must not resurrect the old id.
    let id2 = space.add_body(ball(1.0, 0.0));
    assert!(space.body(id).is_none());
    assert!(space.body(id2).is_some());
}

#[test]
fn self_joint_is_rejected() {
    let mut space = Space::new(Vec2::ZERO);
    let id = space.add_body(ball(0.0, 0.0));

    let body = space.body(id).unwrap();
    let joint = Joint::revolute(body, id, body, id, Vec2::ZERO);
    assert_eq!(space.add_joint(joint), Err(SpaceError::SelfJoint));
}

#[test]
fn joint_to_missing_body_is_rejected() {
    let mut space = Space::new(Vec2::ZERO);
    let a = space.add_body(ball(0.0, 0.0));
    let b = space.add_body(ball(2.0, 0.0));

    let joint = {
        let body_a = space.body(a).unwrap();
        let body_b = space.body(b).unwrap();
        Joint::distance(body_a, a, body_b, b, body_a.position, body_b.position)
    };
    space.remove_body(b).unwrap();

    assert_eq!(space.add_joint(joint), Err(SpaceError::UnknownBody(b)));
}

#[test]
fn removing_a_body_removes_its_joints() {
    let mut space = Space::new(Vec2::ZERO);
    let a = space.add_body(ball(0.0, 0.0));
    let b = space.add_body(ball(2.0, 0.0));

    let joint = {
        let body_a = space.body(a).unwrap();
        let body_b = space.body(b).unwrap();
        Joint::distance(body_a, a, body_b, b, body_a.position, body_b.position)
    };
    let joint_id = space.add_joint(joint).unwrap();
    assert_eq!(space.joint_count(), 1);

    space.remove_body(a).unwrap();
    assert_eq!(space.joint_count(), 0);
    assert!(space.joint(joint_id).is_none());

    // The surviving body must not hold a stale joint handle.
    space.step(DT, 8, 3, true);
    assert!(space.body(b).is_some());
}

#[test]
fn jointed_bodies_skip_collision_by_default() {
    // Overlapping balls normally produce a contact.
    let mut space = Space::new(Vec2::ZERO);
    let a = space.add_body(ball(0.0, 0.0));
    let b = space.add_body(ball(0.8, 0.0));
    space.step(DT, 8, 3, true);
    assert_eq!(space.contact_count(), 1);

    // A revolute joint between them suppresses it.
    let joint = {
        let body_a = space.body(a).unwrap();
        let body_b = space.body(b).unwrap();
        Joint::revolute(body_a, a, body_b, b, Vec2::new(0.4, 0.0))
    };
    space.add_joint(joint).unwrap();
    space.step(DT, 8, 3, true);
    assert_eq!(space.contact_count(), 0);
}

#[test]
fn stale_contacts_are_pruned() {
    let mut space = Space::new(Vec2::ZERO);
    let a = space.add_body(ball(0.0, 0.0));
    space.add_body(ball(0.8, 0.0));

    space.step(DT, 8, 3, true);
    assert_eq!(space.contact_count(), 1);

    // Teleport one body far away; the pair must disappear.
    space.body_mut(a).unwrap().set_transform(Vec2::new(100.0, 0.0), 0.0);
    space.body_mut(a).unwrap().cache_data();
    space.step(DT, 8, 3, true);
    assert_eq!(space.contact_count(), 0);
}

#[test]
fn warm_started_stack_is_a_fixed_point() {
    let mut space = Space::new(Vec2::new(0.0, -10.0));

    let mut ground = Body::new(BodyKind::Static, Vec2::ZERO, 0.0);
    ground.add_shape(Shape::segment(
        Vec2::new(-10.0, 0.0),
        Vec2::new(10.0, 0.0),
        0.0,
    ));
    space.add_body(ground);

    let mut ids = Vec::new();
    for i in 0..2 {
        let mut body = Body::new(BodyKind::Dynamic, Vec2::new(0.0, 0.5 + i as f32), 0.0);
        body.add_shape(Shape::new_box(0.0, 0.0, 1.0, 1.0));
        ids.push(space.add_body(body));
    }

    for _ in 0..240 {
        space.step(DT, 8, 3, true);
    }

    // The carried impulses are what hold the weight up between steps.
    let carried: f32 = space
        .contacts()
        .flat_map(|solver| solver.contacts.iter())
        .map(|con| con.lambda_n_acc)
        .sum();
    assert!(
        carried > 0.0,
        "settled stack should carry accumulated normal impulses"
    );

    let settled: Vec<Vec2> = ids
        .iter()
        .map(|id| space.body(*id).unwrap().position)
        .collect();

    // A settled configuration is a fixed point of further stepping.
    for _ in 0..120 {
        space.step(DT, 8, 3, true);
    }

    for (id, before) in ids.iter().zip(&settled) {
        let after = space.body(*id).unwrap().position;
        let moved = (after - *before).length();
        assert!(moved < 3.0 * COLLISION_SLOP, "settled box moved by {}", moved);
    }
}

#[test]
fn find_body_by_point_hits_shapes_not_just_bounds() {
    let mut space = Space::new(Vec2::ZERO);
    let id = space.add_body(ball(0.0, 0.0));

    assert_eq!(space.find_body_by_point(Vec2::new(0.2, 0.2)), Some(id));
    // Inside the AABB corner but outside the circle.
    assert_eq!(space.find_body_by_point(Vec2::new(0.45, 0.45)), None);
    assert_eq!(space.find_body_by_point(Vec2::new(5.0, 5.0)), None);
}

#[test]
fn clear_empties_everything() {
    let mut space = Space::new(Vec2::ZERO);
    let a = space.add_body(ball(0.0, 0.0));
    let b = space.add_body(ball(0.8, 0.0));
    let joint = {
        let body_a = space.body(a).unwrap();
        let body_b = space.body(b).unwrap();
        Joint::distance(body_a, a, body_b, b, body_a.position, body_b.position)
    };
    space.add_joint(joint).unwrap();
    space.step(DT, 8, 3, true);

    space.clear();
    assert_eq!(space.body_count(), 0);
    assert_eq!(space.joint_count(), 0);
    assert_eq!(space.contact_count(), 0);
}

#[test]
#[should_panic]
fn zero_dt_panics() {
    let mut space = Space::new(Vec2::ZERO);
    space.step(0.0, 8, 3, true);
}
