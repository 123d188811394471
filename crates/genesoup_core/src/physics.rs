//! Physics collaborator boundary.
//!
//! The simulation never integrates motion or detects collisions itself; it
//! creates bodies, pushes them, rescales them and asks which bodies overlap.
//! [`HeadlessPhysics`] is a small circle-only engine for running without a
//! renderer; tests swap in scripted doubles.

use genesoup_data::{BodyHandle, CollisionLayer, Shape, Vec2};
use std::collections::BTreeMap;

pub trait Physics {
    fn create_body(&mut self, shape: Shape, position: Vec2, layer: CollisionLayer) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);
    fn apply_force(&mut self, handle: BodyHandle, force: Vec2);
    /// Scales a body's shape by `factor` about `anchor`.
    fn set_body_scale(&mut self, handle: BodyHandle, factor: f64, anchor: Vec2);
    fn body_position(&self, handle: BodyHandle) -> Option<Vec2>;
    /// Bodies among `handles` containing `point`.
    fn query_point_overlap(&self, handles: &[BodyHandle], point: Vec2) -> Vec<BodyHandle>;
    /// Bodies among `handles` overlapping `handle`, in `handles` order.
    fn query_shape_overlap(&self, handle: BodyHandle, handles: &[BodyHandle]) -> Vec<BodyHandle>;
    fn step(&mut self, dt_ms: f64);
}

const DENSITY: f64 = 0.001;
const AIR_FRICTION: f64 = 0.01;

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    /// Displacement per step.
    velocity: Vec2,
    force: Vec2,
    radius: f64,
    layer: CollisionLayer,
}

impl Body {
    fn mass(&self) -> f64 {
        DENSITY * std::f64::consts::PI * self.radius * self.radius
    }
}

/// Circle bodies in a walled rectangle, integrated with position Verlet.
#[derive(Debug, Clone)]
pub struct HeadlessPhysics {
    width: f64,
    height: f64,
    bodies: BTreeMap<BodyHandle, Body>,
    next_id: u64,
}

impl HeadlessPhysics {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            bodies: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn radius(&self, handle: BodyHandle) -> Option<f64> {
        self.bodies.get(&handle).map(|b| b.radius)
    }

    fn clamp_to_walls(&self, body: &mut Body) {
        let r = body.radius.min(self.width / 2.0).min(self.height / 2.0);
        if body.position.x < r || body.position.x > self.width - r {
            body.position.x = body.position.x.clamp(r, self.width - r);
            body.velocity.x = 0.0;
        }
        if body.position.y < r || body.position.y > self.height - r {
            body.position.y = body.position.y.clamp(r, self.height - r);
            body.velocity.y = 0.0;
        }
    }
}

impl Physics for HeadlessPhysics {
    fn create_body(&mut self, shape: Shape, position: Vec2, layer: CollisionLayer) -> BodyHandle {
        let Shape::Circle { radius } = shape;
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            Body {
                position,
                velocity: Vec2::ZERO,
                force: Vec2::ZERO,
                radius,
                layer,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn apply_force(&mut self, handle: BodyHandle, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.force = body.force.add(force);
        }
    }

    fn set_body_scale(&mut self, handle: BodyHandle, factor: f64, anchor: Vec2) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.radius *= factor;
            body.position = anchor.add(body.position.sub(anchor).scale(factor));
        }
    }

    fn body_position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|b| b.position)
    }

    fn query_point_overlap(&self, handles: &[BodyHandle], point: Vec2) -> Vec<BodyHandle> {
        handles
            .iter()
            .copied()
            .filter(|h| {
                self.bodies
                    .get(h)
                    .is_some_and(|b| b.position.distance(point) <= b.radius)
            })
            .collect()
    }

    fn query_shape_overlap(&self, handle: BodyHandle, handles: &[BodyHandle]) -> Vec<BodyHandle> {
        let Some(body) = self.bodies.get(&handle) else {
            return Vec::new();
        };
        handles
            .iter()
            .copied()
            .filter(|h| *h != handle)
            .filter(|h| {
                self.bodies.get(h).is_some_and(|other| {
                    body.position.distance(other.position) < body.radius + other.radius
                })
            })
            .collect()
    }

    fn step(&mut self, dt_ms: f64) {
        let dt2 = dt_ms * dt_ms;
        let mut bodies = std::mem::take(&mut self.bodies);
        // food is static
        for body in bodies.values_mut().filter(|b| b.layer == CollisionLayer::Creature) {
            let accel = body.force.scale(dt2 / body.mass());
            body.velocity = body.velocity.scale(1.0 - AIR_FRICTION).add(accel);
            body.position = body.position.add(body.velocity);
            body.force = Vec2::ZERO;
            self.clamp_to_walls(body);
        }
        self.bodies = bodies;
    }
}
