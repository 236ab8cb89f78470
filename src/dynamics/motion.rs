use glam::Vec3;

use crate::math::Transform;

/// Bounds and constants of the walled arena the targets move in.
#[derive(Debug, Clone, Copy)]
pub struct ArenaConfig {
    pub gravity: Vec3,
    pub floor_height: f32,
    /// Bodies above this height are falling and receive gravity.
    pub airborne_height: f32,
    /// Half-width of the square arena on x and y.
    pub wall_extent: f32,
    /// Velocity components below this magnitude snap to zero.
    pub rest_epsilon: f32,
    pub default_elasticity: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.8),
            floor_height: 0.4,
            airborne_height: 0.5,
            wall_extent: 52.5,
            rest_epsilon: 0.001,
            default_elasticity: 0.8,
        }
    }
}

impl ArenaConfig {
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_floor_height(mut self, floor_height: f32) -> Self {
        self.floor_height = floor_height;
        self
    }

    pub fn with_wall_extent(mut self, wall_extent: f32) -> Self {
        self.wall_extent = wall_extent;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetBody {
    pub transform: Transform,
    pub velocity: Vec3,
    /// Fraction of vertical speed kept on a floor bounce.
    pub elasticity: f32,
    pub alive: bool,
}

impl TargetBody {
    pub fn new(position: Vec3, velocity: Vec3, elasticity: f32) -> Self {
        Self {
            transform: Transform::from_position(position),
            velocity,
            elasticity,
            alive: true,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.transform.translation()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MotionIntegrator {
    config: ArenaConfig,
}

impl MotionIntegrator {
    pub fn new(config: ArenaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Advances every live body by `dt` seconds. Dead bodies are left untouched.
    pub fn integrate(&self, bodies: &mut [TargetBody], dt: f32) {
        if dt <= 0.0 {
            return;
        }
        for body in bodies.iter_mut().filter(|b| b.alive) {
            self.integrate_body(body, dt);
        }
    }

    fn integrate_body(&self, body: &mut TargetBody, dt: f32) {
        let cfg = &self.config;
        let mut position = body.position();

        if position.z > cfg.airborne_height {
            body.velocity += cfg.gravity * dt;
        } else if body.velocity.z.abs() < cfg.rest_epsilon {
            body.velocity.z = 0.0;
        }

        if position.z <= cfg.floor_height {
            position.z = cfg.floor_height;
            body.velocity.z *= -body.elasticity;
        }

        reflect_at_wall(&mut body.velocity.x, position.x, cfg.wall_extent);
        reflect_at_wall(&mut body.velocity.y, position.y, cfg.wall_extent);

        for component in [&mut body.velocity.x, &mut body.velocity.y, &mut body.velocity.z] {
            if component.abs() < cfg.rest_epsilon {
                *component = 0.0;
            }
        }

        body.transform.position = position + body.velocity * dt;
    }
}

fn reflect_at_wall(velocity: &mut f32, coordinate: f32, extent: f32) {
    let outward_high = coordinate > extent && *velocity > 0.0;
    let outward_low = coordinate < -extent && *velocity < 0.0;
    if outward_high || outward_low {
        *velocity = -*velocity;
    }
}
