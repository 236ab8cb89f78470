use super::chain::Chain;
use crate::math::EPSILON;
use glam::{Quat, Vec3};

/// What to do with a target the stretched chain cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retraction {
    /// Pull the target halfway toward the root until it fits.
    Halving,
    /// Pull the target straight back to the reachable radius.
    ClampToReach,
    /// Chase the real target; the chain ends up stretched toward it.
    Disabled,
}

#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// Fraction of the raw joint angle applied per tick.
    pub damping: f32,
    pub convergence_threshold: f32,
    /// Inversion fires below `convergence_threshold * inversion_multiplier`.
    pub inversion_multiplier: f32,
    /// Added to the root-target distance before comparing with the reach.
    pub reach_slack: f32,
    pub retraction: Retraction,
    /// Horizontal pull of the whole chain toward the target after each joint rotation.
    pub follow_speed: f32,
    pub max_retractions: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            damping: 0.054,
            convergence_threshold: 0.55,
            inversion_multiplier: 2.0,
            reach_slack: 3.4,
            retraction: Retraction::Halving,
            follow_speed: 0.0,
            max_retractions: 64,
        }
    }
}

impl SolverConfig {
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_convergence_threshold(mut self, threshold: f32) -> Self {
        self.convergence_threshold = threshold;
        self
    }

    pub fn with_inversion_multiplier(mut self, multiplier: f32) -> Self {
        self.inversion_multiplier = multiplier;
        self
    }

    pub fn with_reach_slack(mut self, slack: f32) -> Self {
        self.reach_slack = slack;
        self
    }

    pub fn with_retraction(mut self, retraction: Retraction) -> Self {
        self.retraction = retraction;
        self
    }

    pub fn with_follow_speed(mut self, follow_speed: f32) -> Self {
        self.follow_speed = follow_speed;
        self
    }

    pub fn inversion_threshold(&self) -> f32 {
        self.convergence_threshold * self.inversion_multiplier
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not tracking; the chain was left alone.
    Idle,
    /// Joints were rotated toward the target.
    Advanced,
    /// The tip reached the target and tracking stopped.
    Converged,
    /// The tip reached a retracted target and the chain was inverted.
    Inverted,
}

#[derive(Debug, Clone, Copy)]
pub struct StepReport {
    pub outcome: StepOutcome,
    /// Tip-to-target distance after the step.
    pub distance: f32,
    /// Target actually pursued this tick (after retraction).
    pub effective_target: Vec3,
    pub out_of_reach: bool,
    pub rotations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retracted {
    pub point: Vec3,
    pub out_of_reach: bool,
}

/// Damped tip-to-root cyclic coordinate descent, run once per tick while
/// tracking. Each call nudges every joint a small fraction of the way, so
/// repeated calls behave like a continuous pursuit of a moving target.
#[derive(Debug, Clone)]
pub struct PursuitSolver {
    config: SolverConfig,
    tracking: Tracking,
    pending_inversion: bool,
}

impl Default for PursuitSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl PursuitSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            tracking: Tracking::Idle,
            pending_inversion: false,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn tracking(&self) -> Tracking {
        self.tracking
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking == Tracking::Active
    }

    pub fn pending_inversion(&self) -> bool {
        self.pending_inversion
    }

    pub fn acquire(&mut self) {
        self.tracking = Tracking::Active;
    }

    pub fn release(&mut self) {
        self.tracking = Tracking::Idle;
        self.pending_inversion = false;
    }

    /// Slack actually applied for a chain of `reach`. Capped at half the
    /// reach so a short chain still has a non-empty reachable region.
    pub fn effective_slack(&self, reach: f32) -> f32 {
        self.config.reach_slack.min(reach * 0.5)
    }

    /// Applies the retraction policy to a target the chain cannot reach from `root`.
    pub fn retract(&self, root: Vec3, target: Vec3, reach: f32) -> Retracted {
        let slack = self.effective_slack(reach);
        let fits = |p: Vec3| (p - root).length() + slack <= reach;

        if fits(target) {
            return Retracted {
                point: target,
                out_of_reach: false,
            };
        }

        let point = match self.config.retraction {
            Retraction::Halving => {
                let mut point = target;
                for _ in 0..self.config.max_retractions {
                    if fits(point) {
                        break;
                    }
                    point = (point + root) * 0.5;
                }
                point
            }
            Retraction::ClampToReach => {
                let offset = target - root;
                let length = offset.length();
                if length < EPSILON {
                    root
                } else {
                    root + offset * ((reach - slack).max(0.0) / length)
                }
            }
            Retraction::Disabled => target,
        };

        Retracted {
            point,
            out_of_reach: true,
        }
    }

    /// Runs one tick of pursuit toward `target`.
    pub fn step(&mut self, chain: &mut Chain, target: Vec3) -> StepReport {
        if !self.is_tracking() {
            return StepReport {
                outcome: StepOutcome::Idle,
                distance: (chain.tip() - target).length(),
                effective_target: target,
                out_of_reach: false,
                rotations: 0,
            };
        }

        let Retracted {
            point: dest,
            out_of_reach,
        } = self.retract(chain.root(), target, chain.reach());
        self.pending_inversion = out_of_reach;

        let mut outcome = StepOutcome::Advanced;
        let mut rotations = 0;

        for i in (0..chain.len()).rev() {
            let distance = (chain.tip() - dest).length();

            if distance < self.config.convergence_threshold {
                self.tracking = Tracking::Idle;
                outcome = StepOutcome::Converged;
                log::debug!("pursuit converged at distance {distance:.3}");
                break;
            }

            // the tip becomes the new root, so it has to be the closer end
            let gains_ground = (chain.tip() - target).length() < (chain.root() - target).length();
            if self.pending_inversion
                && distance < self.config.inversion_threshold()
                && gains_ground
            {
                chain.invert();
                self.pending_inversion = false;
                outcome = StepOutcome::Inverted;
                break;
            }

            let pivot = chain.pivot_before(i);
            let re = chain.tip() - pivot;
            let rd = dest - pivot;

            let Some((axis, angle)) = joint_rotation(re, rd) else {
                log::trace!("joint {i}: degenerate pivot geometry, skipped");
                continue;
            };

            let rotation = Quat::from_axis_angle(axis, angle * self.config.damping);
            chain.update_joint_transform(i, rotation);
            rotations += 1;

            if self.config.follow_speed > 0.0 {
                let mut pull = (dest - chain.tip()) * self.config.follow_speed;
                pull.z = 0.0;
                chain.translate(pull);
            }
        }

        StepReport {
            outcome,
            distance: (chain.tip() - dest).length(),
            effective_target: dest,
            out_of_reach,
            rotations,
        }
    }
}

/// Axis and full angle turning `re` onto `rd`, or `None` when either vector
/// vanishes or they already point the same way.
///
/// Opposite vectors have no unique axis; any axis perpendicular to `re` turns
/// it toward `rd`.
fn joint_rotation(re: Vec3, rd: Vec3) -> Option<(Vec3, f32)> {
    if re.length_squared() < EPSILON || rd.length_squared() < EPSILON {
        return None;
    }

    let cos_a = (re.dot(rd) / (re.length() * rd.length())).clamp(-1.0, 1.0);
    let cross = re.cross(rd);

    let axis = if cross.length_squared() >= EPSILON {
        cross.normalize()
    } else if cos_a < 0.0 {
        re.normalize().any_orthonormal_vector()
    } else {
        return None;
    };

    Some((axis, cos_a.acos()))
}
