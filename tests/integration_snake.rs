//! Integration tests for snake-ik
//!
//! End-to-end behaviour through the public API: pursuit, inversion, collision
//! between built trees, and a full hunt inside a game session.

use glam::{Quat, Vec3};
use snake_ik::collision::{AabbTree, CollisionEngine, TraversalStats};
use snake_ik::dynamics::TargetBody;
use snake_ik::game::{GameEvent, Session, SessionConfig};
use snake_ik::ik::{Chain, PursuitSolver, Retraction, SolverConfig, StepOutcome};
use snake_ik::{MeshData, Transform};

// ============================================================================
// Helper
// ============================================================================

fn unit_chain() -> Chain {
    Chain::builder().links(10).link_length(1.0).build().unwrap()
}

/// Steps until the solver stops tracking or `max_ticks` run out.
fn pursue(
    solver: &mut PursuitSolver,
    chain: &mut Chain,
    target: Vec3,
    max_ticks: usize,
) -> (StepOutcome, usize, usize) {
    let mut inversions = 0;
    for tick in 0..max_ticks {
        let report = solver.step(chain, target);
        match report.outcome {
            StepOutcome::Inverted => inversions += 1,
            StepOutcome::Converged => return (StepOutcome::Converged, tick, inversions),
            _ => {}
        }
    }
    (StepOutcome::Advanced, max_ticks, inversions)
}

// ============================================================================
// Pursuit
// ============================================================================

#[test]
fn test_reachable_target_at_distance_five() {
    let mut chain = unit_chain();
    let mut solver = PursuitSolver::default();
    solver.acquire();
    let target = Vec3::new(0.0, -3.0, 4.0);

    let (outcome, ticks, inversions) = pursue(&mut solver, &mut chain, target, 500);

    assert_eq!(outcome, StepOutcome::Converged);
    assert!(ticks < 500);
    assert_eq!(inversions, 0);
    assert!((chain.tip() - target).length() < 0.55);
}

#[test]
fn test_pursuit_keeps_links_rigid() {
    let mut chain = unit_chain();
    let mut solver = PursuitSolver::default();
    solver.acquire();
    pursue(&mut solver, &mut chain, Vec3::new(4.0, 3.0, 0.0), 500);

    let joints: Vec<Vec3> = chain.joint_positions().collect();
    for pair in joints.windows(2) {
        assert!(((pair[1] - pair[0]).length() - 1.0).abs() < 1e-3);
    }
    for (i, link) in chain.links().iter().enumerate() {
        let midpoint = (joints[i] + joints[i + 1]) * 0.5;
        assert!(link.position().abs_diff_eq(midpoint, 1e-3));
    }
}

#[test]
fn test_far_target_is_reached_by_inverting() {
    let mut chain = unit_chain();
    let mut solver = PursuitSolver::default();
    solver.acquire();
    let target = Vec3::new(40.0, 0.0, 0.0);

    let (outcome, _, inversions) = pursue(&mut solver, &mut chain, target, 3000);

    assert_eq!(outcome, StepOutcome::Converged);
    assert!(inversions >= 2);
    assert!((chain.tip() - target).length() < 0.55);
}

#[test]
fn test_target_straight_behind_the_root() {
    let mut chain = unit_chain();
    let mut solver = PursuitSolver::default();
    solver.acquire();
    let target = Vec3::new(0.0, -5.0, 0.0);
    let start = (chain.tip() - target).length();

    let (outcome, ticks, inversions) = pursue(&mut solver, &mut chain, target, 500);

    assert_eq!(outcome, StepOutcome::Converged);
    assert!(ticks < 500);
    assert_eq!(inversions, 0);
    assert!((chain.tip() - target).length() < start);
}

#[test]
fn test_disabled_retraction_never_inverts() {
    let mut chain = unit_chain();
    let config = SolverConfig::default().with_retraction(Retraction::Disabled);
    let mut solver = PursuitSolver::new(config);
    solver.acquire();

    let (outcome, _, inversions) = pursue(&mut solver, &mut chain, Vec3::new(0.0, 40.0, 0.0), 200);

    assert_eq!(outcome, StepOutcome::Advanced);
    assert_eq!(inversions, 0);
    assert!(!chain.is_inverted());
}

// ============================================================================
// Collision
// ============================================================================

#[test]
fn test_link_against_target_sphere() {
    let link = AabbTree::build(&MeshData::cylinder(0.35, 1.6, 12)).unwrap();
    let ball = AabbTree::build(&MeshData::uv_sphere(0.6, 16, 8)).unwrap();
    let quarter_turn = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
    let lying = Transform::from_position_rotation(Vec3::ZERO, quarter_turn);

    let mut stats = TraversalStats::default();
    let touching = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
    assert!(CollisionEngine::test_tree_pair_counted(&link, &lying, &ball, &touching, &mut stats));
    assert_eq!(stats.leaf_hits, 1);

    let beside = Transform::from_position(Vec3::new(0.0, 1.2, 0.0));
    assert!(!CollisionEngine::test_tree_pair(&link, &lying, &ball, &beside));
    assert!(CollisionEngine::test_tree_pair(&link, &Transform::IDENTITY, &ball, &beside));
}

// ============================================================================
// Session
// ============================================================================

#[test]
fn test_session_hunts_acquired_target() {
    let chain = Chain::builder().links(10).link_length(1.6).build().unwrap();
    let solver = SolverConfig::default().with_convergence_threshold(0.3);
    let config = SessionConfig::default().with_solver(solver);
    let mut session = Session::new(chain, config).unwrap();
    let target = session.add_target(TargetBody::new(Vec3::new(3.0, 4.0, 0.4), Vec3::ZERO, 0.8));
    assert!(session.acquire(target));

    let mut hit_at = None;
    for tick in 0..1200 {
        let events = session.tick(1.0 / 60.0);
        let ate = events
            .iter()
            .any(|e| matches!(e, GameEvent::TargetHit { target: t, .. } if *t == target));
        if ate {
            hit_at = Some(tick);
            break;
        }
    }

    assert!(hit_at.is_some());
    assert!(!session.targets()[target].alive);
    assert_eq!(session.scoreboard().score, 50);
    assert_eq!(session.scoreboard().cash, 5);
    assert!((session.chain().lowest_point() - 0.4).abs() < 1e-4);
}

#[test]
fn test_spawned_targets_fall_and_settle() {
    let chain = Chain::builder()
        .links(4)
        .link_length(1.6)
        .root(Vec3::new(-30.0, -30.0, 0.0))
        .build()
        .unwrap();
    let mut session = Session::new(chain, SessionConfig::default().with_seed(11)).unwrap();
    session.spawn_targets(3);

    for _ in 0..600 {
        session.tick(1.0 / 60.0);
    }

    for target in session.targets() {
        let z = target.position().z;
        assert!(z < 0.9);
        assert!(z > 0.3);
    }
}
