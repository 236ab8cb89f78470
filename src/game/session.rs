use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::collision::{AabbTree, CollisionEngine};
use crate::dynamics::{ArenaConfig, MotionIntegrator, TargetBody};
use crate::error::{ChainError, MeshError};
use crate::ik::{Chain, ChainSnapshot, PursuitSolver, SolverConfig, StepOutcome};
use crate::math::Transform;
use crate::mesh::{MeshData, MeshHandle};

/// Scoring rules and the placement of the level objective.
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub hit_score: u32,
    pub hit_cash: u32,
    /// Score needed to finish a level, multiplied by the level number.
    pub score_per_level: u32,
    pub objective_position: Vec3,
    pub link_radius: f32,
    pub target_radius: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            hit_score: 50,
            hit_cash: 5,
            score_per_level: 50,
            objective_position: Vec3::new(0.0, -30.0, 0.4),
            link_radius: 0.35,
            target_radius: 0.6,
        }
    }
}

impl LevelConfig {
    pub fn with_objective_position(mut self, position: Vec3) -> Self {
        self.objective_position = position;
        self
    }

    pub fn with_score_per_level(mut self, score: u32) -> Self {
        self.score_per_level = score;
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub solver: SolverConfig,
    pub arena: ArenaConfig,
    pub level: LevelConfig,
    pub seed: u64,
}

impl SessionConfig {
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_arena(mut self, arena: ArenaConfig) -> Self {
        self.arena = arena;
        self
    }

    pub fn with_level(mut self, level: LevelConfig) -> Self {
        self.level = level;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub cash: u32,
    pub level: u32,
    pub level_goal: u32,
}

/// Things that happened during a tick. Audio and UI react to these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    TargetHit { target: usize, score: u32, cash: u32 },
    TargetReached { target: usize },
    ChainInverted,
    ObjectiveUnlocked,
    LevelComplete { level: u32 },
}

/// One running game: the chain, the targets it hunts and the score.
pub struct Session {
    chain: Chain,
    start_pose: ChainSnapshot,
    solver: PursuitSolver,
    integrator: MotionIntegrator,
    trees: Vec<AabbTree>,
    targets: Vec<TargetBody>,
    target_mesh: MeshHandle,
    objective: Transform,
    objective_mesh: MeshHandle,
    selected: Option<usize>,
    scoreboard: Scoreboard,
    objective_unlocked: bool,
    level_complete: bool,
    level_config: LevelConfig,
    rng: Pcg64Mcg,
}

impl Session {
    /// Starts level 1 with no targets. The link mesh is registered as
    /// [`MeshHandle::default()`], matching what [`Chain::builder`] assigns.
    ///
    /// Fails with [`MeshError::UnregisteredHandle`] when a link refers to a
    /// mesh the session has no collision tree for.
    pub fn new(mut chain: Chain, config: SessionConfig) -> Result<Self, MeshError> {
        let level = config.level;
        let link_mesh = MeshData::cylinder(level.link_radius, chain.link_length(), 12);
        let target_mesh = MeshData::uv_sphere(level.target_radius, 16, 8);
        let objective_mesh = MeshData::cuboid(Vec3::splat(1.0));

        chain.settle_on_floor(config.arena.floor_height);
        let start_pose = chain.snapshot();

        let mut session = Self {
            chain,
            start_pose,
            solver: PursuitSolver::new(config.solver),
            integrator: MotionIntegrator::new(config.arena),
            trees: Vec::new(),
            targets: Vec::new(),
            target_mesh: MeshHandle::default(),
            objective: Transform::from_position(level.objective_position),
            objective_mesh: MeshHandle::default(),
            selected: None,
            scoreboard: Scoreboard {
                score: 0,
                cash: 0,
                level: 1,
                level_goal: level.score_per_level,
            },
            objective_unlocked: false,
            level_complete: false,
            level_config: level,
            rng: Pcg64Mcg::seed_from_u64(config.seed),
        };

        session.register_mesh(&link_mesh)?;
        session.target_mesh = session.register_mesh(&target_mesh)?;
        session.objective_mesh = session.register_mesh(&objective_mesh)?;

        let registered = session.trees.len();
        if let Some((link, mesh)) = session
            .chain
            .links()
            .iter()
            .enumerate()
            .find_map(|(i, l)| (l.mesh.0 >= registered).then_some((i, l.mesh)))
        {
            return Err(MeshError::UnregisteredHandle {
                link,
                handle: mesh.0,
                registered,
            });
        }

        Ok(session)
    }

    /// Builds the collision tree for `mesh` and returns its handle.
    pub fn register_mesh(&mut self, mesh: &MeshData) -> Result<MeshHandle, MeshError> {
        let tree = AabbTree::build(mesh)?;
        self.trees.push(tree);
        Ok(MeshHandle(self.trees.len() - 1))
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut Chain {
        &mut self.chain
    }

    pub fn solver(&self) -> &PursuitSolver {
        &self.solver
    }

    pub fn targets(&self) -> &[TargetBody] {
        &self.targets
    }

    pub fn live_targets(&self) -> impl Iterator<Item = (usize, &TargetBody)> + '_ {
        self.targets.iter().enumerate().filter(|(_, t)| t.alive)
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn objective_position(&self) -> Vec3 {
        self.objective.translation()
    }

    pub fn is_objective_unlocked(&self) -> bool {
        self.objective_unlocked
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    /// Adds a target at a fixed spot and returns its index.
    pub fn add_target(&mut self, body: TargetBody) -> usize {
        self.targets.push(body);
        self.targets.len() - 1
    }

    /// Drops `count` targets into the arena along an alternating outward spiral.
    pub fn spawn_targets(&mut self, count: usize) {
        let arena = *self.integrator.config();
        let limit = arena.wall_extent;

        for i in 0..count {
            let k = i as i32;
            let offset = 1.5 * (-1.85f32).powi(k) + (-1.0f32).powi(k);
            let offset = offset.clamp(-limit, limit);
            let position = Vec3::new(offset, offset, 0.9);

            let vx = self.rng.gen_range(-0.5..0.5);
            let vy = self.rng.gen_range(-0.5..0.5);
            let velocity = Vec3::new(vx, vy, 0.0) / 30.0;
            let elasticity = arena.default_elasticity;
            self.targets.push(TargetBody::new(position, velocity, elasticity));
        }
        log::debug!("spawned {count} targets, {} in play", self.live_targets().count());
    }

    /// Starts chasing target `index`. Returns `false` when it is gone or unknown.
    pub fn acquire(&mut self, index: usize) -> bool {
        match self.targets.get(index) {
            Some(target) if target.alive => {
                self.selected = Some(index);
                self.solver.acquire();
                true
            }
            _ => false,
        }
    }

    pub fn release(&mut self) {
        self.selected = None;
        self.solver.release();
    }

    /// Manual bend of the head link.
    pub fn steer_head(&mut self, yaw: f32, pitch: f32) {
        let head = self.chain.len() - 1;
        self.chain.steer(head, yaw, pitch);
    }

    /// Advances the game by `dt` seconds: target motion, one solver step,
    /// collisions, then the chain is put back on the floor.
    pub fn tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let mut events = Vec::new();

        self.integrator.integrate(&mut self.targets, dt);
        self.pursue(&mut events);
        self.resolve_hits(&mut events);
        self.check_objective(&mut events);

        self.chain.settle_on_floor(self.integrator.config().floor_height);
        events
    }

    fn pursue(&mut self, events: &mut Vec<GameEvent>) {
        let Some(index) = self.selected else {
            return;
        };

        let report = self.solver.step(&mut self.chain, self.targets[index].position());
        match report.outcome {
            StepOutcome::Converged => {
                self.selected = None;
                events.push(GameEvent::TargetReached { target: index });
            }
            StepOutcome::Inverted => events.push(GameEvent::ChainInverted),
            StepOutcome::Advanced | StepOutcome::Idle => {}
        }
    }

    fn resolve_hits(&mut self, events: &mut Vec<GameEvent>) {
        let target_tree = &self.trees[self.target_mesh.0];

        for (index, target) in self.targets.iter_mut().enumerate() {
            if !target.alive {
                continue;
            }

            let hit = self.chain.links().iter().any(|link| {
                let link_tree = &self.trees[link.mesh.0];
                CollisionEngine::test_tree_pair(
                    link_tree,
                    &link.transform,
                    target_tree,
                    &target.transform,
                )
            });
            if !hit {
                continue;
            }

            target.alive = false;
            self.scoreboard.score += self.level_config.hit_score;
            self.scoreboard.cash += self.level_config.hit_cash;
            log::info!("target {index} hit, score {}", self.scoreboard.score);
            events.push(GameEvent::TargetHit {
                target: index,
                score: self.scoreboard.score,
                cash: self.scoreboard.cash,
            });

            if self.selected == Some(index) {
                self.selected = None;
                self.solver.release();
            }
        }
    }

    fn check_objective(&mut self, events: &mut Vec<GameEvent>) {
        if self.level_complete || self.scoreboard.score < self.scoreboard.level_goal {
            return;
        }

        if !self.objective_unlocked {
            self.objective_unlocked = true;
            events.push(GameEvent::ObjectiveUnlocked);
        }

        let objective_tree = &self.trees[self.objective_mesh.0];
        let reached = self.chain.links().iter().any(|link| {
            let link_tree = &self.trees[link.mesh.0];
            CollisionEngine::test_tree_pair(
                link_tree,
                &link.transform,
                objective_tree,
                &self.objective,
            )
        });

        if reached {
            self.level_complete = true;
            log::info!("level {} complete", self.scoreboard.level);
            events.push(GameEvent::LevelComplete {
                level: self.scoreboard.level,
            });
        }
    }

    /// Resets the chain to its starting pose and fills the arena for the next level.
    pub fn next_level(&mut self) -> Result<(), ChainError> {
        self.chain.restore(&self.start_pose)?;
        self.release();
        self.targets.clear();

        let board = &mut self.scoreboard;
        board.level += 1;
        board.score = 0;
        board.level_goal = board.level * self.level_config.score_per_level;
        self.objective_unlocked = false;
        self.level_complete = false;

        log::info!("starting level {}", board.level);
        let count = board.level as usize;
        self.spawn_targets(count);
        Ok(())
    }
}
