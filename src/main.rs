//! Headless scripted run: the snake hunts the nearest target until the time runs out.
//!
//! `RUST_LOG=debug cargo run` shows solver and collision activity.

use glam::Vec3;
use snake_ik::game::{GameEvent, Session, SessionConfig};
use snake_ik::ik::Chain;

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u32 = 60 * 120;
const LAST_LEVEL: u32 = 3;

struct App {
    session: Session,
    frame: u32,
}

impl App {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let chain = Chain::builder()
            .links(10)
            .link_length(1.6)
            .root(Vec3::ZERO)
            .direction(Vec3::Y)
            .build()?;

        let mut session = Session::new(chain, SessionConfig::default().with_seed(2024))?;
        session.spawn_targets(1);

        Ok(Self { session, frame: 0 })
    }

    fn nearest_target(&self) -> Option<usize> {
        let head = self.session.chain().tip();
        self.session
            .live_targets()
            .min_by(|(_, a), (_, b)| {
                let da = a.position().distance_squared(head);
                let db = b.position().distance_squared(head);
                da.total_cmp(&db)
            })
            .map(|(i, _)| i)
    }

    fn objective_step(&mut self) {
        // nothing left to eat: drag the chain toward the objective
        let head = self.session.chain().tip();
        let to_goal = self.session.objective_position() - head;
        let heading = Vec3::new(to_goal.x, to_goal.y, 0.0).normalize_or_zero();
        self.session.chain_mut().translate(heading * 0.05);
    }

    /// Returns `false` once the run is over.
    fn update(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        self.frame += 1;

        if self.session.selected().is_none() {
            match self.nearest_target() {
                Some(index) => {
                    self.session.acquire(index);
                }
                None if self.session.is_objective_unlocked() => self.objective_step(),
                None => {}
            }
        }

        for event in self.session.tick(FRAME_DT) {
            match event {
                GameEvent::TargetHit { target, score, cash } => {
                    log::info!(
                        "frame {}: ate target {target} (score {score}, cash {cash})",
                        self.frame
                    );
                }
                GameEvent::ObjectiveUnlocked => log::info!("objective unlocked"),
                GameEvent::LevelComplete { level } => {
                    log::info!("level {level} finished at frame {}", self.frame);
                    if level >= LAST_LEVEL {
                        return Ok(false);
                    }
                    self.session.next_level()?;
                }
                other => log::debug!("frame {}: {other:?}", self.frame),
            }
        }

        Ok(self.frame < MAX_FRAMES)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut app = App::new()?;
    while app.update()? {}

    let board = app.session.scoreboard();
    log::info!(
        "run ended after {} frames: level {}, score {}, cash {}",
        app.frame,
        board.level,
        board.score,
        board.cash
    );
    Ok(())
}
