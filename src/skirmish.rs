//! Scripted headless session: places tanks through the regular tap-to-spawn
//! path, then hands control from tank to tank, aiming each at its nearest
//! enemy and firing until one tank (or none) is left.

use crate::config;
use crate::game::{FrameInput, GameManager};
use crate::input::{InputController, OverheadViewport, PlaneHit, PlaneRaycaster, SelectInteraction, SpawnRequest, Trackable};
use crate::pool::{GrowthPolicy, PoolError, PoolHandle, PoolSettings};
use crate::tank::Tank;
use crate::tank_manager::{FireOutcome, TankManager};
use crate::types::{TankCounts, Vector3};
use crate::utils::{shortest_delta, yaw_of};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkirmishSettings {
    pub tanks: u32,
    pub max_frames: u32,
    pub seed: u64,
    pub growth: GrowthPolicy,
}

impl Default for SkirmishSettings {
    fn default() -> Self {
        SkirmishSettings {
            tanks: config::DEFAULT_SKIRMISH_TANKS,
            max_frames: config::DEFAULT_MAX_FRAMES,
            seed: 0,
            growth: GrowthPolicy::Fixed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkirmishResult {
    pub placed: u32,
    pub rejected_spawns: u32,
    pub frames: u32,
    pub rockets_fired: u32,
    pub dry_fires: u32, // Fire pressed with every rocket in flight
    pub counts: TankCounts,
    pub winner: Option<PoolHandle<Tank>>,
}

// Stands in for AR hit testing: random points on the play area, some of
// which land on feature points instead of planes.
struct ScriptedRaycaster {
    rng: StdRng,
}

impl PlaneRaycaster for ScriptedRaycaster {
    fn try_get_plane_hit(&mut self) -> Option<PlaneHit> {
        let roll: f64 = self.rng.gen_range(0.0..1.0);
        if roll < 0.05 {
            return None;
        }
        let extent = config::PLAY_AREA_HALF_EXTENT;
        let position = Vector3::new(
            self.rng.gen_range(-extent..extent),
            0.0,
            self.rng.gen_range(-extent..extent),
        );
        let trackable = if roll < 0.15 {
            Trackable::FeaturePoint
        } else {
            Trackable::Plane(1)
        };
        Some(PlaneHit { position, trackable })
    }
}

pub struct Skirmish {
    game: GameManager,
    raycaster: ScriptedRaycaster,
    viewport: OverheadViewport,
    rng: StdRng,
    settings: SkirmishSettings,
    dt: f64,
}

impl Skirmish {
    pub fn new(settings: SkirmishSettings) -> Result<Self, PoolError> {
        let tanks = TankManager::new(
            PoolSettings {
                capacity: config::TANK_POOL_CAPACITY,
                growth: settings.growth,
            },
            PoolSettings {
                capacity: config::ROCKET_POOL_CAPACITY,
                growth: settings.growth,
            },
        )?;
        let (cx, cy, cz) = config::CAMERA_POSITION;
        let extent = config::PLAY_AREA_HALF_EXTENT;
        Ok(Skirmish {
            game: GameManager::new(tanks, InputController::default(), Vector3::new(cx, cy, cz)),
            raycaster: ScriptedRaycaster {
                rng: StdRng::seed_from_u64(settings.seed),
            },
            viewport: OverheadViewport {
                min_x: -extent,
                max_x: extent,
                min_z: -extent,
                max_z: extent,
                height: cy,
            },
            rng: StdRng::seed_from_u64(settings.seed.wrapping_add(1)),
            settings,
            dt: 1.0 / config::FRAME_RATE as f64,
        })
    }

    pub fn game(&self) -> &GameManager {
        &self.game
    }

    fn step(&mut self, frame: FrameInput) -> crate::game::FrameReport {
        self.game
            .update(&frame, &mut self.raycaster, &self.viewport, self.dt)
    }

    /// Places tanks, then fights until a winner emerges or the frame limit hits.
    pub fn run(&mut self) -> SkirmishResult {
        let mut result = SkirmishResult {
            placed: 0,
            rejected_spawns: 0,
            frames: 0,
            rockets_fired: 0,
            dry_fires: 0,
            counts: TankCounts::default(),
            winner: None,
        };

        self.place_tanks(&mut result);
        if result.placed < 2 {
            warn!("Only {} tank(s) placed, nothing to fight", result.placed);
            result.counts = self.game.tanks().counts();
            result.winner = self.game.tanks().alive_tanks().first().copied();
            return result;
        }
        self.fight(&mut result);

        result.counts = self.game.tanks().counts();
        let alive = self.game.tanks().alive_tanks();
        if alive.len() == 1 {
            result.winner = Some(alive[0]);
        }
        result
    }

    fn place_tanks(&mut self, result: &mut SkirmishResult) {
        self.step(FrameInput {
            edit_toggle: Some(true),
            ..Default::default()
        });

        let max_attempts = self.settings.tanks * 20;
        let mut attempts = 0;
        while result.placed < self.settings.tanks && attempts < max_attempts {
            attempts += 1;
            self.step(FrameInput {
                select: SelectInteraction::pressed(),
                ..Default::default()
            });
            let report = self.step(FrameInput {
                select: SelectInteraction::released(),
                ..Default::default()
            });
            match (report.spawned, report.spawn_error) {
                (Some(handle), _) => {
                    result.placed += 1;
                    crate::debug_game!(frame: self.game.frame(), "Placed tank {}", handle);
                }
                (None, Some(e)) => {
                    warn!("Stopped placing tanks: {}", e);
                    break;
                }
                (None, None) => {
                    if report.spawn != SpawnRequest::NoGesture {
                        result.rejected_spawns += 1;
                        crate::debug_input!("Spawn rejected: {:?}", report.spawn);
                    }
                }
            }
        }

        self.step(FrameInput {
            edit_toggle: Some(false),
            ..Default::default()
        });
        info!(
            "{} tanks placed ({} taps rejected)",
            result.placed, result.rejected_spawns
        );
    }

    fn fight(&mut self, result: &mut SkirmishResult) {
        let control_frames = (config::SKIRMISH_CONTROL_SECONDS / self.dt) as u32;
        let mut control_left = 0u32;
        let mut cooldown = 0.0f64;

        while result.frames < self.settings.max_frames && self.game.tanks().alive_tanks().len() > 1 {
            let mut frame = FrameInput::default();

            if self.game.selected().is_none() || control_left == 0 {
                let alive = self.game.tanks().alive_tanks();
                let pick = alive[self.rng.gen_range(0..alive.len())];
                frame.tap_tank = Some(pick);
                control_left = control_frames;
                cooldown = 0.0;
            }
            control_left -= 1;
            cooldown -= self.dt;

            let controlled = frame.tap_tank.or(self.game.selected());
            if let Some(handle) = controlled {
                self.steer(handle, &mut frame, cooldown <= 0.0);
            }

            let report = self.step(frame);
            match report.fire {
                Some(FireOutcome::Fired(_)) => {
                    result.rockets_fired += 1;
                    cooldown = config::SKIRMISH_FIRE_COOLDOWN;
                }
                Some(FireOutcome::NoRocketAvailable) => result.dry_fires += 1,
                _ => {}
            }
            result.frames += 1;
        }

        info!(
            "Skirmish finished after {} frames, {} rockets fired",
            result.frames, result.rockets_fired
        );
    }

    // Aims the controlled tank at its nearest enemy, closes in, fires when lined up
    fn steer(&self, handle: PoolHandle<Tank>, frame: &mut FrameInput, may_fire: bool) {
        let tanks = self.game.tanks();
        let Some(tank) = tanks.tank(handle) else {
            return;
        };
        let nearest = tanks
            .alive_tanks()
            .into_iter()
            .filter(|other| *other != handle)
            .filter_map(|other| tanks.tank(other))
            .map(|other| other.position - tank.position)
            .min_by(|a, b| a.length().total_cmp(&b.length()));
        let Some(offset) = nearest else {
            return;
        };

        frame.aim_joystick = Some(offset);
        if offset.length() > config::SKIRMISH_ENGAGE_RANGE {
            frame.move_joystick = Some(offset);
        }
        let error = shortest_delta(tank.turret_yaw(), yaw_of(offset)).abs();
        frame.fire = may_fire && error <= config::SKIRMISH_AIM_TOLERANCE_DEG;
    }
}
