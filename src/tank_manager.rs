use crate::config;
use crate::pool::{ObjectPool, PoolError, PoolHandle, PoolSettings};
use crate::rocket::{Rocket, RocketStatus};
use crate::tank::{HitOutcome, Tank};
use crate::types::{GameEvent, TankCounts, Vector3};
use log::{info, warn};
use std::collections::VecDeque;

/// Result of asking a tank to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Fired(PoolHandle<Rocket>),
    NoRocketAvailable,
    TankUnavailable,
}

/// Owns the tank and rocket pools and keeps the alive/destroyed tally.
#[derive(Debug)]
pub struct TankManager {
    tanks: ObjectPool<Tank>,
    rockets: ObjectPool<Rocket>,
    counts: TankCounts,
    events: VecDeque<GameEvent>,
}

impl TankManager {
    pub fn new(tank_settings: PoolSettings, rocket_settings: PoolSettings) -> Result<Self, PoolError> {
        let tanks = ObjectPool::new(Some(Tank::default()), config::TANK_POOL_PARENT, tank_settings)?;
        let rockets = ObjectPool::new(
            Some(Rocket::default()),
            config::ROCKET_POOL_PARENT,
            rocket_settings,
        )?;
        Ok(TankManager {
            tanks,
            rockets,
            counts: TankCounts::default(),
            events: VecDeque::new(),
        })
    }

    /// Pools sized like the shipped game: 6 tanks and 4 rockets, no growth.
    pub fn with_default_pools() -> Result<Self, PoolError> {
        TankManager::new(
            PoolSettings::fixed(config::TANK_POOL_CAPACITY),
            PoolSettings::fixed(config::ROCKET_POOL_CAPACITY),
        )
    }

    /// Takes a tank from the pool and places it facing the camera.
    pub fn add_tank(
        &mut self,
        position: Vector3,
        camera_position: Vector3,
    ) -> Result<PoolHandle<Tank>, PoolError> {
        let handle = self.tanks.acquire()?;
        if let Some(tank) = self.tanks.get_mut(handle) {
            tank.setup(position, camera_position);
        }
        self.counts.alive += 1;
        info!(
            "Tank {} added ({} alive, {} destroyed)",
            handle, self.counts.alive, self.counts.destroyed
        );
        Ok(handle)
    }

    /// Returns a tank to the pool and counts it as destroyed.
    pub fn destroy_tank(&mut self, handle: PoolHandle<Tank>) -> Result<bool, PoolError> {
        let released = self.tanks.release(handle)?;
        if released {
            self.counts.alive = self.counts.alive.saturating_sub(1);
            self.counts.destroyed += 1;
            info!(
                "Tank {} destroyed ({} alive, {} destroyed)",
                handle, self.counts.alive, self.counts.destroyed
            );
        }
        Ok(released)
    }

    /// Moves an alive tank, used while repositioning in edit mode.
    pub fn reposition_tank(&mut self, handle: PoolHandle<Tank>, position: Vector3) -> bool {
        match self.tanks.get_mut(handle) {
            Some(tank) if !tank.is_destroyed() => {
                tank.position = position;
                tank.velocity = Vector3::ZERO;
                true
            }
            _ => false,
        }
    }

    /// Launches a rocket from the tank's barrel.
    pub fn fire(&mut self, handle: PoolHandle<Tank>) -> FireOutcome {
        let (position, forward) = match self.tanks.get(handle) {
            Some(tank) if !tank.is_destroyed() => tank.muzzle(),
            _ => return FireOutcome::TankUnavailable,
        };

        match self.rockets.acquire() {
            Ok(rocket) => {
                if let Some(r) = self.rockets.get_mut(rocket) {
                    r.launch(handle, position, forward);
                }
                crate::debug_rocket!("Tank {} fired rocket {}", handle, rocket);
                FireOutcome::Fired(rocket)
            }
            Err(e) => {
                crate::debug_rocket!("Tank {} could not fire: {}", handle, e);
                FireOutcome::NoRocketAvailable
            }
        }
    }

    /// Steps tanks and rockets, queues hits and expiries, then drains the
    /// queue. Returns the events handled this frame in order.
    pub fn update(&mut self, dt: f64) -> Vec<GameEvent> {
        for (_, tank) in self.tanks.iter_active_mut() {
            tank.integrate(dt);
        }

        let targets: Vec<(PoolHandle<Tank>, Vector3)> = self
            .tanks
            .iter_active()
            .filter(|(_, tank)| !tank.is_destroyed())
            .map(|(handle, tank)| (handle, tank.position))
            .collect();

        for (handle, rocket) in self.rockets.iter_active_mut() {
            if rocket.update(dt) == RocketStatus::Expired {
                self.events.push_back(GameEvent::RocketExpired(handle));
                continue;
            }
            if let Some(&(tank, _)) = targets.iter().find(|(tank, pos)| rocket.hits(*tank, *pos)) {
                self.events.push_back(GameEvent::RocketHit {
                    rocket: handle,
                    tank,
                });
            }
        }

        self.drain_events()
    }

    fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut handled = Vec::with_capacity(self.events.len());
        while let Some(event) = self.events.pop_front() {
            match event {
                GameEvent::RocketExpired(rocket) => {
                    crate::debug_rocket!("Rocket {} expired", rocket);
                    self.return_rocket(rocket);
                }
                GameEvent::RocketHit { rocket, tank } => {
                    let shooter = self.rockets.get(rocket).and_then(|r| r.shooter);
                    self.return_rocket(rocket);
                    let outcome = self.tanks.get_mut(tank).map(Tank::on_hit);
                    if outcome == Some(HitOutcome::Destroyed) {
                        self.events
                            .push_back(GameEvent::TankDestroyed { tank, shooter });
                    }
                }
                GameEvent::TankDestroyed { tank, .. } => {
                    if let Err(e) = self.destroy_tank(tank) {
                        warn!("Could not return tank {}: {}", tank, e);
                    }
                }
            }
            handled.push(event);
        }
        handled
    }

    fn return_rocket(&mut self, rocket: PoolHandle<Rocket>) {
        if let Err(e) = self.rockets.release(rocket) {
            warn!("Could not return rocket {}: {}", rocket, e);
        }
    }

    /// Returns every tank and rocket to their pools and zeroes the tally.
    pub fn reset(&mut self) {
        let tanks = self.tanks.release_all();
        let rockets = self.rockets.release_all();
        self.events.clear();
        self.counts = TankCounts::default();
        info!("Game reset ({} tanks, {} rockets returned)", tanks, rockets);
    }

    pub fn counts(&self) -> TankCounts {
        self.counts
    }

    pub fn tank(&self, handle: PoolHandle<Tank>) -> Option<&Tank> {
        self.tanks.get(handle)
    }

    pub fn tank_mut(&mut self, handle: PoolHandle<Tank>) -> Option<&mut Tank> {
        self.tanks.get_mut(handle)
    }

    pub fn rocket(&self, handle: PoolHandle<Rocket>) -> Option<&Rocket> {
        self.rockets.get(handle)
    }

    /// Handles of tanks that are on the board and not destroyed
    pub fn alive_tanks(&self) -> Vec<PoolHandle<Tank>> {
        self.tanks
            .iter_active()
            .filter(|(_, tank)| !tank.is_destroyed())
            .map(|(handle, _)| handle)
            .collect()
    }

    pub fn active_rocket_count(&self) -> usize {
        self.rockets.active_count()
    }

    pub fn tank_pool(&self) -> &ObjectPool<Tank> {
        &self.tanks
    }

    pub fn rocket_pool(&self) -> &ObjectPool<Rocket> {
        &self.rockets
    }
}
