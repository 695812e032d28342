use crate::config;
use crate::pool::{PoolHandle, Reusable};
use crate::tank::Tank;
use crate::types::Vector3;

/// Flight status after a frame update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RocketStatus {
    InFlight,
    Expired,
}

// A pooled rocket projectile flying in a straight line
#[derive(Debug, Clone, Default)]
pub struct Rocket {
    pub position: Vector3,
    pub forward: Vector3,
    pub shooter: Option<PoolHandle<Tank>>,
    active_time: f64,
    visible: bool,
}

impl Rocket {
    /// Launches from `position` along `forward`, ignoring hits on `shooter`.
    pub fn launch(&mut self, shooter: PoolHandle<Tank>, position: Vector3, forward: Vector3) {
        self.shooter = Some(shooter);
        self.position = position;
        self.forward = forward.normalized();
        self.active_time = 0.0;
    }

    pub fn update(&mut self, dt: f64) -> RocketStatus {
        self.active_time += dt;
        self.position += self.forward * (config::ROCKET_SPEED * dt);
        if self.active_time > config::ROCKET_LIFETIME {
            RocketStatus::Expired
        } else {
            RocketStatus::InFlight
        }
    }

    /// True when the rocket is inside the hit radius of a tank other than its shooter.
    pub fn hits(&self, tank: PoolHandle<Tank>, tank_position: Vector3) -> bool {
        self.shooter != Some(tank)
            && self.position.distance(tank_position) <= config::TANK_HIT_RADIUS
    }

    pub fn active_time(&self) -> f64 {
        self.active_time
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Reusable for Rocket {
    fn on_retrieved_from_pool(&mut self) {
        self.visible = true;
    }

    fn on_returned_to_pool(&mut self) {
        self.visible = false;
        self.shooter = None;
    }
}
