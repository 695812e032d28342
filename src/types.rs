use crate::pool::PoolHandle;
use crate::rocket::Rocket;
use crate::tank::Tank;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// World-space vector. The AR ground plane is XZ with Y up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vector3 = Vector3 { x: 0.0, y: 1.0, z: 0.0 };
    pub const FORWARD: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Vector3 { x, y, z }
    }

    pub fn dot(self, other: Vector3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Vector3) -> f64 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a (near) zero vector.
    pub fn normalized(self) -> Vector3 {
        let len = self.length();
        if len < 1e-9 { Vector3::ZERO } else { self * (1.0 / len) }
    }

    /// Removes the component along `normal` (expected to be unit length).
    pub fn project_on_plane(self, normal: Vector3) -> Vector3 {
        self - normal * self.dot(normal)
    }

    pub fn is_zero(self) -> bool {
        self.length() < 1e-9
    }
}

impl Add for Vector3 {
    type Output = Vector3;
    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        *self = *self + rhs;
    }
}

impl Sub for Vector3 {
    type Output = Vector3;
    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;
    fn mul(self, rhs: f64) -> Vector3 {
        Vector3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vector3 {
    type Output = Vector3;
    fn neg(self) -> Vector3 {
        Vector3::new(-self.x, -self.y, -self.z)
    }
}

/// Which interaction mode the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameState {
    #[default]
    Gameplay,
    AddEditTank,
}

/// Things that happened during a frame, queued by the tank manager and
/// drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    TankDestroyed {
        tank: PoolHandle<Tank>,
        shooter: Option<PoolHandle<Tank>>,
    },
    RocketHit {
        rocket: PoolHandle<Rocket>,
        tank: PoolHandle<Tank>,
    },
    RocketExpired(PoolHandle<Rocket>),
}

/// Alive/destroyed counters pushed to the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TankCounts {
    pub alive: u32,
    pub destroyed: u32,
}
