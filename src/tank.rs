use crate::config;
use crate::pool::Reusable;
use crate::types::Vector3;
use crate::utils::{direction_from_yaw, flat_direction, normalize_angle, rotate_towards, yaw_of};

/// Result of a rocket striking a tank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    Destroyed,
    AlreadyDestroyed,
}

// A pooled tank: hull on the ground plane with a turret that turns independently
#[derive(Debug, Clone, Default)]
pub struct Tank {
    pub name: String,
    pub position: Vector3,
    pub velocity: Vector3,
    pub hull_yaw: f64,      // Degrees, 0 = +Z
    pub turret_offset: f64, // Turret yaw relative to the hull, degrees
    visible: bool,
    selected: bool,
    destroyed: bool,
    destroyed_marker: bool,
    interactable: bool,
}

impl Tank {
    /// Places the tank at `position` facing the camera, turret centred.
    pub fn setup(&mut self, position: Vector3, camera_position: Vector3) {
        self.position = position;
        self.velocity = Vector3::ZERO;
        self.hull_yaw = flat_direction(camera_position - position)
            .map(yaw_of)
            .unwrap_or(0.0);
        self.turret_offset = 0.0;
        crate::debug_tank!(
            "{} set up at ({:.2}, {:.2}, {:.2}) facing {:.1}",
            self.name,
            position.x,
            position.y,
            position.z,
            self.hull_yaw
        );
    }

    pub fn forward(&self) -> Vector3 {
        direction_from_yaw(self.hull_yaw)
    }

    /// Absolute turret yaw in degrees
    pub fn turret_yaw(&self) -> f64 {
        normalize_angle(self.hull_yaw + self.turret_offset)
    }

    pub fn turret_forward(&self) -> Vector3 {
        direction_from_yaw(self.turret_yaw())
    }

    /// Turns the turret towards the joystick direction, limited by the turret rotation speed.
    pub fn rotate_cannon(&mut self, joystick_direction: Vector3, dt: f64) {
        let Some(target) = flat_direction(joystick_direction) else {
            return;
        };
        let turret = rotate_towards(
            self.turret_yaw(),
            yaw_of(target),
            config::CANON_ROTATION_DEG_PER_SEC * dt,
        );
        self.turret_offset = normalize_angle(turret - self.hull_yaw);
    }

    /// Steers the hull towards `direction` and accelerates along it. A direction
    /// roughly behind the tank makes it reverse instead of turning around.
    pub fn move_in_direction(&mut self, direction: Vector3, dt: f64) {
        let Some(move_dir) = flat_direction(direction) else {
            return;
        };
        let multiplier = if move_dir.dot(self.forward()) > config::REVERSE_DOT_THRESHOLD {
            1.0
        } else {
            -1.0
        };

        self.hull_yaw = rotate_towards(
            self.hull_yaw,
            yaw_of(move_dir * multiplier),
            config::MAX_MOVE_ROTATION_DEG_PER_SEC * dt,
        );
        self.velocity += self.forward() * (multiplier * config::TANK_ACCELERATION * dt);
    }

    /// Advances the position by the current velocity and bleeds off speed.
    pub fn integrate(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        let keep = (1.0 - config::TANK_LINEAR_DRAG * dt).max(0.0);
        self.velocity = self.velocity * keep;
    }

    pub fn on_hit(&mut self) -> HitOutcome {
        if self.destroyed {
            return HitOutcome::AlreadyDestroyed;
        }
        self.destroyed = true;
        self.destroyed_marker = true;
        self.interactable = false;
        crate::debug_tank!("{} destroyed", self.name);
        HitOutcome::Destroyed
    }

    /// Rocket spawn point and direction at the end of the barrel
    pub fn muzzle(&self) -> (Vector3, Vector3) {
        let dir = self.turret_forward();
        (self.position + dir * config::MUZZLE_OFFSET, dir)
    }

    pub fn can_be_selected(&self) -> bool {
        self.visible && self.interactable && !self.destroyed
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn shows_destroyed_marker(&self) -> bool {
        self.destroyed_marker
    }
}

impl Reusable for Tank {
    fn on_retrieved_from_pool(&mut self) {
        self.visible = true;
        self.selected = false;
        self.destroyed = false;
        self.destroyed_marker = false;
        self.interactable = true;
    }

    fn on_returned_to_pool(&mut self) {
        self.visible = false;
        self.selected = false;
        self.interactable = false;
    }

    fn on_created(&mut self, parent: &str, index: usize) {
        self.name = format!("{}/Tank{}", parent, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn active_tank() -> Tank {
        let mut tank = Tank::default();
        tank.on_created("Holders", 0);
        tank.on_retrieved_from_pool();
        tank
    }

    #[test]
    fn test_setup_faces_camera() {
        let mut tank = active_tank();
        tank.turret_offset = 45.0;
        tank.setup(Vector3::ZERO, Vector3::new(1.0, 1.5, 0.0));
        assert_approx_eq!(tank.hull_yaw, 90.0);
        assert_approx_eq!(tank.turret_offset, 0.0);
        assert_eq!(tank.name, "Holders/Tank0");
    }

    #[test]
    fn test_rotate_cannon_is_rate_limited() {
        let mut tank = active_tank();
        tank.setup(Vector3::ZERO, Vector3::new(0.0, 1.0, 5.0));
        // 90 deg/s for half a second
        tank.rotate_cannon(Vector3::new(1.0, 0.0, 0.0), 0.5);
        assert_approx_eq!(tank.turret_yaw(), 45.0);
        tank.rotate_cannon(Vector3::new(1.0, 0.0, 0.0), 1.0);
        assert_approx_eq!(tank.turret_yaw(), 90.0);
        // Hull untouched
        assert_approx_eq!(tank.hull_yaw, 0.0);
    }

    #[test]
    fn test_rotate_cannon_ignores_vertical_input() {
        let mut tank = active_tank();
        tank.rotate_cannon(Vector3::UP, 1.0);
        assert_approx_eq!(tank.turret_offset, 0.0);
    }

    #[test]
    fn test_move_forward_and_reverse() {
        let mut tank = active_tank();
        tank.setup(Vector3::ZERO, Vector3::new(0.0, 1.0, 5.0));

        tank.move_in_direction(Vector3::FORWARD, 0.5);
        assert!(tank.velocity.z > 0.0);
        assert_approx_eq!(tank.hull_yaw, 0.0);

        // Straight behind: back up without turning
        let mut reversing = active_tank();
        reversing.setup(Vector3::ZERO, Vector3::new(0.0, 1.0, 5.0));
        reversing.move_in_direction(-Vector3::FORWARD, 0.5);
        assert!(reversing.velocity.z < 0.0);
        assert_approx_eq!(reversing.hull_yaw, 0.0);
    }

    #[test]
    fn test_move_turns_hull_and_turret_follows() {
        let mut tank = active_tank();
        tank.setup(Vector3::ZERO, Vector3::new(0.0, 1.0, 5.0));
        tank.move_in_direction(Vector3::new(1.0, 0.0, 0.0), 0.5);
        assert_approx_eq!(tank.hull_yaw, 30.0);
        assert_approx_eq!(tank.turret_yaw(), 30.0);
    }

    #[test]
    fn test_integrate_moves_and_slows() {
        let mut tank = active_tank();
        tank.velocity = Vector3::new(0.0, 0.0, 1.0);
        tank.integrate(0.1);
        assert_approx_eq!(tank.position.z, 0.1);
        assert_approx_eq!(tank.velocity.z, 0.8);
    }

    #[test]
    fn test_hit_once() {
        let mut tank = active_tank();
        assert!(tank.can_be_selected());
        assert_eq!(tank.on_hit(), HitOutcome::Destroyed);
        assert_eq!(tank.on_hit(), HitOutcome::AlreadyDestroyed);
        assert!(tank.is_destroyed());
        assert!(tank.shows_destroyed_marker());
        assert!(!tank.can_be_selected());
    }

    #[test]
    fn test_pool_hooks_reset_state() {
        let mut tank = active_tank();
        tank.set_selected(true);
        tank.on_hit();
        tank.on_returned_to_pool();
        assert!(!tank.is_visible());
        assert!(!tank.is_selected());

        tank.on_retrieved_from_pool();
        assert!(tank.is_visible());
        assert!(!tank.is_destroyed());
        assert!(!tank.shows_destroyed_marker());
        assert!(tank.can_be_selected());
    }

    #[test]
    fn test_muzzle_in_front_of_turret() {
        let mut tank = active_tank();
        tank.setup(Vector3::ZERO, Vector3::new(0.0, 1.0, 5.0));
        let (pos, dir) = tank.muzzle();
        assert_approx_eq!(pos.z, config::MUZZLE_OFFSET);
        assert_approx_eq!(dir.z, 1.0);
    }
}
