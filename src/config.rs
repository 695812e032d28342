//! Configuration constants for the AR tank game. Distances are in metres,
//! angles in degrees, times in seconds.

// Pools
pub const TANK_POOL_CAPACITY: i64 = 6;
pub const ROCKET_POOL_CAPACITY: i64 = 4;
pub const TANK_POOL_PARENT: &str = "TankHolders";
pub const ROCKET_POOL_PARENT: &str = "RocketProjectileHolders";

// Tank
pub const CANON_ROTATION_DEG_PER_SEC: f64 = 90.0;
pub const MAX_MOVE_ROTATION_DEG_PER_SEC: f64 = 60.0;
pub const TANK_ACCELERATION: f64 = 0.6; // Velocity change per second of joystick input
pub const TANK_LINEAR_DRAG: f64 = 2.0; // Fraction of velocity lost per second
pub const REVERSE_DOT_THRESHOLD: f64 = -0.75; // Below this the tank backs up instead of turning around
pub const MUZZLE_OFFSET: f64 = 0.12; // Rocket spawn distance in front of the turret
pub const TANK_HIT_RADIUS: f64 = 0.1;

// Rocket
pub const ROCKET_SPEED: f64 = 2.0;
pub const ROCKET_LIFETIME: f64 = 4.0;

// Input
pub const VIEWPORT_PERIPHERY: f64 = 0.15;

// HUD
pub const LABEL_GAMEPLAY: &str = "Add / Reposition Tank\n MODE: OFF";
pub const LABEL_ADD_REPOSITION_TANK: &str = "Add / Reposition Tank\n MODE: ON";

// Headless skirmish
pub const FRAME_RATE: u32 = 60;
pub const DEFAULT_SKIRMISH_TANKS: u32 = 4;
pub const DEFAULT_MAX_FRAMES: u32 = 60 * 120;
pub const PLAY_AREA_HALF_EXTENT: f64 = 1.0; // Tanks are placed in [-1, 1] on X and Z
pub const CAMERA_POSITION: (f64, f64, f64) = (0.0, 1.4, -1.8);
pub const SKIRMISH_FIRE_COOLDOWN: f64 = 0.6;
pub const SKIRMISH_AIM_TOLERANCE_DEG: f64 = 3.0;
pub const SKIRMISH_CONTROL_SECONDS: f64 = 3.0; // How long the driver keeps one tank selected
pub const SKIRMISH_ENGAGE_RANGE: f64 = 1.0; // Closer than this the driver stops advancing
