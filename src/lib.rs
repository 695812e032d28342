//! Game logic for an AR tank game: pooled tanks and rockets, spawn gestures,
//! turret aiming, firing and a plain-data HUD. Engine services (AR hit
//! testing, camera projection) come in through the traits in [`input`] and
//! [`pool::Reusable`].

pub mod config;
pub mod game;
pub mod hud;
pub mod input;
pub mod logging;
pub mod pool;
pub mod rocket;
pub mod skirmish;
pub mod tank;
pub mod tank_manager;
pub mod types;
pub mod utils;
