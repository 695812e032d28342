use crate::config;
use crate::types::{GameState, TankCounts};

/// Text and toggle state shown on screen. The UI layer reads these fields;
/// game logic pushes plain data in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hud {
    pub tanks_alive_text: String,
    pub tanks_destroyed_text: String,
    pub game_state_text: String,
    pub edit_toggle_on: bool,
}

impl Default for Hud {
    fn default() -> Self {
        let mut hud = Hud {
            tanks_alive_text: String::new(),
            tanks_destroyed_text: String::new(),
            game_state_text: String::new(),
            edit_toggle_on: false,
        };
        hud.update_tank_counts(TankCounts::default());
        hud.on_game_state_changed(GameState::default());
        hud
    }
}

impl Hud {
    /// Maps the edit-mode toggle to the requested game state.
    pub fn on_toggle_clicked(&self, is_on: bool) -> GameState {
        if is_on {
            GameState::AddEditTank
        } else {
            GameState::Gameplay
        }
    }

    pub fn on_game_state_changed(&mut self, state: GameState) {
        match state {
            GameState::Gameplay => {
                self.edit_toggle_on = false;
                self.game_state_text = config::LABEL_GAMEPLAY.to_string();
            }
            GameState::AddEditTank => {
                self.edit_toggle_on = true;
                self.game_state_text = config::LABEL_ADD_REPOSITION_TANK.to_string();
            }
        }
    }

    pub fn update_tank_counts(&mut self, counts: TankCounts) {
        self.tanks_alive_text = counts.alive.to_string();
        self.tanks_destroyed_text = counts.destroyed.to_string();
    }
}
