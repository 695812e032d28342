use crate::hud::Hud;
use crate::input::{InputController, PlaneRaycaster, SelectInteraction, SpawnRequest, ViewportProjector};
use crate::pool::{PoolError, PoolHandle};
use crate::tank::Tank;
use crate::tank_manager::{FireOutcome, TankManager};
use crate::types::{GameEvent, GameState, Vector3};
use log::{info, warn};

/// Everything the player did this frame, as plain data
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub select: SelectInteraction,
    pub edit_toggle: Option<bool>,
    pub tap_tank: Option<PoolHandle<Tank>>,
    pub drag_tank: Option<(PoolHandle<Tank>, Vector3)>,
    pub move_joystick: Option<Vector3>,
    pub aim_joystick: Option<Vector3>,
    pub fire: bool,
    pub reset: bool,
}

/// What the frame did in response
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub spawn: SpawnRequest,
    pub spawned: Option<PoolHandle<Tank>>,
    pub spawn_error: Option<PoolError>,
    pub selected: Option<PoolHandle<Tank>>,
    pub fire: Option<FireOutcome>,
    pub events: Vec<GameEvent>,
}

/// Top-level session: game state, tank selection and per-frame orchestration.
#[derive(Debug)]
pub struct GameManager {
    state: GameState,
    tanks: TankManager,
    input: InputController,
    hud: Hud,
    selected: Option<PoolHandle<Tank>>,
    camera_position: Vector3,
    frame: u64,
}

impl GameManager {
    pub fn new(tanks: TankManager, input: InputController, camera_position: Vector3) -> Self {
        let mut game = GameManager {
            state: GameState::Gameplay,
            tanks,
            input,
            hud: Hud::default(),
            selected: None,
            camera_position,
            frame: 0,
        };
        game.hud.update_tank_counts(game.tanks.counts());
        game
    }

    /// Runs one frame of input handling and simulation.
    pub fn update<R, P>(
        &mut self,
        frame: &FrameInput,
        raycaster: &mut R,
        projector: &P,
        dt: f64,
    ) -> FrameReport
    where
        R: PlaneRaycaster + ?Sized,
        P: ViewportProjector + ?Sized,
    {
        if frame.reset {
            self.reset();
        }
        if let Some(is_on) = frame.edit_toggle {
            let requested = self.hud.on_toggle_clicked(is_on);
            self.set_game_state(requested);
        }

        let spawn = self
            .input
            .resolve_spawn(frame.select, self.state, raycaster, projector);
        let mut spawned = None;
        let mut spawn_error = None;
        if let SpawnRequest::At(position) = spawn {
            match self.tanks.add_tank(position, self.camera_position) {
                Ok(handle) => spawned = Some(handle),
                Err(e) => {
                    warn!("Tank not placed: {}", e);
                    spawn_error = Some(e);
                }
            }
        }

        if let Some(handle) = frame.tap_tank {
            self.select_tank(handle);
        }

        let mut fire = None;
        match self.state {
            GameState::AddEditTank => {
                if let Some((handle, position)) = frame.drag_tank {
                    self.tanks.reposition_tank(handle, position);
                }
            }
            GameState::Gameplay => {
                if let Some(handle) = self.selected {
                    if let Some(tank) = self.tanks.tank_mut(handle) {
                        if let Some(direction) = frame.move_joystick {
                            tank.move_in_direction(direction, dt);
                        }
                        if let Some(direction) = frame.aim_joystick {
                            tank.rotate_cannon(direction, dt);
                        }
                    }
                    if frame.fire {
                        fire = Some(self.tanks.fire(handle));
                    }
                }
            }
        }

        let events = self.tanks.update(dt);
        for event in &events {
            if let GameEvent::TankDestroyed { tank, .. } = event {
                if self.selected == Some(*tank) {
                    crate::debug_game!(frame: self.frame, "Selected tank {} destroyed", tank);
                    self.selected = None;
                }
            }
        }
        self.hud.update_tank_counts(self.tanks.counts());
        self.frame += 1;

        FrameReport {
            spawn,
            spawned,
            spawn_error,
            selected: self.selected,
            fire,
            events,
        }
    }

    pub fn set_game_state(&mut self, state: GameState) {
        if state != self.state {
            info!("Game state changed to {:?}", state);
        }
        self.state = state;
        self.hud.on_game_state_changed(state);
    }

    /// Makes `handle` the controlled tank. Destroyed or unknown tanks are refused.
    pub fn select_tank(&mut self, handle: PoolHandle<Tank>) -> bool {
        let selectable = self
            .tanks
            .tank(handle)
            .is_some_and(Tank::can_be_selected);
        if !selectable {
            crate::debug_game!(frame: self.frame, "Tank {} cannot be selected", handle);
            return false;
        }

        if let Some(previous) = self.selected.take() {
            if let Some(tank) = self.tanks.tank_mut(previous) {
                tank.set_selected(false);
            }
        }
        if let Some(tank) = self.tanks.tank_mut(handle) {
            tank.set_selected(true);
        }
        self.selected = Some(handle);
        crate::debug_game!(frame: self.frame, "Tank {} selected", handle);
        true
    }

    /// Returns all tanks and rockets to their pools and clears the board.
    pub fn reset(&mut self) {
        self.tanks.reset();
        self.selected = None;
        self.hud.update_tank_counts(self.tanks.counts());
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn tanks(&self) -> &TankManager {
        &self.tanks
    }

    pub fn tanks_mut(&mut self) -> &mut TankManager {
        &mut self.tanks
    }

    pub fn selected(&self) -> Option<PoolHandle<Tank>> {
        self.selected
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{OverheadViewport, PlaneHit, Trackable};
    use crate::types::TankCounts;
    use std::collections::VecDeque;

    const DT: f64 = 1.0 / 60.0;

    // Hands out queued plane hits, one per raycast
    struct QueuedHits(VecDeque<Vector3>);

    impl PlaneRaycaster for QueuedHits {
        fn try_get_plane_hit(&mut self) -> Option<PlaneHit> {
            self.0.pop_front().map(|position| PlaneHit {
                position,
                trackable: Trackable::Plane(7),
            })
        }
    }

    fn viewport() -> OverheadViewport {
        OverheadViewport {
            min_x: -1.0,
            max_x: 1.0,
            min_z: -1.0,
            max_z: 1.0,
            height: 1.5,
        }
    }

    fn game() -> GameManager {
        GameManager::new(
            TankManager::with_default_pools().unwrap(),
            InputController::default(),
            Vector3::new(0.0, 1.5, 5.0),
        )
    }

    fn step(game: &mut GameManager, hits: &mut QueuedHits, frame: FrameInput) -> FrameReport {
        game.update(&frame, hits, &viewport(), DT)
    }

    fn place(game: &mut GameManager, hits: &mut QueuedHits) -> Option<PoolHandle<Tank>> {
        step(game, hits, FrameInput { select: SelectInteraction::pressed(), ..Default::default() });
        step(game, hits, FrameInput { select: SelectInteraction::released(), ..Default::default() }).spawned
    }

    fn two_tanks(game: &mut GameManager) -> (PoolHandle<Tank>, PoolHandle<Tank>) {
        let mut hits = QueuedHits(VecDeque::from(vec![Vector3::ZERO, Vector3::new(0.0, 0.0, 0.5)]));
        step(game, &mut hits, FrameInput { edit_toggle: Some(true), ..Default::default() });
        let a = place(game, &mut hits).unwrap();
        let b = place(game, &mut hits).unwrap();
        step(game, &mut hits, FrameInput { edit_toggle: Some(false), ..Default::default() });
        (a, b)
    }

    #[test]
    fn test_spawn_only_in_edit_mode() {
        let mut game = game();
        let mut hits = QueuedHits(VecDeque::from(vec![Vector3::ZERO]));
        assert!(place(&mut game, &mut hits).is_none());
        assert_eq!(game.tanks().counts().alive, 0);

        step(&mut game, &mut hits, FrameInput { edit_toggle: Some(true), ..Default::default() });
        assert_eq!(game.state(), GameState::AddEditTank);
        assert!(game.hud().edit_toggle_on);

        let mut hits = QueuedHits(VecDeque::from(vec![Vector3::ZERO]));
        assert!(place(&mut game, &mut hits).is_some());
        assert_eq!(game.hud().tanks_alive_text, "1");
    }

    #[test]
    fn test_pool_exhaustion_is_reported() {
        let mut game = game();
        let mut hits = QueuedHits((0..7).map(|i| Vector3::new(0.0, 0.0, i as f64 * 0.1)).collect());
        step(&mut game, &mut hits, FrameInput { edit_toggle: Some(true), ..Default::default() });
        for _ in 0..6 {
            assert!(place(&mut game, &mut hits).is_some());
        }
        step(&mut game, &mut hits, FrameInput { select: SelectInteraction::pressed(), ..Default::default() });
        let report = step(&mut game, &mut hits, FrameInput { select: SelectInteraction::released(), ..Default::default() });
        assert!(report.spawned.is_none());
        assert_eq!(report.spawn_error, Some(PoolError::CapacityExceeded { capacity: 6 }));
    }

    #[test]
    fn test_selection_moves_selector() {
        let mut game = game();
        let (a, b) = two_tanks(&mut game);
        assert!(game.select_tank(a));
        assert!(game.tanks().tank(a).unwrap().is_selected());
        assert!(game.select_tank(b));
        assert!(!game.tanks().tank(a).unwrap().is_selected());
        assert!(game.tanks().tank(b).unwrap().is_selected());
        assert_eq!(game.selected(), Some(b));
    }

    #[test]
    fn test_selected_tank_fires_and_destroys() {
        let mut game = game();
        let (a, b) = two_tanks(&mut game);
        let mut hits = QueuedHits(VecDeque::new());

        // Both tanks face +Z, so tank a is already aimed at tank b
        let report = step(&mut game, &mut hits, FrameInput { tap_tank: Some(a), fire: true, ..Default::default() });
        assert_eq!(report.selected, Some(a));
        assert!(matches!(report.fire, Some(FireOutcome::Fired(_))));

        let mut destroyed = false;
        for _ in 0..60 {
            let report = step(&mut game, &mut hits, FrameInput::default());
            if report.events.iter().any(|e| matches!(e, GameEvent::TankDestroyed { tank, .. } if *tank == b)) {
                destroyed = true;
                break;
            }
        }
        assert!(destroyed);
        assert_eq!(game.tanks().counts(), TankCounts { alive: 1, destroyed: 1 });
        assert_eq!(game.hud().tanks_alive_text, "1");
        assert_eq!(game.hud().tanks_destroyed_text, "1");
        assert!(!game.select_tank(b));
    }

    #[test]
    fn test_destroyed_selection_is_cleared() {
        let mut game = game();
        let (a, b) = two_tanks(&mut game);
        let mut hits = QueuedHits(VecDeque::new());
        assert!(game.select_tank(b));
        game.tanks_mut().fire(a);
        for _ in 0..60 {
            step(&mut game, &mut hits, FrameInput::default());
        }
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_joysticks_drive_selected_tank() {
        let mut game = game();
        let (a, _) = two_tanks(&mut game);
        let mut hits = QueuedHits(VecDeque::new());
        let start = game.tanks().tank(a).unwrap().position;
        for _ in 0..30 {
            step(
                &mut game,
                &mut hits,
                FrameInput {
                    tap_tank: Some(a),
                    move_joystick: Some(Vector3::new(-1.0, 0.0, 0.0)),
                    aim_joystick: Some(Vector3::new(1.0, 0.0, 0.0)),
                    ..Default::default()
                },
            );
        }
        let tank = game.tanks().tank(a).unwrap();
        assert!(tank.position.x < start.x);
        assert!(tank.hull_yaw < 0.0);
        assert!(tank.turret_yaw() > 0.0);
    }

    #[test]
    fn test_drag_repositions_in_edit_mode() {
        let mut game = game();
        let (a, _) = two_tanks(&mut game);
        let mut hits = QueuedHits(VecDeque::new());
        let target = Vector3::new(-0.4, 0.0, 0.2);
        step(&mut game, &mut hits, FrameInput { drag_tank: Some((a, target)), ..Default::default() });
        assert_ne!(game.tanks().tank(a).unwrap().position, target);

        step(
            &mut game,
            &mut hits,
            FrameInput { edit_toggle: Some(true), drag_tank: Some((a, target)), ..Default::default() },
        );
        assert_eq!(game.tanks().tank(a).unwrap().position, target);
    }

    #[test]
    fn test_reset_clears_board() {
        let mut game = game();
        let (a, _) = two_tanks(&mut game);
        game.select_tank(a);
        let mut hits = QueuedHits(VecDeque::new());
        step(&mut game, &mut hits, FrameInput { reset: true, ..Default::default() });
        assert_eq!(game.selected(), None);
        assert_eq!(game.tanks().counts(), TankCounts::default());
        assert_eq!(game.hud().tanks_alive_text, "0");
        assert!(game.tanks().tank(a).is_none());
    }
}
