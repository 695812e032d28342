use crate::config;
use crate::types::{GameState, Vector3};

/// Per-frame state of the AR select (tap) interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectInteraction {
    pub activated_this_frame: bool,
    pub active: bool,
    pub deactivated_this_frame: bool,
    pub has_selection: bool, // The interactor is currently holding an object
}

impl SelectInteraction {
    pub fn pressed() -> Self {
        SelectInteraction {
            activated_this_frame: true,
            active: true,
            ..Default::default()
        }
    }

    pub fn held(has_selection: bool) -> Self {
        SelectInteraction {
            active: true,
            has_selection,
            ..Default::default()
        }
    }

    pub fn released() -> Self {
        SelectInteraction {
            deactivated_this_frame: true,
            ..Default::default()
        }
    }
}

/// Tracks one press of the select interaction. A spawn is attempted when the
/// press ends without anything having been grabbed during it.
#[derive(Debug, Default)]
pub struct SpawnGesture {
    ever_had_selection: bool,
}

impl SpawnGesture {
    pub fn update(&mut self, state: SelectInteraction) -> bool {
        if state.activated_this_frame {
            self.ever_had_selection = state.has_selection;
        } else if state.active {
            self.ever_had_selection |= state.has_selection;
        } else if state.deactivated_this_frame {
            return !state.has_selection && !self.ever_had_selection;
        }
        false
    }
}

/// What an AR raycast landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trackable {
    Plane(u64),
    FeaturePoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub position: Vector3,
    pub trackable: Trackable,
}

/// AR hit testing, owned by the engine
pub trait PlaneRaycaster {
    fn try_get_plane_hit(&mut self) -> Option<PlaneHit>;
}

/// Camera world-to-viewport projection, owned by the engine. The result has
/// x and y in [0, 1] across the screen and z as depth in front of the camera.
pub trait ViewportProjector {
    fn world_to_viewport(&self, point: Vector3) -> Vector3;
}

/// Viewport looking straight down on a rectangle of the ground plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverheadViewport {
    pub min_x: f64,
    pub max_x: f64,
    pub min_z: f64,
    pub max_z: f64,
    pub height: f64, // Camera height; points above it are behind the camera
}

impl ViewportProjector for OverheadViewport {
    fn world_to_viewport(&self, point: Vector3) -> Vector3 {
        Vector3::new(
            (point.x - self.min_x) / (self.max_x - self.min_x),
            (point.z - self.min_z) / (self.max_z - self.min_z),
            self.height - point.y,
        )
    }
}

/// Outcome of a frame's spawn handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnRequest {
    NoGesture,
    NotInEditMode,
    NoSurfaceHit,
    NotAPlane,
    OutsideViewport,
    At(Vector3),
}

/// Turns tap gestures into tank placement requests.
#[derive(Debug)]
pub struct InputController {
    gesture: SpawnGesture,
    viewport_periphery: f64,
}

impl Default for InputController {
    fn default() -> Self {
        InputController::new(config::VIEWPORT_PERIPHERY)
    }
}

impl InputController {
    pub fn new(viewport_periphery: f64) -> Self {
        InputController {
            gesture: SpawnGesture::default(),
            viewport_periphery,
        }
    }

    pub fn resolve_spawn<R, P>(
        &mut self,
        select: SelectInteraction,
        game_state: GameState,
        raycaster: &mut R,
        projector: &P,
    ) -> SpawnRequest
    where
        R: PlaneRaycaster + ?Sized,
        P: ViewportProjector + ?Sized,
    {
        if !self.gesture.update(select) {
            return SpawnRequest::NoGesture;
        }
        if game_state != GameState::AddEditTank {
            return SpawnRequest::NotInEditMode;
        }
        let Some(hit) = raycaster.try_get_plane_hit() else {
            return SpawnRequest::NoSurfaceHit;
        };
        if !matches!(hit.trackable, Trackable::Plane(_)) {
            return SpawnRequest::NotAPlane;
        }
        if !self.in_view(projector.world_to_viewport(hit.position)) {
            crate::debug_input!(
                "Spawn at ({:.2}, {:.2}) rejected, too close to the screen edge",
                hit.position.x,
                hit.position.z
            );
            return SpawnRequest::OutsideViewport;
        }
        SpawnRequest::At(hit.position)
    }

    /// True when a viewport point is in front of the camera and clear of the periphery.
    pub fn in_view(&self, viewport_point: Vector3) -> bool {
        let min = self.viewport_periphery;
        let max = 1.0 - self.viewport_periphery;
        viewport_point.z >= 0.0
            && (min..=max).contains(&viewport_point.x)
            && (min..=max).contains(&viewport_point.y)
    }
}
