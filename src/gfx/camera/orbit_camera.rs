//! Orbit camera parametrized by two angles and a distance around the origin.
//!
//! The camera always looks at the world origin. Its pose is stored as
//! `(azimuth, elevation, distance)` in degrees and world units; the eye position
//! and up vector are derived from those three values after every mutation and
//! are never edited directly.

use cgmath::*;

use super::camera_controller::CameraInput;

/// World up used to re-derive the camera basis.
const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

pub const MIN_ELEVATION_DEG: f32 = -89.0;
pub const MAX_ELEVATION_DEG: f32 = 89.0;
pub const MIN_DISTANCE: f32 = 1.0;
/// Far enough that nothing inside the far plane is visible, small enough that
/// squaring the eye position cannot overflow.
pub const MAX_DISTANCE: f32 = 1.0e6;
pub const MIN_FOV_DEG: f32 = 30.0;
pub const MAX_FOV_DEG: f32 = 90.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

const DEFAULT_FOV_DEG: f32 = 45.0;
const DEFAULT_DISTANCE: f32 = 10.0;
const DEFAULT_AZIMUTH_DEG: f32 = 90.0;
const DEFAULT_ELEVATION_DEG: f32 = 30.0;
const DEFAULT_VIEWPORT: (u32, u32) = (800, 640);

/// Scale factors applied to raw input deltas.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Sensitivities {
    /// Degrees of orbit per unit of input delta
    pub orbit: f32,
    /// World units of distance per unit of scroll
    pub zoom: f32,
    /// Degrees of field of view per widen/narrow step
    pub fov: f32,
}

impl Default for Sensitivities {
    fn default() -> Self {
        Self {
            orbit: 0.3,
            zoom: 0.5,
            fov: 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    azimuth: f32,
    elevation: f32,
    distance: f32,
    fov: f32,
    sensitivities: Sensitivities,
    viewport: (u32, u32),
    eye: Vector3<f32>,
    up: Vector3<f32>,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitCamera {
    /// Creates a camera in the default pose: 10 units out, 90° azimuth, 30° up.
    pub fn new() -> Self {
        let mut camera = Self {
            azimuth: DEFAULT_AZIMUTH_DEG,
            elevation: DEFAULT_ELEVATION_DEG,
            distance: DEFAULT_DISTANCE,
            fov: DEFAULT_FOV_DEG,
            sensitivities: Sensitivities::default(),
            viewport: DEFAULT_VIEWPORT,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            up: WORLD_UP,
        };
        camera.update();
        camera
    }

    /// Restores the default pose and field of view.
    ///
    /// Sensitivities and viewport size are kept.
    pub fn reset(&mut self) {
        self.azimuth = DEFAULT_AZIMUTH_DEG;
        self.elevation = DEFAULT_ELEVATION_DEG;
        self.distance = DEFAULT_DISTANCE;
        self.fov = DEFAULT_FOV_DEG;
        self.update();
    }

    /// Rotates the camera around the origin.
    ///
    /// Positive `dx` increases azimuth; positive `dy` lowers the elevation
    /// because screen-space Y grows in the opposite direction.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let (step_az, step_el) = (dx * self.sensitivities.orbit, dy * self.sensitivities.orbit);
        let azimuth = self.azimuth + step_az;
        let elevation = self.elevation - step_el;
        if !azimuth.is_finite() || !elevation.is_finite() {
            return;
        }
        self.azimuth = wrap_degrees(azimuth);
        self.elevation = elevation.clamp(MIN_ELEVATION_DEG, MAX_ELEVATION_DEG);
        self.update();
    }

    /// Moves the camera along its line of sight. Positive deltas move closer.
    pub fn zoom(&mut self, scroll_delta: f32) {
        let distance = self.distance - scroll_delta * self.sensitivities.zoom;
        if !distance.is_finite() {
            return;
        }
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update();
    }

    pub fn widen_fov(&mut self) {
        self.fov = (self.fov + self.sensitivities.fov).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
    }

    pub fn narrow_fov(&mut self) {
        self.fov = (self.fov - self.sensitivities.fov).clamp(MIN_FOV_DEG, MAX_FOV_DEG);
    }

    pub fn set_sensitivities(&mut self, sensitivities: Sensitivities) {
        self.sensitivities = sensitivities;
    }

    /// Stores the viewport size used for the projection aspect ratio.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    /// Applies a single input event.
    pub fn apply(&mut self, input: CameraInput) {
        match input {
            CameraInput::Orbit { dx, dy } => self.orbit(dx, dy),
            CameraInput::Zoom(delta) => self.zoom(delta),
            CameraInput::WidenFov => self.widen_fov(),
            CameraInput::NarrowFov => self.narrow_fov(),
            CameraInput::Resize { width, height } => self.set_viewport(width, height),
            CameraInput::Reset => self.reset(),
        }
    }

    /// Right-handed view matrix looking from the eye at the origin.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(Point3::from_vec(self.eye), Point3::origin(), self.up)
    }

    pub fn perspective(&self) -> PerspectiveFov<f32> {
        PerspectiveFov {
            fovy: Deg(self.fov).into(),
            aspect: self.aspect_ratio(),
            near: Z_NEAR,
            far: Z_FAR,
        }
    }

    /// Perspective projection in OpenGL clip conventions.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.perspective().into()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    /// World-space eye position.
    pub fn position(&self) -> Point3<f32> {
        Point3::from_vec(self.eye)
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Unit vector from the eye towards the origin.
    pub fn front(&self) -> Vector3<f32> {
        (-self.eye).normalize()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.front().cross(WORLD_UP).normalize()
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn sensitivities(&self) -> Sensitivities {
        self.sensitivities
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Re-derives eye position and up vector from the spherical pose.
    fn update(&mut self) {
        self.eye = calculate_cartesian_eye_position(self.azimuth, self.elevation, self.distance);
        let front = (-self.eye).normalize();
        let right = front.cross(WORLD_UP).normalize();
        self.up = right.cross(front).normalize();
    }
}

/// Folds an angle into `[0, 360)`.
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn calculate_cartesian_eye_position(azimuth: f32, elevation: f32, distance: f32) -> Vector3<f32> {
    let (az, el) = (Rad::from(Deg(azimuth)), Rad::from(Deg(elevation)));
    Vector3::new(
        az.0.cos() * el.0.cos(),
        el.0.sin(),
        az.0.sin() * el.0.cos(),
    ) * distance
}
