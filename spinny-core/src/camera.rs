/// First-person camera with pitch/yaw orientation
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::error::LinalgError;
use crate::linalg::{Matrix, Vector};

/// Construction parameters for a [`Camera`].
#[derive(Debug, Clone)]
pub struct CameraConfig {
    pub position: Vector,
    /// Up/down angle in radians, clamped to [-pi/2, pi/2].
    pub pitch: f64,
    /// Left/right angle in radians, wrapped into [0, 2pi).
    pub yaw: f64,
    /// Distance moved per unit of input.
    pub speed: f64,
    /// Angle turned per key press.
    pub rot_speed: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vector::xyz(0.0, -10.0, 0.0),
            pitch: 0.0,
            yaw: 0.0,
            speed: 0.1,
            rot_speed: PI / 64.0,
        }
    }
}

impl CameraConfig {
    pub fn with_position(mut self, position: Vector) -> Self {
        self.position = position;
        self
    }

    pub fn with_angles(mut self, pitch: f64, yaw: f64) -> Self {
        self.pitch = pitch;
        self.yaw = yaw;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }
}

/// Rotation derived from the current angles.
#[derive(Debug, Clone)]
struct Orientation {
    rotation: Matrix,
    inverse: Matrix,
    view: Vector,
}

/// A camera in a z-up world that looks along +y when both angles are zero.
///
/// The orientation matrix and view direction are derived lazily. `turn`
/// drops the cached values whenever an angle changes and the next accessor
/// call rebuilds them.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vector,
    pitch: f64,
    yaw: f64,
    speed: f64,
    rot_speed: f64,
    orientation: Option<Orientation>,
}

impl Camera {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: config.position,
            pitch: config.pitch.clamp(-FRAC_PI_2, FRAC_PI_2),
            yaw: wrap_yaw(config.yaw),
            speed: config.speed,
            rot_speed: config.rot_speed,
            orientation: None,
        }
    }

    pub fn position(&self) -> &Vector {
        &self.position
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn rot_speed(&self) -> f64 {
        self.rot_speed
    }

    /// World up.
    pub fn up_axis() -> Vector {
        Vector::xyz(0.0, 0.0, 1.0)
    }

    /// The view direction when both angles are zero.
    pub fn forward_axis() -> Vector {
        Vector::xyz(0.0, 1.0, 0.0)
    }

    pub fn is_orientation_cached(&self) -> bool {
        self.orientation.is_some()
    }

    fn orientation(&mut self) -> &Orientation {
        let (pitch, yaw) = (self.pitch, self.yaw);
        self.orientation.get_or_insert_with(|| {
            // R = Rz(yaw) * Rx(pitch), multiplied out. Yaw goes first:
            // swapping the order makes looking up while turning tilt the
            // horizon.
            let (sp, cp) = pitch.sin_cos();
            let (sy, cy) = yaw.sin_cos();
            let rotation = Matrix::rotation([
                [cy, -sy * cp, sy * sp],
                [sy, cy * cp, -cy * sp],
                [0.0, sp, cp],
            ]);
            let inverse = rotation.transpose();
            // R applied to the forward axis is R's middle column.
            let view = Vector::xyz(-sy * cp, cy * cp, sp);
            Orientation {
                rotation,
                inverse,
                view,
            }
        })
    }

    /// Camera-to-world rotation.
    pub fn rotation_matrix(&mut self) -> &Matrix {
        &self.orientation().rotation
    }

    /// World-to-camera rotation (the transpose of [`rotation_matrix`](Self::rotation_matrix)).
    pub fn inverse_rotation(&mut self) -> &Matrix {
        &self.orientation().inverse
    }

    /// Unit vector the camera is looking along.
    pub fn view_direction(&mut self) -> &Vector {
        &self.orientation().view
    }

    /// Moves by `v` given in camera axes (x right, y forward, z up).
    ///
    /// The vertical part is applied as is, so looking up or down never sends
    /// the camera through the floor. The rest is rotated by the orientation.
    pub fn move_by(&mut self, v: &Vector) -> Result<(), LinalgError> {
        let up = Self::up_axis();
        let vertical = v.project([&up])?;
        let planar = v.sub(&vertical)?;
        let delta = self.rotation_matrix().mul_vector(&planar)?.add(&vertical)?;
        self.position = self.position.add(&delta.scale(self.speed))?;
        Ok(())
    }

    /// Adds to pitch (clamped) and yaw (wrapped).
    pub fn turn(&mut self, pitch_delta: f64, yaw_delta: f64) {
        if yaw_delta != 0.0 {
            self.yaw = wrap_yaw(self.yaw + yaw_delta);
            self.orientation = None;
        }
        if pitch_delta != 0.0 {
            self.pitch = (self.pitch + pitch_delta).clamp(-FRAC_PI_2, FRAC_PI_2);
            self.orientation = None;
        }
    }

    /// Turns by whole steps of the rotational speed.
    pub fn turn_steps(&mut self, pitch_steps: f64, yaw_steps: f64) {
        let step = self.rot_speed;
        self.turn(pitch_steps * step, yaw_steps * step);
    }
}

/// Wraps into [0, 2pi). `rem_euclid` rounds tiny negative inputs up to
/// exactly 2pi, which belongs to 0.
fn wrap_yaw(yaw: f64) -> f64 {
    let wrapped = yaw.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
