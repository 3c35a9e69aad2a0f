/// Per-frame projection, culling, depth sorting and flat shading
use std::f64::consts::PI;

use nalgebra::Point2;

use crate::camera::Camera;
use crate::colour::{Colour, Shader};
use crate::error::LinalgError;
use crate::geometry::{Face, Shape};
use crate::linalg::{Matrix, Vector};

/// Fixed parameters of a [`Renderer`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Screen units per unit of (distance-scaled) camera space.
    pub zoom: f64,
    /// Horizontal stretch applied after zoom, for non-square pixels.
    pub pixel_aspect: f64,
    /// Unit direction the light travels in.
    pub light_direction: Vector,
    /// Applied to the shape after every frame.
    pub frame_rotation: Matrix,
    pub shader: Shader,
    /// Also emit face outlines.
    pub wireframe: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let light = Vector::xyz(1.0, 0.0, -1.0);
        Self {
            zoom: 800.0,
            pixel_aspect: 1.0,
            light_direction: light.unit().unwrap_or(light),
            frame_rotation: Matrix::z_rotation(PI / 32.0),
            shader: Shader::default(),
            wireframe: false,
        }
    }
}

impl RenderConfig {
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn with_pixel_aspect(mut self, pixel_aspect: f64) -> Self {
        self.pixel_aspect = pixel_aspect;
        self
    }

    pub fn with_frame_rotation(mut self, frame_rotation: Matrix) -> Self {
        self.frame_rotation = frame_rotation;
        self
    }

    pub fn with_shader(mut self, shader: Shader) -> Self {
        self.shader = shader;
        self
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }
}

/// One filled screen-space triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: [Point2<f64>; 3],
    pub colour: Colour,
    /// Distance from the camera to the owning face's centre.
    pub depth: f64,
}

/// One outline segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point2<f64>,
    pub to: Point2<f64>,
}

/// Counters for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub faces: usize,
    pub culled_behind: usize,
    pub culled_backface: usize,
    pub triangles: usize,
    pub skipped_vertices: usize,
}

/// Everything the drawing surface needs for a frame, farthest first.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub polygons: Vec<Polygon>,
    pub wireframe: Vec<Segment>,
    pub stats: FrameStats,
}

/// Turns shapes into screen-space polygons.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Projects a world point onto the screen.
    ///
    /// The point is moved into camera space and scaled by the inverse of its
    /// full distance from the camera (not just its depth). Camera x maps to
    /// screen x and camera z to screen y, flipped because screen y grows
    /// downwards. Fails with `DivideByZero` for a point on the camera.
    pub fn project(
        &self,
        point: &Vector,
        camera: &mut Camera,
        centre: &Point2<f64>,
    ) -> Result<Point2<f64>, LinalgError> {
        let relative = point.sub(camera.position())?;
        let local = camera.inverse_rotation().mul_vector(&relative)?;
        let distance = local.length();
        if distance == 0.0 {
            return Err(LinalgError::DivideByZero);
        }
        let s = self.config.zoom / distance;
        let x = local.get(0).unwrap_or(0.0);
        let z = local.get(2).unwrap_or(0.0);
        Ok(Point2::new(
            centre.x + s * self.config.pixel_aspect * x,
            centre.y - s * z,
        ))
    }

    /// Faces the camera can see, farthest first, with their distances.
    ///
    /// A face is dropped when its centre is not in front of the camera or
    /// when the camera is behind the face's plane.
    pub fn visible_faces<'s>(
        &self,
        shape: &'s Shape,
        camera: &mut Camera,
        stats: &mut FrameStats,
    ) -> Result<Vec<(&'s Face, f64)>, LinalgError> {
        let view = camera.view_direction().clone();
        let mut visible = Vec::new();
        for face in shape.faces() {
            stats.faces += 1;
            let to_face = face.centre().sub(camera.position())?;
            if view.dot(&to_face)? <= 0.0 {
                stats.culled_behind += 1;
                continue;
            }
            if face.normal().dot(&-&to_face)? <= 0.0 {
                stats.culled_backface += 1;
                continue;
            }
            visible.push((face, to_face.length()));
        }
        visible.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(visible)
    }

    /// Brightness multiplier for a face normal under the configured light.
    pub fn intensity(&self, normal: &Vector) -> Result<f64, LinalgError> {
        let alignment = -self.config.light_direction.dot(&normal.unit()?)?;
        Ok(self.config.shader.shade(alignment))
    }

    /// Produces the frame for `shape` without changing it.
    pub fn draw(
        &self,
        shape: &Shape,
        camera: &mut Camera,
        centre: &Point2<f64>,
    ) -> Result<Frame, LinalgError> {
        let mut frame = Frame::default();

        let mut projected = Vec::with_capacity(shape.points().len());
        for point in shape.points() {
            match self.project(point, camera, centre) {
                Ok(p) => projected.push(Some(p)),
                Err(LinalgError::DivideByZero) => {
                    log::warn!("vertex {point} sits on the camera, skipping it");
                    frame.stats.skipped_vertices += 1;
                    projected.push(None);
                }
                Err(e) => return Err(e),
            }
        }

        let faces = self.visible_faces(shape, camera, &mut frame.stats)?;
        for (face, depth) in faces {
            let colour = face.colour().adjust_value(self.intensity(face.normal())?);
            for [a, b, c] in face.triangle_fan() {
                if let (Some(a), Some(b), Some(c)) = (projected[a], projected[b], projected[c]) {
                    frame.polygons.push(Polygon {
                        points: [a, b, c],
                        colour,
                        depth,
                    });
                }
            }
            if self.config.wireframe {
                for (a, b) in face.edges() {
                    if let (Some(from), Some(to)) = (projected[a], projected[b]) {
                        frame.wireframe.push(Segment { from, to });
                    }
                }
            }
        }
        frame.stats.triangles = frame.polygons.len();

        log::trace!("frame: {:?}", frame.stats);
        Ok(frame)
    }

    /// Advances the animation by one step.
    pub fn advance(&self, shape: &mut Shape) -> Result<(), LinalgError> {
        shape.apply_transform(&self.config.frame_rotation)
    }

    /// Draws the frame, then rotates the shape for the next one.
    pub fn render_frame(
        &self,
        shape: &mut Shape,
        camera: &mut Camera,
        centre: &Point2<f64>,
    ) -> Result<Frame, LinalgError> {
        let frame = self.draw(shape, camera, centre)?;
        self.advance(shape)?;
        Ok(frame)
    }
}
