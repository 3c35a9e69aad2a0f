/// Built-in convex shape templates
use crate::colour::Colour;
use crate::error::ShapeError;
use crate::geometry::{Face, Shape};
use crate::linalg::{Matrix, Vector};

/// The shapes that can be placed directly into a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Unit cube with its anchor at the origin corner.
    Cube,
    /// Unit square base on z = 0 with the apex at (0.5, 0.5, 1).
    SquarePyramid,
    /// Vertices at distance 1 along each axis.
    Octahedron,
    /// A single +z facing unit square.
    Square,
}

impl Primitive {
    /// Template vertices, anchor first.
    fn points(&self) -> Vec<[f64; 3]> {
        match self {
            Self::Cube => vec![
                [0.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [1.0, 0.0, 1.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, 0.0],
            ],
            Self::SquarePyramid => vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.5, 0.5, 1.0],
            ],
            Self::Octahedron => vec![
                [1.0, 0.0, 0.0],
                [-1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, -1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 0.0, -1.0],
            ],
            Self::Square => vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
        }
    }

    /// Template faces as counter-clockwise (seen from outside) index loops
    /// with their default colours.
    fn faces(&self) -> Vec<(Vec<usize>, Colour)> {
        match self {
            Self::Cube => vec![
                (vec![0, 3, 2, 1], Colour::new(0xd0, 0x30, 0x30)), // y = 0
                (vec![4, 5, 6, 7], Colour::new(0x30, 0xd0, 0x30)), // y = 1
                (vec![0, 1, 5, 4], Colour::new(0x30, 0x30, 0xd0)), // x = 0
                (vec![3, 7, 6, 2], Colour::new(0xd0, 0xd0, 0x30)), // x = 1
                (vec![0, 4, 7, 3], Colour::new(0xd0, 0x30, 0xd0)), // z = 0
                (vec![1, 2, 6, 5], Colour::new(0x30, 0xd0, 0xd0)), // z = 1
            ],
            Self::SquarePyramid => {
                let side = Colour::new(0xff, 0x7f, 0x00);
                vec![
                    (vec![0, 3, 2, 1], Colour::new(0x66, 0x00, 0x33)),
                    (vec![0, 1, 4], side),
                    (vec![1, 2, 4], side),
                    (vec![2, 3, 4], side),
                    (vec![3, 0, 4], side),
                ]
            }
            Self::Octahedron => {
                let mut faces = Vec::with_capacity(8);
                for (x, y, z) in [
                    (0, 2, 4),
                    (2, 1, 4),
                    (1, 3, 4),
                    (3, 0, 4),
                    (2, 0, 5),
                    (1, 2, 5),
                    (3, 1, 5),
                    (0, 3, 5),
                ] {
                    let colour = if z == 4 {
                        Colour::new(0x7f, 0x00, 0xff)
                    } else {
                        Colour::new(0x00, 0xff, 0xff)
                    };
                    faces.push((vec![x, y, z], colour));
                }
                faces
            }
            Self::Square => vec![(vec![0, 1, 2, 3], Colour::new(0xff, 0xff, 0xff))],
        }
    }

    /// Builds the template, anchors it at `shift` and applies `transform`.
    pub fn build(&self, shift: &Vector, transform: &Matrix) -> Result<Shape, ShapeError> {
        let points: Vec<Vector> = self
            .points()
            .iter()
            .map(|&[x, y, z]| Vector::xyz(x, y, z))
            .collect();
        let body_centre = points
            .iter()
            .try_fold(Vector::zeros(3), |acc, p| acc.add(p))?
            .scale(1.0 / points.len() as f64);

        let mut faces = Vec::new();
        for (mut indices, colour) in self.faces() {
            let mut face = Face::from_winding(&points, indices.clone(), colour)?;
            // keep normals pointing away from the body
            if face.normal().dot(&face.centre().sub(&body_centre)?)? < 0.0 {
                indices.reverse();
                face = Face::from_winding(&points, indices, colour)?;
            }
            faces.push(face);
        }

        Shape::from_template(points, faces, shift, transform)
    }

    /// Places the template at `shift` without any further transform.
    pub fn at(&self, shift: &Vector) -> Result<Shape, ShapeError> {
        self.build(shift, &Matrix::identity(3))
    }
}
