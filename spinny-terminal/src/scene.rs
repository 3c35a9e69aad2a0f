/// Demo scenes for the terminal front end
use spinny_core::{Matrix, Primitive, Shape, ShapeError, Vector};

/// Names accepted on the command line.
pub const SCENES: &[&str] = &["towers", "octahedron", "cube"];

/// Two cube towers with pyramid roofs, bridged in the middle.
pub fn towers() -> Result<Shape, ShapeError> {
    let at = |x: f64, y: f64, z: f64| Vector::xyz(x, y, z);
    let parts = vec![
        Primitive::Cube.at(&at(0.0, 0.0, 0.0))?,
        Primitive::Cube.at(&at(0.0, 0.0, 1.0))?,
        Primitive::SquarePyramid.at(&at(0.0, 0.0, 2.0))?,
        Primitive::Cube.at(&at(2.0, 0.0, 0.0))?,
        Primitive::Cube.at(&at(2.0, 0.0, 1.0))?,
        Primitive::SquarePyramid.at(&at(2.0, 0.0, 2.0))?,
        Primitive::Cube.at(&at(1.0, 0.0, 1.0))?,
    ];
    Shape::combine(parts, &at(-1.5, -0.5, -1.5), &Matrix::identity(3))
}

pub fn octahedron() -> Result<Shape, ShapeError> {
    Primitive::Octahedron.build(&Vector::xyz(1.5, 0.0, 0.0), &Matrix::uniform_scale(1.5))
}

pub fn cube() -> Result<Shape, ShapeError> {
    Primitive::Cube.build(&Vector::xyz(-0.5, -0.5, -0.5), &Matrix::uniform_scale(2.0))
}

/// Looks a scene up by name.
pub fn by_name(name: &str) -> Option<Result<Shape, ShapeError>> {
    match name {
        "towers" => Some(towers()),
        "octahedron" => Some(octahedron()),
        "cube" => Some(cube()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_scene_builds() {
        for name in SCENES {
            let shape = by_name(name).unwrap().unwrap();
            assert!(!shape.faces().is_empty(), "{name}");
        }
        assert!(by_name("teapot").is_none());
    }

    #[test]
    fn test_towers_drop_inner_walls() {
        let shape = towers().unwrap();
        // 5 cubes and 2 pyramids, minus shared corners
        assert_eq!(shape.points().len(), 26);
        // 30 cube faces + 10 pyramid faces, minus 4 cube/cube and 2
        // cube/pyramid pairs
        assert_eq!(shape.faces().len(), 28);
    }

    #[test]
    fn test_scenes_are_centred() {
        let shape = towers().unwrap();
        assert_eq!(shape.anchor().unwrap(), &Vector::xyz(-1.5, -0.5, -1.5));
    }
}
