/// Polyhedral shapes built from shared vertices and flat faces
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use crate::colour::Colour;
use crate::error::{LinalgError, ShapeError};
use crate::linalg::{Matrix, Vector};

/// A flat convex polygon over a shape's vertex list.
///
/// A face does not own its vertices. Anything that needs positions takes the
/// parent shape's point slice. The centre and normal are kept in step with
/// the parent's transforms rather than re-derived from the vertices.
#[derive(Debug, Clone)]
pub struct Face {
    indices: Vec<usize>,
    normal: Vector,
    colour: Colour,
    centre: Vector,
}

impl Face {
    pub fn new(
        points: &[Vector],
        indices: Vec<usize>,
        normal: Vector,
        colour: Colour,
    ) -> Result<Self, ShapeError> {
        if indices.len() < 3 {
            return Err(ShapeError::TooFewVertices {
                count: indices.len(),
            });
        }
        let mut sum: Option<Vector> = None;
        for &index in &indices {
            let p = points.get(index).ok_or(ShapeError::IndexOutOfRange {
                index,
                len: points.len(),
            })?;
            sum = Some(match sum {
                Some(s) => s.add(p)?,
                None => p.clone(),
            });
        }
        let centre = sum
            .ok_or(ShapeError::TooFewVertices { count: 0 })?
            .scale(1.0 / indices.len() as f64);

        Ok(Self {
            indices,
            normal,
            colour,
            centre,
        })
    }

    /// Builds a face whose normal follows the right-hand rule over the first
    /// three vertices.
    pub fn from_winding(
        points: &[Vector],
        indices: Vec<usize>,
        colour: Colour,
    ) -> Result<Self, ShapeError> {
        let corner = |i: usize| {
            indices
                .get(i)
                .and_then(|&index| points.get(index))
                .ok_or(ShapeError::TooFewVertices {
                    count: indices.len(),
                })
        };
        let (p0, p1, p2) = (corner(0)?, corner(1)?, corner(2)?);
        let normal = p1.sub(p0)?.cross(&p2.sub(p0)?)?.unit()?;
        Self::new(points, indices, normal, colour)
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn normal(&self) -> &Vector {
        &self.normal
    }

    pub fn centre(&self) -> &Vector {
        &self.centre
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    /// The unordered vertex set; this is what face equality compares.
    pub fn vertex_set(&self) -> BTreeSet<usize> {
        self.indices.iter().copied().collect()
    }

    /// Fan triangulation from the first vertex. Only valid for convex faces.
    pub fn triangle_fan(&self) -> TriangleFan<'_> {
        TriangleFan {
            indices: &self.indices,
            next: 0,
        }
    }

    /// Boundary segments as index pairs, closing back to the first vertex.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.indices.len();
        (0..n).map(move |i| (self.indices[i], self.indices[(i + 1) % n]))
    }

    /// Both faces point the same way. A zero normal never counts as facing
    /// anywhere.
    fn same_facing(&self, other: &Face) -> bool {
        self.normal == other.normal && !self.normal.is_zero()
    }

    fn offset(mut self, by: usize) -> Self {
        for i in &mut self.indices {
            *i += by;
        }
        self
    }

    /// Rewrites indices through `alias`, dropping repeats.
    fn reindex(&mut self, alias: &[usize]) {
        let mut seen = BTreeSet::new();
        self.indices = self
            .indices
            .iter()
            .map(|&i| alias[i])
            .filter(|&i| seen.insert(i))
            .collect();
    }
}

impl PartialEq for Face {
    fn eq(&self, other: &Self) -> bool {
        self.vertex_set() == other.vertex_set()
    }
}

impl Eq for Face {}

/// Index triples `(v0, v[i+1], v[i+2])` of a face's fan triangulation.
#[derive(Debug, Clone)]
pub struct TriangleFan<'a> {
    indices: &'a [usize],
    next: usize,
}

impl Iterator for TriangleFan<'_> {
    type Item = [usize; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let i = self.next;
        if i + 2 >= self.indices.len() {
            return None;
        }
        self.next += 1;
        Some([self.indices[0], self.indices[i + 1], self.indices[i + 2]])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.indices.len().saturating_sub(2 + self.next);
        (n, Some(n))
    }
}

impl ExactSizeIterator for TriangleFan<'_> {}

/// What an [`Shape::optimise`] pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimiseReport {
    pub points_before: usize,
    pub points_after: usize,
    pub faces_before: usize,
    pub faces_after: usize,
}

impl OptimiseReport {
    pub fn changed(&self) -> bool {
        self.points_before != self.points_after || self.faces_before != self.faces_after
    }
}

/// A vertex list and the faces over it. The first vertex is the anchor.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    points: Vec<Vector>,
    faces: Vec<Face>,
}

impl Shape {
    pub fn new(points: Vec<Vector>, faces: Vec<Face>) -> Result<Self, ShapeError> {
        for face in &faces {
            if let Some(&index) = face.indices.iter().find(|&&i| i >= points.len()) {
                return Err(ShapeError::IndexOutOfRange {
                    index,
                    len: points.len(),
                });
            }
        }
        Ok(Self { points, faces })
    }

    /// Places a template: anchor to `shift`, then `transform`.
    pub fn from_template(
        points: Vec<Vector>,
        faces: Vec<Face>,
        shift: &Vector,
        transform: &Matrix,
    ) -> Result<Self, ShapeError> {
        let mut shape = Self::new(points, faces)?;
        shape.move_to(shift)?;
        shape.apply_transform(transform)?;
        Ok(shape)
    }

    /// Concatenates several shapes into one.
    ///
    /// Neighbouring shapes usually share vertices and have back-to-back
    /// faces, so the result is always optimised before it is placed.
    pub fn combine<I>(shapes: I, shift: &Vector, transform: &Matrix) -> Result<Self, ShapeError>
    where
        I: IntoIterator<Item = Shape>,
    {
        let mut points = Vec::new();
        let mut faces = Vec::new();
        for shape in shapes {
            let offset = points.len();
            faces.extend(shape.faces.into_iter().map(|f| f.offset(offset)));
            points.extend(shape.points);
        }

        let mut shape = Self { points, faces };
        shape.optimise();
        shape.move_to(shift)?;
        shape.apply_transform(transform)?;
        Ok(shape)
    }

    pub fn points(&self) -> &[Vector] {
        &self.points
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn anchor(&self) -> Option<&Vector> {
        self.points.first()
    }

    pub fn with_colour(mut self, colour: Colour) -> Self {
        for face in &mut self.faces {
            face.colour = colour;
        }
        self
    }

    /// Unique boundary segments of all faces, for wireframe overlays.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let set: BTreeSet<(usize, usize)> = self
            .faces
            .iter()
            .flat_map(Face::edges)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        set.into_iter().collect()
    }

    /// Translates so the anchor lands on `pos`. An empty shape is left alone.
    pub fn move_to(&mut self, pos: &Vector) -> Result<(), LinalgError> {
        let Some(anchor) = self.anchor() else {
            return Ok(());
        };
        let offset = pos.sub(anchor)?;
        self.move_by(&offset)
    }

    /// Translates every vertex and face centre. Normals are directions and
    /// do not move.
    pub fn move_by(&mut self, offset: &Vector) -> Result<(), LinalgError> {
        let points = self
            .points
            .iter()
            .map(|p| p.add(offset))
            .collect::<Result<Vec<_>, _>>()?;
        let centres = self
            .faces
            .iter()
            .map(|f| f.centre.add(offset))
            .collect::<Result<Vec<_>, _>>()?;

        self.points = points;
        for (face, centre) in self.faces.iter_mut().zip(centres) {
            face.centre = centre;
        }
        Ok(())
    }

    /// Applies `m` to vertices, face centres and face normals alike.
    ///
    /// A transform with zero determinant can fold distinct vertices onto each
    /// other, so it is followed by an [`optimise`](Self::optimise) pass.
    pub fn apply_transform(&mut self, m: &Matrix) -> Result<(), LinalgError> {
        let points = self
            .points
            .iter()
            .map(|p| m.mul_vector(p))
            .collect::<Result<Vec<_>, _>>()?;
        let moved = self
            .faces
            .iter()
            .map(|f| Ok((m.mul_vector(&f.centre)?, m.mul_vector(&f.normal)?)))
            .collect::<Result<Vec<_>, LinalgError>>()?;
        let collapsing = m.det()? == 0.0;

        self.points = points;
        for (face, (centre, normal)) in self.faces.iter_mut().zip(moved) {
            face.centre = centre;
            face.normal = normal;
        }
        if collapsing {
            self.optimise();
        }
        Ok(())
    }

    /// Merges value-equal vertices and removes the faces that leaves
    /// degenerate or duplicated.
    ///
    /// Faces that end up with fewer than three distinct vertices are dropped.
    /// When two faces cover the same vertex set the later one is dropped if
    /// both face the same way; otherwise the pair cancels and both go. The
    /// second rule is what removes the internal walls between two shapes
    /// joined by [`combine`](Self::combine).
    pub fn optimise(&mut self) -> OptimiseReport {
        let points_before = self.points.len();
        let faces_before = self.faces.len();

        let mut first_seen: HashMap<Vec<u64>, usize> = HashMap::new();
        let mut alias = Vec::with_capacity(points_before);
        let mut points = Vec::with_capacity(points_before);
        for p in std::mem::take(&mut self.points) {
            match first_seen.entry(p.bit_key()) {
                Entry::Occupied(e) => alias.push(*e.get()),
                Entry::Vacant(e) => {
                    e.insert(points.len());
                    alias.push(points.len());
                    points.push(p);
                }
            }
        }

        let mut kept: Vec<Option<Face>> = Vec::with_capacity(faces_before);
        let mut slots: HashMap<BTreeSet<usize>, usize> = HashMap::new();
        for mut face in std::mem::take(&mut self.faces) {
            face.reindex(&alias);
            if face.indices.len() < 3 {
                continue;
            }
            match slots.entry(face.vertex_set()) {
                Entry::Vacant(e) => {
                    e.insert(kept.len());
                    kept.push(Some(face));
                }
                Entry::Occupied(e) => {
                    let slot = *e.get();
                    let same = kept[slot]
                        .as_ref()
                        .is_some_and(|other| other.same_facing(&face));
                    if !same {
                        kept[slot] = None;
                        e.remove();
                    }
                }
            }
        }

        self.points = points;
        self.faces = kept.into_iter().flatten().collect();

        let report = OptimiseReport {
            points_before,
            points_after: self.points.len(),
            faces_before,
            faces_after: self.faces.len(),
        };
        log::debug!(
            "optimise: {} -> {} points, {} -> {} faces",
            report.points_before,
            report.points_after,
            report.faces_before,
            report.faces_after
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points(z: f64) -> Vec<Vector> {
        vec![
            Vector::xyz(0.0, 0.0, z),
            Vector::xyz(1.0, 0.0, z),
            Vector::xyz(1.0, 1.0, z),
            Vector::xyz(0.0, 1.0, z),
        ]
    }

    fn up() -> Vector {
        Vector::xyz(0.0, 0.0, 1.0)
    }

    #[test]
    fn test_face_centre_is_vertex_mean() {
        let points = square_points(2.0);
        let face = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        assert_eq!(face.centre(), &Vector::xyz(0.5, 0.5, 2.0));
    }

    #[test]
    fn test_face_validation() {
        let points = square_points(0.0);
        assert_eq!(
            Face::new(&points, vec![0, 1], up(), Colour::WHITE).unwrap_err(),
            ShapeError::TooFewVertices { count: 2 }
        );
        assert_eq!(
            Face::new(&points, vec![0, 1, 7], up(), Colour::WHITE).unwrap_err(),
            ShapeError::IndexOutOfRange { index: 7, len: 4 }
        );
    }

    #[test]
    fn test_recolouring_keeps_identity() {
        let points = square_points(0.0);
        let mut face = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let before = face.clone();
        face.set_colour(Colour::BLACK);
        assert_eq!(face.colour(), Colour::BLACK);
        assert_eq!(face, before);
    }

    #[test]
    fn test_from_winding_normal() {
        let points = square_points(0.0);
        let ccw = Face::from_winding(&points, vec![0, 1, 2, 3], Colour::WHITE).unwrap();
        assert_eq!(ccw.normal(), &up());
        let cw = Face::from_winding(&points, vec![3, 2, 1, 0], Colour::WHITE).unwrap();
        assert_eq!(cw.normal(), &-up());
    }

    #[test]
    fn test_face_equality_ignores_order_and_normal() {
        let points = square_points(0.0);
        let a = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![2, 3, 0, 1], -up(), Colour::BLACK).unwrap();
        let c = Face::new(&points, vec![0, 1, 2], up(), Colour::WHITE).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_triangle_fan() {
        let points = [square_points(0.0), square_points(1.0)].concat();
        let face = Face::new(&points, vec![4, 5, 6, 7, 1], up(), Colour::WHITE).unwrap();
        let fan: Vec<_> = face.triangle_fan().collect();
        assert_eq!(fan, vec![[4, 5, 6], [4, 6, 7], [4, 7, 1]]);
        assert_eq!(face.triangle_fan().len(), 3);
        // restartable
        assert_eq!(face.triangle_fan().collect::<Vec<_>>(), fan);

        let tri = Face::new(&points, vec![0, 1, 2], up(), Colour::WHITE).unwrap();
        assert_eq!(tri.triangle_fan().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_face_edges_close_the_loop() {
        let points = square_points(0.0);
        let face = Face::new(&points, vec![0, 1, 2], up(), Colour::WHITE).unwrap();
        assert_eq!(face.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_move_to_anchor() {
        let points = square_points(0.0);
        let face = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![face]).unwrap();
        shape.move_to(&Vector::xyz(5.0, -1.0, 2.0)).unwrap();
        assert_eq!(shape.anchor().unwrap(), &Vector::xyz(5.0, -1.0, 2.0));
        assert_eq!(shape.points()[2], Vector::xyz(6.0, 0.0, 2.0));
        assert_eq!(shape.faces()[0].centre(), &Vector::xyz(5.5, -0.5, 2.0));
        assert_eq!(shape.faces()[0].normal(), &up());
    }

    #[test]
    fn test_transform_moves_centre_and_normal_in_step() {
        let points = square_points(1.0);
        let face = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![face]).unwrap();
        let m = Matrix::x_rotation(std::f64::consts::FRAC_PI_2);
        shape.apply_transform(&m).unwrap();

        let face = &shape.faces()[0];
        let mean = face
            .indices()
            .iter()
            .fold(Vector::zeros(3), |acc, &i| acc.add(&shape.points()[i]).unwrap())
            .scale(0.25);
        assert!(mean.sub(face.centre()).unwrap().length() < 1e-9);
        let expected = Vector::xyz(0.0, -1.0, 0.0);
        assert!(face.normal().sub(&expected).unwrap().length() < 1e-9);
    }

    #[test]
    fn test_transform_size_mismatch_leaves_shape_untouched() {
        let points = square_points(0.0);
        let mut shape = Shape::new(points.clone(), vec![]).unwrap();
        let m = Matrix::identity(2);
        assert!(shape.apply_transform(&m).is_err());
        assert_eq!(shape.points(), &points[..]);
    }

    #[test]
    fn test_duplicate_same_normal_keeps_one() {
        let points = square_points(0.0);
        let a = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![1, 2, 3, 0], up(), Colour::BLACK).unwrap();
        let mut shape = Shape::new(points, vec![a, b]).unwrap();
        let report = shape.optimise();
        assert_eq!(report.faces_after, 1);
        assert_eq!(shape.faces()[0].colour(), Colour::WHITE);
    }

    // Opposite-facing duplicates cancel each other out entirely. This is how
    // the shared wall between two joined shapes disappears.
    #[test]
    fn test_duplicate_opposite_normal_keeps_neither() {
        let points = square_points(0.0);
        let a = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![3, 2, 1, 0], -up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![a, b]).unwrap();
        shape.optimise();
        assert!(shape.faces().is_empty());
        assert_eq!(shape.points().len(), 4);
    }

    #[test]
    fn test_third_duplicate_after_cancel_is_kept() {
        let points = square_points(0.0);
        let a = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![3, 2, 1, 0], -up(), Colour::WHITE).unwrap();
        let c = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::BLACK).unwrap();
        let mut shape = Shape::new(points, vec![a, b, c]).unwrap();
        shape.optimise();
        assert_eq!(shape.faces().len(), 1);
        assert_eq!(shape.faces()[0].colour(), Colour::BLACK);
    }

    #[test]
    fn test_merged_vertices_are_aliased() {
        // two triangles sharing an edge, written with duplicate vertices
        let points = vec![
            Vector::xyz(0.0, 0.0, 0.0),
            Vector::xyz(1.0, 0.0, 0.0),
            Vector::xyz(1.0, 1.0, 0.0),
            Vector::xyz(0.0, 0.0, 0.0),
            Vector::xyz(1.0, 1.0, 0.0),
            Vector::xyz(0.0, 1.0, 0.0),
        ];
        let a = Face::new(&points, vec![0, 1, 2], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![3, 4, 5], up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![a, b]).unwrap();
        let report = shape.optimise();
        assert_eq!(report.points_after, 4);
        assert_eq!(shape.faces()[1].indices(), &[0, 2, 3]);
    }

    #[test]
    fn test_degenerate_face_is_dropped() {
        let points = vec![
            Vector::xyz(0.0, 0.0, 0.0),
            Vector::xyz(1.0, 0.0, 0.0),
            Vector::xyz(0.0, 0.0, 0.0),
            Vector::xyz(1.0, 1.0, 0.0),
        ];
        let sliver = Face::new(&points, vec![0, 1, 2], up(), Colour::WHITE).unwrap();
        let tri = Face::new(&points, vec![0, 1, 3], up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![sliver, tri]).unwrap();
        shape.optimise();
        assert_eq!(shape.faces().len(), 1);
        assert_eq!(shape.faces()[0].indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_optimise_is_idempotent() {
        let points = [square_points(0.0), square_points(0.0)].concat();
        let a = Face::new(&points, vec![0, 1, 2, 3], up(), Colour::WHITE).unwrap();
        let b = Face::new(&points, vec![4, 5, 6], up(), Colour::WHITE).unwrap();
        let mut shape = Shape::new(points, vec![a, b]).unwrap();
        assert!(shape.optimise().changed());
        let once = shape.clone();
        assert!(!shape.optimise().changed());
        assert_eq!(shape.points(), once.points());
        assert_eq!(shape.faces(), once.faces());
    }

    #[test]
    fn test_combine_offsets_indices() {
        let lower = Shape::new(
            square_points(0.0),
            vec![Face::new(&square_points(0.0), vec![0, 1, 2], up(), Colour::WHITE).unwrap()],
        )
        .unwrap();
        let upper = Shape::new(
            square_points(1.0),
            vec![Face::new(&square_points(1.0), vec![0, 1, 2], up(), Colour::WHITE).unwrap()],
        )
        .unwrap();
        let shape = Shape::combine(
            [lower, upper],
            &Vector::xyz(0.0, 0.0, 0.0),
            &Matrix::identity(3),
        )
        .unwrap();
        assert_eq!(shape.points().len(), 8);
        assert_eq!(shape.faces()[1].indices(), &[4, 5, 6]);
    }

    #[test]
    fn test_shape_rejects_bad_index() {
        let points = square_points(0.0);
        let face = Face::new(&points, vec![0, 1, 3], up(), Colour::WHITE).unwrap();
        let err = Shape::new(points[..3].to_vec(), vec![face]).unwrap_err();
        assert_eq!(err, ShapeError::IndexOutOfRange { index: 3, len: 3 });
    }
}
