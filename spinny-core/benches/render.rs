use criterion::*;

use nalgebra::Point2;
use spinny_core::{Camera, Matrix, Primitive, Renderer, Shape, Vector};

fn towers() -> Shape {
    let at = |x: f64, y: f64, z: f64| Vector::xyz(x, y, z);
    let parts = [
        Primitive::Cube.at(&at(0.0, 0.0, 0.0)),
        Primitive::Cube.at(&at(0.0, 0.0, 1.0)),
        Primitive::SquarePyramid.at(&at(0.0, 0.0, 2.0)),
        Primitive::Cube.at(&at(2.0, 0.0, 0.0)),
        Primitive::Cube.at(&at(2.0, 0.0, 1.0)),
        Primitive::SquarePyramid.at(&at(2.0, 0.0, 2.0)),
        Primitive::Cube.at(&at(1.0, 0.0, 1.0)),
    ];
    let parts: Vec<Shape> = parts.into_iter().map(|p| p.unwrap()).collect();
    Shape::combine(parts, &at(-1.5, -0.5, -1.5), &Matrix::identity(3)).unwrap()
}

fn frame(c: &mut Criterion) {
    let renderer = Renderer::default();
    let mut shape = towers();
    let mut camera = Camera::default();
    let centre = Point2::new(512.0, 288.0);

    c.bench_function("towers frame", |b| {
        b.iter(|| {
            renderer
                .render_frame(black_box(&mut shape), &mut camera, &centre)
                .unwrap()
        })
    });
}

fn combine(c: &mut Criterion) {
    c.bench_function("towers combine", |b| b.iter(towers));
}

criterion_group!(benches, frame, combine);
criterion_main!(benches);
