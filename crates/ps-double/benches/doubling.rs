use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ps_core::{Image, Plane, Range};
use ps_double::{CubicLineDoubler, DoublingFilters, EdgeLineAverage, aa2x, ee2x};
use ps_window::WindowedImage;

fn test_image(width: usize, height: usize) -> WindowedImage<Plane> {
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 219 + 16) as u8);
    }
    let img = Image::from_vec(width, height, data).expect("valid image");
    WindowedImage::new(Plane::from_u8(&img, Range::Limited))
}

fn bench_aa2x_cubic(c: &mut Criterion) {
    let img = test_image(640, 360);

    c.bench_function("aa2x_cubic_640x360", |b| {
        b.iter(|| {
            let out = aa2x(black_box(&img), DoublingFilters::default()).expect("doubled");
            black_box(out);
        });
    });
}

fn bench_ee2x(c: &mut Criterion) {
    let img = test_image(640, 360);
    let fast = CubicLineDoubler;
    let edge = EdgeLineAverage::default();

    c.bench_function("ee2x_edge_line_average_640x360", |b| {
        b.iter(|| {
            let out = ee2x(black_box(&img), DoublingFilters::new(&fast, &edge), false)
                .expect("doubled");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_aa2x_cubic, bench_ee2x);
criterion_main!(benches);
