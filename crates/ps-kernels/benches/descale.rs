use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ps_core::{Image, Rect};
use ps_kernels::{Descaler, Kernel, Resampler, ResamplingPrimitive};

fn test_plane(width: usize, height: usize) -> Image<f32> {
    let mut data = Vec::with_capacity(width * height);
    for i in 0..(width * height) {
        data.push((i % 251) as f32 / 250.0);
    }
    Image::from_vec(width, height, data).expect("valid image")
}

fn bench_descale_bicubic(c: &mut Criterion) {
    let img = test_plane(1280, 720);
    let descaler = Descaler::new(Kernel::default());
    let rect = Rect::full(960, 540);

    c.bench_function("descale_bicubic_1280x720_to_960x540", |b| {
        b.iter(|| {
            let out = descaler
                .execute(black_box(&img), 960, 540, rect)
                .expect("descale");
            black_box(out);
        });
    });
}

fn bench_resize_spline36(c: &mut Criterion) {
    let img = test_plane(960, 540);
    let resampler = Resampler::new(Kernel::Spline36);
    let rect = Rect::full(960, 540);

    c.bench_function("resize_spline36_960x540_to_1280x720", |b| {
        b.iter(|| {
            let out = resampler
                .execute(black_box(&img), 1280, 720, rect)
                .expect("resize");
            black_box(out);
        });
    });
}

criterion_group!(benches, bench_descale_bicubic, bench_resize_spline36);
criterion_main!(benches);
