use criterion::{black_box, criterion_group, criterion_main, Criterion};
use depthseg::{
    BoundingBox, CameraIntrinsics, CloudPoint, DepthMap, PinholeModel, PointCloud, Projector,
    RadialTangentialDistortion, StatisticalOutlierFilter, UndistortConfig,
};
use image::{Luma, Rgba, RgbaImage};
use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_frames(w: u32, h: u32, seed: u64) -> (RgbaImage, DepthMap) {
    let mut rng = StdRng::seed_from_u64(seed);
    let color = RgbaImage::from_fn(w, h, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255]));
    let depth = DepthMap::from_fn(w, h, |_, _| {
        // roughly 10% holes
        if rng.gen_bool(0.1) {
            Luma([0])
        } else {
            Luma([rng.gen_range(400u16..4000u16)])
        }
    });
    (color, depth)
}

fn make_cloud(n: usize, seed: u64) -> PointCloud {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| CloudPoint {
            position: Point3::new(
                rng.gen_range(-0.5..0.5),
                rng.gen_range(-0.5..0.5),
                rng.gen_range(1.0..1.5),
            ),
            color: None,
        })
        .collect()
}

fn bench_projection(c: &mut Criterion) {
    let (color, depth) = make_frames(640, 480, 7);
    let bbox = BoundingBox::new(0, 0, 640, 480);
    let intrinsics = CameraIntrinsics {
        fx: 600.0,
        fy: 600.0,
        cx: 320.0,
        cy: 240.0,
        width: 640,
        height: 480,
    };
    let pinhole = Projector::Pinhole(PinholeModel {
        intrinsics,
        distortion: None,
        undistort: UndistortConfig::default(),
    });
    let distorted = Projector::Pinhole(PinholeModel {
        intrinsics,
        distortion: Some(RadialTangentialDistortion {
            k1: -0.15,
            k2: 0.05,
            p1: 0.001,
            p2: -0.001,
            k3: 0.0,
        }),
        undistort: UndistortConfig::default(),
    });

    c.bench_function("project_pinhole_640x480", |b| {
        b.iter(|| {
            let cloud = pinhole
                .project(black_box(&color), black_box(&depth), black_box(&bbox))
                .expect("matching frame sizes");
            black_box(cloud.len())
        })
    });

    c.bench_function("project_distorted_640x480", |b| {
        b.iter(|| {
            let cloud = distorted
                .project(black_box(&color), black_box(&depth), black_box(&bbox))
                .expect("matching frame sizes");
            black_box(cloud.len())
        })
    });
}

fn bench_outlier_filter(c: &mut Criterion) {
    let filter = StatisticalOutlierFilter::new(20, 1.0).expect("positive parameters");
    let cloud_500 = make_cloud(500, 11);
    let cloud_2000 = make_cloud(2000, 13);

    c.bench_function("outlier_filter_500pts_k20", |b| {
        b.iter(|| black_box(filter.apply(black_box(&cloud_500)).len()))
    });

    c.bench_function("outlier_filter_2000pts_k20", |b| {
        b.iter(|| black_box(filter.apply(black_box(&cloud_2000)).len()))
    });
}

criterion_group!(hotpaths, bench_projection, bench_outlier_filter);
criterion_main!(hotpaths);
