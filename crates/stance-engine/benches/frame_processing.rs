//! Benchmarks for per-frame engine stages.

use std::sync::Arc;
use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stance_core::{joint_angle, AngleSet, Joint, JointFrame, Keypoint, Orientation, Timestamp};
use stance_engine::angles::AngleExtractor;
use stance_engine::calibration::reduce_samples;
use stance_engine::config::{CalibrationConfig, EngineConfig};
use stance_engine::engine::PostureEngine;
use stance_engine::orientation::OrientationClassifier;
use stance_engine::smoother::FrameSmoother;
use stance_engine::store::InMemoryProfileStore;

fn create_test_frame(t: i64) -> JointFrame {
    let wobble = (t as f64 * 0.1).sin() * 3.0;
    let mut joints = vec![Joint::new(300.0, 300.0, 0.5); Keypoint::COUNT];
    joints[Keypoint::Nose.index()] = Joint::new(330.0, 100.0, 0.9);
    joints[Keypoint::RightShoulder.index()] = Joint::new(320.0 + wobble, 200.0, 0.9);
    joints[Keypoint::LeftShoulder.index()] = Joint::new(300.0, 200.0, 0.2);
    joints[Keypoint::RightElbow.index()] = Joint::new(330.0, 300.0 + wobble, 0.9);
    joints[Keypoint::RightWrist.index()] = Joint::new(430.0, 290.0, 0.9);
    joints[Keypoint::RightHip.index()] = Joint::new(320.0, 400.0, 0.9);
    joints[Keypoint::RightKnee.index()] = Joint::new(330.0, 500.0, 0.9);
    joints[Keypoint::RightAnkle.index()] = Joint::new(320.0, 600.0, 0.9);

    JointFrame::new(Timestamp::from_millis(t), joints).unwrap()
}

fn benchmark_stages(c: &mut Criterion) {
    let frame = create_test_frame(0);
    let classifier = OrientationClassifier::default();
    let extractor = AngleExtractor::default();

    c.bench_function("joint_angle", |b| {
        b.iter(|| {
            joint_angle(
                black_box(frame.position(Keypoint::RightShoulder)),
                black_box(frame.position(Keypoint::RightElbow)),
                black_box(frame.position(Keypoint::RightWrist)),
            )
        })
    });

    c.bench_function("classify_orientation", |b| {
        b.iter(|| classifier.classify(black_box(&frame)))
    });

    c.bench_function("extract_angles", |b| {
        b.iter(|| extractor.extract(black_box(&frame), Orientation::RightProfile))
    });

    let mut smoother = FrameSmoother::new(5);
    for t in 0..5 {
        smoother.update(&create_test_frame(t));
    }
    c.bench_function("smoother_window_5", |b| b.iter(|| black_box(&smoother).current()));
}

fn benchmark_calibration_reduce(c: &mut Criterion) {
    let extractor = AngleExtractor::default();
    // 5 seconds at 30 fps
    let samples: Vec<AngleSet> = (0..150)
        .map(|t| extractor.extract(&create_test_frame(t), Orientation::RightProfile))
        .collect();
    let config = CalibrationConfig::default();

    c.bench_function("reduce_150_samples", |b| {
        b.iter(|| reduce_samples(black_box(&samples), &config))
    });
}

fn benchmark_engine(c: &mut Criterion) {
    let store = Arc::new(InMemoryProfileStore::new());
    let mut engine = PostureEngine::new(EngineConfig::default(), store).unwrap();
    let frames: Vec<JointFrame> = (0..30).map(create_test_frame).collect();

    // Calibrate once so the benchmark covers evaluation
    let t0 = Instant::now();
    engine.process_frame_at(&frames[0], t0);
    engine.start_calibration_at(t0).unwrap();
    for frame in &frames {
        engine.process_frame_at(frame, t0);
    }
    engine.process_frame_at(&frames[0], t0 + Duration::from_secs(6));

    c.bench_function("process_30_frames", |b| {
        b.iter(|| {
            for frame in &frames {
                black_box(engine.process_frame(black_box(frame)));
            }
        })
    });
}

criterion_group!(
    benches,
    benchmark_stages,
    benchmark_calibration_reduce,
    benchmark_engine
);
criterion_main!(benches);
