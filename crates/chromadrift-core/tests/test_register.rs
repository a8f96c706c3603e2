#[allow(dead_code)]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array3;

use chromadrift_core::error::ChromaDriftError;
use chromadrift_core::pipeline::config::RegistrationConfig;
use chromadrift_core::register::{
    align_time_series, align_time_series_detailed, resample, PairwiseRegistrationEngine,
    SpatialTransform, TranslationTransform,
};
use chromadrift_core::volume::{PixelType, Volume};

use common::{gaussian_plane, planar_volume, two_blob_plane};

fn engine() -> PairwiseRegistrationEngine {
    PairwiseRegistrationEngine::new(RegistrationConfig {
        histogram_bins: 32,
        ..Default::default()
    })
}

#[test]
fn test_self_registration_is_near_zero() {
    let fixed = planar_volume(two_blob_plane(40, 40, 0.0, 0.0), PixelType::F64);
    let result = engine().register(&fixed, &fixed).unwrap();

    assert!(
        result.transform.magnitude() < 0.5,
        "residual translation {:?}",
        result.transform.parameters()
    );
    assert!(result.stop_reason.is_converged());
    assert_eq!(result.resampled.data.dim(), fixed.data.dim());
}

#[test]
fn test_recovers_known_shift() {
    let fixed = planar_volume(two_blob_plane(48, 48, 0.0, 0.0), PixelType::F64);
    // Moving content sits 2 px right and 3 px up of the fixed content.
    let moving = planar_volume(two_blob_plane(48, 48, -3.0, 2.0), PixelType::F64);

    let result = engine().register(&fixed, &moving).unwrap();
    let t = &result.transform;
    assert!((t.dx() - 2.0).abs() < 0.75, "dx = {}", t.dx());
    assert!((t.dy() + 3.0).abs() < 0.75, "dy = {}", t.dy());
    assert_eq!(t.dz(), 0.0);
}

#[test]
fn test_registers_volumes_in_three_dimensions() {
    let spot = gaussian_plane(20, 20, 9.0, 10.0, 3.0, 500.0);
    let fixed = Volume::new(
        Array3::from_shape_fn((6, 20, 20), |(z, y, x)| spot[[y, x]] * (1.0 + z as f64 * 0.2)),
        PixelType::F64,
    );
    let result = engine().register(&fixed, &fixed).unwrap();
    assert_eq!(result.transform.parameter_count(), 3);
    assert!(result.transform.magnitude() < 0.5);
}

#[test]
fn test_result_takes_fixed_dtype() {
    let fixed = planar_volume(two_blob_plane(32, 32, 0.0, 0.0), PixelType::U16);
    let moving = planar_volume(two_blob_plane(32, 32, 0.0, 1.0), PixelType::F64);
    let result = engine().register(&fixed, &moving).unwrap();
    assert_eq!(result.resampled.dtype, PixelType::U16);
    assert!(result.resampled.data.iter().all(|v| v.fract() == 0.0));
}

#[test]
fn test_planar_against_volume_is_shape_error() {
    let plane = planar_volume(two_blob_plane(16, 16, 0.0, 0.0), PixelType::U16);
    let volume = Volume::new(Array3::zeros((3, 16, 16)), PixelType::U16);
    assert!(matches!(engine().register(&plane, &volume), Err(ChromaDriftError::Shape(_))));
}

#[test]
fn test_empty_moving_volume_is_shape_error() {
    let fixed = planar_volume(two_blob_plane(8, 8, 0.0, 0.0), PixelType::U16);
    let empty = Volume::new(Array3::zeros((1, 0, 0)), PixelType::U16);
    assert!(matches!(engine().register(&fixed, &empty), Err(ChromaDriftError::Shape(_))));
    assert!(matches!(engine().register(&empty, &fixed), Err(ChromaDriftError::Shape(_))));
}

#[test]
fn test_exhausted_iteration_budget_is_error() {
    let fixed = planar_volume(two_blob_plane(48, 48, 0.0, 0.0), PixelType::F64);
    let moving = planar_volume(two_blob_plane(48, 48, -3.0, 2.0), PixelType::F64);
    let engine = PairwiseRegistrationEngine::new(RegistrationConfig {
        histogram_bins: 32,
        max_iterations: 2,
        ..Default::default()
    });

    match engine.register(&fixed, &moving) {
        Err(ChromaDriftError::RegistrationNonConvergence { iterations, .. }) => {
            assert_eq!(iterations, 2)
        }
        other => panic!("expected non-convergence, got {:?}", other.map(|r| r.iterations)),
    }
}

#[test]
fn test_no_overlap_is_reported() {
    let fixed = planar_volume(two_blob_plane(16, 16, 0.0, 0.0), PixelType::U16);
    let start = TranslationTransform::from_offset(&[100.0, 0.0]);
    assert!(matches!(
        engine().register_with(&fixed, &fixed, start),
        Err(ChromaDriftError::InsufficientOverlap { .. })
    ));
}

#[test]
fn test_resample_fills_outside_with_zero() {
    let volume = planar_volume(two_blob_plane(10, 10, 0.0, 0.0), PixelType::F64);
    let shifted = resample(&volume, &volume, &TranslationTransform::from_offset(&[3.0, 0.0]));
    assert_eq!(shifted.data[[0, 4, 2]], volume.data[[0, 4, 5]]);
    assert_eq!(shifted.data[[0, 4, 7]], 0.0);
}

#[test]
fn test_time_series_keeps_anchor_and_length() {
    let frames = vec![
        planar_volume(two_blob_plane(32, 32, 0.0, 0.0), PixelType::U16),
        planar_volume(two_blob_plane(32, 32, 1.0, 0.0), PixelType::U16),
        planar_volume(two_blob_plane(32, 32, 0.0, -1.0), PixelType::U16),
    ];
    let done = AtomicUsize::new(0);

    let aligned = align_time_series(&frames, &engine(), |_| {
        done.fetch_add(1, Ordering::Relaxed);
    })
    .unwrap();

    assert_eq!(aligned.len(), 3);
    assert_eq!(aligned[0].data, frames[0].data);
    assert_eq!(aligned[0].dtype, frames[0].dtype);
    for frame in &aligned[1..] {
        assert_eq!(frame.data.dim(), frames[0].data.dim());
        assert_eq!(frame.dtype, PixelType::U16);
    }
    assert_eq!(done.load(Ordering::Relaxed), 3);
}

#[test]
fn test_time_series_reports_per_frame_translation() {
    let frames: Vec<Volume> = (0..5)
        .map(|i| planar_volume(two_blob_plane(32, 32, 0.0, i as f64 * 0.5), PixelType::F64))
        .collect();

    let aligned = align_time_series_detailed(&frames, &engine(), |_| {}).unwrap();
    assert_eq!(aligned.len(), 5);
    assert_eq!(aligned[0].translation, vec![0.0, 0.0]);
    assert_eq!(aligned[0].iterations, 0);
    for (i, frame) in aligned.iter().enumerate().skip(1) {
        let expected = i as f64 * 0.5;
        assert!(
            (frame.translation[0] - expected).abs() < 0.75,
            "frame {i}: {:?}",
            frame.translation
        );
    }
}

#[test]
fn test_time_series_rejects_empty_input() {
    assert!(matches!(
        align_time_series(&[], &engine(), |_| {}),
        Err(ChromaDriftError::EmptySequence)
    ));
}
