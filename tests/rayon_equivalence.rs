#![cfg(feature = "rayon")]

use priorbox::{
    BoxDecoder, DecodeConfig, Detector, DetectorConfig, FrameSize, PriorSet, TensorView,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_frame(seed: u64, n: usize) -> (Vec<f32>, Vec<f32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let offsets = (0..n * 4).map(|_| rng.random_range(-3.0..3.0f32)).collect();
    let scores = (0..n)
        .flat_map(|_| {
            let fg: f32 = rng.random();
            [1.0 - fg, fg]
        })
        .collect();
    (offsets, scores)
}

#[test]
fn parallel_decode_matches_sequential() {
    let priors = PriorSet::generate(&Default::default()).unwrap();
    let (offsets, scores) = random_frame(11, priors.len());
    let decoder = BoxDecoder::new(DecodeConfig::with_threshold(0.6)).unwrap();
    let frame = FrameSize::new(1280, 720);

    let offsets = TensorView::offsets(&offsets).unwrap();
    let scores = TensorView::scores(&scores).unwrap();
    let seq = decoder.decode(offsets, scores, &priors, frame).unwrap();
    let par = decoder.decode_par(offsets, scores, &priors, frame).unwrap();

    assert!(!seq.is_empty());
    assert_eq!(seq, par);
}

#[test]
fn parallel_detector_matches_sequential() {
    let (offsets, scores) = random_frame(5, PriorSet::generate(&Default::default()).unwrap().len());
    let seq = Detector::new(DetectorConfig::default()).unwrap();
    let par = Detector::new(DetectorConfig {
        parallel: true,
        ..DetectorConfig::default()
    })
    .unwrap();
    assert!(par.is_parallel());

    let frame = FrameSize::new(640, 480);
    assert_eq!(
        seq.detect(&offsets, &scores, frame).unwrap(),
        par.detect(&offsets, &scores, frame).unwrap()
    );
}
