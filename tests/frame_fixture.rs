//! Replays a recorded frame description and compares against expected boxes.

use priorbox::{
    AnchorConfig, DecodeConfig, Detector, DetectorConfig, FrameSize, SuppressConfig,
    SuppressionMode,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Tolerance on box edges in pixels.
const EDGE_TOLERANCE_PX: f32 = 1e-3;

#[derive(Debug, Deserialize)]
struct AnchorsJson {
    input_width: usize,
    input_height: usize,
    strides: Vec<f32>,
    min_boxes: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct FrameJson {
    width: usize,
    height: usize,
}

#[derive(Debug, Deserialize)]
struct ExpectedBox {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    score: f32,
}

#[derive(Debug, Deserialize)]
struct Fixture {
    anchors: AnchorsJson,
    frame: FrameJson,
    score_threshold: f32,
    iou_threshold: f32,
    mode: String,
    offsets: Vec<f32>,
    scores: Vec<f32>,
    expected: Vec<ExpectedBox>,
}

fn load(name: &str) -> Fixture {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name);
    let text = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn recorded_frame_matches_expected_boxes() {
    let fixture = load("two_faces.json");
    let mode: SuppressionMode = fixture.mode.parse().unwrap();
    let detector = Detector::new(DetectorConfig {
        anchors: AnchorConfig {
            input_width: fixture.anchors.input_width,
            input_height: fixture.anchors.input_height,
            strides: fixture.anchors.strides,
            min_boxes: fixture.anchors.min_boxes,
        },
        decode: DecodeConfig::with_threshold(fixture.score_threshold),
        suppress: SuppressConfig {
            iou_threshold: fixture.iou_threshold,
            mode,
            top_k: None,
        },
        parallel: false,
    })
    .unwrap();

    let frame = FrameSize::new(fixture.frame.width, fixture.frame.height);
    let out = detector
        .detect(&fixture.offsets, &fixture.scores, frame)
        .unwrap();

    assert_eq!(out.len(), fixture.expected.len());
    for (got, want) in out.iter().zip(&fixture.expected) {
        assert!((got.score - want.score).abs() < 1e-6, "{got:?} vs {want:?}");
        assert!((got.bbox.x - want.x).abs() < EDGE_TOLERANCE_PX, "{got:?} vs {want:?}");
        assert!((got.bbox.y - want.y).abs() < EDGE_TOLERANCE_PX, "{got:?} vs {want:?}");
        assert!((got.bbox.width - want.width).abs() < EDGE_TOLERANCE_PX);
        assert!((got.bbox.height - want.height).abs() < EDGE_TOLERANCE_PX);
    }
}
