use clap::Parser;
use priorbox::{
    AnchorConfig, DecodeConfig, Detection, Detector, DetectorConfig, FrameSize, SuppressConfig,
    SuppressionMode,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PriorBox CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct AnchorConfigJson {
    input_width: usize,
    input_height: usize,
    strides: Vec<f32>,
    min_boxes: Vec<Vec<f32>>,
}

impl Default for AnchorConfigJson {
    fn default() -> Self {
        let cfg = AnchorConfig::default();
        Self {
            input_width: cfg.input_width,
            input_height: cfg.input_height,
            strides: cfg.strides,
            min_boxes: cfg.min_boxes,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    score_threshold: f32,
    center_variance: f32,
    size_variance: f32,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            score_threshold: cfg.score_threshold,
            center_variance: cfg.center_variance,
            size_variance: cfg.size_variance,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SuppressConfigJson {
    iou_threshold: f32,
    mode: String,
    top_k: Option<usize>,
}

impl Default for SuppressConfigJson {
    fn default() -> Self {
        let cfg = SuppressConfig::default();
        Self {
            iou_threshold: cfg.iou_threshold,
            mode: cfg.mode.as_str().to_string(),
            top_k: cfg.top_k,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    frame_path: String,
    output_path: Option<String>,
    anchors: AnchorConfigJson,
    decode: DecodeConfigJson,
    suppress: SuppressConfigJson,
    parallel: bool,
}

impl Config {
    fn detector_config(&self) -> Result<DetectorConfig, Box<dyn std::error::Error>> {
        let mode: SuppressionMode = self.suppress.mode.parse()?;
        Ok(DetectorConfig {
            anchors: AnchorConfig {
                input_width: self.anchors.input_width,
                input_height: self.anchors.input_height,
                strides: self.anchors.strides.clone(),
                min_boxes: self.anchors.min_boxes.clone(),
            },
            decode: DecodeConfig {
                score_threshold: self.decode.score_threshold,
                center_variance: self.decode.center_variance,
                size_variance: self.decode.size_variance,
            },
            suppress: SuppressConfig {
                iou_threshold: self.suppress.iou_threshold,
                mode,
                top_k: self.suppress.top_k,
            },
            parallel: self.parallel,
        })
    }
}

/// One frame of raw network output as written by the capture side.
#[derive(Debug, Deserialize)]
struct FrameJson {
    width: usize,
    height: usize,
    offsets: Vec<f32>,
    scores: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    score: f32,
}

impl From<Detection> for DetectionRecord {
    fn from(value: Detection) -> Self {
        Self {
            x: value.bbox.x,
            y: value.bbox.y,
            width: value.bbox.width,
            height: value.bbox.height,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct FrameOutput {
    frame: usize,
    detections: Vec<DetectionRecord>,
}

#[derive(Debug, Serialize)]
struct Output {
    num_anchors: usize,
    frames: Vec<FrameOutput>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("priorbox=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frame_path.is_empty() {
        return Err("frame_path must be set in the config".into());
    }

    let detector = Detector::new(config.detector_config()?)?;
    let (input_width, input_height) = detector.input_size();

    let frames_text = fs::read_to_string(&config.frame_path)?;
    let frames: Vec<FrameJson> = serde_json::from_str(&frames_text)?;

    let mut outputs = Vec::with_capacity(frames.len());
    for (index, frame) in frames.iter().enumerate() {
        if frame.width < input_width || frame.height < input_height {
            tracing::warn!(
                frame = index,
                "frame {}x{} is smaller than the model input {}x{}",
                frame.width,
                frame.height,
                input_width,
                input_height
            );
        }
        let detections = detector.detect_or_empty(
            &frame.offsets,
            &frame.scores,
            FrameSize::new(frame.width, frame.height),
        );
        outputs.push(FrameOutput {
            frame: index,
            detections: detections.into_iter().map(DetectionRecord::from).collect(),
        });
    }

    let output = Output {
        num_anchors: detector.num_anchors(),
        frames: outputs,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
