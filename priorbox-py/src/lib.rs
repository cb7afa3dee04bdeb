//! Python bindings for the priorbox detection post-processing library.
//!
//! Exposes prior generation and the per-frame detector to Python via PyO3.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use priorbox::{
    AnchorConfig, DecodeConfig, Detection as RustDetection, Detector as RustDetector,
    DetectorConfig as RustDetectorConfig, FrameSize, PriorBoxError, SuppressConfig,
    SuppressionMode, TensorView,
};

/// Configuration problems become `ValueError`, per-frame shape problems
/// become `RuntimeError`.
fn to_py_err(err: PriorBoxError) -> PyErr {
    if err.is_configuration() {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

/// Views a 2D float32 array as a named tensor with its own shape.
fn tensor_view<'a>(
    array: &'a PyReadonlyArray2<'_, f32>,
    name: &'static str,
) -> PyResult<TensorView<'a>> {
    let shape = array.shape();
    TensorView::new(name, array.as_slice()?, shape[0], shape[1]).map_err(to_py_err)
}

/// A detected box in frame pixels with its confidence.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Left edge.
    #[pyo3(get)]
    pub x: f32,
    /// Top edge.
    #[pyo3(get)]
    pub y: f32,
    #[pyo3(get)]
    pub width: f32,
    #[pyo3(get)]
    pub height: f32,
    /// Foreground confidence in [0, 1].
    #[pyo3(get)]
    pub score: f32,
}

#[pymethods]
impl Detection {
    /// Corner form `(x1, y1, x2, y2)`.
    fn corners(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(x={:.2}, y={:.2}, width={:.2}, height={:.2}, score={:.4})",
            self.x, self.y, self.width, self.height, self.score
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            x: d.bbox.x,
            y: d.bbox.y,
            width: d.bbox.width,
            height: d.bbox.height,
            score: d.score,
        }
    }
}

/// Configuration for prior generation, decoding and suppression.
#[pyclass]
#[derive(Clone)]
pub struct DetectorConfig {
    inner: RustDetectorConfig,
}

#[pymethods]
impl DetectorConfig {
    /// Create a new DetectorConfig.
    ///
    /// Args:
    ///     input_width: Model input width (default: 320)
    ///     input_height: Model input height (default: 240)
    ///     strides: Feature map stride per pyramid level (default: [8, 16, 32, 64])
    ///     min_boxes: Prior sizes in input pixels per level (default: UltraFace-slim)
    ///     score_threshold: Minimum foreground score, exclusive (default: 0.7)
    ///     iou_threshold: Overlap above which boxes merge (default: 0.3)
    ///     mode: "hard" or "blend" (default: "hard")
    ///     top_k: Keep at most this many detections (default: None)
    ///     parallel: Decode anchors in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        input_width = 320,
        input_height = 240,
        strides = None,
        min_boxes = None,
        score_threshold = 0.7,
        iou_threshold = 0.3,
        mode = "hard",
        top_k = None,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        input_width: usize,
        input_height: usize,
        strides: Option<Vec<f32>>,
        min_boxes: Option<Vec<Vec<f32>>>,
        score_threshold: f32,
        iou_threshold: f32,
        mode: &str,
        top_k: Option<usize>,
        parallel: bool,
    ) -> PyResult<Self> {
        let defaults = AnchorConfig::default();
        let mode: SuppressionMode = mode.parse().map_err(to_py_err)?;
        let inner = RustDetectorConfig {
            anchors: AnchorConfig {
                input_width,
                input_height,
                strides: strides.unwrap_or(defaults.strides),
                min_boxes: min_boxes.unwrap_or(defaults.min_boxes),
            },
            decode: DecodeConfig {
                score_threshold,
                ..DecodeConfig::default()
            },
            suppress: SuppressConfig {
                iou_threshold,
                mode,
                top_k,
            },
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    /// Number of priors this configuration generates.
    #[getter]
    fn num_anchors(&self) -> PyResult<usize> {
        self.inner.anchors.expected_len().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "DetectorConfig(input={}x{}, score_threshold={}, iou_threshold={}, mode='{}', parallel={})",
            self.inner.anchors.input_width,
            self.inner.anchors.input_height,
            self.inner.decode.score_threshold,
            self.inner.suppress.iou_threshold,
            self.inner.suppress.mode,
            self.inner.parallel
        )
    }
}

/// Turns raw network outputs into deduplicated detections.
#[pyclass]
pub struct Detector {
    inner: RustDetector,
}

#[pymethods]
impl Detector {
    /// Create a detector, generating its priors once.
    ///
    /// Args:
    ///     config: DetectorConfig (default: DetectorConfig())
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<DetectorConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let inner = RustDetector::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Decode and suppress one frame.
    ///
    /// Args:
    ///     offsets: float32 array of shape (N, 4)
    ///     scores: float32 array of shape (N, 2), [background, foreground]
    ///     frame_width: Width of the displayed frame in pixels
    ///     frame_height: Height of the displayed frame in pixels
    ///
    /// Returns:
    ///     List of Detection objects, strongest first
    fn detect(
        &self,
        offsets: PyReadonlyArray2<'_, f32>,
        scores: PyReadonlyArray2<'_, f32>,
        frame_width: usize,
        frame_height: usize,
    ) -> PyResult<Vec<Detection>> {
        let detections = self
            .inner
            .detect_views(
                tensor_view(&offsets, "offsets")?,
                tensor_view(&scores, "scores")?,
                FrameSize::new(frame_width, frame_height),
            )
            .map_err(to_py_err)?;
        Ok(detections.into_iter().map(Detection::from).collect())
    }

    /// Model input size as `(width, height)`.
    #[getter]
    fn input_size(&self) -> (usize, usize) {
        self.inner.input_size()
    }

    /// Number of priors, which must match the tensor row count.
    #[getter]
    fn num_anchors(&self) -> usize {
        self.inner.num_anchors()
    }

    fn __repr__(&self) -> String {
        let (w, h) = self.inner.input_size();
        format!(
            "Detector(input={}x{}, num_anchors={})",
            w,
            h,
            self.inner.num_anchors()
        )
    }
}

/// Generate the prior boxes for a feature pyramid.
///
/// Args:
///     input_width: Model input width
///     input_height: Model input height
///     strides: Feature map stride per level
///     min_boxes: Prior sizes in input pixels per level
///
/// Returns:
///     List of (center_x, center_y, width, height) tuples normalized to [0, 1]
#[pyfunction]
fn generate_priors(
    input_width: usize,
    input_height: usize,
    strides: Vec<f32>,
    min_boxes: Vec<Vec<f32>>,
) -> PyResult<Vec<(f32, f32, f32, f32)>> {
    let priors = priorbox::generate(input_width, input_height, &strides, &min_boxes)
        .map_err(to_py_err)?;
    Ok(priors
        .iter()
        .map(|p| (p.center_x, p.center_y, p.width, p.height))
        .collect())
}

/// Python module for priorbox detection post-processing.
#[pymodule]
fn _priorbox(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<DetectorConfig>()?;
    m.add_class::<Detector>()?;
    m.add_function(wrap_pyfunction!(generate_priors, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
