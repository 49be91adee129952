//! depthseg CLI: segment an RGB-D frame pair into 3D objects from recorded detections.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use depthseg::{
    BoxError, Camera, CameraIntrinsics, CameraProperties, Dependencies, Detection,
    DetectionSegmenter, NamedImage, Object, RadialTangentialDistortion, SegmenterConfig,
};
use image::RgbaImage;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const FILE_CAMERA: &str = "file-camera";
const REPLAY_DETECTOR: &str = "replay-detector";

#[derive(Parser)]
#[command(name = "depthseg")]
#[command(about = "Lift 2D detections into labeled 3D point clouds using an RGB-D frame pair")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a color + depth frame pair using detections from a JSON file.
    Segment(CliSegmentArgs),

    /// Validate a segmenter config and list its dependencies.
    CheckConfig {
        /// Path to the segmenter config (JSON).
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliSegmentArgs {
    /// Path to the color image.
    #[arg(long)]
    color: PathBuf,

    /// Path to the depth image (16-bit single channel, zero = no reading).
    #[arg(long)]
    depth: PathBuf,

    /// Path to the detections (JSON array of {bounding_box, score, label}).
    #[arg(long)]
    detections: PathBuf,

    /// Path to write the resulting objects (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional segmenter config (JSON); flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name the replayed detections are registered under (defaults to the
    /// config's detector_name, else "replay-detector").
    #[arg(long)]
    detector_name: Option<String>,

    /// Minimum detection confidence in (0, 1]; <= 0 selects the default (0.5).
    #[arg(long)]
    confidence_threshold: Option<f64>,

    /// Outlier filter neighbor window (filter runs only if mean_k and sigma are positive).
    #[arg(long)]
    mean_k: Option<i64>,

    /// Outlier filter standard-deviation multiplier.
    #[arg(long)]
    sigma: Option<f64>,

    #[command(flatten)]
    camera: CliCameraArgs,
}

#[derive(Debug, Clone, Args, Default)]
struct CliCameraArgs {
    /// Camera intrinsic fx (pixels). If set, fy/cx/cy are required too.
    #[arg(long)]
    cam_fx: Option<f64>,
    /// Camera intrinsic fy (pixels). If set, fx/cx/cy are required too.
    #[arg(long)]
    cam_fy: Option<f64>,
    /// Camera principal point cx (pixels). If set, fx/fy/cy are required too.
    #[arg(long)]
    cam_cx: Option<f64>,
    /// Camera principal point cy (pixels). If set, fx/fy/cx are required too.
    #[arg(long)]
    cam_cy: Option<f64>,
    /// Radial distortion coefficient k1.
    #[arg(long, default_value_t = 0.0)]
    cam_k1: f64,
    /// Radial distortion coefficient k2.
    #[arg(long, default_value_t = 0.0)]
    cam_k2: f64,
    /// Tangential distortion coefficient p1.
    #[arg(long, default_value_t = 0.0)]
    cam_p1: f64,
    /// Tangential distortion coefficient p2.
    #[arg(long, default_value_t = 0.0)]
    cam_p2: f64,
    /// Radial distortion coefficient k3.
    #[arg(long, default_value_t = 0.0)]
    cam_k3: f64,
}

impl CliCameraArgs {
    /// Without intrinsics flags the camera reports no intrinsics and the
    /// segmenter falls back to parallel projection.
    fn to_properties(&self, width: u32, height: u32) -> CliResult<CameraProperties> {
        let (fx, fy, cx, cy) = match (self.cam_fx, self.cam_fy, self.cam_cx, self.cam_cy) {
            (None, None, None, None) => return Ok(CameraProperties::default()),
            (Some(fx), Some(fy), Some(cx), Some(cy)) => (fx, fy, cx, cy),
            _ => {
                return Err(
                    "camera intrinsics are partial; provide all of --cam-fx --cam-fy --cam-cx --cam-cy"
                        .into(),
                )
            }
        };
        let distortion = RadialTangentialDistortion {
            k1: self.cam_k1,
            k2: self.cam_k2,
            p1: self.cam_p1,
            p2: self.cam_p2,
            k3: self.cam_k3,
        };
        Ok(CameraProperties {
            intrinsics: Some(CameraIntrinsics {
                fx,
                fy,
                cx,
                cy,
                width,
                height,
            }),
            distortion: (!distortion.is_identity()).then_some(distortion),
        })
    }
}

/// Camera serving a fixed frame pair loaded from disk.
struct FileCamera {
    color: RgbaImage,
    depth: image::DynamicImage,
    properties: CameraProperties,
}

impl Camera for FileCamera {
    fn name(&self) -> &str {
        FILE_CAMERA
    }

    fn images(&self) -> Result<Vec<NamedImage>, BoxError> {
        Ok(vec![
            NamedImage::new("color", self.color.clone()),
            NamedImage::new("depth", self.depth.clone()),
        ])
    }

    fn properties(&self) -> Result<CameraProperties, BoxError> {
        Ok(self.properties)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Segment(args) => run_segment(&args),
        Commands::CheckConfig { config } => run_check_config(&config),
    }
}

fn load_config(path: &Path) -> CliResult<SegmenterConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| -> CliError {
        format!("Failed to read config {}: {}", path.display(), e).into()
    })?;
    Ok(serde_json::from_str(&text)?)
}

// ── check-config ───────────────────────────────────────────────────────

fn run_check_config(path: &Path) -> CliResult<()> {
    let config = load_config(path)?;
    let validation = config.validate()?;
    let policy = config.policy()?;

    println!("config {}: ok", path.display());
    println!("  dependencies:         {}", validation.dependencies.join(", "));
    println!("  confidence threshold: {:.3}", policy.confidence_threshold);
    println!("  outlier filter:       {:?}", policy.filter);
    for warning in &validation.warnings {
        println!("  warning: {}", warning);
    }
    Ok(())
}

// ── segment ────────────────────────────────────────────────────────────

impl CliSegmentArgs {
    fn to_config(&self) -> CliResult<SegmenterConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SegmenterConfig::default(),
        };
        if let Some(name) = &self.detector_name {
            config.detector_name = name.clone();
        } else if config.detector_name.is_empty() {
            config.detector_name = REPLAY_DETECTOR.to_string();
        }
        config.camera_name = Some(FILE_CAMERA.to_string());
        if let Some(v) = self.confidence_threshold {
            config.confidence_threshold = v;
        }
        if let Some(v) = self.mean_k {
            config.mean_k = v;
        }
        if let Some(v) = self.sigma {
            config.sigma = v;
        }
        Ok(config)
    }
}

fn run_segment(args: &CliSegmentArgs) -> CliResult<()> {
    tracing::info!("Loading color image: {}", args.color.display());
    let color = image::open(&args.color)
        .map_err(|e| -> CliError {
            format!("Failed to open image {}: {}", args.color.display(), e).into()
        })?
        .to_rgba8();
    let (w, h) = color.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    tracing::info!("Loading depth image: {}", args.depth.display());
    let depth = image::open(&args.depth).map_err(|e| -> CliError {
        format!("Failed to open depth image {}: {}", args.depth.display(), e).into()
    })?;

    let detections: Vec<Detection> =
        serde_json::from_str(&std::fs::read_to_string(&args.detections)?)?;
    tracing::info!("{} detections loaded", detections.len());

    let camera = FileCamera {
        color,
        depth,
        properties: args.camera.to_properties(w, h)?,
    };

    let config = args.to_config()?;
    let mut deps = Dependencies::new();
    // detections always come from the replay file
    deps.insert_detector(
        config.detector_name.clone(),
        Arc::new(move |_: &RgbaImage| -> Result<Vec<Detection>, BoxError> {
            Ok(detections.clone())
        }),
    );
    deps.insert_camera(FILE_CAMERA, Arc::new(camera));

    let segmenter = DetectionSegmenter::from_config(&config, &deps)?;
    let objects: Vec<Object> = segmenter.object_point_clouds("", &deps)?;

    for obj in &objects {
        tracing::info!("  {}: {} points", obj.label, obj.size());
    }

    let json = serde_json::to_string_pretty(&objects)?;
    std::fs::write(&args.out, &json)?;
    tracing::info!("{} objects written to {}", objects.len(), args.out.display());

    Ok(())
}
