mod frames;

use calib::camera::pinhole::{CameraIntrinsics, ImageBounds, Projector};
use calib::lidar::velodyne::{CaptureReader, PacketDecoder};
use calib::optimize::{ExtrinsicOptimizer, MutualInformationObjective, OptimizerSettings};
use calib::{DedupPolicy, ExtrinsicPose, TimestampIndex};
use frames::Pair;
use log::*;
use std::error::Error;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

#[derive(StructOpt, Clone)]
#[structopt(
    name = "calib-sandbox",
    about = "Calibrates the extrinsics between a lidar and a camera"
)]
struct Opt {
    /// The OpenCV calibration file holding the camera matrix `K` and distortion `D`.
    #[structopt(short, long, default_value = "cam_mono.yml")]
    calibration: PathBuf,
    /// The file pairing lidar timestamps with camera images.
    ///
    /// This is a JSON list of `{ "timestamp": 123, "image": "frame.bmp" }` objects. Relative
    /// image paths are relative to the directory of this file.
    #[structopt(short, long, default_value = "pairs.json")]
    pairs: PathBuf,
    /// The file where settings are specified.
    ///
    /// This is in the format of `calib_optimize::OptimizerSettings`.
    #[structopt(short, long, default_value = "calib-settings.json")]
    settings: PathBuf,
    /// The file the calibration result is written to.
    #[structopt(short, long, default_value = "calibration.json")]
    output: PathBuf,
    /// Hundredths of a degree per azimuth bin
    #[structopt(long, default_value = "100", parse(try_from_str = parse_bin_size))]
    azimuth_bin_size: u32,
    /// Keep the first point seen per azimuth bin and laser instead of the latest
    #[structopt(long)]
    keep_first: bool,
    /// Apply the radial distortion of the calibration file when projecting
    #[structopt(long)]
    distortion: bool,
    /// The image width in pixels
    #[structopt(long, default_value = "1920")]
    width: u32,
    /// The image height in pixels
    #[structopt(long, default_value = "1080")]
    height: u32,
    /// The initial roll in radians
    #[structopt(long, default_value = "-1.5707963267948966", allow_hyphen_values = true)]
    roll: f64,
    /// The initial pitch in radians
    #[structopt(long, default_value = "0.0", allow_hyphen_values = true)]
    pitch: f64,
    /// The initial yaw in radians
    #[structopt(long, default_value = "3.141592653589793", allow_hyphen_values = true)]
    yaw: f64,
    /// The initial x translation in meters
    #[structopt(long, default_value = "-0.885", allow_hyphen_values = true)]
    tx: f64,
    /// The initial y translation in meters
    #[structopt(long, default_value = "-0.066", allow_hyphen_values = true)]
    ty: f64,
    /// The initial z translation in meters
    #[structopt(long, default_value = "0.0", allow_hyphen_values = true)]
    tz: f64,
    /// List of lidar capture files
    ///
    /// Points are tagged with the position of their file in this list.
    #[structopt(parse(from_os_str))]
    captures: Vec<PathBuf>,
}

fn parse_bin_size(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("azimuth bin size must be positive".to_owned()),
        Ok(size) => Ok(size),
        Err(e) => Err(e.to_string()),
    }
}

fn main() {
    pretty_env_logger::init_timed();
    let opt = Opt::from_args();

    if let Err(e) = run(opt) {
        error!("calibration failed: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            error!("caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<(), Box<dyn Error>> {
    let intrinsics = CameraIntrinsics::load(&opt.calibration)?;
    let projector = Projector::new(intrinsics)
        .bounds(ImageBounds::new(opt.width, opt.height))
        .with_distortion(opt.distortion);

    let settings = std::fs::File::open(&opt.settings)
        .ok()
        .and_then(|file| serde_json::from_reader(file).ok());
    if settings.is_some() {
        info!("loaded existing settings");
    } else {
        info!("used default settings");
    }
    let settings: OptimizerSettings = settings.unwrap_or_default();

    let policy = if opt.keep_first {
        DedupPolicy::KeepFirst
    } else {
        DedupPolicy::KeepLatest
    };
    let decoder = PacketDecoder::default().azimuth_bin_size(opt.azimuth_bin_size);
    let reader = CaptureReader::new(decoder);
    let mut index = TimestampIndex::new();
    for (source, path) in opt.captures.iter().enumerate() {
        let (points, summary) = reader.read_path(path, source)?;
        debug!("capture {} decoded {} packets", source, summary.decoded);
        index.ingest(points);
    }
    info!(
        "indexed {} points over {} timestamps",
        index.len(),
        index.timestamps().len()
    );

    let pairs: Vec<Pair> = serde_json::from_reader(std::fs::File::open(&opt.pairs)?)?;
    let base = opt.pairs.parent().unwrap_or_else(|| Path::new(""));
    let (frames, unreadable) =
        frames::training_frames(&pairs, base, &index, policy, settings.frame_budget);

    let seed = ExtrinsicPose::new(opt.roll, opt.pitch, opt.yaw, opt.tx, opt.ty, opt.tz);
    let optimizer = ExtrinsicOptimizer::new(MutualInformationObjective::new(projector), settings);
    let mut result = optimizer.optimize(seed, &frames)?;
    result.skipped_frames += unreadable;

    info!("writing the calibration to {}", opt.output.display());
    serde_json::to_writer_pretty(std::fs::File::create(&opt.output)?, &result)?;
    Ok(())
}
