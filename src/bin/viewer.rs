//! viewer - live depth-clipped face detection preview.
//!
//! Streams aligned depth/color pairs, blanks everything further than the
//! clipping distance, runs the face detector and shows the overlaid result
//! until a key is pressed or the window is closed.

use clap::Parser;
use log::{info, warn};
use opencv::highgui;

use depthclip::{
    DnnFaceDetector, Error, FaceDetector, FrameSource, Pipeline, PipelineConfig,
    StubFaceDetector, SyntheticSource,
};

const WINDOW_NAME: &str = "Display Image";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Face detection model file (SSD-style, e.g. the res10 caffemodel).
    /// Without it a stub detector runs and nothing is detected.
    #[arg(long)]
    model: Option<String>,
    /// Optional text config for the model (e.g. deploy.prototxt).
    #[arg(long, default_value = "")]
    model_config: String,
    /// Use the synthetic frame source instead of a camera.
    #[arg(long)]
    synthetic: bool,
    /// Maximum foreground distance in metres.
    #[arg(long, default_value_t = depthclip::config::DEFAULT_CLIPPING_DISTANCE)]
    clipping_distance: f32,
}

fn build_source(args: &Args, config: &PipelineConfig) -> Result<Box<dyn FrameSource>, Error> {
    if args.synthetic {
        return Ok(Box::new(SyntheticSource::new(config.color_stream)));
    }

    #[cfg(feature = "realsense")]
    {
        Ok(Box::new(depthclip::RealSenseSource::new(
            config.depth_stream,
            config.color_stream,
        )?))
    }
    #[cfg(not(feature = "realsense"))]
    {
        Err(Error::camera(
            "create_source",
            "built without the realsense feature; pass --synthetic or rebuild with --features realsense",
        ))
    }
}

fn build_detector(args: &Args, config: &PipelineConfig) -> Result<Box<dyn FaceDetector>, Error> {
    match &args.model {
        Some(model) => Ok(Box::new(DnnFaceDetector::new(
            model,
            &args.model_config,
            config.detector.clone(),
        )?)),
        None => {
            warn!("no --model given, running with a stub detector");
            Ok(Box::new(StubFaceDetector::empty()))
        }
    }
}

fn run(args: Args) -> Result<(), Error> {
    let config = PipelineConfig {
        clipping_distance: args.clipping_distance,
        ..PipelineConfig::default()
    };
    config.validate()?;

    let source = build_source(&args, &config)?;
    let detector = build_detector(&args, &config)?;
    let mut pipeline = Pipeline::new(config, source, detector)?;

    highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE)?;

    // same exit condition as the classic demo: any key, or window closed
    while highgui::wait_key(1)? < 0
        && highgui::get_window_property(WINDOW_NAME, highgui::WND_PROP_AUTOSIZE)? >= 0.0
    {
        let processed = pipeline.step()?;
        highgui::imshow(WINDOW_NAME, &processed.image)?;
    }

    info!("window closed, shutting down");
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        if err.is_camera() {
            eprintln!("camera failure: {}", err);
        } else {
            eprintln!("{}", err);
        }
        std::process::exit(1);
    }
}
