mod assets;
mod demos;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use winit::dpi::LogicalSize;

use easel_engine::device::GpuInit;
use easel_engine::logging::{LoggingConfig, init_logging};
use easel_engine::window::{RedrawPolicy, Runtime, RuntimeConfig};

use assets::AssetSource;
use demos::{ClockDemo, ImageDemo, ImageVariant};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum Demo {
    /// Image filters: grayscale, inverse, edge kernel, palette lookup.
    Filters,
    /// Analog clock redrawn every second.
    Clock,
    /// Drag and zoom a textured quad.
    Pan,
}

#[derive(Debug, Parser)]
#[command(name = "easel-studio", about = "Small wgpu rendering demos")]
struct Args {
    #[arg(value_enum)]
    demo: Demo,

    /// Image to show. A procedural checkerboard is used when omitted.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Palette strip sampled by the palette filter. A procedural ramp is used when omitted.
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Log filter in env_logger syntax (overrides RUST_LOG).
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &args.log {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);

    let config = |title: &str, redraw: RedrawPolicy| RuntimeConfig {
        title: format!("easel: {title}"),
        initial_size: LogicalSize::new(900.0, 640.0),
        redraw,
    };

    let image = args
        .image
        .map(AssetSource::File)
        .unwrap_or(AssetSource::Checkerboard { size: 512, cells: 8 });
    let palette = args
        .palette
        .map(AssetSource::File)
        .unwrap_or(AssetSource::PaletteRamp { width: 256 });

    log::info!("starting {:?} demo", args.demo);

    match args.demo {
        Demo::Clock => Runtime::run(
            config("clock", RedrawPolicy::Interval(Duration::from_secs(1))),
            GpuInit::default(),
            ClockDemo::new(),
        ),
        Demo::Filters => Runtime::run(
            config("filters", RedrawPolicy::OnDemand),
            GpuInit::default(),
            ImageDemo::new(ImageVariant::Filters, image, palette)?,
        ),
        Demo::Pan => Runtime::run(
            config("pan", RedrawPolicy::OnDemand),
            GpuInit::default(),
            ImageDemo::new(ImageVariant::Pan, image, palette)?,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_is_required() {
        assert!(Args::try_parse_from(["easel-studio"]).is_err());
    }

    #[test]
    fn parses_demo_and_paths() {
        let args = Args::try_parse_from([
            "easel-studio",
            "filters",
            "--image",
            "a.png",
            "--log",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.demo, Demo::Filters);
        assert_eq!(args.image, Some(PathBuf::from("a.png")));
        assert_eq!(args.palette, None);
        assert_eq!(args.log.as_deref(), Some("debug"));
    }

    #[test]
    fn unknown_demo_is_rejected() {
        assert!(Args::try_parse_from(["easel-studio", "teapot"]).is_err());
    }
}
