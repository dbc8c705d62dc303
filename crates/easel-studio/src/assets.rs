//! Background image decoding.
//!
//! Decode jobs go to a worker thread; finished images come back over a
//! channel and are drained from the event loop with [`AssetLoader::drain`].
//! Nothing is retried: a failed load is logged and reported once.

use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use easel_engine::EngineError;

/// RGBA8 pixels ready for texture upload.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Where an image comes from.
#[derive(Debug, Clone)]
pub enum AssetSource {
    File(PathBuf),
    /// Two-tone checkerboard, `cells` squares per side.
    Checkerboard { size: u32, cells: u32 },
    /// Horizontal colour ramp, one texel tall.
    PaletteRamp { width: u32 },
}

impl AssetSource {
    fn describe(&self) -> String {
        match self {
            AssetSource::File(path) => path.display().to_string(),
            AssetSource::Checkerboard { size, cells } => format!("checkerboard {size}px/{cells}"),
            AssetSource::PaletteRamp { width } => format!("palette ramp {width}px"),
        }
    }
}

struct LoadRequest {
    slot: &'static str,
    source: AssetSource,
}

/// Outcome of one request, tagged with the slot it was requested for.
pub struct LoadedAsset {
    pub slot: &'static str,
    pub result: Result<DecodedImage, EngineError>,
}

pub struct AssetLoader {
    requests: Sender<LoadRequest>,
    results: Receiver<LoadedAsset>,
    pending: usize,
}

impl AssetLoader {
    /// Spawns the decoder thread. It exits once the loader is dropped.
    pub fn spawn() -> anyhow::Result<Self> {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<LoadedAsset>();

        thread::Builder::new()
            .name("easel-assets".into())
            .spawn(move || {
                while let Ok(req) = req_rx.recv() {
                    let result = load(&req.source);
                    if res_tx
                        .send(LoadedAsset {
                            slot: req.slot,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
                log::debug!("asset thread exiting");
            })?;

        Ok(Self {
            requests: req_tx,
            results: res_rx,
            pending: 0,
        })
    }

    /// Queues `source` for decoding into `slot`.
    pub fn request(&mut self, slot: &'static str, source: AssetSource) {
        log::debug!("loading {} into `{slot}`", source.describe());
        if self.requests.send(LoadRequest { slot, source }).is_ok() {
            self.pending += 1;
        } else {
            log::error!("asset thread is gone; `{slot}` will never load");
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    /// Returns every load that finished since the last call.
    pub fn drain(&mut self) -> Vec<LoadedAsset> {
        let mut done = Vec::new();
        loop {
            match self.results.try_recv() {
                Ok(asset) => {
                    self.pending = self.pending.saturating_sub(1);
                    if let Err(e) = &asset.result {
                        log::error!("ResourceLoadFailure: {e}");
                    }
                    done.push(asset);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.pending > 0 {
                        log::error!("asset thread stopped with {} load(s) pending", self.pending);
                        self.pending = 0;
                    }
                    break;
                }
            }
        }
        done
    }
}

fn load(source: &AssetSource) -> Result<DecodedImage, EngineError> {
    match source {
        AssetSource::File(path) => {
            let img = image::open(path).map_err(|e| EngineError::ResourceLoad {
                what: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            Ok(DecodedImage {
                width,
                height,
                rgba: rgba.into_raw(),
            })
        }
        AssetSource::Checkerboard { size, cells } => Ok(checkerboard(*size, *cells)),
        AssetSource::PaletteRamp { width } => Ok(palette_ramp(*width)),
    }
}

/// Square checkerboard alternating warm grey and slate blue, with a light
/// gradient across it so filters have something to chew on.
pub fn checkerboard(size: u32, cells: u32) -> DecodedImage {
    let size = size.max(1);
    let cell = (size / cells.max(1)).max(1);

    let img = image::RgbaImage::from_fn(size, size, |x, y| {
        let shade = ((x + y) * 96 / (2 * size)) as u8;
        if (x / cell + y / cell) % 2 == 0 {
            image::Rgba([200u8.saturating_add(shade / 2), 190, 170, 255])
        } else {
            image::Rgba([40, 60u8.saturating_add(shade), 110u8.saturating_add(shade), 255])
        }
    });

    DecodedImage {
        width: size,
        height: size,
        rgba: img.into_raw(),
    }
}

/// Left-to-right ramp from deep blue through green to yellow.
pub fn palette_ramp(width: u32) -> DecodedImage {
    let width = width.max(2);
    let last = (width - 1) as f32;

    let img = image::RgbaImage::from_fn(width, 1, |x, _| {
        let t = x as f32 / last;
        let r = (t * t * 255.0) as u8;
        let g = (t.sqrt() * 230.0) as u8;
        let b = ((1.0 - t) * 200.0 + 30.0) as u8;
        image::Rgba([r, g, b, 255])
    });

    DecodedImage {
        width,
        height: 1,
        rgba: img.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // ── procedural ────────────────────────────────────────────────────────

    #[test]
    fn checkerboard_is_square_rgba() {
        let img = checkerboard(64, 8);
        assert_eq!((img.width, img.height), (64, 64));
        assert_eq!(img.rgba.len(), 64 * 64 * 4);
    }

    #[test]
    fn neighbouring_cells_differ() {
        let img = checkerboard(64, 8);
        let px = |x: usize, y: usize| &img.rgba[(y * 64 + x) * 4..(y * 64 + x) * 4 + 4];
        assert_ne!(px(0, 0), px(8, 0));
        assert_eq!(px(0, 0)[3], 255);
    }

    #[test]
    fn ramp_is_one_row_and_runs_dark_to_bright_red() {
        let img = palette_ramp(256);
        assert_eq!((img.width, img.height), (256, 1));
        assert!(img.rgba[0] < img.rgba[255 * 4]);
    }

    #[test]
    fn degenerate_sizes_are_clamped() {
        assert_eq!(checkerboard(0, 0).width, 1);
        assert_eq!(palette_ramp(0).width, 2);
    }

    // ── loader thread ─────────────────────────────────────────────────────

    fn wait_for(loader: &mut AssetLoader) -> Vec<LoadedAsset> {
        for _ in 0..200 {
            let done = loader.drain();
            if !done.is_empty() {
                return done;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("loader produced nothing");
    }

    #[test]
    fn procedural_request_round_trips_through_the_thread() {
        let mut loader = AssetLoader::spawn().unwrap();
        loader.request("u_image", AssetSource::Checkerboard { size: 16, cells: 2 });
        assert!(loader.is_pending());

        let done = wait_for(&mut loader);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].slot, "u_image");
        assert!(done[0].result.is_ok());
        assert!(!loader.is_pending());
    }

    #[test]
    fn missing_file_is_a_resource_load_error() {
        let mut loader = AssetLoader::spawn().unwrap();
        loader.request("u_image", AssetSource::File("/definitely/not/here.png".into()));

        let done = wait_for(&mut loader);
        assert!(matches!(
            done[0].result,
            Err(EngineError::ResourceLoad { .. })
        ));
        assert!(!loader.is_pending());
    }
}
