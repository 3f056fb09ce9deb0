//! Background decoding of the surface texture.
//!
//! Image decoding lives outside the render core: the renderer starts
//! with an allocated placeholder handle and swaps in real pixels
//! whenever the decode thread delivers them. A missing or broken file
//! is non-fatal, the placeholder simply stays.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use tracing::{info, warn};

pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Spawn the decode thread. The receiver yields at most one image;
/// the channel disconnects afterwards (or immediately on failure).
pub fn spawn(path: PathBuf) -> Receiver<DecodedImage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || match image::open(&path) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            info!(path = %path.display(), width, height, "surface texture decoded");
            let _ = tx.send(DecodedImage {
                width,
                height,
                pixels: rgba.into_raw(),
            });
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "surface texture not loaded, placeholder stays"
            );
        }
    });
    rx
}
