// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Surface snapshots — pixel capture, width-bounded downscale, PNG + base64
// encoding. Operates on in-memory RGBA buffers using the `image` crate.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, instrument};
use webcanvas_bridge::Surface;
use webcanvas_core::config::SnapshotFilter;
use webcanvas_core::error::{CanvasError, Result};

/// Dimensions a capture buffer is allocated with: the layout size with each
/// side clamped to at least one pixel.
pub fn capture_size((width, height): (u32, u32)) -> (u32, u32) {
    (width.max(1), height.max(1))
}

/// Target size when `max_width` forces a downscale, or `None` to keep the
/// capture as is. Aspect ratio is preserved and the height never drops
/// below one pixel.
pub fn scaled_size(width: u32, height: u32, max_width: Option<u32>) -> Option<(u32, u32)> {
    let max_width = max_width.filter(|&w| w > 0 && w < width)?;
    let scaled = (f64::from(height) * f64::from(max_width) / f64::from(width)).round();
    Some((max_width, (scaled as u32).max(1)))
}

fn resize_filter(filter: SnapshotFilter) -> FilterType {
    match filter {
        SnapshotFilter::Nearest => FilterType::Nearest,
        SnapshotFilter::Triangle => FilterType::Triangle,
        SnapshotFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// A captured frame of a surface.
///
/// ```ignore
/// let b64 = Snapshot::capture(surface.as_ref())?
///     .fit_width(Some(800), SnapshotFilter::Triangle)
///     .to_base64_png()?;
/// ```
pub struct Snapshot {
    image: RgbaImage,
}

impl Snapshot {
    /// Draw the surface's rendered pixels into a buffer sized to its layout.
    /// Must run on the surface's UI thread.
    #[instrument(skip_all, fields(platform = surface.platform_name()))]
    pub fn capture(surface: &dyn Surface) -> Result<Self> {
        let (width, height) = capture_size(surface.layout_size());
        let mut image = RgbaImage::new(width, height);
        surface.draw(&mut image)?;
        debug!(width, height, "surface captured");
        Ok(Self { image })
    }

    /// Wrap an already-captured buffer.
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Downscale to `max_width` when the capture is wider; otherwise a no-op.
    pub fn fit_width(self, max_width: Option<u32>, filter: SnapshotFilter) -> Self {
        let Some((width, height)) = scaled_size(self.width(), self.height(), max_width) else {
            return self;
        };
        debug!(
            from_w = self.width(),
            from_h = self.height(),
            width,
            height,
            "downscaling snapshot"
        );
        let image = imageops::resize(&self.image, width, height, resize_filter(filter));
        Self { image }
    }

    /// Encode as PNG at the strongest compression level.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, PngFilter::Adaptive);
        self.image.write_with_encoder(encoder).map_err(|err| {
            CanvasError::ImageError(format!("PNG encoding failed: {}", err))
        })?;
        Ok(buffer)
    }

    /// PNG bytes as standard base64 without line breaks.
    pub fn to_base64_png(&self) -> Result<String> {
        let png = self.to_png_bytes()?;
        debug!(png_len = png.len(), "snapshot encoded");
        Ok(BASE64_ENGINE.encode(png))
    }
}
