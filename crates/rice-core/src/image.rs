use std::sync::Arc;

use crate::error::ImageError;
use crate::geometry::Rect;

/// Immutable ARGB raster, cheap to clone.
///
/// Two handles are the *same* image only when they share a buffer; the
/// nine-patch and scaling helpers return the input handle unchanged when no
/// work is needed, and callers rely on [`Image::ptr_eq`] to observe that.
#[derive(Clone)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Arc<[u32]>,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Image({}x{})", self.width, self.height)
    }
}

impl Image {
    pub fn from_argb(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self, ImageError> {
        if pixels.len() != (width as usize) * (height as usize) {
            log::warn!(
                "rejecting {width}x{height} image with {} pixels",
                pixels.len()
            );
            return Err(ImageError::SizeMismatch {
                width,
                height,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    /// A `width x height` image filled with one color.
    pub fn solid(width: u32, height: u32, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; width as usize * height as usize].into(),
        }
    }

    /// Decodes PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let rgba = image::load_from_memory(bytes)
            .inspect_err(|e| log::warn!("image decode failed: {e}"))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded {width}x{height} image from {} bytes", bytes.len());
        let pixels = rgba
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect::<Vec<_>>();
        Self::from_argb(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Copies the part of `area` that lies inside the image, row by row.
    pub fn region(&self, area: Rect) -> Vec<u32> {
        let bounds = Rect::from_size(self.width as i32, self.height as i32);
        let Some(r) = bounds.intersect(&area) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity((r.w * r.h) as usize);
        for y in r.y..r.bottom() {
            let start = (y * self.width as i32 + r.x) as usize;
            out.extend_from_slice(&self.pixels[start..start + r.w as usize]);
        }
        out
    }

    pub fn ptr_eq(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    /// Converts to an `image` buffer, e.g. for saving screenshots.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        let mut buf = image::RgbaImage::new(self.width, self.height);
        for (dst, &argb) in buf.pixels_mut().zip(self.pixels.iter()) {
            dst.0 = [
                (argb >> 16) as u8,
                (argb >> 8) as u8,
                argb as u8,
                (argb >> 24) as u8,
            ];
        }
        buf
    }
}
