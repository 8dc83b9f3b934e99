//! Pixel-level image helpers.
//!
//! All buffers are row-major straight ARGB (`0xAARRGGBB`).

use rice_core::{Image, Rect};

/// Direction a gradient runs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientDirection {
    /// Left to right; every row is identical.
    Horizontal,
    /// Top to bottom; every column is identical.
    Vertical,
}

/// `steps` colors linearly interpolated per channel from `start` to `end`.
///
/// Interpolation runs in 8.8 fixed point. The first and last entries are
/// always exactly `start` and `end`.
pub fn gradient(start: u32, end: u32, steps: usize) -> Vec<u32> {
    match steps {
        0 => return Vec::new(),
        1 => return vec![start],
        2 => return vec![start, end],
        _ => {}
    }

    let channels = |c: u32| -> [i32; 4] {
        [
            (c >> 24) as i32,
            ((c >> 16) & 0xFF) as i32,
            ((c >> 8) & 0xFF) as i32,
            (c & 0xFF) as i32,
        ]
    };
    let s = channels(start);
    let e = channels(end);
    let div = steps as i32 - 1;
    let step: [i32; 4] = std::array::from_fn(|i| ((e[i] - s[i]) << 8) / div);
    let mut acc: [i32; 4] = std::array::from_fn(|i| s[i] << 8);

    let mut out = Vec::with_capacity(steps);
    out.push(start);
    for _ in 1..steps - 1 {
        for i in 0..4 {
            acc[i] += step[i];
        }
        let [a, r, g, b] = acc.map(|v| ((v >> 8) & 0xFF) as u32);
        out.push(a << 24 | r << 16 | g << 8 | b);
    }
    out.push(end);
    out
}

/// A `width x height` rectangle filled with a gradient, optionally stroked
/// with a 1px border and with its corners cut away.
///
/// A border whose alpha is zero is not drawn. Corners are cleared as
/// triangles of `arc` rows, one pixel narrower per row, with the border
/// following the diagonal.
pub fn gradient_round_rect(
    width: i32,
    height: i32,
    start: u32,
    end: u32,
    border: u32,
    arc: i32,
    direction: GradientDirection,
) -> Vec<u32> {
    if width <= 0 || height <= 0 {
        return Vec::new();
    }
    let (w, h) = (width as usize, height as usize);
    let mut rgb = vec![0u32; w * h];

    match direction {
        GradientDirection::Horizontal => {
            let g = gradient(start, end, w);
            for row in rgb.chunks_exact_mut(w) {
                row.copy_from_slice(&g);
            }
        }
        GradientDirection::Vertical => {
            let g = gradient(start, end, h);
            for (row, &c) in rgb.chunks_exact_mut(w).zip(g.iter()) {
                row.fill(c);
            }
        }
    }

    let stroke = rice_core::is_visible(border);
    if stroke {
        rgb[..w].fill(border);
        rgb[(h - 1) * w..].fill(border);
        for y in 1..h.saturating_sub(1) {
            rgb[y * w] = border;
            rgb[y * w + w - 1] = border;
        }
    }

    let arc = arc.clamp(0, width.min(height) / 2);
    let mut corner_row = |row: &mut [u32], dist: i32| {
        // Left: clear [0, arc - dist - 1), edge pixel at arc - dist - 1.
        let edge = (arc - dist - 1).max(0) as usize;
        row[..edge].fill(0);
        if stroke {
            row[edge] = border;
        }
        // Right: edge pixel at width - arc + dist, clear everything after it.
        let edge = (width - arc + dist).min(width - 1) as usize;
        if stroke {
            row[edge] = border;
        }
        row[edge + 1..].fill(0);
    };
    for dist in 0..arc {
        let top = dist as usize;
        corner_row(&mut rgb[top * w..(top + 1) * w], dist);
        let bottom = h - 1 - top;
        corner_row(&mut rgb[bottom * w..(bottom + 1) * w], dist);
    }

    rgb
}

/// Enlarges a nine-patch image so its stretchable middle spans
/// `content_w x content_h`.
///
/// The single pixel column and row through the image's middle are the
/// stretchable lines; every other pixel is copied verbatim into the corners
/// and edges. With `use_padding` the content size excludes the image's own
/// margins, so the result is `image + content - 1` on each axis. Without it
/// the content size is the total target size.
///
/// Only enlargement is meaningful; smaller targets are clamped to the source
/// size.
pub fn stretch_nine_patch(image: &Image, content_w: i32, content_h: i32, use_padding: bool) -> Image {
    let (iw, ih) = image.size();
    if iw == 0 || ih == 0 {
        return image.clone();
    }
    let (mut cw, mut ch) = (content_w, content_h);
    if !use_padding {
        cw = cw - iw + 1;
        ch = ch - ih + 1;
    }
    let cw = cw.max(1);
    let ch = ch.max(1);
    if cw == 1 && ch == 1 {
        return image.clone();
    }

    let dst_w = (iw + cw - 1) as usize;
    let dst_h = (ih + ch - 1) as usize;
    let (iw, ih) = (iw as usize, ih as usize);
    let h_mid = iw / 2;
    let v_mid = ih / 2;
    let src = image.pixels();

    let stretch_row = |src_row: &[u32], dst_row: &mut [u32]| {
        let right = iw - h_mid - 1;
        dst_row[..h_mid].copy_from_slice(&src_row[..h_mid]);
        dst_row[h_mid..dst_w - right].fill(src_row[h_mid]);
        dst_row[dst_w - right..].copy_from_slice(&src_row[h_mid + 1..]);
    };

    let mut dst = vec![0u32; dst_w * dst_h];
    let bottom_rows = ih - v_mid - 1;
    for (y, dst_row) in dst.chunks_exact_mut(dst_w).enumerate() {
        let src_y = if y < v_mid {
            y
        } else if y < dst_h - bottom_rows {
            v_mid
        } else {
            y - (dst_h - ih)
        };
        stretch_row(&src[src_y * iw..(src_y + 1) * iw], dst_row);
    }

    match Image::from_argb(dst_w as u32, dst_h as u32, dst) {
        Ok(img) => img,
        Err(e) => {
            log::error!("nine-patch stretch produced a bad buffer: {e}");
            image.clone()
        }
    }
}

/// Scales `image` into a `dst_w x dst_h` box keeping its aspect ratio.
///
/// The axis with slack is shrunk to match the source ratio. Returns the same
/// handle when the target is degenerate or already the source size.
pub fn scale_image(image: &Image, dst_w: i32, dst_h: i32) -> Image {
    let (sw, sh) = image.size();
    if dst_w <= 0 || dst_h <= 0 || sw == 0 || sh == 0 || (dst_w == sw && dst_h == sh) {
        return image.clone();
    }

    let dst_ratio = dst_w as f64 / dst_h as f64;
    let src_ratio = sw as f64 / sh as f64;
    let (w, h) = if dst_ratio < src_ratio {
        (dst_w, ((dst_w as f64 / src_ratio) as i32).max(1))
    } else {
        (((dst_h as f64 * src_ratio) as i32).max(1), dst_h)
    };

    let pixels = bilinear_scale(image.pixels(), sw, sh, w, h);
    match Image::from_argb(w as u32, h as u32, pixels) {
        Ok(img) => img,
        Err(e) => {
            log::error!("bilinear scale produced a bad buffer: {e}");
            image.clone()
        }
    }
}

/// Four-neighbour bilinear resampling in 8-bit fixed point.
///
/// Both axes use the horizontal ratio. Neighbours that fall outside the
/// source buffer read as transparent black.
pub fn bilinear_scale(src: &[u32], src_w: i32, src_h: i32, dst_w: i32, dst_h: i32) -> Vec<u32> {
    if dst_w <= 0 || dst_h <= 0 || src_w <= 0 || src_h <= 0 {
        return Vec::new();
    }
    let percent = (dst_w * 100 / src_w).max(1);
    let ratio = (100 << 8) / percent;
    let get = |offset: i32| -> u32 {
        usize::try_from(offset)
            .ok()
            .and_then(|o| src.get(o).copied())
            .unwrap_or(0)
    };

    let mut dst = Vec::with_capacity((dst_w * dst_h) as usize);
    for j in 0..dst_h {
        let ty = j * ratio;
        let oy = ty >> 8;
        let fy = ty & 0xFF;
        for i in 0..dst_w {
            let tx = i * ratio;
            let ox = tx >> 8;
            let fx = tx & 0xFF;

            let lt = oy * src_w + ox;
            let rt = lt + i32::from(ox < src_w - 1);
            let (lb, rb) = if oy < src_h - 1 {
                (lt + src_w, rt + src_w)
            } else {
                (lt, rt)
            };
            dst.push(bilinear_mix(fx, fy, get(lt), get(rt), get(lb), get(rb)));
        }
    }
    dst
}

fn bilinear_mix(x: i32, y: i32, c00: u32, c10: u32, c01: u32, c11: u32) -> u32 {
    let b1 = (0x100 - x) * (0x100 - y);
    let b2 = x * (0x100 - y);
    let b3 = y * (0x100 - x);
    let b4 = x * y;
    let channel = |shift: u32| -> u32 {
        let ch = |c: u32| ((c >> shift) & 0xFF) as i32;
        let v = (b1 * ch(c00) + b2 * ch(c10) + b3 * ch(c01) + b4 * ch(c11)) >> 16;
        v.clamp(0, 255) as u32
    };
    channel(24) << 24 | channel(16) << 16 | channel(8) << 8 | channel(0)
}

/// The visible part of a `w x h` block drawn at `(x, y)` under `clip`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClippedBlock {
    /// Index of the first visible source pixel.
    pub offset: usize,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Trims a block to `clip`, adjusting the source offset so rows still start
/// at the right pixel. `None` when nothing is visible.
pub fn clip_block(x: i32, y: i32, w: i32, h: i32, scan: usize, clip: Rect) -> Option<ClippedBlock> {
    let visible = Rect::new(x, y, w, h).intersect(&clip)?;
    let offset = (visible.y - y) as usize * scan + (visible.x - x) as usize;
    Some(ClippedBlock {
        offset,
        x: visible.x,
        y: visible.y,
        w: visible.w,
        h: visible.h,
    })
}
