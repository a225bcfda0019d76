use image::RgbImage;
use rayon::prelude::*;

use crate::{
    effects::transitions::FrameOp,
    foundation::{
        error::{ReelError, ReelResult},
        math::mul_div255_u8,
    },
};

const FRAC_BITS: u32 = 8;
const FRAC_ONE: u32 = 1 << FRAC_BITS;

/// Apply `op` to `src`, writing into `dst`. Both must have the same dimensions.
pub fn render_op_into(dst: &mut RgbImage, src: &RgbImage, op: FrameOp) -> ReelResult<()> {
    if dst.dimensions() != src.dimensions() {
        return Err(ReelError::validation(format!(
            "render target {}x{} does not match source {}x{}",
            dst.width(),
            dst.height(),
            src.width(),
            src.height()
        )));
    }
    match op {
        FrameOp::Identity => dst.copy_from_slice(src),
        FrameOp::Gain(g) => gain_in_place(dst, src, g),
        FrameOp::Scale(s) => {
            if !s.is_finite() || s < 1.0 {
                return Err(ReelError::validation(format!(
                    "zoom scale must be finite and >= 1.0, got {s}"
                )));
            }
            zoom_center_bilinear(dst, src, s);
        }
    }
    Ok(())
}

/// Apply `op` to `src` into a fresh image.
pub fn render_op(src: &RgbImage, op: FrameOp) -> ReelResult<RgbImage> {
    let mut dst = RgbImage::new(src.width(), src.height());
    render_op_into(&mut dst, src, op)?;
    Ok(dst)
}

fn gain_in_place(dst: &mut [u8], src: &[u8], gain: u8) {
    let g = u16::from(gain);
    dst.par_chunks_mut(4096)
        .zip(src.par_chunks(4096))
        .for_each(|(d, s)| {
            for (dc, &sc) in d.iter_mut().zip(s) {
                *dc = mul_div255_u8(u16::from(sc), g);
            }
        });
}

#[derive(Clone, Copy, Debug)]
struct Tap {
    i0: usize,
    i1: usize,
    w1: u32, // weight of i1 in 1/256ths
}

/// Sample positions for one axis of a centered zoom by `scale`.
fn axis_taps(len: u32, scale: f64) -> Vec<Tap> {
    let half = f64::from(len) / 2.0;
    let max = len.saturating_sub(1) as usize;
    (0..len)
        .map(|o| {
            let pos = ((f64::from(o) + 0.5 - half) / scale + half - 0.5).max(0.0);
            let i0 = (pos.floor() as usize).min(max);
            let i1 = (i0 + 1).min(max);
            let w1 = ((pos - i0 as f64) * f64::from(FRAC_ONE)).round() as u32;
            Tap {
                i0,
                i1,
                w1: w1.min(FRAC_ONE),
            }
        })
        .collect()
}

/// Magnify `src` about its center and keep the central `width x height` window.
fn zoom_center_bilinear(dst: &mut RgbImage, src: &RgbImage, scale: f64) {
    let (w, h) = src.dimensions();
    let xs = axis_taps(w, scale);
    let ys = axis_taps(h, scale);
    let stride = w as usize * 3;
    let src_raw: &[u8] = src.as_raw();

    dst.par_chunks_mut(stride)
        .zip(ys.par_iter())
        .for_each(|(row, ty)| {
            let r0 = &src_raw[ty.i0 * stride..(ty.i0 + 1) * stride];
            let r1 = &src_raw[ty.i1 * stride..(ty.i1 + 1) * stride];
            let wy1 = ty.w1;
            let wy0 = FRAC_ONE - wy1;
            for (px, tx) in row.chunks_exact_mut(3).zip(&xs) {
                let wx1 = tx.w1;
                let wx0 = FRAC_ONE - wx1;
                let (a, b) = (tx.i0 * 3, tx.i1 * 3);
                for c in 0..3 {
                    let top = u32::from(r0[a + c]) * wx0 + u32::from(r0[b + c]) * wx1;
                    let bot = u32::from(r1[a + c]) * wx0 + u32::from(r1[b + c]) * wx1;
                    let v = (top * wy0 + bot * wy1 + (1 << (2 * FRAC_BITS - 1))) >> (2 * FRAC_BITS);
                    px[c] = v.min(255) as u8;
                }
            }
        });
}

#[cfg(test)]
#[path = "../../tests/unit/effects/render.rs"]
mod tests;
