use crate::foundation::{
    core::{AspectRatio, div_round},
    error::{ReelError, ReelResult},
};

/// Axis-aligned crop in source pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn fits_within(self, source_width: u32, source_height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(source_width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(source_height)
    }

    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Centered crop of a `source_width` x `source_height` image to `target`.
///
/// The primary policy keeps the full height and trims the sides. When the source is narrower
/// than the target ratio the policy flips: the full width is kept and the top and bottom are
/// trimmed evenly. Offsets round down, sizes round half up.
pub fn compute_crop_rect(
    source_width: u32,
    source_height: u32,
    target: AspectRatio,
) -> ReelResult<CropRect> {
    if source_width == 0 || source_height == 0 {
        return Err(ReelError::InvalidDimensions {
            index: None,
            width: source_width,
            height: source_height,
        });
    }
    if target.num == 0 || target.den == 0 {
        return Err(ReelError::validation("crop aspect ratio terms must be > 0"));
    }

    let width = target.width_for_height(source_height).max(1);
    if width <= source_width {
        return Ok(CropRect {
            x: (source_width - width) / 2,
            y: 0,
            width,
            height: source_height,
        });
    }

    let height = target
        .height_for_width(source_width)
        .clamp(1, source_height);
    Ok(CropRect {
        x: 0,
        y: (source_height - height) / 2,
        width: source_width,
        height,
    })
}

/// Proportional scale of a crop so its height becomes `target_height`.
///
/// Width is `round(cropped_width * target_height / cropped_height)`, never below 1.
pub fn compute_resize_target(
    cropped_width: u32,
    cropped_height: u32,
    target_height: u32,
) -> ReelResult<(u32, u32)> {
    if cropped_width == 0 || cropped_height == 0 || target_height == 0 {
        return Err(ReelError::InvalidDimensions {
            index: None,
            width: cropped_width,
            height: cropped_height,
        });
    }
    let width = div_round(
        u64::from(cropped_width) * u64::from(target_height),
        u64::from(cropped_height),
    )
    .max(1);
    Ok((width, target_height))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
