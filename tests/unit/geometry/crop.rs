use super::*;

const R: AspectRatio = AspectRatio::PORTRAIT_9_16;

#[test]
fn landscape_keeps_height_and_centers_horizontally() {
    let rect = compute_crop_rect(4000, 3000, R).unwrap();
    // 3000 * 9 / 16 = 1687.5 -> 1688
    assert_eq!(
        rect,
        CropRect {
            x: 1156,
            y: 0,
            width: 1688,
            height: 3000
        }
    );
}

#[test]
fn exact_portrait_is_identity() {
    let rect = compute_crop_rect(1080, 1920, R).unwrap();
    assert_eq!(
        rect,
        CropRect {
            x: 0,
            y: 0,
            width: 1080,
            height: 1920
        }
    );
}

#[test]
fn odd_margin_offset_rounds_down() {
    let rect = compute_crop_rect(1083, 1920, R).unwrap();
    assert_eq!(rect.x, 1);
    assert_eq!(rect.width, 1080);
}

#[test]
fn narrow_source_falls_back_to_width_preserving() {
    // 500 wide but 1920 tall wants 1080 wide: keep width, trim height.
    let rect = compute_crop_rect(500, 1920, R).unwrap();
    // 500 * 16 / 9 = 888.9 -> 889
    assert_eq!(
        rect,
        CropRect {
            x: 0,
            y: 515,
            width: 500,
            height: 889
        }
    );
}

#[test]
fn tiny_sources_stay_non_degenerate() {
    let rect = compute_crop_rect(1, 1, R).unwrap();
    assert_eq!(rect.width, 1);
    assert_eq!(rect.height, 1);
    assert!(rect.fits_within(1, 1));

    let rect = compute_crop_rect(1, 1000, R).unwrap();
    assert_eq!(rect.width, 1);
    assert_eq!(rect.height, 2);
    assert!(rect.fits_within(1, 1000));
}

#[test]
fn zero_dimensions_are_rejected() {
    assert!(matches!(
        compute_crop_rect(0, 10, R),
        Err(ReelError::InvalidDimensions {
            width: 0,
            height: 10,
            ..
        })
    ));
    assert!(compute_crop_rect(10, 0, R).is_err());
}

#[test]
fn crop_is_contained_and_ratio_is_close_for_many_sizes() {
    let sizes = [2u32, 3, 7, 16, 99, 480, 607, 720, 1080, 1919, 1920, 2048, 4032, 6000];
    for &w in &sizes {
        for &h in &sizes {
            let rect = compute_crop_rect(w, h, R).unwrap();
            assert!(rect.fits_within(w, h), "{w}x{h} -> {rect:?}");
            assert!(rect.width >= 1 && rect.height >= 1);

            let primary = R.width_for_height(h) <= w;
            if primary {
                assert_eq!(rect.height, h, "{w}x{h}");
                assert_eq!(rect.y, 0);
            } else {
                assert_eq!(rect.width, w, "{w}x{h}");
                assert_eq!(rect.x, 0);
            }

            // Rounding error only matters for very small crops.
            if rect.width >= 50 && rect.height >= 50 {
                let err = (rect.ratio() - R.as_f64()).abs() / R.as_f64();
                assert!(err < 0.01, "{w}x{h} -> {rect:?} ratio err {err}");
            }
        }
    }
}

#[test]
fn resize_target_scales_to_exact_height() {
    assert_eq!(compute_resize_target(1688, 3000, 1920).unwrap(), (1080, 1920));
    assert_eq!(compute_resize_target(1080, 1920, 1920).unwrap(), (1080, 1920));
    assert_eq!(compute_resize_target(540, 960, 1920).unwrap(), (1080, 1920));
    assert_eq!(compute_resize_target(1080, 1920, 1080).unwrap(), (608, 1080));
}

#[test]
fn resize_target_never_collapses_width() {
    assert_eq!(compute_resize_target(1, 10_000, 10).unwrap(), (1, 10));
}

#[test]
fn resize_target_rejects_zero() {
    assert!(compute_resize_target(0, 10, 10).is_err());
    assert!(compute_resize_target(10, 0, 10).is_err());
    assert!(compute_resize_target(10, 10, 0).is_err());
}
