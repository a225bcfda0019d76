use std::io::Cursor;

use super::*;

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

#[test]
fn decode_png_and_jpeg() {
    let rgb = image::RgbImage::from_pixel(4, 6, image::Rgb([10, 200, 30]));
    let png = encode(DynamicImage::ImageRgb8(rgb.clone()), ImageFormat::Png);
    let jpg = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Jpeg);

    let a = decode_image(&png).unwrap();
    assert_eq!((a.width(), a.height()), (4, 6));
    let b = decode_image(&jpg).unwrap();
    assert_eq!((b.width(), b.height()), (4, 6));
}

#[test]
fn garbage_and_truncated_data_are_unsupported() {
    assert!(matches!(
        decode_image(b"definitely not an image"),
        Err(ReelError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        decode_image(&[]),
        Err(ReelError::UnsupportedFormat { .. })
    ));

    let rgb = image::RgbImage::from_pixel(32, 32, image::Rgb([1, 2, 3]));
    let png = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);
    let truncated = &png[..png.len() / 2];
    assert!(matches!(
        decode_image(truncated),
        Err(ReelError::UnsupportedFormat { .. })
    ));
}

#[test]
fn other_formats_are_rejected() {
    let rgb = image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3]));
    let bmp = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Bmp);
    let err = decode_image(&bmp).unwrap_err();
    assert!(err.to_string().contains("not supported"), "{err}");
}

#[test]
fn path_extension_gate_runs_before_io() {
    let src = ImageSource::path("missing/photo.gif");
    assert!(matches!(
        src.decode(),
        Err(ReelError::UnsupportedFormat { .. })
    ));

    let src = ImageSource::path("missing/photo.JPG");
    assert!(matches!(src.decode(), Err(ReelError::Io { .. })));
}

#[test]
fn labels_prefer_file_names() {
    assert_eq!(ImageSource::path("a/b/c.png").label(), "c.png");
    assert_eq!(ImageSource::memory("upload-3", vec![]).label(), "upload-3");
}
