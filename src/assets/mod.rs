/// Source descriptors and JPEG/PNG decoding.
pub mod decode;
