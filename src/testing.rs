//! Reference encoders for tests, via `xz2`.

use std::io::prelude::*;

use xz2::{
    stream::{LzmaOptions, Stream},
    write::XzEncoder,
};

pub fn xz_compress(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = XzEncoder::new(vec![], 6);
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Compress into the legacy `.lzma` ("LZMA_Alone") container.
pub fn lzma_alone_compress(bytes: &[u8]) -> Vec<u8> {
    let options = LzmaOptions::new_preset(6).unwrap();
    let stream = Stream::new_lzma_encoder(&options).unwrap();
    let mut encoder = XzEncoder::new_stream(vec![], stream);
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}
