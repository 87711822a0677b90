//! Lossless compression: Huffman coding, run-length encoding and LZW.

pub mod huffman;
pub mod lzw;
pub mod rle;

pub use huffman::{Huffman, HuffmanNode, HuffmanResult};
pub use lzw::{Lzw, LzwResult};
pub use rle::{RleResult, Run, RunLength};
