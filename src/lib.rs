#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use av_cfg as cfg;
pub use av_raw as raw;
pub use av_vec as vec;

pub use av_vec::{DynamicArray, dyn_array};
