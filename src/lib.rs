#![doc = include_str!("../README.md")]
#![no_std]

pub use mirra_json as json;
pub use mirra_reflect as reflect;
