#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_docs, missing_debug_implementations, nonstandard_style)]

mod command;
mod error;
mod log;
mod logging;
mod task;

#[cfg(all(test, unix))]
mod test_support;

pub use command::*;
pub use error::*;
pub use log::*;
pub use logging::*;
pub use task::*;
