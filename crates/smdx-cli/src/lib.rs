//! Shared pieces of the smdx command line tools

pub mod config;
pub mod logging;
