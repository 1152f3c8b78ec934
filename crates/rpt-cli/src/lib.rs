//! Library side of the `rpt` binary: logging setup and command runners.

pub mod commands;
pub mod logging;
