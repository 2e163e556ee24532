//! CLI library components for `plotline`.

pub mod logging;
pub mod session;
