#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]

pub mod command;
pub mod level;
pub mod try_log;
pub use try_log::WorldExt as WorldTryLog;
