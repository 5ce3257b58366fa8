#![allow(clippy::module_inception)]

pub use config::Command;
pub use config::ProbeConfig;

pub use engine::Engine;
pub use engine::NetEngine;
pub use engine::Target;

pub use error::Error;

pub use stats::Statistics;
pub use stats::Summary;

pub mod config;
pub mod driver;
pub mod emit;
pub mod engine;
pub mod icmp;
pub mod ping;
pub mod stats;

mod error;
