#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod dashboard;
pub mod log;
mod service;
mod settings;

pub use dashboard::*;
pub use service::*;
pub use settings::*;
