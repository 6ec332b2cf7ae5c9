#![forbid(unsafe_code)]

pub mod model;
pub mod progress;
pub mod scorer;
pub mod time;

pub use time::Clock;
