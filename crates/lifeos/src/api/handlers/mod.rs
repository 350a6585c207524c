//! HTTP request handlers.

mod chat;
mod kpi;
mod misc;
mod profile;
mod projects;
mod relay;

pub use chat::*;
pub use kpi::*;
pub use misc::*;
pub use profile::*;
pub use projects::*;
pub use relay::*;
