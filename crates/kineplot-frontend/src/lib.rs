//! Kineplot Viewer Frontend
//!
//! An egui application around a [`kineplot_renderer::Scene`]: a control
//! panel, a painted 3D viewport with orbit controls and hover
//! annotations, and an animation playback loop.

mod app;
mod config;
mod viewport;

pub use app::KineplotApp;
pub use config::{AppConfig, ConfigManager};
