//! Application state and top-level UI

use std::time::{Duration, Instant};

use kineplot_core::{Expr, Point, ReferenceFrame, Symbol};
use kineplot_renderer::{Animation, AnnotLocation, BodySpec, Camera, Scene, SceneError};

use crate::config::{AppConfig, ConfigManager};
use crate::viewport;

/// A driven double pendulum: two links hanging from the zero point, each
/// with its own frame and a circular outline.
fn demo_scene() -> Result<Scene, SceneError> {
    let n = ReferenceFrame::new("N");
    let o = Point::new("O");
    let mut scene = Scene::new(n.clone(), o.clone())?;

    let a = n.orient_axis("A", [0.0, 0.0, 1.0], Expr::symbol("q1"));
    let b = n.orient_axis("B", [0.0, 0.0, 1.0], Expr::symbol("q2"));
    let elbow = o.locatenew("elbow", -a.y() * 2.0);
    let bob = elbow.locatenew("bob", -b.y() * 1.5);

    scene.add_line(vec![o, elbow.clone(), bob.clone()], "links")?;
    scene.add_body(BodySpec::rigid("upper", elbow, a).with_shape_radius(0.25))?;
    scene.add_body(BodySpec::rigid("lower", bob, b).with_shape_radius(0.2))?;

    scene.lambdify_system(&[Symbol::new("q1"), Symbol::new("q2")])?;
    scene.evaluate_system(&[0.0, 0.0])?;
    Ok(scene)
}

/// An unbounded drive for the demo: both angles swing with different
/// periods so the motion never repeats exactly.
fn demo_animation(scene: &Scene, config: &AppConfig) -> Result<Animation, SceneError> {
    let time_step = config.playback.time_step;
    scene.animate(
        |t| vec![(0.9 * t).sin() * 0.9, (1.4 * t).sin() * 1.6],
        (0u64..).map(move |i| i as f64 * time_step),
        config.playback.interval_ms,
    )
}

/// The Kineplot viewer application.
pub struct KineplotApp {
    scene: Scene,
    animation: Animation,
    playing: bool,
    last_step: Instant,
    config: ConfigManager,
}

impl KineplotApp {
    /// Build the app with the demo scene and stored preferences.
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Result<Self, SceneError> {
        let config = ConfigManager::new();
        let mut scene = demo_scene()?;
        scene.set_annot_location(config.config().view.annot_location);
        scene.plot(true, config.config().view.auto_zoom_scale);
        let animation = demo_animation(&scene, config.config())?;
        Ok(Self {
            scene,
            animation,
            playing: config.config().playback.autoplay,
            last_step: Instant::now(),
            config,
        })
    }

    /// Restart the animation from its first frame.
    fn restart(&mut self) {
        match demo_animation(&self.scene, self.config.config()) {
            Ok(animation) => {
                self.animation = animation;
                self.last_step = Instant::now();
                self.playing = true;
            }
            Err(e) => tracing::error!("Failed to restart animation: {}", e),
        }
    }

    /// Advance the animation when its interval has elapsed.
    fn step_animation(&mut self) {
        if !self.playing {
            return;
        }
        let interval = Duration::from_millis(self.animation.interval_ms());
        if self.last_step.elapsed() < interval {
            return;
        }
        self.last_step = Instant::now();
        match self.animation.step(&mut self.scene) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!("Animation finished");
                self.playing = false;
            }
            Err(e) => {
                tracing::error!("Animation step failed: {}", e);
                self.playing = false;
            }
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Kineplot");
                ui.separator();

                ui.horizontal(|ui| {
                    let label = if self.playing { "Pause" } else { "Play" };
                    if ui.button(label).clicked() {
                        self.playing = !self.playing;
                        self.last_step = Instant::now();
                    }
                    if ui.button("Restart").clicked() {
                        self.restart();
                    }
                });

                ui.separator();
                ui.heading("View");
                if ui.button("Auto zoom").clicked() {
                    self.scene.auto_zoom(self.config.config().view.auto_zoom_scale);
                }
                if ui.button("View as 2D").clicked() {
                    if let Err(e) = self.scene.set_plot_as_2d(None) {
                        tracing::warn!("Failed to switch to 2D view: {}", e);
                    }
                }
                if ui.button("Reset camera").clicked() {
                    self.scene.axes.camera = Camera::default();
                }

                ui.separator();
                ui.heading("Annotation");
                let mut location = self.scene.annot_location();
                ui.radio_value(&mut location, AnnotLocation::Object, "At object");
                ui.radio_value(&mut location, AnnotLocation::Mouse, "At cursor");
                if location != self.scene.annot_location() {
                    self.scene.set_annot_location(location);
                    self.config.config_mut().view.annot_location = location;
                }

                ui.separator();
                ui.heading("Objects");
                let names: Vec<String> = self
                    .scene
                    .objects()
                    .iter()
                    .map(|object| object.name().to_string())
                    .collect();
                for name in names {
                    let mut visible = self
                        .scene
                        .get_plot_object(&name)
                        .map(|object| object.data().visible)
                        .unwrap_or(true);
                    if ui.checkbox(&mut visible, &name).changed() {
                        if let Err(e) = self.scene.set_visibility(&name, visible) {
                            tracing::warn!("Failed to set visibility: {}", e);
                        }
                    }
                }

                ui.separator();
                let camera = &self.scene.axes.camera;
                ui.label(format!("Elevation: {:.1}\u{00B0}", camera.elevation));
                ui.label(format!("Azimuth: {:.1}\u{00B0}", camera.azimuth));
                ui.label(format!("Distance: {:.2}", camera.distance));
            });
    }
}

impl eframe::App for KineplotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.step_animation();
        self.side_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            viewport::show(ui, &mut self.scene);
        });

        if self.playing {
            ctx.request_repaint_after(Duration::from_millis(self.animation.interval_ms()));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_scene_builds_and_evaluates() {
        let scene = demo_scene().unwrap();
        assert!(scene.get_plot_object("links").is_some());
        assert!(scene.get_plot_object("upper").is_some());
        assert!(scene.get_plot_object("lower.masscenter").is_some());

        // At rest both links hang straight down.
        let lower = scene.get_plot_object("lower").unwrap();
        assert!((lower.annot_coords().y + 3.5).abs() < 1e-12);
    }

    #[test]
    fn test_demo_animation_advances() {
        let mut scene = demo_scene().unwrap();
        let config = AppConfig::default();
        let mut animation = demo_animation(&scene, &config).unwrap();
        assert!(animation.step(&mut scene).unwrap());
        assert!(animation.step(&mut scene).unwrap());
    }
}
