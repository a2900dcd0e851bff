//! Kineplot viewer main entry point

fn main() -> eframe::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kineplot_frontend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Kineplot");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Kineplot"),
        ..Default::default()
    };

    eframe::run_native(
        "kineplot",
        native_options,
        Box::new(|cc| Ok(Box::new(kineplot_frontend::KineplotApp::new(cc)?))),
    )
}
