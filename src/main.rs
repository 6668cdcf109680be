mod ui;

use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> eframe::Result<()> {
    let (settings, settings_err) = mehfil::config::load_settings();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Reported only now that the subscriber exists.
    if let Some(err) = settings_err {
        warn!(error = %err, "ignoring malformed settings; using defaults");
    }

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Mehfil",
        options,
        Box::new(move |_cc| Ok(Box::new(ui::app::MehfilApp::new(settings)?))),
    )
}
