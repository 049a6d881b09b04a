mod bootstrap;

use anyhow::{Context, Result};
use dashboard_core::settings::Settings;
use dashboard_data::analysis::{build_snapshot, distinct_descriptions, load_and_clean, DashboardQuery};
use dashboard_data::export::export_all;
use dashboard_ui::app::App;
use dashboard_ui::report::render_report;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    let logs_dir = bootstrap::ensure_directories()?;
    let interactive = settings.view == "dashboard";
    let log_path =
        bootstrap::resolve_log_path(settings.log_file.as_deref(), interactive, &logs_dir);
    bootstrap::setup_logging(&settings.log_level, log_path.as_deref())?;

    tracing::info!("Crime Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Window: {}, View: {}, Theme: {}",
        settings.data_file.display(),
        settings.window(),
        settings.view,
        settings.theme
    );

    let dataset = load_and_clean(&settings.data_file)
        .with_context(|| format!("failed to load {}", settings.data_file.display()))?;

    let descriptions = distinct_descriptions(&dataset.incidents);
    let query = DashboardQuery {
        window: settings.window(),
        highlighted: bootstrap::choose_crime(settings.crime.as_deref(), &descriptions),
    };

    if let Some(dir) = &settings.export_dir {
        let snapshot = build_snapshot(&dataset.incidents, &query);
        let written = export_all(dir, &dataset.incidents, &snapshot)
            .with_context(|| format!("failed to export to {}", dir.display()))?;
        for path in &written {
            tracing::info!("Wrote {}", path.display());
        }
    }

    match settings.view.as_str() {
        "report" => {
            let snapshot = build_snapshot(&dataset.incidents, &query);
            print!("{}", render_report(&snapshot));
        }
        _ => {
            let app = App::new(&settings.theme, dataset.incidents, query);
            app.run()?;
        }
    }

    Ok(())
}
