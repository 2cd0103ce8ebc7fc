use acsgrid::{
    config::Config,
    export::{write_table, write_table_set},
    extract::Extractor,
    tables::select_zip_codes,
};
use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,acsgrid=info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) config ───────────────────────────────────────────────────
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_yaml_file(&path)?,
        None => Config::default(),
    };
    info!(
        workbook_dir = %config.workbook_dir.display(),
        output_dir = %config.output_dir.display(),
        format = ?config.format,
        "config loaded"
    );

    // ─── 3) extract all ten tables ───────────────────────────────────
    let start = Instant::now();
    let tables = Extractor::new(&config).load_all();
    for (table, rows) in tables.row_counts() {
        if rows == 0 {
            warn!(table, "table is empty");
        } else {
            info!(table, rows, "extracted");
        }
    }
    info!(elapsed = ?start.elapsed(), "extraction done");

    // ─── 4) write tables ─────────────────────────────────────────────
    let written = write_table_set(&tables, &config.output_dir, config.format)?;

    // ─── 5) per-ZIP trend view for the configured selection ──────────
    let selected = select_zip_codes(tables.zip_trends.clone(), &config.zip_selection());
    write_table(
        &config.output_dir,
        "zip_trends_selected",
        &selected,
        config.format,
    )?;

    info!(files = written.len() + 1, "all done");
    Ok(())
}
