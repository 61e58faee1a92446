use crate::config::SyncSettings;
use crate::db::Database;
use crate::report::{Export, ExportFormat};

pub fn export(
    db: &Database,
    settings: &SyncSettings,
    format: &str,
    output: Option<&str>,
) -> anyhow::Result<()> {
    let export = Export::build(db, settings)?;

    let fmt = match format {
        "json" => ExportFormat::Json,
        "terminal" => ExportFormat::Terminal,
        _ => ExportFormat::Csv,
    };

    let rendered = export.render(fmt)?;

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            println!("Export written to {path} ({} lead(s))", export.summary.total);
        }
        None => {
            println!("{rendered}");
        }
    }

    Ok(())
}
