use crate::config::SyncSettings;
use crate::db::Database;
use crate::error::AppError;
use crate::sync::{AttemptOutcome, RunReport, SyncEngine};

pub async fn sync(
    db: &Database,
    engine: &SyncEngine,
    settings: &SyncSettings,
    mass: bool,
) -> anyhow::Result<()> {
    let pending = db.list_pending()?.len();
    if pending == 0 {
        println!("No pending leads.");
        return Ok(());
    }

    if mass {
        println!("Mass run: rate cap bypassed.");
    }
    println!("Syncing {pending} pending lead(s)...");

    match engine.run(db, settings, mass).await {
        Ok(report) => print_report(&report),
        Err(AppError::RateLimited { minutes_remaining }) => {
            println!(
                "Rate limit reached: nothing sent. Try again in {minutes_remaining} minute(s), \
                 or use --mass if this batch cannot wait."
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    for trail in &report.trails {
        println!("Lead #{}", trail.lead_id);
        for attempt in &trail.attempts {
            let outcome = match &attempt.outcome {
                AttemptOutcome::Status(status) => format!("HTTP {status}"),
                AttemptOutcome::Transport(e) => format!("network error: {e}"),
            };
            println!("  {:<12} {} ({} ms)", attempt.route, outcome, attempt.elapsed_ms);
        }
        match &trail.remote_id {
            Some(id) => println!("  -> synced (remote id {id})"),
            None => println!("  -> still pending"),
        }
    }

    let deferred = if report.deferred > 0 {
        format!(", {} deferred to the next window", report.deferred)
    } else {
        String::new()
    };
    println!(
        "\nSync finished: {} sent, {} failed{deferred}",
        report.sent, report.failed
    );
}
