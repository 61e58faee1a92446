use chrono::Utc;

use crate::db::Database;
use crate::sync::ratelimit::{RateLimitWindow, WINDOW_CAP};

pub fn status(db: &Database) -> anyhow::Result<()> {
    let total = db.count_leads()?;
    let synced = db.count_synced()?;

    println!("Leads captured:  {total}");
    println!("  Synced:        {synced}");
    println!("  Pending:       {}", total - synced);

    let now = Utc::now();
    match RateLimitWindow::load(db)? {
        Some(window) if !window.is_expired(now) => {
            println!(
                "Rate window:     {}/{WINDOW_CAP} used, resets in {} minute(s)",
                window.count,
                window.minutes_until_reset(now)
            );
        }
        _ => {
            println!("Rate window:     idle, full allowance of {WINDOW_CAP} available");
        }
    }

    Ok(())
}
