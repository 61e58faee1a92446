use comfy_table::{Cell, Table};

use crate::db::Database;
use crate::db::models::SyncState;

pub fn list(db: &Database) -> anyhow::Result<()> {
    let leads = db.list_leads()?;

    if leads.is_empty() {
        println!("No leads captured yet. Run `lead-courier capture` first.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Email", "Program", "Captured", "State", "Remote ID",
    ]);

    for lead in &leads {
        let state = match lead.state() {
            SyncState::Synced => "synced",
            SyncState::Pending => "pending",
        };
        table.add_row(vec![
            Cell::new(lead.id),
            Cell::new(format!("{} {}", lead.first_name, lead.last_name)),
            Cell::new(&lead.email),
            Cell::new(&lead.program),
            Cell::new(&lead.created_at),
            Cell::new(state),
            Cell::new(lead.remote_id.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");

    let synced = leads.iter().filter(|l| l.synced).count();
    println!("\n{} lead(s), {} synced, {} pending", leads.len(), synced, leads.len() - synced);
    Ok(())
}
