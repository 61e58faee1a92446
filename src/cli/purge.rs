use crate::db::Database;

/// Wipes every captured lead. Ids are never reused, so a purge cannot make
/// a future record collide with an exported one.
pub fn purge(db: &Database, force: bool) -> anyhow::Result<()> {
    let total = db.count_leads()?;

    if total == 0 {
        println!("Nothing to purge.");
        return Ok(());
    }

    if !force {
        anyhow::bail!(
            "This would delete {total} lead(s) permanently. Re-run with --force to confirm."
        );
    }

    db.clear_leads()?;
    println!("Deleted {total} lead(s).");
    Ok(())
}
