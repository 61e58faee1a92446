use crate::config::SETTING_KEYS;
use crate::db::Database;

pub fn show(db: &Database) -> anyhow::Result<()> {
    for (key, default) in SETTING_KEYS {
        let value = db.get_setting(key)?.unwrap_or_else(|| default.to_string());
        let shown = if *key == "api_key" {
            if value.is_empty() {
                "(unset)".to_string()
            } else {
                // Write-only from the CLI: kiosk terminals are shared.
                "(set, hidden)".to_string()
            }
        } else {
            value
        };
        println!("{key:<14} {shown}");
    }
    Ok(())
}

pub fn set(db: &Database, key: &str, value: &str) -> anyhow::Result<()> {
    if !SETTING_KEYS.iter().any(|(k, _)| *k == key) {
        let known: Vec<&str> = SETTING_KEYS.iter().map(|(k, _)| *k).collect();
        anyhow::bail!("Unknown setting '{}'. Known settings: {}", key, known.join(", "));
    }

    db.set_setting(key, value.trim())?;
    println!("Saved {key}.");
    Ok(())
}
