use crate::db::Database;
use crate::db::models::SyncState;
use crate::error::AppError;

/// Prints one lead with its delivery diagnostics, the operator's view for
/// troubleshooting a stuck or misdelivered record.
pub fn show(db: &Database, id: i64) -> anyhow::Result<()> {
    let lead = db.get_lead(id)?.ok_or(AppError::LeadNotFound(id))?;

    println!("ID:          {}", lead.id);
    println!("Name:        {} {}", lead.first_name, lead.last_name);
    println!("Email:       {}", lead.email);
    println!("Phone:       {} {}", lead.phone_prefix, lead.phone);
    println!("Country:     {}", lead.country);
    if let Some(province) = &lead.province {
        println!("Province:    {province}");
    }
    if let Some(region) = &lead.region {
        println!("Region:      {region}");
    }
    println!("Program:     {}", lead.program);
    if let Some(level) = &lead.study_level {
        println!("Study level: {level}");
    }
    println!("Captured:    {}", lead.created_at);
    println!(
        "Consent:     {}",
        if lead.consent_given { "accepted" } else { "not given" }
    );
    match lead.state() {
        SyncState::Synced => println!(
            "State:       synced (remote id {})",
            lead.remote_id.as_deref().unwrap_or("-")
        ),
        SyncState::Pending => println!("State:       pending"),
    }

    if let Some(request) = &lead.last_request {
        println!("\n--- Last request payload ---");
        println!("{}", pretty(request));
    }
    if let Some(response) = &lead.last_response {
        println!("\n--- Last API response ---");
        println!("{}", pretty(response));
    }

    Ok(())
}

/// Reformats stored JSON for the terminal; non-JSON bodies print verbatim.
fn pretty(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_falls_back_to_raw() {
        assert_eq!(pretty("not json"), "not json");
        assert_eq!(pretty(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_unknown_lead_errors() {
        let db = Database::open_in_memory().unwrap();
        assert!(show(&db, 7).is_err());
    }
}
