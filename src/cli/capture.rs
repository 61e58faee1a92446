use clap::Args;

use crate::config::SyncSettings;
use crate::db::Database;
use crate::db::models::NewLead;
use crate::error::AppError;

#[derive(Debug, Args)]
pub struct CaptureArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    /// Phone country prefix, e.g. +34
    #[arg(long, default_value = "+34")]
    pub prefix: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub age: Option<String>,
    /// ISO 3166-1 alpha-2 country code
    #[arg(long, default_value = "ES")]
    pub country: String,
    /// Province (home-country leads)
    #[arg(long)]
    pub province: Option<String>,
    /// Free-text region (other countries)
    #[arg(long)]
    pub region: Option<String>,
    /// Program display name, matched against the catalog at sync time
    #[arg(long)]
    pub program: String,
    #[arg(long)]
    pub study_level: Option<String>,
    /// Accept the configured privacy text
    #[arg(long)]
    pub consent: bool,
}

pub fn capture(db: &Database, settings: &SyncSettings, args: &CaptureArgs) -> anyhow::Result<()> {
    let lead = validate(args, settings)?;
    let id = db.insert_lead(&lead)?;
    let pending = db.list_pending()?.len();
    println!("Lead #{id} saved locally ({pending} pending).");
    Ok(())
}

/// Rejects malformed submissions before any record is created. The stored
/// consent text is the configured legal text, frozen with the record.
fn validate(args: &CaptureArgs, settings: &SyncSettings) -> Result<NewLead, AppError> {
    let first_name = args.first_name.trim();
    let last_name = args.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::Validation("first and last name are required".into()));
    }

    let email = args.email.trim();
    if !email.contains('@') {
        return Err(AppError::Validation(format!(
            "'{email}' does not look like an email address"
        )));
    }

    let digits = args.phone.chars().filter(|c| c.is_ascii_digit()).count();
    if digits < 9 {
        return Err(AppError::Validation(
            "phone looks incomplete (minimum 9 digits)".into(),
        ));
    }

    if args.program.trim().is_empty() {
        return Err(AppError::Validation("a program must be selected".into()));
    }

    if !args.consent {
        return Err(AppError::Validation(
            "the privacy text must be accepted (--consent)".into(),
        ));
    }

    let country = args.country.trim().to_uppercase();
    let province = args.province.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let region = args.region.as_deref().map(str::trim).filter(|r| !r.is_empty());

    if country == settings.home_country && province.is_none() {
        return Err(AppError::Validation(format!(
            "a province is required for {} leads",
            settings.home_country
        )));
    }
    if country != settings.home_country && region.is_none() {
        return Err(AppError::Validation(
            "a region is required for leads outside the home country".into(),
        ));
    }

    Ok(NewLead {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone_prefix: args.prefix.trim().to_string(),
        phone: args.phone.trim().to_string(),
        age: args.age.as_deref().map(str::trim).filter(|a| !a.is_empty()).map(String::from),
        country,
        province: province.map(String::from),
        region: region.map(String::from),
        program: args.program.trim().to_string(),
        study_level: args.study_level.clone(),
        consent_given: true,
        consent_text: settings.consent_text.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SyncSettings {
        let db = Database::open_in_memory().unwrap();
        SyncSettings::load(&db).unwrap()
    }

    fn args() -> CaptureArgs {
        CaptureArgs {
            first_name: "Lucía".into(),
            last_name: "Gómez".into(),
            email: "lucia@example.com".into(),
            prefix: "+34".into(),
            phone: "600123456".into(),
            age: Some("21".into()),
            country: "es".into(),
            province: Some("Madrid".into()),
            region: None,
            program: "Grado en Odontología".into(),
            study_level: None,
            consent: true,
        }
    }

    #[test]
    fn test_valid_submission() {
        let lead = validate(&args(), &settings()).unwrap();
        assert_eq!(lead.country, "ES");
        assert!(lead.consent_given);
        assert!(!lead.consent_text.is_empty());
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut a = args();
        a.phone = "60012".into();
        assert!(matches!(
            validate(&a, &settings()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut a = args();
        a.email = "not-an-email".into();
        assert!(matches!(
            validate(&a, &settings()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_consent_required() {
        let mut a = args();
        a.consent = false;
        assert!(matches!(
            validate(&a, &settings()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_home_country_needs_province() {
        let mut a = args();
        a.province = None;
        assert!(matches!(
            validate(&a, &settings()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_foreign_lead_needs_region() {
        let mut a = args();
        a.country = "FR".into();
        a.province = None;
        a.region = None;
        assert!(validate(&a, &settings()).is_err());

        a.region = Some("Occitanie".into());
        let lead = validate(&a, &settings()).unwrap();
        assert_eq!(lead.region.as_deref(), Some("Occitanie"));
    }

    #[test]
    fn test_rejected_submission_creates_no_record() {
        let db = Database::open_in_memory().unwrap();
        let settings = SyncSettings::load(&db).unwrap();
        let mut a = args();
        a.phone = "1".into();
        assert!(capture(&db, &settings, &a).is_err());
        assert_eq!(db.count_leads().unwrap(), 0);
    }
}
