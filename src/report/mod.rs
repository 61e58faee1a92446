pub mod csv;
pub mod json;
pub mod terminal;

use serde::Serialize;

use crate::config::SyncSettings;
use crate::db::Database;
use crate::db::models::LeadRecord;
use crate::error::AppError;

pub enum ExportFormat {
    Terminal,
    Json,
    Csv,
}

/// Flat reporting row, one per captured lead, in the column layout the
/// recruiting team feeds into their spreadsheets.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub institution: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub country: String,
    pub state: String,
    pub email: String,
    pub age: String,
    pub campaign: String,
    pub program: String,
    pub campus: String,
    pub study_level: String,
    pub remote_id: String,
}

impl ExportRow {
    fn from_lead(lead: &LeadRecord, settings: &SyncSettings) -> Self {
        Self {
            institution: settings.institution.clone(),
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            phone: lead.phone.clone(),
            country: lead.country.clone(),
            state: lead
                .province
                .clone()
                .or_else(|| lead.region.clone())
                .unwrap_or_default(),
            email: lead.email.clone(),
            age: lead.age.clone().unwrap_or_default(),
            campaign: settings.campaign.clone(),
            program: lead.program.clone(),
            campus: settings.campus.clone(),
            study_level: lead.study_level.clone().unwrap_or_default(),
            remote_id: lead.remote_id.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub total: usize,
    pub synced: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
pub struct Export {
    pub generated_at: String,
    pub rows: Vec<ExportRow>,
    pub summary: ExportSummary,
}

impl Export {
    pub fn build(db: &Database, settings: &SyncSettings) -> Result<Self, AppError> {
        let leads = db.list_leads()?;
        let synced = leads.iter().filter(|l| l.synced).count();
        let summary = ExportSummary {
            total: leads.len(),
            synced,
            pending: leads.len() - synced,
        };
        let rows = leads
            .iter()
            .map(|l| ExportRow::from_lead(l, settings))
            .collect();

        Ok(Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            rows,
            summary,
        })
    }

    pub fn render(&self, format: ExportFormat) -> anyhow::Result<String> {
        match format {
            ExportFormat::Terminal => terminal::render(self),
            ExportFormat::Json => json::render(self),
            ExportFormat::Csv => csv::render(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::NewLead;

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.insert_lead(&NewLead {
            first_name: "Lucía".into(),
            last_name: "Gómez".into(),
            email: "lucia@example.com".into(),
            phone_prefix: "+34".into(),
            phone: "600123456".into(),
            age: Some("21".into()),
            country: "ES".into(),
            province: Some("Madrid".into()),
            region: None,
            program: "Grado en Odontología".into(),
            study_level: Some("Bachillerato".into()),
            consent_given: true,
            consent_text: "Acepto".into(),
            created_at: "2026-03-14T10:30:00Z".into(),
        })
        .unwrap();
        db
    }

    #[test]
    fn test_row_mapping() {
        let db = seeded_db();
        let settings = SyncSettings::load(&db).unwrap();
        let export = Export::build(&db, &settings).unwrap();

        assert_eq!(export.summary.total, 1);
        assert_eq!(export.summary.pending, 1);

        let row = &export.rows[0];
        assert_eq!(row.institution, "UNIE");
        assert_eq!(row.first_name, "Lucía");
        assert_eq!(row.phone, "600123456");
        assert_eq!(row.state, "Madrid");
        assert_eq!(row.remote_id, "");
    }

    #[test]
    fn test_synced_lead_exports_remote_id() {
        let db = seeded_db();
        db.mark_synced(1, "PL-77", "{}", "{}").unwrap();
        let settings = SyncSettings::load(&db).unwrap();
        let export = Export::build(&db, &settings).unwrap();

        assert_eq!(export.summary.synced, 1);
        assert_eq!(export.rows[0].remote_id, "PL-77");
    }
}
