use std::collections::HashMap;

use serde::Serialize;

use crate::config::SyncSettings;
use crate::db::models::{LeadRecord, Program};

/// Fallback ISO code for unmapped home-country provinces.
const DEFAULT_PROVINCE_ISO: &str = "ES-M";

/// Fallback study-level code for unmapped values.
const DEFAULT_STUDY_LEVEL: &str = "ES-6";

/// Province display name -> ISO 3166-2 code. Applied only when the lead's
/// country matches the configured home country.
const PROVINCE_ISO: &[(&str, &str)] = &[
    ("Álava", "ES-VI"),
    ("Albacete", "ES-AB"),
    ("Alicante", "ES-A"),
    ("Almería", "ES-AL"),
    ("Asturias", "ES-O"),
    ("Ávila", "ES-AV"),
    ("Badajoz", "ES-BA"),
    ("Baleares", "ES-PM"),
    ("Palma", "ES-PM"),
    ("Barcelona", "ES-B"),
    ("Burgos", "ES-BU"),
    ("Cáceres", "ES-CC"),
    ("Cádiz", "ES-CA"),
    ("Cantabria", "ES-S"),
    ("Castellón", "ES-CS"),
    ("Ciudad Real", "ES-CR"),
    ("Córdoba", "ES-CO"),
    ("Coruña", "ES-C"),
    ("Cuenca", "ES-CU"),
    ("Gipuzkoa", "ES-SS"),
    ("Girona", "ES-GI"),
    ("Granada", "ES-GR"),
    ("Guadalajara", "ES-GU"),
    ("Huelva", "ES-H"),
    ("Huesca", "ES-HU"),
    ("Jaén", "ES-J"),
    ("León", "ES-LE"),
    ("Lleida", "ES-L"),
    ("Lugo", "ES-LU"),
    ("Madrid", "ES-M"),
    ("Málaga", "ES-MA"),
    ("Murcia", "ES-MU"),
    ("Navarra", "ES-NA"),
    ("Ourense", "ES-OR"),
    ("Palencia", "ES-P"),
    ("Las Palmas", "ES-GC"),
    ("Pontevedra", "ES-PO"),
    ("La Rioja", "ES-LO"),
    ("Salamanca", "ES-SA"),
    ("Segovia", "ES-SG"),
    ("Sevilla", "ES-SE"),
    ("Soria", "ES-SO"),
    ("Tarragona", "ES-T"),
    ("Santa Cruz de Tenerife", "ES-TF"),
    ("Teruel", "ES-TE"),
    ("Toledo", "ES-TO"),
    ("Valencia", "ES-V"),
    ("Valladolid", "ES-VA"),
    ("Bizkaia", "ES-BI"),
    ("Bilbao", "ES-BI"),
    ("Zamora", "ES-ZA"),
    ("Zaragoza", "ES-Z"),
    ("Ceuta", "ES-CE"),
    ("Melilla", "ES-ML"),
];

const STUDY_LEVELS: &[(&str, &str)] = &[
    ("Bachillerato", "ES-4"),
    ("FP", "FM-1"),
    ("Grado", "ES-6"),
    ("Master", "MA-1"),
];

/// Request body of the CRM ingestion API. Every field is a string; the API
/// tolerates degraded values but not missing ones.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiPayload {
    pub process_brand: String,
    pub process_type: String,
    pub process_origin: String,
    #[serde(rename = "process_campaignCode")]
    pub process_campaign_code: String,
    pub lead_name: String,
    pub lead_surname: String,
    pub lead_email: String,
    #[serde(rename = "lead_phoneNumber")]
    pub lead_phone_number: String,
    #[serde(rename = "lead_countryISO")]
    pub lead_country_iso: String,
    pub lead_province: String,
    #[serde(rename = "lead_provinceISO")]
    pub lead_province_iso: String,
    pub lead_age: String,
    pub lead_sex: String,
    pub study_level: String,
    #[serde(rename = "program_idProduct")]
    pub program_id_product: String,
    #[serde(rename = "program_idDedication")]
    pub program_id_dedication: String,
    #[serde(rename = "program_idCampus")]
    pub program_id_campus: String,
    #[serde(rename = "program_idImpartation")]
    pub program_id_impartation: String,
    #[serde(rename = "program_idTiming")]
    pub program_id_timing: String,
    #[serde(rename = "rgpd_acceptThirdParties")]
    pub rgpd_accept_third_parties: String,
    #[serde(rename = "rgpd_acceptGroup")]
    pub rgpd_accept_group: String,
    #[serde(rename = "rgpd_acceptContact")]
    pub rgpd_accept_contact: String,
    #[serde(rename = "process_requestDate")]
    pub process_request_date: String,
    #[serde(rename = "lead_postCode", skip_serializing_if = "Option::is_none")]
    pub lead_post_code: Option<String>,
}

/// Maps a stored lead to the CRM field schema. Pure: identical inputs
/// always yield an identical payload. Partial records never fail here,
/// they degrade to documented defaults.
pub fn map_lead(
    lead: &LeadRecord,
    settings: &SyncSettings,
    catalog: &HashMap<String, Program>,
) -> ApiPayload {
    let (product_id, dedication_id) = match catalog.get(&lead.program) {
        Some(p) => (p.product_id.clone(), p.dedication_id.clone()),
        None => ("0".to_string(), "1".to_string()),
    };

    let is_home = lead.country == settings.home_country;

    let province_iso = match (&lead.province, is_home) {
        (Some(province), true) => PROVINCE_ISO
            .iter()
            .find(|(name, _)| name == province)
            .map(|(_, iso)| (*iso).to_string())
            .unwrap_or_else(|| DEFAULT_PROVINCE_ISO.to_string()),
        _ => String::new(),
    };

    let study_level = lead
        .study_level
        .as_deref()
        .and_then(|level| {
            STUDY_LEVELS
                .iter()
                .find(|(name, _)| *name == level)
                .map(|(_, code)| (*code).to_string())
        })
        .unwrap_or_else(|| DEFAULT_STUDY_LEVEL.to_string());

    let province = lead
        .province
        .clone()
        .or_else(|| lead.region.clone())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| "Madrid".to_string());

    let age = lead
        .age
        .clone()
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| "25".to_string());

    ApiPayload {
        process_brand: settings.brand.clone(),
        process_type: "SI".to_string(),
        process_origin: settings.origin.clone(),
        process_campaign_code: settings.campaign.clone(),
        lead_name: lead.first_name.clone(),
        lead_surname: lead.last_name.clone(),
        lead_email: lead.email.clone(),
        lead_phone_number: normalize_phone(&lead.phone_prefix, &lead.phone),
        lead_country_iso: lead.country.clone(),
        lead_province: province,
        lead_province_iso: province_iso,
        lead_age: age,
        lead_sex: settings.sex.clone(),
        study_level,
        program_id_product: product_id,
        program_id_dedication: dedication_id,
        program_id_campus: settings.campus.clone(),
        program_id_impartation: settings.impartation.clone(),
        program_id_timing: settings.timing.clone(),
        rgpd_accept_third_parties: "0".to_string(),
        rgpd_accept_group: "0".to_string(),
        rgpd_accept_contact: if lead.consent_given { "1" } else { "0" }.to_string(),
        process_request_date: request_date(&lead.created_at),
        lead_post_code: is_home.then(|| settings.postcode.clone()),
    }
}

/// Prefix loses its leading `+`, the body keeps digits only, no whitespace
/// survives anywhere.
fn normalize_phone(prefix: &str, body: &str) -> String {
    let prefix: String = prefix
        .trim()
        .trim_start_matches('+')
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let body: String = body.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{prefix}{body}")
}

/// `2026-03-14T10:30:00Z` -> `2026-03-14 10:30:00`. Falls back to a plain
/// string slice when the stored timestamp does not parse, so mapping stays
/// total.
fn request_date(created_at: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => created_at
            .chars()
            .take(19)
            .map(|c| if c == 'T' { ' ' } else { c })
            .collect(),
    }
}
