use std::collections::HashMap;

use rusqlite::params;

use super::Database;
use super::models::{LeadRecord, NewLead, Program};
use crate::error::AppError;

const LEAD_COLUMNS: &str = "id, first_name, last_name, email, phone_prefix, phone, age, country, \
     province, region, program, study_level, consent_given, consent_text, created_at, synced, \
     remote_id, last_request, last_response";

impl Database {
    // --- Leads ---

    pub fn insert_lead(&self, lead: &NewLead) -> Result<i64, AppError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO leads (first_name, last_name, email, phone_prefix, phone, age, country, \
             province, region, program, study_level, consent_given, consent_text, created_at, synced)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0)",
            params![
                lead.first_name,
                lead.last_name,
                lead.email,
                lead.phone_prefix,
                lead.phone,
                lead.age,
                lead.country,
                lead.province,
                lead.region,
                lead.program,
                lead.study_level,
                lead.consent_given,
                lead.consent_text,
                lead.created_at,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_lead(&self, id: i64) -> Result<Option<LeadRecord>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1"))?;
        let mut rows = stmt.query_map(params![id], Self::map_lead_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// All leads, most recent first, for display and export.
    pub fn list_leads(&self) -> Result<Vec<LeadRecord>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], Self::map_lead_row)?;
        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// Unsent leads, earliest-queued first, so a truncated batch always
    /// drains the oldest part of the backlog.
    pub fn list_pending(&self) -> Result<Vec<LeadRecord>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE synced = 0 ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], Self::map_lead_row)?;
        let mut leads = Vec::new();
        for row in rows {
            leads.push(row?);
        }
        Ok(leads)
    }

    /// Records the confirmed delivery of a lead. Only the sync columns are
    /// touched. Calling it again for an already-synced lead refreshes the
    /// diagnostic columns and leaves state and remote id unchanged.
    pub fn mark_synced(
        &self,
        id: i64,
        remote_id: &str,
        request_json: &str,
        response_json: &str,
    ) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        let already_synced: bool = {
            let mut stmt = conn.prepare("SELECT synced FROM leads WHERE id = ?1")?;
            let mut rows = stmt.query_map(params![id], |row| row.get(0))?;
            match rows.next() {
                Some(row) => row?,
                None => return Err(AppError::LeadNotFound(id)),
            }
        };

        if already_synced {
            conn.execute(
                "UPDATE leads SET last_request = ?2, last_response = ?3 WHERE id = ?1",
                params![id, request_json, response_json],
            )?;
        } else {
            conn.execute(
                "UPDATE leads SET synced = 1, remote_id = ?2, last_request = ?3, last_response = ?4
                 WHERE id = ?1",
                params![id, remote_id, request_json, response_json],
            )?;
        }
        Ok(())
    }

    pub fn count_leads(&self) -> Result<i64, AppError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?)
    }

    pub fn count_synced(&self) -> Result<i64, AppError> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row("SELECT COUNT(*) FROM leads WHERE synced = 1", [], |row| {
            row.get(0)
        })?)
    }

    /// Destructive. Callers must have confirmed out of band; lead ids are
    /// never reused afterwards.
    pub fn clear_leads(&self) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM leads", [])?;
        Ok(())
    }

    fn map_lead_row(row: &rusqlite::Row) -> rusqlite::Result<LeadRecord> {
        Ok(LeadRecord {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            email: row.get(3)?,
            phone_prefix: row.get(4)?,
            phone: row.get(5)?,
            age: row.get(6)?,
            country: row.get(7)?,
            province: row.get(8)?,
            region: row.get(9)?,
            program: row.get(10)?,
            study_level: row.get(11)?,
            consent_given: row.get(12)?,
            consent_text: row.get(13)?,
            created_at: row.get(14)?,
            synced: row.get(15)?,
            remote_id: row.get(16)?,
            last_request: row.get(17)?,
            last_response: row.get(18)?,
        })
    }

    // --- Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get(0))?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    // --- Program catalog ---

    pub fn upsert_program(
        &self,
        name: &str,
        product_id: &str,
        dedication_id: &str,
    ) -> Result<(), AppError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO programs (name, product_id, dedication_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                product_id = excluded.product_id,
                dedication_id = excluded.dedication_id",
            params![name, product_id, dedication_id],
        )?;
        Ok(())
    }

    pub fn remove_program(&self, name: &str) -> Result<bool, AppError> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM programs WHERE name = ?1", params![name])?;
        Ok(removed > 0)
    }

    pub fn list_programs(&self) -> Result<Vec<Program>, AppError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT name, product_id, dedication_id FROM programs ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Program {
                name: row.get(0)?,
                product_id: row.get(1)?,
                dedication_id: row.get(2)?,
            })
        })?;
        let mut programs = Vec::new();
        for row in rows {
            programs.push(row?);
        }
        Ok(programs)
    }

    pub fn program_catalog(&self) -> Result<HashMap<String, Program>, AppError> {
        Ok(self
            .list_programs()?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect())
    }
}
