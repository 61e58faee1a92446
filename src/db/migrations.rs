use rusqlite::Connection;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema. AUTOINCREMENT keeps lead ids unique
    // forever: an id is never reused after a purge.
    "CREATE TABLE IF NOT EXISTS leads (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        email TEXT NOT NULL,
        phone_prefix TEXT NOT NULL,
        phone TEXT NOT NULL,
        age TEXT,
        country TEXT NOT NULL,
        province TEXT,
        region TEXT,
        program TEXT NOT NULL,
        study_level TEXT,
        consent_given INTEGER NOT NULL DEFAULT 0,
        consent_text TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
        synced INTEGER NOT NULL DEFAULT 0,
        remote_id TEXT,
        last_request TEXT,
        last_response TEXT
    );

    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS programs (
        name TEXT PRIMARY KEY,
        product_id TEXT NOT NULL,
        dedication_id TEXT NOT NULL
    );",
    // Migration 2: Seed the default program catalog.
    "INSERT OR IGNORE INTO programs (name, product_id, dedication_id)
     VALUES ('Grado en Odontología', '9203', '1');",
];

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS _migrations (version INTEGER PRIMARY KEY)")?;

    let current_version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )?;

    for (i, sql) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i64;
        if version > current_version {
            conn.execute_batch(sql)?;
            conn.execute("INSERT INTO _migrations (version) VALUES (?1)", [version])?;
            tracing::info!("Applied migration {version}");
        }
    }

    Ok(())
}
