use rusqlite::Connection;
use std::path::{Path, PathBuf};

pub const DB_FILE_NAME: &str = "kampus.sqlite3";

pub fn db_path(workspace: &Path) -> PathBuf {
    workspace.join(DB_FILE_NAME)
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let conn = Connection::open(db_path(workspace))?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS posts(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            content TEXT NOT NULL,
            excerpt TEXT,
            image TEXT NOT NULL,
            author TEXT NOT NULL,
            category TEXT NOT NULL,
            is_featured INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_posts_created ON posts(created_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS agendas(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            date TEXT NOT NULL,
            time TEXT,
            location TEXT,
            thumbnail TEXT,
            description TEXT,
            category TEXT NOT NULL DEFAULT 'Agenda'
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS leaders(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            title TEXT,
            title_en TEXT,
            slug TEXT NOT NULL UNIQUE,
            image TEXT,
            category TEXT,
            email TEXT,
            scholar TEXT,
            vision TEXT,
            vision_en TEXT,
            education TEXT NOT NULL DEFAULT '[]',
            education_en TEXT NOT NULL DEFAULT '[]',
            career TEXT NOT NULL DEFAULT '[]',
            career_en TEXT NOT NULL DEFAULT '[]',
            research TEXT NOT NULL DEFAULT '[]',
            research_en TEXT NOT NULL DEFAULT '[]'
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS staff_categories(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_en TEXT,
            slug TEXT NOT NULL UNIQUE,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS staff(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT,
            role_en TEXT,
            nidn TEXT,
            image TEXT,
            scholar_url TEXT,
            category_id TEXT NOT NULL,
            sort_order INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(category_id) REFERENCES staff_categories(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_staff_category ON staff(category_id, sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS faculties(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_en TEXT,
            slug TEXT NOT NULL UNIQUE,
            key TEXT,
            icon TEXT,
            dean_name TEXT,
            dean_title TEXT,
            dean_message TEXT,
            dean_message_en TEXT,
            dean_image TEXT,
            dean_id TEXT,
            vision TEXT,
            vision_en TEXT,
            missions TEXT NOT NULL DEFAULT '[]',
            missions_en TEXT NOT NULL DEFAULT '[]',
            hero_image TEXT,
            FOREIGN KEY(dean_id) REFERENCES staff(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS faculty_programs(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            name_en TEXT,
            slug TEXT NOT NULL UNIQUE,
            key TEXT,
            level TEXT,
            accreditation TEXT,
            faculty_id TEXT NOT NULL,
            description TEXT,
            description_en TEXT,
            advantages TEXT NOT NULL DEFAULT '[]',
            advantages_en TEXT NOT NULL DEFAULT '[]',
            career_prospects TEXT NOT NULL DEFAULT '[]',
            career_prospects_en TEXT NOT NULL DEFAULT '[]',
            curriculum_pdf TEXT,
            FOREIGN KEY(faculty_id) REFERENCES faculties(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_faculty_programs_faculty ON faculty_programs(faculty_id)",
        [],
    )?;

    create_auxiliary_tables(&conn)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS knowledge_entries(
            id TEXT PRIMARY KEY,
            topics TEXT NOT NULL,
            keywords TEXT NOT NULL,
            answer TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;
    // The suggestion chip flag came after the first chatbot release.
    ensure_knowledge_is_suggested(&conn)?;

    Ok(conn)
}

fn create_auxiliary_tables(conn: &Connection) -> anyhow::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lpm_documents(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            category TEXT,
            file_url TEXT,
            year INTEGER,
            created_at TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS publications(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            authors TEXT,
            journal TEXT,
            year INTEGER,
            url TEXT,
            category TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS research_projects(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            lead_researcher TEXT,
            year INTEGER,
            funding TEXT,
            status TEXT,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pkm_projects(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            lead TEXT,
            year INTEGER,
            location TEXT,
            partner TEXT,
            description TEXT
        )",
        [],
    )?;
    for table in ["research_configs", "pkm_configs", "laboratory_configs"] {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {}(
                    id TEXT PRIMARY KEY,
                    title TEXT,
                    title_en TEXT,
                    description TEXT,
                    description_en TEXT,
                    hero_image TEXT
                )",
                table
            ),
            [],
        )?;
    }
    conn.execute(
        "CREATE TABLE IF NOT EXISTS laboratories(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            slug TEXT,
            description TEXT,
            image TEXT,
            head TEXT,
            facilities TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lppm_profiles(
            id TEXT PRIMARY KEY,
            vision TEXT,
            mission TEXT,
            history TEXT,
            structure_image TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS lppm_staff(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT,
            image TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS pkm_programs(
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            icon TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;
    Ok(())
}

fn ensure_knowledge_is_suggested(conn: &Connection) -> anyhow::Result<()> {
    if table_has_column(conn, "knowledge_entries", "is_suggested")? {
        return Ok(());
    }
    conn.execute(
        "ALTER TABLE knowledge_entries ADD COLUMN is_suggested INTEGER NOT NULL DEFAULT 0",
        [],
    )?;
    Ok(())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    Ok(table_columns(conn, table)?.iter().any(|c| c == column))
}

pub fn table_columns(conn: &Connection, table: &str) -> anyhow::Result<Vec<String>> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        out.push(name);
    }
    Ok(out)
}
