use crate::records::{
    NewAgenda, NewFaculty, NewLeader, NewPost, NewProgram, NewStaff, NewStaffCategory, RecordError,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableTarget {
    pub model: &'static str,
    pub table: &'static str,
}

const fn target(model: &'static str, table: &'static str) -> TableTarget {
    TableTarget { model, table }
}

pub const TABLES: &[TableTarget] = &[
    target("Post", "posts"),
    target("Agenda", "agendas"),
    target("Leader", "leaders"),
    target("Faculty", "faculties"),
    target("FacultyProgram", "faculty_programs"),
    target("StaffCategory", "staff_categories"),
    target("Staff", "staff"),
    target("LpmDocument", "lpm_documents"),
    target("Publication", "publications"),
    target("ResearchProject", "research_projects"),
    target("PkmProject", "pkm_projects"),
    target("ResearchConfig", "research_configs"),
    target("PkmConfig", "pkm_configs"),
    target("Laboratory", "laboratories"),
    target("LaboratoryConfig", "laboratory_configs"),
    target("LppmProfile", "lppm_profiles"),
    target("LppmStaff", "lppm_staff"),
    target("PkmProgram", "pkm_programs"),
];

pub fn table_for(model: &str) -> Option<&'static TableTarget> {
    TABLES.iter().find(|t| t.model == model)
}

pub fn delete_all(conn: &Connection, target: &TableTarget) -> rusqlite::Result<usize> {
    conn.execute(&format!("DELETE FROM {}", target.table), [])
}

pub fn count_rows(conn: &Connection, target: &TableTarget) -> rusqlite::Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", target.table), [], |r| {
        r.get(0)
    })
}

pub fn insert_post(conn: &Connection, p: &NewPost) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO posts(id, title, slug, content, excerpt, image, author, category, is_featured, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &p.id,
            &p.title,
            &p.slug,
            &p.content,
            &p.excerpt,
            &p.image,
            &p.author,
            &p.category,
            if p.is_featured { 1 } else { 0 },
            &p.created_at,
        ),
    )?;
    Ok(())
}

pub fn insert_agenda(conn: &Connection, a: &NewAgenda) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO agendas(id, title, slug, date, time, location, thumbnail, description, category)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &a.id,
            &a.title,
            &a.slug,
            a.date.format("%Y-%m-%d").to_string(),
            &a.time,
            &a.location,
            &a.thumbnail,
            &a.description,
            &a.category,
        ),
    )?;
    Ok(())
}

pub fn insert_leader(conn: &Connection, l: &NewLeader) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO leaders(id, name, title, title_en, slug, image, category, email, scholar,
                             vision, vision_en, education, education_en, career, career_en,
                             research, research_en)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            &l.id,
            &l.name,
            &l.title,
            &l.title_en,
            &l.slug,
            &l.image,
            &l.category,
            &l.email,
            &l.scholar,
            &l.vision,
            &l.vision_en,
            &l.education,
            &l.education_en,
            &l.career,
            &l.career_en,
            &l.research,
            &l.research_en,
        ],
    )?;
    Ok(())
}

pub fn insert_faculty(conn: &Connection, f: &NewFaculty) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO faculties(id, name, name_en, slug, key, icon, dean_name, dean_title,
                               dean_message, dean_message_en, dean_image, dean_id, vision,
                               vision_en, missions, missions_en, hero_image)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            &f.id,
            &f.name,
            &f.name_en,
            &f.slug,
            &f.key,
            &f.icon,
            &f.dean_name,
            &f.dean_title,
            &f.dean_message,
            &f.dean_message_en,
            &f.dean_image,
            &f.dean_id,
            &f.vision,
            &f.vision_en,
            &f.missions,
            &f.missions_en,
            &f.hero_image,
        ],
    )?;
    Ok(())
}

pub fn insert_program(conn: &Connection, p: &NewProgram) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO faculty_programs(id, name, name_en, slug, key, level, accreditation,
                                      faculty_id, description, description_en, advantages,
                                      advantages_en, career_prospects, career_prospects_en,
                                      curriculum_pdf)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        rusqlite::params![
            &p.id,
            &p.name,
            &p.name_en,
            &p.slug,
            &p.key,
            &p.level,
            &p.accreditation,
            &p.faculty_id,
            &p.description,
            &p.description_en,
            &p.advantages,
            &p.advantages_en,
            &p.career_prospects,
            &p.career_prospects_en,
            &p.curriculum_pdf,
        ],
    )?;
    Ok(())
}

pub fn insert_staff_category(conn: &Connection, c: &NewStaffCategory) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO staff_categories(id, name, name_en, slug, sort_order) VALUES(?, ?, ?, ?, ?)",
        (&c.id, &c.name, &c.name_en, &c.slug, c.sort_order),
    )?;
    Ok(())
}

pub fn insert_staff(conn: &Connection, s: &NewStaff) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO staff(id, name, role, role_en, nidn, image, scholar_url, category_id, sort_order)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &s.id,
            &s.name,
            &s.role,
            &s.role_en,
            &s.nidn,
            &s.image,
            &s.scholar_url,
            &s.category_id,
            s.sort_order,
        ),
    )?;
    Ok(())
}

pub fn camel_to_snake(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn sql_value(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Integer(if *b { 1 } else { 0 }),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Integer(i),
            None => Value::Real(n.as_f64().unwrap_or(0.0)),
        },
        serde_json::Value::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// Inserts a dump record into an auxiliary table. Every field has to land in
/// a known column; `columns` comes from `db::table_columns`.
pub fn insert_auxiliary(
    conn: &Connection,
    target: &TableTarget,
    columns: &[String],
    record: &serde_json::Value,
) -> Result<(), RecordError> {
    let obj = record.as_object().ok_or(RecordError::NotAnObject)?;

    let mut names: Vec<String> = Vec::with_capacity(obj.len() + 1);
    let mut bind_values: Vec<Value> = Vec::with_capacity(obj.len() + 1);
    for (key, value) in obj {
        let column = camel_to_snake(key);
        if column == "id" && value.is_null() {
            continue;
        }
        if !columns.iter().any(|c| *c == column) {
            return Err(RecordError::UnknownColumn {
                table: target.table.to_string(),
                field: key.clone(),
            });
        }
        names.push(column);
        bind_values.push(sql_value(value));
    }
    if !names.iter().any(|n| n == "id") {
        names.push("id".to_string());
        bind_values.push(Value::Text(Uuid::new_v4().to_string()));
    }

    let placeholders = vec!["?"; names.len()].join(", ");
    let sql = format!(
        "INSERT INTO {}({}) VALUES({})",
        target.table,
        names.join(", "),
        placeholders
    );
    conn.execute(&sql, params_from_iter(bind_values))?;
    Ok(())
}
