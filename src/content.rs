use crate::records::parse_json_list;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub image: String,
    pub author: String,
    pub category: String,
    pub is_featured: bool,
    pub created_at: String,
}

pub fn posts(conn: &Connection, category: Option<&str>) -> rusqlite::Result<Vec<PostView>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, slug, content, excerpt, image, author, category, is_featured, created_at
         FROM posts
         WHERE ?1 IS NULL OR category = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let rows = stmt
        .query_map([category], |row| {
            Ok(PostView {
                id: row.get(0)?,
                title: row.get(1)?,
                slug: row.get(2)?,
                content: row.get(3)?,
                excerpt: row.get(4)?,
                image: row.get(5)?,
                author: row.get(6)?,
                category: row.get(7)?,
                is_featured: row.get::<_, i64>(8)? != 0,
                created_at: row.get(9)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgendaView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: String,
    pub time: Option<String>,
    pub location: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub category: String,
}

pub fn agendas(conn: &Connection) -> rusqlite::Result<Vec<AgendaView>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, slug, date, time, location, thumbnail, description, category
         FROM agendas
         ORDER BY date, rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AgendaView {
                id: row.get(0)?,
                title: row.get(1)?,
                slug: row.get(2)?,
                date: row.get(3)?,
                time: row.get(4)?,
                location: row.get(5)?,
                thumbnail: row.get(6)?,
                description: row.get(7)?,
                category: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderView {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub slug: String,
    pub image: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub scholar: Option<String>,
    pub vision: Option<String>,
    pub vision_en: Option<String>,
    pub education: Vec<String>,
    pub education_en: Vec<String>,
    pub career: Vec<String>,
    pub career_en: Vec<String>,
    pub research: Vec<String>,
    pub research_en: Vec<String>,
}

pub fn leaders(conn: &Connection) -> rusqlite::Result<Vec<LeaderView>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, title, title_en, slug, image, category, email, scholar, vision,
                vision_en, education, education_en, career, career_en, research, research_en
         FROM leaders
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let list = |idx: usize| -> rusqlite::Result<Vec<String>> {
                let raw: Option<String> = row.get(idx)?;
                Ok(parse_json_list(raw.as_deref()))
            };
            Ok(LeaderView {
                id: row.get(0)?,
                name: row.get(1)?,
                title: row.get(2)?,
                title_en: row.get(3)?,
                slug: row.get(4)?,
                image: row.get(5)?,
                category: row.get(6)?,
                email: row.get(7)?,
                scholar: row.get(8)?,
                vision: row.get(9)?,
                vision_en: row.get(10)?,
                education: list(11)?,
                education_en: list(12)?,
                career: list(13)?,
                career_en: list(14)?,
                research: list(15)?,
                research_en: list(16)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramView {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub level: Option<String>,
    pub accreditation: Option<String>,
    pub advantages: Vec<String>,
    pub career_prospects: Vec<String>,
    pub curriculum_pdf: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyView {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub key: Option<String>,
    pub dean_name: Option<String>,
    pub dean_id: Option<String>,
    pub vision: Option<String>,
    pub missions: Vec<String>,
    pub missions_en: Vec<String>,
    pub programs: Vec<ProgramView>,
}

pub fn faculties(conn: &Connection) -> rusqlite::Result<Vec<FacultyView>> {
    let mut prog_stmt = conn.prepare(
        "SELECT faculty_id, id, name, name_en, slug, level, accreditation, advantages,
                career_prospects, curriculum_pdf
         FROM faculty_programs
         ORDER BY rowid",
    )?;
    let mut by_faculty: HashMap<String, Vec<ProgramView>> = HashMap::new();
    let programs = prog_stmt
        .query_map([], |row| {
            let faculty_id: String = row.get(0)?;
            let advantages: Option<String> = row.get(7)?;
            let career: Option<String> = row.get(8)?;
            Ok((
                faculty_id,
                ProgramView {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    name_en: row.get(3)?,
                    slug: row.get(4)?,
                    level: row.get(5)?,
                    accreditation: row.get(6)?,
                    advantages: parse_json_list(advantages.as_deref()),
                    career_prospects: parse_json_list(career.as_deref()),
                    curriculum_pdf: row.get(9)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (faculty_id, p) in programs {
        by_faculty.entry(faculty_id).or_default().push(p);
    }

    let mut stmt = conn.prepare(
        "SELECT id, name, name_en, slug, key, dean_name, dean_id, vision, missions, missions_en
         FROM faculties
         ORDER BY rowid",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let missions: Option<String> = row.get(8)?;
            let missions_en: Option<String> = row.get(9)?;
            Ok(FacultyView {
                id: row.get(0)?,
                name: row.get(1)?,
                name_en: row.get(2)?,
                slug: row.get(3)?,
                key: row.get(4)?,
                dean_name: row.get(5)?,
                dean_id: row.get(6)?,
                vision: row.get(7)?,
                missions: parse_json_list(missions.as_deref()),
                missions_en: parse_json_list(missions_en.as_deref()),
                programs: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .map(|mut f| {
            f.programs = by_faculty.remove(&f.id).unwrap_or_default();
            f
        })
        .collect())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffView {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub role_en: Option<String>,
    pub nidn: Option<String>,
    pub image: Option<String>,
    pub scholar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffGroupView {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub staff: Vec<StaffView>,
}

pub fn staff_by_category(conn: &Connection) -> rusqlite::Result<Vec<StaffGroupView>> {
    let mut cat_stmt = conn.prepare(
        "SELECT id, name, name_en, slug FROM staff_categories ORDER BY sort_order, rowid",
    )?;
    let mut groups = cat_stmt
        .query_map([], |row| {
            Ok(StaffGroupView {
                id: row.get(0)?,
                name: row.get(1)?,
                name_en: row.get(2)?,
                slug: row.get(3)?,
                staff: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT category_id, id, name, role, role_en, nidn, image, scholar_url
         FROM staff
         ORDER BY sort_order, rowid",
    )?;
    let members = stmt
        .query_map([], |row| {
            let category_id: String = row.get(0)?;
            Ok((
                category_id,
                StaffView {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    role: row.get(3)?,
                    role_en: row.get(4)?,
                    nidn: row.get(5)?,
                    image: row.get(6)?,
                    scholar_url: row.get(7)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (category_id, member) in members {
        if let Some(g) = groups.iter_mut().find(|g| g.id == category_id) {
            g.staff.push(member);
        }
    }
    Ok(groups)
}
