use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use uuid::Uuid;

pub const DEFAULT_POST_AUTHOR: &str = "Admin";
pub const DEFAULT_POST_CATEGORY: &str = "Berita";
pub const AGENDA_CATEGORY: &str = "Agenda";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid date `{value}` (expected YYYY-MM-DD)")]
    InvalidDate { value: String },
    #[error("record does not decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("table {table} has no column for field `{field}`")]
    UnknownColumn { table: String, field: String },
    #[error("database: {0}")]
    Db(#[from] rusqlite::Error),
}

/// Dump ids show up both as strings and as integers depending on the exporter.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Int(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Int(n) => write!(f, "{}", n),
        }
    }
}

fn id_or_new(id: Option<RawId>) -> String {
    match id {
        Some(v) => v.to_string(),
        None => Uuid::new_v4().to_string(),
    }
}

fn required(v: Option<String>, field: &'static str) -> Result<String, RecordError> {
    match v {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(RecordError::MissingField(field)),
    }
}

pub fn list_to_json(list: Option<Vec<String>>) -> String {
    serde_json::to_string(&list.unwrap_or_default()).unwrap_or_else(|_| "[]".to_string())
}

/// Reads back a list column. NULL, bad JSON and non-string lists all come back empty.
pub fn parse_json_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

// ---- Post ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSource {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    pub excerpt: Option<String>,
    pub thumbnail: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub is_featured: Option<bool>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
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

impl PostSource {
    pub fn into_post(self, now: &str) -> Result<NewPost, RecordError> {
        Ok(NewPost {
            id: Uuid::new_v4().to_string(),
            slug: required(self.slug, "slug")?,
            title: required(self.title, "title")?,
            content: self.content.or(self.description).unwrap_or_default(),
            excerpt: self.excerpt,
            image: self.thumbnail.or(self.image).unwrap_or_default(),
            author: self
                .author
                .unwrap_or_else(|| DEFAULT_POST_AUTHOR.to_string()),
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_POST_CATEGORY.to_string()),
            is_featured: self.is_featured.unwrap_or(false),
            created_at: self.created_at.unwrap_or_else(|| now.to_string()),
        })
    }
}

// ---- Agenda ----

/// Compiled-in agenda entry. Dates stay as text until import so a bad literal
/// only costs its own row.
#[derive(Debug, Clone, Copy)]
pub struct AgendaSeed {
    pub title: &'static str,
    pub slug: &'static str,
    pub date: &'static str,
    pub time: &'static str,
    pub location: &'static str,
    pub thumbnail: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAgenda {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub thumbnail: String,
    pub description: String,
    pub category: String,
}

pub fn parse_agenda_date(value: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| RecordError::InvalidDate {
        value: value.to_string(),
    })
}

impl AgendaSeed {
    pub fn to_agenda(&self) -> Result<NewAgenda, RecordError> {
        Ok(NewAgenda {
            id: Uuid::new_v4().to_string(),
            title: required(Some(self.title.to_string()), "title")?,
            slug: required(Some(self.slug.to_string()), "slug")?,
            date: parse_agenda_date(self.date)?,
            time: self.time.to_string(),
            location: self.location.to_string(),
            thumbnail: self.thumbnail.to_string(),
            description: self.description.to_string(),
            category: AGENDA_CATEGORY.to_string(),
        })
    }
}

// ---- Leader ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderSource {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub title_en: Option<String>,
    pub slug: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub scholar: Option<String>,
    pub vision: Option<String>,
    pub vision_en: Option<String>,
    pub education: Option<Vec<String>>,
    pub education_en: Option<Vec<String>>,
    pub career: Option<Vec<String>>,
    pub career_en: Option<Vec<String>>,
    pub research: Option<Vec<String>>,
    pub research_en: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLeader {
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
    pub education: String,
    pub education_en: String,
    pub career: String,
    pub career_en: String,
    pub research: String,
    pub research_en: String,
}

impl LeaderSource {
    pub fn into_leader(self) -> Result<NewLeader, RecordError> {
        Ok(NewLeader {
            id: id_or_new(self.id),
            name: required(self.name, "name")?,
            title: self.title,
            title_en: self.title_en,
            slug: required(self.slug, "slug")?,
            image: self.image,
            category: self.category,
            email: self.email,
            scholar: self.scholar,
            vision: self.vision,
            vision_en: self.vision_en,
            education: list_to_json(self.education),
            education_en: list_to_json(self.education_en),
            career: list_to_json(self.career),
            career_en: list_to_json(self.career_en),
            research: list_to_json(self.research),
            research_en: list_to_json(self.research_en),
        })
    }
}

// ---- Faculty ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultySource {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
    pub key: Option<String>,
    pub icon: Option<String>,
    pub dean_name: Option<String>,
    pub dean_title: Option<String>,
    pub dean_message: Option<String>,
    pub dean_message_en: Option<String>,
    pub dean_image: Option<String>,
    // Decoded but never written.
    pub dean_id: Option<RawId>,
    pub vision: Option<String>,
    pub vision_en: Option<String>,
    pub missions: Option<Vec<String>>,
    pub missions_en: Option<Vec<String>>,
    pub hero_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFaculty {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub key: Option<String>,
    pub icon: Option<String>,
    pub dean_name: Option<String>,
    pub dean_title: Option<String>,
    pub dean_message: Option<String>,
    pub dean_message_en: Option<String>,
    pub dean_image: Option<String>,
    pub dean_id: Option<String>,
    pub vision: Option<String>,
    pub vision_en: Option<String>,
    pub missions: String,
    pub missions_en: String,
    pub hero_image: Option<String>,
}

impl FacultySource {
    pub fn into_faculty(self) -> Result<NewFaculty, RecordError> {
        Ok(NewFaculty {
            id: id_or_new(self.id),
            name: required(self.name, "name")?,
            name_en: self.name_en,
            slug: required(self.slug, "slug")?,
            key: self.key,
            icon: self.icon,
            dean_name: self.dean_name,
            dean_title: self.dean_title,
            dean_message: self.dean_message,
            dean_message_en: self.dean_message_en,
            dean_image: self.dean_image,
            // The dean's staff row is imported later, if at all.
            dean_id: None,
            vision: self.vision,
            vision_en: self.vision_en,
            missions: list_to_json(self.missions),
            missions_en: list_to_json(self.missions_en),
            hero_image: self.hero_image,
        })
    }
}

// ---- FacultyProgram ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSource {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
    pub key: Option<String>,
    pub level: Option<String>,
    pub accreditation: Option<String>,
    pub faculty_id: Option<RawId>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub advantages: Option<Vec<String>>,
    pub advantages_en: Option<Vec<String>>,
    pub career_prospects: Option<Vec<String>>,
    pub career_prospects_en: Option<Vec<String>>,
    #[serde(alias = "curriculumPDF")]
    pub curriculum_pdf: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProgram {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub key: Option<String>,
    pub level: Option<String>,
    pub accreditation: Option<String>,
    pub faculty_id: String,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub advantages: String,
    pub advantages_en: String,
    pub career_prospects: String,
    pub career_prospects_en: String,
    pub curriculum_pdf: Option<String>,
}

impl ProgramSource {
    pub fn into_program(self) -> Result<NewProgram, RecordError> {
        let faculty_id = self
            .faculty_id
            .map(|v| v.to_string())
            .ok_or(RecordError::MissingField("facultyId"))?;
        Ok(NewProgram {
            id: id_or_new(self.id),
            name: required(self.name, "name")?,
            name_en: self.name_en,
            slug: required(self.slug, "slug")?,
            key: self.key,
            level: self.level,
            accreditation: self.accreditation,
            faculty_id,
            description: self.description,
            description_en: self.description_en,
            advantages: list_to_json(self.advantages),
            advantages_en: list_to_json(self.advantages_en),
            career_prospects: list_to_json(self.career_prospects),
            career_prospects_en: list_to_json(self.career_prospects_en),
            curriculum_pdf: self.curriculum_pdf,
        })
    }
}

// ---- StaffCategory / Staff ----

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffCategorySource {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub slug: Option<String>,
    #[serde(alias = "order")]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStaffCategory {
    pub id: String,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub sort_order: i64,
}

impl StaffCategorySource {
    pub fn into_category(self) -> Result<NewStaffCategory, RecordError> {
        Ok(NewStaffCategory {
            id: id_or_new(self.id),
            name: required(self.name, "name")?,
            name_en: self.name_en,
            slug: required(self.slug, "slug")?,
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffSource {
    pub id: Option<RawId>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub role_en: Option<String>,
    pub nidn: Option<String>,
    pub image: Option<String>,
    pub scholar_url: Option<String>,
    pub category_id: Option<RawId>,
    #[serde(alias = "order")]
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewStaff {
    pub id: String,
    pub name: String,
    pub role: Option<String>,
    pub role_en: Option<String>,
    pub nidn: Option<String>,
    pub image: Option<String>,
    pub scholar_url: Option<String>,
    pub category_id: String,
    pub sort_order: i64,
}

impl StaffSource {
    pub fn into_staff(self) -> Result<NewStaff, RecordError> {
        let category_id = self
            .category_id
            .map(|v| v.to_string())
            .ok_or(RecordError::MissingField("categoryId"))?;
        Ok(NewStaff {
            id: id_or_new(self.id),
            name: required(self.name, "name")?,
            role: self.role,
            role_en: self.role_en,
            nidn: self.nidn,
            image: self.image,
            scholar_url: self.scholar_url,
            category_id,
            sort_order: self.sort_order.unwrap_or(0),
        })
    }
}

/// Identifies a raw record in logs: slug, name, title, id, else its position.
pub fn natural_key(raw: &serde_json::Value, index: usize) -> String {
    for field in ["slug", "name", "title", "id"] {
        match raw.get(field) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(serde_json::Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    format!("#{}", index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_defaults_apply_when_only_slug_and_title() {
        let src: PostSource =
            serde_json::from_value(json!({ "slug": "wisuda-2024", "title": "Wisuda" }))
                .expect("decode");
        let post = src.into_post("2024-01-01T00:00:00Z").expect("map");
        assert_eq!(post.content, "");
        assert_eq!(post.image, "");
        assert_eq!(post.author, "Admin");
        assert_eq!(post.category, "Berita");
        assert!(!post.is_featured);
        assert_eq!(post.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn post_content_and_image_fallbacks() {
        let src: PostSource = serde_json::from_value(json!({
            "slug": "a",
            "title": "A",
            "description": "from description",
            "image": "img.jpg",
            "thumbnail": "thumb.jpg"
        }))
        .expect("decode");
        let post = src.into_post("now").expect("map");
        assert_eq!(post.content, "from description");
        assert_eq!(post.image, "thumb.jpg");

        let src: PostSource = serde_json::from_value(json!({
            "slug": "b",
            "title": "B",
            "content": "body",
            "description": "ignored",
            "image": "img.jpg"
        }))
        .expect("decode");
        let post = src.into_post("now").expect("map");
        assert_eq!(post.content, "body");
        assert_eq!(post.image, "img.jpg");
    }

    #[test]
    fn post_without_slug_is_rejected() {
        let src: PostSource = serde_json::from_value(json!({ "title": "x" })).expect("decode");
        assert!(matches!(
            src.into_post("now"),
            Err(RecordError::MissingField("slug"))
        ));
    }

    #[test]
    fn agenda_date_must_be_iso() {
        assert_eq!(
            parse_agenda_date("2024-08-17").expect("date"),
            NaiveDate::from_ymd_opt(2024, 8, 17).expect("ymd")
        );
        assert!(parse_agenda_date("17 Agustus 2024").is_err());
        assert!(parse_agenda_date("2024-02-30").is_err());
    }

    #[test]
    fn leader_lists_serialize_in_order_and_null_becomes_empty() {
        let src: LeaderSource = serde_json::from_value(json!({
            "id": 7,
            "name": "Rektor",
            "slug": "rektor",
            "education": ["A", "B"],
            "career": null
        }))
        .expect("decode");
        let leader = src.into_leader().expect("map");
        assert_eq!(leader.id, "7");
        assert_eq!(parse_json_list(Some(&leader.education)), vec!["A", "B"]);
        assert_eq!(parse_json_list(Some(&leader.career)), Vec::<String>::new());
    }

    #[test]
    fn tolerant_list_parser() {
        assert!(parse_json_list(None).is_empty());
        assert!(parse_json_list(Some("not json")).is_empty());
        assert!(parse_json_list(Some("null")).is_empty());
        assert!(parse_json_list(Some("{\"a\":1}")).is_empty());
        assert_eq!(parse_json_list(Some("[\"x\"]")), vec!["x"]);
    }

    #[test]
    fn faculty_dean_is_always_dropped() {
        let src: FacultySource = serde_json::from_value(json!({
            "id": "fti",
            "name": "Fakultas Teknologi Informasi",
            "slug": "fti",
            "deanId": "staff-1"
        }))
        .expect("decode");
        assert_eq!(src.into_faculty().expect("map").dean_id, None);
    }

    #[test]
    fn staff_requires_category() {
        let src: StaffSource =
            serde_json::from_value(json!({ "name": "Budi", "order": 3 })).expect("decode");
        assert!(matches!(
            src.into_staff(),
            Err(RecordError::MissingField("categoryId"))
        ));
    }

    #[test]
    fn natural_key_prefers_slug_then_name() {
        assert_eq!(natural_key(&json!({ "slug": "s", "name": "n" }), 0), "s");
        assert_eq!(natural_key(&json!({ "name": "n", "id": 4 }), 0), "n");
        assert_eq!(natural_key(&json!({ "id": 4 }), 0), "4");
        assert_eq!(natural_key(&json!({}), 9), "#9");
    }
}
