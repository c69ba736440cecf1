use crate::records::{list_to_json, parse_json_list};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeEntry {
    pub id: String,
    pub topics: Vec<String>,
    pub keywords: Vec<String>,
    pub answer: String,
    pub is_active: bool,
    pub is_suggested: bool,
    pub created_at: String,
}

/// Admin form input. Topics and keywords arrive comma-separated.
#[derive(Debug, Clone)]
pub struct KnowledgeInput {
    pub topics: String,
    pub keywords: String,
    pub answer: String,
    pub is_active: bool,
    pub is_suggested: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("database: {0}")]
    Db(#[from] rusqlite::Error),
}

/// "A, B ,, C" -> ["A", "B", "C"]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

const SELECT_COLUMNS: &str =
    "SELECT id, topics, keywords, answer, is_active, is_suggested, created_at FROM knowledge_entries";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<KnowledgeEntry> {
    let topics: Option<String> = row.get(1)?;
    let keywords: Option<String> = row.get(2)?;
    Ok(KnowledgeEntry {
        id: row.get(0)?,
        topics: parse_json_list(topics.as_deref()),
        keywords: parse_json_list(keywords.as_deref()),
        answer: row.get(3)?,
        is_active: row.get::<_, i64>(4)? != 0,
        is_suggested: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<KnowledgeEntry>> {
    let mut stmt = conn.prepare(&format!("{} ORDER BY rowid", SELECT_COLUMNS))?;
    let rows = stmt
        .query_map([], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn get(conn: &Connection, id: &str) -> rusqlite::Result<Option<KnowledgeEntry>> {
    conn.query_row(
        &format!("{} WHERE id = ?", SELECT_COLUMNS),
        [id],
        entry_from_row,
    )
    .optional()
}

pub fn create(conn: &Connection, input: &KnowledgeInput) -> Result<KnowledgeEntry, KnowledgeError> {
    let answer = input.answer.trim();
    if answer.is_empty() {
        return Err(KnowledgeError::EmptyAnswer);
    }
    let entry = KnowledgeEntry {
        id: Uuid::new_v4().to_string(),
        topics: split_list(&input.topics),
        keywords: split_list(&input.keywords),
        answer: answer.to_string(),
        is_active: input.is_active,
        is_suggested: input.is_suggested,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    conn.execute(
        "INSERT INTO knowledge_entries(id, topics, keywords, answer, is_active, is_suggested, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?)",
        (
            &entry.id,
            list_to_json(Some(entry.topics.clone())),
            list_to_json(Some(entry.keywords.clone())),
            &entry.answer,
            entry.is_active as i64,
            entry.is_suggested as i64,
            &entry.created_at,
        ),
    )?;
    Ok(entry)
}

/// Returns `None` when no entry has this id.
pub fn update(
    conn: &Connection,
    id: &str,
    input: &KnowledgeInput,
) -> Result<Option<KnowledgeEntry>, KnowledgeError> {
    let answer = input.answer.trim();
    if answer.is_empty() {
        return Err(KnowledgeError::EmptyAnswer);
    }
    let changed = conn.execute(
        "UPDATE knowledge_entries
         SET topics = ?, keywords = ?, answer = ?, is_active = ?, is_suggested = ?
         WHERE id = ?",
        (
            list_to_json(Some(split_list(&input.topics))),
            list_to_json(Some(split_list(&input.keywords))),
            answer,
            input.is_active as i64,
            input.is_suggested as i64,
            id,
        ),
    )?;
    if changed == 0 {
        return Ok(None);
    }
    Ok(get(conn, id)?)
}

pub fn delete(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM knowledge_entries WHERE id = ?", [id])?;
    Ok(changed > 0)
}

/// Admin list filter: the search text against the answer or any keyword.
pub fn filter<'a>(entries: &'a [KnowledgeEntry], search: &str) -> Vec<&'a KnowledgeEntry> {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return entries.iter().collect();
    }
    entries
        .iter()
        .filter(|e| {
            e.answer.to_lowercase().contains(&needle)
                || e.keywords.iter().any(|k| k.to_lowercase().contains(&needle))
        })
        .collect()
}

/// First active entry whose keyword or topic appears in the question.
pub fn lookup<'a>(entries: &'a [KnowledgeEntry], question: &str) -> Option<&'a KnowledgeEntry> {
    let q = question.to_lowercase();
    if q.trim().is_empty() {
        return None;
    }
    entries.iter().filter(|e| e.is_active).find(|e| {
        e.keywords
            .iter()
            .chain(e.topics.iter())
            .any(|k| q.contains(&k.to_lowercase()))
    })
}

pub fn suggestions(entries: &[KnowledgeEntry]) -> Vec<&KnowledgeEntry> {
    entries
        .iter()
        .filter(|e| e.is_active && e.is_suggested)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, keywords: &[&str], answer: &str, active: bool) -> KnowledgeEntry {
        KnowledgeEntry {
            id: id.to_string(),
            topics: vec![],
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            answer: answer.to_string(),
            is_active: active,
            is_suggested: false,
            created_at: String::new(),
        }
    }

    #[test]
    fn split_list_trims_and_drops_empty_tokens() {
        assert_eq!(split_list("A, B ,, C"), vec!["A", "B", "C"]);
        assert!(split_list(" , ,").is_empty());
        assert!(split_list("").is_empty());
    }

    #[test]
    fn filter_matches_answer_or_keyword_case_insensitive() {
        let entries = vec![
            entry("1", &["biaya", "UKT"], "Rincian biaya kuliah ada di halaman PMB.", true),
            entry("2", &["beasiswa"], "Informasi **Beasiswa** KIP.", true),
        ];
        let hits: Vec<&str> = filter(&entries, "ukt").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(hits, vec!["1"]);
        let hits: Vec<&str> = filter(&entries, "BEASISWA").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(hits, vec!["2"]);
        assert_eq!(filter(&entries, "  ").len(), 2);
        assert!(filter(&entries, "wisuda").is_empty());
    }

    #[test]
    fn lookup_takes_first_active_match_in_order() {
        let entries = vec![
            entry("1", &["daftar"], "old", false),
            entry("2", &["daftar"], "Pendaftaran dibuka Januari.", true),
            entry("3", &["daftar", "pmb"], "later", true),
        ];
        let hit = lookup(&entries, "Kapan saya bisa DAFTAR?").expect("match");
        assert_eq!(hit.id, "2");
        assert!(lookup(&entries, "jadwal wisuda").is_none());
        assert!(lookup(&entries, "").is_none());
    }

    #[test]
    fn crud_roundtrip_keeps_insertion_order() {
        let conn = Connection::open_in_memory().expect("open");
        conn.execute(
            "CREATE TABLE knowledge_entries(
                id TEXT PRIMARY KEY,
                topics TEXT NOT NULL,
                keywords TEXT NOT NULL,
                answer TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                is_suggested INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )
        .expect("create table");

        let input = |answer: &str| KnowledgeInput {
            topics: "PMB, Biaya".to_string(),
            keywords: "ukt, , spp".to_string(),
            answer: answer.to_string(),
            is_active: true,
            is_suggested: false,
        };
        let a = create(&conn, &input("first")).expect("create a");
        let b = create(&conn, &input("second")).expect("create b");
        assert!(matches!(
            create(&conn, &input("   ")),
            Err(KnowledgeError::EmptyAnswer)
        ));

        let ids: Vec<String> = list(&conn).expect("list").into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);
        assert_eq!(a.keywords, vec!["ukt", "spp"]);

        let mut changed = input("updated");
        changed.is_suggested = true;
        let updated = update(&conn, &a.id, &changed).expect("update").expect("exists");
        assert_eq!(updated.answer, "updated");
        assert!(updated.is_suggested);
        assert!(update(&conn, "missing", &changed).expect("update").is_none());

        assert!(delete(&conn, &b.id).expect("delete"));
        assert!(!delete(&conn, &b.id).expect("delete again"));
        assert_eq!(list(&conn).expect("list").len(), 1);
    }
}
