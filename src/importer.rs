use crate::config::ImportConfig;
use crate::records::{self, AgendaSeed, RecordError};
use crate::sources::Sources;
use crate::{backup, db, store};
use anyhow::Context;
use log::{error, info, warn};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Children before parents. Deleting in any other order trips the foreign keys.
pub const CLEANUP_ORDER: &[&str] = &[
    "Post",
    "Agenda",
    "FacultyProgram",
    "Leader",
    "Faculty",
    "Staff",
    "StaffCategory",
    "LpmDocument",
    "Publication",
    "ResearchProject",
    "PkmProject",
    "ResearchConfig",
    "PkmConfig",
    "Laboratory",
    "LaboratoryConfig",
    "LppmProfile",
    "LppmStaff",
    "PkmProgram",
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearedTable {
    pub model: String,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearFailure {
    pub model: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub cleared: Vec<ClearedTable>,
    pub failed: Vec<ClearFailure>,
}

impl CleanupReport {
    pub fn is_cleared(&self, model: &str) -> bool {
        self.cleared.iter().any(|c| c.model == model)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    pub key: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableImport {
    pub model: String,
    pub attempted: usize,
    pub inserted: usize,
    pub failures: Vec<RecordFailure>,
}

impl TableImport {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Self::default()
        }
    }

    fn record(&mut self, key: String, res: Result<(), RecordError>) {
        self.attempted += 1;
        match res {
            Ok(()) => self.inserted += 1,
            Err(e) => {
                error!("{} {}: {}", self.model, key, e);
                self.failures.push(RecordFailure {
                    key,
                    error: e.to_string(),
                });
            }
        }
    }

    fn log_summary(&self) {
        info!(
            "{}: {}/{} imported",
            self.model, self.inserted, self.attempted
        );
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub cleanup: CleanupReport,
    pub tables: Vec<TableImport>,
}

impl ImportReport {
    pub fn table(&self, model: &str) -> Option<&TableImport> {
        self.tables.iter().find(|t| t.model == model)
    }

    pub fn total_inserted(&self) -> usize {
        self.tables.iter().map(|t| t.inserted).sum()
    }

    pub fn total_failures(&self) -> usize {
        self.tables.iter().map(|t| t.failures.len()).sum()
    }
}

/// Empties each model's table in the given order. Failures are logged and
/// skipped so one missing or locked table never stops the batch.
pub fn run_cleanup(conn: &Connection, order: &[&str]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for model in order {
        let Some(target) = store::table_for(model) else {
            warn!("skip clearing {}: model is not registered", model);
            report.failed.push(ClearFailure {
                model: model.to_string(),
                error: "model is not registered".to_string(),
            });
            continue;
        };
        match store::delete_all(conn, target) {
            Ok(rows) => {
                info!("cleared {} ({} rows)", model, rows);
                report.cleared.push(ClearedTable {
                    model: model.to_string(),
                    rows,
                });
            }
            Err(e) => {
                warn!("could not clear {}: {}", model, e);
                report.failed.push(ClearFailure {
                    model: model.to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

fn import_records<S, T, M, I>(
    conn: &Connection,
    model: &str,
    records: &[Value],
    map: M,
    insert: I,
) -> TableImport
where
    S: DeserializeOwned,
    M: Fn(S) -> Result<T, RecordError>,
    I: Fn(&Connection, &T) -> rusqlite::Result<()>,
{
    let mut out = TableImport::new(model);
    for (i, raw) in records.iter().enumerate() {
        let key = records::natural_key(raw, i);
        let res = (|| -> Result<(), RecordError> {
            let src: S = serde_json::from_value(raw.clone())?;
            let row = map(src)?;
            insert(conn, &row)?;
            Ok(())
        })();
        out.record(key, res);
    }
    out.log_summary();
    out
}

pub fn import_agenda(conn: &Connection, seeds: &[AgendaSeed]) -> TableImport {
    let mut out = TableImport::new("Agenda");
    for seed in seeds {
        let res = seed
            .to_agenda()
            .and_then(|a| store::insert_agenda(conn, &a).map_err(RecordError::from));
        out.record(seed.slug.to_string(), res);
    }
    out.log_summary();
    out
}

pub fn import_posts(conn: &Connection, records: &[Value], now: &str) -> TableImport {
    import_records(
        conn,
        "Post",
        records,
        |s: records::PostSource| s.into_post(now),
        store::insert_post,
    )
}

pub fn import_leaders(conn: &Connection, records: &[Value]) -> TableImport {
    import_records(
        conn,
        "Leader",
        records,
        |s: records::LeaderSource| s.into_leader(),
        store::insert_leader,
    )
}

pub fn import_faculties(conn: &Connection, records: &[Value]) -> TableImport {
    import_records(
        conn,
        "Faculty",
        records,
        |s: records::FacultySource| s.into_faculty(),
        store::insert_faculty,
    )
}

pub fn import_programs(conn: &Connection, records: &[Value]) -> TableImport {
    import_records(
        conn,
        "FacultyProgram",
        records,
        |s: records::ProgramSource| s.into_program(),
        store::insert_program,
    )
}

pub fn import_staff_categories(conn: &Connection, records: &[Value]) -> TableImport {
    import_records(
        conn,
        "StaffCategory",
        records,
        |s: records::StaffCategorySource| s.into_category(),
        store::insert_staff_category,
    )
}

pub fn import_staff(conn: &Connection, records: &[Value]) -> TableImport {
    import_records(
        conn,
        "Staff",
        records,
        |s: records::StaffSource| s.into_staff(),
        store::insert_staff,
    )
}

pub fn import_auxiliary(conn: &Connection, model: &str, records: &[Value]) -> TableImport {
    let mut out = TableImport::new(model);
    let columns = match store::table_for(model) {
        Some(target) => db::table_columns(conn, target.table)
            .ok()
            .filter(|c| !c.is_empty())
            .map(|c| (target, c)),
        None => None,
    };
    let Some((target, columns)) = columns else {
        warn!(
            "{} is not provisioned; skipping {} records",
            model,
            records.len()
        );
        for (i, raw) in records.iter().enumerate() {
            out.attempted += 1;
            out.failures.push(RecordFailure {
                key: records::natural_key(raw, i),
                error: "table is not provisioned".to_string(),
            });
        }
        return out;
    };

    for (i, raw) in records.iter().enumerate() {
        let key = records::natural_key(raw, i);
        out.record(key, store::insert_auxiliary(conn, target, &columns, raw));
    }
    out.log_summary();
    out
}

/// Parents first: faculties before their programs, categories before staff.
pub fn populate(conn: &Connection, sources: &Sources) -> Vec<TableImport> {
    let now = chrono::Utc::now().to_rfc3339();
    let dump = &sources.dump;

    let mut tables = vec![
        import_agenda(conn, &sources.agenda),
        import_posts(conn, &sources.news, &now),
        import_leaders(conn, &sources.leaders),
        import_faculties(conn, &dump.faculty),
        import_programs(conn, &dump.faculty_program),
        import_staff_categories(conn, &dump.staff_category),
        import_staff(conn, &dump.staff),
    ];
    for (model, records) in dump.auxiliary() {
        tables.push(import_auxiliary(conn, model, records));
    }
    tables
}

pub fn run(conn: &Connection, sources: &Sources) -> ImportReport {
    let cleanup = run_cleanup(conn, CLEANUP_ORDER);
    let tables = populate(conn, sources);
    ImportReport { cleanup, tables }
}

/// Writes a bundle of the database in `db_dir` into `backup_dir`. Returns
/// `None` when there is no database yet.
pub fn backup_existing(db_dir: &Path, backup_dir: &Path) -> anyhow::Result<Option<PathBuf>> {
    if !db::db_path(db_dir).is_file() {
        return Ok(None);
    }
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3fZ");
    let mut out = backup_dir.join(format!("pre-import-{}.kampus.zip", stamp));
    let mut n = 1;
    while out.exists() {
        out = backup_dir.join(format!("pre-import-{}-{}.kampus.zip", stamp, n));
        n += 1;
    }
    let summary = backup::export_db_bundle(db_dir, &out)?;
    info!(
        "backed up database to {} (sha256 {})",
        out.to_string_lossy(),
        summary.db_sha256
    );
    Ok(Some(out))
}

/// Loads every source, snapshots the existing database, then wipes and
/// repopulates it. Source errors surface before anything is deleted.
pub fn run_with_config(cfg: &ImportConfig) -> anyhow::Result<ImportReport> {
    let sources = Sources::load(&cfg.news_path(), &cfg.leaders_path(), &cfg.dump_path())
        .context("failed to load import sources")?;
    info!(
        "loaded sources: {} agenda, {} news, {} leaders, {} faculties, {} programs, {} staff",
        sources.agenda.len(),
        sources.news.len(),
        sources.leaders.len(),
        sources.dump.faculty.len(),
        sources.dump.faculty_program.len(),
        sources.dump.staff.len()
    );

    if cfg.backup {
        backup_existing(cfg.db_dir(), &cfg.backup_dir())
            .context("failed to back up the database before import")?;
    }

    let conn = db::open_db(cfg.db_dir()).with_context(|| {
        format!(
            "failed to open database in {}",
            cfg.db_dir().to_string_lossy()
        )
    })?;
    let report = run(&conn, &sources);
    info!(
        "import finished: {} rows inserted, {} records failed, {} tables not cleared",
        report.total_inserted(),
        report.total_failures(),
        report.cleanup.failed.len()
    );
    Ok(report)
}
