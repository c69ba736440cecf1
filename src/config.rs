use std::path::{Path, PathBuf};

pub const ROOT_ENV: &str = "KAMPUSD_ROOT";
pub const DB_DIR_ENV: &str = "KAMPUSD_DB_DIR";
pub const SKIP_BACKUP_ENV: &str = "KAMPUSD_SKIP_BACKUP";

const NEWS_FILE: &str = "data/news.json";
const LEADERS_FILE: &str = "data/leaders.json";
const DUMP_FILE: &str = "data/dump.json";
const BACKUP_DIR: &str = "backups";

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub root: PathBuf,
    pub db_dir: PathBuf,
    pub backup: bool,
}

impl ImportConfig {
    /// Everything hangs off `root`; the database lives next to the sources.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            db_dir: root.clone(),
            root,
            backup: true,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let root = match std::env::var_os(ROOT_ENV) {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => std::env::current_dir()?,
        };
        let mut cfg = Self::for_root(root);
        if let Some(dir) = std::env::var_os(DB_DIR_ENV).filter(|v| !v.is_empty()) {
            cfg.db_dir = PathBuf::from(dir);
        }
        cfg.backup = !env_flag(SKIP_BACKUP_ENV);
        Ok(cfg)
    }

    pub fn news_path(&self) -> PathBuf {
        self.root.join(NEWS_FILE)
    }

    pub fn leaders_path(&self) -> PathBuf {
        self.root.join(LEADERS_FILE)
    }

    pub fn dump_path(&self) -> PathBuf {
        self.root.join(DUMP_FILE)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(BACKUP_DIR)
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }
}

fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => false,
    }
}
