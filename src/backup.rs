use crate::db;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DB_ENTRY: &str = "db/kampus.sqlite3";
const RESTORE_SUFFIX: &str = "restoring";
pub const BUNDLE_FORMAT_V1: &str = "kampus-db-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    #[serde(default)]
    app_version: String,
    #[serde(default)]
    exported_at: String,
    #[serde(default)]
    db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub db_sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

/// Hashes whatever passes through it on the way to `inner`.
struct DigestWriter<W> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> Write for DigestWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

fn hex_digest(hasher: Sha256) -> String {
    format!("{:x}", hasher.finalize())
}

/// Zips the workspace database with a manifest carrying its SHA-256.
pub fn export_db_bundle(db_dir: &Path, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let db_file = db::db_path(db_dir);
    let bytes = std::fs::read(&db_file)
        .with_context(|| format!("cannot read database {}", db_file.display()))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: chrono::Utc::now().to_rfc3339(),
        db_sha256: hex_digest(hasher),
    };

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let out = File::create(out_path)
        .with_context(|| format!("cannot create bundle {}", out_path.display()))?;
    let mut zip = ZipWriter::new(out);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(MANIFEST_ENTRY, opts)?;
    serde_json::to_writer_pretty(&mut zip, &manifest).context("cannot write manifest")?;
    zip.start_file(DB_ENTRY, opts)?;
    zip.write_all(&bytes).context("cannot write database entry")?;
    zip.finish().context("cannot finish bundle")?;

    Ok(ExportSummary {
        bundle_format: manifest.format,
        db_sha256: manifest.db_sha256,
    })
}

/// Restores a bundle into `db_dir`. The database is extracted next to the
/// live one and only swapped in once its digest matches the manifest.
pub fn import_db_bundle(in_path: &Path, db_dir: &Path) -> anyhow::Result<ImportSummary> {
    let file =
        File::open(in_path).with_context(|| format!("cannot open bundle {}", in_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("{} is not a zip bundle", in_path.display()))?;

    let manifest: Manifest = {
        let mut text = String::new();
        archive
            .by_name(MANIFEST_ENTRY)
            .context("bundle has no manifest.json")?
            .read_to_string(&mut text)?;
        serde_json::from_str(&text).context("manifest.json does not decode")?
    };
    if manifest.format != BUNDLE_FORMAT_V1 {
        bail!("unsupported bundle format: {}", manifest.format);
    }

    std::fs::create_dir_all(db_dir).with_context(|| format!("cannot create {}", db_dir.display()))?;
    let live = db::db_path(db_dir);
    let staged = live.with_extension(format!("sqlite3.{}", RESTORE_SUFFIX));

    let actual = {
        let mut entry = archive
            .by_name(DB_ENTRY)
            .with_context(|| format!("bundle has no {}", DB_ENTRY))?;
        let mut out = DigestWriter {
            inner: File::create(&staged)
                .with_context(|| format!("cannot create {}", staged.display()))?,
            hasher: Sha256::new(),
        };
        std::io::copy(&mut entry, &mut out).context("cannot extract database entry")?;
        out.flush()?;
        hex_digest(out.hasher)
    };

    if actual != manifest.db_sha256 {
        let _ = std::fs::remove_file(&staged);
        bail!(
            "database digest mismatch: manifest {} but extracted {}",
            manifest.db_sha256,
            actual
        );
    }

    if live.exists() {
        std::fs::remove_file(&live)
            .with_context(|| format!("cannot replace {}", live.display()))?;
    }
    std::fs::rename(&staged, &live)
        .with_context(|| format!("cannot move restored database to {}", live.display()))?;

    Ok(ImportSummary {
        bundle_format_detected: manifest.format,
    })
}
