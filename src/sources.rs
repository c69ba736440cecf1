use crate::records::AgendaSeed;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{} must hold a JSON array", path.display())]
    NotAnArray { path: PathBuf },
}

pub const AGENDA_SEED: &[AgendaSeed] = &[
    AgendaSeed {
        title: "Penerimaan Mahasiswa Baru Gelombang I",
        slug: "penerimaan-mahasiswa-baru-gelombang-1",
        date: "2025-01-15",
        time: "08:00 - 16:00 WIB",
        location: "Gedung Rektorat, Lantai 1",
        thumbnail: "/images/agenda/pmb-gelombang-1.jpg",
        description: "Pendaftaran mahasiswa baru gelombang pertama untuk seluruh program studi.",
    },
    AgendaSeed {
        title: "Seminar Nasional Teknologi dan Inovasi",
        slug: "seminar-nasional-teknologi-inovasi",
        date: "2025-02-20",
        time: "09:00 - 15:00 WIB",
        location: "Auditorium Utama",
        thumbnail: "/images/agenda/seminar-nasional.jpg",
        description: "Seminar nasional bersama pembicara dari industri dan perguruan tinggi.",
    },
    AgendaSeed {
        title: "Wisuda Periode I",
        slug: "wisuda-periode-1",
        date: "2025-03-22",
        time: "07:30 WIB - selesai",
        location: "Gedung Serbaguna",
        thumbnail: "/images/agenda/wisuda.jpg",
        description: "Upacara wisuda sarjana dan magister periode pertama.",
    },
    AgendaSeed {
        title: "Lokakarya Penjaminan Mutu Internal",
        slug: "lokakarya-penjaminan-mutu-internal",
        date: "2025-04-10",
        time: "13:00 - 17:00 WIB",
        location: "Ruang Rapat LPM",
        thumbnail: "/images/agenda/lokakarya-lpm.jpg",
        description: "Lokakarya penyusunan dokumen SPMI bersama seluruh unit.",
    },
];

/// Reads a JSON array from `path`. A missing file is an empty source.
pub fn load_json_array(path: &Path) -> Result<Vec<Value>, SourceError> {
    let Some(text) = read_optional(path)? else {
        return Ok(Vec::new());
    };
    let value: Value = serde_json::from_str(&text).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(SourceError::NotAnArray {
            path: path.to_path_buf(),
        }),
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, SourceError> {
    match std::fs::read_to_string(path) {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(SourceError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The consolidated export. Every key is optional and decodes to an empty list
/// when absent or null. Records stay raw so each one can fail on its own.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dump {
    #[serde(default, deserialize_with = "nullable_list")]
    pub faculty: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub faculty_program: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub staff_category: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub staff: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub lpm_document: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub publication: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub research_project: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub pkm_project: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub research_config: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub pkm_config: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub laboratory: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub laboratory_config: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub lppm_profile: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub lppm_staff: Vec<Value>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub pkm_program: Vec<Value>,
}

impl Dump {
    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let Some(text) = read_optional(path)? else {
            return Ok(Self::default());
        };
        serde_json::from_str(&text).map_err(|source| SourceError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Auxiliary collections paired with their model name, in import order.
    pub fn auxiliary(&self) -> [(&'static str, &[Value]); 11] {
        [
            ("LpmDocument", self.lpm_document.as_slice()),
            ("Publication", self.publication.as_slice()),
            ("ResearchProject", self.research_project.as_slice()),
            ("PkmProject", self.pkm_project.as_slice()),
            ("ResearchConfig", self.research_config.as_slice()),
            ("PkmConfig", self.pkm_config.as_slice()),
            ("Laboratory", self.laboratory.as_slice()),
            ("LaboratoryConfig", self.laboratory_config.as_slice()),
            ("LppmProfile", self.lppm_profile.as_slice()),
            ("LppmStaff", self.lppm_staff.as_slice()),
            ("PkmProgram", self.pkm_program.as_slice()),
        ]
    }
}

/// Everything one run reads, loaded up front and passed by reference.
#[derive(Debug, Default)]
pub struct Sources {
    pub agenda: Vec<AgendaSeed>,
    pub news: Vec<Value>,
    pub leaders: Vec<Value>,
    pub dump: Dump,
}

impl Sources {
    pub fn load(
        news_path: &Path,
        leaders_path: &Path,
        dump_path: &Path,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            agenda: AGENDA_SEED.to_vec(),
            news: load_json_array(news_path)?,
            leaders: load_json_array(leaders_path)?,
            dump: Dump::load(dump_path)?,
        })
    }
}
