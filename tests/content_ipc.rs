mod common;

use common::{fixture_path, temp_dir, Sidecar};
use serde_json::json;

fn imported_sidecar(prefix: &str) -> (Sidecar, std::path::PathBuf) {
    let workspace = temp_dir(prefix);
    let mut sidecar = Sidecar::spawn();
    let _ = sidecar.request_ok(
        "select",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let report = sidecar.request_ok(
        "import",
        "import.run",
        json!({ "sourceRoot": fixture_path("site").to_string_lossy() }),
    );
    let tables = report["tables"].as_array().expect("tables");
    let post = tables
        .iter()
        .find(|t| t["model"] == "Post")
        .expect("post stage");
    assert_eq!(post["inserted"], 3);
    assert_eq!(post["failures"][0]["key"], "Berita tanpa slug");
    (sidecar, workspace)
}

#[test]
fn content_lists_before_workspace_are_empty() {
    let mut sidecar = Sidecar::spawn();
    let posts = sidecar.request_ok("1", "posts.list", json!({}));
    assert_eq!(posts["posts"], json!([]));
    let staff = sidecar.request_ok("2", "staff.list", json!({}));
    assert_eq!(staff["categories"], json!([]));
    assert_eq!(
        sidecar.request_err("3", "import.run", json!({})),
        "no_workspace"
    );
    assert_eq!(
        sidecar.request_err("4", "complaints.list", json!({})),
        "not_implemented"
    );
}

#[test]
fn imported_posts_and_agenda_are_listed() {
    let (mut sidecar, workspace) = imported_sidecar("kampusd-content-posts");

    let posts = sidecar.request_ok("1", "posts.list", json!({}));
    let slugs: Vec<&str> = posts["posts"]
        .as_array()
        .expect("posts")
        .iter()
        .filter_map(|p| p["slug"].as_str())
        .collect();
    assert_eq!(
        slugs,
        vec![
            "pembukaan-pmb-2025",
            "kampus-raih-akreditasi-unggul",
            "kuliah-umum-ai"
        ]
    );

    let pmb = &posts["posts"][0];
    assert_eq!(pmb["author"], "Admin");
    assert_eq!(pmb["category"], "Berita");
    assert_eq!(pmb["content"], "");
    assert_eq!(pmb["image"], "");
    assert_eq!(pmb["isFeatured"], false);

    let lecture = &posts["posts"][2];
    assert_eq!(lecture["content"], "Kuliah umum bersama praktisi industri.");
    assert_eq!(lecture["image"], "/images/news/kuliah-umum.jpg");

    let featured = sidecar.request_ok("2", "posts.list", json!({ "category": "Prestasi" }));
    let featured = featured["posts"].as_array().expect("posts");
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0]["isFeatured"], true);
    assert_eq!(featured[0]["image"], "/images/news/akreditasi.jpg");

    let agenda = sidecar.request_ok("3", "agenda.list", json!({}));
    let agenda = agenda["agendas"].as_array().expect("agendas");
    assert_eq!(agenda.len(), 4);
    assert_eq!(agenda[0]["date"], "2025-01-15");
    assert!(agenda.iter().all(|a| a["category"] == "Agenda"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn imported_leaders_faculties_and_staff_are_listed() {
    let (mut sidecar, workspace) = imported_sidecar("kampusd-content-people");

    let leaders = sidecar.request_ok("1", "leaders.list", json!({}));
    let leaders = leaders["leaders"].as_array().expect("leaders");
    assert_eq!(leaders.len(), 2);
    assert_eq!(leaders[0]["slug"], "rektor");
    assert_eq!(leaders[0]["education"], json!(["A", "B"]));
    assert_eq!(leaders[0]["careerEn"], json!([]));
    assert_eq!(leaders[1]["education"], json!([]));

    let faculties = sidecar.request_ok("2", "faculties.list", json!({}));
    let faculties = faculties["faculties"].as_array().expect("faculties");
    assert_eq!(faculties.len(), 2);
    let ft = &faculties[0];
    assert_eq!(ft["slug"], "fakultas-teknik");
    assert!(ft["deanId"].is_null());
    assert_eq!(ft["deanName"], "Dr. Budi Santoso");
    assert_eq!(ft["missions"], json!(["Pendidikan", "Penelitian", "Pengabdian"]));
    let programs = ft["programs"].as_array().expect("programs");
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0]["slug"], "teknik-informatika");
    assert_eq!(programs[0]["careerProspects"], json!(["Software Engineer"]));
    assert_eq!(faculties[1]["programs"][0]["slug"], "manajemen");

    let staff = sidecar.request_ok("3", "staff.list", json!({}));
    let groups = staff["categories"].as_array().expect("categories");
    let slugs: Vec<&str> = groups.iter().filter_map(|g| g["slug"].as_str()).collect();
    assert_eq!(slugs, vec!["dosen-tetap", "tendik"]);
    assert_eq!(groups[0]["staff"][0]["name"], "Rina Kartika, M.T.");
    assert_eq!(groups[1]["staff"].as_array().map(|s| s.len()), Some(1));

    let _ = std::fs::remove_dir_all(workspace);
}

fn bundles(workspace: &std::path::Path) -> usize {
    match std::fs::read_dir(workspace.join("backups")) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".kampus.zip"))
            .count(),
        Err(_) => 0,
    }
}

#[test]
fn reimport_replaces_instead_of_duplicating() {
    let (mut sidecar, workspace) = imported_sidecar("kampusd-content-reimport");
    assert_eq!(bundles(&workspace), 1);

    let again = sidecar.request_ok(
        "1",
        "import.run",
        json!({ "sourceRoot": fixture_path("site").to_string_lossy() }),
    );
    let cleared = again["cleanup"]["cleared"].as_array().expect("cleared");
    let posts_cleared = cleared
        .iter()
        .find(|c| c["model"] == "Post")
        .expect("post cleared");
    assert_eq!(posts_cleared["rows"], 3);
    assert_eq!(bundles(&workspace), 2);
    let backup_path = again["backupPath"].as_str().expect("backup path");
    let backup_path = std::path::Path::new(backup_path);
    assert!(backup_path.is_file());
    assert!(backup_path.starts_with(workspace.join("backups")));

    let posts = sidecar.request_ok("2", "posts.list", json!({}));
    assert_eq!(posts["posts"].as_array().map(|p| p.len()), Some(3));
    let leaders = sidecar.request_ok("3", "leaders.list", json!({}));
    assert_eq!(leaders["leaders"].as_array().map(|l| l.len()), Some(2));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn import_with_broken_dump_reports_and_keeps_rows() {
    let (mut sidecar, workspace) = imported_sidecar("kampusd-content-broken");

    let broken = temp_dir("kampusd-content-broken-src");
    std::fs::create_dir_all(broken.join("data")).expect("data dir");
    std::fs::write(broken.join("data/dump.json"), "[1, 2").expect("write dump");

    assert_eq!(
        sidecar.request_err(
            "1",
            "import.run",
            json!({ "sourceRoot": broken.to_string_lossy() })
        ),
        "import_failed"
    );
    assert_eq!(bundles(&workspace), 1);
    let posts = sidecar.request_ok("2", "posts.list", json!({}));
    assert_eq!(posts["posts"].as_array().map(|p| p.len()), Some(3));

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(broken);
}

#[test]
fn failed_backup_stops_the_wipe() {
    let (mut sidecar, workspace) = imported_sidecar("kampusd-content-backup-blocked");
    std::fs::remove_dir_all(workspace.join("backups")).expect("clear backups");
    std::fs::write(workspace.join("backups"), b"not a directory").expect("block backups");

    assert_eq!(
        sidecar.request_err(
            "1",
            "import.run",
            json!({ "sourceRoot": fixture_path("site").to_string_lossy() })
        ),
        "io_failed"
    );
    let posts = sidecar.request_ok("2", "posts.list", json!({}));
    assert_eq!(posts["posts"].as_array().map(|p| p.len()), Some(3));
    let leaders = sidecar.request_ok("3", "leaders.list", json!({}));
    assert_eq!(leaders["leaders"].as_array().map(|l| l.len()), Some(2));

    let _ = std::fs::remove_dir_all(workspace);
}
