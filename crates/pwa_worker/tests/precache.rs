use std::fs;

use pwa_worker::discover_precache;
use tempfile::TempDir;

#[test]
fn static_files_become_sorted_url_paths() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("css")).unwrap();
    fs::create_dir_all(temp.path().join("js/vendor")).unwrap();
    fs::write(temp.path().join("css/site.css"), "").unwrap();
    fs::write(temp.path().join("js/app.js"), "").unwrap();
    fs::write(temp.path().join("js/vendor/lib.js"), "").unwrap();
    fs::write(temp.path().join("favicon.ico"), "").unwrap();

    let paths = discover_precache(temp.path(), "/static/").unwrap();

    assert_eq!(
        paths,
        vec![
            "/static/css/site.css",
            "/static/favicon.ico",
            "/static/js/app.js",
            "/static/js/vendor/lib.js",
        ]
    );
}

#[test]
fn missing_root_is_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(discover_precache(&temp.path().join("nope"), "/static").is_err());
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_followed() {
    let temp = TempDir::new().unwrap();
    let real = temp.path().join("real");
    let root = temp.path().join("static");
    fs::create_dir_all(&real).unwrap();
    fs::create_dir_all(&root).unwrap();
    fs::write(real.join("app.js"), "").unwrap();
    std::os::unix::fs::symlink("../real", root.join("vendor")).unwrap();

    let paths = discover_precache(&root, "/static/").unwrap();

    assert_eq!(paths, vec!["/static/vendor/app.js"]);
}

#[test]
fn file_names_are_url_escaped() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("my css")).unwrap();
    fs::write(temp.path().join("my css/a#b.css"), "").unwrap();
    fs::write(temp.path().join("plain-file_1.v2~.js"), "").unwrap();

    let paths = discover_precache(temp.path(), "/static").unwrap();

    assert_eq!(
        paths,
        vec!["/static/my%20css/a%23b.css", "/static/plain-file_1.v2~.js"]
    );
}
