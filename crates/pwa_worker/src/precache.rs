use std::io;
use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use walkdir::WalkDir;

/// Everything but the unreserved characters is escaped in a path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Lists every file under `static_root` as a URL path below `static_url`,
/// sorted so the manifest is stable between runs. Symlinked directories are
/// followed.
pub fn discover_precache(static_root: &Path, static_url: &str) -> io::Result<Vec<String>> {
    let mut relative = Vec::new();
    for entry in WalkDir::new(static_root).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = entry.path().strip_prefix(static_root) else {
            continue;
        };
        let segments: Vec<String> = path
            .components()
            .map(|part| {
                let part = part.as_os_str().to_string_lossy();
                utf8_percent_encode(&part, SEGMENT).to_string()
            })
            .collect();
        relative.push(segments.join("/"));
    }
    relative.sort();

    let prefix = static_url.trim_end_matches('/');
    Ok(relative
        .into_iter()
        .map(|path| format!("{prefix}/{path}"))
        .collect())
}
