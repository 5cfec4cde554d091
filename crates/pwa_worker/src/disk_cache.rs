//! Durable cache persisted as one file per entry.
//!
//! Entry layout: a single line of JSON metadata, a newline, then the raw
//! body bytes. Files are named by the SHA-256 of the cache key and replaced
//! atomically, so a reader never observes a half-written entry.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cache::{CacheError, CacheKey, DurableCache};
use crate::persist::{ensure_dir, AtomicFileWriter};
use crate::{Request, Response};

const ENTRY_EXTENSION: &str = "entry";

#[derive(Debug, Serialize, Deserialize)]
struct EntryHeader {
    key: CacheKey,
    status: u16,
    url: String,
    headers: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct DiskCache {
    name: String,
    dir: PathBuf,
}

impl DiskCache {
    /// Opens (creating if needed) the cache `name` under `root`.
    pub fn open(root: &Path, name: impl Into<String>) -> Result<Self, CacheError> {
        let name = name.into();
        let dir = root.join(&name);
        ensure_dir(&dir)?;
        Ok(Self { name, dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(entry_filename(key))
    }
}

fn entry_filename(key: &CacheKey) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.method.as_bytes());
    hasher.update(b" ");
    hasher.update(key.url.as_bytes());
    let digest = hasher.finalize();
    let mut name = String::with_capacity(digest.len() * 2 + ENTRY_EXTENSION.len() + 1);
    for byte in digest {
        let _ = write!(&mut name, "{byte:02x}");
    }
    name.push('.');
    name.push_str(ENTRY_EXTENSION);
    name
}

fn read_entry(path: &Path) -> Result<Option<(EntryHeader, Vec<u8>)>, CacheError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(CacheError::Persist(err.into())),
    };
    let corrupt = |reason: &str| CacheError::Corrupt {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };
    let split = raw
        .iter()
        .position(|byte| *byte == b'\n')
        .ok_or_else(|| corrupt("missing header line"))?;
    let header: EntryHeader =
        serde_json::from_slice(&raw[..split]).map_err(|err| corrupt(&err.to_string()))?;
    let body = raw[split + 1..].to_vec();
    Ok(Some((header, body)))
}

fn write_entry(
    dir: &Path,
    filename: &str,
    header: &EntryHeader,
    body: &[u8],
) -> Result<(), CacheError> {
    let header_json = serde_json::to_vec(header)?;
    AtomicFileWriter::new(dir.to_path_buf()).write(
        filename,
        &[header_json.as_slice(), b"\n".as_slice(), body],
    )?;
    Ok(())
}

async fn blocking<T, F>(task: F) -> Result<T, CacheError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, CacheError> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| CacheError::Task(err.to_string()))?
}

#[async_trait::async_trait]
impl DurableCache for DiskCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>, CacheError> {
        let key = CacheKey::for_request(request);
        let path = self.entry_path(&key);
        let entry = blocking(move || read_entry(&path)).await?;
        Ok(entry
            // A hash collision would surface as a mismatched key; treat as a miss.
            .filter(|(header, _)| header.key == key)
            .map(|(header, body)| Response {
                status: header.status,
                url: header.url,
                headers: header.headers,
                body: body.into(),
            }))
    }

    async fn put(&self, request: &Request, response: &Response) -> Result<(), CacheError> {
        let key = CacheKey::for_request(request);
        let filename = entry_filename(&key);
        let header = EntryHeader {
            key,
            status: response.status,
            url: response.url.clone(),
            headers: response.headers.clone(),
        };
        let body = response.body.clone();
        let dir = self.dir.clone();
        blocking(move || write_entry(&dir, &filename, &header, &body)).await
    }

    async fn delete(&self, request: &Request) -> Result<(), CacheError> {
        let path = self.entry_path(&CacheKey::for_request(request));
        blocking(move || match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CacheError::Persist(err.into())),
        })
        .await
    }

    async fn keys(&self) -> Result<Vec<CacheKey>, CacheError> {
        let dir = self.dir.clone();
        blocking(move || {
            let mut keys = Vec::new();
            let listing = fs::read_dir(&dir).map_err(|err| CacheError::Persist(err.into()))?;
            for entry in listing {
                let path = entry.map_err(|err| CacheError::Persist(err.into()))?.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                    continue;
                }
                if let Some((header, _)) = read_entry(&path)? {
                    keys.push(header.key);
                }
            }
            keys.sort();
            Ok(keys)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_names_are_stable_and_method_sensitive() {
        let get = CacheKey {
            method: "GET".into(),
            url: "https://app.test/a".into(),
        };
        let head = CacheKey {
            method: "HEAD".into(),
            url: "https://app.test/a".into(),
        };
        assert_eq!(entry_filename(&get), entry_filename(&get.clone()));
        assert_ne!(entry_filename(&get), entry_filename(&head));
        assert!(entry_filename(&get).ends_with(".entry"));
        assert_eq!(entry_filename(&get).len(), 64 + ".entry".len());
    }
}
