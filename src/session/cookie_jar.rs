//! Per-session file-backed cookie jar.
//!
//! # Responsibilities
//! - Ensure the jar directory exists before any transfer
//! - Map a session id to a jar file, `<dir>/curl_<session id>`
//! - Load cookies into outbound requests, store cookies from responses
//!
//! # Design Decisions
//! - One file per session: sessions never see each other's cookies
//! - The same session accumulates cookies across invocations
//! - An unreadable jar is treated as empty and overwritten on save
//! - Concurrent writers to the same session file are not synchronized

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use cookie_store::CookieStore;
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use thiserror::Error;
use url::Url;

use crate::session::provider::SessionId;

/// Cookie jar errors.
#[derive(Debug, Error)]
pub enum CookieJarError {
    #[error("cannot create cookie directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cookie path {0} exists and is not a directory")]
    NotADirectory(PathBuf),

    #[error("cannot write cookie jar {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Cookie jar file for one session.
#[derive(Debug, Clone)]
pub struct SessionCookieJar {
    path: PathBuf,
    session: SessionId,
}

impl SessionCookieJar {
    /// Open the jar for `session` under `dir`, creating `dir` if needed.
    pub fn open(dir: impl AsRef<Path>, session: SessionId) -> Result<Self, CookieJarError> {
        let dir = dir.as_ref();
        ensure_dir(dir)?;

        let path = jar_path(dir, &session);
        tracing::debug!(path = %path.display(), new_session = session.is_new(), "Cookie jar opened");
        Ok(Self { path, session })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Read the stored cookies. A missing or unreadable file yields an empty store.
    pub fn load(&self) -> CookieStore {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return CookieStore::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Cannot read cookie jar");
                return CookieStore::default();
            }
        };

        match cookie_store::serde::json::load_all(BufReader::new(file)) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt cookie jar");
                CookieStore::default()
            }
        }
    }

    /// Persist every cookie in `store`, session cookies included.
    pub fn save(&self, store: &CookieStore) -> Result<(), CookieJarError> {
        let write_error = |message: String| CookieJarError::Write {
            path: self.path.clone(),
            message,
        };

        let file = File::create(&self.path).map_err(|e| write_error(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        cookie_store::serde::json::save_incl_expired_and_nonpersistent(store, &mut writer)
            .map_err(|e| write_error(e.to_string()))?;
        writer.flush().map_err(|e| write_error(e.to_string()))
    }
}

/// `Cookie` header value for a request to `url`, if the store has matching cookies.
pub fn request_cookie_header(store: &CookieStore, url: &Url) -> Option<HeaderValue> {
    let value = store
        .get_request_values(url)
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ");

    if value.is_empty() {
        return None;
    }
    HeaderValue::from_str(&value).ok()
}

/// Store every parseable `Set-Cookie` from a response to `url`.
pub fn store_response_cookies(store: &mut CookieStore, headers: &HeaderMap, url: &Url) {
    let cookies = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| match cookie::Cookie::parse(v.to_string()) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::debug!(value = %v, error = %e, "Skipping unparseable Set-Cookie");
                None
            }
        });
    store.store_response_cookies(cookies, url);
}

fn jar_path(dir: &Path, session: &SessionId) -> PathBuf {
    dir.join(format!("curl_{}", session.as_str()))
}

fn ensure_dir(dir: &Path) -> Result<(), CookieJarError> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(CookieJarError::NotADirectory(dir.to_path_buf()));
    }
    fs::create_dir_all(dir).map_err(|source| CookieJarError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> SessionId {
        SessionId::existing(id).unwrap()
    }

    #[test]
    fn test_creates_nested_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a/b/jars");

        let jar = SessionCookieJar::open(&dir, session("s1")).unwrap();
        assert!(dir.is_dir());
        assert_eq!(jar.path(), dir.join("curl_s1"));

        // existing directory is fine
        assert!(SessionCookieJar::open(&dir, session("s1")).is_ok());
    }

    #[test]
    fn test_sessions_get_distinct_files() {
        let root = tempfile::tempdir().unwrap();
        let a = SessionCookieJar::open(root.path(), session("alice")).unwrap();
        let b = SessionCookieJar::open(root.path(), session("bob")).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_file_in_the_way_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("jars");
        fs::write(&blocker, b"not a dir").unwrap();

        let err = SessionCookieJar::open(&blocker, session("s1")).unwrap_err();
        assert!(matches!(err, CookieJarError::NotADirectory(_)));

        let err = SessionCookieJar::open(blocker.join("nested"), session("s1")).unwrap_err();
        assert!(matches!(err, CookieJarError::CreateDir { .. }));
    }

    #[test]
    fn test_missing_or_corrupt_jar_loads_empty() {
        let root = tempfile::tempdir().unwrap();
        let jar = SessionCookieJar::open(root.path(), session("s1")).unwrap();
        let url = Url::parse("http://backend.local/").unwrap();

        assert!(request_cookie_header(&jar.load(), &url).is_none());

        fs::write(jar.path(), b"{{ garbage").unwrap();
        assert!(request_cookie_header(&jar.load(), &url).is_none());
    }

    #[test]
    fn test_cookies_survive_save_and_load() {
        let root = tempfile::tempdir().unwrap();
        let jar = SessionCookieJar::open(root.path(), session("s1")).unwrap();
        let url = Url::parse("http://backend.local/app").unwrap();

        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("token=abc; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("theme=dark; Path=/"));

        let mut store = jar.load();
        store_response_cookies(&mut store, &headers, &url);
        jar.save(&store).unwrap();

        let reloaded = jar.load();
        let header = request_cookie_header(&reloaded, &url).unwrap();
        let header = header.to_str().unwrap();
        assert!(header.contains("token=abc"));
        assert!(header.contains("theme=dark"));

        let other = SessionCookieJar::open(root.path(), session("s2")).unwrap();
        assert!(request_cookie_header(&other.load(), &url).is_none());
    }
}
