//! Download cache: remote resources materialized as local files
//!
//! Files are named `<hash8>_<basename>` so two URLs with the same basename
//! never collide. Gzip resources are stored decompressed. Every download goes
//! to `<name>.tmp` first and is renamed into place only when complete, so a
//! file present under its final name is always whole.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use indicatif::ProgressBar;

use crate::progress::upgrade_to_bar;
use crate::stream::{ByteCounter, Download, StreamError};

/// Copy buffer size (64KB)
const COPY_BUF_SIZE: usize = 64 * 1024;

/// Whether the resource at `url` is gzip-compressed at rest
pub fn is_gzip_url(url: &str) -> bool {
    strip_query(url).ends_with(".gz")
}

fn strip_query(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or(url)
}

/// Hex chars of the blake3 URL digest kept in cache file names
const URL_TAG_LEN: usize = 8;

fn url_tag(url: &str) -> String {
    blake3::hash(url.as_bytes()).to_hex()[..URL_TAG_LEN].to_string()
}

/// Local file name for a cached resource (`.gz` suffix dropped)
pub fn cache_file_name(url: &str) -> String {
    let path = strip_query(url);
    let base = path
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("resource");
    let base = base.strip_suffix(".gz").unwrap_or(base);
    format!("{}_{base}", url_tag(url))
}

/// Return the cached copy of `url`, downloading (and gunzipping) it first if
/// absent.
///
/// `new_bar` is only called on a miss; the bar is cleared once the download
/// ends.
pub fn fetch_cached(
    url: &str,
    cache_dir: &Path,
    new_bar: impl FnOnce() -> ProgressBar,
) -> Result<PathBuf, StreamError> {
    fs::create_dir_all(cache_dir)?;
    let name = cache_file_name(url);
    let final_path = cache_dir.join(&name);
    if final_path.is_file() {
        log::debug!("cache hit: {url} -> {}", final_path.display());
        return Ok(final_path);
    }

    let tmp_path = cache_dir.join(format!("{name}.tmp"));
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }

    log::info!("Downloading {url}");
    let pb = new_bar();
    let written = download_to(url, &tmp_path, &pb);
    pb.finish_and_clear();
    let written = written?;
    fs::rename(&tmp_path, &final_path)?;
    log::info!("Saved {} ({written} bytes)", final_path.display());
    Ok(final_path)
}

/// Stream `url` into `dest`, decompressing gzip resources on the fly.
///
/// Returns the number of (decompressed) bytes written.
pub fn download_to(url: &str, dest: &Path, pb: &ProgressBar) -> Result<u64, StreamError> {
    let mut body = Download::open(url, is_gzip_url(url))?;
    if let Some(total) = body.content_length {
        upgrade_to_bar(pb, total);
    }
    let counter = body.counter();

    let mut out = BufWriter::new(File::create(dest)?);
    let written = copy_with_progress(&mut body, &mut out, &counter, pb)?;
    out.flush()?;
    Ok(written)
}

fn copy_with_progress(
    reader: &mut impl Read,
    writer: &mut impl Write,
    counter: &ByteCounter,
    pb: &ProgressBar,
) -> io::Result<u64> {
    let mut buf = vec![0u8; COPY_BUF_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buf[..n])?;
        written += n as u64;
        pb.set_position(counter.load(Ordering::Relaxed));
    }
    Ok(written)
}

/// Remove stale .tmp files in the cache directory
pub fn cleanup_tmp_files(cache_dir: &Path) -> io::Result<()> {
    if !cache_dir.is_dir() {
        return Ok(());
    }
    for entry in fs::read_dir(cache_dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn gzip_url_detection() {
        assert!(is_gzip_url("https://host/data/candidate_entities.json.gz"));
        assert!(is_gzip_url("https://host/a.json.gz?download=1"));
        assert!(!is_gzip_url("https://host/data/train_questions.json"));
    }

    #[test]
    fn cache_name_drops_gz_suffix() {
        let name = cache_file_name("https://host/data/candidate_entities.json.gz");
        assert!(name.ends_with("_candidate_entities.json"));
        assert_eq!(name.len(), URL_TAG_LEN + 1 + "candidate_entities.json".len());
    }

    #[test]
    fn cache_name_distinguishes_same_basename() {
        let a = cache_file_name("https://a.example/train.json");
        let b = cache_file_name("https://b.example/train.json");
        assert_ne!(a, b);
        assert!(a.ends_with("_train.json"));
    }

    #[test]
    fn url_tag_is_stable_hex() {
        let tag = url_tag("https://host/train.json");
        assert_eq!(tag, url_tag("https://host/train.json"));
        assert_eq!(tag.len(), URL_TAG_LEN);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cache_name_without_basename() {
        assert!(cache_file_name("https://host/").ends_with("_resource"));
    }

    #[test]
    fn fetch_cached_hits_existing_file() {
        let dir = TempDir::new().unwrap();
        let url = "https://unreachable.invalid/train.json";
        let path = dir.path().join(cache_file_name(url));
        std::fs::write(&path, b"[]").unwrap();

        let got = fetch_cached(url, dir.path(), || panic!("no bar on a cache hit")).unwrap();
        assert_eq!(got, path);
    }

    #[test]
    fn fetch_cached_creates_bar_only_on_miss() {
        let dir = TempDir::new().unwrap();
        let bars = std::cell::Cell::new(0);
        let res = fetch_cached("http://127.0.0.1:9/train.json", dir.path(), || {
            bars.set(bars.get() + 1);
            ProgressBar::hidden()
        });
        assert!(res.is_err());
        assert_eq!(bars.get(), 1);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn copy_with_progress_copies_everything() {
        let data = vec![7u8; COPY_BUF_SIZE * 2 + 13];
        let counter = Arc::new(AtomicU64::new(0));
        let mut out = Vec::new();
        let n = copy_with_progress(
            &mut &data[..],
            &mut out,
            &counter,
            &ProgressBar::hidden(),
        )
        .unwrap();
        assert_eq!(n as usize, data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn cleanup_tmp_files_removes_only_tmp() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json.tmp"), b"stale").unwrap();
        std::fs::write(dir.path().join("b.json"), b"keep").unwrap();

        cleanup_tmp_files(dir.path()).unwrap();

        assert!(!dir.path().join("a.json.tmp").exists());
        assert!(dir.path().join("b.json").exists());
    }

    #[test]
    fn cleanup_tmp_files_missing_dir_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(cleanup_tmp_files(&dir.path().join("nope")).is_ok());
    }
}
