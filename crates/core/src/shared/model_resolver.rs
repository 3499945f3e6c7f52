use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("download of {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to write model file to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(file_name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(&str, u64, u64) + Send>;

/// A file that belongs to a model directory, with the URL it is fetched from.
#[derive(Debug, Clone, Copy)]
pub struct ModelFile<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

/// Resolve a model directory by name, checking cache locations before downloading.
///
/// A directory only counts as resolved when every file in `files` is present.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Bundled directory (for development / pre-packaged installs)
/// 3. Download missing files into the cache
pub fn resolve_model_dir(
    name: &str,
    files: &[ModelFile<'_>],
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir()?.join(name);
    resolve_in(&cache_dir, files, bundled_dir, progress)
}

fn resolve_in(
    cache_dir: &Path,
    files: &[ModelFile<'_>],
    bundled_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if has_all_files(cache_dir, files) {
        return Ok(cache_dir.to_path_buf());
    }

    if let Some(dir) = bundled_dir {
        if has_all_files(dir, files) {
            return Ok(dir.to_path_buf());
        }
    }

    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    for file in files {
        let dest = cache_dir.join(file.name);
        if dest.exists() {
            continue;
        }
        log::info!("Downloading {} from {}", file.name, file.url);
        download(file.name, file.url, &dest, progress.as_ref())?;
    }
    Ok(cache_dir.to_path_buf())
}

fn has_all_files(dir: &Path, files: &[ModelFile<'_>]) -> bool {
    files.iter().all(|f| dir.join(f.name).is_file())
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/SalesCall Insights/models/`
/// - Linux: `$XDG_CACHE_HOME/SalesCall Insights/models/` or `~/.cache/SalesCall Insights/models/`
/// - Windows: `%LOCALAPPDATA%/SalesCall Insights/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("SalesCall Insights").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("SalesCall Insights").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(
    name: &str,
    url: &str,
    dest: &Path,
    progress: Option<&ProgressFn>,
) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url).map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;
    if !response.status().is_success() {
        return Err(ModelResolveError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    let chunk_size = 1024 * 1024; // 1MB
    for chunk in bytes.chunks(chunk_size) {
        file.write_all(chunk).map_err(|e| ModelResolveError::Write {
            path: temp_path.clone(),
            source: e,
        })?;
        downloaded += chunk.len() as u64;
        if let Some(cb) = progress {
            cb(name, downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
