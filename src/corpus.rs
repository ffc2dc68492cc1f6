//! Corpus source: discover `.txt` files, read them, archive them afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::error::{MinerError, MinerResult};

/// One input document.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub path: Option<PathBuf>,
    pub text: String,
}

impl Document {
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            text: text.into(),
        }
    }
}

fn is_txt(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// A single file, or every `.txt` below a directory, sorted by path.
pub fn collect_files(path: &Path) -> MinerResult<Vec<PathBuf>> {
    if !path.exists() {
        return Err(MinerError::MissingPath(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!("skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_txt(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    Ok(files)
}

/// Read a UTF-8 text file into a [`Document`].
pub fn read_document(path: &Path) -> MinerResult<Document> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let text = fs::read_to_string(path).map_err(|e| MinerError::Document {
        name: name.clone(),
        reason: e.to_string(),
    })?;
    Ok(Document {
        name,
        path: Some(path.to_path_buf()),
        text,
    })
}

/// Move a consumed source into `archive_dir`, keeping its file name.
pub fn archive(path: &Path, archive_dir: &Path) -> MinerResult<PathBuf> {
    fs::create_dir_all(archive_dir)?;
    let file_name = path.file_name().ok_or_else(|| MinerError::Document {
        name: path.display().to_string(),
        reason: "source has no file name".to_string(),
    })?;
    let target = archive_dir.join(file_name);
    match fs::rename(path, &target) {
        Ok(()) => {}
        // Rename cannot cross filesystems.
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(path, &target)?;
            fs::remove_file(path)?;
        }
        Err(e) => return Err(e.into()),
    }
    info!("archived {} -> {}", path.display(), target.display());
    Ok(target)
}
