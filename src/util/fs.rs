//! Filesystem utilities.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use glob::glob;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in fs::read_dir(src)
        .with_context(|| format!("failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    src_path.display(),
                    dst_path.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Copy a single file, creating the destination's parent directory.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(src, dst)
        .with_context(|| format!("failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Make `path` an existing, empty directory.
///
/// Only the directory's contents are deleted; the directory itself is kept
/// (or created when missing).
pub fn clean_directory(path: &Path) -> Result<()> {
    ensure_dir(path)?;

    for entry in fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
    {
        let entry = entry?;
        let entry_path = entry.path();
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&entry_path)
        } else {
            fs::remove_file(&entry_path)
        };
        removed.with_context(|| format!("failed to delete {}", entry_path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// Write lines to a file, each terminated by `line_ending`.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S], line_ending: &str) -> Result<()> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line.as_ref());
        contents.push_str(line_ending);
    }
    write_string(path, &contents)
}

/// Find files matching glob patterns relative to a base directory.
pub fn glob_files(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for pattern in patterns {
        let full_pattern = base.join(pattern);
        let pattern_str = full_pattern.to_string_lossy();

        for entry in glob(&pattern_str)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
        {
            match entry {
                Ok(path) => {
                    if path.is_file() {
                        results.push(path);
                    }
                }
                Err(e) => {
                    tracing::warn!("glob error: {}", e);
                }
            }
        }
    }

    results.sort();
    results.dedup();
    Ok(results)
}

/// Archive entry name for `path` below `root`, always `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

#[cfg(unix)]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn unix_mode(metadata: &fs::Metadata) -> u32 {
    if metadata.is_dir() {
        0o755
    } else {
        0o644
    }
}

/// Compress the contents of `src_dir` into a zip archive at `target`.
///
/// Entry names are relative to `src_dir`; an existing `target` is replaced.
pub fn compress_to_zip(src_dir: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    let file = File::create(target)
        .with_context(|| format!("failed to create archive: {}", target.display()))?;
    let mut writer = ZipWriter::new(BufWriter::new(file));

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", src_dir.display()))?;
        let Some(name) = entry_name(src_dir, entry.path()) else {
            continue;
        };
        let metadata = entry.metadata()?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(unix_mode(&metadata));

        if metadata.is_dir() {
            writer
                .add_directory(format!("{}/", name), options)
                .with_context(|| format!("failed to add directory {} to archive", name))?;
        } else {
            writer
                .start_file(name.clone(), options)
                .with_context(|| format!("failed to add {} to archive", name))?;
            let mut input = File::open(entry.path())
                .with_context(|| format!("failed to open {}", entry.path().display()))?;
            io::copy(&mut input, &mut writer)
                .with_context(|| format!("failed to write {} to archive", name))?;
        }
    }

    let mut inner = writer
        .finish()
        .with_context(|| format!("failed to finish archive: {}", target.display()))?;
    inner.flush()?;
    Ok(())
}

/// Compress the contents of `src_dir` into a gzip-compressed tarball at `target`.
pub fn compress_to_tar_gz(src_dir: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    let file = File::create(target)
        .with_context(|| format!("failed to create archive: {}", target.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", src_dir.display()))?;
        let Some(name) = entry_name(src_dir, entry.path()) else {
            continue;
        };

        if entry.file_type().is_dir() {
            builder
                .append_dir(&name, entry.path())
                .with_context(|| format!("failed to add directory {} to archive", name))?;
        } else {
            builder
                .append_path_with_name(entry.path(), &name)
                .with_context(|| format!("failed to add {} to archive", name))?;
        }
    }

    let encoder = builder
        .into_inner()
        .with_context(|| format!("failed to finish archive: {}", target.display()))?;
    let mut inner = encoder.finish()?;
    inner.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn sample_tree(root: &Path) {
        fs::create_dir_all(root.join("bin")).unwrap();
        fs::create_dir_all(root.join("rt/lib/empty")).unwrap();
        fs::write(root.join("bin/app"), "exe").unwrap();
        fs::write(root.join("rt/lib/runtime.dll"), "runtime").unwrap();
        fs::write(root.join("README.txt"), "readme").unwrap();
    }

    fn relative_set(root: &Path) -> BTreeSet<PathBuf> {
        WalkDir::new(root)
            .into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.path() != root)
            .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn test_glob_files() {
        let tmp = TempDir::new().unwrap();
        let lib = tmp.path().join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("app.jar"), "jar").unwrap();
        fs::write(lib.join("util.jar"), "jar").unwrap();
        fs::write(lib.join("readme.txt"), "readme").unwrap();

        let files = glob_files(tmp.path(), &["lib/*.jar".to_string()]).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_copy_dir_all() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        sample_tree(&src);

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(relative_set(&src), relative_set(&dst));
        assert_eq!(fs::read_to_string(dst.join("bin/app")).unwrap(), "exe");
    }

    #[test]
    fn test_clean_directory_keeps_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("app");
        sample_tree(&dir);

        clean_directory(&dir).unwrap();

        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_clean_directory_creates_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b");

        clean_directory(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_write_lines_uses_line_ending() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scripts/install.bat");

        write_lines(&path, &["@echo off", "exit /b 0"], "\r\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "@echo off\r\nexit /b 0\r\n"
        );
    }

    #[test]
    fn test_zip_extracts_to_same_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("app");
        sample_tree(&src);
        let archive = tmp.path().join("out/app.zip");

        compress_to_zip(&src, &archive).unwrap();

        let extracted = tmp.path().join("unzipped");
        let mut zip = zip::ZipArchive::new(File::open(&archive).unwrap()).unwrap();
        zip.extract(&extracted).unwrap();

        assert_eq!(relative_set(&src), relative_set(&extracted));
        assert_eq!(
            fs::read_to_string(extracted.join("rt/lib/runtime.dll")).unwrap(),
            "runtime"
        );
    }

    #[test]
    fn test_tar_gz_extracts_to_same_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("app");
        sample_tree(&src);
        let archive = tmp.path().join("app.tar.gz");

        compress_to_tar_gz(&src, &archive).unwrap();

        let extracted = tmp.path().join("untarred");
        let decoder = flate2::read::GzDecoder::new(File::open(&archive).unwrap());
        tar::Archive::new(decoder).unpack(&extracted).unwrap();

        assert_eq!(relative_set(&src), relative_set(&extracted));
        assert_eq!(fs::read_to_string(extracted.join("bin/app")).unwrap(), "exe");
    }
}
