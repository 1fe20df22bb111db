//! Capability-scoped filesystem helpers shared by the data adapters and the
//! `fuelstop` binary.
//!
//! Paths arrive as UTF-8 (`camino`) and are resolved against an ambient root
//! directory opened through `cap-std`, so every access goes through a
//! directory handle rather than the process-wide filesystem namespace.
#![forbid(unsafe_code)]

use std::io;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open an existing file for reading.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Open the directory containing `path` and return it with the final path
/// component.
///
/// A bare file name resolves against the working directory.
pub fn open_parent_dir(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, file_name))
}

/// Create every missing directory above `path`.
///
/// Succeeds without touching the filesystem when `path` has no parent or the
/// parent is a filesystem root.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    let (root, relative) = split_ambient_root(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    root.create_dir_all(&relative)
}

/// Whether `path` names an existing regular file.
///
/// Missing parents surface as [`io::ErrorKind::NotFound`] so callers can tell
/// an absent input from an unreadable one.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_parent_dir(path)?;
    match dir.metadata(name.as_str()) {
        Ok(meta) => Ok(meta.is_file()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split `path` into an opened root directory and the remainder relative to
/// it.
///
/// Absolute paths open their root (`/`, or a drive prefix on Windows);
/// relative paths open the working directory.
pub fn split_ambient_root(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut root = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(prefix) => root.push(prefix.as_str()),
            Utf8Component::RootDir => root.push(std::path::MAIN_SEPARATOR_STR),
            other => relative.push(other.as_str()),
        }
    }
    if root.as_str().is_empty() {
        root.push(".");
    }
    let dir = fs_utf8::Dir::open_ambient_dir(&root, ambient_authority())?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::io::Read;
    use tempfile::TempDir;

    #[fixture]
    fn workspace() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        (dir, root)
    }

    #[rstest]
    fn ensure_parent_dir_creates_nested_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let target = root.join("a/b/c/stations.db");

        ensure_parent_dir(&target).expect("create parents");

        assert!(root.join("a/b/c").is_dir());
        assert!(!target.exists(), "only the parents should be created");
    }

    #[rstest]
    #[case("stations.db")]
    #[case("/")]
    fn ensure_parent_dir_is_a_no_op_without_parents(#[case] path: &str) {
        ensure_parent_dir(Utf8Path::new(path)).expect("nothing to create");
    }

    #[rstest]
    fn is_regular_file_distinguishes_files_and_directories(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("prices.csv");
        std::fs::write(&file, b"id\n").expect("write file");

        assert!(is_regular_file(&file).expect("inspect file"));
        assert!(!is_regular_file(&root.join("missing.csv")).expect("inspect missing"));
        std::fs::create_dir(root.join("folder")).expect("create folder");
        assert!(!is_regular_file(&root.join("folder")).expect("inspect folder"));
    }

    #[rstest]
    fn is_regular_file_reports_missing_parent(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let err = is_regular_file(&root.join("nope/prices.csv")).expect_err("missing parent");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[rstest]
    fn open_utf8_file_reads_contents(workspace: (TempDir, Utf8PathBuf)) {
        let (_guard, root) = workspace;
        let file = root.join("note.txt");
        std::fs::write(&file, b"diesel").expect("write file");

        let mut contents = String::new();
        open_utf8_file(&file)
            .expect("open file")
            .read_to_string(&mut contents)
            .expect("read file");

        assert_eq!(contents, "diesel");
    }

    #[rstest]
    fn open_parent_dir_rejects_paths_without_file_names() {
        let err = open_parent_dir(Utf8Path::new("/")).expect_err("root has no file name");
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }

    #[cfg(unix)]
    #[rstest]
    fn split_ambient_root_separates_absolute_paths() {
        let (_dir, relative) =
            split_ambient_root(Utf8Path::new("/tmp/fuelstop/data")).expect("open root");
        assert_eq!(relative, Utf8PathBuf::from("tmp/fuelstop/data"));
    }
}
