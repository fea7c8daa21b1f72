//! Input discovery: expand CLI arguments into the list of candidate logs.

use crate::error::Result;
use glob::glob;
use log::{debug, warn};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recognized flight-log extension (case-insensitive).
pub const LOG_EXTENSION: &str = "ulg";

/// Maximum recursion depth to prevent stack overflow
const MAX_RECURSION_DEPTH: usize = 100;

/// Recursively find every `.ulg` file under `root`, depth-first.
///
/// A missing or unreadable root is an error, never an empty result.
/// Unreadable subdirectories below the root are logged and skipped.
/// Results are sorted for a deterministic batch order.
pub fn discover_log_files(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(root)?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a directory: {}", root.display()),
        )
        .into());
    }

    let mut found = Vec::new();
    walk_dir(root, 0, &mut found)?;
    found.sort();
    Ok(found)
}

fn walk_dir(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) -> Result<()> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(io::Error::other(format!(
            "maximum directory depth exceeded ({}) under {}",
            MAX_RECURSION_DEPTH,
            dir.display()
        ))
        .into());
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if depth == 0 => return Err(err.into()),
        Err(err) => {
            warn!("skipping unreadable directory {}: {}", dir.display(), err);
            return Ok(());
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("skipping unreadable entry in {}: {}", dir.display(), err);
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            walk_dir(&path, depth + 1, found)?;
        } else if is_log_file(&path) {
            debug!("found log file {}", path.display());
            found.push(path);
        }
    }

    Ok(())
}

/// True when the file name carries the recognized log extension.
pub fn is_log_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(LOG_EXTENSION))
        .unwrap_or(false)
}

/// Expand CLI inputs to concrete log files. Each input may be a literal
/// file, a directory (walked recursively), or a glob pattern whose matches
/// are treated the same way. Duplicates are removed.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut out = BTreeSet::new();

    for input in inputs {
        if input.contains('*') || input.contains('?') || input.contains('[') {
            let matches = glob(input).map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("invalid glob pattern '{}': {}", input, err),
                )
            })?;
            for entry in matches {
                let path = entry.map_err(glob::GlobError::into_error)?;
                push_input(&path, &mut out)?;
            }
        } else {
            push_input(Path::new(input), &mut out)?;
        }
    }

    Ok(out.into_iter().collect())
}

fn push_input(path: &Path, out: &mut BTreeSet<PathBuf>) -> Result<()> {
    if path.is_dir() {
        out.extend(discover_log_files(path)?);
    } else if path.is_file() {
        if is_log_file(path) {
            out.insert(path.to_path_buf());
        } else {
            warn!("ignoring input without .{} extension: {}", LOG_EXTENSION, path.display());
        }
    } else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("input not found: {}", path.display()),
        )
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"").expect("write test file");
    }

    #[test]
    fn test_discovery_recurses_and_filters_extension() {
        let dir = TempDir::new().expect("create temp dir");
        let nested = dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&nested).expect("create nested dirs");

        touch(&dir.path().join("flight1.ulg"));
        touch(&dir.path().join("notes.txt"));
        touch(&nested.join("flight2.ULG"));
        touch(&nested.join("flight3.csv"));

        let found = discover_log_files(dir.path()).expect("walk succeeds");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| is_log_file(p)));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().expect("create temp dir");
        let missing = dir.path().join("does-not-exist");
        let err = discover_log_files(&missing).unwrap_err();
        match err {
            PipelineError::Io(io_err) => {
                assert_eq!(io_err.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_root_must_be_a_directory() {
        let dir = TempDir::new().expect("create temp dir");
        let file = dir.path().join("flight.ulg");
        touch(&file);
        assert!(discover_log_files(&file).is_err());
    }

    #[test]
    fn test_expand_inputs_mixes_files_dirs_and_globs() {
        let dir = TempDir::new().expect("create temp dir");
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).expect("create subdir");
        let direct = dir.path().join("direct.ulg");
        touch(&direct);
        touch(&sub.join("nested.ulg"));
        touch(&sub.join("other.bin"));

        let inputs = vec![
            direct.to_string_lossy().into_owned(),
            sub.to_string_lossy().into_owned(),
            // direct.ulg again through a glob; deduplicated below
            format!("{}/*.ulg", dir.path().display()),
        ];
        let files = expand_inputs(&inputs).expect("expand succeeds");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_expand_inputs_rejects_missing_file() {
        let inputs = vec!["/no/such/flight.ulg".to_string()];
        assert!(expand_inputs(&inputs).is_err());
    }
}
