use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::Result;

/// A directory on the host filesystem and its entries.
#[derive(Debug, Clone)]
pub struct Directory {
    path: PathBuf,
}

impl Directory {
    /// Open an existing directory; the path is canonicalised.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = fs::canonicalize(path)?;
        if !path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", path.display()),
            )
            .into());
        }
        Ok(Directory { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full paths of every entry, sorted by name.
    pub fn list_entries(&self) -> Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<PathBuf>>>()?;
        entries.sort();
        Ok(entries)
    }

    /// Files whose extension equals `suffix` (given without the dot).
    pub fn filter_by_suffix(&self, suffix: &str, ignore_case: bool) -> Result<Vec<PathBuf>> {
        Ok(self
            .list_entries()?
            .into_iter()
            .filter(|p| p.is_file() && has_suffix(p, suffix, ignore_case))
            .collect())
    }
}

pub fn has_suffix(path: &Path, suffix: &str, ignore_case: bool) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ignore_case => ext.eq_ignore_ascii_case(suffix),
        Some(ext) => ext == suffix,
        None => false,
    }
}

/// Locate an executable on `PATH`.
pub fn resolve_executable(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Expand directories into their files carrying `suffix`; plain files pass
/// through untouched.
pub fn expand_inputs(inputs: &[PathBuf], suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(Directory::open(input)?.filter_by_suffix(suffix, true)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_entries_by_suffix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().to_path_buf();
        for name in ["b.fuzznuc", "a.FUZZNUC", "c.json", "d"] {
            fs::write(dir.join(name), "").unwrap();
        }
        fs::create_dir(dir.join("e.fuzznuc")).unwrap();

        let directory = Directory::open(&dir).unwrap();
        assert_eq!(directory.list_entries().unwrap().len(), 5);

        let exact = directory.filter_by_suffix("fuzznuc", false).unwrap();
        assert_eq!(exact, vec![directory.path().join("b.fuzznuc")]);

        let any_case = directory.filter_by_suffix("fuzznuc", true).unwrap();
        assert_eq!(any_case.len(), 2);

        let expanded = expand_inputs(&[dir.clone(), dir.join("c.json")], "json").unwrap();
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn missing_directory_is_an_error() {
        assert!(Directory::open("/definitely/not/here").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn resolves_executables_on_path() {
        assert!(resolve_executable("sh").is_some());
        assert!(resolve_executable("surely-not-an-installed-binary").is_none());
    }
}
