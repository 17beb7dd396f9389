use crate::error::CompileError;
use tracing::debug;

use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Where a model, genspec or template lives: nowhere, a local path, or an
/// `http:`/`https:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileRef {
    Empty,
    File(PathBuf),
    Url(String),
}

pub fn is_url(path: &str) -> bool {
    path.starts_with("http:") || path.starts_with("https:")
}

/// `/...` or a drive-letter path such as `C:...`.
pub fn is_absolute_path(path: &str) -> bool {
    path.starts_with('/') || path.as_bytes().get(1) == Some(&b':')
}

fn trim_to_none(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn join(dir: &str, rest: &str) -> String {
    if dir.ends_with('/') || dir.ends_with('\\') {
        format!("{}{}", dir, rest)
    } else {
        format!("{}/{}", dir, rest)
    }
}

impl FileRef {
    /// Resolves `file` against an optional base directory and subdirectory.
    ///
    /// An absolute or URL `file` ignores both; an absolute or URL `subdir`
    /// replaces `base`. A blank `file` gives [`FileRef::Empty`].
    pub fn resolve(base: Option<&str>, subdir: Option<&str>, file: Option<&str>) -> FileRef {
        let Some(file) = trim_to_none(file) else {
            return FileRef::Empty;
        };
        if is_absolute_path(file) || is_url(file) {
            return FileRef::from_str_path(file);
        }
        let dir = match (trim_to_none(base), trim_to_none(subdir)) {
            (None, subdir) => subdir.map(str::to_string),
            (Some(base), None) => Some(base.to_string()),
            (Some(_), Some(subdir)) if is_absolute_path(subdir) || is_url(subdir) => Some(subdir.to_string()),
            (Some(base), Some(subdir)) => Some(join(base, subdir)),
        };
        match dir {
            Some(dir) => FileRef::from_str_path(&join(&dir, file)),
            None => FileRef::from_str_path(file),
        }
    }

    pub fn from_str_path(path: &str) -> FileRef {
        if is_url(path) {
            FileRef::Url(path.to_string())
        } else {
            FileRef::File(PathBuf::from(path))
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FileRef::Empty)
    }

    pub fn is_url(&self) -> bool {
        matches!(self, FileRef::Url(_))
    }

    /// Last path segment.
    pub fn file_name(&self) -> Option<String> {
        match self {
            FileRef::Empty => None,
            FileRef::File(path) => path.file_name().map(|n| n.to_string_lossy().into_owned()),
            FileRef::Url(url) => url
                .rsplit('/')
                .next()
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }

    /// The file name without a trailing `.thrift`.
    pub fn model_name(&self) -> Option<String> {
        self.file_name().map(|name| match name.strip_suffix(".thrift") {
            Some(stem) => stem.to_string(),
            None => name,
        })
    }

    /// The directory (or URL directory) containing this reference.
    pub fn parent(&self) -> FileRef {
        match self {
            FileRef::Empty => FileRef::Empty,
            FileRef::File(path) => match path.parent() {
                Some(dir) => FileRef::File(dir.to_path_buf()),
                None => FileRef::File(PathBuf::new()),
            },
            FileRef::Url(url) => match url.rfind('/') {
                Some(i) => FileRef::Url(url[..i].to_string()),
                None => FileRef::Url(url.clone()),
            },
        }
    }

    /// `name` inside this directory. Absolute paths and URLs stand alone.
    pub fn child(&self, name: &str) -> FileRef {
        if is_absolute_path(name) || is_url(name) {
            return FileRef::from_str_path(name);
        }
        match self {
            FileRef::Empty => FileRef::from_str_path(name),
            FileRef::File(dir) if dir.as_os_str().is_empty() => FileRef::File(PathBuf::from(name)),
            FileRef::File(dir) => FileRef::File(dir.join(name)),
            FileRef::Url(url) => FileRef::Url(join(url, name)),
        }
    }

    pub fn read_to_string(&self) -> Result<String, CompileError> {
        match self {
            FileRef::Empty => Err(CompileError::Io {
                file:   String::new(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no file specified"),
            }),
            FileRef::File(path) => {
                debug!("reading {}", path.display());
                fs::read_to_string(path).map_err(|source| CompileError::Io {
                    file: path.display().to_string(),
                    source,
                })
            }
            FileRef::Url(url) => {
                debug!("fetching {}", url);
                let fetch = |source| CompileError::Fetch { url: url.clone(), source };
                reqwest::blocking::get(url)
                    .and_then(|resp| resp.error_for_status())
                    .and_then(|resp| resp.text())
                    .map_err(fetch)
            }
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileRef::Empty => Ok(()),
            FileRef::File(path) => write!(f, "{}", path.display()),
            FileRef::Url(url) => f.write_str(url),
        }
    }
}
