//! Keyword search over a single text file
//!
//! validate -> resolve -> read -> scan. Each stage short-circuits with a
//! `SearchError`, so a caller sees either the full result or one error.

use serde::Serialize;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use super::error::{Result, SearchError};

/// Arguments of one `search_in_file` invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub file_path: String,
    pub keyword: String,
    pub case_sensitive: bool,
}

/// A matching line, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchLine {
    pub line_number: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub file_path: String,
    pub keyword: String,
    pub case_sensitive: bool,
    pub total_matches: usize,
    pub matches: Vec<MatchLine>,
}

impl SearchRequest {
    pub fn new(file_path: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            keyword: keyword.into(),
            case_sensitive: false,
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Build a request from a tool-call arguments mapping.
    ///
    /// Values of the wrong JSON type count as absent; `caseSensitive` falls
    /// back to `false`.
    pub fn from_arguments(args: &Map<String, Value>) -> Result<Self> {
        let file_path = args
            .get("filePath")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());
        let keyword = args
            .get("keyword")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty());

        let (file_path, keyword) = match (file_path, keyword) {
            (Some(p), Some(k)) => (p, k),
            _ => return Err(SearchError::MissingArgument),
        };

        let case_sensitive = match args.get("caseSensitive") {
            None | Some(Value::Null) => false,
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                log::warn!(
                    "caseSensitive is not a boolean ({}), matching case-insensitively",
                    other
                );
                false
            }
        };

        Ok(Self::new(file_path, keyword).with_case_sensitive(case_sensitive))
    }
}

/// Payload sent in place of a `SearchResult` when an invocation fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResult {
    pub error: String,
}

impl From<&SearchError> for ErrorResult {
    fn from(err: &SearchError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Tool entry point: arguments mapping in, indented JSON out
pub fn search_in_file(args: &Map<String, Value>) -> Result<String> {
    let request = SearchRequest::from_arguments(args)?;
    let result = search_file(&request)?;
    Ok(serde_json::to_string_pretty(&result)?)
}

/// Run a validated request against the filesystem
pub fn search_file(request: &SearchRequest) -> Result<SearchResult> {
    if request.file_path.is_empty() || request.keyword.is_empty() {
        return Err(SearchError::MissingArgument);
    }

    let resolved = resolve_path(Path::new(&request.file_path))?;

    match resolved.try_exists() {
        Ok(true) => {}
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Err(e.into()),
        _ => return Err(SearchError::FileNotFound(resolved)),
    }

    let text = read_text(&resolved)?;
    let matches = scan_lines(split_lines(&text), &request.keyword, request.case_sensitive);

    log::debug!(
        "search_in_file: {} match(es) for {:?} in {}",
        matches.len(),
        request.keyword,
        resolved.display()
    );

    Ok(SearchResult {
        file_path: resolved.to_string_lossy().into_owned(),
        keyword: request.keyword.clone(),
        case_sensitive: request.case_sensitive,
        total_matches: matches.len(),
        matches,
    })
}

/// Make `path` absolute and free of symlinks and `.`/`..` components.
///
/// Unlike `Path::canonicalize` this does not require the path to exist: the
/// existing prefix is canonicalized and the rest is appended lexically.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if let Ok(canonical) = absolute.canonicalize() {
        return Ok(canonical);
    }

    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => {
                resolved.push(name);
                if let Ok(real) = resolved.canonicalize() {
                    resolved = real;
                }
            }
        }
    }

    Ok(resolved)
}

fn read_text(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(text)
}

/// Split on `\n`, `\r\n` and lone `\r`, yielding lines without terminators.
pub fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

pub struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.find(&['\n', '\r'][..]) {
            Some(end) => {
                let line = &self.rest[..end];
                let terminator = if self.rest[end..].starts_with("\r\n") {
                    2
                } else {
                    1
                };
                self.rest = &self.rest[end + terminator..];
                Some(line)
            }
            None => {
                let line = self.rest;
                self.rest = "";
                Some(line)
            }
        }
    }
}

/// Collect the lines containing `keyword`, in order, numbered from 1.
///
/// Case-insensitive matching lowercases both sides; the returned content is
/// always the original line.
pub fn scan_lines<'a, I>(lines: I, keyword: &str, case_sensitive: bool) -> Vec<MatchLine>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = fold(keyword, case_sensitive);

    lines
        .into_iter()
        .enumerate()
        .filter(|(_, line)| fold(line, case_sensitive).contains(needle.as_ref()))
        .map(|(index, line)| MatchLine {
            line_number: index + 1,
            content: line.to_string(),
        })
        .collect()
}

fn fold(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}
