//! Utility functions for working with source paths and URLs
//!
//! Source maps name their sources with URL-style paths. These helpers keep
//! every path the generator sees in that form.

/// Convert a filesystem path to the URL-style path stored in a source map
///
/// Backslashes become slashes and a leading drive letter becomes a root
/// slash (`C:\css\a.css` -> `/css/a.css`). POSIX paths are returned as is.
pub fn to_url_path(path: &str) -> String {
    let has_drive = path.len() >= 2
        && path.as_bytes()[0].is_ascii_alphabetic()
        && path.as_bytes()[1] == b':';

    if !has_drive && !path.contains('\\') {
        return path.to_string();
    }

    let slashed = path.replace('\\', "/");
    if has_drive {
        let rest = &slashed[2..];
        format!("/{}", rest.strip_prefix('/').unwrap_or(rest))
    } else {
        slashed
    }
}

/// Directory part of a URL-style path, `.` when there is none
pub fn url_dirname(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.starts_with('/') { "/" } else { "." }.to_string();
    }

    match trimmed.rfind('/') {
        Some(0) => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
        None => ".".to_string(),
    }
}

/// Collapse `.` and `..` segments of a relative or root-relative path
///
/// Absolute URLs (`scheme://...`, `data:`) are returned unchanged.
pub fn normalize_url_path(path: &str) -> String {
    if is_absolute_url(path) {
        return path.to_string();
    }

    let absolute = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => {
                    if !absolute {
                        parts.push("..");
                    }
                }
            },
            _ => parts.push(part),
        }
    }

    let joined = parts.join("/");
    if absolute {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Resolve `path` against the directory URL `root`
pub fn join_url(root: &str, path: &str) -> String {
    if is_absolute_url(path) || path.starts_with('/') {
        return path.to_string();
    }

    let root = if root.is_empty() { "." } else { root };
    normalize_url_path(&format!("{}/{}", root.trim_end_matches('/'), path))
}

pub(crate) fn is_absolute_url(path: &str) -> bool {
    path.starts_with("data:") || path.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_path_posix_unchanged() {
        assert_eq!(to_url_path("css/site.css"), "css/site.css");
        assert_eq!(to_url_path("/abs/site.css"), "/abs/site.css");
    }

    #[test]
    fn test_to_url_path_windows() {
        assert_eq!(to_url_path(r"C:\css\site.css"), "/css/site.css");
        assert_eq!(to_url_path(r"css\site.css"), "css/site.css");
        assert_eq!(to_url_path("d:site.css"), "/site.css");
    }

    #[test]
    fn test_url_dirname() {
        assert_eq!(url_dirname("source.css"), ".");
        assert_eq!(url_dirname("css/site.css"), "css");
        assert_eq!(url_dirname("/site.css"), "/");
        assert_eq!(url_dirname("a/b/c.css"), "a/b");
    }

    #[test]
    fn test_normalize_url_path() {
        assert_eq!(normalize_url_path("./a.scss"), "a.scss");
        assert_eq!(normalize_url_path("css/../scss/a.scss"), "scss/a.scss");
        assert_eq!(normalize_url_path("../a.scss"), "../a.scss");
        assert_eq!(normalize_url_path("/x/../a.scss"), "/a.scss");
        assert_eq!(normalize_url_path("a/.."), ".");
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url(".", "a.scss"), "a.scss");
        assert_eq!(join_url("css", "../scss/a.scss"), "scss/a.scss");
        assert_eq!(join_url("css/", "a.scss"), "css/a.scss");
        assert_eq!(join_url("css", "/abs.scss"), "/abs.scss");
        assert_eq!(join_url("css", "http://x.test/a.scss"), "http://x.test/a.scss");
        assert_eq!(join_url("", "a.scss"), "a.scss");
    }
}
