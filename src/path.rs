//! Path resolution against the archive's current directory
//!
//! Paths are plain strings compared byte for byte. Nothing here collapses
//! `.`, `..`, repeated or trailing slashes: `/docs` and `/docs/` name two
//! different directories.

/// Resolve `input` against `cwd`
///
/// An empty input resolves to `cwd`, an input starting with `/` is already
/// absolute, anything else is appended to `cwd` after a single separator.
pub fn normalize(input: &str, cwd: &str) -> String {
    if input.is_empty() {
        return cwd.to_string();
    }
    if input.starts_with('/') {
        return input.to_string();
    }
    if cwd.ends_with('/') {
        format!("{}{}", cwd, input)
    } else {
        format!("{}/{}", cwd, input)
    }
}

/// Text after the last `/`
pub fn leaf_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Leaf name of a host path; accepts both `/` and `\` separators
pub fn source_leaf_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// True if `dir_path` sits exactly one level below `cwd`
///
/// `dir_path` must extend `cwd`, and no `/` may appear past the character
/// right after the prefix. That character is not required to be a separator,
/// so `/docsx` counts as a child of `/docs`.
pub fn is_direct_child(dir_path: &str, cwd: &str) -> bool {
    if dir_path == cwd {
        return false;
    }
    let Some(rest) = dir_path.strip_prefix(cwd) else {
        return false;
    };
    let mut chars = rest.chars();
    chars.next();
    !chars.as_str().contains('/')
}
