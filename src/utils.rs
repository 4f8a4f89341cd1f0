//! Utility functions and helpers shared by the loader

/// Whether a dataset base path refers to a remote HTTP resource
pub(crate) fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Join dataset path segments with forward slashes.
///
/// Bases may be URLs as well as filesystem paths, so this never goes through
/// `std::path` separators.
pub(crate) fn join_segments(base: &str, label: &str, file: &str) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), label, file)
}

/// The manifest location for a dataset base path
pub(crate) fn manifest_path(base: &str) -> String {
    format!("{}.json", base.trim_end_matches('/'))
}
