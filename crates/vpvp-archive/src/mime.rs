//! Content types for archive entries.

/// Fallback for unknown extensions.
pub const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    (".css", "text/css"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".gif", "image/gif"),
    (".txt", "text/plain"),
    (".js", "text/javascript"),
    (".html", "text/html"),
    (".json", "application/json"),
];

/// Content type for an entry name, chosen by its extension.
pub fn mime_for(name: &str) -> &'static str {
    MIME_TYPES
        .iter()
        .find(|&&(ext, _)| name.ends_with(ext))
        .map_or(DEFAULT_MIME, |&(_, mime)| mime)
}
