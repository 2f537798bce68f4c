//! Filename sanitization for saved archives.

/// Longest file name most filesystems accept, in bytes.
const NAME_MAX: usize = 255;

/// Sanitizes a volume title for use as a file name.
///
/// - Replaces path separators, NUL, control characters, whitespace and the
///   characters `: * ? " < > |` with `_`
/// - Collapses runs of `_`
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = c.is_control()
            || c.is_whitespace()
            || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|');
        if bad {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
