use std::fmt;

/// Name used when the client sends no usable filename
pub const FALLBACK_FILENAME: &str = "uploaded_file";

/// Longest stored name, in bytes
const MAX_FILENAME_BYTES: usize = 255;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub code: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates file size against maximum limit
pub fn validate_file_size(size: usize, max_size: usize) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError {
            code: "FILE_TOO_LARGE",
            message: format!(
                "File size {} bytes exceeds maximum allowed {} bytes ({} MB)",
                size,
                max_size,
                max_size / 1024 / 1024
            ),
        });
    }
    Ok(())
}

/// Sanitizes a client supplied filename so it can be joined onto the upload
/// directory. Never fails: unusable names collapse to [`FALLBACK_FILENAME`].
pub fn sanitize_filename(filename: &str) -> String {
    // Only the last path component survives
    let name = filename.rsplit('/').next().unwrap_or("");

    if name != filename {
        tracing::warn!("Path components stripped from upload name: {:?}", filename);
    }

    let sanitized: String = name
        .chars()
        .map(|c| if c.is_control() || c == '\\' { '_' } else { c })
        .collect();

    let (stem, suffix) = split_name(&sanitized);
    let sanitized = fit_name(stem, "", suffix);

    match sanitized.trim() {
        "" | "." | ".." => FALLBACK_FILENAME.to_string(),
        _ => sanitized,
    }
}

/// Joins `stem + tag + suffix`, shortening the stem so the result fits in
/// [`MAX_FILENAME_BYTES`]. The suffix is dropped into the stem only when it
/// cannot fit on its own.
fn fit_name(stem: &str, tag: &str, suffix: &str) -> String {
    if tag.len() + suffix.len() > MAX_FILENAME_BYTES {
        let whole = format!("{}{}", stem, suffix);
        let base = truncate_bytes(&whole, MAX_FILENAME_BYTES.saturating_sub(tag.len()));
        return format!("{}{}", base, tag);
    }

    let stem = truncate_bytes(stem, MAX_FILENAME_BYTES - tag.len() - suffix.len());
    format!("{}{}{}", stem, tag, suffix)
}

/// Cuts `s` to at most `max` bytes without splitting a UTF-8 character.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Splits a filename into stem and suffix, the suffix keeping its dot.
/// Dot-files such as `.bashrc` have no suffix.
pub fn split_name(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename, ""),
    }
}

/// Returns the `attempt`-th candidate stored name: the name itself first,
/// then `stem_1.ext`, `stem_2.ext`, ... The stem is shortened so a suffixed
/// candidate still fits in 255 bytes.
pub fn candidate_name(filename: &str, attempt: u32) -> String {
    if attempt == 0 {
        return filename.to_string();
    }
    let (stem, suffix) = split_name(filename);
    fit_name(stem, &format!("_{}", attempt), suffix)
}
