//! Naming rules for uploaded artworks.
//!
//! Browsers send whatever filename the user's machine had, and users type
//! whatever title they like. Everything that ends up as a storage key goes
//! through [`sanitize_filename`]; everything shown back to a client goes
//! through [`display_title`].

/// Characters kept by the sanitizer besides alphanumerics.
const KEPT: &[char] = &[' ', '.', '-', '_'];

/// Sanitize a user-supplied filename or title into a safe storage name.
///
/// The input is percent-decoded, reduced to its final path component (a
/// browser may send `C:\photos\cat.jpg`), stripped down to alphanumerics
/// plus space/dot/dash/underscore, and whitespace-collapsed. Returns
/// `None` when nothing safe remains.
///
/// # Example
///
/// ```
/// use gallery_server::gallery::sanitize_filename;
///
/// assert_eq!(sanitize_filename("The%20Oracle.jpg"), Some("The Oracle.jpg".to_string()));
/// assert_eq!(sanitize_filename("../../etc/passwd"), Some("passwd".to_string()));
/// assert_eq!(sanitize_filename("###"), None);
/// ```
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    // Final path component only, for either separator style.
    let basename = decoded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(decoded.as_str());

    let cleaned: String = basename
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || KEPT.contains(c))
        .collect();

    // Collapse whitespace runs and trim the ends.
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}

/// Derive a display title from a stored filename.
///
/// The title is the basename without its extension, percent-decoded.
///
/// # Example
///
/// ```
/// use gallery_server::gallery::display_title;
///
/// assert_eq!(display_title("The%20Oracle-1735689600.jpg"), "The Oracle-1735689600");
/// assert_eq!(display_title("sunset.png"), "sunset");
/// ```
pub fn display_title(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        // A leading dot is a hidden-file marker, not an extension.
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    };

    urlencoding::decode(stem)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| stem.to_string())
}

/// File extension for an image content type.
///
/// Unknown image types fall back to `png`, matching the upload fallback
/// name `artwork-{timestamp}.png`.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "png",
    }
}
