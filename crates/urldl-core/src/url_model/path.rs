//! Filename extraction from URL path.

use super::ExtractError;

/// Returns the last `/`-separated segment of `url` after dropping everything
/// from the first `?` on.
///
/// No percent-decoding and no sanitization: `..` or other odd segments are
/// returned as-is.
pub fn filename_from_url(url: &str) -> Result<String, ExtractError> {
    if url.is_empty() {
        return Err(ExtractError::Empty);
    }
    let without_query = url.split_once('?').map_or(url, |(path, _)| path);
    let (_, segment) = without_query
        .rsplit_once('/')
        .ok_or_else(|| ExtractError::NoPathSeparator(url.to_string()))?;
    if segment.is_empty() {
        return Err(ExtractError::EmptySegment(url.to_string()));
    }
    Ok(segment.to_string())
}
