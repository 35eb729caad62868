//! Parse raw header lines delivered by libcurl's header callback.

/// Status code from a status line such as `HTTP/1.1 200 OK` or `HTTP/2 404`.
/// Returns `None` for ordinary header lines.
pub(crate) fn status_code(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse::<u32>().ok()
}

/// True for the empty line that terminates a header block.
pub(crate) fn is_end_of_headers(line: &[u8]) -> bool {
    line == b"\r\n" || line == b"\n"
}

/// 1xx responses are followed by another status line.
pub(crate) fn is_interim(code: u32) -> bool {
    (100..200).contains(&code)
}
