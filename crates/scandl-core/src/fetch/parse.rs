//! Parse HTTP response header lines.

/// Header values of interest from the last response in a redirect chain.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct HeaderMeta {
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
}

/// Parse collected header lines. A status line (`HTTP/...`) starts a new
/// response, so only the headers of the final hop are kept.
pub(crate) fn parse_headers(lines: &[String]) -> HeaderMeta {
    let mut meta = HeaderMeta::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            meta = HeaderMeta::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    meta.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-type") {
                meta.content_type = Some(value.to_string());
            }
        }
    }

    meta
}
