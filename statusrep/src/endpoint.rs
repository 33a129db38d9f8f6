//! Status endpoint URL construction

use crate::error::StatusError;
use http::uri::{PathAndQuery, Uri};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Path segment appended after the host identifier.
pub const STATUS_SEGMENT: &str = "status";

/// Bytes escaped in a host segment. `/` is absent: it splits the host into
/// several path segments.
const HOST_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Adds `host` and the status endpoint to the path of `base`, creating the
/// full URL where a host's status page is expected.
///
/// Scheme, authority (including an explicit default port such as `:80`) and
/// query string of `base` are kept as given. The joined path is cleaned:
/// empty and `.` segments are dropped and `..` removes the previous segment.
/// Host segments are percent-encoded, so `h#1` is requested as `h%231`.
pub fn status_url(base: &str, host: &str) -> Result<String, StatusError> {
    if host.trim().is_empty() {
        return Err(StatusError::url_construction(base, "empty host identifier"));
    }

    let uri: Uri = base
        .parse()
        .map_err(|e| StatusError::url_construction(base, e))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(StatusError::url_construction(
            base,
            "base URL must be absolute (scheme and host)",
        ));
    }

    let path = join_path(uri.path(), host);
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };
    let path_and_query: PathAndQuery = path_and_query
        .parse()
        .map_err(|e| StatusError::url_construction(base, e))?;

    let mut parts = uri.into_parts();
    parts.path_and_query = Some(path_and_query);
    let url = Uri::from_parts(parts).map_err(|e| StatusError::url_construction(base, e))?;
    Ok(url.to_string())
}

fn join_path(base_path: &str, host: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let pieces = base_path
        .split('/')
        .map(|piece| (piece, false))
        .chain(host.split('/').map(|piece| (piece, true)))
        .chain(std::iter::once((STATUS_SEGMENT, false)));

    for (piece, from_host) in pieces {
        match piece {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment if from_host => segments.push(utf8_percent_encode(segment, HOST_SEGMENT).to_string()),
            segment => segments.push(segment.to_string()),
        }
    }

    format!("/{}", segments.join("/"))
}
