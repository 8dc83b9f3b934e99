//! Request URLs and response payloads.

use rice_core::Image;

use crate::task::TaskError;

/// Replaces every space with `%20`.
pub fn encode_url(url: &str) -> String {
    url.replace(' ', "%20")
}

/// Appends query parameters to an encoded `url`.
///
/// A `?` is added when the url carries no parameters yet, a `&` when it
/// already does; neither is doubled. Parameters are written in order as
/// `key=value` with no escaping.
pub fn build_get_url(url: &str, params: &[(&str, &str)]) -> String {
    let mut out = encode_url(url);
    if params.is_empty() {
        return out;
    }
    if !url.contains('=') && !url.ends_with('?') {
        out.push('?');
    }
    if url.contains('=') && !url.ends_with('&') {
        out.push('&');
    }
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    out.push_str(&query.join("&"));
    out
}

/// A raw response as returned by a [`Fetcher`].
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            body: body.into(),
        }
    }
}

/// A response body interpreted by its content type.
#[derive(Clone, Debug)]
pub enum Payload {
    Text(String),
    Image(Image),
    Bytes(Vec<u8>),
}

impl Payload {
    /// `text/*` becomes a string with any byte order mark removed,
    /// `image/*` is decoded, anything else stays raw.
    pub fn from_response(response: Response) -> Result<Self, TaskError> {
        let Some(content_type) = response.content_type.map(|t| t.to_ascii_lowercase()) else {
            return Ok(Self::Bytes(response.body));
        };
        if content_type.starts_with("text") {
            if let Some(at) = content_type.find("charset=") {
                let charset = content_type[at + 8..].trim();
                if charset != "utf-8" && charset != "utf8" {
                    log::debug!("decoding {charset} body as UTF-8");
                }
            }
            let raw = String::from_utf8_lossy(&response.body);
            let text = raw.strip_prefix('\u{FEFF}').unwrap_or(&raw);
            return Ok(Self::Text(text.to_owned()));
        }
        if content_type.starts_with("image") {
            return Image::decode(&response.body)
                .map(Self::Image)
                .map_err(|e| TaskError::Fetch(e.to_string()));
        }
        Ok(Self::Bytes(response.body))
    }
}

/// Performs a blocking GET. Called from worker threads only.
pub trait Fetcher: Send + Sync {
    fn get(&self, url: &str) -> Result<Response, TaskError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<Response, TaskError> + Send + Sync,
{
    fn get(&self, url: &str) -> Result<Response, TaskError> {
        self(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_get_url_query_separators() {
        assert_eq!(build_get_url("http://a/list", &[("p", "1")]), "http://a/list?p=1");
        assert_eq!(build_get_url("http://a/list?", &[("p", "1")]), "http://a/list?p=1");
        assert_eq!(
            build_get_url("http://a/list?x=2", &[("p", "1"), ("n", "10")]),
            "http://a/list?x=2&p=1&n=10"
        );
        assert_eq!(build_get_url("http://a/list?x=2&", &[("p", "1")]), "http://a/list?x=2&p=1");
    }

    #[test]
    fn test_build_get_url_encodes_spaces() {
        assert_eq!(build_get_url("http://a/my apps", &[]), "http://a/my%20apps");
        assert_eq!(build_get_url("http://a/my apps", &[("q", "x")]), "http://a/my%20apps?q=x");
    }

    #[test]
    fn test_text_payload_strips_bom() {
        let body = "\u{FEFF}{\"apps\":[]}".as_bytes().to_vec();
        let payload = Payload::from_response(Response::new("Text/Plain; charset=UTF-8", body));
        match payload {
            Ok(Payload::Text(s)) => assert_eq!(s, "{\"apps\":[]}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_image_payload_is_a_fetch_error() {
        let payload = Payload::from_response(Response::new("image/png", vec![1, 2, 3]));
        assert!(matches!(payload, Err(TaskError::Fetch(_))));
    }

    #[test]
    fn test_untyped_payload_stays_raw() {
        let response = Response {
            content_type: None,
            body: vec![7, 8],
        };
        assert!(matches!(Payload::from_response(response), Ok(Payload::Bytes(b)) if b == [7, 8]));
        let octets = Response::new("application/octet-stream", vec![1]);
        assert!(matches!(Payload::from_response(octets), Ok(Payload::Bytes(_))));
    }
}
