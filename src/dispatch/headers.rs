use anyhow::{Context, Result};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::cache::token::Token;

/// Headers sent by the official game client
pub const CLIENT_HEADERS: [(&str, &str); 7] = [
    ("User-Agent", "Dalvik/2.1.0 (Linux; U; Android 9; ASUS_Z01QD Build/PI)"),
    ("Connection", "Keep-Alive"),
    ("Accept-Encoding", "gzip"),
    ("Content-Type", "application/x-www-form-urlencoded"),
    ("X-Unity-Version", "2018.4.11f1"),
    ("X-GA", "v1 1"),
    ("ReleaseVersion", "OB51"),
];

/// Client header table plus the token's bearer authorization
pub fn like_headers(token: &Token) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(CLIENT_HEADERS.len() + 1);
    for (name, value) in CLIENT_HEADERS {
        // HeaderName::from_static rejects upper case, the table keeps the client's spelling
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name '{}'", name))?;
        headers.insert(name, HeaderValue::from_static(value));
    }
    let bearer = HeaderValue::from_str(&token.bearer()).context("token is not a valid header value")?;
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_bearer_and_client_table() {
        let headers = like_headers(&Token::new("abc")).unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(headers.get("releaseversion").unwrap(), "OB51");
        assert_eq!(headers.get("x-unity-version").unwrap(), "2018.4.11f1");
        assert_eq!(headers.len(), CLIENT_HEADERS.len() + 1);
    }

    #[test]
    fn token_with_newline_is_rejected() {
        assert!(like_headers(&Token::new("bad\ntoken")).is_err());
    }
}
