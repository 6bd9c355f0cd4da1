//! Inbound request parameters.

use url::Url;

use crate::error::InputError;
use crate::resolve::RequestHints;

/// Everything the proxy needs from an inbound HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Raw `url` parameter
    pub url: Option<String>,

    /// Resize hints (`width`, `height`, `mobile`, `desktop`, `portrait`)
    pub hints: RequestHints,

    /// `Accept` header value
    pub accept: Option<String>,
}

impl ProxyRequest {
    /// Build a request from a raw query string and `Accept` header.
    ///
    /// The query is decoded as `application/x-www-form-urlencoded`. When a key
    /// repeats, the first occurrence wins. Flags count as present with or
    /// without a value (`?mobile` and `?mobile=1` are equivalent).
    pub fn from_query(query: Option<&str>, accept: Option<&str>) -> Self {
        let mut request = ProxyRequest {
            accept: accept.map(str::to_string),
            ..Default::default()
        };

        let Some(query) = query else {
            return request;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "url" if request.url.is_none() => request.url = Some(value.into_owned()),
                "width" if request.hints.width.is_none() => {
                    request.hints.width = Some(value.into_owned())
                }
                "height" if request.hints.height.is_none() => {
                    request.hints.height = Some(value.into_owned())
                }
                "mobile" => request.hints.mobile = true,
                "desktop" => request.hints.desktop = true,
                "portrait" => request.hints.portrait = true,
                _ => {}
            }
        }

        request
    }

    /// Validate the `url` parameter as an absolute http(s) URL.
    pub fn source_url(&self) -> Result<Url, InputError> {
        validate_source_url(self.url.as_deref())
    }
}

/// Validate a raw source URL. Absent or empty is `MissingUrl`.
pub fn validate_source_url(raw: Option<&str>) -> Result<Url, InputError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(InputError::MissingUrl),
    };

    let url = Url::parse(raw).map_err(|e| InputError::InvalidUrl {
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(InputError::InvalidUrl {
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
