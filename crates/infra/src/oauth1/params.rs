//! OAuth1 protocol parameters and signature base string

use bridgekit_domain::{HttpMethod, OAuth1Error};
use chrono::Utc;
use url::Url;
use uuid::Uuid;

pub const SIGNATURE_METHOD: &str = "RSA-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// RFC 5849 percent-encoding (unreserved characters kept as is).
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// `oauth_*` parameters of one signed request, signature excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthParameters {
    params: Vec<(String, String)>,
}

impl OAuthParameters {
    /// Protocol parameters with a fresh nonce and the current timestamp.
    pub fn new(consumer_key: &str) -> Self {
        Self::with_nonce(consumer_key, &Uuid::new_v4().simple().to_string(), Utc::now().timestamp())
    }

    pub fn with_nonce(consumer_key: &str, nonce: &str, timestamp: i64) -> Self {
        Self {
            params: vec![
                ("oauth_consumer_key".into(), consumer_key.into()),
                ("oauth_nonce".into(), nonce.into()),
                ("oauth_signature_method".into(), SIGNATURE_METHOD.into()),
                ("oauth_timestamp".into(), timestamp.to_string()),
                ("oauth_version".into(), OAUTH_VERSION.into()),
            ],
        }
    }

    #[must_use]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Signature base string for `method` on `url`, including the URL's
    /// query parameters.
    pub fn base_string(&self, method: HttpMethod, url: &str) -> Result<String, OAuth1Error> {
        let parsed = Url::parse(url)
            .map_err(|e| OAuth1Error::failure(format!("Invalid request URL {url}: {e}")))?;

        let query: Vec<(String, String)> =
            parsed.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        let mut pairs: Vec<(String, String)> = self
            .params
            .iter()
            .chain(query.iter())
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .collect();
        pairs.sort();

        let normalized = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        Ok(format!(
            "{}&{}&{}",
            method.as_str(),
            percent_encode(&normalized_base_url(&parsed)?),
            percent_encode(&normalized)
        ))
    }

    /// `Authorization` header value carrying these parameters and `signature`.
    pub fn authorization_header(&self, signature: &str) -> String {
        let fields = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(std::iter::once(("oauth_signature", signature)))
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("OAuth {fields}")
    }
}

/// Scheme, host, non-default port and path. No query, no fragment.
fn normalized_base_url(url: &Url) -> Result<String, OAuth1Error> {
    let host = url
        .host_str()
        .ok_or_else(|| OAuth1Error::failure(format!("Request URL {url} has no host")))?;
    let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();
    Ok(format!("{}://{}{}{}", url.scheme(), host.to_ascii_lowercase(), port, url.path()))
}

/// Parse an `Authorization: OAuth ...` header back into decoded pairs.
pub fn parse_authorization_header(header: &str) -> Option<Vec<(String, String)>> {
    let fields = header.strip_prefix("OAuth ")?;
    fields
        .split(',')
        .map(|field| {
            let (key, value) = field.trim().split_once('=')?;
            let value = value.trim_matches('"');
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((key, value))
        })
        .collect()
}
