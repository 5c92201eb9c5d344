// https://developer.oxforddictionaries.com/documentation - GET /entries/{source_lang}/{word_id}
// Authenticated with app_id and app_key headers. Replies 404 with an `error` body for unknown words.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONNECTION, HOST};
use url::Url;

use crate::{Credentials, DictionaryError};

pub(crate) const OXFORD_API_URL: &str = "https://od-api.oxforddictionaries.com/api/v2";

/// Joins `base`, `entries`, the source language and the word as separate path
/// segments, so the word is percent-encoded instead of spliced into the path.
pub(crate) fn entries_url(base: &Url, language: &str, word: &str) -> Result<Url, DictionaryError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| DictionaryError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(["entries", language, word]);
    Ok(url)
}

/// `host:port` of the provider, e.g. `od-api.oxforddictionaries.com:443`.
pub(crate) fn host_header(base: &Url) -> Option<String> {
    let host = base.host_str()?;
    match base.port_or_known_default() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host.to_owned()),
    }
}

pub(crate) fn request_headers(
    credentials: &Credentials,
    host: Option<&str>,
) -> Result<HeaderMap, DictionaryError> {
    let mut headers = HeaderMap::new();
    headers.insert("app_id", header_value(&credentials.app_id)?);
    headers.insert("app_key", header_value(&credentials.app_key)?);
    if let Some(host) = host {
        headers.insert(HOST, header_value(host)?);
    }
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(headers)
}

fn header_value(value: &str) -> Result<HeaderValue, DictionaryError> {
    HeaderValue::from_str(value).map_err(|_| DictionaryError::InvalidHeader(value.len()))
}

pub(crate) async fn get_entries(
    client: &reqwest::Client,
    url: Url,
    headers: HeaderMap,
) -> Result<Vec<u8>, DictionaryError> {
    tracing::debug!(%url, "requesting dictionary entries");
    let res = client
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(DictionaryError::Network)?;
    let status = res.status();
    let body = res.bytes().await.map_err(DictionaryError::Network)?;
    if !status.is_success() {
        tracing::warn!(%status, bytes = body.len(), "dictionary API replied with a non-success status");
    }
    Ok(body.to_vec())
}
