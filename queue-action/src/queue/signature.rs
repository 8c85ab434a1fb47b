//! Azure Storage Shared Key request signing.
//!
//! Every queue request is signed with HMAC-SHA256 over a canonical
//! description of the request.
//! Reference: https://learn.microsoft.com/rest/api/storageservices/authorize-with-shared-key

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::{header::HeaderMap, Method};
use sha2::Sha256;
use url::Url;

use super::error::{QueueError, Result};

type HmacSha256 = Hmac<Sha256>;

/// Standard headers that take part in the signature, in signing order.
const SIGNED_HEADERS: &[&str] = &[
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
    "range",
];

/// Account name plus decoded account key.
#[derive(Clone)]
pub struct SharedKeyCredential {
    account_name: String,
    mac: HmacSha256,
}

impl SharedKeyCredential {
    /// Create a credential from an account name and its base64 account key.
    pub fn new(account_name: &str, account_key: &str) -> Result<Self> {
        let key = STANDARD
            .decode(account_key.trim())
            .map_err(|e| QueueError::InvalidAccountKey(e.to_string()))?;

        let mac = HmacSha256::new_from_slice(&key)
            .map_err(|e| QueueError::InvalidAccountKey(e.to_string()))?;

        Ok(Self {
            account_name: account_name.to_string(),
            mac,
        })
    }

    pub fn account_name(&self) -> &str {
        &self.account_name
    }

    /// Base64 HMAC-SHA256 of `string_to_sign` under the account key.
    pub fn sign(&self, string_to_sign: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }

    /// Value for the `Authorization` header of the given request.
    pub fn authorization(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        content_length: usize,
    ) -> String {
        let to_sign = string_to_sign(&self.account_name, method, url, headers, content_length);
        format!("SharedKey {}:{}", self.account_name, self.sign(&to_sign))
    }
}

impl fmt::Debug for SharedKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedKeyCredential")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .finish()
    }
}

/// Build the Shared Key string-to-sign for a request.
///
/// `Content-Length` is taken from `content_length` rather than the header map
/// and is left empty when zero.
pub fn string_to_sign(
    account_name: &str,
    method: &Method,
    url: &Url,
    headers: &HeaderMap,
    content_length: usize,
) -> String {
    let mut out = String::new();
    out.push_str(method.as_str());
    out.push('\n');

    for name in SIGNED_HEADERS {
        if *name == "content-length" {
            if content_length > 0 {
                out.push_str(&content_length.to_string());
            }
        } else if let Some(value) = headers.get(*name).and_then(|v| v.to_str().ok()) {
            out.push_str(value);
        }
        out.push('\n');
    }

    out.push_str(&canonicalized_headers(headers));
    out.push_str(&canonicalized_resource(account_name, url));
    out
}

/// `x-ms-*` headers, lowercased and sorted, one `name:value\n` per header.
fn canonicalized_headers(headers: &HeaderMap) -> String {
    let mut ms_headers: BTreeMap<String, String> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.as_str().to_ascii_lowercase();
        if !name.starts_with("x-ms-") {
            continue;
        }
        if let Ok(value) = value.to_str() {
            ms_headers.insert(name, value.trim().to_string());
        }
    }

    ms_headers
        .into_iter()
        .map(|(name, value)| format!("{name}:{value}\n"))
        .collect()
}

/// `/{account}{path}` followed by each query parameter as `\nname:value`.
fn canonicalized_resource(account_name: &str, url: &Url) -> String {
    let mut out = format!("/{}{}", account_name, url.path());

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into_owned());
    }

    for (name, mut values) in params {
        values.sort();
        out.push('\n');
        out.push_str(&name);
        out.push(':');
        out.push_str(&values.join(","));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    // Publicly documented development storage key.
    const DEV_KEY: &str =
        "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT4Am+KbJ8VP8C/AGoaqt+FqE6Ghpm0ejXHMiDgExKbd8UJtMkQ==";

    fn ms_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static("2018-03-28"));
        headers.insert(
            "x-ms-date",
            HeaderValue::from_static("Mon, 19 Oct 2026 12:00:00 GMT"),
        );
        headers
    }

    #[test]
    fn test_string_to_sign_enqueue() {
        let url =
            Url::parse("https://myaccount.queue.core.windows.net/jobs/messages?visibilitytimeout=0")
                .unwrap();
        let mut headers = ms_headers();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );

        let result = string_to_sign("myaccount", &Method::POST, &url, &headers, 79);

        assert_eq!(
            result,
            "POST\n\n\n79\n\napplication/xml; charset=utf-8\n\n\n\n\n\n\n\
             x-ms-date:Mon, 19 Oct 2026 12:00:00 GMT\n\
             x-ms-version:2018-03-28\n\
             /myaccount/jobs/messages\n\
             visibilitytimeout:0"
        );
    }

    #[test]
    fn test_sign_known_vector() {
        let credential = SharedKeyCredential::new("myaccount", DEV_KEY).unwrap();
        let url =
            Url::parse("https://myaccount.queue.core.windows.net/jobs/messages?visibilitytimeout=0")
                .unwrap();
        let mut headers = ms_headers();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );

        let auth = credential.authorization(&Method::POST, &url, &headers, 79);

        assert_eq!(
            auth,
            "SharedKey myaccount:MjB5W6tkMvXs1ZZjc/57vHdb2La+U8KV9hoYodjdaxo="
        );
    }

    #[test]
    fn test_sign_decodes_query_values() {
        let credential = SharedKeyCredential::new("myaccount", DEV_KEY).unwrap();
        let url = Url::parse(
            "https://myaccount.queue.core.windows.net/jobs/messages/id-1?popreceipt=AgAAAA%2B%2F%3D%3D%3D",
        )
        .unwrap();

        let auth = credential.authorization(&Method::DELETE, &url, &ms_headers(), 0);

        assert_eq!(
            auth,
            "SharedKey myaccount:ghCZekdnIzu9ufhktUxOwQD/5Om2nojtt5sCh7R8s+0="
        );
    }

    // Examples from the "Authorize with Shared Key" REST documentation.
    #[test]
    fn test_string_to_sign_documented_example() {
        let url = Url::parse(
            "https://myaccount.blob.core.windows.net/mycontainer?restype=container&comp=metadata&timeout=20",
        )
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static("2015-02-21"));
        headers.insert(
            "x-ms-date",
            HeaderValue::from_static("Fri, 26 Jun 2015 23:39:12 GMT"),
        );

        let result = string_to_sign("myaccount", &Method::GET, &url, &headers, 0);

        assert_eq!(
            result,
            "GET\n\n\n\n\n\n\n\n\n\n\n\n\
             x-ms-date:Fri, 26 Jun 2015 23:39:12 GMT\n\
             x-ms-version:2015-02-21\n\
             /myaccount/mycontainer\n\
             comp:metadata\n\
             restype:container\n\
             timeout:20"
        );
    }

    #[test]
    fn test_canonicalized_resource_documented_example() {
        let url = Url::parse(
            "https://myaccount.blob.core.windows.net/mycontainer?restype=container&comp=list&include=snapshots&include=metadata&include=uncommittedblobs",
        )
        .unwrap();

        assert_eq!(
            canonicalized_resource("myaccount", &url),
            "/myaccount/mycontainer\ncomp:list\ninclude:metadata,snapshots,uncommittedblobs\nrestype:container"
        );
    }

    #[test]
    fn test_canonicalized_resource_sorts_params() {
        let url = Url::parse(
            "https://a.queue.core.windows.net/q/messages?VisibilityTimeout=10&numofmessages=1",
        )
        .unwrap();

        assert_eq!(
            canonicalized_resource("a", &url),
            "/a/q/messages\nnumofmessages:1\nvisibilitytimeout:10"
        );
    }

    #[test]
    fn test_canonicalized_headers_ignores_standard_headers() {
        let mut headers = ms_headers();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let result = canonicalized_headers(&headers);

        assert_eq!(
            result,
            "x-ms-date:Mon, 19 Oct 2026 12:00:00 GMT\nx-ms-version:2018-03-28\n"
        );
    }

    #[test]
    fn test_invalid_account_key() {
        let result = SharedKeyCredential::new("myaccount", "not base64!");
        assert!(matches!(result, Err(QueueError::InvalidAccountKey(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let credential = SharedKeyCredential::new("myaccount", DEV_KEY).unwrap();
        let debug = format!("{:?}", credential);

        assert!(debug.contains("myaccount"));
        assert!(!debug.contains(DEV_KEY));
        assert!(debug.contains("<redacted>"));
    }
}
