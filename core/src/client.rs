//! Stateless HTTP request builder and response parser.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each verb has a `build_*` method that produces an `HttpRequest`;
//! a single generic `parse` consumes the `HttpResponse`. Whoever sits in
//! between (normally a `Transport`) performs the round-trip exactly once.

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::Serialize;
use serde_json::Value;

use crate::config::{normalize_base_url, ApiConfig};
use crate::error::ApiError;
use crate::http::{no_cache_headers, HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path`, with `params` encoded as the query string.
    ///
    /// `params` may be a map, a struct or a list of key/value pairs. A
    /// sequence value repeats its key (`tags=a&tags=b`), `null` values are
    /// left out and nested objects are sent as JSON text.
    pub fn build_get<P>(&self, path: &str, params: Option<&P>) -> Result<HttpRequest, ApiError>
    where
        P: Serialize + ?Sized,
    {
        let mut url = self.url_for(path);
        if let Some(params) = params {
            let query = encode_query(params)?;
            url = append_query(url, &query);
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: no_cache_headers(),
            body: None,
        })
    }

    pub fn build_post<B>(&self, path: &str, body: Option<&B>) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_with_body(HttpMethod::Post, path, body)
    }

    pub fn build_put<B>(&self, path: &str, body: Option<&B>) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_with_body(HttpMethod::Put, path, body)
    }

    pub fn build_delete(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            url: self.url_for(path),
            headers: no_cache_headers(),
            body: None,
        }
    }

    /// Decode a 2xx response body as JSON.
    ///
    /// An empty body decodes as `null`, so `()` and `Option<T>` accept
    /// `204 No Content`. Any other status comes back as
    /// `ApiError::HttpStatus` with the body untouched.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        if !response.is_success() {
            return Err(ApiError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        let body = if response.body.trim().is_empty() {
            "null"
        } else {
            response.body.as_str()
        };
        serde_json::from_str(body).map_err(ApiError::Deserialization)
    }

    fn build_with_body<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = no_cache_headers();
        let body = match body {
            Some(body) => {
                let json = serde_json::to_string(body).map_err(ApiError::Serialization)?;
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(json)
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body,
        })
    }

    fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    if base.is_empty() || has_scheme(path) || is_under_base(base, path) {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// `scheme://...` for any scheme, in any letter case.
fn has_scheme(path: &str) -> bool {
    match path.split_once("://") {
        Some((scheme, _)) => {
            scheme.len() >= 2
                && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// The path already carries the base as a whole leading segment run.
fn is_under_base(base: &str, path: &str) -> bool {
    match path.strip_prefix(base) {
        Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
        None => false,
    }
}

fn encode_query<P>(params: &P) -> Result<String, ApiError>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params).map_err(|e| query_error(e.to_string()))?;
    let mut pairs = Vec::new();
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, value) in map {
                push_pairs(&mut pairs, key, value);
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                match entry.as_array().map(Vec::as_slice) {
                    Some([Value::String(key), value]) => {
                        push_pairs(&mut pairs, key.clone(), value.clone());
                    }
                    _ => return Err(query_error("query entries must be key/value pairs")),
                }
            }
        }
        _ => return Err(query_error("query params must be a map, a struct or key/value pairs")),
    }
    Ok(serde_urlencoded::to_string(&pairs)?)
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: String, value: Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                if let Some(text) = query_text(item) {
                    pairs.push((key.clone(), text));
                }
            }
        }
        other => {
            if let Some(text) = query_text(other) {
                pairs.push((key, text));
            }
        }
    }
}

fn query_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn query_error<T: std::fmt::Display>(msg: T) -> ApiError {
    ApiError::Query(serde_urlencoded::ser::Error::custom(msg))
}

fn append_query(url: String, query: &str) -> String {
    if query.is_empty() {
        return url;
    }
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{query}")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;
    use crate::http::{CACHE_CONTROL_NO_STORE, PRAGMA_NO_CACHE};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        id: u64,
        name: String,
    }

    #[derive(Serialize)]
    struct NewItem<'a> {
        name: &'a str,
    }

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/api")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn assert_no_cache(req: &HttpRequest) {
        assert_eq!(req.header("cache-control"), Some(CACHE_CONTROL_NO_STORE));
        assert_eq!(req.header("pragma"), Some(PRAGMA_NO_CACHE));
    }

    #[test]
    fn build_get_encodes_params() {
        let req = client().build_get("/items", Some(&[("q", "a")])).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/items?q=a");
        assert!(req.body.is_none());
        assert_no_cache(&req);
    }

    #[test]
    fn build_get_without_params_has_no_query() {
        let req = client().build_get::<()>("/items", None).unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items");
        assert_eq!(req.headers.len(), 2);
    }

    #[test]
    fn build_get_with_empty_map_has_no_query() {
        let params: BTreeMap<String, String> = BTreeMap::new();
        let req = client().build_get("/items", Some(&params)).unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items");
    }

    #[test]
    fn build_get_escapes_and_merges_existing_query() {
        let mut params = BTreeMap::new();
        params.insert("q", "a b&c");
        params.insert("page", "2");
        let req = client().build_get("/items?sort=name", Some(&params)).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:8080/api/items?sort=name&page=2&q=a+b%26c"
        );
    }

    #[test]
    fn build_get_repeats_key_for_sequences() {
        let params = serde_json::json!({ "tags": ["a", "b"], "q": "x" });
        let req = client().build_get("/items", Some(&params)).unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items?q=x&tags=a&tags=b");
    }

    #[test]
    fn build_get_skips_null_values() {
        #[derive(Serialize)]
        struct Filter<'a> {
            q: &'a str,
            page: Option<u32>,
        }
        let req = client()
            .build_get("/items", Some(&Filter { q: "a", page: None }))
            .unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items?q=a");

        let params = serde_json::json!({ "q": "a", "page": null, "tags": [null, "b"] });
        let req = client().build_get("/items", Some(&params)).unwrap();
        assert_eq!(req.url, "http://localhost:8080/api/items?q=a&tags=b");
    }

    #[test]
    fn build_get_formats_scalars_and_nested_objects() {
        let params = serde_json::json!({ "page": 2, "on": true, "range": { "from": 1 } });
        let req = client().build_get("/items", Some(&params)).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:8080/api/items?on=true&page=2&range=%7B%22from%22%3A1%7D"
        );
    }

    #[test]
    fn build_get_rejects_params_that_are_not_key_value() {
        let err = client().build_get("/items", Some(&42)).unwrap_err();
        assert!(matches!(err, ApiError::Query(_)));

        let err = client().build_get("/items", Some(&["a", "b"])).unwrap_err();
        assert!(matches!(err, ApiError::Query(_)));
    }

    #[test]
    fn build_post_serializes_json_body() {
        let req = client()
            .build_post("/items", Some(&NewItem { name: "x" }))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8080/api/items");
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"x"}"#));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_no_cache(&req);
    }

    #[test]
    fn build_post_without_body_sends_nothing() {
        let req = client().build_post::<()>("/items/5/touch", None).unwrap();
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), None);
        assert_no_cache(&req);
    }

    #[test]
    fn build_put_serializes_json_body() {
        let body = serde_json::json!({ "name": "renamed" });
        let req = client().build_put("/items/5", Some(&body)).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:8080/api/items/5");
        let sent: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, body);
        assert_no_cache(&req);
    }

    #[test]
    fn build_delete_has_no_body() {
        let req = client().build_delete("/items/5");
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.url, "http://localhost:8080/api/items/5");
        assert!(req.body.is_none());
        assert_no_cache(&req);
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = ApiClient::new("http://localhost:8080/api///");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(client.build_delete("/items").url, "http://localhost:8080/api/items");
    }

    #[test]
    fn relative_path_gets_a_separator() {
        assert_eq!(client().build_delete("items/5").url, "http://localhost:8080/api/items/5");
    }

    #[test]
    fn empty_base_leaves_path_relative() {
        let client = ApiClient::new("");
        assert_eq!(client.base_url(), "");
        let req = client.build_get("/items", Some(&[("q", "a")])).unwrap();
        assert_eq!(req.url, "/items?q=a");
    }

    #[test]
    fn absolute_path_bypasses_base() {
        let req = client().build_delete("https://other.example.com/items/5");
        assert_eq!(req.url, "https://other.example.com/items/5");
    }

    #[test]
    fn absolute_path_with_any_scheme_bypasses_base() {
        assert_eq!(client().build_delete("HTTP://other.example.com/x").url, "HTTP://other.example.com/x");
        assert_eq!(client().build_delete("ws://other.example.com/x").url, "ws://other.example.com/x");
    }

    #[test]
    fn path_already_under_base_is_not_prefixed_twice() {
        let client = ApiClient::new("/api");
        assert_eq!(client.build_delete("/api/items/5").url, "/api/items/5");
        assert_eq!(client.build_delete("/api").url, "/api");
        assert_eq!(client.build_delete("/apiary").url, "/api/apiary");

        let full = "http://localhost:8080/api/items/5";
        assert_eq!(ApiClient::new("http://localhost:8080/api").build_delete(full).url, full);
    }

    #[test]
    fn from_config_uses_config_base() {
        let config = ApiConfig::new("https://api.example.com/");
        assert_eq!(ApiClient::from_config(&config).base_url(), "https://api.example.com");
    }

    #[test]
    fn parse_decodes_json() {
        let item: Item = client().parse(ok(r#"{"id":5,"name":"x"}"#)).unwrap();
        assert_eq!(
            item,
            Item {
                id: 5,
                name: "x".to_string()
            }
        );
    }

    #[test]
    fn parse_empty_body_as_unit() {
        let resp = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        let () = client().parse(resp).unwrap();
    }

    #[test]
    fn parse_empty_body_as_none() {
        let item: Option<Item> = client().parse(ok("")).unwrap();
        assert!(item.is_none());
    }

    #[test]
    fn parse_non_success_keeps_status_and_body() {
        let resp = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: "no such item".to_string(),
        };
        let err = client().parse::<Item>(resp).unwrap_err();
        assert_eq!(err.status(), Some(404));
        match err {
            ApiError::HttpStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such item");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_bad_json() {
        let err = client().parse::<Item>(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
