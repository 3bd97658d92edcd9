//! Signed REST dispatch
//!
//! Every REST call goes through [`ApiClient::send`], which signs the request,
//! checks the status and wraps any failure with the method and URL.

use chrono::Utc;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Configuration;
use crate::error::{ClientError, ClientResult};
use crate::signer::Signer;

pub struct ApiClient {
    http: reqwest::Client,
    signer: Signer,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Configuration) -> Self {
        Self {
            http: reqwest::Client::new(),
            signer: Signer::from_config(config),
            base_url: config.base_url().to_string(),
        }
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL for raw path segments, each percent-encoded
    ///
    /// Use this when a segment comes from a name, so `?`, `#` or `/` in it stay
    /// inside the path.
    pub fn segments_url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::configuration(format!("Invalid URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::configuration(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a signed request and return the response body
    ///
    /// Non-success statuses are errors carrying the response body.
    pub async fn send(&self, method: Method, path: &str, body: Vec<u8>) -> ClientResult<String> {
        let url = self.url(path);
        let parsed = Url::parse(&url)
            .map_err(|e| ClientError::configuration(format!("Invalid URL {}: {}", url, e)))?;
        self.dispatch(method, parsed, body).await
    }

    async fn dispatch(&self, method: Method, url: Url, body: Vec<u8>) -> ClientResult<String> {
        log::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url.clone());
        for (name, value) in self.signer.sign(method.as_str(), &url, &body, Utc::now()) {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let transport = |source: reqwest::Error| ClientError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            log::debug!("{} {} -> {}", method, url, status);
            return Err(ClientError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status,
                body: text,
            });
        }

        Ok(text)
    }

    /// GET a JSON document at percent-encoded path segments
    pub async fn get_json_at<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let url = self.segments_url(segments)?;
        let context = url.to_string();
        let text = self.dispatch(Method::GET, url, Vec::new()).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::decode(context, e))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let text = self.send(Method::GET, path, Vec::new()).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::decode(self.url(path), e))
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let text = self.post(path, body).await?;
        serde_json::from_str(&text).map_err(|e| ClientError::decode(self.url(path), e))
    }

    /// POST a JSON body, returning the raw response text
    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<String> {
        let payload = serde_json::to_vec(body)
            .map_err(|e| ClientError::decode(format!("request body for {}", self.url(path)), e))?;
        self.send(Method::POST, path, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        let config = Configuration::new(format!("{}/", server.uri()), "AKID", "SECRET", "eu-west-1");
        ApiClient::new(&config)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = Configuration::new("https://acme.example/", "AKID", "SECRET", "eu-west-1");
        let api = ApiClient::new(&config);
        assert_eq!(api.url("/Bucket/model"), "https://acme.example/Bucket/model");
        assert_eq!(api.url("Bucket/model"), "https://acme.example/Bucket/model");
    }

    #[tokio::test]
    async fn test_requests_are_signed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(header_exists("x-amz-content-sha256"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let pong: Pong = client(&server).get_json("/ping").await.unwrap();
        assert_eq!(pong, Pong { ok: true });

        let requests = server.received_requests().await.unwrap();
        let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKID/"));
        assert!(auth.contains("/eu-west-1/s3/aws4_request"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/echo"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"name": "logs"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
            .mount(&server)
            .await;

        let pong: Pong = client(&server)
            .post_json("/echo", &json!({"name": "logs"}))
            .await
            .unwrap();
        assert_eq!(pong, Pong { ok: false });
    }

    #[tokio::test]
    async fn test_error_status_carries_method_url_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such dataset"))
            .mount(&server)
            .await;

        let err = client(&server).get_json::<Pong>("/missing").await.unwrap_err();
        assert!(err.is_not_found());
        let message = err.to_string();
        assert!(message.starts_with("Failed to GET to "));
        assert!(message.contains("/missing"));
        assert!(message.contains("no such dataset"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error_naming_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let err = client(&server).get_json::<Pong>("/garbled").await.unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("/garbled"));
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let config = Configuration::new("https://acme.example/", "AKID", "SECRET", "eu-west-1");
        let url = ApiClient::new(&config)
            .segments_url(&["Bucket", "dataset", "name", "logs?view#1"])
            .unwrap();
        assert_eq!(url.path(), "/Bucket/dataset/name/logs%3Fview%231");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[tokio::test]
    async fn test_get_json_at_reaches_encoded_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Bucket/dataset/name/odd%3Fname"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let pong: Pong = client(&server)
            .get_json_at(&["Bucket", "dataset", "name", "odd?name"])
            .await
            .unwrap();
        assert_eq!(pong, Pong { ok: true });
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = Configuration::new("http://127.0.0.1:9", "AKID", "SECRET", "eu-west-1");
        let err = ApiClient::new(&config)
            .get_json::<Pong>("/ping")
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }
}
