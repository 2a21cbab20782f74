use crate::error::{F2cError, Result};
use crate::figma::{FigmaFileResponse, FigmaImageResponse, FigmaNodesResponse};
use reqwest::{header::RETRY_AFTER, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.figma.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of Figma documents and renders.
///
/// Every method may fail; callers treat a failure as "no data for this node".
#[allow(async_fn_in_trait)]
pub trait FigmaSource {
    async fn get_file(&self, file_key: &str) -> Result<FigmaFileResponse>;

    async fn get_file_nodes(&self, file_key: &str, node_ids: &[String])
        -> Result<FigmaNodesResponse>;

    /// Temporary render URLs keyed by node id; `None` for nodes Figma could not render.
    async fn get_rendered_images(
        &self,
        file_key: &str,
        node_ids: &[String],
        options: ImageExportOptions,
    ) -> Result<HashMap<String, Option<String>>>;

    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub enum FigmaAuth {
    PersonalAccessToken(String),
    OAuthToken(String),
}

impl FigmaAuth {
    pub fn from_env() -> Option<Self> {
        if let Ok(token) = std::env::var("FIGMA_TOKEN") {
            if !token.is_empty() {
                return Some(Self::PersonalAccessToken(token));
            }
        }

        if let Ok(token) = std::env::var("FIGMA_OAUTH_TOKEN") {
            if !token.is_empty() {
                return Some(Self::OAuthToken(token));
            }
        }

        None
    }

    /// Explicit token first, then the environment.
    pub fn resolve(explicit: Option<&str>) -> Option<Self> {
        explicit
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| Self::PersonalAccessToken(token.to_string()))
            .or_else(Self::from_env)
    }

    fn apply(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            FigmaAuth::PersonalAccessToken(token) => builder.header("X-FIGMA-TOKEN", token),
            FigmaAuth::OAuthToken(token) => builder.bearer_auth(token),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FigmaClient {
    http: Client,
    auth: FigmaAuth,
    base_url: Url,
}

impl FigmaClient {
    pub fn new(auth: FigmaAuth) -> Result<Self> {
        Self::with_base_url_and_timeout(auth, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url_and_timeout(
        auth: FigmaAuth,
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(F2cError::Network)?;

        Ok(Self {
            http,
            auth,
            base_url,
        })
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        self.auth.apply(builder)
    }

    fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path).map_err(F2cError::InvalidUrl)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(F2cError::Network)?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            return serde_json::from_str(&body).map_err(F2cError::Serialization);
        }

        Err(F2cError::figma_api(
            Some(status),
            error_message(status, &body, retry_after.as_deref()),
        ))
    }
}

impl FigmaSource for FigmaClient {
    async fn get_file(&self, file_key: &str) -> Result<FigmaFileResponse> {
        let url = self.endpoint(&format!("/v1/files/{file_key}"), &[])?;
        let req = self.authed(self.http.get(url));
        self.send_json(req).await
    }

    async fn get_file_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
    ) -> Result<FigmaNodesResponse> {
        validate_node_ids(node_ids, "fetching nodes from Figma")?;

        let url = self.endpoint(
            &format!("/v1/files/{file_key}/nodes"),
            &[("ids", node_ids.join(","))],
        )?;
        let req = self.authed(self.http.get(url));
        self.send_json(req).await
    }

    async fn get_rendered_images(
        &self,
        file_key: &str,
        node_ids: &[String],
        options: ImageExportOptions,
    ) -> Result<HashMap<String, Option<String>>> {
        validate_node_ids(node_ids, "exporting Figma images")?;
        validate_scale(options.scale)?;

        let mut query = vec![
            ("ids", node_ids.join(",")),
            ("scale", options.scale.to_string()),
            ("format", options.format.as_str().to_string()),
        ];
        if options.use_absolute_bounds {
            query.push(("use_absolute_bounds", "true".to_string()));
        }
        let url = self.endpoint(&format!("/v1/images/{file_key}"), &query)?;

        let req = self.authed(self.http.get(url));
        let response: FigmaImageResponse = self.send_json(req).await?;
        if let Some(err) = response.err.filter(|e| !e.is_empty()) {
            return Err(F2cError::figma_api(None, err));
        }
        Ok(response.images)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.http.get(url).send().await.map_err(F2cError::Network)?;

        let status = response.status();

        if status.is_success() {
            return response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(F2cError::Network);
        }

        let body = response.text().await.unwrap_or_default();
        Err(F2cError::figma_api(
            Some(status),
            format!(
                "failed to download render (status {}): {}",
                status.as_u16(),
                body
            ),
        ))
    }
}

/// Source for conversions of saved JSON; every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl OfflineSource {
    fn refuse<T>(what: &str) -> Result<T> {
        Err(F2cError::Config(format!(
            "offline conversion cannot {what}; use `convert` with a Figma token"
        )))
    }
}

impl FigmaSource for OfflineSource {
    async fn get_file(&self, _file_key: &str) -> Result<FigmaFileResponse> {
        Self::refuse("fetch files")
    }

    async fn get_file_nodes(
        &self,
        _file_key: &str,
        _node_ids: &[String],
    ) -> Result<FigmaNodesResponse> {
        Self::refuse("fetch nodes")
    }

    async fn get_rendered_images(
        &self,
        _file_key: &str,
        _node_ids: &[String],
        _options: ImageExportOptions,
    ) -> Result<HashMap<String, Option<String>>> {
        Self::refuse("render images")
    }

    async fn download(&self, _url: &str) -> Result<Vec<u8>> {
        Self::refuse("download renders")
    }
}

/// Bound one collaborator call; expiry becomes an ordinary error result.
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(F2cError::figma_api(
            None,
            format!("request timed out after {limit:?}"),
        )),
    }
}

fn validate_node_ids(node_ids: &[String], context: &str) -> Result<()> {
    if node_ids.is_empty() {
        return Err(F2cError::Config(format!(
            "node_ids cannot be empty when {context}"
        )));
    }
    Ok(())
}

fn validate_scale(scale: f32) -> Result<()> {
    if scale <= 0.0 {
        return Err(F2cError::Config(
            "scale must be greater than zero for Figma exports".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageExportOptions {
    pub scale: f32,
    pub format: FigmaImageFormat,
    pub use_absolute_bounds: bool,
}

impl Default for ImageExportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            format: FigmaImageFormat::Png,
            use_absolute_bounds: false,
        }
    }
}

impl ImageExportOptions {
    pub fn svg() -> Self {
        Self {
            format: FigmaImageFormat::Svg,
            use_absolute_bounds: true,
            ..Self::default()
        }
    }

    pub fn png(scale: f32) -> Self {
        Self {
            scale,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigmaImageFormat {
    Png,
    Jpg,
    Svg,
}

impl FigmaImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FigmaImageFormat::Png => "png",
            FigmaImageFormat::Jpg => "jpg",
            FigmaImageFormat::Svg => "svg",
        }
    }
}

fn error_message(status: StatusCode, body: &str, retry_after: Option<&str>) -> String {
    let fallback = format!("Figma API returned status {}", status.as_u16());
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_body = parsed
        .as_ref()
        .and_then(|value| value.get("err").or_else(|| value.get("error")))
        .and_then(Value::as_str)
        .map(str::to_owned);

    match (status, retry_after, from_body) {
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), Some(msg)) => {
            format!("{msg} (rate limited, retry after {retry}s)")
        }
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), None) => {
            format!("rate limited by Figma API, retry after {retry}s")
        }
        (_, _, Some(msg)) => msg,
        _ => fallback,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn client() -> FigmaClient {
        FigmaClient::new(FigmaAuth::PersonalAccessToken("secret".into())).unwrap()
    }

    #[test]
    fn personal_access_token_sets_expected_header() {
        let c = client();
        let req = c.authed(c.http.get("https://api.figma.com/v1/me")).build().unwrap();
        assert_eq!(req.headers().get("X-FIGMA-TOKEN").unwrap(), "secret");
    }

    #[test]
    fn oauth_token_sets_bearer_auth_header() {
        let c = FigmaClient::new(FigmaAuth::OAuthToken("oauth_secret".into())).unwrap();
        let req = c.authed(c.http.get("https://api.figma.com/v1/me")).build().unwrap();
        let header = req
            .headers()
            .get(reqwest::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap();
        assert_eq!(header, "Bearer oauth_secret");
    }

    #[test]
    fn endpoint_encodes_query_parameters() {
        let url = client()
            .endpoint(
                "/v1/images/KEY",
                &[("ids", "1:2,3:4".to_string()), ("format", "svg".to_string())],
            )
            .unwrap();
        assert_eq!(url.path(), "/v1/images/KEY");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("ids".to_string(), "1:2,3:4".to_string()),
                ("format".to_string(), "svg".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn rendered_images_rejects_empty_nodes() {
        let result = client()
            .get_rendered_images("KEY", &[], ImageExportOptions::svg())
            .await;
        assert!(matches!(result, Err(F2cError::Config(_))));
    }

    #[tokio::test]
    async fn rendered_images_rejects_non_positive_scale() {
        let result = client()
            .get_rendered_images("KEY", &["1:2".to_string()], ImageExportOptions::png(0.0))
            .await;
        assert!(matches!(result, Err(F2cError::Config(_))));
    }

    #[test]
    fn error_message_prefers_body_and_rate_limit_hint() {
        let msg = error_message(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"err":"Slow down"}"#,
            Some("12"),
        );
        assert_eq!(msg, "Slow down (rate limited, retry after 12s)");
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, "not json", None),
            "Figma API returned status 404"
        );
    }

    #[test]
    fn explicit_token_wins_over_environment() {
        let _guard = EnvGuard;
        env::set_var("FIGMA_TOKEN", "env_token");

        match FigmaAuth::resolve(Some(" cli_token ")) {
            Some(FigmaAuth::PersonalAccessToken(token)) => assert_eq!(token, "cli_token"),
            other => panic!("expected personal access token, got {other:?}"),
        }
        match FigmaAuth::resolve(None) {
            Some(FigmaAuth::PersonalAccessToken(token)) => assert_eq!(token, "env_token"),
            other => panic!("expected env token, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn with_timeout_turns_expiry_into_an_error() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, F2cError>(1)
        };
        let result = with_timeout(Duration::from_millis(10), slow).await;
        assert!(matches!(result, Err(F2cError::FigmaApi { .. })));
    }

    struct EnvGuard;

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            env::remove_var("FIGMA_TOKEN");
            env::remove_var("FIGMA_OAUTH_TOKEN");
        }
    }
}
