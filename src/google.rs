use crate::config::Config;
use crate::locale::Locale;
use crate::provider::{ProviderError, TranslationProvider};
use crate::retry::{retry_while, RetryPolicy};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Public Google Translate endpoint used by the `gtx` web client.
pub const DEFAULT_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";

/// Google Translate over its keyless HTTP endpoint.
///
/// One request per string. Locale codes are sent in provider form
/// (`pt_BR` becomes `pt-BR`).
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    client: reqwest::Client,
    endpoint: String,
    retry: RetryPolicy,
}

impl GoogleTranslateProvider {
    /// Create a provider that makes a single attempt per string.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            retry: RetryPolicy::single_attempt(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Ok(Self::new(
            config.google_translate_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_retry(RetryPolicy::backoff(config.max_attempts)))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn request(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_code),
                ("tl", target_code),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(ProviderError::Request)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Status { status, body });
        }

        let body: Value = response.json().await.map_err(ProviderError::Decode)?;
        extract_translation(&body)
    }
}

impl TranslationProvider for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source: &Locale,
        target: &Locale,
    ) -> Result<String, ProviderError> {
        // Nothing to translate; keep the original whitespace as-is
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let source_code = source.provider_code();
        let target_code = target.provider_code();
        debug!("Translating {} chars {} -> {}", text.len(), source_code, target_code);

        retry_while(
            &self.retry,
            &format!("Translation {} -> {}", source_code, target_code),
            || self.request(text, &source_code, &target_code),
            ProviderError::is_retryable,
        )
        .await
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// Response shape: `[[["Bonjour", "Hello", ...], ["le monde", "world", ...]], null, "en", ...]`
fn extract_translation(body: &Value) -> Result<String, ProviderError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("response has no translation segments".to_string())
        })?;

    let translated: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(ProviderError::MalformedResponse(
            "response contained no translated text".to_string(),
        ));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn locale(code: &str) -> Locale {
        Locale::parse(code).expect("valid locale")
    }

    fn create_google_response(segments: &[(&str, &str)]) -> Value {
        let segments: Vec<Value> = segments
            .iter()
            .map(|(translated, original)| {
                serde_json::json!([translated, original, null, null, 10])
            })
            .collect();
        serde_json::json!([segments, null, "en", null, null, null, 1.0])
    }

    fn create_provider(server: &MockServer) -> GoogleTranslateProvider {
        GoogleTranslateProvider::new(
            format!("{}/translate_a/single", server.uri()),
            Duration::from_secs(5),
        )
        .expect("Should build provider")
    }

    // ==================== Response Parsing Tests ====================

    #[test]
    fn test_extract_translation_single_segment() {
        let body = create_google_response(&[("Bonjour", "Hello")]);
        assert_eq!(extract_translation(&body).unwrap(), "Bonjour");
    }

    #[test]
    fn test_extract_translation_joins_segments() {
        let body = create_google_response(&[("Bonjour. ", "Hello. "), ("Au revoir.", "Bye.")]);
        assert_eq!(extract_translation(&body).unwrap(), "Bonjour. Au revoir.");
    }

    #[test]
    fn test_extract_translation_skips_null_segments() {
        let body = serde_json::json!([[["Hola", "Hello"], [null, null, "Ola"]], null, "en"]);
        assert_eq!(extract_translation(&body).unwrap(), "Hola");
    }

    #[test]
    fn test_extract_translation_missing_segments() {
        let body = serde_json::json!({"error": "nope"});
        let err = extract_translation(&body).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_translation_empty_segments() {
        let body = serde_json::json!([[], null, "en"]);
        let err = extract_translation(&body).unwrap_err();
        assert!(err.to_string().contains("no translated text"));
    }

    // ==================== Integration Tests with Wiremock ====================

    #[tokio::test]
    async fn test_translate_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .and(query_param("client", "gtx"))
            .and(query_param("sl", "en"))
            .and(query_param("tl", "fr"))
            .and(query_param("dt", "t"))
            .and(query_param("q", "This field is required"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_google_response(&[(
                    "Ce champ est obligatoire",
                    "This field is required",
                )])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server);
        let result = provider
            .translate("This field is required", &locale("en"), &locale("fr"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "Ce champ est obligatoire");
    }

    #[tokio::test]
    async fn test_translate_sends_provider_locale_codes() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("sl", "en"))
            .and(query_param("tl", "pt-BR"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_google_response(&[("Olá", "Hello")])),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server);
        let result = provider
            .translate("Hello", &locale("en"), &locale("pt_BR"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "Olá");
    }

    #[tokio::test]
    async fn test_translate_blank_text_skips_api_call() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server);
        let result = provider
            .translate("  \n", &locale("en"), &locale("fr"))
            .await
            .expect("Should succeed");

        assert_eq!(result, "  \n");
    }

    #[tokio::test]
    async fn test_translate_api_error_fails_fast_by_default() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server);
        let result = provider.translate("Hello", &locale("en"), &locale("fr")).await;

        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 500, .. }));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[tokio::test]
    async fn test_translate_retries_on_500_when_configured() {
        let mock_server = MockServer::start().await;

        // First two requests fail with 500, third succeeds
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_google_response(&[("Bonjour", "Hello")])),
            )
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(10)));

        let result = provider.translate("Hello", &locale("en"), &locale("fr")).await;
        assert_eq!(result.expect("Should succeed after retries"), "Bonjour");
    }

    #[tokio::test]
    async fn test_translate_no_retry_on_400_error() {
        let mock_server = MockServer::start().await;

        // 400 Bad Request should NOT be retried
        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Bad language pair"))
            .expect(1) // Should only be called once - no retries
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(10)));

        let result = provider.translate("Hello", &locale("en"), &locale("xx")).await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("400"), "Error should mention 400 status: {}", err);
    }

    #[tokio::test]
    async fn test_translate_exhausts_retries_on_429() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/translate_a/single"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .expect(3)
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server)
            .with_retry(RetryPolicy::new(3, Duration::from_millis(5)));

        let result = provider.translate("Hello", &locale("en"), &locale("fr")).await;
        assert!(matches!(
            result,
            Err(ProviderError::Status { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn test_translate_invalid_json_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
            .mount(&mock_server)
            .await;

        let provider = create_provider(&mock_server);
        let result = provider.translate("Hello", &locale("en"), &locale("fr")).await;
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[tokio::test]
    async fn test_translate_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_google_response(&[("Bonjour", "Hello")]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let provider = GoogleTranslateProvider::new(
            format!("{}/translate_a/single", mock_server.uri()),
            Duration::from_millis(200),
        )
        .expect("Should build provider");

        let result = provider.translate("Hello", &locale("en"), &locale("fr")).await;
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
