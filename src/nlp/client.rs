use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SummaryLength {
    Short,
    Medium,
    Long,
}

impl Default for SummaryLength {
    fn default() -> Self {
        SummaryLength::Medium
    }
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub transcription: String,
    pub confidence: Option<f64>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    #[serde(rename = "audioContent")]
    audio_content: String,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    transcription: String,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Thin adapter over the remote NLP backend. Every method fails on
/// transport errors and non-2xx statuses; nothing here touches history.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> Self {
        let base_url = std::env::var("NLP_BACKEND_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        Self::new(base_url)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Backend error ({status}): {body}"));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    }

    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let payload = serde_json::json!({
            "text": text,
            "source_lang": source_lang,
            "target_lang": target_lang,
        });
        let response: TranslateResponse = self.post_json("/translate", &payload).await?;
        Ok(response.translation)
    }

    pub async fn summarize(&self, text: &str, length: SummaryLength) -> Result<String> {
        let payload = serde_json::json!({
            "text": text,
            "length": length.as_str(),
        });
        let response: SummarizeResponse = self.post_json("/summarize", &payload).await?;
        Ok(response.summary)
    }

    /// Returns the decoded MP3 bytes for the synthesized speech.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_name: &str,
        language_code: &str,
    ) -> Result<Vec<u8>> {
        let payload = serde_json::json!({
            "text": text,
            "voice_name": voice_name,
            "language_code": language_code,
        });
        let response: SynthesizeResponse = self.post_json("/textToSpeech", &payload).await?;
        general_purpose::STANDARD
            .decode(response.audio_content)
            .context("Backend returned invalid base64 audio")
    }

    /// `audio_content` is the recording as base64.
    pub async fn transcribe(&self, audio_content: &str) -> Result<Transcript> {
        let payload = serde_json::json!({ "audio_content": audio_content });
        let response: TranscribeResponse = self.post_json("/speechToText", &payload).await?;
        Ok(Transcript {
            transcription: response.transcription,
            confidence: response.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn translate_parses_backend_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(body_json(json!({
                "text": "Hello",
                "source_lang": "en",
                "target_lang": "es",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translation": "Hola"})))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let translation = client.translate("Hello", "en", "es").await.unwrap();
        assert_eq!(translation, "Hola");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let result = client.summarize("some text", SummaryLength::Medium).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn synthesize_decodes_base64_audio() {
        let audio = b"mp3-bytes".to_vec();
        let encoded = general_purpose::STANDARD.encode(&audio);

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/textToSpeech"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "audioContent": encoded })),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let decoded = client
            .synthesize("read me", "en-US-Wavenet-D", "en-US")
            .await
            .unwrap();
        assert_eq!(decoded, audio);
    }

    #[tokio::test]
    async fn transcribe_reads_optional_confidence() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/speechToText"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"transcription": "hello there"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(server.uri());
        let transcript = client.transcribe("AAAA").await.unwrap();
        assert_eq!(transcript.transcription, "hello there");
        assert!(transcript.confidence.is_none());
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
