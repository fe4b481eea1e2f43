use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of operations the backend performs. The serialized form
/// matches the stored log (`"speech-to-text"` etc.).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Translation,
    Summarization,
    SpeechToText,
    TextToSpeech,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Translation => "translation",
            OperationKind::Summarization => "summarization",
            OperationKind::SpeechToText => "speech-to-text",
            OperationKind::TextToSpeech => "text-to-speech",
        }
    }

    /// Human-cased form used in export headers, e.g. "SPEECH TO TEXT".
    pub fn display_upper(&self) -> String {
        self.as_str().replace('-', " ").to_uppercase()
    }
}

/// Per-kind attributes. Only the fields relevant to the item's kind are
/// populated; everything else stays absent in the serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl OperationMetadata {
    pub fn translation(from_lang: String, to_lang: String) -> Self {
        Self {
            from_lang: Some(from_lang),
            to_lang: Some(to_lang),
            ..Self::default()
        }
    }

    pub fn summarization(summary_length: String) -> Self {
        Self {
            summary_length: Some(summary_length),
            ..Self::default()
        }
    }

    pub fn voice(voice: String) -> Self {
        Self {
            voice: Some(voice),
            ..Self::default()
        }
    }

    pub fn confidence(confidence: f64) -> Self {
        Self {
            confidence: Some(confidence),
            ..Self::default()
        }
    }
}

/// One completed operation. Immutable once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OperationMetadata>,
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Append request before an id and timestamp have been assigned.
#[derive(Debug, Clone)]
pub struct NewHistoryItem {
    pub kind: OperationKind,
    pub input: String,
    pub output: String,
    pub metadata: Option<OperationMetadata>,
}

/// UI filter over the log. Both fields compose with logical AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryFilter {
    /// Case-insensitive substring matched against input or output.
    #[serde(default)]
    pub search_term: Option<String>,
    /// Operation kind by its serialized name, or the sentinel `"all"`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Per-kind totals over the full, unfiltered log.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryCounts {
    pub translation: usize,
    pub summarization: usize,
    pub speech_to_text: usize,
    pub text_to_speech: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_kebab_case() {
        let json = serde_json::to_string(&OperationKind::SpeechToText).unwrap();
        assert_eq!(json, "\"speech-to-text\"");

        let parsed: OperationKind = serde_json::from_str("\"text-to-speech\"").unwrap();
        assert_eq!(parsed, OperationKind::TextToSpeech);
    }

    #[test]
    fn display_upper_replaces_hyphens() {
        assert_eq!(OperationKind::Translation.display_upper(), "TRANSLATION");
        assert_eq!(
            OperationKind::SpeechToText.display_upper(),
            "SPEECH TO TEXT"
        );
    }

    #[test]
    fn metadata_omits_absent_fields() {
        let metadata = OperationMetadata::voice("en-US-Wavenet-D".into());
        let json = serde_json::to_value(&metadata).unwrap();

        assert_eq!(json["voice"], "en-US-Wavenet-D");
        assert!(json.get("fromLang").is_none());
        assert!(json.get("confidence").is_none());
    }
}
