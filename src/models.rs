use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::locale::Language;

/// One scriptural unit. `response` belongs to psalms and `acclamation` to gospels,
/// by producer convention only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingPassage {
    pub title: String,
    pub reference: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acclamation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub title: String,
    pub text: String,
}

/// The liturgical bundle for one date and one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReadings {
    pub date: String,
    pub liturgical_season: String,
    pub liturgical_color: String,
    pub first_reading: ReadingPassage,
    pub psalm: ReadingPassage,
    #[serde(default)]
    pub second_reading: Option<ReadingPassage>,
    pub gospel: ReadingPassage,
    pub reflection: Reflection,
}

impl DailyReadings {
    /// Checks the invariants serde cannot: every passage that is present has a body.
    pub fn validate(&self) -> Result<(), String> {
        let mut passages = vec![
            ("first_reading", &self.first_reading),
            ("psalm", &self.psalm),
            ("gospel", &self.gospel),
        ];
        if let Some(second) = &self.second_reading {
            passages.push(("second_reading", second));
        }
        for (name, passage) in passages {
            if passage.text.trim().is_empty() {
                return Err(format!("{name} has an empty text"));
            }
        }
        if self.reflection.text.trim().is_empty() {
            return Err("reflection has an empty text".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaintInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wikipedia_url: String,
}

/// Every field tolerates a missing key or `null`; items left without a title or
/// body are dropped during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub summary: String,
    /// Full article text, meant to be read without leaving the app.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioReflection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub source_name: String,
}

/// Secondary bundle: saint, news and audio reflection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyContext {
    pub saint: SaintInfo,
    #[serde(default, deserialize_with = "lenient_news")]
    pub news: Vec<NewsItem>,
    pub audio_reflection: AudioReflection,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Keeps the news entries that decode; a malformed entry never sinks the bundle.
fn lenient_news<'de, D>(deserializer: D) -> Result<Vec<NewsItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    let mut news = Vec::with_capacity(raw.len());
    for value in raw {
        match serde_json::from_value::<NewsItem>(value) {
            Ok(item) => news.push(item),
            Err(e) => warn!(error = %e, "skipping undecodable news item"),
        }
    }
    Ok(news)
}

impl DailyContext {
    /// Placeholder bundle used whenever the grounded request cannot be used.
    pub fn fallback(language: Language) -> Self {
        let strings = language.strings();
        let sources = language.sources();
        Self {
            saint: SaintInfo {
                name: strings.saint_placeholder_name.to_string(),
                description: strings.saint_placeholder_description.to_string(),
                wikipedia_url: sources.saints_calendar_url.to_string(),
            },
            news: Vec::new(),
            audio_reflection: AudioReflection {
                title: sources.audio_source_name.to_string(),
                url: sources.audio_url.to_string(),
                source_name: sources.audio_source_name.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadState {
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Success | LoadState::Error)
    }
}

/// The (date, language) pair every fetch is parameterized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub date: NaiveDate,
    pub language: Language,
}

impl Selection {
    pub fn new(date: NaiveDate, language: Language) -> Self {
        Self { date, language }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passage(text: &str) -> ReadingPassage {
        ReadingPassage {
            title: "Lectura".to_string(),
            reference: "Jn 1, 1".to_string(),
            text: text.to_string(),
            response: None,
            acclamation: None,
        }
    }

    fn readings() -> DailyReadings {
        DailyReadings {
            date: "domingo, 17 de marzo de 2024".to_string(),
            liturgical_season: "Cuaresma".to_string(),
            liturgical_color: "Morado".to_string(),
            first_reading: passage("En el principio"),
            psalm: passage("El Señor es mi pastor"),
            second_reading: None,
            gospel: passage("Dijo Jesús"),
            reflection: Reflection {
                title: "Título".to_string(),
                text: "Texto".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_missing_second_reading() {
        assert!(readings().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_gospel_text() {
        let mut r = readings();
        r.gospel.text = "   ".to_string();
        let err = r.validate().unwrap_err();
        assert!(err.contains("gospel"));
    }

    #[test]
    fn validate_checks_second_reading_when_present() {
        let mut r = readings();
        r.second_reading = Some(passage(""));
        assert!(r.validate().unwrap_err().contains("second_reading"));
    }

    #[test]
    fn second_reading_null_and_absent_both_decode_to_none() {
        let mut value = serde_json::to_value(readings()).unwrap();
        value["second_reading"] = serde_json::Value::Null;
        let decoded: DailyReadings = serde_json::from_value(value.clone()).unwrap();
        assert!(decoded.second_reading.is_none());

        value.as_object_mut().unwrap().remove("second_reading");
        let decoded: DailyReadings = serde_json::from_value(value).unwrap();
        assert!(decoded.second_reading.is_none());
    }

    #[test]
    fn fallback_context_has_placeholders_and_no_news() {
        for language in Language::ALL {
            let ctx = DailyContext::fallback(language);
            assert!(ctx.news.is_empty());
            assert!(!ctx.saint.name.is_empty());
            assert!(ctx.saint.wikipedia_url.starts_with("https://"));
            assert!(ctx.audio_reflection.url.starts_with("https://"));
            assert!(!ctx.audio_reflection.source_name.is_empty());
        }
    }

    #[test]
    fn load_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LoadState::Loading).unwrap(), "\"loading\"");
    }
}
