use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::backend::ContentBackend;
use crate::error::{ContentError, ParseError};
use crate::locale::Language;
use crate::models::{DailyContext, DailyReadings};
use crate::prompt;

/// Number of news items the context request asks for and keeps.
pub const NEWS_TARGET: usize = 3;

/// Issues the readings and context requests and normalizes their answers.
pub struct ContentClient<B> {
    backend: Arc<B>,
}

impl<B> Clone for ContentClient<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
        }
    }
}

impl<B: ContentBackend> ContentClient<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Structured request. All-or-nothing: any backend or shape failure is returned.
    pub async fn request_readings(&self, date: NaiveDate, language: Language) -> Result<DailyReadings, ContentError> {
        let prompt = prompt::readings_prompt(date, language);
        let schema = prompt::readings_schema();

        info!(date = %date, language = %language, "requesting daily readings");
        let raw = self.backend.generate_structured(&prompt, &schema).await?;
        let readings = parse_readings(&raw)?;
        info!(
            date = %date,
            language = %language,
            season = %readings.liturgical_season,
            has_second_reading = readings.second_reading.is_some(),
            "daily readings received"
        );
        Ok(readings)
    }

    /// Search-grounded request. Never fails: on any problem the language's
    /// placeholder context is returned instead.
    pub async fn request_context(&self, date: NaiveDate, language: Language) -> DailyContext {
        let prompt = prompt::context_prompt(date, language);

        info!(date = %date, language = %language, "requesting daily context");
        let raw = match self.backend.generate_grounded(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(date = %date, language = %language, error = %e, "context request failed, using fallback");
                return DailyContext::fallback(language);
            }
        };

        match parse_context(&raw) {
            Ok(context) => {
                info!(
                    date = %date,
                    language = %language,
                    saint = %context.saint.name,
                    news = context.news.len(),
                    "daily context received"
                );
                context
            }
            Err(e) => {
                warn!(
                    date = %date,
                    language = %language,
                    error = %e,
                    excerpt = %excerpt(&raw),
                    "failed to parse daily context, using fallback"
                );
                DailyContext::fallback(language)
            }
        }
    }
}

pub fn parse_readings(raw: &str) -> Result<DailyReadings, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::MissingPayload);
    }
    let readings: DailyReadings = serde_json::from_str(raw.trim())?;
    readings.validate().map_err(ParseError::Invalid)?;
    Ok(readings)
}

pub fn parse_context(raw: &str) -> Result<DailyContext, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::MissingPayload);
    }
    let json = extract_json_block(raw)?;
    let mut context: DailyContext = serde_json::from_str(json)?;

    let before = context.news.len();
    context
        .news
        .retain(|item| !item.title.trim().is_empty() && !item.body.trim().is_empty());
    if context.news.len() < before {
        warn!(dropped = before - context.news.len(), "dropped news items without title or body");
    }
    context.news.truncate(NEWS_TARGET);

    Ok(context)
}

/// Locates the JSON object in free-form model output: a ```json fence, then a bare
/// ``` fence, then the outermost brace span of the unfenced text.
pub fn extract_json_block(text: &str) -> Result<&str, ParseError> {
    if let Some(inner) = fenced(text, "```json") {
        return Ok(inner);
    }
    if let Some(inner) = fenced(text, "```") {
        return Ok(inner);
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(&text[start..=end]),
        _ => Err(ParseError::NoJsonBlock),
    }
}

fn fenced<'a>(text: &'a str, opener: &str) -> Option<&'a str> {
    let start = text.find(opener)?;
    let after = &text[start + opener.len()..];
    // The opener must end its line; "```javascript" is not a "```" fence body.
    let newline = after.find('\n')?;
    if !after[..newline].trim().is_empty() {
        return None;
    }
    let body = &after[newline + 1..];
    let end = body.find("```")?;
    let inner = body[..end].trim();
    (!inner.is_empty()).then_some(inner)
}

fn excerpt(raw: &str) -> String {
    const LIMIT: usize = 300;
    let mut s: String = raw.chars().take(LIMIT).collect();
    if raw.chars().count() > LIMIT {
        s.push('…');
    }
    s
}
