use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::locale::Language;

const READINGS_TEMPLATE: &str = "\
Generate the readings of the Catholic Mass for {date}.
Return strictly the title, biblical reference and full text of:
1. First Reading
2. Responsorial Psalm (including the response/antiphon)
3. Second Reading (only if the day has one, e.g. Sundays or Solemnities; otherwise null)
4. Gospel (including the acclamation before the Gospel when there is one)

ADDITIONALLY:
Write a \"Pastoral Reflection\" (homily) of about 300 words.
The reflection must connect the teachings of the First Reading and of the Gospel with everyday life today.
The tone must be warm, hopeful, pastoral and doctrinally sound within the Catholic faith.

Also include the liturgical season and the liturgical color of the day.
All text, including the date, titles, season and color, must be written strictly in {language}.";

const CONTEXT_TEMPLATE: &str = "\
For the date {date}, act as a digital Catholic news researcher for the app \"{app_title}\".
Your mission is to research the 3 most important and recent news stories from the global Catholic world, \
prioritizing Vatican News (use the {language} edition when it exists: {news_edition_url}).

Produce valid JSON inside a code block with exactly this structure:

{
  \"saint\": { \"name\": \"...\", \"description\": \"...\", \"wikipedia_url\": \"...\" },
  \"news\": [
    {
      \"title\": \"Short, engaging title\",
      \"summary\": \"Two-line teaser for the card.\",
      \"body\": \"Write the FULL ARTICLE here (about 3 or 4 detailed paragraphs). Use what the search found to write an informative, warm and faithful news story. Do not use placeholder text. Write the real story.\",
      \"url\": \"URL of the original source (if found, otherwise the site home page)\",
      \"source\": \"Vatican News\"
    }
  ],
  \"audio_reflection\": { \"title\": \"...\", \"url\": \"...\", \"source_name\": \"{audio_source_name}\" }
}

Instructions:
1. \"saint\": find the saint of the day in the liturgical calendar.
2. \"news\": exactly 3 items. CRITICAL: the \"body\" field must be written in full so the reader can read the whole story inside the app without leaving it. Summarize in your own words, do not excerpt.
3. \"audio_reflection\": find today's daily audio reflection. If there is no exact equivalent in {language}, use \"{audio_source_name}\" ({audio_url}).

All text values must be written strictly in {language}.
IMPORTANT: return ONLY the valid JSON block.";

/// Instruction for the structured readings request.
pub fn readings_prompt(date: NaiveDate, language: Language) -> String {
    READINGS_TEMPLATE
        .replace("{date}", &language.format_date(date))
        .replace("{language}", language.english_name())
}

/// Instruction for the search-grounded context request.
pub fn context_prompt(date: NaiveDate, language: Language) -> String {
    let sources = language.sources();
    CONTEXT_TEMPLATE
        .replace("{date}", &language.format_date(date))
        .replace("{app_title}", language.strings().app_title)
        .replace("{language}", language.english_name())
        .replace("{news_edition_url}", sources.news_edition_url)
        .replace("{audio_source_name}", sources.audio_source_name)
        .replace("{audio_url}", sources.audio_url)
}

fn passage_schema(extra: Option<(&str, &str)>) -> Value {
    let mut properties = json!({
        "title": { "type": "STRING" },
        "reference": { "type": "STRING", "description": "Biblical citation" },
        "text": { "type": "STRING" },
    });
    if let Some((name, description)) = extra {
        properties[name] = json!({ "type": "STRING", "description": description });
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ["title", "reference", "text"],
    })
}

/// Response schema mirroring `DailyReadings`.
pub fn readings_schema() -> Value {
    let mut second_reading = passage_schema(None);
    second_reading["nullable"] = json!(true);

    json!({
        "type": "OBJECT",
        "properties": {
            "date": { "type": "STRING", "description": "The date formatted as text" },
            "liturgical_season": { "type": "STRING", "description": "Liturgical season (e.g. Advent, Ordinary Time)" },
            "liturgical_color": { "type": "STRING", "description": "Liturgical color (e.g. green, violet, white, red)" },
            "first_reading": passage_schema(None),
            "psalm": passage_schema(Some(("response", "The antiphon or response of the psalm"))),
            "second_reading": second_reading,
            "gospel": passage_schema(Some(("acclamation", "Acclamation before the Gospel"))),
            "reflection": {
                "type": "OBJECT",
                "description": "Pastoral reflection or homily based on the readings",
                "properties": {
                    "title": { "type": "STRING", "description": "An inspiring title for the reflection" },
                    "text": { "type": "STRING", "description": "The body of the reflection" },
                },
                "required": ["title", "text"],
            },
        },
        "required": [
            "date",
            "liturgical_season",
            "liturgical_color",
            "first_reading",
            "psalm",
            "gospel",
            "reflection",
        ],
    })
}
