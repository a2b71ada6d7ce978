use std::fmt;

use serde::Serialize;

use crate::locale::{Language, Strings};
use crate::models::{DailyContext, DailyReadings, LoadState, ReadingPassage};
use crate::orchestrator::Snapshot;

/// Theme bucket derived from the free-text liturgical color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiturgicalColor {
    Green,
    Red,
    Purple,
    Rose,
    White,
    Black,
    Gold,
    Unknown,
}

/// Keywords per color in every supported language, checked in order. Rose comes
/// before purple and red because Gaudete/Laetare answers often name both.
const COLOR_KEYWORDS: &[(LiturgicalColor, &[&str])] = &[
    (
        LiturgicalColor::Rose,
        &["rosa", "rose", "rosé", "pink", "장미", "분홍", "ばら", "バラ", "ローズ", "桃", "玫瑰", "粉"],
    ),
    (
        LiturgicalColor::Purple,
        &["morado", "violeta", "purple", "violet", "viola", "paonazzo", "lila", "보라", "자색", "紫"],
    ),
    (
        LiturgicalColor::Green,
        &["verde", "green", "vert", "grün", "gruen", "녹색", "초록", "緑", "绿", "綠"],
    ),
    (
        LiturgicalColor::Red,
        &["rojo", "red", "rouge", "rosso", "rot", "홍색", "빨간", "적색", "赤", "红", "紅"],
    ),
    (
        LiturgicalColor::White,
        &["blanco", "white", "blanc", "bianco", "weiß", "weiss", "백색", "흰", "白"],
    ),
    (
        LiturgicalColor::Black,
        &["negro", "black", "noir", "nero", "schwarz", "흑색", "검은", "黒", "黑"],
    ),
    (
        LiturgicalColor::Gold,
        &["dorado", "oro", "gold", "doré", "금색", "金"],
    ),
];

impl LiturgicalColor {
    pub fn classify(text: &str) -> Self {
        let lower = text.to_lowercase();
        COLOR_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(color, _)| *color)
            .unwrap_or(LiturgicalColor::Unknown)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassageKind {
    FirstReading,
    Psalm,
    SecondReading,
    Gospel,
}

#[derive(Debug, Clone, Serialize)]
pub struct Verse {
    pub label: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassageSection {
    pub kind: PassageKind,
    pub label: &'static str,
    pub title: String,
    pub reference: String,
    pub response: Option<Verse>,
    pub acclamation: Option<Verse>,
    pub paragraphs: Vec<String>,
    pub closing: &'static str,
    pub closing_response: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadingsView {
    pub date: String,
    pub season_label: &'static str,
    pub season: String,
    pub color_name: String,
    pub color: LiturgicalColor,
    pub expanded: bool,
    pub toggle_label: &'static str,
    pub sections: Vec<PassageSection>,
    pub reflection_label: &'static str,
    pub reflection_title: String,
    pub reflection_paragraphs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReadingsPanel {
    Idle,
    Loading { message: &'static str },
    Error { message: &'static str, detail: Option<String>, retry_label: &'static str },
    Ready(Box<ReadingsView>),
}

#[derive(Debug, Clone, Serialize)]
pub struct SaintCard {
    pub heading: &'static str,
    pub name: String,
    pub description: String,
    pub link_label: &'static str,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioCard {
    pub heading: &'static str,
    pub title: String,
    pub intro: String,
    pub url: String,
    pub player_visible: bool,
    pub action_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsCard {
    pub index: usize,
    pub title: String,
    pub summary: String,
    pub source: String,
    pub action_label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsReader {
    pub source: String,
    pub title: String,
    pub paragraphs: Vec<String>,
    /// Absent when the item only points at the generic news edition home page.
    pub source_link: Option<Verse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContextView {
    pub section_heading: &'static str,
    pub saint: SaintCard,
    pub audio: AudioCard,
    pub news_heading: &'static str,
    pub news: Vec<NewsCard>,
    pub open_news: Option<NewsReader>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ContextPanel {
    Idle,
    Loading { message: &'static str },
    Ready(Box<ContextView>),
}

/// Everything a renderer needs, derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub language: Language,
    pub app_title: &'static str,
    /// Full label table for the language, for controls the view-model does not build.
    pub strings: &'static Strings,
    pub readings: ReadingsPanel,
    pub context: ContextPanel,
}

impl ViewModel {
    /// `default_language` labels the view before any selection exists.
    pub fn from_snapshot(snapshot: &Snapshot, default_language: Language) -> Self {
        let language = snapshot.selection.map(|s| s.language).unwrap_or(default_language);
        let strings = language.strings();

        let readings = match (snapshot.readings_status, &snapshot.readings) {
            (LoadState::Success, Some(readings)) => {
                ReadingsPanel::Ready(Box::new(readings_view(readings, strings, snapshot.ui.readings_expanded)))
            }
            (LoadState::Error, _) => ReadingsPanel::Error {
                message: strings.readings_error,
                detail: snapshot.readings_error.clone(),
                retry_label: strings.retry,
            },
            (LoadState::Idle, _) => ReadingsPanel::Idle,
            _ => ReadingsPanel::Loading {
                message: strings.loading,
            },
        };

        let context = match (snapshot.context_status, &snapshot.context) {
            (LoadState::Success, Some(context)) => ContextPanel::Ready(Box::new(context_view(
                context,
                language,
                snapshot.ui.audio_player_visible,
                snapshot.ui.open_news,
            ))),
            (LoadState::Idle, _) => ContextPanel::Idle,
            _ => ContextPanel::Loading {
                message: strings.loading,
            },
        };

        Self {
            language,
            app_title: strings.app_title,
            strings,
            readings,
            context,
        }
    }
}

fn readings_view(readings: &DailyReadings, strings: &'static Strings, expanded: bool) -> ReadingsView {
    let mut sections = vec![
        section(PassageKind::FirstReading, strings.first_reading, &readings.first_reading, strings),
        section(PassageKind::Psalm, strings.psalm, &readings.psalm, strings),
    ];
    if let Some(second) = &readings.second_reading {
        sections.push(section(PassageKind::SecondReading, strings.second_reading, second, strings));
    }
    sections.push(section(PassageKind::Gospel, strings.gospel, &readings.gospel, strings));

    ReadingsView {
        date: readings.date.clone(),
        season_label: strings.liturgical_season,
        season: readings.liturgical_season.clone(),
        color_name: readings.liturgical_color.clone(),
        color: LiturgicalColor::classify(&readings.liturgical_color),
        expanded,
        toggle_label: if expanded { strings.hide_readings } else { strings.read_readings },
        sections,
        reflection_label: strings.pastoral_reflection,
        reflection_title: readings.reflection.title.clone(),
        reflection_paragraphs: paragraphs(&readings.reflection.text),
    }
}

fn section(kind: PassageKind, label: &'static str, passage: &ReadingPassage, strings: &'static Strings) -> PassageSection {
    let verse = |label: &'static str, text: &Option<String>| {
        text.as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| Verse {
                label,
                text: t.to_string(),
            })
    };

    PassageSection {
        kind,
        label,
        title: passage.title.clone(),
        reference: passage.reference.clone(),
        response: verse(strings.response, &passage.response),
        acclamation: verse(strings.acclamation, &passage.acclamation),
        paragraphs: if kind == PassageKind::Psalm {
            psalm_stanzas(&passage.text)
        } else {
            paragraphs(&passage.text)
        },
        closing: strings.word_of_god,
        closing_response: strings.word_of_god_response,
    }
}

/// Blank-line separated paragraphs.
fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

const SENTENCE_ENDS: [char; 2] = ['.', '。'];

/// Psalms that arrive as one run-on line are split into one stanza per sentence.
fn psalm_stanzas(text: &str) -> Vec<String> {
    if text.contains('\n') {
        return paragraphs(text);
    }
    text.split_inclusive(SENTENCE_ENDS)
        .map(str::trim)
        .filter(|s| !s.trim_matches(SENTENCE_ENDS).is_empty())
        .map(|s| {
            if s.ends_with(SENTENCE_ENDS) {
                s.to_string()
            } else {
                format!("{s}.")
            }
        })
        .collect()
}

fn context_view(context: &DailyContext, language: Language, player_visible: bool, open_news: Option<usize>) -> ContextView {
    let strings = language.strings();
    let audio = &context.audio_reflection;
    let edition_home = language.sources().news_edition_url;

    ContextView {
        section_heading: strings.faith_life,
        saint: SaintCard {
            heading: strings.saints,
            name: context.saint.name.clone(),
            description: context.saint.description.clone(),
            link_label: strings.read_biography,
            url: context.saint.wikipedia_url.clone(),
        },
        audio: AudioCard {
            heading: strings.audio_heading,
            title: if audio.title.trim().is_empty() {
                audio.source_name.clone()
            } else {
                audio.title.clone()
            },
            intro: format!("{} {}", strings.courtesy_of, audio.source_name),
            url: audio.url.clone(),
            player_visible,
            action_label: if player_visible { strings.close_player } else { strings.listen },
        },
        news_heading: strings.news_heading,
        news: context
            .news
            .iter()
            .enumerate()
            .map(|(index, item)| NewsCard {
                index,
                title: item.title.clone(),
                summary: item.summary.clone(),
                source: item.source.clone(),
                action_label: strings.read_full_article,
            })
            .collect(),
        open_news: open_news.and_then(|i| context.news.get(i)).map(|item| NewsReader {
            source: item.source.clone(),
            title: item.title.clone(),
            paragraphs: paragraphs(&item.body),
            source_link: (!item.url.trim().is_empty() && item.url != edition_home).then(|| Verse {
                label: strings.view_source,
                text: item.url.clone(),
            }),
        }),
    }
}

/// Plain-text rendering for the terminal. Shows every section regardless of the
/// expanded flag.
pub fn render_text(view: &ViewModel) -> String {
    view.to_string()
}

impl fmt::Display for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\n", self.app_title)?;

        match &self.readings {
            ReadingsPanel::Idle => {}
            ReadingsPanel::Loading { message } => writeln!(f, "{message}\n")?,
            ReadingsPanel::Error { message, detail, .. } => {
                writeln!(f, "{message}")?;
                if let Some(detail) = detail {
                    writeln!(f, "  ({detail})")?;
                }
                writeln!(f)?;
            }
            ReadingsPanel::Ready(readings) => write_readings(f, readings)?,
        }

        match &self.context {
            ContextPanel::Idle => Ok(()),
            ContextPanel::Loading { message } => writeln!(f, "{message}"),
            ContextPanel::Ready(context) => write_context(f, context),
        }
    }
}

fn write_readings(f: &mut fmt::Formatter<'_>, readings: &ReadingsView) -> fmt::Result {
    writeln!(f, "{}", readings.date)?;
    writeln!(f, "{}: {} ({})\n", readings.season_label, readings.season, readings.color_name)?;

    for section in &readings.sections {
        writeln!(f, "== {} ==", section.label.to_uppercase())?;
        writeln!(f, "{}", section.title)?;
        writeln!(f, "{}\n", section.reference)?;
        for verse in [&section.response, &section.acclamation].into_iter().flatten() {
            writeln!(f, "{}: \"{}\"\n", verse.label, verse.text)?;
        }
        for paragraph in &section.paragraphs {
            writeln!(f, "{paragraph}\n")?;
        }
        writeln!(f, "{} ({})\n", section.closing, section.closing_response)?;
    }

    writeln!(f, "== {} ==", readings.reflection_label.to_uppercase())?;
    writeln!(f, "{}\n", readings.reflection_title)?;
    for paragraph in &readings.reflection_paragraphs {
        writeln!(f, "{paragraph}\n")?;
    }
    Ok(())
}

fn write_context(f: &mut fmt::Formatter<'_>, context: &ContextView) -> fmt::Result {
    writeln!(f, "== {} ==\n", context.section_heading.to_uppercase())?;

    writeln!(f, "{}: {}", context.saint.heading, context.saint.name)?;
    writeln!(f, "{}", context.saint.description)?;
    writeln!(f, "{}: {}\n", context.saint.link_label, context.saint.url)?;

    writeln!(f, "{}: {}", context.audio.heading, context.audio.title)?;
    writeln!(f, "{}", context.audio.intro)?;
    writeln!(f, "{}\n", context.audio.url)?;

    if context.news.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}", context.news_heading)?;
    for card in &context.news {
        writeln!(f, "  {}. {} ({})", card.index + 1, card.title, card.source)?;
        if !card.summary.is_empty() {
            writeln!(f, "     {}", card.summary)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::backend::testing::{context_json, readings_json};
    use crate::models::Selection;
    use crate::orchestrator::ContentUi;

    fn loaded(second_reading: bool, language: Language) -> Snapshot {
        Snapshot {
            generation: 1,
            selection: Some(Selection::new(NaiveDate::from_ymd_opt(2024, 3, 17).unwrap(), language)),
            readings_status: LoadState::Success,
            readings: Some(serde_json::from_str(&readings_json(second_reading)).unwrap()),
            readings_error: None,
            context_status: LoadState::Success,
            context: Some(serde_json::from_str(&context_json()).unwrap()),
            ui: ContentUi::default(),
        }
    }

    fn ready_readings(view: &ViewModel) -> &ReadingsView {
        match &view.readings {
            ReadingsPanel::Ready(r) => r,
            other => panic!("readings not ready: {other:?}"),
        }
    }

    #[test]
    fn classifies_colors_across_languages() {
        assert_eq!(LiturgicalColor::classify("Verde"), LiturgicalColor::Green);
        assert_eq!(LiturgicalColor::classify("Violet"), LiturgicalColor::Purple);
        assert_eq!(LiturgicalColor::classify("Morado"), LiturgicalColor::Purple);
        assert_eq!(LiturgicalColor::classify("Rosa o morado"), LiturgicalColor::Rose);
        assert_eq!(LiturgicalColor::classify("Rosso"), LiturgicalColor::Red);
        assert_eq!(LiturgicalColor::classify("Weiß"), LiturgicalColor::White);
        assert_eq!(LiturgicalColor::classify("白"), LiturgicalColor::White);
        assert_eq!(LiturgicalColor::classify("녹색"), LiturgicalColor::Green);
        assert_eq!(LiturgicalColor::classify("azul"), LiturgicalColor::Unknown);
    }

    #[test]
    fn no_second_reading_section_when_absent() {
        let view = ViewModel::from_snapshot(&loaded(false, Language::En), Language::Es);
        let kinds: Vec<PassageKind> = ready_readings(&view).sections.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            [PassageKind::FirstReading, PassageKind::Psalm, PassageKind::Gospel]
        );
    }

    #[test]
    fn second_reading_sits_between_psalm_and_gospel() {
        let view = ViewModel::from_snapshot(&loaded(true, Language::En), Language::En);
        let sections = &ready_readings(&view).sections;
        assert_eq!(sections[2].kind, PassageKind::SecondReading);
        assert_eq!(sections[2].label, "Second Reading");
        assert_eq!(sections[3].kind, PassageKind::Gospel);
    }

    #[test]
    fn psalm_without_line_breaks_splits_into_stanzas() {
        let view = ViewModel::from_snapshot(&loaded(false, Language::En), Language::En);
        let psalm = &ready_readings(&view).sections[1];
        assert_eq!(psalm.paragraphs, ["Have mercy on me, O God.", "In your goodness."]);
        assert_eq!(psalm.response.as_ref().unwrap().label, "Response");
        assert!(psalm.acclamation.is_none());
    }

    #[test]
    fn cjk_psalm_splits_at_ideographic_full_stop() {
        assert_eq!(
            psalm_stanzas("主はわたしの羊飼い。わたしは何も欠けることがない。"),
            ["主はわたしの羊飼い。", "わたしは何も欠けることがない。"]
        );
        assert_eq!(psalm_stanzas("Sing to the Lord. A new song"), ["Sing to the Lord.", "A new song."]);
        assert_eq!(psalm_stanzas("Alleluia..."), ["Alleluia."]);
    }

    #[test]
    fn view_model_carries_full_label_table() {
        let view = ViewModel::from_snapshot(&loaded(false, Language::De), Language::En);
        assert_eq!(view.strings.select_date, Language::De.strings().select_date);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["strings"]["close_readings"], Language::De.strings().close_readings);
        assert_eq!(json["strings"]["select_date"], Language::De.strings().select_date);
    }

    #[test]
    fn render_text_shows_readings_error_detail() {
        let mut snapshot = loaded(false, Language::En);
        snapshot.readings_status = LoadState::Error;
        snapshot.readings = None;
        snapshot.readings_error = Some("backend returned 429: quota".to_string());

        let text = render_text(&ViewModel::from_snapshot(&snapshot, Language::En));
        assert!(text.starts_with("The Daily Word\n\nThe readings could not be loaded.\n  (backend returned 429: quota)\n\n"));
        assert!(text.contains("Saint of the Day: St. Patrick"));
    }

    #[test]
    fn labels_follow_selection_language() {
        let view = ViewModel::from_snapshot(&loaded(false, Language::Es), Language::En);
        let readings = ready_readings(&view);
        assert_eq!(view.app_title, "La Palabra Diaria");
        assert_eq!(readings.sections[2].label, "Santo Evangelio");
        assert_eq!(readings.color, LiturgicalColor::Purple);
        assert_eq!(readings.toggle_label, "Leer las Lecturas de Hoy");
    }

    #[test]
    fn error_panel_carries_retry_label() {
        let mut snapshot = loaded(false, Language::En);
        snapshot.readings_status = LoadState::Error;
        snapshot.readings = None;
        snapshot.readings_error = Some("boom".to_string());

        let view = ViewModel::from_snapshot(&snapshot, Language::En);
        match view.readings {
            ReadingsPanel::Error { retry_label, detail, .. } => {
                assert_eq!(retry_label, "Try again");
                assert_eq!(detail.as_deref(), Some("boom"));
            }
            other => panic!("expected error panel, got {other:?}"),
        }
    }

    #[test]
    fn open_news_shows_full_body_and_hides_generic_link() {
        let mut snapshot = loaded(false, Language::En);
        if let Some(context) = snapshot.context.as_mut() {
            context.news[1].url = Language::En.sources().news_edition_url.to_string();
            context.news[0].body = "First paragraph.\n\nSecond paragraph.".to_string();
        }

        snapshot.ui.open_news = Some(1);
        let view = ViewModel::from_snapshot(&snapshot, Language::En);
        let ContextPanel::Ready(context) = &view.context else {
            panic!("context not ready");
        };
        assert!(context.open_news.as_ref().unwrap().source_link.is_none());

        snapshot.ui.open_news = Some(0);
        let view = ViewModel::from_snapshot(&snapshot, Language::En);
        let ContextPanel::Ready(context) = &view.context else {
            panic!("context not ready");
        };
        let reader = context.open_news.as_ref().unwrap();
        assert_eq!(reader.paragraphs, ["First paragraph.", "Second paragraph."]);
        assert_eq!(reader.source_link.as_ref().unwrap().text, "https://a");
    }

    #[test]
    fn loading_and_idle_panels() {
        let view = ViewModel::from_snapshot(&Snapshot::default(), Language::Fr);
        assert!(matches!(view.readings, ReadingsPanel::Idle));
        assert!(matches!(view.context, ContextPanel::Idle));
        assert_eq!(view.language, Language::Fr);

        let snapshot = Snapshot {
            readings_status: LoadState::Loading,
            context_status: LoadState::Loading,
            ..Snapshot::default()
        };
        let view = ViewModel::from_snapshot(&snapshot, Language::En);
        assert!(matches!(view.readings, ReadingsPanel::Loading { message: "Loading…" }));
    }

    #[test]
    fn render_text_includes_every_section() {
        let view = ViewModel::from_snapshot(&loaded(true, Language::En), Language::En);
        let text = render_text(&view);
        assert!(text.contains("== FIRST READING =="));
        assert!(text.contains("== SECOND READING =="));
        assert!(text.contains("Response: \"Create a clean heart in me, O God.\""));
        assert!(text.contains("Saint of the Day: St. Patrick"));
        assert!(text.contains("  3. Three (Vatican News)"));
    }
}
