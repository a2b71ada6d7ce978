use std::fmt;
use std::str::FromStr;

use chrono::{Locale, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::UnsupportedLanguage;

/// Supported content and interface languages. The same value drives the UI strings
/// and the language the backend is asked to write in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
    Fr,
    It,
    De,
    Ko,
    Ja,
    Zh,
}

impl Default for Language {
    fn default() -> Self {
        Language::DEFAULT
    }
}

impl Language {
    pub const DEFAULT: Language = Language::Es;

    pub const ALL: [Language; 8] = [
        Language::Es,
        Language::En,
        Language::Fr,
        Language::It,
        Language::De,
        Language::Ko,
        Language::Ja,
        Language::Zh,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Fr => "fr",
            Language::It => "it",
            Language::De => "de",
            Language::Ko => "ko",
            Language::Ja => "ja",
            Language::Zh => "zh",
        }
    }

    /// Lenient lookup used on user input. Unknown codes fall back to the default
    /// language instead of producing content in an unintended language.
    pub fn resolve(code: &str) -> Language {
        match code.parse() {
            Ok(language) => language,
            Err(e) => {
                warn!(error = %e, fallback = Language::DEFAULT.code(), "falling back to default language");
                Language::DEFAULT
            }
        }
    }

    /// Full language name embedded in outbound prompts.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
            Language::Fr => "French",
            Language::It => "Italian",
            Language::De => "German",
            Language::Ko => "Korean",
            Language::Ja => "Japanese",
            Language::Zh => "Simplified Chinese",
        }
    }

    pub fn native_name(self) -> &'static str {
        match self {
            Language::Es => "Español",
            Language::En => "English",
            Language::Fr => "Français",
            Language::It => "Italiano",
            Language::De => "Deutsch",
            Language::Ko => "한국어",
            Language::Ja => "日本語",
            Language::Zh => "中文",
        }
    }

    pub fn locale(self) -> Locale {
        match self {
            Language::Es => Locale::es_ES,
            Language::En => Locale::en_US,
            Language::Fr => Locale::fr_FR,
            Language::It => Locale::it_IT,
            Language::De => Locale::de_DE,
            Language::Ko => Locale::ko_KR,
            Language::Ja => Locale::ja_JP,
            Language::Zh => Locale::zh_CN,
        }
    }

    pub fn locale_tag(self) -> &'static str {
        match self {
            Language::Es => "es-ES",
            Language::En => "en-US",
            Language::Fr => "fr-FR",
            Language::It => "it-IT",
            Language::De => "de-DE",
            Language::Ko => "ko-KR",
            Language::Ja => "ja-JP",
            Language::Zh => "zh-CN",
        }
    }

    fn date_pattern(self) -> &'static str {
        match self {
            Language::Es => "%A, %-d de %B de %Y",
            Language::En => "%A, %B %-d, %Y",
            Language::Fr | Language::It => "%A %-d %B %Y",
            Language::De => "%A, %-d. %B %Y",
            Language::Ko => "%Y년 %-m월 %-d일 %A",
            Language::Ja | Language::Zh => "%Y年%-m月%-d日 %A",
        }
    }

    /// Long, human-readable date with weekday, e.g. "domingo, 17 de marzo de 2024".
    pub fn format_date(self, date: NaiveDate) -> String {
        date.and_time(NaiveTime::MIN)
            .and_utc()
            .format_localized(self.date_pattern(), self.locale())
            .to_string()
    }

    pub fn strings(self) -> &'static Strings {
        match self {
            Language::Es => &ES,
            Language::En => &EN,
            Language::Fr => &FR,
            Language::It => &IT,
            Language::De => &DE,
            Language::Ko => &KO,
            Language::Ja => &JA,
            Language::Zh => &ZH,
        }
    }

    pub fn sources(self) -> &'static Sources {
        match self {
            Language::Es => &Sources {
                audio_source_name: "La Buena Semilla",
                audio_url: "https://labuenasemilla.com.ar/",
                saints_calendar_url: "https://es.wikipedia.org/wiki/Santoral_cat%C3%B3lico",
                news_edition_url: "https://www.vaticannews.va/es.html",
            },
            Language::En => &Sources {
                audio_source_name: "Vatican News – Word of the Day",
                audio_url: "https://www.vaticannews.va/en/word-of-the-day.html",
                saints_calendar_url: "https://en.wikipedia.org/wiki/Calendar_of_saints",
                news_edition_url: "https://www.vaticannews.va/en.html",
            },
            Language::Fr => &Sources {
                audio_source_name: "Vatican News – Évangile du jour",
                audio_url: "https://www.vaticannews.va/fr/evangile-du-jour.html",
                saints_calendar_url: "https://fr.wikipedia.org/wiki/Calendrier_des_saints",
                news_edition_url: "https://www.vaticannews.va/fr.html",
            },
            Language::It => &Sources {
                audio_source_name: "Vatican News – Vangelo del giorno",
                audio_url: "https://www.vaticannews.va/it/vangelo-del-giorno-e-parola-del-giorno.html",
                saints_calendar_url: "https://it.wikipedia.org/wiki/Calendario_dei_santi",
                news_edition_url: "https://www.vaticannews.va/it.html",
            },
            Language::De => &Sources {
                audio_source_name: "Radio Vatikan",
                audio_url: "https://www.vaticannews.va/de.html",
                saints_calendar_url: "https://de.wikipedia.org/wiki/Heiligenkalender",
                news_edition_url: "https://www.vaticannews.va/de.html",
            },
            Language::Ko => &Sources {
                audio_source_name: "바티칸 뉴스",
                audio_url: "https://www.vaticannews.va/ko.html",
                saints_calendar_url: "https://ko.wikipedia.org/",
                news_edition_url: "https://www.vaticannews.va/ko.html",
            },
            Language::Ja => &Sources {
                audio_source_name: "バチカン・ニュース",
                audio_url: "https://www.vaticannews.va/ja.html",
                saints_calendar_url: "https://ja.wikipedia.org/",
                news_edition_url: "https://www.vaticannews.va/ja.html",
            },
            Language::Zh => &Sources {
                audio_source_name: "梵蒂冈新闻",
                audio_url: "https://www.vaticannews.va/zh.html",
                saints_calendar_url: "https://zh.wikipedia.org/",
                news_edition_url: "https://www.vaticannews.va/zh.html",
            },
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    /// Strict parse. Accepts region-qualified tags ("en-US", "pt_BR") by their
    /// primary subtag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let primary = s.trim().split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|l| l.code() == primary)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Known-good external resources used in prompts and in the context fallback.
#[derive(Debug)]
pub struct Sources {
    pub audio_source_name: &'static str,
    pub audio_url: &'static str,
    pub saints_calendar_url: &'static str,
    pub news_edition_url: &'static str,
}

/// Display strings for every interface label.
#[derive(Debug, Serialize)]
pub struct Strings {
    pub app_title: &'static str,
    pub select_date: &'static str,
    pub loading: &'static str,
    pub readings_error: &'static str,
    pub retry: &'static str,
    pub liturgical_season: &'static str,
    pub read_readings: &'static str,
    pub hide_readings: &'static str,
    pub close_readings: &'static str,
    pub first_reading: &'static str,
    pub psalm: &'static str,
    pub second_reading: &'static str,
    pub gospel: &'static str,
    pub response: &'static str,
    pub acclamation: &'static str,
    pub word_of_god: &'static str,
    pub word_of_god_response: &'static str,
    pub pastoral_reflection: &'static str,
    pub faith_life: &'static str,
    pub audio_heading: &'static str,
    pub listen: &'static str,
    pub courtesy_of: &'static str,
    pub close_player: &'static str,
    pub saints: &'static str,
    pub read_biography: &'static str,
    pub news_heading: &'static str,
    pub read_full_article: &'static str,
    pub view_source: &'static str,
    pub saint_placeholder_name: &'static str,
    pub saint_placeholder_description: &'static str,
}

static ES: Strings = Strings {
    app_title: "La Palabra Diaria",
    select_date: "Seleccionar fecha",
    loading: "Cargando…",
    readings_error: "No se pudieron cargar las lecturas.",
    retry: "Reintentar",
    liturgical_season: "Tiempo Litúrgico",
    read_readings: "Leer las Lecturas de Hoy",
    hide_readings: "Ocultar Lecturas",
    close_readings: "Cerrar lecturas",
    first_reading: "Primera Lectura",
    psalm: "Salmo Responsorial",
    second_reading: "Segunda Lectura",
    gospel: "Santo Evangelio",
    response: "Respuesta",
    acclamation: "Aclamación",
    word_of_god: "Palabra de Dios.",
    word_of_god_response: "Te alabamos, Señor",
    pastoral_reflection: "Reflexión Pastoral",
    faith_life: "Vida en la Fe",
    audio_heading: "Reflexión del día",
    listen: "Escuchar Reflexión",
    courtesy_of: "Escucha la reflexión diaria cortesía de",
    close_player: "Cerrar reproductor",
    saints: "Santoral",
    read_biography: "Leer biografía",
    news_heading: "Actualidad Vaticana",
    read_full_article: "Leer nota completa",
    view_source: "Ver fuente original",
    saint_placeholder_name: "Santo del Día",
    saint_placeholder_description: "Información no disponible momentáneamente.",
};

static EN: Strings = Strings {
    app_title: "The Daily Word",
    select_date: "Select date",
    loading: "Loading…",
    readings_error: "The readings could not be loaded.",
    retry: "Try again",
    liturgical_season: "Liturgical Season",
    read_readings: "Read Today's Readings",
    hide_readings: "Hide Readings",
    close_readings: "Close readings",
    first_reading: "First Reading",
    psalm: "Responsorial Psalm",
    second_reading: "Second Reading",
    gospel: "Holy Gospel",
    response: "Response",
    acclamation: "Acclamation",
    word_of_god: "The Word of the Lord.",
    word_of_god_response: "Thanks be to God",
    pastoral_reflection: "Pastoral Reflection",
    faith_life: "Life in Faith",
    audio_heading: "Reflection of the day",
    listen: "Listen to Reflection",
    courtesy_of: "Listen to the daily reflection courtesy of",
    close_player: "Close player",
    saints: "Saint of the Day",
    read_biography: "Read biography",
    news_heading: "Vatican News",
    read_full_article: "Read full story",
    view_source: "View original source",
    saint_placeholder_name: "Saint of the Day",
    saint_placeholder_description: "Information temporarily unavailable.",
};

static FR: Strings = Strings {
    app_title: "La Parole du Jour",
    select_date: "Choisir une date",
    loading: "Chargement…",
    readings_error: "Impossible de charger les lectures.",
    retry: "Réessayer",
    liturgical_season: "Temps liturgique",
    read_readings: "Lire les lectures du jour",
    hide_readings: "Masquer les lectures",
    close_readings: "Fermer les lectures",
    first_reading: "Première lecture",
    psalm: "Psaume",
    second_reading: "Deuxième lecture",
    gospel: "Évangile",
    response: "Répons",
    acclamation: "Acclamation",
    word_of_god: "Parole du Seigneur.",
    word_of_god_response: "Nous rendons grâce à Dieu",
    pastoral_reflection: "Réflexion pastorale",
    faith_life: "Vie dans la foi",
    audio_heading: "Méditation du jour",
    listen: "Écouter la méditation",
    courtesy_of: "Écoutez la méditation quotidienne proposée par",
    close_player: "Fermer le lecteur",
    saints: "Saint du jour",
    read_biography: "Lire la biographie",
    news_heading: "Actualité du Vatican",
    read_full_article: "Lire l'article complet",
    view_source: "Voir la source originale",
    saint_placeholder_name: "Saint du jour",
    saint_placeholder_description: "Informations momentanément indisponibles.",
};

static IT: Strings = Strings {
    app_title: "La Parola del Giorno",
    select_date: "Seleziona data",
    loading: "Caricamento…",
    readings_error: "Impossibile caricare le letture.",
    retry: "Riprova",
    liturgical_season: "Tempo liturgico",
    read_readings: "Leggi le letture di oggi",
    hide_readings: "Nascondi letture",
    close_readings: "Chiudi letture",
    first_reading: "Prima Lettura",
    psalm: "Salmo Responsoriale",
    second_reading: "Seconda Lettura",
    gospel: "Vangelo",
    response: "Ritornello",
    acclamation: "Acclamazione",
    word_of_god: "Parola di Dio.",
    word_of_god_response: "Rendiamo grazie a Dio",
    pastoral_reflection: "Riflessione pastorale",
    faith_life: "Vita di fede",
    audio_heading: "Riflessione del giorno",
    listen: "Ascolta la riflessione",
    courtesy_of: "Ascolta la riflessione quotidiana a cura di",
    close_player: "Chiudi lettore",
    saints: "Santo del giorno",
    read_biography: "Leggi la biografia",
    news_heading: "Attualità vaticana",
    read_full_article: "Leggi la notizia completa",
    view_source: "Vedi la fonte originale",
    saint_placeholder_name: "Santo del giorno",
    saint_placeholder_description: "Informazioni momentaneamente non disponibili.",
};

static DE: Strings = Strings {
    app_title: "Das Tägliche Wort",
    select_date: "Datum wählen",
    loading: "Wird geladen…",
    readings_error: "Die Lesungen konnten nicht geladen werden.",
    retry: "Erneut versuchen",
    liturgical_season: "Liturgische Zeit",
    read_readings: "Heutige Lesungen lesen",
    hide_readings: "Lesungen ausblenden",
    close_readings: "Lesungen schließen",
    first_reading: "Erste Lesung",
    psalm: "Antwortpsalm",
    second_reading: "Zweite Lesung",
    gospel: "Evangelium",
    response: "Kehrvers",
    acclamation: "Ruf vor dem Evangelium",
    word_of_god: "Wort des lebendigen Gottes.",
    word_of_god_response: "Dank sei Gott",
    pastoral_reflection: "Geistlicher Impuls",
    faith_life: "Leben im Glauben",
    audio_heading: "Impuls des Tages",
    listen: "Impuls anhören",
    courtesy_of: "Hören Sie den täglichen Impuls, bereitgestellt von",
    close_player: "Player schließen",
    saints: "Heiliger des Tages",
    read_biography: "Biografie lesen",
    news_heading: "Nachrichten aus dem Vatikan",
    read_full_article: "Ganzen Artikel lesen",
    view_source: "Originalquelle ansehen",
    saint_placeholder_name: "Heiliger des Tages",
    saint_placeholder_description: "Informationen vorübergehend nicht verfügbar.",
};

static KO: Strings = Strings {
    app_title: "오늘의 말씀",
    select_date: "날짜 선택",
    loading: "불러오는 중…",
    readings_error: "독서를 불러오지 못했습니다.",
    retry: "다시 시도",
    liturgical_season: "전례 시기",
    read_readings: "오늘의 독서 읽기",
    hide_readings: "독서 숨기기",
    close_readings: "독서 닫기",
    first_reading: "제1독서",
    psalm: "화답송",
    second_reading: "제2독서",
    gospel: "복음",
    response: "후렴",
    acclamation: "복음 환호송",
    word_of_god: "주님의 말씀입니다.",
    word_of_god_response: "하느님 감사합니다",
    pastoral_reflection: "사목적 묵상",
    faith_life: "신앙 생활",
    audio_heading: "오늘의 묵상",
    listen: "묵상 듣기",
    courtesy_of: "매일 묵상 제공:",
    close_player: "플레이어 닫기",
    saints: "오늘의 성인",
    read_biography: "전기 읽기",
    news_heading: "바티칸 소식",
    read_full_article: "기사 전문 읽기",
    view_source: "원문 보기",
    saint_placeholder_name: "오늘의 성인",
    saint_placeholder_description: "정보를 일시적으로 사용할 수 없습니다.",
};

static JA: Strings = Strings {
    app_title: "今日のみことば",
    select_date: "日付を選択",
    loading: "読み込み中…",
    readings_error: "朗読を読み込めませんでした。",
    retry: "再試行",
    liturgical_season: "典礼季節",
    read_readings: "今日の朗読を読む",
    hide_readings: "朗読を隠す",
    close_readings: "朗読を閉じる",
    first_reading: "第一朗読",
    psalm: "答唱詩編",
    second_reading: "第二朗読",
    gospel: "福音朗読",
    response: "答唱",
    acclamation: "アレルヤ唱",
    word_of_god: "神のみことば。",
    word_of_god_response: "神に感謝",
    pastoral_reflection: "司牧的黙想",
    faith_life: "信仰の生活",
    audio_heading: "今日の黙想",
    listen: "黙想を聞く",
    courtesy_of: "毎日の黙想の提供元:",
    close_player: "プレーヤーを閉じる",
    saints: "今日の聖人",
    read_biography: "伝記を読む",
    news_heading: "バチカン・ニュース",
    read_full_article: "記事全文を読む",
    view_source: "元の記事を見る",
    saint_placeholder_name: "今日の聖人",
    saint_placeholder_description: "情報は一時的に利用できません。",
};

static ZH: Strings = Strings {
    app_title: "每日圣言",
    select_date: "选择日期",
    loading: "加载中…",
    readings_error: "无法加载读经。",
    retry: "重试",
    liturgical_season: "礼仪时期",
    read_readings: "阅读今日读经",
    hide_readings: "隐藏读经",
    close_readings: "关闭读经",
    first_reading: "读经一",
    psalm: "答唱咏",
    second_reading: "读经二",
    gospel: "福音",
    response: "答句",
    acclamation: "福音前欢呼",
    word_of_god: "上主的话。",
    word_of_god_response: "感谢天主",
    pastoral_reflection: "牧灵反省",
    faith_life: "信仰生活",
    audio_heading: "今日反省",
    listen: "收听反省",
    courtesy_of: "每日反省由以下来源提供：",
    close_player: "关闭播放器",
    saints: "今日圣人",
    read_biography: "阅读生平",
    news_heading: "梵蒂冈新闻",
    read_full_article: "阅读全文",
    view_source: "查看原始来源",
    saint_placeholder_name: "今日圣人",
    saint_placeholder_description: "信息暂时无法获取。",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_region_tags_and_case() {
        assert_eq!("en-US".parse::<Language>().unwrap(), Language::En);
        assert_eq!("ZH_cn".parse::<Language>().unwrap(), Language::Zh);
        assert_eq!(" ja ".parse::<Language>().unwrap(), Language::Ja);
    }

    #[test]
    fn parse_rejects_unsupported_codes() {
        let err = "pt".parse::<Language>().unwrap_err();
        assert_eq!(err.0, "pt");
        assert!("".parse::<Language>().is_err());
    }

    #[test]
    fn resolve_falls_back_to_default() {
        assert_eq!(Language::resolve("xx"), Language::DEFAULT);
        assert_eq!(Language::resolve("fr"), Language::Fr);
    }

    #[test]
    fn codes_round_trip_through_parse() {
        for language in Language::ALL {
            assert_eq!(language.code().parse::<Language>().unwrap(), language);
            assert_eq!(language.locale_tag().parse::<Language>().unwrap(), language);
        }
    }

    #[test]
    fn formats_dates_per_locale() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        assert_eq!(Language::En.format_date(date), "Sunday, March 17, 2024");
        assert_eq!(Language::Es.format_date(date), "domingo, 17 de marzo de 2024");
        assert!(Language::Ja.format_date(date).starts_with("2024年3月17日"));
    }

    #[test]
    fn every_language_has_complete_strings() {
        for language in Language::ALL {
            let value = serde_json::to_value(language.strings()).unwrap();
            for (key, label) in value.as_object().unwrap() {
                assert!(
                    !label.as_str().unwrap().trim().is_empty(),
                    "{language}: empty label '{key}'"
                );
            }
        }
    }

    #[test]
    fn serializes_as_code() {
        assert_eq!(serde_json::to_string(&Language::De).unwrap(), "\"de\"");
    }
}
