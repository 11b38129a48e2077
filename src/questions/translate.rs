use crate::error::{AssetError, Result};
use crate::questions::QuestionRecord;
use reqwest::blocking::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// Request timeout for remote translation services
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opaque text translation capability
///
/// Implementations are called concurrently from the batch worker pool and
/// may fail transiently; callers fall back to the untranslated text.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

impl<F> Translator for F
where
    F: Fn(&str, &str, &str) -> Result<String> + Send + Sync,
{
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        self(text, source, target)
    }
}

/// Source and target language codes for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Self-hosted LibreTranslate server
pub struct LibreTranslate {
    client: Client,
    url: String,
}

impl LibreTranslate {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            url: url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl Translator for LibreTranslate {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let body = serde_json::json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });
        let response: JsonValue = self
            .client
            .post(format!("{}/translate", self.url))
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        response
            .get("translatedText")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| AssetError::translation("response has no translatedText"))
    }
}

/// Public Google Translate web endpoint (rate limited, no key)
pub struct GoogleWeb {
    client: Client,
    endpoint: String,
}

impl GoogleWeb {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
        })
    }
}

impl Translator for GoogleWeb {
    fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let response: JsonValue = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()?
            .error_for_status()?
            .json()?;
        parse_google_response(&response)
    }
}

/// Join the translated sentence chunks of a `translate_a/single` response
///
/// The response is a nested array whose first element lists
/// `[translated, original, ...]` chunks, one per sentence.
fn parse_google_response(response: &JsonValue) -> Result<String> {
    let chunks = response
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| AssetError::translation("unexpected response shape"))?;

    let translated: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(|v| v.as_str()))
        .collect();
    if translated.is_empty() {
        return Err(AssetError::translation("empty translation"));
    }
    Ok(translated)
}

/// Offline translator that tags text with the target language
///
/// Useful for dry runs: output files have the final structure and every
/// translated segment is visibly marked, e.g. `[HU] Thyroid`.
pub struct Tagging;

impl Translator for Tagging {
    fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
        Ok(format!("[{}] {}", target.to_uppercase(), text))
    }
}

/// Translate one piece of text, falling back to the original on failure
///
/// Empty or whitespace-only text, and identical source and target languages,
/// are returned unchanged without calling the translator.
pub fn translate_text(translator: &dyn Translator, text: &str, langs: &LanguagePair) -> String {
    if text.trim().is_empty() || langs.source == langs.target {
        return text.to_string();
    }
    match translator.translate(text, &langs.source, &langs.target) {
        Ok(translated) => translated,
        Err(e) => {
            let preview: String = text.chars().take(30).collect();
            tracing::warn!("keeping original text for {preview:?}: {e}");
            text.to_string()
        }
    }
}

/// A slice of a compound field: translatable text or a structural delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Delimiter(&'a str),
}

/// Split on `->` and `;`, attaching surrounding whitespace to the delimiter
fn split_compound(text: &str) -> Vec<Piece<'_>> {
    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut segment_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let delimiter_len = if bytes[i..].starts_with(b"->") {
            2
        } else if bytes[i] == b';' {
            1
        } else {
            i += 1;
            continue;
        };

        let mut start = i;
        while start > segment_start {
            match text[..start].chars().next_back() {
                Some(c) if c.is_whitespace() => start -= c.len_utf8(),
                _ => break,
            }
        }
        let mut end = i + delimiter_len;
        while let Some(c) = text[end..].chars().next() {
            if !c.is_whitespace() {
                break;
            }
            end += c.len_utf8();
        }

        pieces.push(Piece::Text(&text[segment_start..start]));
        pieces.push(Piece::Delimiter(&text[start..end]));
        segment_start = end;
        i = end;
    }

    pieces.push(Piece::Text(&text[segment_start..]));
    pieces
}

/// Translate text, keeping its leading and trailing whitespace
fn translate_trimmed(translator: &dyn Translator, text: &str, langs: &LanguagePair) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    format!("{leading}{}{trailing}", translate_text(translator, core, langs))
}

/// Translate a field that may encode pairs like `"A -> B"` or `"A->B; C->D"`
///
/// Text containing `->` is split on `->` and `;`; each segment is translated
/// on its own and the delimiters are put back exactly as they were, spacing
/// included. Other text is translated as a whole.
///
/// # Examples
/// ```
/// use assetprep::questions::{translate_compound, LanguagePair, Tagging};
///
/// let langs = LanguagePair::new("en", "hu");
/// assert_eq!(
///     translate_compound(&Tagging, "Insulin -> Pancreas", &langs),
///     "[HU] Insulin -> [HU] Pancreas"
/// );
/// ```
pub fn translate_compound(translator: &dyn Translator, text: &str, langs: &LanguagePair) -> String {
    if !text.contains("->") {
        return translate_trimmed(translator, text, langs);
    }

    split_compound(text)
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(segment) => translate_trimmed(translator, segment, langs),
            Piece::Delimiter(delimiter) => delimiter.to_string(),
        })
        .collect()
}

/// Produce a translated copy of a record
///
/// `question_text` and `explanation` are translated whole; each option and
/// `correct_answer` go through [`translate_compound`]. Only string values are
/// touched: nulls, non-string entries, the id and every other field are
/// copied unchanged, and a record that is not an object passes through as is.
pub fn translate_record(
    record: &QuestionRecord,
    translator: &dyn Translator,
    langs: &LanguagePair,
) -> QuestionRecord {
    let mut translated = record.clone();
    let Some(fields) = translated.fields_mut() else {
        return translated;
    };

    for key in ["question_text", "explanation"] {
        if let Some(JsonValue::String(text)) = fields.get_mut(key) {
            *text = translate_text(translator, text, langs);
        }
    }
    if let Some(JsonValue::String(answer)) = fields.get_mut("correct_answer") {
        *answer = translate_compound(translator, answer, langs);
    }
    if let Some(JsonValue::Array(options)) = fields.get_mut("options") {
        for option in options.iter_mut() {
            if let JsonValue::String(text) = option {
                *text = translate_compound(translator, text, langs);
            }
        }
    }

    translated
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn upper(text: &str, _source: &str, _target: &str) -> Result<String> {
        Ok(text.to_uppercase())
    }

    fn failing(_text: &str, _source: &str, _target: &str) -> Result<String> {
        Err(AssetError::translation("rate limited"))
    }

    fn langs() -> LanguagePair {
        LanguagePair::new("en", "hu")
    }

    #[test]
    fn test_split_compound_keeps_delimiter_spacing() {
        assert_eq!(
            split_compound("A->B;  C  ->D"),
            vec![
                Piece::Text("A"),
                Piece::Delimiter("->"),
                Piece::Text("B"),
                Piece::Delimiter(";  "),
                Piece::Text("C"),
                Piece::Delimiter("  ->"),
                Piece::Text("D"),
            ]
        );
    }

    #[test]
    fn test_split_compound_handles_unicode() {
        assert_eq!(
            split_compound("működés -> ár"),
            vec![
                Piece::Text("működés"),
                Piece::Delimiter(" -> "),
                Piece::Text("ár"),
            ]
        );
    }

    #[test]
    fn test_pair_option() {
        assert_eq!(translate_compound(&upper, "a -> b", &langs()), "A -> B");
    }

    #[test]
    fn test_multi_pair_answer() {
        assert_eq!(
            translate_compound(&upper, "tsh->pituitary; t4->thyroid", &langs()),
            "TSH->PITUITARY; T4->THYROID"
        );
    }

    #[test]
    fn test_plain_text_with_semicolon_is_whole() {
        let calls = std::sync::Mutex::new(Vec::new());
        let recording = |text: &str, _: &str, _: &str| -> Result<String> {
            calls.lock().unwrap().push(text.to_string());
            Ok(text.to_string())
        };
        translate_compound(&recording, "first; second", &langs());
        assert_eq!(*calls.lock().unwrap(), vec!["first; second".to_string()]);
    }

    #[test]
    fn test_empty_segments_are_not_translated() {
        let calls = std::sync::Mutex::new(0);
        let counting = |text: &str, _: &str, _: &str| -> Result<String> {
            *calls.lock().unwrap() += 1;
            Ok(text.to_uppercase())
        };
        assert_eq!(translate_compound(&counting, "a -> ; b", &langs()), "A -> ; B");
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_failure_falls_back_to_original() {
        assert_eq!(translate_text(&failing, "Thyroid", &langs()), "Thyroid");
        assert_eq!(translate_compound(&failing, "a -> b", &langs()), "a -> b");
    }

    #[test]
    fn test_same_language_skips_translator() {
        let same = LanguagePair::new("hu", "hu");
        assert_eq!(translate_text(&failing, "szöveg", &same), "szöveg");
    }

    #[test]
    fn test_translate_record_preserves_structure() {
        let record: QuestionRecord = serde_json::from_value(json!({
            "id": "tk10_7",
            "type": "matching",
            "bloom_level": "apply",
            "topic": "Adrenal",
            "subtopic": "Cortex",
            "question_text": "match",
            "options": ["cortisol -> stress", "plain"],
            "correct_answer": "cortisol->stress; aldosterone->salt",
            "explanation": "why"
        }))
        .unwrap();

        let translated = translate_record(&record, &upper, &langs());
        let before = serde_json::to_value(&record).unwrap();
        let after = serde_json::to_value(&translated).unwrap();

        assert_eq!(
            before.as_object().unwrap().len(),
            after.as_object().unwrap().len()
        );
        assert_eq!(after["id"], "tk10_7");
        assert_eq!(after["type"], "matching");
        assert_eq!(after["topic"], "Adrenal");
        assert_eq!(after["question_text"], "MATCH");
        assert_eq!(after["options"], json!(["CORTISOL -> STRESS", "PLAIN"]));
        assert_eq!(after["correct_answer"], "CORTISOL->STRESS; ALDOSTERONE->SALT");
        assert_eq!(after["explanation"], "WHY");
    }

    #[test]
    fn test_translate_record_keeps_irregular_values() {
        let record = QuestionRecord::from_value(json!({
            "id": 2,
            "question_text": "match",
            "options": ["a -> b", 3, null],
            "correct_answer": null,
            "explanation": null
        }));

        let after = translate_record(&record, &upper, &langs()).into_value();
        assert_eq!(after.as_object().unwrap().len(), 5);
        assert_eq!(after["id"], json!(2));
        assert_eq!(after["question_text"], "MATCH");
        assert_eq!(after["options"], json!(["A -> B", 3, null]));
        assert_eq!(after["correct_answer"], JsonValue::Null);
        assert_eq!(after["explanation"], JsonValue::Null);

        let stray = QuestionRecord::from_value(json!("loose text"));
        assert_eq!(translate_record(&stray, &upper, &langs()), stray);
    }

    #[test]
    fn test_tagging_translator() {
        assert_eq!(
            Tagging.translate("Thyroid", "en", "hu").unwrap(),
            "[HU] Thyroid"
        );
    }

    #[test]
    fn test_parse_google_response() {
        let response = json!([[["Helló ", "Hello ", null], ["világ", "world", null]], null, "en"]);
        assert_eq!(parse_google_response(&response).unwrap(), "Helló világ");
        assert!(parse_google_response(&json!({})).is_err());
        assert!(parse_google_response(&json!([[]])).is_err());
    }
}
