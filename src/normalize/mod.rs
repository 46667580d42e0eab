use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Upper bound on any diagnostic preview carried inside an error.
pub const PREVIEW_LIMIT: usize = 2000;

/// Accepted key aliases per bundle slot, tried in order, first hit wins.
const MARKUP_ALIASES: [&str; 3] = ["index.html", "index", "html"];
const STYLESHEET_ALIASES: [&str; 3] = ["styles.css", "style.css", "css"];
const SCRIPT_ALIASES: [&str; 3] = ["script.js", "app.js", "js"];

#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The cleaned completion text held no parseable JSON object.
    #[error("model response not valid JSON")]
    InvalidModelOutput { preview: String },
    /// The parsed object resolved to an empty markup slot; `keys` records
    /// what the model actually emitted.
    #[error("generated bundle missing index.html")]
    MissingMarkup { keys: Vec<String> },
}

/// A generated website: exactly three files. Markup is never empty;
/// stylesheet and script may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub markup: String,
    pub stylesheet: String,
    pub script: String,
}

/// Known upstream payload shapes, probed in fixed priority order. An empty
/// string in a probed field counts as absent so later shapes can still
/// match; only a bare string payload is taken verbatim even when empty.
const SHAPE_PROBES: &[fn(&Value) -> Option<String>] = &[
    probe_plain_string,
    probe_choices_text,
    probe_choices_message,
    probe_output_content,
    probe_top_level_text,
];

fn probe_plain_string(payload: &Value) -> Option<String> {
    payload.as_str().map(str::to_owned)
}

fn non_empty(field: Option<&Value>) -> Option<String> {
    field?.as_str().filter(|s| !s.is_empty()).map(str::to_owned)
}

fn probe_choices_text(payload: &Value) -> Option<String> {
    non_empty(payload.get("choices")?.get(0)?.get("text"))
}

fn probe_choices_message(payload: &Value) -> Option<String> {
    non_empty(payload.get("choices")?.get(0)?.get("message")?.get("content"))
}

fn probe_output_content(payload: &Value) -> Option<String> {
    non_empty(payload.get("output")?.get(0)?.get("content"))
}

fn probe_top_level_text(payload: &Value) -> Option<String> {
    non_empty(payload.get("text"))
}

/// Pulls the completion text out of whatever the endpoint sent back.
/// Unrecognized shapes degrade to the serialized payload instead of failing;
/// the later parse step then produces the precise diagnostic.
pub fn extract_text(payload: &Value) -> String {
    SHAPE_PROBES
        .iter()
        .find_map(|probe| probe(payload))
        .unwrap_or_else(|| payload.to_string())
}

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^```[A-Za-z0-9_-]*\s*").unwrap());
static FENCE_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```\s*$").unwrap());

/// Strips a surrounding markdown code fence (with or without a language tag).
/// Interior content is untouched; stripping an already-stripped text is a
/// no-op.
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    let opened = FENCE_OPEN.replace(trimmed, "");
    let closed = FENCE_CLOSE.replace(&opened, "");
    closed.trim().to_string()
}

/// Strict object parse, then a first-`{`..last-`}` substring rescue.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str(text) {
        return Some(map);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn resolve_slot(object: &Map<String, Value>, aliases: &[&str]) -> String {
    aliases
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .unwrap_or("")
        .to_string()
}

/// Truncates to at most `limit` characters, respecting char boundaries.
pub fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Deterministically converts an upstream payload into a [`Bundle`], or
/// fails with a diagnosable error. Never retries, never panics on malformed
/// input.
pub fn normalize(payload: &Value) -> Result<Bundle, NormalizeError> {
    let text = strip_fences(&extract_text(payload));

    let Some(object) = parse_object(&text) else {
        return Err(NormalizeError::InvalidModelOutput {
            preview: preview(&text, PREVIEW_LIMIT),
        });
    };

    let markup = resolve_slot(&object, &MARKUP_ALIASES);
    if markup.is_empty() {
        return Err(NormalizeError::MissingMarkup {
            keys: object.keys().cloned().collect(),
        });
    }

    Ok(Bundle {
        markup,
        stylesheet: resolve_slot(&object, &STYLESHEET_ALIASES),
        script: resolve_slot(&object, &SCRIPT_ALIASES),
    })
}
