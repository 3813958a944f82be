//! Response Repair & Decode — turns raw completion text into typed values.
//!
//! Three deterministic steps, always in this order:
//! 1. `strip_code_fences` — drop a leading ```/```json marker and a trailing ```.
//! 2. `repair_json`       — best-effort fix-up into syntactically valid JSON.
//! 3. `decode_*`          — structural decode into `ContentIdeas` or `ScoreMap`.
//!
//! Repair runs even on clean input (it is idempotent there). It never invents
//! closing brackets: output cut off mid-object is `UnrepairableOutput`, not a
//! partially filled value.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::llm_client::LlmError;
use crate::models::content::{ContentIdeas, CONTENT_IDEAS_FIELDS};

/// Positional key (`"Article {n}"`, 1-based) → raw score from the model.
pub type ScoreMap = HashMap<String, f64>;

// ────────────────────────────────────────────────────────────────────────────
// Step 1: fence stripping
// ────────────────────────────────────────────────────────────────────────────

/// Strips ```json ... ``` or ``` ... ``` code fences and surrounding whitespace.
/// Text without a leading fence is only trimmed.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Language tag runs to the end of the first line, e.g. "json" or "JSON".
    let rest = match rest.find('\n') {
        Some(idx) if rest[..idx].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
            &rest[idx + 1..]
        }
        _ => rest
            .strip_prefix("json")
            .or_else(|| rest.strip_prefix("JSON"))
            .unwrap_or(rest),
    };

    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

// ────────────────────────────────────────────────────────────────────────────
// Step 2: repair
// ────────────────────────────────────────────────────────────────────────────

/// Rewrites near-JSON into valid JSON.
///
/// Handles: prose before/after the first object or array, trailing and doubled
/// commas, single-quoted strings, bare object keys, `//` and `/* */` comments,
/// Python literals (`True`, `False`, `None`), raw control characters inside
/// strings, and stray closing brackets that match nothing.
///
/// Prose may itself contain brackets (`"Scores [1-10] below:"`). A candidate
/// root that closes but does not parse is skipped and the next `{`/`[` is
/// tried. A root that runs off the end of the text stops the search: every
/// later candidate sits inside it, so the output is truncated.
///
/// Fails with `UnrepairableOutput` when no object/array is present, when a
/// string or container is left unterminated, or when no candidate parses.
pub fn repair_json(text: &str) -> Result<String, LlmError> {
    let mut first_invalid = None;

    for (start, _) in text.match_indices(['{', '[']) {
        match repair_from_root(&text[start..]) {
            Ok(repaired) => {
                if first_invalid.is_some() {
                    debug!("Skipped bracketed prose; JSON root found at offset {start}");
                }
                return Ok(repaired);
            }
            Err(RootFailure::Truncated(e)) => return Err(e),
            Err(RootFailure::Invalid(e)) => {
                first_invalid.get_or_insert(e);
            }
        }
    }

    Err(first_invalid.unwrap_or_else(|| {
        LlmError::UnrepairableOutput("no JSON object or array found".into())
    }))
}

enum RootFailure {
    /// Input ended inside a string or container.
    Truncated(LlmError),
    /// The root closed but the repaired text is not JSON.
    Invalid(LlmError),
}

/// Repairs the value that starts at `text[0]`, which must be `{` or `[`.
fn repair_from_root(text: &str) -> Result<String, RootFailure> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut closers: Vec<char> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out).map_err(RootFailure::Truncated)?;
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                continue;
            }
            '{' => {
                closers.push('}');
                out.push(c);
            }
            '[' => {
                closers.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if closers.last() != Some(&c) {
                    debug!("Dropping unmatched '{c}' at offset {i}");
                    i += 1;
                    continue;
                }
                closers.pop();
                trim_trailing_comma(&mut out);
                out.push(c);
                if closers.is_empty() {
                    // Root value is complete; anything after it is prose.
                    break;
                }
            }
            ',' => {
                if !matches!(last_significant(&out), Some(',' | '{' | '[')) {
                    out.push(c);
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let end = word_end(&chars, i);
                let word: String = chars[i..end].iter().collect();
                let in_object = closers.last() == Some(&'}');
                if in_object && matches!(last_significant(&out), Some('{' | ',')) {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(match word.as_str() {
                        "True" => "true",
                        "False" => "false",
                        "None" | "NaN" | "undefined" => "null",
                        other => other,
                    });
                }
                i = end;
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }

    if let Some(expected) = closers.last() {
        return Err(RootFailure::Truncated(LlmError::UnrepairableOutput(format!(
            "output ends before a closing '{expected}'"
        ))));
    }

    serde_json::from_str::<Value>(&out).map_err(|e| {
        RootFailure::Invalid(LlmError::UnrepairableOutput(format!(
            "repaired text is still invalid: {e}"
        )))
    })?;

    Ok(out)
}

/// Copies the string literal starting at `chars[start]` into `out` as a
/// double-quoted JSON string. Returns the index just past the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> Result<usize, LlmError> {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let Some(&next) = chars.get(i + 1) else {
                    break;
                };
                if next == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(next);
                }
                i += 2;
                continue;
            }
            c if c == quote => {
                out.push('"');
                return Ok(i + 1);
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
        i += 1;
    }

    Err(LlmError::UnrepairableOutput(
        "output ends inside a string literal".into(),
    ))
}

fn word_end(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len()
        && (chars[end].is_ascii_alphanumeric() || matches!(chars[end], '_' | '$' | '-'))
    {
        end += 1;
    }
    end
}

fn last_significant(out: &str) -> Option<char> {
    out.chars().rev().find(|c| !c.is_whitespace())
}

fn trim_trailing_comma(out: &mut String) {
    let len = out.trim_end().len();
    if out[..len].ends_with(',') {
        out.truncate(len - 1);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Step 3: decode
// ────────────────────────────────────────────────────────────────────────────

/// Fence-strip, repair and parse into a generic JSON value.
fn normalize(raw: &str) -> Result<Value, LlmError> {
    let repaired = repair_json(strip_code_fences(raw))?;
    serde_json::from_str(&repaired).map_err(|e| LlmError::UnrepairableOutput(e.to_string()))
}

/// Decodes raw completion text into `ContentIdeas`.
///
/// The top level must be an object carrying at least one known platform key.
/// Unknown keys are ignored; known keys set to `null` count as empty.
pub fn decode_content_ideas(raw: &str) -> Result<ContentIdeas, LlmError> {
    let Value::Object(mut map) = normalize(raw)? else {
        return Err(LlmError::SchemaMismatch(
            "content ideas must be a JSON object".into(),
        ));
    };

    if !CONTENT_IDEAS_FIELDS.iter().any(|f| map.contains_key(*f)) {
        return Err(LlmError::SchemaMismatch(format!(
            "none of the expected keys are present (found: {})",
            map.keys().cloned().collect::<Vec<_>>().join(", ")
        )));
    }

    map.retain(|_, v| !v.is_null());

    serde_json::from_value(Value::Object(map)).map_err(|e| LlmError::SchemaMismatch(e.to_string()))
}

/// Decodes raw completion text into a `ScoreMap`.
///
/// The top level must be an object. Numbers and numeric strings are kept;
/// anything else is skipped, which leaves that article at the default score.
pub fn decode_score_map(raw: &str) -> Result<ScoreMap, LlmError> {
    let Value::Object(map) = normalize(raw)? else {
        return Err(LlmError::SchemaMismatch(
            "score map must be a JSON object".into(),
        ));
    };

    let mut scores = ScoreMap::with_capacity(map.len());
    for (key, value) in map {
        let score = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match score {
            Some(score) if score.is_finite() => {
                scores.insert(key, score);
            }
            _ => warn!("Ignoring non-numeric score for '{key}': {value}"),
        }
    }
    Ok(scores)
}
