//! `--extension` option parsing
//!
//! An option names an extension and optionally attaches settings:
//!
//! ```text
//! cache
//! cache:path=/var/cache/mirror
//! pause-at-hook:pause=BEFORE_UPLOAD_TO_S3
//! remove-fields-from-json:remove=[authors,homepage]
//! skip-step-after-hook:skip=[BEFORE_UPLOAD_TO_S3,BEFORE_REMOVE_MISSING_FILES_FROM_S3],verbose=true
//! cache:path='/tmp/a:b'
//! ```
//!
//! Settings are separated by `:` or `,`. A `'` pair quotes delimiters and
//! `\` escapes the next character. `[a,b]` is a list. `true`, `false` and
//! `null` are coerced to their JSON values, numeric tokens to integers, and
//! everything else stays a string. Dotted keys are expanded, so
//! `cache.path=x` becomes `{"cache": {"path": "x"}}`.

use mirror_meta::path::undot;
use serde_json::{Map, Number, Value};

use crate::{Error, PluginConfig, Result};

const DELIMITERS: &[char] = &[':', ','];
const QUOTE: char = '\'';
const ESCAPE: char = '\\';

/// A parsed `--extension` option.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionOption {
    /// Extension key
    pub key: String,
    /// Attached settings, `None` when the option carries none
    pub config: Option<PluginConfig>,
    /// Whether the option disables the extension (`enabled=false`)
    pub disable: bool,
}

impl ExtensionOption {
    /// Parse `name` or `name:key=value,...`.
    pub fn parse(option: &str) -> Result<Self> {
        let (key, settings) = match option.split_once(':') {
            Some((key, settings)) => (key.trim(), settings),
            None => (option.trim(), ""),
        };
        if key.is_empty() {
            return Err(Error::invalid_option(option, "missing extension name"));
        }

        if settings.is_empty() {
            return Ok(Self {
                key: key.to_string(),
                config: None,
                disable: false,
            });
        }

        let mut flat = Map::new();
        for piece in split(settings, DELIMITERS).map_err(|reason| Error::invalid_option(option, reason))? {
            if piece.text.is_empty() && !piece.quoted {
                continue;
            }
            let Some((name, value)) = piece.text.split_once('=') else {
                return Err(Error::invalid_option(
                    option,
                    format!("expected key=value, found '{}'", piece.text),
                ));
            };
            let value = if piece.quoted {
                Value::String(value.to_string())
            } else {
                coerce_value(value).map_err(|reason| Error::invalid_option(option, reason))?
            };
            flat.insert(name.trim().to_string(), value);
        }

        let Value::Object(nested) = undot(flat) else {
            return Err(Error::invalid_option(option, "settings are not an object"));
        };
        let disable = nested.get("enabled") == Some(&Value::Bool(false));

        Ok(Self {
            key: key.to_string(),
            config: Some(PluginConfig::new(nested)),
            disable,
        })
    }
}

/// A delimited piece of an option string.
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    text: String,
    quoted: bool,
}

/// Split `input` at top-level delimiters, honouring quotes and escapes.
///
/// Text inside brackets is copied verbatim so list values can be split
/// again on their own.
fn split(input: &str, delimiters: &[char]) -> std::result::Result<Vec<Piece>, String> {
    let mut pieces = Vec::new();
    let mut current = Piece {
        text: String::new(),
        quoted: false,
    };
    let mut in_quotes = false;
    let mut depth = 0usize;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if depth > 0 {
            current.text.push(ch);
            match ch {
                ESCAPE => {
                    if let Some(next) = chars.next() {
                        current.text.push(next);
                    }
                }
                QUOTE => in_quotes = !in_quotes,
                '[' if !in_quotes => depth += 1,
                ']' if !in_quotes => depth -= 1,
                _ => {}
            }
            continue;
        }

        match ch {
            ESCAPE => match chars.next() {
                Some(next) => current.text.push(next),
                None => return Err("dangling escape character".to_string()),
            },
            QUOTE => {
                in_quotes = !in_quotes;
                current.quoted = true;
            }
            '[' if !in_quotes => {
                depth += 1;
                current.text.push(ch);
            }
            c if !in_quotes && delimiters.contains(&c) => {
                pieces.push(std::mem::replace(
                    &mut current,
                    Piece {
                        text: String::new(),
                        quoted: false,
                    },
                ));
            }
            c => current.text.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if depth > 0 {
        return Err("unterminated list".to_string());
    }
    pieces.push(current);
    Ok(pieces)
}

/// Coerce an unquoted value token, expanding `[a,b]` lists.
fn coerce_value(token: &str) -> std::result::Result<Value, String> {
    let trimmed = token.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        if inner.trim().is_empty() {
            return Ok(Value::Array(Vec::new()));
        }
        let items = split(inner, &[','])?
            .into_iter()
            .map(|piece| {
                if piece.quoted {
                    Ok(Value::String(piece.text))
                } else {
                    coerce_value(&piece.text)
                }
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        return Ok(Value::Array(items));
    }
    Ok(coerce_scalar(trimmed))
}

/// Coerce a scalar token: booleans, null and integers, else a string.
pub fn coerce_scalar(token: &str) -> Value {
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(int) = token.parse::<i64>() {
        return Value::Number(int.into());
    }
    if looks_numeric(token)
        && let Ok(float) = token.parse::<f64>()
        && float.is_finite()
    {
        return Value::Number(Number::from(float.trunc() as i64));
    }
    Value::String(token.to_string())
}

fn looks_numeric(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.')
        && token
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
}
