//! Timeline scripts: the `<name>_timeline = [...]` files shipped next to a
//! sprite sheet, or plain JSON arrays.

use std::path::Path;

use crate::error::{AnimError, Result};
use crate::timeline::{Frame, Timeline};

/// A parsed script: the timeline plus the variable it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub variable: Option<String>,
    pub timeline: Timeline,
}

const DECLARATION_KEYWORDS: [&str; 3] = ["var", "let", "const"];
const DIRECTIVES: [&str; 2] = ["\"use strict\"", "'use strict'"];

/// Parse script text.
///
/// Accepted forms:
/// * `[ {...}, ... ]`
/// * `name = [ ... ]` with optional `var`/`let`/`const` and trailing `;`
///
/// Leading `//` and `/* */` comments and a `"use strict"` directive are
/// skipped.
pub fn parse(text: &str) -> Result<Script> {
    let body = skip_preamble(text.trim_start_matches('\u{feff}'))?.trim_end();

    let (variable, json) = if body.starts_with('[') {
        (None, body)
    } else {
        let (lhs, rhs) = body.split_once('=').ok_or_else(|| {
            AnimError::Parse(format!(
                "expected a JSON array or `name = [...]`, found {:?}",
                first_line(body)
            ))
        })?;
        (Some(parse_variable(lhs)?), rhs.trim())
    };

    let json = json.strip_suffix(';').unwrap_or(json).trim_end();
    let frames: Vec<Frame> =
        serde_json::from_str(json).map_err(|e| AnimError::Parse(e.to_string()))?;

    Ok(Script { variable, timeline: Timeline::new(frames) })
}

/// Read and parse a script file.
pub fn load(path: &Path) -> Result<Script> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

pub fn write(timeline: &Timeline, variable: &str) -> Result<String> {
    check_variable(variable)?;
    Ok(format!("{variable} = {}", timeline.to_json()?))
}

/// Reject names that cannot be assigned to in a script (`my-anim`, `1x`).
pub fn check_variable(name: &str) -> Result<()> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(AnimError::Parse(format!("invalid variable name {name:?}")))
    }
}

/// Drop comments and directives in front of the first statement.
fn skip_preamble(mut body: &str) -> Result<&str> {
    loop {
        body = body.trim_start();
        if let Some(rest) = body.strip_prefix("//") {
            body = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = body.strip_prefix("/*") {
            let (_, tail) = rest
                .split_once("*/")
                .ok_or_else(|| AnimError::Parse("unterminated block comment".into()))?;
            body = tail;
        } else if let Some(rest) = DIRECTIVES.iter().find_map(|d| body.strip_prefix(d)) {
            let rest = rest.trim_start();
            body = rest.strip_prefix(';').unwrap_or(rest);
        } else {
            return Ok(body);
        }
    }
}

fn first_line(body: &str) -> &str {
    body.lines().next().unwrap_or_default()
}

fn parse_variable(lhs: &str) -> Result<String> {
    let mut name = lhs.trim();
    if let Some((keyword, rest)) = name.split_once(char::is_whitespace) {
        if DECLARATION_KEYWORDS.contains(&keyword) {
            name = rest.trim();
        }
    }
    check_variable(name)?;
    Ok(name.to_string())
}

/// JS identifier, optionally dotted (`window.anim`).
fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        })
}
