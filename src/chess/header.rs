//! Locating header tags and the movetext section in a raw game text blob.

use std::sync::LazyLock;

use regex::Regex;

use super::error::{ErrorAccumulator, ParseError};
use super::types::GameHeader;

fn tag_regex(tag: &str) -> Regex {
    Regex::new(&format!(r#"\b{tag}\s+"([^"]*)""#)).expect("valid header tag regex")
}

static WHITE_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("White"));
static BLACK_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("Black"));
static ECO_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("ECO"));
static TIME_CONTROL_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("TimeControl"));
static SITE_RE: LazyLock<Regex> = LazyLock::new(|| tag_regex("Site"));

fn find_tag<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Read the required header fields. Every missing tag is named in the error.
pub fn parse_header(text: &str) -> Result<GameHeader, ParseError> {
    let mut missing = ErrorAccumulator::default();
    let mut required = |name: &str, re: &Regex| -> String {
        match find_tag(re, text) {
            Some(value) => value.to_string(),
            None => {
                missing.push(name);
                String::new()
            }
        }
    };

    let white = required("White", &WHITE_RE);
    let black = required("Black", &BLACK_RE);
    let eco = required("ECO", &ECO_RE);
    let time_control = required("TimeControl", &TIME_CONTROL_RE);

    if let Some(tags) = missing.take() {
        return Err(ParseError::MissingHeader(tags));
    }

    Ok(GameHeader {
        game_id: find_tag(&SITE_RE, text)
            .map(game_id_from_site)
            .unwrap_or_default(),
        white,
        black,
        eco,
        time_control,
    })
}

/// Last path segment of a site URL (`https://lichess.org/5WDTKQIn` -> `5WDTKQIn`).
pub fn game_id_from_site(site: &str) -> String {
    site.trim()
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Byte offset just past the tag-pair section: the last line opening with
/// `[` before the first other non-blank line.
fn header_end(text: &str) -> usize {
    let mut end = 0;
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            end = offset + line.len();
        } else if !trimmed.trim().is_empty() {
            break;
        }
        offset += line.len();
    }
    end
}

/// The move section starts at the first `1.` after the tag-pair section.
pub fn locate_movetext(text: &str) -> Result<&str, ParseError> {
    let end_header = header_end(text);
    text[end_header..]
        .find("1.")
        .map(|offset| &text[end_header + offset..])
        .ok_or(ParseError::MissingMovetext)
}

/// `"180+2"` -> `(180, 2)`. Unparsable parts read as 0.
pub fn parse_time_control(raw: &str) -> (u32, u32) {
    let mut parts = raw.trim().splitn(2, '+');
    let base = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    let increment = parts
        .next()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0);
    (base, increment)
}
