//! Conversion of video share URLs into embeddable player URLs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// A URL that can be used directly as the `src` of a player frame.
///
/// The only way to obtain one is [`normalize`], so a stored `broadCastUrl`
/// is never an arbitrary share URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmbedUrl(String);

impl EmbedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmbedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmbedUrl {
    type Error = Unrecognized;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        normalize(&value)
    }
}

impl From<EmbedUrl> for String {
    fn from(url: EmbedUrl) -> Self {
        url.0
    }
}

/// The input did not match any supported video URL pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unrecognized video URL")]
pub struct Unrecognized;

/// Normalize a YouTube URL into its canonical embed form.
///
/// Never panics; anything that is not a recognizable YouTube video URL maps to
/// [`Unrecognized`]. Normalizing an already-normalized URL returns it unchanged.
pub fn normalize(input: &str) -> Result<EmbedUrl, Unrecognized> {
    let url = Url::parse(input.trim()).map_err(|_| Unrecognized)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Unrecognized);
    }

    let host = url.host_str().ok_or(Unrecognized)?.to_ascii_lowercase();
    let host = strip_subdomain(&host);

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let video_id = match (host, segments.as_slice()) {
        ("youtube.com", ["watch"]) => query_value(&url, "v").ok_or(Unrecognized)?,
        ("youtube.com", ["embed" | "shorts" | "live" | "v", id]) => id.to_string(),
        ("youtube-nocookie.com", ["embed", id]) => id.to_string(),
        ("youtu.be", [id]) => id.to_string(),
        _ => return Err(Unrecognized),
    };

    if !is_video_id(&video_id) {
        return Err(Unrecognized);
    }

    let start = query_value(&url, "start")
        .or_else(|| query_value(&url, "t"))
        .and_then(|t| parse_offset(&t));

    let embed = match start {
        Some(seconds) => format!("{EMBED_BASE}{video_id}?start={seconds}"),
        None => format!("{EMBED_BASE}{video_id}"),
    };
    Ok(EmbedUrl(embed))
}

fn strip_subdomain(host: &str) -> &str {
    ["www.", "m.", "music."]
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
        .unwrap_or(host)
}

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Parse a playback offset: `90`, `90s`, `1m30s`, `1h2m3s`.
fn parse_offset(raw: &str) -> Option<u64> {
    if let Ok(seconds) = raw.parse::<u64>() {
        return (seconds > 0).then_some(seconds);
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let value: u64 = digits.parse().ok()?;
        digits.clear();
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return None,
        };
        total = total.checked_add(value.checked_mul(unit)?)?;
    }
    if !digits.is_empty() {
        return None;
    }
    (total > 0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embed(input: &str) -> Result<String, Unrecognized> {
        normalize(input).map(String::from)
    }

    #[test]
    fn watch_url_becomes_embed_url() {
        assert_eq!(
            embed("https://www.youtube.com/watch?v=XXXX").unwrap(),
            "https://www.youtube.com/embed/XXXX"
        );
    }

    #[test]
    fn short_and_alternate_forms() {
        let expected = "https://www.youtube.com/embed/dQw4w9WgXcQ";
        for input in [
            "https://youtu.be/dQw4w9WgXcQ",
            "http://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/live/dQw4w9WgXcQ?si=abc",
            "https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ",
            "  https://www.youtube.com/watch?v=dQw4w9WgXcQ  ",
        ] {
            assert_eq!(embed(input).unwrap(), expected, "input: {input}");
        }
    }

    #[test]
    fn offsets_are_carried_as_start() {
        assert_eq!(
            embed("https://youtu.be/abc_DEF-123?t=1m30s").unwrap(),
            "https://www.youtube.com/embed/abc_DEF-123?start=90"
        );
        assert_eq!(
            embed("https://www.youtube.com/watch?v=abc&t=45").unwrap(),
            "https://www.youtube.com/embed/abc?start=45"
        );
        assert_eq!(
            embed("https://www.youtube.com/watch?v=abc&t=oops").unwrap(),
            "https://www.youtube.com/embed/abc"
        );
    }

    #[test]
    fn normalizing_is_a_fixed_point() {
        for input in [
            "https://www.youtube.com/embed/XXXX",
            "https://www.youtube.com/embed/abc?start=90",
        ] {
            assert_eq!(embed(input).unwrap(), input);
        }
        let once = embed("https://youtu.be/XXXX?t=1h").unwrap();
        assert_eq!(embed(&once).unwrap(), once);
    }

    #[test]
    fn unrecognized_input() {
        for input in [
            "not a url",
            "",
            "ftp://youtube.com/watch?v=abc",
            "https://vimeo.com/12345",
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://www.youtube.com/embed/bad%20id",
            "https://youtu.be/",
            "https://www.youtube.com/channel/UC123/videos",
        ] {
            assert_eq!(embed(input), Err(Unrecognized), "input: {input}");
        }
    }

    #[test]
    fn deserializing_normalizes() {
        let url: EmbedUrl = serde_json::from_str(r#""https://youtu.be/XXXX""#).unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/embed/XXXX");
        assert!(serde_json::from_str::<EmbedUrl>(r#""nope""#).is_err());
    }
}
