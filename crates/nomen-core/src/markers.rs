//! Cross-reference markers embedded in raw definition text
//!
//! Gold Book definitions mention other entries as `@A00001@`. The extractor
//! pairs each opening delimiter with the next closing delimiter after it and
//! reports the payloads in the order they appear.
//!
//! Known limitation: nesting is not supported. `@a @b@ c@` yields `"a "` and
//! then `" c"` is never closed. An opening delimiter with no closing delimiter
//! after it is ignored and stays in the text. With identical open and close
//! delimiters an odd delimiter count leaves the last one unpaired.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    #[serde(default = "default_delimiter")]
    pub open: String,
    #[serde(default = "default_delimiter")]
    pub close: String,
}

fn default_delimiter() -> String {
    "@".to_string()
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: default_delimiter(),
            close: default_delimiter(),
        }
    }
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// A located marker. `start..end` spans the delimiters as well as the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub payload: String,
    pub start: usize,
    pub end: usize,
}

pub fn extract_markers(text: &str, delimiters: &Delimiters) -> Vec<Marker> {
    let (open, close) = (delimiters.open.as_str(), delimiters.close.as_str());
    if open.is_empty() || close.is_empty() {
        return Vec::new();
    }

    let mut markers = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = text[cursor..].find(open) {
        let start = cursor + offset;
        let payload_start = start + open.len();
        let Some(len) = text[payload_start..].find(close) else {
            break;
        };
        let payload_end = payload_start + len;
        let end = payload_end + close.len();
        markers.push(Marker {
            payload: text[payload_start..payload_end].to_string(),
            start,
            end,
        });
        cursor = end;
    }
    markers
}

pub fn extract_payloads(text: &str, delimiters: &Delimiters) -> Vec<String> {
    extract_markers(text, delimiters)
        .into_iter()
        .map(|marker| marker.payload)
        .collect()
}
