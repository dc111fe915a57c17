use serde::{Deserialize, Serialize};

use super::history::ColorHistory;

/// RGBA color with floating-point channels in [0.0, 1.0]. The canonical
/// external form is an uppercase `#RRGGBB` hex triplet; alpha participates in
/// parsing but not in the canonical form, so history deduplication and
/// display ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Create from 8-bit channels.
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self::rgb(
            f64::from(r) / 255.0,
            f64::from(g) / 255.0,
            f64::from(b) / 255.0,
        )
    }

    /// Canonical uppercase hex form, `#RRGGBB`. Channels are quantized to
    /// 8 bits; alpha is never serialized.
    pub fn hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            quantize(self.r),
            quantize(self.g),
            quantize(self.b)
        )
    }

    /// Rec. 709 luma (perceived brightness), returns 0.0..1.0.
    pub fn brightness(&self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Contrasting text color for this background: black on bright colors,
    /// white on dark ones.
    pub fn contrast_text(&self) -> &'static str {
        if self.brightness() > 0.5 {
            "black"
        } else {
            "white"
        }
    }

    /// Display name: the Chinese preset name when the canonical hex matches
    /// one of the ten presets, otherwise the hex string itself.
    pub fn display_name(&self) -> String {
        let hex = self.hex();
        PRESET_NAMES
            .iter()
            .find(|(preset_hex, _)| *preset_hex == hex)
            .map_or(hex, |(_, name)| (*name).to_string())
    }
}

fn quantize(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// The ten preset colors and their Chinese display names.
pub const PRESET_NAMES: [(&str, &str); 10] = [
    ("#FF0000", "红色"),
    ("#008000", "绿色"),
    ("#0000FF", "蓝色"),
    ("#FFFF00", "黄色"),
    ("#FFA500", "橙色"),
    ("#800080", "紫色"),
    ("#FFC0CB", "粉色"),
    ("#000000", "黑色"),
    ("#FFFFFF", "白色"),
    ("#808080", "灰色"),
];

// Name tables. The Chinese and English tables resolve to the same toolkit
// constants the original application used; "green" is the web green #008000,
// not the pure-lime #00FF00.
const CHINESE_NAMES: [(&str, [u8; 3]); 12] = [
    ("红色", [0xFF, 0x00, 0x00]),
    ("蓝色", [0x00, 0x00, 0xFF]),
    ("绿色", [0x00, 0x80, 0x00]),
    ("黄色", [0xFF, 0xFF, 0x00]),
    ("紫色", [0x80, 0x00, 0x80]),
    ("橙色", [0xFF, 0xA5, 0x00]),
    ("粉色", [0xFF, 0xC0, 0xCB]),
    ("黑色", [0x00, 0x00, 0x00]),
    ("白色", [0xFF, 0xFF, 0xFF]),
    ("灰色", [0x80, 0x80, 0x80]),
    ("深蓝", [0x00, 0x00, 0x8B]),
    ("浅蓝", [0xAD, 0xD8, 0xE6]),
];

const ENGLISH_NAMES: [(&str, [u8; 3]); 12] = [
    ("red", [0xFF, 0x00, 0x00]),
    ("blue", [0x00, 0x00, 0xFF]),
    ("green", [0x00, 0x80, 0x00]),
    ("yellow", [0xFF, 0xFF, 0x00]),
    ("purple", [0x80, 0x00, 0x80]),
    ("orange", [0xFF, 0xA5, 0x00]),
    ("pink", [0xFF, 0xC0, 0xCB]),
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xFF, 0xFF, 0xFF]),
    ("gray", [0x80, 0x80, 0x80]),
    ("darkblue", [0x00, 0x00, 0x8B]),
    ("lightblue", [0xAD, 0xD8, 0xE6]),
];

// Fallback table standing in for the toolkit's web-color parser. The core is
// toolkit-agnostic, so the common CSS names live here.
const WEB_NAMES: [(&str, [u8; 3]); 30] = [
    ("aqua", [0x00, 0xFF, 0xFF]),
    ("beige", [0xF5, 0xF5, 0xDC]),
    ("brown", [0xA5, 0x2A, 0x2A]),
    ("coral", [0xFF, 0x7F, 0x50]),
    ("crimson", [0xDC, 0x14, 0x3C]),
    ("cyan", [0x00, 0xFF, 0xFF]),
    ("darkgray", [0xA9, 0xA9, 0xA9]),
    ("darkgreen", [0x00, 0x64, 0x00]),
    ("darkred", [0x8B, 0x00, 0x00]),
    ("fuchsia", [0xFF, 0x00, 0xFF]),
    ("gold", [0xFF, 0xD7, 0x00]),
    ("grey", [0x80, 0x80, 0x80]),
    ("indigo", [0x4B, 0x00, 0x82]),
    ("ivory", [0xFF, 0xFF, 0xF0]),
    ("khaki", [0xF0, 0xE6, 0x8C]),
    ("lavender", [0xE6, 0xE6, 0xFA]),
    ("lightgray", [0xD3, 0xD3, 0xD3]),
    ("lightgreen", [0x90, 0xEE, 0x90]),
    ("lime", [0x00, 0xFF, 0x00]),
    ("magenta", [0xFF, 0x00, 0xFF]),
    ("maroon", [0x80, 0x00, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("olive", [0x80, 0x80, 0x00]),
    ("salmon", [0xFA, 0x80, 0x72]),
    ("silver", [0xC0, 0xC0, 0xC0]),
    ("skyblue", [0x87, 0xCE, 0xEB]),
    ("teal", [0x00, 0x80, 0x80]),
    ("tomato", [0xFF, 0x63, 0x47]),
    ("turquoise", [0x40, 0xE0, 0xD0]),
    ("violet", [0xEE, 0x82, 0xEE]),
];

const HISTORY_PREFIXES: [&str; 3] = ["历史颜色", "historycolor", "colorhistory"];

const CHINESE_NUMERALS: [(&str, usize); 8] = [
    ("一", 1),
    ("二", 2),
    ("三", 3),
    ("四", 4),
    ("五", 5),
    ("六", 6),
    ("七", 7),
    ("八", 8),
];

/// Parse a color literal. Recognized forms, tried in order: history
/// reference, hex literal, `rgb()`/`rgba()`, Chinese name, English name,
/// web-color fallback. Returns `None` when nothing matches; callers report
/// "cannot recognize color".
pub fn parse(input: &str, history: &ColorHistory) -> Option<Color> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();

    if HISTORY_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return parse_history_reference(&lower, history);
    }

    if let Some(digits) = lower.strip_prefix('#') {
        return parse_hex_digits(digits);
    }

    if lower.starts_with("rgb") {
        return parse_functional(&lower);
    }

    lookup(&CHINESE_NAMES, &lower)
        .or_else(|| lookup(&ENGLISH_NAMES, &lower))
        .or_else(|| lookup(&WEB_NAMES, &lower))
}

fn lookup(table: &[(&str, [u8; 3])], name: &str) -> Option<Color> {
    table
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, [r, g, b])| Color::from_u8(*r, *g, *b))
}

/// Resolve a `历史颜色N` / `historycolorN` reference against the history.
/// The index is 1-based (1 = newest) and clamped to `[1, history.len()]`;
/// an empty history never resolves.
fn parse_history_reference(lower: &str, history: &ColorHistory) -> Option<Color> {
    let mut rest = lower.to_string();
    for word in HISTORY_PREFIXES.iter().chain(["历史", "颜色"].iter()) {
        rest = rest.replace(word, "");
    }
    let rest = rest.trim();

    let index = CHINESE_NUMERALS
        .iter()
        .find(|(numeral, _)| *numeral == rest)
        .map(|(_, n)| *n)
        .or_else(|| rest.parse::<usize>().ok())?;

    if history.is_empty() {
        return None;
    }
    history.get(index.clamp(1, history.len()))
}

fn parse_hex_digits(digits: &str) -> Option<Color> {
    if digits.len() != 6 && digits.len() != 8 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    let mut color = Color::from_u8(r, g, b);
    if digits.len() == 8 {
        color.a = f64::from(channel(6..8)?) / 255.0;
    }
    Some(color)
}

fn parse_functional(lower: &str) -> Option<Color> {
    let inner = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |idx: usize| {
        parts
            .get(idx)
            .and_then(|p| p.parse::<f64>().ok())
            .filter(|v| (0.0..=255.0).contains(v))
            .map(|v| v / 255.0)
    };
    let r = channel(0)?;
    let g = channel(1)?;
    let b = channel(2)?;

    if let Some(alpha_part) = parts.get(3) {
        let a = alpha_part
            .parse::<f64>()
            .ok()
            .filter(|v| (0.0..=1.0).contains(v))?;
        Some(Color::rgba(r, g, b, a))
    } else {
        Some(Color::rgb(r, g, b))
    }
}
