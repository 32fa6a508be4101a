//! Display catalog: human-readable names, icons and colours.
//!
//! The events API identifies events and maps by raw English identifiers.
//! The catalog translates them for display. Unknown identifiers fall back to
//! the raw identifier (names), a generic icon, or the default accent colour.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Icon used for events missing from the icon table.
pub const FALLBACK_ICON: &str = "⚔️";

/// Accent colour used for maps missing from the colour table.
pub const DEFAULT_ACCENT: Rgb = Rgb(0x60, 0xa5, 0xfa);

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linearly blends `self` over `background` with the given opacity.
    pub fn over(self, background: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Rgb(
            mix(self.0, background.0),
            mix(self.1, background.1),
            mix(self.2, background.2),
        )
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parses `#rrggbb` (the leading `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour `{}`: expected #rrggbb", s));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| format!("invalid colour `{}`: not hexadecimal", s))
        };
        Ok(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Lookup tables keyed by raw event and map identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCatalog {
    /// Display names for events.
    pub event_names: BTreeMap<String, String>,
    /// Icons (emoji) for events.
    pub event_icons: BTreeMap<String, String>,
    /// Display names for maps.
    pub map_names: BTreeMap<String, String>,
    /// Accent colours for maps, as `#rrggbb`.
    pub map_colors: BTreeMap<String, String>,
}

impl Default for DisplayCatalog {
    fn default() -> Self {
        Self {
            event_names: table(&[
                ("Night Raid", "Ночной Рейд"),
                ("Electromagnetic Storm", "ЭМ Шторм"),
                ("Matriarch", "Матриарх"),
                ("Lush Blooms", "Пышное Цветение"),
                ("Harvester", "Жнец"),
                ("Prospecting Probes", "Разведзонды"),
                ("Hidden Bunker", "Скрытый Бункер"),
                ("Locked Gate", "Запертые Врата"),
                ("Launch Tower Loot", "Лут Пусковой Башни"),
            ]),
            event_icons: table(&[
                ("Night Raid", "🌙"),
                ("Electromagnetic Storm", "⚡"),
                ("Matriarch", "👑"),
                ("Lush Blooms", "🌸"),
                ("Harvester", "🔧"),
                ("Prospecting Probes", "📡"),
                ("Hidden Bunker", "🏚️"),
                ("Locked Gate", "🔒"),
                ("Launch Tower Loot", "🚀"),
            ]),
            map_names: table(&[
                ("Dam", "Дамба"),
                ("Stella Montis", "Стелла Монтис"),
                ("Blue Gate", "Синие Врата"),
                ("Spaceport", "Космопорт"),
                ("Buried City", "Погребённый Город"),
            ]),
            map_colors: table(&[
                ("Dam", "#60a5fa"),
                ("Stella Montis", "#c084fc"),
                ("Blue Gate", "#22d3ee"),
                ("Spaceport", "#fbbf24"),
                ("Buried City", "#f472b6"),
            ]),
        }
    }
}

impl DisplayCatalog {
    /// Creates a catalog with empty tables (every lookup falls back).
    pub fn empty() -> Self {
        Self {
            event_names: BTreeMap::new(),
            event_icons: BTreeMap::new(),
            map_names: BTreeMap::new(),
            map_colors: BTreeMap::new(),
        }
    }

    /// Returns a copy of `self` with every entry of `overrides` applied on top.
    #[must_use]
    pub fn merged(mut self, overrides: &DisplayCatalog) -> Self {
        self.event_names.extend(overrides.event_names.clone());
        self.event_icons.extend(overrides.event_icons.clone());
        self.map_names.extend(overrides.map_names.clone());
        self.map_colors.extend(overrides.map_colors.clone());
        self
    }

    /// Display name of an event.
    pub fn event_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.event_names.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Icon of an event.
    pub fn event_icon(&self, raw: &str) -> &str {
        self.event_icons
            .get(raw)
            .map(String::as_str)
            .unwrap_or(FALLBACK_ICON)
    }

    /// Display name of a map.
    pub fn map_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.map_names.get(raw).map(String::as_str).unwrap_or(raw)
    }

    /// Accent colour of a map.
    ///
    /// Unparseable entries are treated like missing ones; [`Self::validate`]
    /// reports them up front.
    pub fn map_color(&self, raw: &str) -> Rgb {
        self.map_colors
            .get(raw)
            .and_then(|hex| hex.parse().ok())
            .unwrap_or(DEFAULT_ACCENT)
    }

    /// Checks that every colour entry parses.
    pub fn validate(&self) -> Result<(), String> {
        for (map, hex) in &self.map_colors {
            hex.parse::<Rgb>()
                .map_err(|e| format!("map_colors.{}: {}", map, e))?;
        }
        Ok(())
    }
}

fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
