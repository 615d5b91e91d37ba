use crate::foundation::core::Rgba8;

/// Named swatch tables, one per biome.
pub const BIOMES: &[(&str, &[&str])] = &[
    (
        "Antarctica",
        &["#748cab", "#0d1321", "#1d2d44", "#3e5c76", "#f0ebd8"],
    ),
    (
        "Savannah",
        &["#606c38", "#283618", "#fefae0", "#dda15e", "#bc6c25"],
    ),
    (
        "Swamp",
        &["#3a5a40", "#cad2c5", "#84a98c", "#588157", "#344e41"],
    ),
    (
        "Desert",
        &["#99582a", "#6f1d1b", "#bb9457", "#432818", "#ffe6a7"],
    ),
    (
        "Jungle",
        &["#0ead69", "#540d6e", "#ee4266", "#ffd23f", "#3bceac"],
    ),
    (
        "Tundra",
        &[
            "#dbdbc7ff",
            "#b98b73",
            "#ddbea9",
            "#d4c7b0",
            "rgba(216, 224, 201, 1)",
            "#6b705c",
            "#3f4238",
        ],
    ),
    (
        "Ocean",
        &["#2f6690", "#3a7ca5", "#d9dcd6", "#16425b", "#81c3d7"],
    ),
    (
        "Meadow",
        &["#a7c957", "#386641", "#6a994e", "#f2e8cf", "#bc4749"],
    ),
    (
        "Canyon",
        &["#9a031e", "#5f0f40", "#fb8b24", "#e36414", "#0f4c5c"],
    ),
];

/// Number of built-in biomes.
pub fn biome_count() -> usize {
    BIOMES.len()
}

/// Clamp an arbitrary palette index onto the biome table.
pub fn clamp_biome_index(index: i64) -> usize {
    index.clamp(0, biome_count() as i64 - 1) as usize
}

/// An ordered list of swatches. The first swatch doubles as the background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    name: String,
    swatches: Vec<Rgba8>,
}

impl Palette {
    pub fn new(name: impl Into<String>, swatches: Vec<Rgba8>) -> Self {
        Self {
            name: name.into(),
            swatches,
        }
    }

    /// Built-in biome palette. Returns `None` for an index past the table.
    pub fn biome(index: usize) -> Option<Self> {
        let (name, raw) = BIOMES.get(index)?;
        let swatches = raw
            .iter()
            .filter_map(|s| match parse_color(s) {
                Ok(c) => Some(c),
                Err(e) => {
                    tracing::warn!(biome = %name, swatch = %s, error = %e, "skipping swatch");
                    None
                }
            })
            .collect();
        Some(Self::new(*name, swatches))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn swatches(&self) -> &[Rgba8] {
        &self.swatches
    }

    pub fn is_empty(&self) -> bool {
        self.swatches.is_empty()
    }

    pub fn background(&self) -> Rgba8 {
        self.swatches.first().copied().unwrap_or(Rgba8::BLACK)
    }
}

/// Parse `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)` with `a` in `[0, 1]`.
pub fn parse_color(s: &str) -> Result<Rgba8, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_functional(body);
    }
    Err(format!("unsupported color syntax \"{s}\""))
}

fn parse_hex(s: &str) -> Result<Rgba8, String> {
    fn hex_byte(pair: &str) -> Result<u8, String> {
        u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
    }

    if !s.is_ascii() {
        return Err("hex color must be ascii".to_owned());
    }
    match s.len() {
        6 => Ok(Rgba8::opaque(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
        )),
        8 => Ok(Rgba8::new(
            hex_byte(&s[0..2])?,
            hex_byte(&s[2..4])?,
            hex_byte(&s[4..6])?,
            hex_byte(&s[6..8])?,
        )),
        _ => Err("hex color must be #RRGGBB or #RRGGBBAA".to_owned()),
    }
}

fn parse_functional(body: &str) -> Result<Rgba8, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!("expected 3 or 4 components, got {}", parts.len()));
    }

    let channel = |p: &str| -> Result<u8, String> {
        let v: f64 = p
            .parse()
            .map_err(|_| format!("invalid color channel \"{p}\""))?;
        Ok(v.round().clamp(0.0, 255.0) as u8)
    };
    let alpha = match parts.get(3) {
        Some(p) => {
            let v: f64 = p.parse().map_err(|_| format!("invalid alpha \"{p}\""))?;
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        None => 255,
    };

    Ok(Rgba8::new(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/params/palette.rs"]
mod tests;
