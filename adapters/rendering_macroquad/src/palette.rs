use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use gridtown_core::{BuildingVariantId, RoadVariantId};
use gridtown_rendering::Color;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

const DEFAULT_BUILDING_COLOR: Color = Color::from_rgb_u8(0x8d, 0x99, 0xae);
const DEFAULT_ROAD_COLOR: Color = Color::from_rgb_u8(0x3a, 0x3d, 0x4a);

/// Maps symbolic variant identifiers to the colors this backend draws with.
///
/// The palette starts from a built-in set; a manifest on disk can override
/// or extend it. Unknown variants resolve to per-category defaults so a
/// scene never fails to draw because of a missing palette entry.
#[derive(Clone, Debug)]
pub struct VariantPalette {
    buildings: HashMap<String, Color>,
    roads: HashMap<String, Color>,
}

impl VariantPalette {
    /// Returns the palette shipped with the backend.
    #[must_use]
    pub fn builtin() -> Self {
        let mut buildings = HashMap::new();
        let _ = buildings.insert("slab".to_owned(), Color::from_rgb_u8(0xb8, 0xc4, 0xd4));
        let _ = buildings.insert("tower".to_owned(), Color::from_rgb_u8(0x7f, 0x96, 0xb2));
        let _ = buildings.insert("block".to_owned(), Color::from_rgb_u8(0x9c, 0x8f, 0x7f));

        let mut roads = HashMap::new();
        let _ = roads.insert("road".to_owned(), Color::from_rgb_u8(0x2e, 0x2e, 0x33));
        let _ = roads.insert("four-way".to_owned(), Color::from_rgb_u8(0x42, 0x42, 0x4a));
        let _ = roads.insert("outer".to_owned(), Color::from_rgb_u8(0x4a, 0x42, 0x42));

        Self { buildings, roads }
    }

    /// Returns the default manifest path relative to the working directory.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/palette.toml")
    }

    /// Loads the default manifest, falling back to the built-in palette when
    /// no manifest file exists.
    pub fn from_default_manifest() -> Result<Self> {
        let path = Self::default_manifest_path();
        if !path.exists() {
            return Ok(Self::builtin());
        }
        Self::from_manifest_path(path)
    }

    /// Loads a palette manifest from the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read palette manifest at {}",
                manifest_path.display()
            )
        })?;
        parse_manifest(&contents)
    }

    /// Resolves the color for a building variant.
    #[must_use]
    pub fn building_color(&self, variant: &BuildingVariantId) -> Color {
        self.buildings
            .get(variant.as_str())
            .copied()
            .unwrap_or(DEFAULT_BUILDING_COLOR)
    }

    /// Resolves the color for a road-tile variant.
    #[must_use]
    pub fn road_color(&self, variant: &RoadVariantId) -> Color {
        self.roads
            .get(variant.as_str())
            .copied()
            .unwrap_or(DEFAULT_ROAD_COLOR)
    }
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    #[serde(default)]
    buildings: HashMap<String, String>,
    #[serde(default)]
    roads: HashMap<String, String>,
}

fn parse_manifest(contents: &str) -> Result<VariantPalette> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse palette manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported palette manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    // Manifest entries override or extend the built-in palette.
    let mut palette = VariantPalette::builtin();
    for (name, value) in manifest.buildings {
        let color = parse_hex_color(&value)
            .with_context(|| format!("invalid color for building variant `{name}`"))?;
        let _ = palette.buildings.insert(name, color);
    }
    for (name, value) in manifest.roads {
        let color = parse_hex_color(&value)
            .with_context(|| format!("invalid color for road variant `{name}`"))?;
        let _ = palette.roads.insert(name, color);
    }

    Ok(palette)
}

fn parse_hex_color(value: &str) -> Result<Color> {
    let digits = value
        .strip_prefix('#')
        .with_context(|| format!("color `{value}` must start with `#`"))?;
    if digits.len() != 6 {
        bail!("color `{value}` must contain six hex digits");
    }

    let red = u8::from_str_radix(&digits[0..2], 16)
        .with_context(|| format!("color `{value}` has an invalid red channel"))?;
    let green = u8::from_str_radix(&digits[2..4], 16)
        .with_context(|| format!("color `{value}` has an invalid green channel"))?;
    let blue = u8::from_str_radix(&digits[4..6], 16)
        .with_context(|| format!("color `{value}` has an invalid blue channel"))?;

    Ok(Color::from_rgb_u8(red, green, blue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_palette_covers_the_default_variants() {
        let palette = VariantPalette::builtin();
        let slab = palette.building_color(&BuildingVariantId::new("slab"));
        assert_ne!(slab, DEFAULT_BUILDING_COLOR);
        let road = palette.road_color(&RoadVariantId::new("road"));
        assert_ne!(road, DEFAULT_ROAD_COLOR);
    }

    #[test]
    fn unknown_variants_fall_back_to_category_defaults() {
        let palette = VariantPalette::builtin();
        assert_eq!(
            palette.building_color(&BuildingVariantId::new("cathedral")),
            DEFAULT_BUILDING_COLOR
        );
        assert_eq!(
            palette.road_color(&RoadVariantId::new("gravel")),
            DEFAULT_ROAD_COLOR
        );
    }

    #[test]
    fn manifest_entries_override_the_builtin_palette() {
        let manifest = r##"
            version = 1

            [buildings]
            slab = "#ff0000"
            spire = "#00ff00"

            [roads]
            road = "#0000ff"
        "##;

        let palette = parse_manifest(manifest).expect("manifest should parse");
        assert_eq!(
            palette.building_color(&BuildingVariantId::new("slab")),
            Color::from_rgb_u8(0xff, 0x00, 0x00)
        );
        assert_eq!(
            palette.building_color(&BuildingVariantId::new("spire")),
            Color::from_rgb_u8(0x00, 0xff, 0x00)
        );
        assert_eq!(
            palette.road_color(&RoadVariantId::new("road")),
            Color::from_rgb_u8(0x00, 0x00, 0xff)
        );
        // Entries not mentioned keep their built-in colors.
        assert_eq!(
            palette.building_color(&BuildingVariantId::new("tower")),
            VariantPalette::builtin().building_color(&BuildingVariantId::new("tower"))
        );
    }

    #[test]
    fn manifest_rejects_unsupported_versions() {
        let manifest = r#"
            version = 2
        "#;
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn manifest_rejects_malformed_colors() {
        let manifest = r##"
            version = 1

            [buildings]
            slab = "red"
        "##;
        assert!(parse_manifest(manifest).is_err());

        let manifest = r##"
            version = 1

            [roads]
            road = "#12345"
        "##;
        assert!(parse_manifest(manifest).is_err());
    }

    #[test]
    fn hex_parsing_handles_all_channels() {
        let color = parse_hex_color("#4a6fa5").expect("valid color");
        assert_eq!(color, Color::from_rgb_u8(0x4a, 0x6f, 0xa5));
    }

    #[test]
    fn missing_manifest_file_is_an_error_for_explicit_paths() {
        assert!(VariantPalette::from_manifest_path("does/not/exist.toml").is_err());
    }
}
