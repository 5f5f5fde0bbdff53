//! Graph emission: node/edge styling and the dot renderer.
//!
//! This module provides:
//! - `dot`: Rendering of the retained processes and realized links into a
//!   Graphviz `digraph` description
//!
//! Styling comes from a TOML palette, built in via `include_str!` and
//! overridable from the filesystem, mirroring how process subgroups are
//! configured elsewhere in this codebase's lineage.

pub mod dot;

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub use dot::render;

use crate::link::ChannelClass;

/// Node fill colors.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeStyles {
    pub resident_fill: String,
    pub default_fill: String,
}

/// Edge colors: the neutral ancestry color plus one color per channel
/// class, keyed by class label.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeStyles {
    pub ancestry_color: String,
    #[serde(default)]
    pub channel: HashMap<String, String>,
}

/// Full style palette loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct StylePalette {
    pub node: NodeStyles,
    pub edge: EdgeStyles,
}

impl StylePalette {
    /// Edge color for a channel class; unknown classes fall back to black.
    pub fn channel_color(&self, class: ChannelClass) -> &str {
        self.edge
            .channel
            .get(class.label())
            .map(String::as_str)
            .unwrap_or("black")
    }
}

/// Helper: parse a palette from a TOML string, replacing `current` when it
/// parses cleanly.
fn load_palette_from_str(content: &str, current: &mut StylePalette) {
    match toml::from_str::<StylePalette>(content) {
        Ok(p) => *current = p,
        Err(e) => {
            eprintln!("Failed to parse styles TOML: {}", e);
        }
    }
}

/// Helper: load a palette override from a file path (if it exists).
fn load_palette_from_file(path: &str, current: &mut StylePalette) {
    let p = Path::new(path);
    if !p.exists() {
        return;
    }
    match fs::read_to_string(p) {
        Ok(content) => {
            load_palette_from_str(&content, current);
            eprintln!("Loaded style overrides from {}", path);
        }
        Err(e) => {
            eprintln!("Failed to read styles file {}: {}", path, e);
        }
    }
}

/// Static style palette: built-in defaults, then optional system-wide and
/// working-directory overrides.
pub static STYLES: Lazy<StylePalette> = Lazy::new(|| {
    let mut palette = StylePalette {
        node: NodeStyles {
            resident_fill: "grey70".into(),
            default_fill: "white".into(),
        },
        edge: EdgeStyles {
            ancestry_color: "gray60".into(),
            channel: HashMap::new(),
        },
    };

    // 1) built-in palette from embedded file
    let content = include_str!("../../data/styles.toml");
    load_palette_from_str(content, &mut palette);

    // 2) optional system-wide overrides
    load_palette_from_file("/etc/fdgraph/styles.toml", &mut palette);

    // 3) optional overrides in current working directory
    load_palette_from_file("./fdgraph-styles.toml", &mut palette);

    palette
});
