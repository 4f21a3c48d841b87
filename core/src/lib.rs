pub mod persist;
pub mod sort;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a catalog page, e.g. `/modpack/{PageId}.html`.
pub type PageId = u32;

/// One harvested catalog entry. Field names are the on-disk JSON keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModPack {
    pub title: String,
    /// View count as displayed on the page, e.g. "1.5万". See [`sort::parse_views`].
    pub views: String,
    /// Ranking index taken from the trailing token of a "label: value" block.
    pub points: f32,
    /// Popularity score.
    pub scores: f32,
    pub category: Vec<String>,
    pub url: String,
}

impl fmt::Display for ModPack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "title: {}", self.title)?;
        writeln!(f, "category: [{}]", self.category.join(", "))?;
        writeln!(f, "scores: {}", self.scores)?;
        writeln!(f, "views: {}", self.views)?;
        write!(f, "points: {}", self.points)
    }
}
