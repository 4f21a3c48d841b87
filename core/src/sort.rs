use crate::ModPack;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::cmp::Ordering;

lazy_static! {
    static ref VIEWS_RE: Regex = Regex::new(r"([\d.]+)(万)?").expect("valid regex");
}

/// Dataset column a query can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Title,
    Views,
    Points,
    Scores,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Normalize a displayed view count to an integer: "1.5万" -> 15000, "1，024" -> 1024.
/// Text without a leading number yields 0.
pub fn parse_views(text: &str) -> u64 {
    let cleaned = text.trim().replace(['，', ','], "");
    let Some(caps) = VIEWS_RE.captures(&cleaned) else { return 0 };
    let Ok(mut num) = caps[1].parse::<f64>() else { return 0 };
    if caps.get(2).is_some() {
        num *= 10_000.0;
    }
    num as u64
}

fn compare(a: &ModPack, b: &ModPack, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.cmp(&b.title),
        SortField::Views => parse_views(&a.views).cmp(&parse_views(&b.views)),
        SortField::Points => a.points.total_cmp(&b.points),
        SortField::Scores => a.scores.total_cmp(&b.scores),
    }
}

/// Stable in-place sort. Equal keys keep their relative order in both directions,
/// so sorting an already sorted slice is a no-op.
pub fn sort_packs(packs: &mut [ModPack], field: SortField, order: SortOrder) {
    match order {
        SortOrder::Asc => packs.sort_by(|a, b| compare(a, b, field)),
        SortOrder::Desc => packs.sort_by(|a, b| compare(b, a, field)),
    }
}
