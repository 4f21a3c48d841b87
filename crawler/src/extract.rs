use lazy_static::lazy_static;
use modpack_core::ModPack;
use scraper::{ElementRef, Html, Selector};

use crate::error::{ExtractError, Zone};

lazy_static! {
    static ref TITLE_BLOCK: Selector = Selector::parse("div.class-title").expect("valid selector");
    static ref CATEGORY_BLOCK: Selector = Selector::parse("div.class-category").expect("valid selector");
    static ref STAR_BLOCK: Selector = Selector::parse("div.star").expect("valid selector");
    static ref INFOS_BLOCK: Selector = Selector::parse("div.infos").expect("valid selector");
    static ref RANKING_BLOCK: Selector = Selector::parse("div.block-right").expect("valid selector");
    static ref HEADING: Selector = Selector::parse("h3").expect("valid selector");
    static ref ANCHOR: Selector = Selector::parse("a").expect("valid selector");
    static ref PARAGRAPH: Selector = Selector::parse("p").expect("valid selector");
    static ref DIV: Selector = Selector::parse("div").expect("valid selector");
}

/// Every field of a record except the address it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: String,
    pub views: String,
    pub points: f32,
    pub scores: f32,
    pub category: Vec<String>,
}

impl ExtractedPage {
    pub fn into_pack(self, url: String) -> ModPack {
        ModPack {
            title: self.title,
            views: self.views,
            points: self.points,
            scores: self.scores,
            category: self.category,
            url,
        }
    }
}

/// Parse a catalog page. Either every zone yields its field or the whole page fails.
pub fn extract(html: &str) -> Result<ExtractedPage, ExtractError> {
    let doc = Html::parse_document(html);
    Ok(ExtractedPage {
        title: find_title(&doc)?,
        category: find_category(&doc)?,
        scores: find_scores(&doc)?,
        views: find_views(&doc)?,
        points: find_points(&doc)?,
    })
}

fn zone<'a>(doc: &'a Html, block: &Selector, zone: Zone) -> Result<ElementRef<'a>, ExtractError> {
    doc.select(block).next().ok_or(ExtractError::MissingZone(zone))
}

fn first_within<'a>(el: ElementRef<'a>, sel: &Selector, zone: Zone) -> Result<ElementRef<'a>, ExtractError> {
    el.select(sel).next().ok_or(ExtractError::MissingZone(zone))
}

fn parse_number(text: &str, zone: Zone) -> Result<f32, ExtractError> {
    text.trim()
        .parse::<f32>()
        .map_err(|_| ExtractError::InvalidNumber { zone, value: text.to_string() })
}

fn find_title(doc: &Html) -> Result<String, ExtractError> {
    let block = zone(doc, &TITLE_BLOCK, Zone::Title)?;
    let heading = first_within(block, &HEADING, Zone::Title)?;
    let title = heading.text().collect::<String>().trim().to_string();
    if title.is_empty() {
        return Err(ExtractError::EmptyTitle);
    }
    Ok(title)
}

fn find_category(doc: &Html) -> Result<Vec<String>, ExtractError> {
    let block = zone(doc, &CATEGORY_BLOCK, Zone::Category)?;
    Ok(block
        .select(&ANCHOR)
        .map(|a| a.text().collect::<String>())
        .collect())
}

fn find_scores(doc: &Html) -> Result<f32, ExtractError> {
    let block = zone(doc, &STAR_BLOCK, Zone::Popularity)?;
    let p = first_within(block, &PARAGRAPH, Zone::Popularity)?;
    parse_number(&p.text().collect::<String>(), Zone::Popularity)
}

fn find_views(doc: &Html) -> Result<String, ExtractError> {
    let block = zone(doc, &INFOS_BLOCK, Zone::Views)?;
    let p = first_within(block, &PARAGRAPH, Zone::Views)?;
    Ok(p.text().collect())
}

// The ranking block reads "label: value"; only the trailing token is numeric.
fn find_points(doc: &Html) -> Result<f32, ExtractError> {
    let block = zone(doc, &RANKING_BLOCK, Zone::Ranking)?;
    let labeled = block.select(&DIV).nth(1).ok_or(ExtractError::MissingZone(Zone::Ranking))?;
    let text = labeled
        .children()
        .next()
        .and_then(|node| node.value().as_text())
        .map(|t| t.trim())
        .ok_or(ExtractError::MissingZone(Zone::Ranking))?;
    let last = text
        .split_whitespace()
        .last()
        .ok_or_else(|| ExtractError::InvalidNumber { zone: Zone::Ranking, value: text.to_string() })?;
    parse_number(last, Zone::Ranking)
}
