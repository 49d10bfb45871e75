//! Listing detail page extraction
//!
//! Turns a parsed detail page into a [`Record`]. Each block of the page is
//! read independently; only a missing main-attributes list makes the whole
//! listing unusable.

use crate::record::{Field, Record};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Why a listing produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("main attributes block is missing")]
    MissingMainAttributes,
}

/// Extracts one record from a listing detail page
///
/// # Arguments
///
/// * `document` - The parsed detail page
/// * `make` - Make of the combination the listing was found under
/// * `model` - Model of the combination the listing was found under
///
/// # Returns
///
/// * `Ok(Record)` - Every schema field set, "no value" where the page had nothing
/// * `Err(SkipReason)` - The page lacks the main attributes block
pub fn extract_record(document: &Html, make: &str, model: &str) -> Result<Record, SkipReason> {
    let mut record = Record::new();

    parse_main_attributes(document, &mut record)?;

    record.set_opt(Field::Title, first_text(document, "h1"));
    record.set(Field::Make, make.trim());
    record.set(Field::Model, model.trim());
    record.set_opt(Field::Price, first_text(document, "span#details_price"));

    match first_text(document, "div.adress") {
        Some(address) => {
            let mut parts = address.split(',').map(|part| part.trim().to_string());
            record.set_opt(Field::Region, parts.next());
            record.set_opt(Field::City, parts.next());
        }
        None => tracing::warn!("No region and city data found"),
    }

    record.set_opt(Field::Views, first_text(document, "span.advact"));

    parse_feature_groups(document, &mut record);

    Ok(record)
}

/// Reads the alternating label/value list into the record
///
/// Even items are labels and odd items are values; they are paired by
/// position. Labels outside the schema are ignored.
fn parse_main_attributes(document: &Html, record: &mut Record) -> Result<(), SkipReason> {
    let list = select_first(document, "ul.dilarData").ok_or_else(|| {
        tracing::warn!("No main car details found");
        SkipReason::MissingMainAttributes
    })?;

    let Ok(item_selector) = Selector::parse("li") else {
        return Err(SkipReason::MissingMainAttributes);
    };

    let items: Vec<String> = list.select(&item_selector).map(element_text).collect();

    for pair in items.chunks(2) {
        let [label, value] = pair else {
            continue;
        };

        match Field::from_source_label(label) {
            Some(field) => record.set(field, value.trim()),
            None => tracing::debug!("Ignoring unknown attribute '{}'", label.trim()),
        }
    }

    Ok(())
}

/// Fills every feature group found under a `label.extra_cat` heading
fn parse_feature_groups(document: &Html, record: &mut Record) {
    let Ok(label_selector) = Selector::parse("label.extra_cat") else {
        return;
    };

    for label in document.select(&label_selector) {
        let name = element_text(label);
        match Field::from_source_label(&name) {
            Some(field) if Field::FEATURE_GROUPS.contains(&field) => {
                record.set(field, parse_feature_group(label));
            }
            _ => tracing::debug!("Ignoring unknown feature group '{}'", name.trim()),
        }
    }
}

/// Collects the features listed after a group heading
///
/// Walks the heading's following siblings until the next `label`, skipping
/// line breaks. Each entry loses its first two characters (the bullet glyph
/// and its spacer). A heading with nothing after it yields an empty string.
pub fn parse_feature_group(label: ElementRef<'_>) -> String {
    let mut features = Vec::new();

    for sibling in label.next_siblings().filter_map(ElementRef::wrap) {
        match sibling.value().name() {
            "label" => break,
            "br" => continue,
            _ => {
                let text = element_text(sibling);
                features.push(text.chars().skip(2).collect::<String>().trim().to_string());
            }
        }
    }

    features.join(", ")
}

fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn first_text(document: &Html, css: &str) -> Option<String> {
    select_first(document, css).map(|element| element_text(element).trim().to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}
