//! Selectors for the sections of an Intrepid trip page.
//!
//! Optional sections yield empty values when the layout differs. Only the page
//! banner heading and the trip overview map are required.

use super::{
    DayEntry, Inclusions, MetadataCell, OrderedMap, OverviewValue, Page, Price, ReviewAggregate,
    TripOverview, TripSnapshot,
};
use crate::{
    utils::{normalize_opt, normalize_text},
    CrawlerError,
};
use itertools::Itertools;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

const E: &str = "Invalid selector";
lazy_static! {
    static ref TITLE: Selector = Selector::parse(".page-banner h1").expect(E);

    static ref SNAPSHOT_HEADING: Selector = Selector::parse(".trip-snapshot h2").expect(E);
    static ref REVIEW_AGGREGATE: Selector =
        Selector::parse(".trip-snapshot .review-aggregate").expect(E);
    static ref RATING: Selector = Selector::parse("span.rating").expect(E);
    static ref REVIEW_AVERAGE: Selector =
        Selector::parse(r#"div[data-cy="review-average"]"#).expect(E);
    static ref SPAN: Selector = Selector::parse("span").expect(E);
    static ref THEMES: Selector =
        Selector::parse(r#".trip-snapshot .trip-snapshot__themes div[data-cy="chip"]"#).expect(E);
    static ref PRICE_CURRENCY: Selector =
        Selector::parse(r#".trip-snapshot .price [data-cy="price-currency-code"]"#).expect(E);
    static ref PRICE_VALUE: Selector =
        Selector::parse(r#".trip-snapshot .price [data-cy="price-value"]"#).expect(E);

    static ref GALLERY_IMAGES: Selector =
        Selector::parse(r#"[data-cy="trip-gallery"] .gallery__image-frame img"#).expect(E);
    static ref SUMMARY: Selector = Selector::parse("#trip-summary p").expect(E);

    static ref MAP: Selector =
        Selector::parse(r#"#trip-overview [data-cy="trip-summary__map"]"#).expect(E);
    static ref DICTIONARY_TERMS: Selector =
        Selector::parse(r#"#trip-overview [data-cy="trip-summary__dictionary-grid"] dt"#)
            .expect(E);
    static ref DESTINATION_LINKS: Selector = Selector::parse("span a").expect(E);
    static ref PHYSICAL_RATING: Selector = Selector::parse(r#"[data-cy="rating"]"#).expect(E);

    static ref WHY_YOU_LOVE: Selector =
        Selector::parse(r#"#WYLTT [data-cy="wyltt__description"]"#).expect(E);
    static ref RIGHT_FOR_YOU: Selector =
        Selector::parse(r#"#ITTRFY [data-cy="ittrfy__description"]"#).expect(E);

    static ref DAYS: Selector =
        Selector::parse(r#"#itinerary div[data-cy="trip-itinerary-day"]"#).expect(E);
    static ref DAY_HEADER: Selector = Selector::parse("button b").expect(E);
    static ref ACCORDION_BODY: Selector = Selector::parse(r#"[data-cy="accordion-body"]"#).expect(E);
    static ref RICH_TEXT_P: Selector = Selector::parse(".rich-text p").expect(E);
    static ref META_CELLS: Selector = Selector::parse(
        ".trip-itinerary-day__meta-data-section .l-grid__cell .l-grid__cell--12-col"
    )
    .expect(E);

    static ref MEALS: Selector =
        Selector::parse(r#"#inclusions [data-cy="trip-inclusions-meals"]"#).expect(E);
    static ref TRANSPORT: Selector =
        Selector::parse(r#"#inclusions [data-cy="trip-inclusions-transport"]"#).expect(E);
    static ref ACCOMMODATION: Selector =
        Selector::parse(r#"#inclusions [data-cy="trip-inclusions-accommodation"]"#).expect(E);
    static ref ACTIVITIES: Selector =
        Selector::parse(r#"#inclusions [data-cy="trip-inclusions-activities"]"#).expect(E);
    static ref OPTIONAL_ACTIVITIES: Selector =
        Selector::parse(r#"#inclusions [data-cy="trip-inclusions-optional-activities"]"#)
            .expect(E);
    static ref TILE_LIST_ITEMS: Selector = Selector::parse(".tile__content ul li").expect(E);
    static ref TILE_PARAGRAPHS: Selector = Selector::parse(".tile__content p").expect(E);

    static ref IMPORTANT_NOTES: Selector = Selector::parse("#important-notes p").expect(E);

    static ref LIST_ITEMS: Selector = Selector::parse("ul li").expect(E);
    static ref P: Selector = Selector::parse("p").expect(E);
}

/// Text nodes directly under `el`, skipping whitespace-only ones.
fn own_texts<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .filter(|t| !t.trim().is_empty())
}

/// Text nodes anywhere under `el`, skipping whitespace-only ones.
fn all_texts<'a>(el: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    el.text().filter(|t| !t.trim().is_empty())
}

fn child_elements<'a>(el: ElementRef<'a>, name: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == name)
}

/// First own text of the first element matching `selector`, normalized.
fn first_own_text(scope: ElementRef, selector: &Selector) -> String {
    normalize_opt(scope.select(selector).flat_map(own_texts).next())
}

fn doc_first_own_text(doc: &Html, selector: &Selector) -> String {
    normalize_opt(doc.select(selector).flat_map(own_texts).next())
}

/// List item texts followed by paragraph texts.
fn list_then_paragraphs<'a>(
    blocks: &[ElementRef<'a>],
    item_selector: &Selector,
    paragraph_selector: &Selector,
) -> Vec<&'a str> {
    let items = blocks
        .iter()
        .flat_map(|b| b.select(item_selector))
        .flat_map(own_texts);
    let paragraphs = blocks
        .iter()
        .flat_map(|b| b.select(paragraph_selector))
        .flat_map(own_texts);
    items.chain(paragraphs).collect()
}

pub(crate) fn title(doc: &Html) -> Result<String, CrawlerError> {
    let headings = doc.select(&TITLE).collect_vec();
    if headings.is_empty() {
        return Err(CrawlerError::StructuralExtractionFailure("page banner heading"));
    }
    Ok(normalize_opt(headings.into_iter().flat_map(all_texts).next()))
}

pub(crate) fn snapshot(doc: &Html) -> TripSnapshot {
    let heading = normalize_opt(doc.select(&SNAPSHOT_HEADING).flat_map(all_texts).next());

    let review_aggregate = match doc.select(&REVIEW_AGGREGATE).next() {
        Some(block) => ReviewAggregate {
            rating: Some(normalize_opt(
                block
                    .select(&RATING)
                    .next()
                    .and_then(|el| el.value().attr("aria-label")),
            )),
            avg: Some(normalize_opt(
                block
                    .select(&REVIEW_AVERAGE)
                    .flat_map(|avg| avg.select(&SPAN))
                    .flat_map(own_texts)
                    .next(),
            )),
            summary: Some(first_own_text(block, &REVIEW_AVERAGE)),
        },
        None => {
            debug!("No review aggregate in trip snapshot");
            ReviewAggregate::default()
        }
    };

    let themes = doc
        .select(&THEMES)
        .flat_map(own_texts)
        .map(normalize_text)
        .collect();

    TripSnapshot {
        heading,
        review_aggregate,
        themes,
        price: Price {
            currency: doc_first_own_text(doc, &PRICE_CURRENCY),
            value: doc_first_own_text(doc, &PRICE_VALUE),
        },
    }
}

pub(crate) fn gallery(page: &Page) -> Vec<String> {
    page.doc()
        .select(&GALLERY_IMAGES)
        .filter_map(|img| img.value().attr("src"))
        .filter_map(|src| match page.urljoin(src) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!("Skip gallery image {}: {}", src, e);
                None
            }
        })
        .collect()
}

pub(crate) fn summary(doc: &Html) -> String {
    doc_first_own_text(doc, &SUMMARY)
}

pub(crate) fn trip_overview(page: &Page) -> Result<TripOverview, CrawlerError> {
    let doc = page.doc();

    let map_src = doc
        .select(&MAP)
        .next()
        .and_then(|el| el.value().attr("src"))
        .ok_or(CrawlerError::StructuralExtractionFailure("trip overview map image"))?;
    let map_path = map_src.split('?').next().unwrap_or_default();
    let map_img_url = page.urljoin(map_path)?;

    let mut dictionary = OrderedMap::new();
    let mut trip_code = None;
    for dt in doc.select(&DICTIONARY_TERMS) {
        let Some(key) = all_texts(dt).next().map(str::trim) else {
            trace!("Skip empty dictionary term");
            continue;
        };
        let dd = dt
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|sibling| sibling.value().name() == "dd");

        let value = match key.to_lowercase().as_str() {
            "destinations" => OverviewValue::Destinations(dd.map(destinations).unwrap_or_default()),
            "physical rating" => OverviewValue::Rating(dd.and_then(|dd| {
                dd.select(&PHYSICAL_RATING)
                    .find_map(|el| el.value().attr("aria-label"))
                    .map(ToString::to_string)
            })),
            label => {
                let text = dd
                    .and_then(|dd| all_texts(dd).next())
                    .map(|t| t.trim().to_string())
                    .unwrap_or_default();
                if label == "trip code" {
                    trip_code = Some(text.clone());
                }
                OverviewValue::Text(text)
            }
        };
        dictionary.insert(key, value);
    }

    Ok(TripOverview {
        trip_code,
        map_img_url,
        dictionary,
    })
}

/// Destination names zipped with their links, by position.
fn destinations(dd: ElementRef) -> OrderedMap<String> {
    let links = dd.select(&DESTINATION_LINKS).collect_vec();
    let names = links.iter().flat_map(|a| own_texts(*a)).map(str::trim);
    let hrefs = links.iter().filter_map(|a| a.value().attr("href"));
    names
        .zip(hrefs)
        .map(|(name, href)| (name, href.to_string()))
        .collect()
}

fn highlights(doc: &Html, section: &Selector) -> Vec<String> {
    let blocks = doc.select(section).collect_vec();
    list_then_paragraphs(&blocks, &LIST_ITEMS, &P)
        .into_iter()
        .map(normalize_text)
        .collect()
}

pub(crate) fn why_you_love_this_trip(doc: &Html) -> Vec<String> {
    highlights(doc, &WHY_YOU_LOVE)
}

pub(crate) fn is_this_trip_right_for_you(doc: &Html) -> Vec<String> {
    highlights(doc, &RIGHT_FOR_YOU)
}

pub(crate) fn itinerary(doc: &Html) -> Vec<DayEntry> {
    doc.select(&DAYS).map(itinerary_day).collect()
}

fn itinerary_day(day: ElementRef) -> DayEntry {
    let header = first_own_text(day, &DAY_HEADER);

    let sections = day
        .select(&ACCORDION_BODY)
        .flat_map(|body| child_elements(body, "div"))
        .collect_vec();

    let summary = normalize_opt(
        sections
            .iter()
            .filter_map(|section| child_elements(*section, "div").next())
            .flat_map(all_texts)
            .next(),
    );

    let special_information = sections
        .iter()
        .filter_map(|section| child_elements(*section, "div").nth(2))
        .flat_map(|div| div.select(&RICH_TEXT_P))
        .flat_map(own_texts)
        .next()
        .map(normalize_text);

    let metadata = day.select(&META_CELLS).filter_map(metadata_cell).collect();

    DayEntry {
        header,
        summary,
        metadata,
        special_information,
    }
}

fn metadata_cell(cell: ElementRef) -> Option<MetadataCell> {
    let label = child_elements(cell, "div")
        .next()
        .and_then(|div| all_texts(div).last())
        .map(|t| t.trim().to_string());
    let Some(label) = label else {
        debug!("Skip itinerary metadata cell without a label");
        return None;
    };

    let values = list_then_paragraphs(&[cell], &LIST_ITEMS, &P)
        .into_iter()
        .map(|t| t.trim().to_string())
        .collect();

    Some(MetadataCell { label, values })
}

fn inclusion(doc: &Html, category: &Selector) -> Vec<String> {
    let tiles = doc.select(category).collect_vec();
    list_then_paragraphs(&tiles, &TILE_LIST_ITEMS, &TILE_PARAGRAPHS)
        .into_iter()
        .map(|t| t.trim().to_string())
        .collect()
}

pub(crate) fn inclusions(doc: &Html) -> Inclusions {
    Inclusions {
        meals: inclusion(doc, &MEALS),
        transport: inclusion(doc, &TRANSPORT),
        accommodation: inclusion(doc, &ACCOMMODATION),
        activities: inclusion(doc, &ACTIVITIES),
        optional_activities: inclusion(doc, &OPTIONAL_ACTIVITIES),
    }
}

pub(crate) fn important_notes(doc: &Html) -> Vec<String> {
    doc.select(&IMPORTANT_NOTES)
        .flat_map(own_texts)
        .map(|t| t.trim().to_string())
        .collect()
}
