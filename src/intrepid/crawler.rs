use super::{extract, reviews::PaginationState, Page, TripRecord};
use crate::CrawlerError;
use tracing::{debug, error};

/// Builds trip records out of Intrepid trip pages.
#[derive(Debug, Default)]
pub struct IntrepidCrawler;

impl IntrepidCrawler {
    /// Parses a trip page and seeds the review pagination for it.
    ///
    /// The parsed document never leaves this call, so the caller can hold the
    /// result across `.await` points.
    pub fn crawl(&self, url: &str, html: &str) -> Result<PaginationState, CrawlerError> {
        let page = Page::parse(url, html)?;
        let record = self.assemble(&page)?;
        PaginationState::new(record)
    }

    /// Runs every extractor, then fails if a required section was missing.
    pub fn assemble(&self, page: &Page) -> Result<TripRecord, CrawlerError> {
        let doc = page.doc();

        let title = extract::title(doc);
        let snapshot = extract::snapshot(doc);
        let gallery = extract::gallery(page);
        let summary = extract::summary(doc);
        let trip_overview = extract::trip_overview(page);
        let why_you_love_this_trip = extract::why_you_love_this_trip(doc);
        let is_this_trip_right_for_you = extract::is_this_trip_right_for_you(doc);
        let itinerary = extract::itinerary(doc);
        let inclusions = extract::inclusions(doc);
        let important_notes = extract::important_notes(doc);

        if let Err(e) = &title {
            error!("Title extraction failed for {}: {}", page.url(), e);
        }
        if let Err(e) = &trip_overview {
            error!("Trip overview extraction failed for {}: {}", page.url(), e);
        }

        let record = TripRecord {
            title: title?,
            snapshot,
            gallery,
            summary,
            trip_overview: trip_overview?,
            why_you_love_this_trip,
            is_this_trip_right_for_you,
            itinerary,
            inclusions,
            important_notes,
            reviews: vec![],
        };

        debug!(
            "Assembled {:?} ({} days, {} images)",
            record.title,
            record.itinerary.len(),
            record.gallery.len()
        );
        Ok(record)
    }
}
