mod crawler;
mod data;
mod extract;
mod reviews;

pub use crawler::IntrepidCrawler;
pub use data::TripData;
pub use reviews::{crawl_reviews, PaginationState, ReviewPaginator};

use crate::CrawlerError;
use scraper::Html;
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use url::Url;

/// Everything scraped for one trip page, reviews included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    pub title: String,
    pub snapshot: TripSnapshot,
    pub gallery: Vec<String>,
    pub summary: String,
    pub trip_overview: TripOverview,
    pub why_you_love_this_trip: Vec<String>,
    pub is_this_trip_right_for_you: Vec<String>,
    pub itinerary: Vec<DayEntry>,
    pub inclusions: Inclusions,
    pub important_notes: Vec<String>,
    pub reviews: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TripSnapshot {
    pub heading: String,
    pub review_aggregate: ReviewAggregate,
    pub themes: Vec<String>,
    pub price: Price,
}

/// All fields are `None` when the page has no review block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewAggregate {
    pub rating: Option<String>,
    pub avg: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Price {
    pub currency: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripOverview {
    pub trip_code: Option<String>,
    pub map_img_url: String,
    pub dictionary: OrderedMap<OverviewValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OverviewValue {
    Text(String),
    Destinations(OrderedMap<String>),
    Rating(Option<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayEntry {
    pub header: String,
    pub summary: String,
    pub metadata: Vec<MetadataCell>,
    pub special_information: Option<String>,
}

/// One itinerary grid cell, serialized as `{label: values}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataCell {
    pub label: String,
    pub values: Vec<String>,
}

impl Serialize for MetadataCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.label, &self.values)?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inclusions {
    pub meals: Vec<String>,
    pub transport: Vec<String>,
    pub accommodation: Vec<String>,
    pub activities: Vec<String>,
    pub optional_activities: Vec<String>,
}

/// String keyed map that keeps insertion order. Re-inserting a key replaces
/// the value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn insert<K: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A fetched trip page: the parsed document and the URL it came from.
pub struct Page {
    url: Url,
    doc: Html,
}

impl Page {
    pub fn parse(url: &str, html: &str) -> Result<Page, CrawlerError> {
        Ok(Page {
            url: Url::parse(url)?,
            doc: Html::parse_document(html),
        })
    }

    pub fn doc(&self) -> &Html {
        &self.doc
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Resolves `path` against the page URL.
    pub fn urljoin(&self, path: &str) -> Result<String, url::ParseError> {
        Ok(self.url.join(path.trim())?.to_string())
    }
}

impl fmt::Display for TripRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title           : {}", self.title)?;
        writeln!(
            f,
            "Trip Code       : {}",
            self.trip_overview.trip_code.as_deref().unwrap_or("None")
        )?;
        writeln!(
            f,
            "Price           : {} {}",
            self.snapshot.price.currency, self.snapshot.price.value
        )?;
        if let Some(rating) = self.snapshot.review_aggregate.rating.as_ref() {
            writeln!(f, "Rating          : {}", rating)?;
        } else {
            writeln!(f, "Rating          : None")?;
        };
        writeln!(f, "Themes          : {}", self.snapshot.themes.join(", "))?;
        writeln!(f, "Summary         : {}", self.summary)?;
        writeln!(f, "Itinerary       : ")?;
        for day in &self.itinerary {
            writeln!(f, "> {}", day.header)?;
        }
        writeln!(f, "Gallery         : {} images", self.gallery.len())?;
        writeln!(f, "Reviews         : {}", self.reviews.len())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;

    const URL: &str = "https://www.intrepidtravel.com/uk/india/golden-triangle-108419";

    fn fixture_record() -> TripRecord {
        let html = fs::read_to_string("tests/htmls/trip.html").expect("Invalid file path");
        let state = IntrepidCrawler::default().crawl(URL, &html).unwrap();
        state.record
    }

    #[test]
    fn test_parsing_trip_page() {
        let extracted = fixture_record();

        let record = TripRecord {
            title: "Golden Triangle".to_string(),
            snapshot: TripSnapshot {
                heading: "Trip snapshot".to_string(),
                review_aggregate: ReviewAggregate {
                    rating: Some("Rated 4.8 out of 5".to_string()),
                    avg: Some("4.8".to_string()),
                    summary: Some("Based on 1,234 reviews".to_string()),
                },
                themes: vec!["Explorer".to_string(), "Culture".to_string()],
                price: Price {
                    currency: "GBP".to_string(),
                    value: "£795".to_string(),
                },
            },
            gallery: vec![
                "https://www.intrepidtravel.com/sites/intrepid/files/taj-mahal.jpg".to_string(),
                "https://cdn.intrepidtravel.com/img/jaipur.jpg".to_string(),
            ],
            summary: "See the best of northern India on a short, sharp adventure.".to_string(),
            trip_overview: TripOverview {
                trip_code: Some("HHSG".to_string()),
                map_img_url: "https://www.intrepidtravel.com/sites/intrepid/files/maps/HHSG.png"
                    .to_string(),
                dictionary: [
                    ("Start", OverviewValue::Text("Delhi".to_string())),
                    ("Finish", OverviewValue::Text("Delhi".to_string())),
                    (
                        "Destinations",
                        OverviewValue::Destinations(
                            [("Delhi", "/uk/india/delhi"), ("Agra", "/uk/india/agra")]
                                .into_iter()
                                .map(|(k, v)| (k, v.to_string()))
                                .collect(),
                        ),
                    ),
                    (
                        "Physical rating",
                        OverviewValue::Rating(Some("2 out of 5".to_string())),
                    ),
                    ("Trip code", OverviewValue::Text("HHSG".to_string())),
                ]
                .into_iter()
                .collect(),
            },
            why_you_love_this_trip: vec![
                "Watch the sun rise over the Taj Mahal".to_string(),
                "Ride a rickshaw through Old Delhi".to_string(),
                "Three cities in one week.".to_string(),
            ],
            is_this_trip_right_for_you: vec![
                "Expect long drives between cities.".to_string(),
                "India can be hot and crowded.".to_string(),
            ],
            itinerary: vec![
                DayEntry {
                    header: "Day 1 Delhi".to_string(),
                    summary: "Namaste! Welcome to Delhi.".to_string(),
                    metadata: vec![
                        MetadataCell {
                            label: "Accommodation".to_string(),
                            values: vec!["Hotel (1 night)".to_string()],
                        },
                        MetadataCell {
                            label: "Meals".to_string(),
                            values: vec!["Breakfast".to_string(), "Dinner".to_string()],
                        },
                    ],
                    special_information: Some(
                        "Arrive any time, the welcome meeting is at 6 pm.".to_string(),
                    ),
                },
                DayEntry {
                    header: "Day 2 Agra".to_string(),
                    summary: "Travel by train to Agra.".to_string(),
                    metadata: vec![MetadataCell {
                        label: "Included activities".to_string(),
                        values: vec!["Taj Mahal sunrise visit".to_string()],
                    }],
                    special_information: None,
                },
            ],
            inclusions: Inclusions {
                meals: vec![
                    "6 breakfasts".to_string(),
                    "1 dinner".to_string(),
                    "Budget for lunches.".to_string(),
                ],
                transport: vec!["Train".to_string(), "Private vehicle".to_string()],
                accommodation: vec!["Hotel (6 nights)".to_string()],
                activities: vec![],
                optional_activities: vec!["Old Delhi food walk - INR 1500".to_string()],
            },
            important_notes: vec![
                "A single supplement is available.".to_string(),
                "Visas are the responsibility of the traveller.".to_string(),
            ],
            reviews: vec![],
        };
        assert_eq!(extracted, record);
    }

    #[test]
    fn serializes_to_record_shape() {
        let value = serde_json::to_value(fixture_record()).unwrap();

        assert_eq!(value["reviews"], json!([]));
        assert_eq!(value["trip_overview"]["trip_code"], json!("HHSG"));
        assert_eq!(
            value["trip_overview"]["dictionary"]["Destinations"],
            json!({"Delhi": "/uk/india/delhi", "Agra": "/uk/india/agra"})
        );
        assert_eq!(
            value["trip_overview"]["dictionary"]["Physical rating"],
            json!("2 out of 5")
        );
        assert_eq!(
            value["itinerary"][0]["metadata"],
            json!([
                {"Accommodation": ["Hotel (1 night)"]},
                {"Meals": ["Breakfast", "Dinner"]}
            ])
        );
        assert_eq!(value["itinerary"][1]["special_information"], json!(null));
    }

    #[test]
    fn dictionary_keeps_document_order() {
        let record = fixture_record();
        let keys: Vec<&str> = record.trip_overview.dictionary.keys().collect();
        assert_eq!(
            keys,
            vec!["Start", "Finish", "Destinations", "Physical rating", "Trip code"]
        );
        let json = serde_json::to_string(&record.trip_overview.dictionary).unwrap();
        assert!(json.find("Start").unwrap() < json.find("Trip code").unwrap());
    }

    #[test]
    fn ordered_map_replaces_in_place() {
        let mut map = OrderedMap::new();
        map.insert("a", 1);
        map.insert("b", 2);
        map.insert("a", 3);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a"), Some(&3));
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn missing_review_block_serializes_as_nulls() {
        let value = serde_json::to_value(ReviewAggregate::default()).unwrap();
        assert_eq!(value, json!({"rating": null, "avg": null, "summary": null}));
    }

    #[test]
    fn display_lists_days() {
        let text = fixture_record().to_string();
        assert!(text.contains("Trip Code       : HHSG"));
        assert!(text.contains("> Day 2 Agra"));
    }

    #[test]
    fn urljoin_resolves_relative_paths() {
        let page = Page::parse("https://site/x", "<html></html>").unwrap();
        assert_eq!(page.urljoin("/img/a.jpg").unwrap(), "https://site/img/a.jpg");
        assert_eq!(
            page.urljoin("https://cdn.site/b.jpg").unwrap(),
            "https://cdn.site/b.jpg"
        );
    }
}
