use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};
use crate::timestamp;

/// Field values as found on a product page, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProduct {
    pub title: String,
    pub price: String,
    pub image_url: String,
    /// The product anchor's href exactly as captured on the category page.
    pub relative_url: String,
}

/// One row of the output CSV. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: String,
    #[serde(rename = "ImageURL")]
    pub image_url: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Time")]
    pub time: String,
}

pub const CSV_HEADER: [&str; 5] = ["Title", "Price", "ImageURL", "URL", "Time"];

impl Record {
    pub fn normalize(raw: RawProduct, base_url: &str) -> Self {
        Self::normalize_at(raw, base_url, Utc::now())
    }

    pub fn normalize_at(raw: RawProduct, base_url: &str, now: DateTime<Utc>) -> Self {
        let url = join_url(base_url, &raw.relative_url);
        Record {
            title: raw.title,
            price: raw.price,
            image_url: raw.image_url,
            url,
            time: timestamp::data(&now),
        }
    }
}

/// `base + "/" + href`, verbatim. A base ending in `/` (or an href starting
/// with one) yields `//`; downstream consumers of the CSV expect exactly that.
pub fn join_url(base_url: &str, href: &str) -> String {
    format!("{base_url}/{href}")
}

/// Resolves `href` against `base` the way a browser follows a link.
pub fn resolve(base: &str, href: &str) -> Result<String> {
    let invalid = |reason: url::ParseError| ScrapeError::InvalidUrl {
        url: href.to_string(),
        reason: reason.to_string(),
    };
    let base = url::Url::parse(base).map_err(invalid)?;
    Ok(base.join(href).map_err(invalid)?.to_string())
}
