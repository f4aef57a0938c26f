//! REST Countries (v3.1) client.
//!
//! Every endpoint accepts a `fields` filter capped at ten names, so the
//! field sets below are fixed constants sized to fit. A full detail record
//! needs more than ten fields and is assembled from two requests.

use async_trait::async_trait;
use futures::future;
use log::{debug, info, warn};
use reqwest::Url;
use serde_json::Value;

use crate::data::merge::{PartialRecord, merge};
use crate::data::{Country, CountrySource, UpstreamError};

pub const DEFAULT_BASE_URL: &str = "https://restcountries.com/v3.1";

/// Upstream limit on the `fields` query parameter.
pub const MAX_FIELDS_PER_REQUEST: usize = 10;

/// Fields for list-style queries (all countries, borders).
pub const SUMMARY_FIELDS: &[&str] = &[
    "name",
    "cca2",
    "cca3",
    "capital",
    "region",
    "population",
    "flags",
    "currencies",
    "continents",
    "area",
];

/// First half of a detail record: identity, geography, demographics.
pub const DETAIL_FIELDS_PRIMARY: &[&str] = &[
    "name",
    "cca2",
    "cca3",
    "capital",
    "region",
    "subregion",
    "population",
    "area",
    "flags",
    "languages",
];

/// Second half of a detail record: economy, time, derived flags.
pub const DETAIL_FIELDS_SECONDARY: &[&str] = &[
    "currencies",
    "timezones",
    "continents",
    "borders",
    "maps",
    "independent",
    "unMember",
    "landlocked",
    "coatOfArms",
    "car",
];

const _: () = assert!(SUMMARY_FIELDS.len() <= MAX_FIELDS_PER_REQUEST);
const _: () = assert!(DETAIL_FIELDS_PRIMARY.len() <= MAX_FIELDS_PER_REQUEST);
const _: () = assert!(DETAIL_FIELDS_SECONDARY.len() <= MAX_FIELDS_PER_REQUEST);

pub struct RestCountriesClient {
    base_url: String,
    client: reqwest::Client,
}

impl RestCountriesClient {
    /// Creates a client against `base_url`, or the public API when `None`.
    pub fn new(base_url: Option<String>) -> Self {
        let base_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| UpstreamError::Network(format!("invalid base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Network(format!("base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments.iter().copied());
        Ok(url)
    }

    /// Issues a GET and returns the parsed JSON body of a successful response.
    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> Result<Value, UpstreamError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        debug!("Response status {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("REST Countries error: {} - {}", status, message);
            return Err(UpstreamError::Status { status, message });
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    async fn fetch_partial(&self, code: &str, fields: &[&str]) -> Result<PartialRecord, UpstreamError> {
        let url = self.endpoint(&["alpha", code])?;
        let body = self.get_json(url, &[("fields", fields.join(","))]).await?;
        PartialRecord::from_response(body)
    }

    async fn try_fetch_by_codes(&self, codes: &[String]) -> Result<Vec<Country>, UpstreamError> {
        let url = self.endpoint(&["alpha"])?;
        let body = self
            .get_json(
                url,
                &[("codes", codes.join(",")), ("fields", SUMMARY_FIELDS.join(","))],
            )
            .await?;
        decode_list(body)
    }
}

/// Country codes (cca2, cca3, ccn3, cioc) are plain ASCII letters and digits.
fn is_valid_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}

fn decode_list(body: Value) -> Result<Vec<Country>, UpstreamError> {
    serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    fn name(&self) -> &str {
        "restcountries"
    }

    async fn fetch_all_countries(&self) -> Result<Vec<Country>, UpstreamError> {
        let url = self.endpoint(&["all"])?;
        let body = self.get_json(url, &[("fields", SUMMARY_FIELDS.join(","))]).await?;
        let countries = decode_list(body)?;
        info!("Fetched {} countries", countries.len());
        Ok(countries)
    }

    async fn fetch_country_by_code(&self, code: &str) -> Result<Country, UpstreamError> {
        if !is_valid_code(code) {
            return Err(UpstreamError::InvalidCode(code.to_string()));
        }

        // Both halves run to completion before either result is inspected.
        let (first, second) = future::join(
            self.fetch_partial(code, DETAIL_FIELDS_PRIMARY),
            self.fetch_partial(code, DETAIL_FIELDS_SECONDARY),
        )
        .await;

        let country = merge(first?, second?).into_country()?;
        info!("Fetched detail record for {}", country.cca3);
        Ok(country)
    }

    async fn fetch_countries_by_codes(&self, codes: &[String]) -> Vec<Country> {
        if codes.is_empty() {
            return Vec::new();
        }
        match self.try_fetch_by_codes(codes).await {
            Ok(countries) => {
                debug!("Fetched {} of {} requested countries", countries.len(), codes.len());
                countries
            }
            Err(e) => {
                warn!("Batch fetch for {:?} failed, returning no countries: {}", codes, e);
                Vec::new()
            }
        }
    }
}
