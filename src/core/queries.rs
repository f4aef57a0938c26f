//! # Country Queries
//!
//! The entry points a view binds to. Each one names a [`QueryKey`], resolves
//! it through the shared [`QueryCache`], and falls through to the
//! [`CountrySource`] on a miss.
//!
//! A query with no meaningful input (blank code, empty code list) is
//! *disabled*: it returns `Ok(None)` without touching the cache or network.

use std::sync::Arc;

use log::debug;

use crate::core::cache::{QueryCache, QueryData, QueryKey, normalize_code};
use crate::data::{Country, CountrySource, UpstreamError};

/// Countries shown on the landing view, when present in the full list.
pub const FEATURED_CODES: &[&str] = &["USA", "JPN", "FRA", "BRA", "IND", "AUS", "ZAF", "GBR"];

const MAX_FEATURED: usize = 8;

pub struct CountryQueries {
    source: Arc<dyn CountrySource>,
    cache: Arc<QueryCache>,
}

impl CountryQueries {
    pub fn new(source: Arc<dyn CountrySource>, cache: Arc<QueryCache>) -> Self {
        Self { source, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Every country (summary fields).
    pub async fn all_countries(&self) -> Result<Arc<Vec<Country>>, UpstreamError> {
        let source = Arc::clone(&self.source);
        let data = self
            .cache
            .get(QueryKey::AllCountries, move || async move {
                source
                    .fetch_all_countries()
                    .await
                    .map(|countries| QueryData::Countries(Arc::new(countries)))
            })
            .await?;
        expect_countries(QueryKey::AllCountries, data)
    }

    /// Full detail record for one country, or `None` for a blank code.
    pub async fn country(&self, code: &str) -> Result<Option<Arc<Country>>, UpstreamError> {
        let code = normalize_code(code);
        if code.is_empty() {
            debug!("Country query disabled: blank code");
            return Ok(None);
        }

        let key = QueryKey::CountryByCode(code.clone());
        let source = Arc::clone(&self.source);
        let data = self
            .cache
            .get(key.clone(), move || async move {
                source
                    .fetch_country_by_code(&code)
                    .await
                    .map(|country| QueryData::Country(Arc::new(country)))
            })
            .await?;

        match data {
            QueryData::Country(country) => Ok(Some(country)),
            QueryData::Countries(_) => Err(mismatched(&key)),
        }
    }

    /// Summary records for a set of neighbouring-country codes, or `None`
    /// when there are no codes to look up.
    ///
    /// Never fails on upstream errors: those surface as an empty list.
    pub async fn border_countries<S: AsRef<str>>(
        &self,
        codes: &[S],
    ) -> Result<Option<Arc<Vec<Country>>>, UpstreamError> {
        let key = QueryKey::countries_by_codes(codes);
        if key.codes().is_empty() {
            debug!("Border query disabled: no codes");
            return Ok(None);
        }

        let source = Arc::clone(&self.source);
        let codes = key.codes().to_vec();
        let data = self
            .cache
            .get(key.clone(), move || async move {
                let countries = source.fetch_countries_by_codes(&codes).await;
                Ok::<_, UpstreamError>(QueryData::Countries(Arc::new(countries)))
            })
            .await?;
        expect_countries(key, data).map(Some)
    }

    /// The featured subset of the full list, in list order.
    pub async fn featured_countries(&self) -> Result<Vec<Country>, UpstreamError> {
        let countries = self.all_countries().await?;
        Ok(countries
            .iter()
            .filter(|c| FEATURED_CODES.contains(&c.cca3.as_str()))
            .take(MAX_FEATURED)
            .cloned()
            .collect())
    }
}

fn mismatched(key: &QueryKey) -> UpstreamError {
    UpstreamError::Decode(format!("cache entry for {key:?} holds the wrong kind of data"))
}

fn expect_countries(key: QueryKey, data: QueryData) -> Result<Arc<Vec<Country>>, UpstreamError> {
    match data {
        QueryData::Countries(countries) => Ok(countries),
        QueryData::Country(_) => Err(mismatched(&key)),
    }
}
