//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::cache::QueryCache;
use crate::core::queries::CountryQueries;
use crate::data::{Country, CountryName, CountrySource, Flags, UpstreamError};

/// Minimal summary record for tests.
pub fn country(cca3: &str, common: &str) -> Country {
    Country {
        name: CountryName {
            common: common.to_string(),
            official: common.to_string(),
        },
        cca2: cca3[..2].to_string(),
        cca3: cca3.to_string(),
        capital: Vec::new(),
        region: String::new(),
        subregion: None,
        population: 0,
        area: 0.0,
        flags: Flags {
            png: format!("{}.png", cca3.to_lowercase()),
            svg: format!("{}.svg", cca3.to_lowercase()),
            alt: None,
        },
        languages: None,
        currencies: None,
        timezones: None,
        continents: Vec::new(),
        borders: Vec::new(),
        latlng: None,
        maps: None,
        independent: None,
        un_member: None,
        landlocked: None,
        coat_of_arms: None,
        start_of_week: None,
        car: None,
    }
}

pub fn france() -> Country {
    Country {
        name: CountryName {
            common: "France".to_string(),
            official: "French Republic".to_string(),
        },
        cca2: "FR".to_string(),
        capital: vec!["Paris".to_string()],
        region: "Europe".to_string(),
        continents: vec!["Europe".to_string()],
        population: 67_000_000,
        area: 551_695.0,
        borders: vec!["BEL".to_string(), "DEU".to_string()],
        ..country("FRA", "France")
    }
}

pub fn japan() -> Country {
    Country {
        name: CountryName {
            common: "Japan".to_string(),
            official: "Japan".to_string(),
        },
        cca2: "JP".to_string(),
        capital: vec!["Tokyo".to_string()],
        region: "Asia".to_string(),
        continents: vec!["Asia".to_string()],
        population: 125_000_000,
        area: 377_930.0,
        ..country("JPN", "Japan")
    }
}

/// An in-memory source that counts calls and can be told to fail.
pub struct StubSource {
    pub countries: Vec<Country>,
    pub fail: bool,
    pub delay: Duration,
    pub all_calls: AtomicUsize,
    pub by_code_calls: AtomicUsize,
    pub by_codes_calls: AtomicUsize,
}

impl StubSource {
    pub fn new(countries: Vec<Country>) -> Self {
        Self {
            countries,
            fail: false,
            delay: Duration::from_millis(5),
            all_calls: AtomicUsize::new(0),
            by_code_calls: AtomicUsize::new(0),
            by_codes_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    fn outage() -> UpstreamError {
        UpstreamError::Status {
            status: 503,
            message: "stub outage".to_string(),
        }
    }
}

#[async_trait]
impl CountrySource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_all_countries(&self) -> Result<Vec<Country>, UpstreamError> {
        self.all_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Self::outage());
        }
        Ok(self.countries.clone())
    }

    async fn fetch_country_by_code(&self, code: &str) -> Result<Country, UpstreamError> {
        self.by_code_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(Self::outage());
        }
        self.countries
            .iter()
            .find(|c| c.cca3.eq_ignore_ascii_case(code))
            .cloned()
            .ok_or_else(|| UpstreamError::Status {
                status: 404,
                message: "Not Found".to_string(),
            })
    }

    async fn fetch_countries_by_codes(&self, codes: &[String]) -> Vec<Country> {
        self.by_codes_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Vec::new();
        }
        self.countries
            .iter()
            .filter(|c| codes.contains(&c.cca3))
            .cloned()
            .collect()
    }
}

/// Query layer over a stub source and a fresh cache.
pub fn test_queries(source: Arc<StubSource>) -> CountryQueries {
    CountryQueries::new(source, Arc::new(QueryCache::default()))
}
