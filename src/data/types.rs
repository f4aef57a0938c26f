use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Common and official names of a country.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CountryName {
    pub common: String,
    pub official: String,
}

/// Flag image references.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Flags {
    pub png: String,
    pub svg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Currency {
    pub name: String,
    /// A handful of upstream currencies ship without a symbol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Maps {
    pub google_maps: String,
    pub open_street_maps: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct CoatOfArms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Car {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
}

/// A read-only projection of one upstream country record.
///
/// Summary queries populate only a subset of the optional fields; a detail
/// query (two merged partial fetches) populates all of them. Records are
/// never mutated after decoding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: CountryName,
    pub cca2: String,
    pub cca3: String,
    #[serde(default)]
    pub capital: Vec<String>,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subregion: Option<String>,
    pub population: u64,
    pub area: f64,
    pub flags: Flags,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currencies: Option<BTreeMap<String, Currency>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezones: Option<Vec<String>>,
    #[serde(default)]
    pub continents: Vec<String>,
    /// cca3 codes of neighbouring countries. Not resolved here; see
    /// `CountryQueries::border_countries`.
    #[serde(default)]
    pub borders: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latlng: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<Maps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub independent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub un_member: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landlocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coat_of_arms: Option<CoatOfArms>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_of_week: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car: Option<Car>,
}

impl Country {
    /// Geographic centroid as `(lat, lng)`, if the source supplied a pair.
    ///
    /// `latlng` is outside every REST Countries field set this crate
    /// requests, so records from that client never carry it.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        match self.latlng.as_deref() {
            Some([lat, lng, ..]) => Some((*lat, *lng)),
            _ => None,
        }
    }

    /// Currency names in code order, e.g. `["Euro"]`.
    pub fn currency_names(&self) -> Vec<&str> {
        self.currencies
            .iter()
            .flat_map(|m| m.values())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Language names in code order.
    pub fn language_names(&self) -> Vec<&str> {
        self.languages
            .iter()
            .flat_map(|m| m.values())
            .map(String::as_str)
            .collect()
    }
}
