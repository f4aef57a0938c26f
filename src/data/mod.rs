pub mod merge;
pub mod providers;
pub mod source;
pub mod types;

pub use merge::{PartialRecord, merge};
pub use providers::RestCountriesClient;
pub use source::{CountrySource, UpstreamError};
pub use types::{Car, CoatOfArms, Country, CountryName, Currency, Flags, Maps};
