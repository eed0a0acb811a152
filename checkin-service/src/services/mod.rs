pub mod error;
pub mod geo;
pub mod guard;
pub mod ledger;
pub mod metrics;
pub mod reports;
pub mod token_authority;

pub use error::CheckinError;
pub use geo::{GeoInfo, GeoProvider, HttpGeoProvider, NoopGeoProvider};
pub use ledger::{Ledger, LedgerError, MemoryLedger, RestLedger};
pub use token_authority::TokenAuthority;
