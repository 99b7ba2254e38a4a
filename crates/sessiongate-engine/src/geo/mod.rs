//! IP-to-country resolution and public/private classification.

pub mod ranges;

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use tracing::warn;

use sessiongate_core::EngineResult;

pub use ranges::is_private_ip;

/// Resolves an IP address to a country code and classifies it as public
/// or private.
///
/// Country lookups may fail (backing database unavailable); the caller
/// degrades the country key to `"unknown"` instead of aborting.
pub trait GeoResolver: Send + Sync {
    /// The ISO country code an address resolves to, if known.
    fn country_of(&self, ip: IpAddr) -> EngineResult<Option<String>>;

    /// Whether the address belongs to a private range.
    fn is_private(&self, ip: IpAddr) -> bool;
}

/// Built-in geo resolver backed by a static CIDR-to-country table.
///
/// The table is supplied by the host (typically from configuration or a
/// periodically regenerated file); lookups return the first matching
/// network. Private classification uses the standard private, loopback,
/// and link-local ranges and needs no table.
#[derive(Debug, Clone, Default)]
pub struct CidrGeoResolver {
    table: Vec<(IpNetwork, String)>,
}

impl CidrGeoResolver {
    /// Create a resolver with an empty table: every country lookup
    /// resolves to unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from `(cidr, country_code)` pairs.
    ///
    /// Entries with an unparseable CIDR are skipped with a warning rather
    /// than failing the build; a bad row in a large imported table should
    /// not take the login path down.
    pub fn from_table<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut table = Vec::new();

        for (cidr, country) in entries {
            match cidr.as_ref().parse::<IpNetwork>() {
                Ok(network) => {
                    table.push((network, country.as_ref().to_lowercase()));
                }
                Err(e) => {
                    warn!(cidr = %cidr.as_ref(), error = %e, "Skipping invalid CIDR in geo table");
                }
            }
        }

        Self { table }
    }

    /// Number of usable table entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl GeoResolver for CidrGeoResolver {
    fn country_of(&self, ip: IpAddr) -> EngineResult<Option<String>> {
        Ok(self
            .table
            .iter()
            .find(|(network, _)| network.contains(ip))
            .map(|(_, country)| country.clone()))
    }

    fn is_private(&self, ip: IpAddr) -> bool {
        is_private_ip(ip)
    }
}
