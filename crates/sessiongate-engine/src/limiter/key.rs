//! Dimension key extraction.
//!
//! Maps a login's source address and user agent onto the grouping key of a
//! policy's limiting dimension. Classifier and geo failures degrade the key
//! to `"unknown"` — a lookup outage must never abort an evaluation.

use std::net::IpAddr;

use tracing::warn;

use sessiongate_core::types::{DimensionKey, LimitDimension};
use sessiongate_entity::{DeviceInfo, SessionRecord};
use sessiongate_entity::device::UNKNOWN_ATTRIBUTE;

use crate::classifier::DeviceClassifier;
use crate::geo::GeoResolver;

/// Compute the grouping key for a (source address, user agent) pair under
/// the given dimension.
pub fn key_for(
    dimension: LimitDimension,
    source_ip: IpAddr,
    user_agent: Option<&str>,
    classifier: &dyn DeviceClassifier,
    geo: &dyn GeoResolver,
) -> DimensionKey {
    match dimension {
        LimitDimension::None | LimitDimension::User => DimensionKey::User,
        LimitDimension::Ip => DimensionKey::Ip(source_ip),
        LimitDimension::Country => DimensionKey::Country(country_key(source_ip, geo)),
        LimitDimension::DeviceClass
        | LimitDimension::DeviceType
        | LimitDimension::DeviceClient
        | LimitDimension::DeviceBrowser
        | LimitDimension::DeviceOs => {
            let info = device_info(user_agent, classifier);
            let value = match dimension {
                LimitDimension::DeviceClass => info.class,
                LimitDimension::DeviceType => info.device_type,
                LimitDimension::DeviceClient => info.client,
                LimitDimension::DeviceBrowser => info.browser,
                _ => info.os,
            };
            DimensionKey::Device(value)
        }
    }
}

/// Compute the grouping key of an existing session record.
pub fn record_key(
    dimension: LimitDimension,
    record: &SessionRecord,
    classifier: &dyn DeviceClassifier,
    geo: &dyn GeoResolver,
) -> DimensionKey {
    key_for(
        dimension,
        record.source_ip,
        record.user_agent.as_deref(),
        classifier,
        geo,
    )
}

fn country_key(ip: IpAddr, geo: &dyn GeoResolver) -> String {
    match geo.country_of(ip) {
        Ok(Some(country)) => country,
        Ok(None) => UNKNOWN_ATTRIBUTE.to_string(),
        Err(e) => {
            warn!(ip = %ip, error = %e, "Geo lookup failed, grouping under 'unknown'");
            UNKNOWN_ATTRIBUTE.to_string()
        }
    }
}

fn device_info(user_agent: Option<&str>, classifier: &dyn DeviceClassifier) -> DeviceInfo {
    let Some(ua) = user_agent else {
        return DeviceInfo::unknown();
    };

    match classifier.classify(ua) {
        Ok(info) => info,
        Err(e) => {
            warn!(error = %e, "Device classification failed, grouping under 'unknown'");
            DeviceInfo::unknown()
        }
    }
}
