//! Geolocation providers - best-effort origin lookup for accepted check-ins.
//!
//! Lookups never block or fail a submission: any error is logged and the
//! record is stored without location labels.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GeoConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub city: String,
    pub region: String,
    pub country: String,
}

impl GeoInfo {
    /// "City, Region" label stored alongside the record.
    pub fn location_label(&self) -> String {
        match (self.city.is_empty(), self.region.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.region),
            (false, true) => self.city.clone(),
            (true, false) => self.region.clone(),
            (true, true) => String::new(),
        }
    }
}

#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Best-effort lookup; `None` on any failure.
    async fn lookup(&self, address: &str) -> Option<GeoInfo>;
}

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    city: String,
    #[serde(rename = "regionName", default)]
    region_name: String,
    #[serde(default)]
    country: String,
}

/// HTTP lookup against an ip-api-style endpoint.
pub struct HttpGeoProvider {
    client: reqwest::Client,
    config: GeoConfig,
}

impl HttpGeoProvider {
    pub fn new(config: GeoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn lookup(&self, address: &str) -> Option<GeoInfo> {
        if address.is_empty() || address == "unknown" {
            return None;
        }

        let url = format!(
            "{}/json/{}?fields=status,city,regionName,country",
            self.config.base_url, address
        );
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Geolocation lookup failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                address = %address,
                status = %response.status(),
                "Geolocation lookup rejected"
            );
            return None;
        }

        match response.json::<GeoResponse>().await {
            Ok(body) if body.status == "success" => Some(GeoInfo {
                city: body.city,
                region: body.region_name,
                country: body.country,
            }),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(address = %address, error = %e, "Malformed geolocation response");
                None
            }
        }
    }
}

/// Provider used when geolocation is disabled.
pub struct NoopGeoProvider;

#[async_trait]
impl GeoProvider for NoopGeoProvider {
    async fn lookup(&self, _address: &str) -> Option<GeoInfo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_label_handles_partial_data() {
        let full = GeoInfo {
            city: "Lisbon".to_string(),
            region: "Lisboa".to_string(),
            country: "Portugal".to_string(),
        };
        assert_eq!(full.location_label(), "Lisbon, Lisboa");

        let city_only = GeoInfo {
            city: "Lisbon".to_string(),
            region: String::new(),
            country: String::new(),
        };
        assert_eq!(city_only.location_label(), "Lisbon");

        let empty = GeoInfo {
            city: String::new(),
            region: String::new(),
            country: String::new(),
        };
        assert_eq!(empty.location_label(), "");
    }
}
