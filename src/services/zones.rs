//! Zone operations built on the raw client call.

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use url::form_urlencoded;

use crate::domain::models::{
    is_valid_zone_identifier, ApiResponse, PaginatedResponse, Zone, ZoneId, ZoneParams,
};
use crate::infrastructure::api::{decode_json, ApiError, Client, Payload, RouteType};

/// Zone facade borrowing a [`Client`].
///
/// Obtained through [`Client::zones`].
#[derive(Debug, Clone, Copy)]
pub struct ZonesService<'a> {
    client: &'a Client,
}

impl<'a> ZonesService<'a> {
    pub const fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Fetch a single zone.
    #[instrument(skip(self, cancel))]
    pub async fn get(&self, cancel: &CancellationToken, zone_id: &str) -> Result<Zone, ApiError> {
        validate_zone_id(zone_id)?;

        let body = self
            .client
            .call(cancel, Method::GET, &RouteType::Zones.path(zone_id), Payload::Empty)
            .await?;
        let response: ApiResponse<Zone> = decode_json("zone", &body)?;
        Ok(response.result)
    }

    /// Fetch one page of zones matching `params`.
    #[instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        cancel: &CancellationToken,
        params: &ZoneParams,
    ) -> Result<PaginatedResponse<Zone>, ApiError> {
        let path = list_path(params);
        let body = self
            .client
            .call(cancel, Method::GET, &path, Payload::Empty)
            .await?;
        decode_json("zones", &body)
    }

    /// Fetch every page of zones matching `params`, starting from
    /// `params.page` or the first page.
    #[instrument(skip(self, cancel))]
    pub async fn list_all(
        &self,
        cancel: &CancellationToken,
        params: &ZoneParams,
    ) -> Result<Vec<Zone>, ApiError> {
        let mut page = params.page.filter(|p| *p > 0).unwrap_or(1);
        let mut zones = Vec::new();

        loop {
            let response = self.list(cancel, &params.with_page(page)).await?;
            let info = response.result_info;
            let fetched = response.result.len();
            zones.extend(response.result);

            debug!(page, fetched, total_pages = info.total_pages, "Fetched zone page");

            if fetched == 0 || page >= info.total_pages {
                break;
            }
            page += 1;
        }

        Ok(zones)
    }

    /// Delete a zone and return the identifier the API acknowledged.
    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, cancel: &CancellationToken, zone_id: &str) -> Result<ZoneId, ApiError> {
        validate_zone_id(zone_id)?;

        let body = self
            .client
            .call(cancel, Method::DELETE, &RouteType::Zones.path(zone_id), Payload::Empty)
            .await?;
        let response: ApiResponse<ZoneId> = decode_json("zone", &body)?;
        Ok(response.result)
    }
}

fn validate_zone_id(zone_id: &str) -> Result<(), ApiError> {
    if is_valid_zone_identifier(zone_id) {
        Ok(())
    } else {
        Err(ApiError::InvalidIdentifier {
            kind: "zone",
            id: zone_id.to_string(),
        })
    }
}

fn list_path(params: &ZoneParams) -> String {
    let pairs = params.query_pairs();
    if pairs.is_empty() {
        return "/zones".to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("/zones?{query}")
}
