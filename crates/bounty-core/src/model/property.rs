//! Properties and their trusted-worker references.

use serde::{Deserialize, Serialize};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Compact worker reference shown on a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedWorkerRef {
    pub id: String,
    pub name: String,
    pub initials: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub gate_code: String,
    pub instructions: String,
    pub image: String,
    pub whitelisted_workers: Vec<TrustedWorkerRef>,
    pub location: Option<GeoPoint>,
}

/// Body of `POST /api/properties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyInput {
    pub address: String,
    pub city: String,
    pub zip_code: String,
    #[serde(default)]
    pub gate_code: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Body of `PATCH /api/properties/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyInput {
    pub address: String,
    pub city: String,
    pub zip_code: String,
    pub gate_code: String,
}
