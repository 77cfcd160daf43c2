use geo::BoundingRect;
use geo_types::Rect;
use serde::{Deserialize, Serialize};

/// A validated GeoJSON feature.
///
/// Construction (and therefore deserialization) guarantees a string `id` and
/// a geometry whose axis-aligned bounding rectangle is computable. The
/// rectangle is cached on the wrapper and never serialized; on the wire this
/// type is exactly the underlying GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "geojson::Feature", into = "geojson::Feature")]
pub struct FeaturePayload {
    feature: geojson::Feature,
    id: String,
    bbox: Rect<f64>,
}

impl FeaturePayload {
    /// The feature id. Guaranteed present and a string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Axis-aligned bounding rectangle of the geometry.
    pub fn bounding_rect(&self) -> Rect<f64> {
        self.bbox
    }

    pub fn as_geojson(&self) -> &geojson::Feature {
        &self.feature
    }

    pub fn into_geojson(self) -> geojson::Feature {
        self.feature
    }
}

impl TryFrom<geojson::Feature> for FeaturePayload {
    type Error = String;

    fn try_from(feature: geojson::Feature) -> Result<Self, Self::Error> {
        let id = match &feature.id {
            Some(geojson::feature::Id::String(id)) => id.clone(),
            Some(_) => return Err("feature id must be a string".to_string()),
            None => return Err("feature is missing an id".to_string()),
        };

        let geometry = feature
            .geometry
            .as_ref()
            .ok_or_else(|| "feature is missing a geometry".to_string())?;
        let geometry = geo_types::Geometry::<f64>::try_from(geometry)
            .map_err(|err| format!("unsupported geometry: {}", err))?;
        let bbox = geometry
            .bounding_rect()
            .ok_or_else(|| "geometry has no bounding rectangle".to_string())?;

        Ok(Self { feature, id, bbox })
    }
}

impl From<FeaturePayload> for geojson::Feature {
    fn from(payload: FeaturePayload) -> Self {
        payload.feature
    }
}

/// Mutation kind carried by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Upsert,
    Delete,
}

/// A feature as held in the engine's map and written to the snapshot.
///
/// `origin` is the node that first accepted the feature's latest write and
/// `lsn` the sequence number that node assigned; together they are the pair
/// the vector clock governs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "name")]
    pub origin: String,
    pub lsn: u64,
    #[serde(rename = "feature")]
    pub payload: FeaturePayload,
}

/// A replicated mutation.
///
/// Serialized as one JSON object per WAL line and verbatim on the peer wire.
/// A transaction carries its origin forever; `lsn` is meaningful only
/// relative to that origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub action: Action,
    #[serde(rename = "name")]
    pub origin: String,
    pub lsn: u64,
    #[serde(rename = "feature")]
    pub payload: FeaturePayload,
}
