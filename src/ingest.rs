//! Output contract of the point ingestor.
//!
//! File upload and CSV/XLSX decoding happen outside this crate. What arrives
//! here is an already-decoded table: rows as JSON objects, or a GeoJSON
//! feature collection. This module finds the coordinate columns, coerces
//! their values to numbers and turns each surviving row into a
//! [`PointRecord`]. Rows whose coordinates cannot be read as numbers are
//! dropped and reported; range checking is left to the spatial index.

use crate::error::{InstapointsError, Result};
use instapoints_types::point::{Attributes, MapPoint};
use serde_json::{Map, Value};

pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";

/// One decoded row: coordinates plus every other column.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub attributes: Attributes,
}

impl PointRecord {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            attributes: Attributes::new(),
        }
    }

    pub fn with_attributes(latitude: f64, longitude: f64, attributes: Attributes) -> Self {
        Self {
            latitude,
            longitude,
            attributes,
        }
    }

    pub fn into_point(self, id: u64) -> MapPoint {
        MapPoint::with_attributes(id, self.latitude, self.longitude, self.attributes)
    }
}

/// A row that could not be turned into a record.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    /// Zero-based position in the input
    pub row: usize,
    pub reason: String,
}

/// Records read from one input plus the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub records: Vec<PointRecord>,
    pub dropped: Vec<DroppedRow>,
}

impl IngestReport {
    pub fn total_rows(&self) -> usize {
        self.records.len() + self.dropped.len()
    }
}

/// Assign ids by position and build the points for a dataset load.
pub fn records_into_points<I>(records: I) -> Vec<MapPoint>
where
    I: IntoIterator<Item = PointRecord>,
{
    records
        .into_iter()
        .enumerate()
        .map(|(id, record)| record.into_point(id as u64))
        .collect()
}

/// Read a JSON array of row objects.
///
/// Column names are matched case-insensitively and lower-cased on the way in.
/// Coordinates may be JSON numbers or numeric strings; anything else drops the
/// row.
///
/// # Errors
///
/// `MissingColumns` when no row has both a `latitude` and a `longitude`
/// column, `Serialization` when the text is not an array of objects.
///
/// # Examples
///
/// ```rust
/// use instapoints::ingest::records_from_json_rows;
///
/// let report = records_from_json_rows(r#"[
///     {"Latitude": -23.55, "Longitude": -46.63, "name": "Sao Paulo"},
///     {"Latitude": "-22.90", "Longitude": "-43.17", "name": "Rio"},
///     {"Latitude": "n/a", "Longitude": -47.9, "name": "Brasilia"}
/// ]"#)?;
///
/// assert_eq!(report.records.len(), 2);
/// assert_eq!(report.dropped.len(), 1);
/// assert_eq!(report.records[1].latitude, -22.90);
/// assert_eq!(report.records[0].attributes["name"], "Sao Paulo");
/// # Ok::<(), instapoints::InstapointsError>(())
/// ```
pub fn records_from_json_rows(json: &str) -> Result<IngestReport> {
    let rows: Vec<Map<String, Value>> = serde_json::from_str(json)?;

    if rows.is_empty() {
        return Ok(IngestReport::default());
    }

    let columns = collect_columns(&rows);
    let has = |name: &str| columns.iter().any(|c| c.eq_ignore_ascii_case(name));
    if !has(LATITUDE_COLUMN) || !has(LONGITUDE_COLUMN) {
        return Err(InstapointsError::MissingColumns { found: columns });
    }

    let mut report = IngestReport::default();
    for (row, fields) in rows.into_iter().enumerate() {
        let mut attributes: Attributes = fields
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        let latitude = attributes.remove(LATITUDE_COLUMN);
        let longitude = attributes.remove(LONGITUDE_COLUMN);

        match (
            latitude.as_ref().and_then(coerce_number),
            longitude.as_ref().and_then(coerce_number),
        ) {
            (Some(latitude), Some(longitude)) => {
                report
                    .records
                    .push(PointRecord::with_attributes(latitude, longitude, attributes));
            }
            _ => report.dropped.push(DroppedRow {
                row,
                reason: format!(
                    "Non-numeric coordinates: latitude={}, longitude={}",
                    display_value(latitude.as_ref()),
                    display_value(longitude.as_ref())
                ),
            }),
        }
    }

    if !report.dropped.is_empty() {
        log::warn!(
            "Dropped {} of {} row(s) without numeric latitude/longitude",
            report.dropped.len(),
            report.total_rows()
        );
    }

    Ok(report)
}

/// Read a GeoJSON `FeatureCollection` (or a single `Feature`) of points.
///
/// Feature properties become attributes. Features without a point geometry
/// are dropped and reported.
///
/// # Examples
///
/// ```rust
/// use instapoints::ingest::records_from_geojson;
///
/// let report = records_from_geojson(r#"{
///     "type": "FeatureCollection",
///     "features": [
///         {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-9.14, 38.72]},
///          "properties": {"city": "Lisbon"}}
///     ]
/// }"#)?;
///
/// assert_eq!(report.records[0].latitude, 38.72);
/// assert_eq!(report.records[0].longitude, -9.14);
/// # Ok::<(), instapoints::InstapointsError>(())
/// ```
#[cfg(feature = "geojson")]
pub fn records_from_geojson(text: &str) -> Result<IngestReport> {
    use geojson::GeoJson;

    let parsed: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| InstapointsError::GeoJson(e.to_string()))?;

    let features = match parsed {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(InstapointsError::GeoJson(
                "Expected a Feature or FeatureCollection, got a bare geometry".to_string(),
            ));
        }
    };

    let mut report = IngestReport::default();
    for (row, feature) in features.into_iter().enumerate() {
        let coords = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(coords)) if coords.len() >= 2 => (coords[1], coords[0]),
            Some(other) => {
                report.dropped.push(DroppedRow {
                    row,
                    reason: format!("Unsupported geometry type: {}", geometry_name(other)),
                });
                continue;
            }
            None => {
                report.dropped.push(DroppedRow {
                    row,
                    reason: "Feature has no geometry".to_string(),
                });
                continue;
            }
        };

        let attributes: Attributes = feature.properties.unwrap_or_default().into_iter().collect();
        report
            .records
            .push(PointRecord::with_attributes(coords.0, coords.1, attributes));
    }

    if !report.dropped.is_empty() {
        log::warn!(
            "Dropped {} of {} feature(s) without point geometry",
            report.dropped.len(),
            report.total_rows()
        );
    }

    Ok(report)
}

#[cfg(feature = "geojson")]
fn geometry_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Column names in first-seen order across all rows.
fn collect_columns(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (!number.is_nan()).then_some(number)
}

fn display_value(value: Option<&Value>) -> String {
    value.map_or_else(|| "missing".to_string(), Value::to_string)
}
