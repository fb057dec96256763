//! Dissolve: merge features sharing a key attribute into unified
//! shapes, aggregating the remaining columns.

use std::collections::HashMap;
use std::str::FromStr;

use geo::{BooleanOps, Geometry, MultiLineString, MultiPoint, MultiPolygon};

use geoflow_core::error::{GeoflowError, Result};
use geoflow_core::models::{Feature, FeatureCollection, Properties};

/// Aggregation function applied to a column's values within one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// First non-null value in group order
    First,
    /// Last non-null value in group order
    Last,
    /// Sum of the numeric values
    Sum,
    /// Smallest numeric value
    Min,
    /// Largest numeric value
    Max,
    /// Number of non-null values
    Count,
    /// Every value, in group order
    List,
}

impl FromStr for Aggregate {
    type Err = GeoflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "last" => Ok(Self::Last),
            "sum" => Ok(Self::Sum),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "count" => Ok(Self::Count),
            "list" => Ok(Self::List),
            other => Err(GeoflowError::ConfigInvalid {
                key: "aggregation".to_string(),
                reason: format!(
                    "unknown aggregation '{}': expected first, last, sum, min, max, count, or list",
                    other
                ),
            }),
        }
    }
}

/// Dissolve a collection by a key column.
///
/// Features with equal key values merge into one feature whose geometry
/// is the union of the group's geometries. The first occurrence of each
/// key determines output order; the key becomes the output feature's
/// row identifier and is no longer an attribute column. Columns named
/// in `aggregations` are folded with the given function; unlisted
/// columns are dropped.
///
/// The key is looked up in the attribute columns first and falls back
/// to the feature id, so dissolving an already-dissolved collection by
/// the same key is a no-op.
pub fn dissolve(
    collection: &FeatureCollection,
    key_column: &str,
    aggregations: &HashMap<String, Aggregate>,
) -> Result<FeatureCollection> {
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Feature>)> = Vec::new();
    let mut key_found = false;

    for feature in collection.iter() {
        let key = match feature.properties.get(key_column) {
            Some(value) => {
                key_found = true;
                key_display(value)
            }
            None => match &feature.id {
                Some(id) => {
                    key_found = true;
                    id.clone()
                }
                // Features with neither the column nor an id group
                // together under a null key.
                None => "null".to_string(),
            },
        };

        match group_index.get(&key) {
            Some(&position) => groups[position].1.push(feature),
            None => {
                group_index.insert(key.clone(), groups.len());
                groups.push((key, vec![feature]));
            }
        }
    }

    if !key_found && !collection.is_empty() {
        return Err(GeoflowError::MissingColumn {
            column: key_column.to_string(),
        });
    }

    let features: Result<Vec<Feature>> = groups
        .into_iter()
        .map(|(key, members)| {
            let geometry = merge_geometries(&members, &key)?;
            let properties = aggregate_columns(&members, key_column, aggregations);
            Ok(Feature {
                id: Some(key),
                geometry,
                properties,
            })
        })
        .collect();

    Ok(FeatureCollection::from_features(
        collection.crs().clone(),
        features?,
    ))
}

/// Unquoted display form of a key value, used as the output row
/// identifier
fn key_display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Union a group's geometries into one shape.
///
/// Single-member groups pass through untouched. Polygonal groups are
/// unioned; point and line groups collect into their multi variants.
/// Mixed groups cannot be merged.
fn merge_geometries(members: &[&Feature], key: &str) -> Result<Geometry<f64>> {
    if members.len() == 1 {
        return Ok(members[0].geometry.clone());
    }

    let geometries: Vec<&Geometry<f64>> = members.iter().map(|f| &f.geometry).collect();

    if geometries
        .iter()
        .all(|g| matches!(g, Geometry::Polygon(_) | Geometry::MultiPolygon(_)))
    {
        let mut union: Option<MultiPolygon<f64>> = None;
        for geometry in &geometries {
            let multi = match geometry {
                Geometry::Polygon(p) => MultiPolygon::new(vec![p.clone()]),
                Geometry::MultiPolygon(mp) => (*mp).clone(),
                _ => unreachable!(),
            };
            union = Some(match union {
                Some(existing) => existing.union(&multi),
                None => multi,
            });
        }
        let mut merged = union.unwrap_or_else(|| MultiPolygon::new(vec![]));
        return Ok(if merged.0.len() == 1 {
            Geometry::Polygon(merged.0.remove(0))
        } else {
            Geometry::MultiPolygon(merged)
        });
    }

    if geometries
        .iter()
        .all(|g| matches!(g, Geometry::Point(_) | Geometry::MultiPoint(_)))
    {
        let mut points = Vec::new();
        for geometry in &geometries {
            match geometry {
                Geometry::Point(p) => points.push(*p),
                Geometry::MultiPoint(mp) => points.extend(mp.iter().copied()),
                _ => unreachable!(),
            }
        }
        return Ok(Geometry::MultiPoint(MultiPoint::new(points)));
    }

    if geometries
        .iter()
        .all(|g| matches!(g, Geometry::LineString(_) | Geometry::MultiLineString(_)))
    {
        let mut lines = Vec::new();
        for geometry in &geometries {
            match geometry {
                Geometry::LineString(ls) => lines.push(ls.clone()),
                Geometry::MultiLineString(mls) => lines.extend(mls.iter().cloned()),
                _ => unreachable!(),
            }
        }
        return Ok(Geometry::MultiLineString(MultiLineString::new(lines)));
    }

    Err(GeoflowError::invalid_geometry(
        format!("group '{}'", key),
        "cannot merge a group mixing point, line, and polygon geometries",
    ))
}

/// Fold each aggregated column over the group's values. The key column
/// is excluded: it became the row identifier.
fn aggregate_columns(
    members: &[&Feature],
    key_column: &str,
    aggregations: &HashMap<String, Aggregate>,
) -> Properties {
    let mut properties = Properties::new();

    for (column, aggregate) in aggregations {
        if column == key_column {
            continue;
        }
        let values: Vec<&serde_json::Value> = members
            .iter()
            .filter_map(|f| f.properties.get(column))
            .collect();
        properties.insert(column.clone(), fold_values(&values, *aggregate));
    }

    properties
}

fn fold_values(values: &[&serde_json::Value], aggregate: Aggregate) -> serde_json::Value {
    let non_null = || values.iter().filter(|v| !v.is_null());

    match aggregate {
        Aggregate::First => non_null()
            .next()
            .map(|v| (*v).clone())
            .unwrap_or(serde_json::Value::Null),
        Aggregate::Last => non_null()
            .last()
            .map(|v| (*v).clone())
            .unwrap_or(serde_json::Value::Null),
        Aggregate::Count => serde_json::Value::Number(non_null().count().into()),
        Aggregate::Sum => {
            let sum: f64 = values.iter().filter_map(|v| v.as_f64()).sum();
            number(sum)
        }
        Aggregate::Min => values
            .iter()
            .filter_map(|v| v.as_f64())
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.min(v)))
            })
            .map(number)
            .unwrap_or(serde_json::Value::Null),
        Aggregate::Max => values
            .iter()
            .filter_map(|v| v.as_f64())
            .fold(None, |acc: Option<f64>, v| {
                Some(acc.map_or(v, |a| a.max(v)))
            })
            .map(number)
            .unwrap_or(serde_json::Value::Null),
        Aggregate::List => {
            serde_json::Value::Array(values.iter().map(|v| (*v).clone()).collect())
        }
    }
}

fn number(n: f64) -> serde_json::Value {
    serde_json::Number::from_f64(n)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
