//! Reprojection between coordinate reference systems with PROJ.

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use proj::Proj;

use geoflow_core::error::{GeoflowError, Result};
use geoflow_core::models::{Crs, Feature, FeatureCollection};

/// Coordinate transformer for one source → target CRS pair.
///
/// Wraps a single PROJ transformation; `Proj::new_known_crs` normalizes
/// axis order, so coordinates are always x=easting/longitude,
/// y=northing/latitude on both sides.
pub struct Reprojector {
    proj: Proj,
    source: Crs,
    target: Crs,
}

impl Reprojector {
    /// Create a transformer between two resolved CRS.
    ///
    /// Fails with `UnsupportedTransform` when PROJ knows no path
    /// between the pair.
    pub fn new(source: &Crs, target: &Crs) -> Result<Self> {
        let proj = Proj::new_known_crs(
            &source.authority_code(),
            &target.authority_code(),
            None,
        )
        .map_err(|e| GeoflowError::UnsupportedTransform {
            source: source.authority_code(),
            target: target.authority_code(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            proj,
            source: source.clone(),
            target: target.clone(),
        })
    }

    pub fn source(&self) -> &Crs {
        &self.source
    }

    pub fn target(&self) -> &Crs {
        &self.target
    }

    /// Transform a geometry, preserving its topology: ring order and
    /// vertex counts are unchanged.
    pub fn transform_geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        if self.source == self.target {
            return Ok(geometry.clone());
        }

        match geometry {
            Geometry::Point(p) => {
                let (x, y) = self.transform_coord(p.0)?;
                Ok(Geometry::Point(Point::new(x, y)))
            }
            Geometry::Line(line) => {
                let (x1, y1) = self.transform_coord(line.start)?;
                let (x2, y2) = self.transform_coord(line.end)?;
                Ok(Geometry::Line(geo::Line::new(
                    Coord { x: x1, y: y1 },
                    Coord { x: x2, y: y2 },
                )))
            }
            Geometry::LineString(ls) => {
                Ok(Geometry::LineString(self.transform_linestring(ls)?))
            }
            Geometry::Polygon(polygon) => {
                Ok(Geometry::Polygon(self.transform_polygon(polygon)?))
            }
            Geometry::MultiPoint(mp) => {
                let points: Result<Vec<Point>> =
                    mp.iter()
                        .map(|p| {
                            let (x, y) = self.transform_coord(p.0)?;
                            Ok(Point::new(x, y))
                        })
                        .collect();
                Ok(Geometry::MultiPoint(MultiPoint::new(points?)))
            }
            Geometry::MultiLineString(mls) => {
                let lines: Result<Vec<LineString>> = mls
                    .iter()
                    .map(|ls| self.transform_linestring(ls))
                    .collect();
                Ok(Geometry::MultiLineString(MultiLineString::new(lines?)))
            }
            Geometry::MultiPolygon(mp) => {
                let polygons: Result<Vec<Polygon>> =
                    mp.iter().map(|p| self.transform_polygon(p)).collect();
                Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons?)))
            }
            Geometry::GeometryCollection(gc) => {
                let members: Result<Vec<Geometry<f64>>> =
                    gc.iter().map(|g| self.transform_geometry(g)).collect();
                Ok(Geometry::GeometryCollection(GeometryCollection::new_from(
                    members?,
                )))
            }
            // Rect and Triangle do not survive projection as their own
            // kind; they become general polygons.
            Geometry::Rect(rect) => {
                Ok(Geometry::Polygon(self.transform_polygon(&rect.to_polygon())?))
            }
            Geometry::Triangle(triangle) => Ok(Geometry::Polygon(
                self.transform_polygon(&triangle.to_polygon())?,
            )),
        }
    }

    fn transform_coord(&self, coord: Coord) -> Result<(f64, f64)> {
        self.proj
            .convert((coord.x, coord.y))
            .map_err(|e| self.conversion_error(e))
    }

    /// Batch conversion of a full linestring, much faster than
    /// point-by-point for dense geometries.
    fn transform_linestring(&self, ls: &LineString<f64>) -> Result<LineString<f64>> {
        let mut coords: Vec<(f64, f64)> = ls.coords().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| self.conversion_error(e))?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }

    fn transform_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        let exterior = self.transform_linestring(polygon.exterior())?;
        let interiors: Result<Vec<LineString<f64>>> = polygon
            .interiors()
            .iter()
            .map(|ls| self.transform_linestring(ls))
            .collect();
        Ok(Polygon::new(exterior, interiors?))
    }

    fn conversion_error(&self, e: proj::ProjError) -> GeoflowError {
        GeoflowError::UnsupportedTransform {
            source: self.source.authority_code(),
            target: self.target.authority_code(),
            reason: format!("coordinate transformation failed: {}", e),
        }
    }
}

/// Reproject a collection into the target CRS.
///
/// Pure copy-on-write: the input is untouched, and a collection already
/// in the target CRS is returned as a plain clone. Attributes and ids
/// are carried through unchanged; the output collection's CRS equals
/// `target`.
pub fn reproject(collection: &FeatureCollection, target: &Crs) -> Result<FeatureCollection> {
    if collection.crs() == target {
        return Ok(collection.clone());
    }

    let reprojector = Reprojector::new(collection.crs(), target)?;

    let features: Result<Vec<Feature>> = collection
        .iter()
        .map(|feature| {
            Ok(Feature {
                id: feature.id.clone(),
                geometry: reprojector.transform_geometry(&feature.geometry)?,
                properties: feature.properties.clone(),
            })
        })
        .collect();

    Ok(FeatureCollection::from_features(target.clone(), features?))
}
