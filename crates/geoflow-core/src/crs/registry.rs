//! Built-in registry of well-known coordinate reference systems.
//!
//! The resolver consults this table before asking PROJ. Each entry
//! carries the canonical WKT and the legacy PROJ string so that WKT
//! `.prj` files and PROJ-string definitions can be matched back to an
//! EPSG code without a full PROJ database query.

use crate::models::{AxisOrder, Crs};

/// One registry row. `wkt` is the canonical definition used for CRS
/// equality; `proj4` is the legacy PROJ string used for exact matching
/// of PROJ-string definitions.
pub(crate) struct CrsEntry {
    pub code: u32,
    pub name: &'static str,
    pub datum: &'static str,
    pub axis_order: AxisOrder,
    pub area_of_use: [f64; 4],
    pub wkt: &'static str,
    pub proj4: &'static str,
}

pub(crate) static WELL_KNOWN: &[CrsEntry] = &[
    CrsEntry {
        code: 4326,
        name: "WGS 84",
        datum: "World Geodetic System 1984",
        axis_order: AxisOrder::NorthEast,
        area_of_use: [-180.0, -90.0, 180.0, 90.0],
        wkt: r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#,
        proj4: "+proj=longlat +datum=WGS84 +no_defs",
    },
    CrsEntry {
        code: 3857,
        name: "WGS 84 / Pseudo-Mercator",
        datum: "World Geodetic System 1984",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [-180.0, -85.06, 180.0, 85.06],
        wkt: r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1],AUTHORITY["EPSG","3857"]]"#,
        proj4: "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs",
    },
    CrsEntry {
        code: 2154,
        name: "RGF93 v1 / Lambert-93",
        datum: "Reseau Geodesique Francais 1993",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [-9.86, 41.15, 10.38, 51.56],
        wkt: r#"PROJCS["RGF93 v1 / Lambert-93",GEOGCS["RGF93 v1",DATUM["Reseau_Geodesique_Francais_1993",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Lambert_Conformal_Conic_2SP"],PARAMETER["latitude_of_origin",46.5],PARAMETER["central_meridian",3],PARAMETER["standard_parallel_1",49],PARAMETER["standard_parallel_2",44],PARAMETER["false_easting",700000],PARAMETER["false_northing",6600000],UNIT["metre",1],AUTHORITY["EPSG","2154"]]"#,
        proj4: "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 +x_0=700000 +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
    },
    CrsEntry {
        code: 27700,
        name: "OSGB36 / British National Grid",
        datum: "Ordnance Survey of Great Britain 1936",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [-9.0, 49.75, 2.01, 61.01],
        wkt: r#"PROJCS["OSGB36 / British National Grid",GEOGCS["OSGB36",DATUM["Ordnance_Survey_of_Great_Britain_1936",SPHEROID["Airy 1830",6377563.396,299.3249646]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",49],PARAMETER["central_meridian",-2],PARAMETER["scale_factor",0.9996012717],PARAMETER["false_easting",400000],PARAMETER["false_northing",-100000],UNIT["metre",1],AUTHORITY["EPSG","27700"]]"#,
        proj4: "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy +units=m +no_defs",
    },
    CrsEntry {
        code: 25832,
        name: "ETRS89 / UTM zone 32N",
        datum: "European Terrestrial Reference System 1989",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [6.0, 38.76, 12.0, 84.33],
        wkt: r#"PROJCS["ETRS89 / UTM zone 32N",GEOGCS["ETRS89",DATUM["European_Terrestrial_Reference_System_1989",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",9],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1],AUTHORITY["EPSG","25832"]]"#,
        proj4: "+proj=utm +zone=32 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
    },
    CrsEntry {
        code: 32633,
        name: "WGS 84 / UTM zone 33N",
        datum: "World Geodetic System 1984",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [12.0, 0.0, 18.0, 84.0],
        wkt: r#"PROJCS["WGS 84 / UTM zone 33N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",15],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1],AUTHORITY["EPSG","32633"]]"#,
        proj4: "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs",
    },
    CrsEntry {
        code: 32620,
        name: "WGS 84 / UTM zone 20N",
        datum: "World Geodetic System 1984",
        axis_order: AxisOrder::EastNorth,
        area_of_use: [-66.0, 0.0, -60.0, 84.0],
        wkt: r#"PROJCS["WGS 84 / UTM zone 20N",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Transverse_Mercator"],PARAMETER["latitude_of_origin",0],PARAMETER["central_meridian",-63],PARAMETER["scale_factor",0.9996],PARAMETER["false_easting",500000],PARAMETER["false_northing",0],UNIT["metre",1],AUTHORITY["EPSG","32620"]]"#,
        proj4: "+proj=utm +zone=20 +datum=WGS84 +units=m +no_defs",
    },
    CrsEntry {
        code: 4269,
        name: "NAD83",
        datum: "North American Datum 1983",
        axis_order: AxisOrder::NorthEast,
        area_of_use: [-180.0, 14.92, -47.74, 86.45],
        wkt: r#"GEOGCS["NAD83",DATUM["North_American_Datum_1983",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4269"]]"#,
        proj4: "+proj=longlat +datum=NAD83 +no_defs",
    },
    CrsEntry {
        code: 3035,
        name: "ETRS89-extended / LAEA Europe",
        datum: "European Terrestrial Reference System 1989",
        axis_order: AxisOrder::NorthEast,
        area_of_use: [-35.58, 24.6, 44.83, 84.73],
        wkt: r#"PROJCS["ETRS89-extended / LAEA Europe",GEOGCS["ETRS89",DATUM["European_Terrestrial_Reference_System_1989",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433]],PROJECTION["Lambert_Azimuthal_Equal_Area"],PARAMETER["latitude_of_center",52],PARAMETER["longitude_of_center",10],PARAMETER["false_easting",4321000],PARAMETER["false_northing",3210000],UNIT["metre",1],AUTHORITY["EPSG","3035"]]"#,
        proj4: "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs",
    },
    CrsEntry {
        code: 4258,
        name: "ETRS89",
        datum: "European Terrestrial Reference System 1989",
        axis_order: AxisOrder::NorthEast,
        area_of_use: [-16.1, 32.88, 40.18, 84.73],
        wkt: r#"GEOGCS["ETRS89",DATUM["European_Terrestrial_Reference_System_1989",SPHEROID["GRS 1980",6378137,298.257222101]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4258"]]"#,
        proj4: "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs",
    },
];

impl CrsEntry {
    pub(crate) fn to_crs(&self) -> Crs {
        Crs {
            authority: "EPSG".to_string(),
            code: self.code,
            name: self.name.to_string(),
            datum: self.datum.to_string(),
            axis_order: self.axis_order,
            area_of_use: Some(self.area_of_use),
            wkt: Some(self.wkt.to_string()),
        }
    }
}

/// Look up a well-known CRS by EPSG code
pub fn lookup_epsg(code: u32) -> Option<Crs> {
    WELL_KNOWN
        .iter()
        .find(|entry| entry.code == code)
        .map(CrsEntry::to_crs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_code() {
        let crs = lookup_epsg(4326).unwrap();
        assert_eq!(crs.name, "WGS 84");
        assert!(crs.wkt.is_some());
    }

    #[test]
    fn test_lookup_unknown_code() {
        assert!(lookup_epsg(99999).is_none());
    }

    #[test]
    fn test_every_wkt_carries_its_own_authority() {
        for entry in WELL_KNOWN {
            let tag = format!(r#"AUTHORITY["EPSG","{}"]"#, entry.code);
            assert!(
                entry.wkt.contains(&tag),
                "registry WKT for {} is missing its top-level authority tag",
                entry.code
            );
        }
    }
}
