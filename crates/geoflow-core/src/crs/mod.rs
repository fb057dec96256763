//! CRS resolution: normalizing EPSG codes, WKT, PROJ strings, and
//! PROJJSON definitions into one canonical [`Crs`] record.
//!
//! The resolver is the sole owner of CRS parsing and formatting logic.
//! It attempts an exact match first (an EPSG code found in the
//! definition), then falls back to scored matching against the built-in
//! registry. The best candidate must reach the configured confidence
//! threshold or resolution fails with
//! [`GeoflowError::UnresolvedCrs`](crate::GeoflowError::UnresolvedCrs).

use std::collections::HashMap;

use proj::Proj;

use crate::error::{GeoflowError, Result};
use crate::models::{AxisOrder, Crs};

pub mod registry;

pub use registry::lookup_epsg;

/// Default confidence threshold for best-effort matches (0-100).
///
/// Exact EPSG matches score 100 and codes validated through PROJ score
/// 90, so the default only rejects fuzzy name/parameter matches of
/// middling quality.
pub const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 70;

/// A CRS definition in one of the supported interchange formats.
#[derive(Debug, Clone, PartialEq)]
pub enum CrsDefinition {
    /// Bare EPSG code, e.g. 4326
    Epsg(u32),
    /// WKT (version 1 or 2) definition
    Wkt(String),
    /// Legacy PROJ string, e.g. "+proj=longlat +datum=WGS84 +no_defs"
    ProjString(String),
    /// PROJJSON definition
    ProjJson(serde_json::Value),
}

impl CrsDefinition {
    /// Sniff the syntax of a textual CRS definition.
    ///
    /// Accepts "EPSG:4326" / "4326", WKT ("GEOGCS[...", "PROJCRS[...",
    /// ...), PROJ strings ("+proj=..."), and PROJJSON objects.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(GeoflowError::ConfigInvalid {
                key: "crs".to_string(),
                reason: "empty CRS definition".to_string(),
            });
        }

        if trimmed.starts_with('{') {
            let value: serde_json::Value = serde_json::from_str(trimmed)
                .map_err(|e| GeoflowError::Serialization(format!("Invalid PROJJSON: {}", e)))?;
            return Ok(Self::ProjJson(value));
        }

        if trimmed.starts_with('+') {
            return Ok(Self::ProjString(trimmed.to_string()));
        }

        const WKT_KEYWORDS: [&str; 6] = [
            "GEOGCS", "PROJCS", "GEOGCRS", "PROJCRS", "GEODCRS", "COMPD_CS",
        ];
        if WKT_KEYWORDS.iter().any(|kw| trimmed.contains(kw)) {
            return Ok(Self::Wkt(trimmed.to_string()));
        }

        let code_str = trimmed
            .strip_prefix("EPSG:")
            .or_else(|| trimmed.strip_prefix("epsg:"))
            .unwrap_or(trimmed);
        if let Ok(code) = code_str.parse::<u32>() {
            return Ok(Self::Epsg(code));
        }

        Err(GeoflowError::ConfigInvalid {
            key: "crs".to_string(),
            reason: format!("Unrecognized CRS definition: '{}'", trimmed),
        })
    }

    /// Short human-readable form for error messages
    fn describe(&self) -> String {
        match self {
            Self::Epsg(code) => format!("EPSG:{}", code),
            Self::Wkt(wkt) => format!("WKT({})", truncate(wkt, 60)),
            Self::ProjString(s) => format!("PROJ({})", truncate(s, 60)),
            Self::ProjJson(v) => format!("PROJJSON({})", truncate(&v.to_string(), 60)),
        }
    }

    /// Full form used as the resolver cache key; unlike [`describe`]
    /// this is never truncated, so distinct definitions never collide.
    ///
    /// [`describe`]: CrsDefinition::describe
    fn cache_key(&self) -> String {
        match self {
            Self::Epsg(code) => format!("epsg:{}", code),
            Self::Wkt(wkt) => format!("wkt:{}", wkt),
            Self::ProjString(s) => format!("proj:{}", s),
            Self::ProjJson(v) => format!("projjson:{}", v),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}

/// Resolves CRS definitions to canonical [`Crs`] records.
///
/// Holds an explicit cache in place of the process-global caches common
/// in CRS libraries: the cache is populated on first resolution of a
/// definition and cleared by the caller via [`clear_cache`].
///
/// [`clear_cache`]: CrsResolver::clear_cache
pub struct CrsResolver {
    cache: HashMap<String, Crs>,
    threshold: u8,
}

impl Default for CrsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CrsResolver {
    /// Create a resolver with the default confidence threshold
    pub fn new() -> Self {
        Self::with_threshold(DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// Create a resolver with a caller-supplied threshold (0-100).
    /// Matches scoring below the threshold fail with `UnresolvedCrs`.
    pub fn with_threshold(threshold: u8) -> Self {
        Self {
            cache: HashMap::new(),
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Number of definitions resolved and cached so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop all cached resolutions
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Parse and resolve a textual definition
    pub fn resolve_str(&mut self, input: &str) -> Result<Crs> {
        let definition = CrsDefinition::parse(input)?;
        self.resolve(&definition)
    }

    /// Resolve a definition to a canonical CRS record.
    ///
    /// Exact matches (an EPSG code in the definition) score 100;
    /// PROJ-validated codes missing from the registry score 90; fuzzy
    /// name/parameter matches score 0-100. The best candidate below the
    /// threshold fails with `UnresolvedCrs`.
    pub fn resolve(&mut self, definition: &CrsDefinition) -> Result<Crs> {
        let key = definition.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let (candidate, confidence) = match definition {
            CrsDefinition::Epsg(code) => resolve_epsg(*code),
            CrsDefinition::Wkt(wkt) => resolve_wkt(wkt),
            CrsDefinition::ProjString(s) => resolve_proj_string(s),
            CrsDefinition::ProjJson(v) => resolve_proj_json(v),
        };

        match candidate {
            Some(crs) if confidence >= self.threshold => {
                self.cache.insert(key, crs.clone());
                Ok(crs)
            }
            _ => Err(GeoflowError::UnresolvedCrs {
                definition: definition.describe(),
                best: confidence,
                threshold: self.threshold,
            }),
        }
    }
}

/// Resolve a bare EPSG code: registry first, then PROJ as ground truth
/// for codes the registry does not carry.
fn resolve_epsg(code: u32) -> (Option<Crs>, u8) {
    if let Some(crs) = registry::lookup_epsg(code) {
        return (Some(crs), 100);
    }

    // Not in the registry; ask PROJ whether the code exists at all.
    // Synthesized records keep `wkt: None` so their canonical form is
    // the authority code, consistent across resolution paths.
    match Proj::new(&format!("EPSG:{}", code)) {
        Ok(_) => {
            let crs = Crs {
                authority: "EPSG".to_string(),
                code,
                name: format!("EPSG:{}", code),
                datum: "unknown".to_string(),
                axis_order: AxisOrder::default(),
                area_of_use: None,
                wkt: None,
            };
            (Some(crs), 90)
        }
        Err(_) => (None, 0),
    }
}

fn resolve_wkt(wkt: &str) -> (Option<Crs>, u8) {
    // Exact match: the top-level AUTHORITY tag names the EPSG code.
    if let Some(code) = epsg_from_wkt(wkt) {
        return resolve_epsg(code);
    }

    // Best effort: fuzzy-match the CRS name against the registry.
    match wkt_crs_name(wkt) {
        Some(name) => best_name_match(&name),
        None => (None, 0),
    }
}

/// Parse the EPSG code from a WKT string.
///
/// Looks for the last `AUTHORITY["EPSG","n"]` tag, which in well-formed
/// WKT1 belongs to the CRS itself rather than to a nested datum or
/// spheroid, and falls back to WKT2's `ID["EPSG",n]` form.
pub fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    const AUTHORITY: &str = "AUTHORITY[\"EPSG\",\"";
    if let Some(start) = wkt.rfind(AUTHORITY) {
        let code_start = start + AUTHORITY.len();
        if let Some(end) = wkt[code_start..].find('"') {
            if let Ok(code) = wkt[code_start..code_start + end].parse::<u32>() {
                return Some(code);
            }
        }
    }

    const ID: &str = "ID[\"EPSG\",";
    if let Some(start) = wkt.rfind(ID) {
        let digits: String = wkt[start + ID.len()..]
            .chars()
            .skip_while(|c| c.is_whitespace())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = digits.parse::<u32>() {
            return Some(code);
        }
    }

    None
}

/// Extract the CRS display name: the first quoted string after the
/// outermost WKT keyword.
fn wkt_crs_name(wkt: &str) -> Option<String> {
    let open = wkt.find('[')?;
    let rest = &wkt[open + 1..];
    let first_quote = rest.find('"')?;
    let after = &rest[first_quote + 1..];
    let second_quote = after.find('"')?;
    let name = &after[..second_quote];
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn resolve_proj_string(definition: &str) -> (Option<Crs>, u8) {
    let tokens: Vec<&str> = definition.split_whitespace().collect();

    // "+init=epsg:4326" is an exact reference to a code.
    for token in &tokens {
        if let Some(code_str) = token
            .strip_prefix("+init=epsg:")
            .or_else(|| token.strip_prefix("+init=EPSG:"))
        {
            if let Ok(code) = code_str.parse::<u32>() {
                return resolve_epsg(code);
            }
        }
    }

    // Exact parameter-set match against the registry's PROJ strings.
    let given: std::collections::HashSet<&str> = tokens.iter().copied().collect();
    for entry in registry::WELL_KNOWN {
        let known: std::collections::HashSet<&str> =
            entry.proj4.split_whitespace().collect();
        if given == known {
            return (Some(entry.to_crs()), 100);
        }
    }

    // Best effort: score parameter overlap against every entry.
    let mut best: (Option<Crs>, u8) = (None, 0);
    for entry in registry::WELL_KNOWN {
        let known: std::collections::HashSet<&str> =
            entry.proj4.split_whitespace().collect();
        let common = given.intersection(&known).count();
        let total = given.union(&known).count();
        if total == 0 {
            continue;
        }
        let score = (100 * common / total) as u8;
        if score > best.1 {
            best = (Some(entry.to_crs()), score);
        }
    }
    best
}

fn resolve_proj_json(value: &serde_json::Value) -> (Option<Crs>, u8) {
    // Exact match: {"id": {"authority": "EPSG", "code": 4326}}
    if let Some(id) = value.get("id") {
        let authority = id.get("authority").and_then(|a| a.as_str());
        let code = id.get("code").and_then(|c| c.as_u64());
        if let (Some("EPSG"), Some(code)) = (authority, code) {
            return resolve_epsg(code as u32);
        }
    }

    match value.get("name").and_then(|n| n.as_str()) {
        Some(name) => best_name_match(name),
        None => (None, 0),
    }
}

/// Score a free-form CRS name against every registry entry and return
/// the best match.
fn best_name_match(name: &str) -> (Option<Crs>, u8) {
    let mut best: (Option<Crs>, u8) = (None, 0);
    for entry in registry::WELL_KNOWN {
        let score = name_similarity(name, entry.name).max(name_similarity(name, entry.datum));
        if score > best.1 {
            best = (Some(entry.to_crs()), score);
        }
    }
    best
}

/// Token-overlap similarity between two names, 0-100.
fn name_similarity(a: &str, b: &str) -> u8 {
    let tokens = |s: &str| -> Vec<String> {
        s.to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    };
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0;
    }
    let common = ta.iter().filter(|t| tb.contains(t)).count();
    ((200 * common) / (ta.len() + tb.len())) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epsg_forms() {
        assert_eq!(CrsDefinition::parse("4326").unwrap(), CrsDefinition::Epsg(4326));
        assert_eq!(CrsDefinition::parse("EPSG:3857").unwrap(), CrsDefinition::Epsg(3857));
        assert_eq!(CrsDefinition::parse("epsg:2154").unwrap(), CrsDefinition::Epsg(2154));
    }

    #[test]
    fn test_parse_wkt_and_proj_forms() {
        let wkt = r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#;
        assert!(matches!(CrsDefinition::parse(wkt).unwrap(), CrsDefinition::Wkt(_)));

        let proj = "+proj=longlat +datum=WGS84 +no_defs";
        assert!(matches!(CrsDefinition::parse(proj).unwrap(), CrsDefinition::ProjString(_)));

        let json = r#"{"name": "WGS 84", "id": {"authority": "EPSG", "code": 4326}}"#;
        assert!(matches!(CrsDefinition::parse(json).unwrap(), CrsDefinition::ProjJson(_)));
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(CrsDefinition::parse("not a crs").is_err());
        assert!(CrsDefinition::parse("").is_err());
    }

    #[test]
    fn test_resolve_registry_code() {
        let mut resolver = CrsResolver::new();
        let crs = resolver.resolve(&CrsDefinition::Epsg(4326)).unwrap();
        assert_eq!(crs.code, 4326);
        assert_eq!(crs.name, "WGS 84");
    }

    #[test]
    fn test_resolve_wkt_with_authority() {
        let mut resolver = CrsResolver::new();
        let wkt = r#"PROJCS["anything",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]]]],AUTHORITY["EPSG","3857"]]"#;
        let crs = resolver.resolve(&CrsDefinition::Wkt(wkt.to_string())).unwrap();
        // The last authority tag wins, not the nested spheroid's 7030
        assert_eq!(crs.code, 3857);
    }

    #[test]
    fn test_resolve_wkt_by_name_below_threshold() {
        let mut resolver = CrsResolver::new();
        // No authority tag and a name that only loosely matches anything
        let wkt = r#"PROJCS["Some Custom Grid",GEOGCS["Custom",DATUM["Custom_Datum",SPHEROID["sph",6378137,298.0]]]]"#;
        let result = resolver.resolve(&CrsDefinition::Wkt(wkt.to_string()));
        assert!(matches!(result, Err(GeoflowError::UnresolvedCrs { .. })));
    }

    #[test]
    fn test_resolve_wkt_by_exact_name() {
        let mut resolver = CrsResolver::new();
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]]"#;
        let crs = resolver.resolve(&CrsDefinition::Wkt(wkt.to_string())).unwrap();
        assert_eq!(crs.code, 4326, "exact name should match WGS 84");
    }

    #[test]
    fn test_resolve_proj_string_exact() {
        let mut resolver = CrsResolver::new();
        let crs = resolver
            .resolve(&CrsDefinition::ProjString(
                "+proj=longlat +datum=WGS84 +no_defs".to_string(),
            ))
            .unwrap();
        assert_eq!(crs.code, 4326);
    }

    #[test]
    fn test_resolve_proj_string_init_epsg() {
        let mut resolver = CrsResolver::new();
        let crs = resolver
            .resolve(&CrsDefinition::ProjString("+init=epsg:2154".to_string()))
            .unwrap();
        assert_eq!(crs.code, 2154);
    }

    #[test]
    fn test_resolve_proj_json_id() {
        let mut resolver = CrsResolver::new();
        let value = serde_json::json!({
            "type": "GeographicCRS",
            "name": "WGS 84",
            "id": {"authority": "EPSG", "code": 4326}
        });
        let crs = resolver.resolve(&CrsDefinition::ProjJson(value)).unwrap();
        assert_eq!(crs.code, 4326);
    }

    #[test]
    fn test_cache_lifecycle() {
        let mut resolver = CrsResolver::new();
        assert_eq!(resolver.cached_len(), 0);

        resolver.resolve(&CrsDefinition::Epsg(4326)).unwrap();
        resolver.resolve(&CrsDefinition::Epsg(4326)).unwrap();
        assert_eq!(resolver.cached_len(), 1);

        resolver.resolve(&CrsDefinition::Epsg(3857)).unwrap();
        assert_eq!(resolver.cached_len(), 2);

        resolver.clear_cache();
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_epsg_from_wkt_prefers_outermost_authority() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],AUTHORITY["EPSG","4326"]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(4326));
    }

    #[test]
    fn test_epsg_from_wkt2_id() {
        let wkt = r#"GEOGCRS["WGS 84",ID["EPSG",4326]]"#;
        assert_eq!(epsg_from_wkt(wkt), Some(4326));
    }

    #[test]
    fn test_name_similarity() {
        assert_eq!(name_similarity("WGS 84", "WGS 84"), 100);
        assert!(name_similarity("WGS 84", "WGS 84 / UTM zone 33N") < 70);
        assert_eq!(name_similarity("foo", "bar"), 0);
    }
}
