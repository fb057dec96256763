//! Dissolve command: merge features sharing a key column

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use geoflow_core::config::LayeredConfig;
use geoflow_core::formats;
use geoflow_geo::dissolve::{dissolve, Aggregate};

use crate::cli::DissolveArgs;
use crate::commands::load_validated;
use crate::output::OutputWriter;

pub fn execute(args: DissolveArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let aggregations = match &args.agg {
        Some(spec) => parse_aggregations(spec)?,
        None => HashMap::new(),
    };

    let collection = load_validated(&args.input, config)?;
    let result = dissolve(&collection, &args.by, &aggregations)?;

    formats::save(&result, &args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;

    output.success(format!(
        "Dissolved {} features into {} groups by '{}' into {}",
        collection.len(),
        result.len(),
        args.by,
        args.output.display()
    ));
    Ok(())
}

/// Parse an aggregation spec of the form "col=sum,other=list"
fn parse_aggregations(spec: &str) -> Result<HashMap<String, Aggregate>> {
    let mut aggregations = HashMap::new();
    for pair in spec.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((column, function)) = pair.split_once('=') else {
            bail!("Invalid aggregation '{}': expected column=function", pair);
        };
        aggregations.insert(column.trim().to_string(), function.trim().parse::<Aggregate>()?);
    }
    Ok(aggregations)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregations() {
        let aggregations = parse_aggregations("pop=sum, name=first").unwrap();
        assert_eq!(aggregations["pop"], Aggregate::Sum);
        assert_eq!(aggregations["name"], Aggregate::First);
    }

    #[test]
    fn test_parse_rejects_bad_spec() {
        assert!(parse_aggregations("pop").is_err());
        assert!(parse_aggregations("pop=median").is_err());
    }
}
