use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::types::{AssetTrait, BoostSet};

/// Derive the boost set from an asset's traits.
///
/// Only the exact trait types `Vision`, `Defense`, `Shooting` and `Finish` count;
/// every other trait is ignored. A recognized trait whose value is not an integer
/// is an error.
pub fn boosts_from_traits(traits: &[AssetTrait]) -> Result<BoostSet> {
    let mut boosts = BoostSet::default();

    for item in traits {
        let slot = match item.trait_type.as_str() {
            "Vision" => &mut boosts.vision,
            "Defense" => &mut boosts.defense,
            "Shooting" => &mut boosts.shooting,
            "Finish" => &mut boosts.finish,
            _ => continue,
        };
        let value = trait_value_as_int(&item.value)
            .with_context(|| format!("trait {:?} has a non-integer value", item.trait_type))?;
        *slot = Some(value);
    }

    boosts.cumulative = [boosts.vision, boosts.defense, boosts.shooting, boosts.finish]
        .into_iter()
        .flatten()
        .sum();
    Ok(boosts)
}

fn trait_value_as_int(value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                _ => bail!("{n} is not an integer"),
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .with_context(|| format!("{s:?} is not an integer")),
        other => bail!("unexpected trait value {other}"),
    }
}
