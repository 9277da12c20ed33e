//! Merges every aggregator's output into one flat record per game.

use std::collections::HashSet;

use serde_json::{Map, Number, Value};

use super::config::ExtractionConfig;
use super::error::AssemblyError;
use super::features::{AGGREGATORS, GameView};
use super::types::{GameHeader, GameRecord};

/// One flat output row: identifying fields plus every catalog feature in
/// column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub header: GameHeader,
    pub values: Vec<(&'static str, f64)>,
}

impl FeatureRecord {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| *value)
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("game_id".into(), Value::String(self.header.game_id.clone()));
        map.insert("white".into(), Value::String(self.header.white.clone()));
        map.insert("black".into(), Value::String(self.header.black.clone()));
        map.insert("eco".into(), Value::String(self.header.eco.clone()));
        map.insert(
            "time_control".into(),
            Value::String(self.header.time_control.clone()),
        );
        for (key, value) in &self.values {
            let number = Number::from_f64(*value).map_or(Value::Null, Value::Number);
            map.insert((*key).into(), number);
        }
        Value::Object(map)
    }
}

/// Catalog keys in output column order.
pub fn feature_names() -> Vec<&'static str> {
    AGGREGATORS
        .iter()
        .flat_map(|aggregator| aggregator.keys.iter().copied())
        .collect()
}

/// Run the registry against one replayed game.
///
/// Fails if an aggregator emits a key twice, emits a key it never declared,
/// or leaves a declared key out.
pub fn assemble(
    game: &GameRecord,
    config: &ExtractionConfig,
) -> Result<FeatureRecord, AssemblyError> {
    let view = GameView::new(game, config);
    let mut seen: HashSet<&'static str> = HashSet::new();
    let mut values = Vec::with_capacity(AGGREGATORS.iter().map(|a| a.keys.len()).sum());

    for aggregator in AGGREGATORS {
        let emitted = (aggregator.compute)(&view);
        for &(key, _) in &emitted {
            if !aggregator.keys.contains(&key) {
                return Err(AssemblyError::UndeclaredKey {
                    aggregator: aggregator.name,
                    key,
                });
            }
            if !seen.insert(key) {
                return Err(AssemblyError::DuplicateKey(key));
            }
        }
        for &key in aggregator.keys {
            let value = emitted
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| *value)
                .ok_or(AssemblyError::MissingKey {
                    aggregator: aggregator.name,
                    key,
                })?;
            values.push((key, value));
        }
    }

    Ok(FeatureRecord {
        header: game.header.clone(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chess::fixtures::{BLITZ, BULLET, SAMPLE, game};

    #[test]
    fn test_every_catalog_key_is_emitted() {
        let record = assemble(&game(SAMPLE), &ExtractionConfig::default()).unwrap();
        let names = feature_names();
        assert_eq!(record.values.len(), names.len());
        for (name, (key, _)) in names.iter().zip(&record.values) {
            assert_eq!(name, key);
        }
        assert_eq!(record.header.game_id, "5WDTKQIn");
        assert_eq!(record.get("g_plies"), Some(19.0));
        assert_eq!(record.get("no_such_key"), None);
    }

    #[test]
    fn test_catalog_has_stable_anchor_keys() {
        let names = feature_names();
        for key in [
            "wp_doubled",
            "wc_earliness",
            "wn_outpost",
            "wt_num_trades",
            "we_available",
        ] {
            assert!(names.contains(&key), "{key} missing");
        }
        assert_eq!(names.first(), Some(&"g_plies"));
    }

    #[test]
    fn test_long_games_assemble_without_nan() {
        for text in [BULLET, BLITZ] {
            let record = assemble(&game(text), &ExtractionConfig::default()).unwrap();
            for (key, value) in &record.values {
                assert!(value.is_finite(), "{key} = {value}");
            }
        }
    }

    #[test]
    fn test_json_carries_identifiers_and_features() {
        let record = assemble(&game(SAMPLE), &ExtractionConfig::default()).unwrap();
        let json = record.to_json();
        assert_eq!(json["white"], "amacalo");
        assert_eq!(json["eco"], "D20");
        assert_eq!(json["g_plies"], 19.0);
        assert_eq!(json.as_object().unwrap().len(), feature_names().len() + 5);
    }
}
