use std::error::Error;

use ::duckdb::vtab::arrow::WritableVector;
use ::duckdb::{
    Result,
    core::{DataChunkHandle, LogicalTypeHandle, LogicalTypeId},
    vscalar::{ScalarFunctionSignature, VScalar},
};

use super::assemble::{assemble, feature_names};
use super::config::ExtractionConfig;
use super::duckdb_impl::scalar::{
    VarcharOutput, invoke_constant_varchar, invoke_unary_varchar_to_varchar,
};
use super::error::AssemblyError;
use super::log;
use super::replay::parse_game;

/// Features of one raw game blob as a JSON object, `None` when the game
/// cannot be parsed or replayed.
pub fn game_features_json(text: &str) -> Result<Option<String>, AssemblyError> {
    let game = match parse_game(text) {
        Ok(game) => game,
        Err(e) => {
            log::warn(format!("chess_game_features: dropping game: {e}"));
            return Ok(None);
        }
    };
    let record = assemble(&game, &ExtractionConfig::default())?;
    Ok(Some(record.to_json().to_string()))
}

pub fn feature_names_json() -> String {
    serde_json::Value::from(feature_names()).to_string()
}

pub struct ChessGameFeaturesScalar;

impl VScalar for ChessGameFeaturesScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_unary_varchar_to_varchar(input, output, |pgn| {
            match game_features_json(pgn) {
                Ok(Some(json)) => Ok(VarcharOutput::Value(json)),
                Ok(None) => Ok(VarcharOutput::Null),
                Err(e) => {
                    log::error(format!("chess_game_features: {e}"));
                    Err(e.into())
                }
            }
        })
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![ScalarFunctionSignature::exact(
            vec![LogicalTypeHandle::from(LogicalTypeId::Varchar)],
            LogicalTypeHandle::from(LogicalTypeId::Varchar),
        )]
    }
}

pub struct ChessFeatureNamesScalar;

impl VScalar for ChessFeatureNamesScalar {
    type State = ();

    unsafe fn invoke(
        _state: &Self::State,
        input: &mut DataChunkHandle,
        output: &mut dyn WritableVector,
    ) -> Result<(), Box<dyn Error>> {
        invoke_constant_varchar(input, output, &feature_names_json())
    }

    fn signatures() -> Vec<ScalarFunctionSignature> {
        vec![ScalarFunctionSignature::exact(
            vec![],
            LogicalTypeHandle::from(LogicalTypeId::Varchar),
        )]
    }
}
