mod chess;

use chess::functions::{ChessFeatureNamesScalar, ChessGameFeaturesScalar};
use chess::reader::ReadPgnFeaturesVTab;
use duckdb::{Connection, Result};
use duckdb_ext_macros::duckdb_extension;
use std::error::Error;

#[duckdb_extension(name = "chess_features", api_version = "v1.0.0")]
pub unsafe fn extension_entrypoint(con: Connection) -> Result<(), Box<dyn Error>> {
    // Table functions
    con.register_table_function::<ReadPgnFeaturesVTab>("read_pgn_features")?;

    // Scalar functions
    con.register_scalar_function::<ChessGameFeaturesScalar>("chess_game_features")?;
    con.register_scalar_function::<ChessFeatureNamesScalar>("chess_feature_names")?;

    Ok(())
}
