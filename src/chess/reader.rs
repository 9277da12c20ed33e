use super::{
    assemble::{FeatureRecord, assemble, feature_names},
    config::{CompressionMode, ExtractionConfig, parse_flag, parse_plies},
    duckdb_impl::bind_info_ffi::named_parameter_text,
    error::{AssemblyError, ParseError},
    log,
    replay::replay,
    visitor::{ParsedGame, PgnInput, PgnReaderState, SharedState},
};
use duckdb::{
    core::{DataChunkHandle, Inserter, LogicalTypeHandle, LogicalTypeId},
    vtab::{BindInfo, InitInfo, TableFunctionInfo, VTab},
};
use std::borrow::Cow;
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use zstd::stream::read::Decoder as ZstdDecoder;

#[repr(C)]
pub struct ReadPgnFeaturesBindData {
    paths: Vec<PathBuf>,
    config: ExtractionConfig,
    feature_columns: usize,
}

#[repr(C)]
pub struct ReadPgnFeaturesInitData {
    state: Mutex<SharedState>,
}

pub struct ReadPgnFeaturesVTab;

const PATH_PATTERN_PARAM_INDEX: u64 = 0;
const ROWS_PER_CHUNK: usize = 2048;

/// Leading VARCHAR columns; one DOUBLE column per feature follows.
const IDENTITY_COLUMNS: [&str; 5] = ["game_id", "white", "black", "eco", "time_control"];

fn resolve_config(bind: &BindInfo) -> Result<ExtractionConfig, Box<dyn std::error::Error>> {
    let compression = named_parameter_text(bind, "compression")?;
    let require_middle_game = named_parameter_text(bind, "require_middle_game")?;
    let trade_lookahead = named_parameter_text(bind, "trade_lookahead")?;

    let mut config = ExtractionConfig {
        compression: CompressionMode::from_param(compression.as_deref())?,
        require_middle_game: parse_flag("require_middle_game", require_middle_game.as_deref())?,
        ..ExtractionConfig::default()
    };
    if let Some(plies) = parse_plies("trade_lookahead", trade_lookahead.as_deref())? {
        config = config.with_trade_lookahead(plies);
    }
    Ok(config)
}

fn expand_paths(pattern: &str) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    if pattern.contains('*') || pattern.contains('?') {
        let mut paths: Vec<PathBuf> = glob::glob(pattern)?
            .filter_map(|entry| entry.ok())
            .collect();
        paths.sort();
        Ok(paths)
    } else {
        Ok(vec![PathBuf::from(pattern)])
    }
}

fn open_input_stream(path: &Path, compression: CompressionMode) -> Result<PgnInput, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

    match compression {
        CompressionMode::Plain => Ok(Box::new(file)),
        CompressionMode::Zstd => ZstdDecoder::new(file)
            .map(|decoder| Box::new(decoder) as PgnInput)
            .map_err(|e| {
                format!(
                    "Failed to initialize zstd decoder for '{}': {}",
                    path.display(),
                    e
                )
            }),
    }
}

fn sanitize_for_cstring(value: &str) -> Cow<'_, str> {
    if value.contains('\0') {
        Cow::Owned(value.replace('\0', " "))
    } else {
        Cow::Borrowed(value)
    }
}

/// What one parsed game turned into.
#[derive(Debug)]
enum Extracted {
    Record(FeatureRecord),
    NoMiddleGame,
    Failed(ParseError),
}

fn extract_game(
    parsed: ParsedGame,
    config: &ExtractionConfig,
) -> Result<Extracted, AssemblyError> {
    let header = match parsed.header {
        Ok(header) => header,
        Err(e) => return Ok(Extracted::Failed(e)),
    };
    if parsed.sans.is_empty() {
        return Ok(Extracted::Failed(ParseError::MissingMovetext));
    }
    let game = match replay(header, &parsed.sans) {
        Ok(game) => game,
        Err(e) => return Ok(Extracted::Failed(e)),
    };
    if config.require_middle_game && game.phases.middle_game.is_none() {
        return Ok(Extracted::NoMiddleGame);
    }
    assemble(&game, config).map(Extracted::Record)
}

enum ReadNextGameOutcome {
    GameReady(FeatureRecord),
    GameDropped,
    ReaderFinished,
}

struct ChunkWriter<'a> {
    output: &'a mut DataChunkHandle,
    row_count: usize,
}

impl<'a> ChunkWriter<'a> {
    fn new(output: &'a mut DataChunkHandle) -> Self {
        Self {
            output,
            row_count: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.row_count >= ROWS_PER_CHUNK
    }

    fn write_row(&mut self, record: &FeatureRecord) -> Result<(), Box<dyn std::error::Error>> {
        let row_idx = self.row_count;
        let header = &record.header;
        let identity = [
            &header.game_id,
            &header.white,
            &header.black,
            &header.eco,
            &header.time_control,
        ];
        for (column, value) in identity.into_iter().enumerate() {
            self.write_varchar(column, row_idx, value)?;
        }

        for (offset, (_, value)) in record.values.iter().enumerate() {
            let mut vector = self.output.flat_vector(IDENTITY_COLUMNS.len() + offset);
            vector.as_mut_slice::<f64>()[row_idx] = *value;
        }

        self.row_count += 1;
        Ok(())
    }

    fn write_varchar(
        &mut self,
        column: usize,
        row_idx: usize,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let vector = self.output.flat_vector(column);
        vector.insert(row_idx, CString::new(sanitize_for_cstring(value).as_ref())?);
        Ok(())
    }

    fn set_output_len(&mut self) {
        self.output.set_len(self.row_count);
    }
}

fn acquire_reader(
    init_data: &ReadPgnFeaturesInitData,
    bind_data: &ReadPgnFeaturesBindData,
) -> Result<Option<PgnReaderState>, Box<dyn std::error::Error>> {
    loop {
        let path_idx = {
            let mut state = init_data
                .state
                .lock()
                .map_err(|_| "read_pgn_features reader pool lock poisoned")?;

            if let Some(reader) = state.available_readers.pop() {
                return Ok(Some(reader));
            }

            if state.next_path_idx < bind_data.paths.len() {
                let path_idx = state.next_path_idx;
                state.next_path_idx += 1;
                path_idx
            } else {
                return Ok(None);
            }
        };

        let path = &bind_data.paths[path_idx];
        match open_input_stream(path, bind_data.config.compression) {
            Ok(input_stream) => {
                log::debug(format!("Opened '{}'", path.display()));
                return Ok(Some(PgnReaderState::new(input_stream, path_idx)));
            }
            Err(err_msg) => {
                if bind_data.paths.len() == 1 {
                    return Err(err_msg.into());
                }

                log::warn(&err_msg);
            }
        }
    }
}

fn read_next_game(
    reader: &mut PgnReaderState,
    source_path: &Path,
    config: &ExtractionConfig,
) -> Result<ReadNextGameOutcome, AssemblyError> {
    let game_index = reader.next_game_index;

    match reader.pgn_reader.read_game(&mut reader.visitor) {
        Ok(Some(())) => {
            reader.next_game_index += 1;
            let Some(parsed) = reader.visitor.current_game.take() else {
                return Ok(ReadNextGameOutcome::ReaderFinished);
            };
            match extract_game(parsed, config)? {
                Extracted::Record(record) => {
                    reader.games_emitted += 1;
                    Ok(ReadNextGameOutcome::GameReady(record))
                }
                Extracted::NoMiddleGame => {
                    reader.games_dropped += 1;
                    log::debug(format!(
                        "Skipping game without middle game: file='{}'; game_index={}",
                        source_path.display(),
                        game_index
                    ));
                    Ok(ReadNextGameOutcome::GameDropped)
                }
                Extracted::Failed(error) => {
                    reader.games_dropped += 1;
                    log::warn(format!(
                        "Dropping game: file='{}'; game_index={}; error={}",
                        source_path.display(),
                        game_index,
                        error
                    ));
                    Ok(ReadNextGameOutcome::GameDropped)
                }
            }
        }
        Ok(None) => Ok(ReadNextGameOutcome::ReaderFinished),
        Err(error) => {
            log::warn(format!(
                "Stream error, abandoning file: file='{}'; game_index={}; error={}",
                source_path.display(),
                game_index,
                error
            ));
            Ok(ReadNextGameOutcome::ReaderFinished)
        }
    }
}

fn finalize_chunk(
    init_data: &ReadPgnFeaturesInitData,
    current_reader_state: Option<PgnReaderState>,
    chunk_writer: &mut ChunkWriter<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(reader) = current_reader_state {
        let mut state = init_data
            .state
            .lock()
            .map_err(|_| "read_pgn_features reader pool lock poisoned")?;
        state.available_readers.push(reader);
    }

    chunk_writer.set_output_len();
    Ok(())
}

impl VTab for ReadPgnFeaturesVTab {
    type InitData = ReadPgnFeaturesInitData;
    type BindData = ReadPgnFeaturesBindData;

    fn bind(bind: &BindInfo) -> Result<Self::BindData, Box<dyn std::error::Error>> {
        let pattern = bind.get_parameter(PATH_PATTERN_PARAM_INDEX).to_string();
        let config = resolve_config(bind)?;
        let paths = expand_paths(&pattern)?;

        for name in IDENTITY_COLUMNS {
            bind.add_result_column(name, LogicalTypeHandle::from(LogicalTypeId::Varchar));
        }
        let names = feature_names();
        for name in &names {
            bind.add_result_column(name, LogicalTypeHandle::from(LogicalTypeId::Double));
        }

        log::info(format!(
            "read_pgn_features: {} file(s), {} feature columns, trade_lookahead={}",
            paths.len(),
            names.len(),
            config.trade_lookahead
        ));

        Ok(ReadPgnFeaturesBindData {
            paths,
            config,
            feature_columns: names.len(),
        })
    }

    fn init(_: &InitInfo) -> Result<Self::InitData, Box<dyn std::error::Error>> {
        Ok(ReadPgnFeaturesInitData {
            state: Mutex::new(SharedState {
                next_path_idx: 0,
                available_readers: Vec::new(),
            }),
        })
    }

    fn func(
        func: &TableFunctionInfo<Self>,
        output: &mut DataChunkHandle,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let init_data = func.get_init_data();
        let bind_data = func.get_bind_data();
        debug_assert_eq!(bind_data.feature_columns, feature_names().len());
        let mut chunk_writer = ChunkWriter::new(output);
        let mut current_reader_state: Option<PgnReaderState> = None;

        while !chunk_writer.is_full() {
            if current_reader_state.is_none() {
                current_reader_state = acquire_reader(init_data, bind_data)?;
                if current_reader_state.is_none() {
                    break;
                }
            }

            if let Some(mut reader) = current_reader_state.take() {
                let source_path = &bind_data.paths[reader.path_idx];
                let outcome = read_next_game(&mut reader, source_path, &bind_data.config)
                    .inspect_err(|e| log::error(format!("read_pgn_features: {e}")))?;
                match outcome {
                    ReadNextGameOutcome::GameReady(record) => {
                        chunk_writer.write_row(&record)?;
                        current_reader_state = Some(reader);
                    }
                    ReadNextGameOutcome::GameDropped => {
                        current_reader_state = Some(reader);
                    }
                    ReadNextGameOutcome::ReaderFinished => {
                        log::info(format!(
                            "Finished '{}': {} game(s) emitted, {} dropped",
                            source_path.display(),
                            reader.games_emitted,
                            reader.games_dropped
                        ));
                    }
                }
            }
        }

        finalize_chunk(init_data, current_reader_state, &mut chunk_writer)
    }

    fn parameters() -> Option<Vec<LogicalTypeHandle>> {
        Some(vec![
            LogicalTypeHandle::from(LogicalTypeId::Varchar), // path pattern (required)
        ])
    }

    fn named_parameters() -> Option<Vec<(String, LogicalTypeHandle)>> {
        Some(
            ["compression", "require_middle_game", "trade_lookahead"]
                .into_iter()
                .map(|name| {
                    (
                        name.to_string(),
                        LogicalTypeHandle::from(LogicalTypeId::Varchar),
                    )
                })
                .collect(),
        )
    }
}
