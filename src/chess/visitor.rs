use pgn_reader::{Nag, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use smallvec::SmallVec;
use std::io::{self, Read};
use std::mem;
use std::ops::ControlFlow;

use super::error::{ErrorAccumulator, ParseError};
use super::types::GameHeader;

pub type MoveList = SmallVec<[SanPlus; 128]>;

#[macro_export]
macro_rules! pgn_visitor_skip_variations {
    () => {
        fn nag(&mut self, _: &mut Self::Movetext, _: Nag) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn comment(
            &mut self,
            _: &mut Self::Movetext,
            _: RawComment<'_>,
        ) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn partial_comment(
            &mut self,
            _: &mut Self::Movetext,
            _: RawComment<'_>,
        ) -> ControlFlow<Self::Output> {
            ControlFlow::Continue(())
        }

        fn begin_variation(&mut self, _: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
            ControlFlow::Continue(Skip(true))
        }
    };
}

/// Header tags the feature pipeline cares about.
#[derive(Default)]
struct HeaderFields {
    site: String,
    white: String,
    black: String,
    eco: String,
    time_control: String,
}

impl HeaderFields {
    fn set_known_tag(&mut self, key: &[u8], value: RawTag<'_>) {
        let slot: &mut String = match key {
            b"Site" => &mut self.site,
            b"White" => &mut self.white,
            b"Black" => &mut self.black,
            b"ECO" => &mut self.eco,
            b"TimeControl" => &mut self.time_control,
            _ => return,
        };

        if !slot.is_empty() {
            return;
        }
        *slot = String::from_utf8_lossy(value.as_bytes()).into_owned();
    }

    fn into_header(self) -> Result<GameHeader, ParseError> {
        let mut missing = ErrorAccumulator::default();
        for (name, value) in [
            ("White", &self.white),
            ("Black", &self.black),
            ("ECO", &self.eco),
            ("TimeControl", &self.time_control),
        ] {
            if value.is_empty() {
                missing.push(name);
            }
        }
        if let Some(tags) = missing.take() {
            return Err(ParseError::MissingHeader(tags));
        }

        Ok(GameHeader {
            game_id: super::header::game_id_from_site(&self.site),
            white: self.white,
            black: self.black,
            eco: self.eco,
            time_control: self.time_control,
        })
    }
}

/// Mainline SAN tokens of one game, with its tags when the input carried any.
pub struct ParsedGame {
    pub header: Result<GameHeader, ParseError>,
    pub sans: MoveList,
}

/// Streaming visitor collecting mainline moves and the known header tags.
/// Comments, NAGs and variations are skipped.
#[derive(Default)]
pub struct GameVisitor {
    headers: HeaderFields,
    sans: MoveList,
    pub current_game: Option<ParsedGame>,
}

impl GameVisitor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Visitor for GameVisitor {
    type Tags = ();
    type Movetext = ();
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        self.headers = HeaderFields::default();
        self.sans.clear();
        self.current_game = None;
        ControlFlow::Continue(())
    }

    fn tag(
        &mut self,
        _: &mut Self::Tags,
        key: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        self.headers.set_known_tag(key, value);
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(())
    }

    fn san(&mut self, _: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        self.sans.push(san_plus);
        ControlFlow::Continue(())
    }

    pgn_visitor_skip_variations!();

    fn end_game(&mut self, _: Self::Movetext) -> Self::Output {
        let headers = mem::take(&mut self.headers);
        self.current_game = Some(ParsedGame {
            header: headers.into_header(),
            sans: mem::take(&mut self.sans),
        });
    }
}

/// Tokenize a movetext section (move numbers, comments and the result token
/// are dropped) into mainline SAN moves.
pub fn parse_movetext(movetext: &str) -> Result<MoveList, ParseError> {
    if movetext.trim().is_empty() {
        return Ok(MoveList::new());
    }

    let mut reader = Reader::new(io::Cursor::new(movetext.as_bytes()));
    let mut visitor = GameVisitor::new();

    match reader.read_game(&mut visitor) {
        Ok(Some(())) => visitor
            .current_game
            .map(|game| game.sans)
            .ok_or_else(|| ParseError::Movetext("no game produced".to_string())),
        Ok(None) => Err(ParseError::Movetext("empty input".to_string())),
        Err(e) => Err(ParseError::Movetext(e.to_string())),
    }
}

pub type PgnInput = Box<dyn Read + Send>;

/// One open PGN stream plus its per-file bookkeeping.
pub struct PgnReaderState {
    pub pgn_reader: Reader<PgnInput>,
    pub path_idx: usize,
    pub next_game_index: usize,
    pub games_emitted: usize,
    pub games_dropped: usize,
    pub visitor: GameVisitor,
}

impl PgnReaderState {
    pub fn new(input: PgnInput, path_idx: usize) -> Self {
        Self {
            pgn_reader: Reader::new(input),
            path_idx,
            next_game_index: 1,
            games_emitted: 0,
            games_dropped: 0,
            visitor: GameVisitor::new(),
        }
    }
}

pub struct SharedState {
    pub next_path_idx: usize,
    pub available_readers: Vec<PgnReaderState>,
}
