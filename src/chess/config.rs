//! Extraction settings resolved once at bind time.

use std::error::Error;

/// Upper bound on how far ahead a recapture is searched.
pub const MAX_TRADE_LOOKAHEAD: usize = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum CompressionMode {
    #[default]
    Plain,
    Zstd,
}

impl CompressionMode {
    pub fn parse(raw: &str) -> Result<Self, Box<dyn Error>> {
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(
                "Invalid compression value ''. Supported values: 'zstd' or NULL/omitted."
                    .to_string()
                    .into(),
            );
        }

        if normalized.eq_ignore_ascii_case("zstd") {
            Ok(Self::Zstd)
        } else {
            Err(format!(
                "Invalid compression value '{}'. Supported values: 'zstd' or NULL/omitted.",
                normalized
            )
            .into())
        }
    }

    /// Named-parameter form: omitted, SQL NULL or the literal `null` mean plain.
    pub fn from_param(raw: Option<&str>) -> Result<Self, Box<dyn Error>> {
        match raw.map(str::trim) {
            None => Ok(Self::Plain),
            Some(value) if value.eq_ignore_ascii_case("null") => Ok(Self::Plain),
            Some(value) => Self::parse(value),
        }
    }
}

/// Parse a boolean named parameter passed as VARCHAR.
pub fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool, Box<dyn Error>> {
    let Some(value) = raw.map(str::trim) else {
        return Ok(false);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Ok(true),
        "false" | "f" | "0" | "no" | "null" | "" => Ok(false),
        other => Err(format!(
            "Invalid {} value '{}'. Supported values: true, false or NULL/omitted.",
            name, other
        )
        .into()),
    }
}

/// Parse a ply-count named parameter passed as VARCHAR.
pub fn parse_plies(name: &str, raw: Option<&str>) -> Result<Option<usize>, Box<dyn Error>> {
    match raw.map(str::trim) {
        None => Ok(None),
        Some(value) if value.is_empty() || value.eq_ignore_ascii_case("null") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid {} value '{}'. Expected a ply count.", name, value).into()),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ExtractionConfig {
    pub compression: CompressionMode,
    /// Drop games that never reach a middle game.
    pub require_middle_game: bool,
    /// Plies searched for the capture that completes a trade.
    pub trade_lookahead: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            compression: CompressionMode::Plain,
            require_middle_game: false,
            trade_lookahead: MAX_TRADE_LOOKAHEAD,
        }
    }
}

impl ExtractionConfig {
    pub fn with_trade_lookahead(mut self, plies: usize) -> Self {
        self.trade_lookahead = plies.clamp(1, MAX_TRADE_LOOKAHEAD);
        self
    }
}
