use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Longest symbol accepted into the universe. Exchange tickers top out well
/// below this; anything longer is almost certainly a data-entry mistake.
const MAX_SYMBOL_LEN: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    pub symbol: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SymbolsFile {
    pub symbols: Vec<SymbolConfig>,
}

/// Load and validate the symbol universe from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_symbols(path: &Path) -> Result<SymbolsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SymbolsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let symbols_file: SymbolsFile = serde_yaml::from_str(&content)?;

    validate_symbols(&symbols_file)?;

    Ok(symbols_file)
}

/// Checks every symbol for ticker-shaped content and rejects duplicates.
///
/// A valid symbol starts with an uppercase letter and contains only uppercase
/// letters, digits, `.` and `-` (class shares like `BRK.B`, hyphenated listings
/// like `BF-B`).
fn validate_symbols(file: &SymbolsFile) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in &file.symbols {
        let symbol = entry.symbol.as_str();

        if symbol.is_empty() {
            return Err(ConfigError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: "symbol must not be empty".to_string(),
            });
        }

        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(ConfigError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: format!("symbol exceeds {MAX_SYMBOL_LEN} characters"),
            });
        }

        if !symbol.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: "symbol must start with an uppercase letter".to_string(),
            });
        }

        if let Some(bad) = symbol
            .chars()
            .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '.' || *c == '-'))
        {
            return Err(ConfigError::InvalidSymbol {
                symbol: symbol.to_string(),
                reason: format!("character '{bad}' is not allowed"),
            });
        }

        if !seen.insert(symbol.to_string()) {
            return Err(ConfigError::DuplicateSymbol(symbol.to_string()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_of(symbols: &[&str]) -> SymbolsFile {
        SymbolsFile {
            symbols: symbols
                .iter()
                .map(|s| SymbolConfig {
                    symbol: (*s).to_string(),
                    note: None,
                })
                .collect(),
        }
    }

    #[test]
    fn accepts_plain_and_dotted_symbols() {
        let file = file_of(&["AAPL", "BRK.B", "BF-B", "QQQ"]);
        assert!(validate_symbols(&file).is_ok());
    }

    #[test]
    fn rejects_lowercase_symbol() {
        let file = file_of(&["aapl"]);
        assert!(matches!(
            validate_symbols(&file),
            Err(ConfigError::InvalidSymbol { ref symbol, .. }) if symbol == "aapl"
        ));
    }

    #[test]
    fn rejects_empty_symbol() {
        let file = file_of(&[""]);
        assert!(matches!(
            validate_symbols(&file),
            Err(ConfigError::InvalidSymbol { .. })
        ));
    }

    #[test]
    fn rejects_overlong_symbol() {
        let file = file_of(&["ABCDEFGHIJKLM"]);
        assert!(matches!(
            validate_symbols(&file),
            Err(ConfigError::InvalidSymbol { ref reason, .. }) if reason.contains("exceeds")
        ));
    }

    #[test]
    fn rejects_slash_class_notation() {
        // Some vendors print class shares as BRK/B; the universe uses dots.
        let file = file_of(&["BRK/B"]);
        assert!(matches!(
            validate_symbols(&file),
            Err(ConfigError::InvalidSymbol { ref reason, .. }) if reason.contains('/')
        ));
    }

    #[test]
    fn rejects_duplicate_symbols() {
        let file = file_of(&["AAPL", "MSFT", "AAPL"]);
        assert!(matches!(
            validate_symbols(&file),
            Err(ConfigError::DuplicateSymbol(ref s)) if s == "AAPL"
        ));
    }

    #[test]
    fn parses_yaml_shape() {
        let parsed: SymbolsFile = serde_yaml::from_str(
            "symbols:\n  - symbol: AAPL\n    note: Apple\n  - symbol: SPY\n",
        )
        .expect("parse symbols yaml");
        assert_eq!(parsed.symbols.len(), 2);
        assert_eq!(parsed.symbols[0].symbol, "AAPL");
        assert_eq!(parsed.symbols[0].note.as_deref(), Some("Apple"));
        assert!(parsed.symbols[1].note.is_none());
    }

    #[test]
    fn empty_universe_is_valid() {
        let file = file_of(&[]);
        assert!(validate_symbols(&file).is_ok());
    }
}
