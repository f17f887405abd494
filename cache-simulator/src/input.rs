//! Input data handling for cache simulation
//!
//! Parses operation scripts. Each non-blank line is one operation:
//!
//! ```text
//! op,key,value
//! # comments and blank lines are skipped
//! put,1,10
//! get,1
//! remove,1
//! ```
//!
//! The header line is optional. Scripts are streamed line by line so memory
//! stays proportional to the cache, not the script.

use crate::models::{Key, Op, Value};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for script parsing
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to open script {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read script: {0}")]
    Read(#[from] io::Error),

    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// Parse a single line into an operation
///
/// `line_num` is zero-based; errors report it one-based.
pub fn parse_line(line: &str, line_num: usize) -> Result<Option<Op>, ScriptError> {
    let line = line.trim();

    // Skip empty lines, comments, and header row
    if line.is_empty() || line.starts_with('#') || (line_num == 0 && line.starts_with("op,")) {
        return Ok(None);
    }

    let parse_err = |reason: String| ScriptError::Parse {
        line: line_num + 1,
        reason,
    };

    let mut parts = line.split(',').map(str::trim);
    let op = parts.next().unwrap_or_default();
    let key = parts
        .next()
        .ok_or_else(|| parse_err(format!("'{op}' is missing a key")))?;
    let key = key
        .parse::<Key>()
        .map_err(|e| parse_err(format!("invalid key '{key}': {e}")))?;

    let parsed = match op.to_ascii_lowercase().as_str() {
        "put" => {
            let value = parts
                .next()
                .ok_or_else(|| parse_err("put is missing a value".to_string()))?;
            let value = value
                .parse::<Value>()
                .map_err(|e| parse_err(format!("invalid value '{value}': {e}")))?;
            Op::Put { key, value }
        }
        "get" => Op::Get { key },
        "remove" | "del" => Op::Remove { key },
        other => return Err(parse_err(format!("unknown operation '{other}'"))),
    };

    if let Some(extra) = parts.next() {
        return Err(parse_err(format!("unexpected trailing field '{extra}'")));
    }
    Ok(Some(parsed))
}

/// Iterator that streams operations from a script without loading it into memory
pub struct ScriptReader<R> {
    reader: R,
    line_num: usize,
    line_buffer: String,
}

impl ScriptReader<BufReader<File>> {
    /// Open a script file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScriptError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::with_capacity(1024 * 1024, file)))
    }
}

impl<R: BufRead> ScriptReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_num: 0,
            line_buffer: String::with_capacity(64),
        }
    }
}

impl<R: BufRead> Iterator for ScriptReader<R> {
    type Item = Result<Op, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buffer.clear();
            match self.reader.read_line(&mut self.line_buffer) {
                Ok(0) => return None,
                Ok(_) => {
                    let line_num = self.line_num;
                    self.line_num += 1;
                    match parse_line(&self.line_buffer, line_num) {
                        Ok(Some(op)) => return Some(Ok(op)),
                        Ok(None) => continue,
                        Err(e) => return Some(Err(e)),
                    }
                }
                Err(e) => return Some(Err(ScriptError::Read(e))),
            }
        }
    }
}

/// Parse a whole script held in memory
pub fn parse_script(text: &str) -> Result<Vec<Op>, ScriptError> {
    ScriptReader::new(text.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ops() {
        let ops = parse_script("op,key,value\nput,1,10\n\n# note\nget, 1\nremove,1\n").unwrap();
        assert_eq!(
            ops,
            [
                Op::Put { key: 1, value: 10 },
                Op::Get { key: 1 },
                Op::Remove { key: 1 },
            ]
        );
    }

    #[test]
    fn test_negative_values_are_values() {
        let ops = parse_script("put,4,-1").unwrap();
        assert_eq!(ops, [Op::Put { key: 4, value: -1 }]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse_script("put,1,10\nget,x\n").unwrap_err();
        match err {
            ScriptError::Parse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("invalid key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rejects_malformed_lines() {
        for bad in ["put,1", "fetch,1", "get", "get,1,2", "put,1,ten", "get,-3"] {
            assert!(
                matches!(parse_line(bad, 3), Err(ScriptError::Parse { line: 4, .. })),
                "accepted '{bad}'"
            );
        }
    }

    #[test]
    fn test_header_only_skipped_on_first_line() {
        assert_eq!(parse_line("op,key,value", 0).unwrap(), None);
        assert!(parse_line("op,key,value", 5).is_err());
    }

    #[test]
    fn test_open_missing_file() {
        let err = ScriptReader::open("/nonexistent/script.csv").err().unwrap();
        assert!(matches!(err, ScriptError::Open { .. }));
    }
}
