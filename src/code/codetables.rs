use super::{BinaryMatrix, StabilizerCode};
use crate::error::{SfResult, StabForgeError};
use std::fs;
use std::path::Path;

/// Parses a stabilizer matrix in the codetables.de layout.
///
/// One generator per line, X bits then `|` then Z bits, optionally wrapped in
/// brackets: `[1 0 1 0 1|0 0 1 1 0]`. Lines without a `|` (headers, blank
/// lines) are skipped. Bits may be space separated or packed.
pub fn parse_stabilizer_matrix(text: &str) -> SfResult<(BinaryMatrix, BinaryMatrix)> {
    let mut x_rows = Vec::new();
    let mut z_rows = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if !line.contains('|') {
            continue;
        }
        let inner = line.trim_start_matches('[').trim_end_matches(']');
        let Some((x_str, z_str)) = inner.split_once('|') else {
            continue;
        };
        x_rows.push(parse_bits(x_str, line_no + 1)?);
        z_rows.push(parse_bits(z_str, line_no + 1)?);
    }

    if x_rows.is_empty() {
        return Err(StabForgeError::invalid(
            "stabilizer matrix",
            "at least one 'X bits | Z bits' row",
            "no rows",
        ));
    }

    Ok((
        BinaryMatrix::from_rows(x_rows)?,
        BinaryMatrix::from_rows(z_rows)?,
    ))
}

fn parse_bits(s: &str, line_no: usize) -> SfResult<Vec<u8>> {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '0' => Ok(0),
            '1' => Ok(1),
            other => Err(StabForgeError::invalid(
                format!("stabilizer matrix line {}", line_no),
                "bits 0/1",
                format!("'{}'", other),
            )),
        })
        .collect()
}

impl StabilizerCode {
    /// Builds a code from matrix text; `n` is the column count and `k = n - rows`.
    pub fn from_matrix_text(text: &str, d: usize) -> SfResult<Self> {
        let (x_part, z_part) = parse_stabilizer_matrix(text)?;
        if x_part.cols() != z_part.cols() {
            return Err(StabForgeError::invalid(
                "z_part",
                format!("{} columns like x_part", x_part.cols()),
                z_part.cols(),
            ));
        }
        let n = x_part.cols();
        let k = n.checked_sub(x_part.rows()).ok_or_else(|| {
            StabForgeError::invalid(
                "stabilizer matrix",
                format!("at most {} rows", n),
                x_part.rows(),
            )
        })?;
        Self::new(n, k, d, x_part, z_part)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, d: usize) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_matrix_text(&content, d)
    }
}
