use crate::error::{SfResult, StabForgeError};
use serde::{Deserialize, Serialize};

/// Dense row-major matrix over GF(2).
///
/// Serialized as a list of rows so it round-trips through the JSON contract
/// (`[[1,0,1],[0,1,1]]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct BinaryMatrix {
    rows: usize,
    cols: usize,
    bits: Vec<u8>,
}

impl BinaryMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![0; rows * cols],
        }
    }

    pub fn from_rows(rows: Vec<Vec<u8>>) -> SfResult<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        let mut bits = Vec::with_capacity(rows.len() * cols);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(StabForgeError::invalid(
                    format!("matrix row {}", i),
                    format!("{} columns", cols),
                    row.len(),
                ));
            }
            for &b in row {
                if b > 1 {
                    return Err(StabForgeError::invalid(
                        format!("matrix row {}", i),
                        "binary entries (0 or 1)",
                        b,
                    ));
                }
                bits.push(b);
            }
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            bits,
        })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline(always)]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline(always)]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline(always)]
    pub fn get(&self, r: usize, c: usize) -> u8 {
        self.bits[r * self.cols + c]
    }

    #[inline(always)]
    pub fn set(&mut self, r: usize, c: usize, bit: u8) {
        self.bits[r * self.cols + c] = bit & 1;
    }

    #[inline(always)]
    pub fn flip(&mut self, r: usize, c: usize) {
        self.bits[r * self.cols + c] ^= 1;
    }

    pub fn row(&self, r: usize) -> &[u8] {
        &self.bits[r * self.cols..(r + 1) * self.cols]
    }

    /// Mod-2 inner product of row `a` of `self` with row `b` of `other`.
    #[inline(always)]
    pub fn row_dot(&self, a: usize, other: &BinaryMatrix, b: usize) -> u8 {
        self.row(a)
            .iter()
            .zip(other.row(b))
            .fold(0u8, |acc, (&x, &y)| acc ^ (x & y))
    }

    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }
}

impl TryFrom<Vec<Vec<u8>>> for BinaryMatrix {
    type Error = StabForgeError;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<BinaryMatrix> for Vec<Vec<u8>> {
    fn from(m: BinaryMatrix) -> Self {
        m.to_rows()
    }
}

/// GF(2) row rank by Gaussian elimination. Rows are copied; the input is untouched.
pub fn gf2_rank(rows: &[Vec<u8>]) -> usize {
    let mut work: Vec<Vec<u8>> = rows.to_vec();
    let width = work.first().map_or(0, |r| r.len());
    let mut rank = 0;

    for col in 0..width {
        let Some(pivot) = (rank..work.len()).find(|&r| work[r][col] == 1) else {
            continue;
        };
        work.swap(rank, pivot);
        for r in 0..work.len() {
            if r != rank && work[r][col] == 1 {
                for c in col..width {
                    work[r][c] ^= work[rank][c];
                }
            }
        }
        rank += 1;
        if rank == work.len() {
            break;
        }
    }
    rank
}
