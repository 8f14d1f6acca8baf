pub mod codetables;
pub mod matrix;

pub use self::matrix::BinaryMatrix;

use crate::error::{SfResult, StabForgeError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `[[n, k, d]]` stabilizer code given by its X and Z parity-check parts.
///
/// Row `i` of `x_part` together with row `i` of `z_part` is one generator
/// `X^x Z^z` acting on `n` qubits. Both parts are `(n - k) × n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilizerCode {
    pub n: usize,
    pub k: usize,
    pub d: usize,
    pub x_part: BinaryMatrix,
    pub z_part: BinaryMatrix,
}

/// Two-qubit gates a one-ancilla-per-generator extraction circuit needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateCounts {
    pub cx: usize,
    pub cz: usize,
    pub cy: usize,
}

impl GateCounts {
    pub fn total(&self) -> usize {
        self.cx + self.cz + self.cy
    }
}

/// How well the generators see single-qubit Pauli errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionProfile {
    /// Qubits where a lone X error anticommutes with no generator.
    pub undetected_x: usize,
    pub undetected_y: usize,
    pub undetected_z: usize,
    /// Mean generator weight (non-identity positions per row).
    pub mean_row_weight: f64,
}

pub fn validate_params(n: usize, k: usize, d: usize) -> SfResult<()> {
    if k < 1 {
        return Err(StabForgeError::invalid("k", "k >= 1", k));
    }
    if k >= n {
        return Err(StabForgeError::invalid("k", format!("k < n (n = {})", n), k));
    }
    if d < 1 {
        return Err(StabForgeError::invalid("d", "d >= 1", d));
    }
    Ok(())
}

impl StabilizerCode {
    /// Builds a code and checks every invariant; invalid input never yields a code.
    pub fn new(
        n: usize,
        k: usize,
        d: usize,
        x_part: BinaryMatrix,
        z_part: BinaryMatrix,
    ) -> SfResult<Self> {
        validate_params(n, k, d)?;
        let code = Self {
            n,
            k,
            d,
            x_part,
            z_part,
        };
        code.validate()?;
        Ok(code)
    }

    #[inline(always)]
    pub fn num_generators(&self) -> usize {
        self.n - self.k
    }

    /// Symplectic form between generators `i` and `j`; 0 means they commute.
    #[inline(always)]
    pub fn symplectic_product(&self, i: usize, j: usize) -> u8 {
        self.x_part.row_dot(i, &self.z_part, j) ^ self.z_part.row_dot(i, &self.x_part, j)
    }

    /// First anticommuting generator pair, if any.
    pub fn first_conflict(&self) -> Option<(usize, usize)> {
        let r = self.x_part.rows();
        (0..r)
            .flat_map(|i| ((i + 1)..r).map(move |j| (i, j)))
            .find(|&(i, j)| self.symplectic_product(i, j) == 1)
    }

    pub fn commutes(&self) -> bool {
        self.first_conflict().is_none()
    }

    /// Same as [`commutes`](Self::commutes) but only for pairs touching row `row`.
    pub fn row_commutes(&self, row: usize) -> bool {
        (0..self.x_part.rows())
            .filter(|&j| j != row)
            .all(|j| self.symplectic_product(row, j) == 0)
    }

    fn check_shape(&self) -> SfResult<()> {
        let expected = (self.num_generators(), self.n);
        for (name, part) in [("x_part", &self.x_part), ("z_part", &self.z_part)] {
            if part.shape() != expected {
                return Err(StabForgeError::invalid(
                    name,
                    format!("{}x{} matrix", expected.0, expected.1),
                    format!("{}x{}", part.rows(), part.cols()),
                ));
            }
        }
        Ok(())
    }

    /// Shape plus symplectic commutation of every generator pair.
    pub fn validate(&self) -> SfResult<()> {
        validate_params(self.n, self.k, self.d)?;
        self.check_shape()?;
        if let Some((i, j)) = self.first_conflict() {
            return Err(StabForgeError::invalid(
                "code",
                "mutually commuting generators",
                format!("rows {} and {} anticommute", i, j),
            ));
        }
        Ok(())
    }

    /// Rank of the `(n-k) × 2n` matrix `[X | Z]` over GF(2).
    pub fn symplectic_rank(&self) -> usize {
        let rows: Vec<Vec<u8>> = (0..self.x_part.rows())
            .map(|i| {
                let mut row = self.x_part.row(i).to_vec();
                row.extend_from_slice(self.z_part.row(i));
                row
            })
            .collect();
        matrix::gf2_rank(&rows)
    }

    pub fn has_independent_generators(&self) -> bool {
        self.symplectic_rank() == self.x_part.rows()
    }

    pub fn pauli_strings(&self) -> Vec<String> {
        (0..self.x_part.rows())
            .map(|i| {
                self.x_part
                    .row(i)
                    .iter()
                    .zip(self.z_part.row(i))
                    .map(|(&x, &z)| match (x, z) {
                        (1, 0) => 'X',
                        (0, 1) => 'Z',
                        (1, 1) => 'Y',
                        _ => 'I',
                    })
                    .collect()
            })
            .collect()
    }

    pub fn gate_counts(&self) -> GateCounts {
        let mut counts = GateCounts::default();
        for i in 0..self.x_part.rows() {
            for (&x, &z) in self.x_part.row(i).iter().zip(self.z_part.row(i)) {
                match (x, z) {
                    (1, 0) => counts.cx += 1,
                    (0, 1) => counts.cz += 1,
                    (1, 1) => counts.cy += 1,
                    _ => {}
                }
            }
        }
        counts
    }

    pub fn detection_profile(&self) -> DetectionProfile {
        let rows = self.x_part.rows();
        let mut profile = DetectionProfile {
            undetected_x: 0,
            undetected_y: 0,
            undetected_z: 0,
            mean_row_weight: 0.0,
        };

        for q in 0..self.n {
            // X on q anticommutes with a generator that has a Z component there, and so on.
            let mut sees_x = false;
            let mut sees_y = false;
            let mut sees_z = false;
            for i in 0..rows {
                let x = self.x_part.get(i, q);
                let z = self.z_part.get(i, q);
                sees_x |= z == 1;
                sees_z |= x == 1;
                sees_y |= x != z;
            }
            profile.undetected_x += usize::from(!sees_x);
            profile.undetected_y += usize::from(!sees_y);
            profile.undetected_z += usize::from(!sees_z);
        }

        if rows > 0 {
            let support: usize = self.generator_weights().iter().sum();
            profile.mean_row_weight = support as f64 / rows as f64;
        }
        profile
    }

    /// Non-identity positions of each generator.
    pub fn generator_weights(&self) -> Vec<usize> {
        (0..self.x_part.rows())
            .map(|i| {
                self.x_part
                    .row(i)
                    .iter()
                    .zip(self.z_part.row(i))
                    .filter(|&(&x, &z)| (x | z) == 1)
                    .count()
            })
            .collect()
    }

    /// Number of generators acting non-trivially on each qubit.
    pub fn qubit_usage(&self) -> Vec<usize> {
        (0..self.n)
            .map(|q| {
                (0..self.x_part.rows())
                    .filter(|&i| (self.x_part.get(i, q) | self.z_part.get(i, q)) == 1)
                    .count()
            })
            .collect()
    }
}

impl fmt::Display for StabilizerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[[{},{},{}]]", self.n, self.k, self.d)?;
        for s in self.pauli_strings() {
            write!(f, " {}", s)?;
        }
        Ok(())
    }
}
