use crate::code::{BinaryMatrix, StabilizerCode};
use crate::config::{InitStrategy, SamplerParams};
use crate::error::{SfResult, StabForgeError};
use fastrand::Rng;
use tracing::debug;

/// A candidate is usable when its generators commute and are independent.
pub fn is_acceptable(code: &StabilizerCode) -> bool {
    code.commutes() && code.has_independent_generators()
}

#[inline(always)]
fn symplectic_dot(ax: &[u8], az: &[u8], bx: &[u8], bz: &[u8]) -> u8 {
    let mut acc = 0u8;
    for i in 0..ax.len() {
        acc ^= (ax[i] & bz[i]) ^ (az[i] & bx[i]);
    }
    acc
}

/// Deterministic CSS start: `Z_{2j} Z_{2j+1}` then `X_{2j} X_{2j+1}` for each
/// qubit pair `j`, truncated to `n - k` generators.
///
/// Generators on different pairs are disjoint and the two on the same pair
/// overlap twice, so every pair of rows commutes. With `k >= 1` there are
/// always enough pairs.
pub fn paired_base(n: usize, k: usize, d: usize) -> SfResult<StabilizerCode> {
    crate::code::validate_params(n, k, d)?;
    let r = n - k;
    let mut x_part = BinaryMatrix::zeros(r, n);
    let mut z_part = BinaryMatrix::zeros(r, n);

    for i in 0..r {
        let q0 = 2 * (i / 2);
        let q1 = q0 + 1;
        let part = if i % 2 == 0 { &mut z_part } else { &mut x_part };
        part.set(i, q0, 1);
        part.set(i, q1, 1);
    }

    StabilizerCode::new(n, k, d, x_part, z_part)
}

pub struct StabilizerSampler {
    pub params: SamplerParams,
    pub rng: Rng,
}

impl StabilizerSampler {
    pub fn new(params: SamplerParams, seed: Option<u64>) -> Self {
        let rng = if let Some(s) = seed {
            Rng::with_seed(s)
        } else {
            Rng::new()
        };
        Self { params, rng }
    }

    /// Produces a valid starting code for `[[n, k, d]]`.
    pub fn initial(&mut self, n: usize, k: usize, d: usize) -> SfResult<StabilizerCode> {
        crate::code::validate_params(n, k, d)?;
        match self.params.init_strategy {
            InitStrategy::Structured => self.initial_structured(n, k, d),
            InitStrategy::Random => self.initial_random(n, k, d),
        }
    }

    fn initial_structured(&mut self, n: usize, k: usize, d: usize) -> SfResult<StabilizerCode> {
        let mut code = paired_base(n, k, d)?;
        let r = code.num_generators();

        let mut accepted = 0;
        let mut attempts = 0;
        while accepted < self.params.init_flips && attempts < self.params.init_attempts {
            attempts += 1;
            let row = self.rng.usize(0..r);
            let col = self.rng.usize(0..n);
            let in_x = self.rng.bool();

            flip(&mut code, row, col, in_x);
            if code.row_commutes(row) && code.has_independent_generators() {
                accepted += 1;
            } else {
                flip(&mut code, row, col, in_x);
            }
        }

        debug!(
            "Sampler: structured [[{},{}]] start, {} of {} flips kept",
            n, k, accepted, attempts
        );
        Ok(code)
    }

    fn initial_random(&mut self, n: usize, k: usize, d: usize) -> SfResult<StabilizerCode> {
        let r = n - k;
        let budget = self.params.init_attempts;
        let mut x_rows: Vec<Vec<u8>> = Vec::with_capacity(r);
        let mut z_rows: Vec<Vec<u8>> = Vec::with_capacity(r);

        for _ in 0..r {
            let mut placed = false;
            for _ in 0..budget {
                let x: Vec<u8> = (0..n).map(|_| self.rng.u8(0..2)).collect();
                let z: Vec<u8> = (0..n).map(|_| self.rng.u8(0..2)).collect();

                let commutes = x_rows
                    .iter()
                    .zip(&z_rows)
                    .all(|(px, pz)| symplectic_dot(&x, &z, px, pz) == 0);
                if !commutes {
                    continue;
                }

                let mut stacked: Vec<Vec<u8>> = x_rows
                    .iter()
                    .zip(&z_rows)
                    .map(|(px, pz)| [px.as_slice(), pz.as_slice()].concat())
                    .collect();
                stacked.push([x.as_slice(), z.as_slice()].concat());
                if crate::code::matrix::gf2_rank(&stacked) < stacked.len() {
                    continue;
                }

                x_rows.push(x);
                z_rows.push(z);
                placed = true;
                break;
            }

            if !placed {
                return Err(StabForgeError::NoFeasibleCode {
                    n,
                    k,
                    attempts: budget,
                });
            }
        }

        StabilizerCode::new(
            n,
            k,
            d,
            BinaryMatrix::from_rows(x_rows)?,
            BinaryMatrix::from_rows(z_rows)?,
        )
    }

    /// Flips a few random bits, keeping the result only if it is still a
    /// valid code. Falls back to an unchanged copy when every retry fails.
    pub fn perturb(&mut self, code: &StabilizerCode) -> StabilizerCode {
        let r = code.x_part.rows();
        let n = code.n;
        if r == 0 || n == 0 {
            return code.clone();
        }

        let lo = self.params.flips_min.max(1);
        let hi = self.params.flips_max.max(lo);

        for _ in 0..self.params.perturb_retries {
            let mut candidate = code.clone();
            let flips = self.rng.usize(lo..=hi);
            for _ in 0..flips {
                let row = self.rng.usize(0..r);
                let col = self.rng.usize(0..n);
                let in_x = self.rng.bool();
                flip(&mut candidate, row, col, in_x);
            }

            // Two flips on the same bit cancel out; that is not a move.
            if candidate != *code && is_acceptable(&candidate) {
                return candidate;
            }
        }

        code.clone()
    }
}

#[inline(always)]
fn flip(code: &mut StabilizerCode, row: usize, col: usize, in_x: bool) {
    if in_x {
        code.x_part.flip(row, col);
    } else {
        code.z_part.flip(row, col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paired_base_shapes() {
        let code = paired_base(5, 1, 3).unwrap();
        assert_eq!(code.pauli_strings(), vec!["ZZIII", "XXIII", "IIZZI", "IIXXI"]);
        assert!(is_acceptable(&code));
    }

    #[test]
    fn test_paired_base_minimal() {
        let code = paired_base(2, 1, 1).unwrap();
        assert_eq!(code.pauli_strings(), vec!["ZZ"]);
    }

    #[test]
    fn test_perturb_without_retries_is_identity() {
        let params = SamplerParams {
            perturb_retries: 0,
            ..SamplerParams::default()
        };
        let mut sampler = StabilizerSampler::new(params, Some(1));
        let code = paired_base(4, 1, 2).unwrap();
        assert_eq!(sampler.perturb(&code), code);
    }

    #[test]
    fn test_random_strategy_reproducible() {
        let params = SamplerParams {
            init_strategy: InitStrategy::Random,
            ..SamplerParams::default()
        };
        let a = StabilizerSampler::new(params.clone(), Some(7)).initial(6, 2, 2).unwrap();
        let b = StabilizerSampler::new(params, Some(7)).initial(6, 2, 2).unwrap();
        assert_eq!(a, b);
        assert!(is_acceptable(&a));
    }
}
