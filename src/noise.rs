//! Logical error model for the three supported physical channels.
//!
//! Every channel uses the same threshold scaling law
//!
//! ```text
//! p_L = clamp(A * F(code) * (p_eff / p_th)^t, 0, 1),   t = ceil((d + 1) / 2)
//! ```
//!
//! and differs in how the physical rate `p` splits into X, Y and Z errors and
//! where its threshold `p_th` sits. `F(code)` penalizes generators that leave
//! single-qubit errors undetected (weighted by the channel's Pauli split) and
//! heavy generators that need long extraction circuits.

use crate::code::StabilizerCode;
use crate::config::NoiseParams;
use crate::error::{SfResult, StabForgeError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum NoiseModelKind {
    #[serde(rename = "Depolarizing", alias = "depolarizing")]
    #[strum(to_string = "Depolarizing")]
    Depolarizing,

    #[serde(
        rename = "Amplitude Damping",
        alias = "amplitude_damping",
        alias = "amplitude-damping"
    )]
    #[strum(
        to_string = "Amplitude Damping",
        serialize = "amplitude_damping",
        serialize = "amplitude-damping",
        serialize = "AmplitudeDamping"
    )]
    AmplitudeDamping,

    #[serde(rename = "Biased Noise", alias = "biased_noise", alias = "biased-noise")]
    #[strum(
        to_string = "Biased Noise",
        serialize = "biased_noise",
        serialize = "biased-noise",
        serialize = "BiasedNoise"
    )]
    BiasedNoise,
}

impl NoiseModelKind {
    /// Parses an external model name, reporting unknown names as `InvalidParameter`.
    pub fn parse(name: &str) -> SfResult<Self> {
        Self::from_str(name.trim()).map_err(|_| {
            StabForgeError::invalid(
                "model",
                "one of \"Depolarizing\", \"Amplitude Damping\", \"Biased Noise\"",
                format!("\"{}\"", name),
            )
        })
    }

    pub fn threshold(&self, params: &NoiseParams) -> f64 {
        match self {
            Self::Depolarizing => params.threshold_depolarizing,
            Self::AmplitudeDamping => params.threshold_amplitude_damping,
            Self::BiasedNoise => params.threshold_biased,
        }
    }

    /// Pauli decomposition of the channel at physical rate `p`.
    pub fn channel(&self, p: f64, params: &NoiseParams) -> PauliChannel {
        match self {
            Self::Depolarizing => PauliChannel {
                p_eff: p,
                alpha_x: 1.0 / 3.0,
                alpha_y: 1.0 / 3.0,
                alpha_z: 1.0 / 3.0,
            },
            Self::AmplitudeDamping => {
                // Pauli twirl of damping with gamma = p.
                let px = p / 4.0;
                let py = p / 4.0;
                let pz = ((2.0 - p - 2.0 * (1.0 - p).sqrt()) / 4.0).max(0.0);
                let p_eff = px + py + pz;
                if p_eff > 0.0 {
                    PauliChannel {
                        p_eff,
                        alpha_x: px / p_eff,
                        alpha_y: py / p_eff,
                        alpha_z: pz / p_eff,
                    }
                } else {
                    PauliChannel {
                        p_eff: 0.0,
                        alpha_x: 0.5,
                        alpha_y: 0.5,
                        alpha_z: 0.0,
                    }
                }
            }
            Self::BiasedNoise => {
                let eta = params.bias_ratio;
                PauliChannel {
                    p_eff: p,
                    alpha_x: 1.0 / (eta + 1.0),
                    alpha_y: 0.0,
                    alpha_z: eta / (eta + 1.0),
                }
            }
        }
    }
}

/// Effective error rate and the share of X, Y and Z errors (shares sum to 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauliChannel {
    pub p_eff: f64,
    pub alpha_x: f64,
    pub alpha_y: f64,
    pub alpha_z: f64,
}

/// `ceil((d + 1) / 2)`: errors needed before a distance-`d` code fails.
///
/// Saturates at `i32::MAX`, which already drives any sub-threshold ratio to zero.
#[inline(always)]
pub fn failure_order(distance: usize) -> i32 {
    i32::try_from(distance / 2 + 1).unwrap_or(i32::MAX)
}

/// Multiplier `F(code)` applied on top of the distance scaling.
pub fn code_factor(code: &StabilizerCode, channel: &PauliChannel, params: &NoiseParams) -> f64 {
    let profile = code.detection_profile();
    let n = code.n as f64;

    let undetected = (channel.alpha_x * profile.undetected_x as f64
        + channel.alpha_y * profile.undetected_y as f64
        + channel.alpha_z * profile.undetected_z as f64)
        / n;
    let weight = profile.mean_row_weight / n;

    (1.0 + params.undetected_penalty * undetected) * (1.0 + params.weight_penalty * weight)
}

/// Logical error probability for `kind` at physical rate `physical_error_rate`.
///
/// Pure: the same arguments always give the same bits back.
pub fn evaluate(
    kind: NoiseModelKind,
    physical_error_rate: f64,
    distance: usize,
    code: Option<&StabilizerCode>,
    params: &NoiseParams,
) -> SfResult<f64> {
    if !(0.0..=1.0).contains(&physical_error_rate) {
        return Err(StabForgeError::invalid(
            "error_rate",
            "a probability in [0, 1]",
            physical_error_rate,
        ));
    }
    if distance < 1 {
        return Err(StabForgeError::invalid("distance", "distance >= 1", distance));
    }
    params.validate()?;

    let channel = kind.channel(physical_error_rate, params);
    let factor = match code {
        Some(c) => {
            c.validate()?;
            code_factor(c, &channel, params)
        }
        None => 1.0,
    };

    let ratio = channel.p_eff / kind.threshold(params);
    let rate = params.prefactor * factor * ratio.powi(failure_order(distance));
    Ok(rate.clamp(0.0, 1.0))
}
