use crate::error::{SfResult, StabForgeError};
use clap::{parser::ValueSource, ArgMatches, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub search: SearchParams,
    #[command(flatten)]
    pub sampler: SamplerParams,
    #[command(flatten)]
    pub noise: NoiseParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 100)]
    pub max_iterations: usize,
    /// Steps without a new best before the search counts as converged.
    #[arg(long, default_value_t = 20)]
    pub patience: usize,
    /// Independent searches run in parallel; the best one is reported.
    #[arg(long, default_value_t = 1)]
    pub restarts: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            patience: 20,
            restarts: 1,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InitStrategy {
    /// Paired ZZ/XX generators, then validated random flips.
    Structured,
    /// Row-by-row rejection sampling of random generators.
    Random,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    #[arg(long, default_value_t = 1)]
    pub flips_min: usize,
    #[arg(long, default_value_t = 2)]
    pub flips_max: usize,
    #[arg(long, default_value_t = 64)]
    pub perturb_retries: usize,
    #[arg(long, default_value_t = 8)]
    pub init_flips: usize,
    #[arg(long, default_value_t = 256)]
    pub init_attempts: usize,
    #[arg(long, value_enum, default_value_t = InitStrategy::Structured)]
    pub init_strategy: InitStrategy,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            flips_min: 1,
            flips_max: 2,
            perturb_retries: 64,
            init_flips: 8,
            init_attempts: 256,
            init_strategy: InitStrategy::Structured,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Prefactor `A` of the threshold scaling law.
    #[arg(long, default_value_t = 0.1)]
    pub prefactor: f64,
    #[arg(long, default_value_t = 0.03)]
    pub threshold_depolarizing: f64,
    #[arg(long, default_value_t = 0.04)]
    pub threshold_amplitude_damping: f64,
    #[arg(long, default_value_t = 0.05)]
    pub threshold_biased: f64,
    /// Z:X error ratio of the biased channel.
    #[arg(long, default_value_t = 10.0)]
    pub bias_ratio: f64,
    #[arg(long, default_value_t = 4.0)]
    pub undetected_penalty: f64,
    #[arg(long, default_value_t = 0.5)]
    pub weight_penalty: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            prefactor: 0.1,
            threshold_depolarizing: 0.03,
            threshold_amplitude_damping: 0.04,
            threshold_biased: 0.05,
            bias_ratio: 10.0,
            undetected_penalty: 4.0,
            weight_penalty: 0.5,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SfResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Overwrites fields the user typed on the command line; file values win otherwise.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(search.max_iterations);
        update_if_present!(search.patience);
        update_if_present!(search.restarts);

        update_if_present!(sampler.flips_min);
        update_if_present!(sampler.flips_max);
        update_if_present!(sampler.perturb_retries);
        update_if_present!(sampler.init_flips);
        update_if_present!(sampler.init_attempts);
        update_if_present!(sampler.init_strategy);

        update_if_present!(noise.prefactor);
        update_if_present!(noise.threshold_depolarizing);
        update_if_present!(noise.threshold_amplitude_damping);
        update_if_present!(noise.threshold_biased);
        update_if_present!(noise.bias_ratio);
        update_if_present!(noise.undetected_penalty);
        update_if_present!(noise.weight_penalty);
    }

    pub fn validate(&self) -> SfResult<()> {
        self.sampler.validate()?;
        self.noise.validate()?;
        if self.search.restarts == 0 {
            return Err(StabForgeError::Config("restarts must be at least 1".into()));
        }
        Ok(())
    }
}

impl SamplerParams {
    pub fn validate(&self) -> SfResult<()> {
        if self.flips_min == 0 {
            return Err(StabForgeError::invalid("flips_min", "flips_min >= 1", 0));
        }
        if self.flips_min > self.flips_max {
            return Err(StabForgeError::invalid(
                "flips_max",
                format!("flips_max >= flips_min ({})", self.flips_min),
                self.flips_max,
            ));
        }
        Ok(())
    }
}

impl NoiseParams {
    pub fn validate(&self) -> SfResult<()> {
        let positive = [
            ("prefactor", self.prefactor),
            ("threshold_depolarizing", self.threshold_depolarizing),
            ("threshold_amplitude_damping", self.threshold_amplitude_damping),
            ("threshold_biased", self.threshold_biased),
            ("bias_ratio", self.bias_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(StabForgeError::invalid(name, "a positive finite number", value));
            }
        }
        for (name, value) in [
            ("undetected_penalty", self.undetected_penalty),
            ("weight_penalty", self.weight_penalty),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(StabForgeError::invalid(name, "a non-negative finite number", value));
            }
        }
        Ok(())
    }
}
