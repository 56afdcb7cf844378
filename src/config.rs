//! Search configuration
//!
//! [`SearchConfig`] holds every knob the generation loop, the operators and
//! the sampler read. It deserializes from JSON with defaults for missing keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, EvolutionError};

/// Highest numeric domain width that f64 represents exactly
pub const MAX_EXACT_DOMAIN_BITS: u32 = 52;

/// Which survivor strategy drives the search
///
/// Serialized by name; deserialization goes through [`FromStr`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    /// Generational GA with non-dominated survivor selection
    SimpleGa,
    /// NSGA-II over the full objective set
    Nsga2,
    /// Many-objective sorting with a coverage archive
    Mosa,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SimpleGa => "SimpleGA",
            Self::Nsga2 => "NSGA2",
            Self::Mosa => "MOSA",
        }
    }

    /// Whether this algorithm keeps a coverage archive as its final suite
    pub fn uses_archive(&self) -> bool {
        matches!(self, Self::Mosa)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = EvolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SimpleGA" => Ok(Self::SimpleGa),
            "NSGA2" => Ok(Self::Nsga2),
            "MOSA" => Ok(Self::Mosa),
            other => Err(EvolutionError::UnknownAlgorithm(other.to_string())),
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = EvolutionError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Algorithm> for String {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.as_str().to_string()
    }
}

/// Per-primitive-type defaults used when a type name omits its parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveDefaults {
    /// Bit width for bare `int` / `uint`
    pub integer_bits: u32,
    /// Bit width for bare `fixed` / `ufixed`
    pub fixed_bits: u32,
    /// Decimal precision for bare `fixed` / `ufixed`
    pub fixed_decimals: u32,
    /// Characters strings are built from
    pub string_alphabet: String,
    /// Maximum string length in characters
    pub string_max_length: usize,
}

impl Default for PrimitiveDefaults {
    fn default() -> Self {
        Self {
            integer_bits: 256,
            fixed_bits: 128,
            fixed_decimals: 18,
            string_alphabet: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
                .to_string(),
            string_max_length: 100,
        }
    }
}

/// Configuration for a search run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of individuals kept after each generation
    pub population_size: usize,
    /// Maximum tree depth during sampling
    pub max_depth: usize,
    /// Maximum number of top-level calls in a sampled test case
    pub max_actions: usize,
    /// Probability of replacing a gene with a freshly sampled one
    pub resample_gene_chance: f64,
    /// Probability of a bounded numeric perturbation instead of a fresh value
    pub delta_mutation_chance: f64,
    /// Probability of nesting a call as an argument below `max_depth`
    pub sample_func_as_arg: f64,
    /// Per-node probability of collecting crossover candidates
    pub crossover_chance: f64,
    /// Parent tournament size
    pub tournament_size: usize,
    /// Survivor strategy
    pub algorithm: Algorithm,
    /// Bit width at which numeric sampling and mutation domains are capped
    pub numeric_domain_bits: u32,
    /// Defaults for primitive type parameters
    pub primitives: PrimitiveDefaults,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_depth: 5,
            max_actions: 5,
            resample_gene_chance: 0.01,
            delta_mutation_chance: 0.8,
            sample_func_as_arg: 0.5,
            crossover_chance: 0.8,
            tournament_size: 2,
            algorithm: Algorithm::Mosa,
            numeric_domain_bits: 16,
            primitives: PrimitiveDefaults::default(),
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from JSON text, filling missing keys with defaults
    ///
    /// An unrecognised `algorithm` name is reported as
    /// [`EvolutionError::UnknownAlgorithm`].
    pub fn from_json(text: &str) -> EvoResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        if let Some(name) = value.get("algorithm").and_then(serde_json::Value::as_str) {
            name.parse::<Algorithm>()?;
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the maximum sampling depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum number of top-level calls
    pub fn with_max_actions(mut self, actions: usize) -> Self {
        self.max_actions = actions;
        self
    }

    /// Set the gene resampling probability
    pub fn with_resample_gene_chance(mut self, chance: f64) -> Self {
        self.resample_gene_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the delta mutation probability
    pub fn with_delta_mutation_chance(mut self, chance: f64) -> Self {
        self.delta_mutation_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the nested-call argument probability
    pub fn with_sample_func_as_arg(mut self, chance: f64) -> Self {
        self.sample_func_as_arg = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the crossover candidate probability
    pub fn with_crossover_chance(mut self, chance: f64) -> Self {
        self.crossover_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Set the tournament size
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Set the algorithm
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the numeric domain cap
    pub fn with_numeric_domain_bits(mut self, bits: u32) -> Self {
        self.numeric_domain_bits = bits;
        self
    }

    /// Set the primitive defaults
    pub fn with_primitives(mut self, primitives: PrimitiveDefaults) -> Self {
        self.primitives = primitives;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size < 2 {
            return Err(EvolutionError::Configuration(
                "population_size must be at least 2".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(EvolutionError::Configuration(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_actions == 0 {
            return Err(EvolutionError::Configuration(
                "max_actions must be at least 1".to_string(),
            ));
        }
        if self.tournament_size < 2 {
            return Err(EvolutionError::Configuration(
                "tournament_size must be at least 2".to_string(),
            ));
        }
        for (name, p) in [
            ("resample_gene_chance", self.resample_gene_chance),
            ("delta_mutation_chance", self.delta_mutation_chance),
            ("sample_func_as_arg", self.sample_func_as_arg),
            ("crossover_chance", self.crossover_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(EvolutionError::Configuration(format!(
                    "{} must be within [0, 1], got {}",
                    name, p
                )));
            }
        }
        if self.numeric_domain_bits == 0 || self.numeric_domain_bits > MAX_EXACT_DOMAIN_BITS {
            return Err(EvolutionError::Configuration(format!(
                "numeric_domain_bits must be within [1, {}]",
                MAX_EXACT_DOMAIN_BITS
            )));
        }
        if self.primitives.string_alphabet.is_empty() {
            return Err(EvolutionError::Configuration(
                "string_alphabet must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
