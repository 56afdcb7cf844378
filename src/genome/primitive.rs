//! Primitive leaf types
//!
//! Parsing of semantic type names into primitive domains, plus the value-level
//! sampling and perturbation used by primitive genes.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::PrimitiveDefaults;
use crate::error::SamplingError;

/// Widest numeric type accepted by the parser
pub const MAX_DECLARED_BITS: u32 = 256;

/// Bit width above which delta perturbation stops growing
const DELTA_BITS_CAP: u32 = 10;

/// Decimal places beyond which f64 rounding is meaningless
const MAX_ROUNDING_DECIMALS: u32 = 15;

/// Domain and encoding parameters of a primitive gene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveType {
    /// Integer or fixed-point number
    Numeric {
        /// Declared bit width
        bits: u32,
        /// Whether negative values are allowed
        signed: bool,
        /// Decimal precision (0 for integers)
        decimals: u32,
    },
    /// Boolean flag
    Bool,
    /// String over a fixed alphabet
    Text {
        /// Characters a string may contain
        alphabet: Vec<char>,
        /// Maximum string length in characters
        max_length: usize,
    },
}

/// Value held by a primitive gene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveValue {
    /// Numeric value, already rounded to the type's precision
    Numeric(f64),
    /// Boolean value
    Bool(bool),
    /// String value
    Text(String),
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "{}", v),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Text(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TextMutation {
    Insert,
    Delete,
    Replace,
    Shift,
}

impl PrimitiveType {
    /// Parse a semantic type name into a primitive type
    ///
    /// Recognised names: `bool`, `string`, `address`, `uint`, `int`,
    /// `uint<N>`, `int<N>`, `ufixed`, `fixed`, `ufixed<M>x<N>`, `fixed<M>x<N>`.
    pub fn parse(name: &str, defaults: &PrimitiveDefaults) -> Result<Self, SamplingError> {
        match name {
            "bool" => return Ok(Self::Bool),
            "string" => {
                let alphabet: Vec<char> = defaults.string_alphabet.chars().collect();
                if alphabet.is_empty() {
                    return Err(SamplingError::MalformedType {
                        name: name.to_string(),
                        reason: "string alphabet is empty".to_string(),
                    });
                }
                return Ok(Self::Text {
                    alphabet,
                    max_length: defaults.string_max_length,
                });
            }
            "address" => {
                return Ok(Self::Numeric {
                    bits: 160,
                    signed: false,
                    decimals: 0,
                })
            }
            _ => {}
        }

        let is_width = |rest: &str| rest.chars().all(|c| c.is_ascii_digit());
        let is_fixed_width = |rest: &str| rest.chars().all(|c| c.is_ascii_digit() || c == 'x');

        if let Some(rest) = name.strip_prefix("ufixed").filter(|r| is_fixed_width(*r)) {
            return Self::parse_fixed(name, rest, false, defaults);
        }
        if let Some(rest) = name.strip_prefix("fixed").filter(|r| is_fixed_width(*r)) {
            return Self::parse_fixed(name, rest, true, defaults);
        }
        if let Some(rest) = name.strip_prefix("uint").filter(|r| is_width(*r)) {
            return Self::parse_integer(name, rest, false, defaults);
        }
        if let Some(rest) = name.strip_prefix("int").filter(|r| is_width(*r)) {
            return Self::parse_integer(name, rest, true, defaults);
        }

        Err(SamplingError::UnsupportedType(name.to_string()))
    }

    /// Check whether a semantic type name denotes a primitive
    pub fn is_primitive(name: &str, defaults: &PrimitiveDefaults) -> bool {
        Self::parse(name, defaults).is_ok()
    }

    fn parse_integer(
        name: &str,
        bits: &str,
        signed: bool,
        defaults: &PrimitiveDefaults,
    ) -> Result<Self, SamplingError> {
        let bits = if bits.is_empty() {
            defaults.integer_bits
        } else {
            parse_bits(name, bits)?
        };
        Ok(Self::Numeric {
            bits,
            signed,
            decimals: 0,
        })
    }

    fn parse_fixed(
        name: &str,
        spec: &str,
        signed: bool,
        defaults: &PrimitiveDefaults,
    ) -> Result<Self, SamplingError> {
        if spec.is_empty() {
            return Ok(Self::Numeric {
                bits: defaults.fixed_bits,
                signed,
                decimals: defaults.fixed_decimals,
            });
        }

        let (bits, decimals) = spec.split_once('x').ok_or_else(|| SamplingError::MalformedType {
            name: name.to_string(),
            reason: "expected <bits>x<decimals>".to_string(),
        })?;
        let bits = parse_bits(name, bits)?;
        let decimals = decimals
            .parse::<u32>()
            .map_err(|_| SamplingError::MalformedType {
                name: name.to_string(),
                reason: format!("invalid decimal precision `{}`", decimals),
            })?;

        Ok(Self::Numeric {
            bits,
            signed,
            decimals,
        })
    }

    /// Inclusive numeric domain, with the bit width capped at `bits_cap`
    ///
    /// Returns `None` for non-numeric types.
    pub fn domain(&self, bits_cap: u32) -> Option<(f64, f64)> {
        match self {
            Self::Numeric { bits, signed, .. } => {
                let max = 2f64.powi((*bits).min(bits_cap) as i32) - 1.0;
                let min = if *signed { -max } else { 0.0 };
                Some((min, max))
            }
            _ => None,
        }
    }

    /// Draw a uniformly random value over the whole domain
    pub fn random_value<R: Rng>(&self, bits_cap: u32, rng: &mut R) -> PrimitiveValue {
        match self {
            Self::Numeric { decimals, .. } => {
                let (min, max) = self.domain(bits_cap).unwrap_or((0.0, 0.0));
                let value = if *decimals == 0 {
                    rng.gen_range(min as i64..=max as i64) as f64
                } else {
                    round_to(rng.gen_range(min..=max), *decimals)
                };
                PrimitiveValue::Numeric(value)
            }
            Self::Bool => PrimitiveValue::Bool(rng.gen()),
            Self::Text {
                alphabet,
                max_length,
            } => {
                let len = rng.gen_range(0..=*max_length);
                let text = (0..len).map(|_| random_char(alphabet, rng)).collect();
                PrimitiveValue::Text(text)
            }
        }
    }

    /// Apply a bounded perturbation to a numeric value
    ///
    /// The delta is drawn uniformly from `[-(2^min(bits,10)-1), 2^min(bits,10)-1]`;
    /// the result is clamped to the domain and rounded to the declared precision.
    pub fn delta_value<R: Rng>(&self, value: f64, bits_cap: u32, rng: &mut R) -> f64 {
        match self {
            Self::Numeric { bits, decimals, .. } => {
                let (min, max) = self.domain(bits_cap).unwrap_or((value, value));
                let max_delta = (1i64 << (*bits).min(DELTA_BITS_CAP)) - 1;
                let delta = rng.gen_range(-max_delta..=max_delta) as f64;
                round_to((value + delta).clamp(min, max), *decimals)
            }
            _ => value,
        }
    }

    /// Apply one random edit to a string value
    ///
    /// The edit kind is chosen uniformly among those applicable: insertion
    /// (only below the maximum length), deletion, replacement and alphabet
    /// shift (only for non-empty strings).
    pub fn mutate_text<R: Rng>(&self, text: &str, rng: &mut R) -> String {
        let (alphabet, max_length) = match self {
            Self::Text {
                alphabet,
                max_length,
            } => (alphabet, *max_length),
            _ => return text.to_string(),
        };

        let mut chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let mut kinds = Vec::with_capacity(4);
        if len < max_length {
            kinds.push(TextMutation::Insert);
        }
        if len > 0 {
            kinds.extend([
                TextMutation::Delete,
                TextMutation::Replace,
                TextMutation::Shift,
            ]);
        }
        if kinds.is_empty() {
            return text.to_string();
        }

        match kinds[rng.gen_range(0..kinds.len())] {
            TextMutation::Insert => {
                let pos = rng.gen_range(0..=len);
                chars.insert(pos, random_char(alphabet, rng));
            }
            TextMutation::Delete => {
                let pos = rng.gen_range(0..len);
                chars.remove(pos);
            }
            TextMutation::Replace => {
                let pos = rng.gen_range(0..len);
                chars[pos] = random_char(alphabet, rng);
            }
            TextMutation::Shift => {
                let pos = rng.gen_range(0..len);
                let current = alphabet.iter().position(|&c| c == chars[pos]).unwrap_or(0);
                let n = alphabet.len();
                let shifted = if rng.gen::<bool>() {
                    (current + 1) % n
                } else {
                    (current + n - 1) % n
                };
                chars[pos] = alphabet[shifted];
            }
        }

        chars.into_iter().collect()
    }
}

fn parse_bits(name: &str, bits: &str) -> Result<u32, SamplingError> {
    let parsed = bits.parse::<u32>().map_err(|_| SamplingError::MalformedType {
        name: name.to_string(),
        reason: format!("invalid bit width `{}`", bits),
    })?;
    if parsed == 0 || parsed > MAX_DECLARED_BITS {
        return Err(SamplingError::MalformedType {
            name: name.to_string(),
            reason: "bit width out of range".to_string(),
        });
    }
    Ok(parsed)
}

fn random_char<R: Rng>(alphabet: &[char], rng: &mut R) -> char {
    alphabet[rng.gen_range(0..alphabet.len())]
}

/// Round a value to the given number of decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if decimals == 0 {
        return value.round();
    }
    let factor = 10f64.powi(decimals.min(MAX_ROUNDING_DECIMALS) as i32);
    (value * factor).round() / factor
}
