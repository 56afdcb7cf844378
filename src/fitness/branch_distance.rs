//! Branch distance
//!
//! Numeric closeness of a comparison's operands to flipping its outcome,
//! normalised into `[0, 1)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FitnessError;

/// Comparison opcode recorded at a branching instruction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// `>`
    Gt,
    /// `>=`
    Sgt,
    /// `<`
    Lt,
    /// `<=`
    Slt,
    /// `==`
    Eq,
}

impl Opcode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => "GT",
            Self::Sgt => "SGT",
            Self::Lt => "LT",
            Self::Slt => "SLT",
            Self::Eq => "EQ",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Opcode {
    type Err = FitnessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GT" | ">" => Ok(Self::Gt),
            "SGT" | ">=" => Ok(Self::Sgt),
            "LT" | "<" => Ok(Self::Lt),
            "SLT" | "<=" => Ok(Self::Slt),
            "EQ" | "==" => Ok(Self::Eq),
            _ => Err(FitnessError::UnknownOpcode(s.to_string())),
        }
    }
}

/// Distances to the two outcomes of one comparison
///
/// At most one of the two is nonzero: the distance to the outcome that was
/// not taken.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BranchDistance {
    pub true_branch: f64,
    pub false_branch: f64,
}

impl BranchDistance {
    /// Compute the distances for `left <opcode> right`
    pub fn compute(opcode: Opcode, left: f64, right: f64) -> Self {
        let d = ((left - right).abs() + 1.0).log10();
        let mut distance = Self::default();

        match opcode {
            Opcode::Gt => {
                if left > right {
                    distance.false_branch = normalize(d);
                } else {
                    distance.true_branch = normalize(d + 1.0);
                }
            }
            Opcode::Sgt => {
                if left >= right {
                    distance.false_branch = normalize(d + 1.0);
                } else {
                    distance.true_branch = normalize(d);
                }
            }
            Opcode::Lt => {
                if left < right {
                    distance.false_branch = normalize(d);
                } else {
                    distance.true_branch = normalize(d + 1.0);
                }
            }
            Opcode::Slt => {
                if left <= right {
                    distance.false_branch = normalize(d + 1.0);
                } else {
                    distance.true_branch = normalize(d);
                }
            }
            Opcode::Eq => {
                if left == right {
                    distance.false_branch = normalize(1.0);
                } else {
                    distance.true_branch = normalize(d);
                }
            }
        }

        distance
    }

    /// The nonzero distance, or 0 when both are zero
    pub fn value(&self) -> f64 {
        if self.true_branch != 0.0 {
            self.true_branch
        } else {
            self.false_branch
        }
    }
}

/// Branch distance of `left <opcode> right`
pub fn branch_distance(opcode: Opcode, left: f64, right: f64) -> f64 {
    BranchDistance::compute(opcode, left, right).value()
}

fn normalize(x: f64) -> f64 {
    1.0 - 1.0 / (x + 1.0)
}
