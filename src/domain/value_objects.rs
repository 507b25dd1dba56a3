// Domain value objects: solver and backend selection, integer-program status

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

/// Status of an integer-program solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Model has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Time limit reached; values hold the incumbent if one was found
    TimeLimit,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
        }
    }
}

/// Integer-programming backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Best backend compiled into this build
    #[default]
    Auto,
    /// Pure-Rust microlp branch and bound
    Microlp,
    /// COIN-OR CBC
    CoinCbc,
    /// HiGHS
    Highs,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "Auto"),
            BackendKind::Microlp => write!(f, "microlp"),
            BackendKind::CoinCbc => write!(f, "COIN-OR CBC"),
            BackendKind::Highs => write!(f, "HiGHS"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(BackendKind::Auto),
            "microlp" => Ok(BackendKind::Microlp),
            "coin_cbc" | "cbc" => Ok(BackendKind::CoinCbc),
            "highs" => Ok(BackendKind::Highs),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

/// Routing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    #[serde(rename = "dp")]
    Dp,
    #[serde(rename = "greedy")]
    Greedy,
    #[serde(rename = "random")]
    Random,
    #[serde(rename = "mip")]
    Mip,
    #[serde(rename = "mip-per-operation")]
    PerOperationMip,
}

impl SolverKind {
    pub const ALL: [SolverKind; 5] = [
        SolverKind::Dp,
        SolverKind::Greedy,
        SolverKind::Random,
        SolverKind::Mip,
        SolverKind::PerOperationMip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Dp => "dp",
            SolverKind::Greedy => "greedy",
            SolverKind::Random => "random",
            SolverKind::Mip => "mip",
            SolverKind::PerOperationMip => "mip-per-operation",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown solver '{}'", s))
    }
}
