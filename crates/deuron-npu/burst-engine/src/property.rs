// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Tunable simulation properties, addressed by (category, field)

use std::fmt;
use std::str::FromStr;

use crate::command::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    PoissonMax,
    PoissonMin,
    PoissonSpread,
    PatternMax,
    PatternMin,
    PatternSpread,
    SomaThreshold,
}

impl Property {
    pub const ALL: [Property; 7] = [
        Property::PoissonMax,
        Property::PoissonMin,
        Property::PoissonSpread,
        Property::PatternMax,
        Property::PatternMin,
        Property::PatternSpread,
        Property::SomaThreshold,
    ];

    /// Match a (category, field) pair, ignoring ASCII case
    pub fn lookup(category: &str, field: &str) -> Option<Property> {
        Property::ALL.into_iter().find(|p| {
            p.category().eq_ignore_ascii_case(category) && p.field().eq_ignore_ascii_case(field)
        })
    }

    pub fn category(self) -> &'static str {
        match self {
            Property::PoissonMax | Property::PoissonMin | Property::PoissonSpread => "Poisson",
            Property::PatternMax | Property::PatternMin | Property::PatternSpread => "Pattern",
            Property::SomaThreshold => "Soma",
        }
    }

    pub fn field(self) -> &'static str {
        match self {
            Property::PoissonMax | Property::PatternMax => "Max",
            Property::PoissonMin | Property::PatternMin => "Min",
            Property::PoissonSpread | Property::PatternSpread => "Spread",
            Property::SomaThreshold => "Threshold",
        }
    }
}

/// `"Poisson Max"`
impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category(), self.field())
    }
}

impl FromStr for Property {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(category), Some(field), None) => Property::lookup(category, field)
                .ok_or_else(|| CommandError::UnknownProperty(s.trim().to_string())),
            _ => Err(CommandError::UnknownProperty(s.trim().to_string())),
        }
    }
}
