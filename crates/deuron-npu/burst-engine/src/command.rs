// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command-channel tokens
//!
//! ```text
//! start | stop | ping | load
//! prop <Category> <Field> <value>
//! prop up|down <step>
//! ```

use std::fmt;
use std::str::FromStr;

use crate::property::Property;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}'")]
    UnknownVerb(String),

    #[error("Missing {0}")]
    MissingToken(&'static str),

    #[error("Bad numeric value '{0}'")]
    BadNumber(String),

    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    #[error("No property has been set yet; nothing to adjust")]
    NoPreviousProperty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn apply(self, value: f64, step: f64) -> f64 {
        match self {
            Direction::Up => value + step,
            Direction::Down => value - step,
        }
    }
}

/// Property-change request
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyCommand {
    /// `text` is the value exactly as typed; it is echoed in the change event
    Set {
        property: Property,
        value: f64,
        text: String,
    },
    /// Re-apply the last `Set`, moved by `step`
    Adjust { direction: Direction, step: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Stop,
    Ping,
    Load,
    Prop(PropertyCommand),
}

fn parse_number(token: Option<&str>, what: &'static str) -> Result<(f64, String), CommandError> {
    let token = token.ok_or(CommandError::MissingToken(what))?;
    let value = token
        .parse::<f64>()
        .map_err(|_| CommandError::BadNumber(token.to_string()))?;
    if !value.is_finite() {
        return Err(CommandError::BadNumber(token.to_string()));
    }
    Ok((value, token.to_string()))
}

fn parse_prop<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<PropertyCommand, CommandError> {
    let first = args.next().ok_or(CommandError::MissingToken("property category"))?;

    let direction = match first.to_ascii_lowercase().as_str() {
        "up" => Some(Direction::Up),
        "down" => Some(Direction::Down),
        _ => None,
    };
    if let Some(direction) = direction {
        let (step, _) = parse_number(args.next(), "step value")?;
        return Ok(PropertyCommand::Adjust { direction, step });
    }

    let field = args.next().ok_or(CommandError::MissingToken("property field"))?;
    let property = Property::lookup(first, field)
        .ok_or_else(|| CommandError::UnknownProperty(format!("{} {}", first, field)))?;
    let (value, text) = parse_number(args.next(), "property value")?;
    Ok(PropertyCommand::Set {
        property,
        value,
        text,
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(CommandError::Empty)?;
        match verb {
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            "ping" => Ok(Command::Ping),
            "load" => Ok(Command::Load),
            "prop" => parse_prop(tokens).map(Command::Prop),
            other => Err(CommandError::UnknownVerb(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Start => f.write_str("start"),
            Command::Stop => f.write_str("stop"),
            Command::Ping => f.write_str("ping"),
            Command::Load => f.write_str("load"),
            Command::Prop(PropertyCommand::Set { property, text, .. }) => {
                write!(f, "prop {} {}", property, text)
            }
            Command::Prop(PropertyCommand::Adjust { direction, step }) => {
                let word = match direction {
                    Direction::Up => "up",
                    Direction::Down => "down",
                };
                write!(f, "prop {} {}", word, step)
            }
        }
    }
}
