// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of chain definitions.
//!
//! A definition needs a string `trigger`, a `steps` sequence, and a non-empty `plugin`
//! on every step. `description`, `config` and `await_reply` are optional but must have
//! the right shape when present. Checks run in that order and stop at the first failure.

use serde_json::{Map, Value};

use super::definition::{ChainDefinition, Step};
use crate::errors::ValidationError;

pub fn validate_definition(value: &Value) -> Result<ChainDefinition, ValidationError> {
    let object = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let trigger = match object.get("trigger") {
        None => return Err(ValidationError::MissingField { field: "trigger" }),
        Some(Value::String(trigger)) if trigger.is_empty() => {
            return Err(ValidationError::MissingField { field: "trigger" })
        }
        Some(Value::String(trigger)) => trigger.clone(),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "trigger",
                expected: "a string",
            })
        }
    };

    let raw_steps = match object.get("steps") {
        None => return Err(ValidationError::MissingField { field: "steps" }),
        Some(Value::Array(steps)) => steps,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "steps",
                expected: "a sequence",
            })
        }
    };

    let steps = raw_steps
        .iter()
        .enumerate()
        .map(|(index, step)| validate_step(index, step))
        .collect::<Result<Vec<_>, _>>()?;

    let description = match object.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(description)) => description.clone(),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "description",
                expected: "a string",
            })
        }
    };

    Ok(ChainDefinition {
        trigger,
        description,
        steps,
    })
}

fn validate_step(index: usize, value: &Value) -> Result<Step, ValidationError> {
    let object = value
        .as_object()
        .ok_or(ValidationError::StepMissingPlugin { index })?;

    let plugin_ref = match object.get("plugin") {
        Some(Value::String(plugin)) if !plugin.trim().is_empty() => plugin.clone(),
        _ => return Err(ValidationError::StepMissingPlugin { index }),
    };

    let config = match object.get("config") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(config)) => config.clone(),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "config",
                expected: "a mapping",
            })
        }
    };

    let await_reply = match object.get("await_reply") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "await_reply",
                expected: "a boolean",
            })
        }
    };

    Ok(Step {
        plugin_ref,
        config,
        await_reply,
    })
}
