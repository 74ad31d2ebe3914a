//! Validation Engine
//!
//! Checks parsed arguments against a [`CommandSpec`]: required options, then
//! option sets, then each validator in registration order. The first failure
//! wins and nothing after it runs.

use crate::args::ParsedArgs;
use crate::options::{CommandSpec, OptionSet, SetPolicy};
use tracing::debug;

pub mod rules;

/// Validate `args` for `spec`, returning the first rejection message.
pub async fn validate(spec: &CommandSpec, args: &ParsedArgs) -> Result<(), String> {
    check_required(spec, args)?;
    check_option_sets(spec, args)?;

    for (index, validator) in spec.validators().iter().enumerate() {
        if let Err(message) = validator.validate(args).await {
            debug!(
                command = spec.name(),
                validator = index,
                "Validator rejected arguments"
            );
            return Err(message);
        }
    }

    Ok(())
}

/// Every option declared with `<value>` must be supplied.
pub fn check_required(spec: &CommandSpec, args: &ParsedArgs) -> Result<(), String> {
    match spec
        .options()
        .iter()
        .find(|o| o.is_required() && !args.is_present(o.long()))
    {
        Some(missing) => Err(format!("Required option {} not specified", missing.long())),
        None => Ok(()),
    }
}

pub fn check_option_sets(spec: &CommandSpec, args: &ParsedArgs) -> Result<(), String> {
    spec.option_sets()
        .iter()
        .try_for_each(|set| check_option_set(set, args))
}

fn check_option_set(set: &OptionSet, args: &ParsedArgs) -> Result<(), String> {
    let supplied = set
        .members()
        .iter()
        .filter(|m| args.is_present(m))
        .count();
    let either = format!("Specify either {}", set.members().join(" or "));

    match (set.policy(), supplied) {
        (SetPolicy::ExactlyOne, 0) => Err(either),
        (_, n) if n > 1 => Err(format!("{}, but not multiple", either)),
        _ => Ok(()),
    }
}
