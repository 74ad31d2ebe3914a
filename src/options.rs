//! Option Model
//!
//! Declarative description of what a command accepts: option declarations,
//! option sets, validators and telemetry projections. A [`CommandSpec`] is
//! assembled by a [`CommandSpecBuilder`] at registration time and is never
//! mutated afterwards.

use crate::args::ParsedArgs;
use crate::error::SpecError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// Whether an option takes a value and whether that value is mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueArity {
    /// `--flag`
    Switch,
    /// `--name <name>`
    Required,
    /// `--name [name]`
    Optional,
}

/// One accepted flag, parsed from commander-style syntax such as
/// `-i, --team-id [teamId]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDeclaration {
    long: String,
    short: Option<char>,
    arity: ValueArity,
    description: Option<String>,
}

impl OptionDeclaration {
    pub fn parse(syntax: &str) -> Result<Self, SpecError> {
        let invalid = || SpecError::InvalidOptionSyntax(syntax.to_string());
        let mut long = None;
        let mut short = None;
        let mut arity = ValueArity::Switch;

        for token in syntax
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
        {
            if let Some(name) = token.strip_prefix("--") {
                if name.is_empty() || long.is_some() {
                    return Err(invalid());
                }
                long = Some(name.to_string());
            } else if let Some(flag) = token.strip_prefix('-') {
                let mut chars = flag.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if short.is_none() => short = Some(c),
                    _ => return Err(invalid()),
                }
            } else if token.starts_with('<') && token.ends_with('>') {
                arity = ValueArity::Required;
            } else if token.starts_with('[') && token.ends_with(']') {
                arity = ValueArity::Optional;
            } else {
                return Err(invalid());
            }
        }

        Ok(Self {
            long: long.ok_or_else(invalid)?,
            short,
            arity,
            description: None,
        })
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn arity(&self) -> ValueArity {
        self.arity
    }

    pub fn is_required(&self) -> bool {
        self.arity == ValueArity::Required
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Constraint applied to the members of an [`OptionSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetPolicy {
    ExactlyOne,
    AtMostOne,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSet {
    members: Vec<String>,
    policy: SetPolicy,
}

impl OptionSet {
    pub fn exactly_one<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            policy: SetPolicy::ExactlyOne,
        }
    }

    pub fn at_most_one<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            policy: SetPolicy::AtMostOne,
        }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn policy(&self) -> SetPolicy {
        self.policy
    }
}

/// Asynchronous predicate over parsed arguments.
///
/// Returns `Err(message)` to reject the invocation. Must not depend on the
/// order other validators ran in beyond what registration order guarantees.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, args: &ParsedArgs) -> Result<(), String>;
}

/// Adapts a plain closure into a [`Validator`].
pub struct FnValidator<F>(pub F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(&ParsedArgs) -> Result<(), String> + Send + Sync,
{
    async fn validate(&self, args: &ParsedArgs) -> Result<(), String> {
        (self.0)(args)
    }
}

/// Projects parsed arguments into telemetry properties.
pub type TelemetryProjection = Box<dyn Fn(&ParsedArgs, &mut Map<String, Value>) + Send + Sync>;

/// Options every command accepts.
const GLOBAL_OPTIONS: [&str; 3] = ["--debug", "--verbose", "-o, --output [output]"];

/// Immutable description of one command.
pub struct CommandSpec {
    name: String,
    description: String,
    options: Vec<OptionDeclaration>,
    option_sets: Vec<OptionSet>,
    validators: Vec<Arc<dyn Validator>>,
    telemetry: Vec<TelemetryProjection>,
    default_properties: Option<Vec<String>>,
    destructive: bool,
}

impl std::fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("option_sets", &self.option_sets)
            .field("validators", &self.validators.len())
            .field("destructive", &self.destructive)
            .finish()
    }
}

impl CommandSpec {
    pub fn builder(name: impl Into<String>, description: impl Into<String>) -> CommandSpecBuilder {
        CommandSpecBuilder::new(name, description)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn options(&self) -> &[OptionDeclaration] {
        &self.options
    }

    pub fn option(&self, long: &str) -> Option<&OptionDeclaration> {
        self.options.iter().find(|o| o.long == long)
    }

    pub fn option_sets(&self) -> &[OptionSet] {
        &self.option_sets
    }

    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    pub fn default_properties(&self) -> Option<&[String]> {
        self.default_properties.as_deref()
    }

    /// Destructive commands pass the confirmation gate before their action.
    pub fn is_destructive(&self) -> bool {
        self.destructive
    }

    /// Run every telemetry projection in registration order.
    pub fn telemetry_properties(&self, args: &ParsedArgs) -> Map<String, Value> {
        let mut properties = Map::new();
        for project in &self.telemetry {
            project(args, &mut properties);
        }
        properties
    }
}

/// Accumulates the initializer stages of a command and checks them once at
/// [`build`](CommandSpecBuilder::build).
pub struct CommandSpecBuilder {
    spec: CommandSpec,
    errors: Vec<SpecError>,
}

impl CommandSpecBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut builder = Self {
            spec: CommandSpec {
                name: name.into(),
                description: description.into(),
                options: Vec::new(),
                option_sets: Vec::new(),
                validators: Vec::new(),
                telemetry: Vec::new(),
                default_properties: None,
                destructive: false,
            },
            errors: Vec::new(),
        };
        for syntax in GLOBAL_OPTIONS {
            builder = builder.option(syntax, None);
        }
        builder
    }

    fn option(mut self, syntax: &str, description: Option<&str>) -> Self {
        match OptionDeclaration::parse(syntax) {
            Ok(mut declaration) => {
                if let Some(description) = description {
                    declaration = declaration.describe(description);
                }
                self.push_option(declaration);
            }
            Err(e) => self.errors.push(e),
        }
        self
    }

    fn push_option(&mut self, declaration: OptionDeclaration) {
        let clash = self.spec.options.iter().any(|existing| {
            existing.long == declaration.long
                || (declaration.short.is_some() && existing.short == declaration.short)
        });
        if clash {
            self.errors.push(SpecError::DuplicateOption {
                command: self.spec.name.clone(),
                option: declaration.long.clone(),
            });
            return;
        }
        self.spec.options.push(declaration);
    }

    /// Declare options from `(syntax, description)` pairs.
    pub fn declare(mut self, options: &[(&str, &str)]) -> Self {
        for (syntax, description) in options {
            self = self.option(syntax, Some(description));
        }
        self
    }

    pub fn declare_sets(mut self, sets: impl IntoIterator<Item = OptionSet>) -> Self {
        self.spec.option_sets.extend(sets);
        self
    }

    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.spec.validators.push(validator);
        self
    }

    /// Register a synchronous check as a validator.
    pub fn validate_with<F>(self, check: F) -> Self
    where
        F: Fn(&ParsedArgs) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validator(Arc::new(FnValidator(check)))
    }

    pub fn telemetry<F>(mut self, projection: F) -> Self
    where
        F: Fn(&ParsedArgs, &mut Map<String, Value>) + Send + Sync + 'static,
    {
        self.spec.telemetry.push(Box::new(projection));
        self
    }

    /// Record whether each named option was supplied.
    pub fn track_presence(self, names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.telemetry(move |args, properties| {
            for name in &names {
                properties.insert(name.clone(), Value::Bool(args.is_present(name)));
            }
        })
    }

    pub fn default_properties(mut self, properties: &[&str]) -> Self {
        self.spec.default_properties = Some(properties.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Mark the command destructive and accept `--confirm` to skip the prompt.
    pub fn destructive(mut self) -> Self {
        self.spec.destructive = true;
        self.option("--confirm", Some("Don't prompt for confirmation"))
    }

    pub fn build(self) -> Result<CommandSpec, SpecError> {
        let Self { spec, errors } = self;
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }

        let declared: HashSet<&str> = spec.options.iter().map(|o| o.long.as_str()).collect();
        for set in &spec.option_sets {
            if set.members.len() < 2 {
                return Err(SpecError::UndersizedSet {
                    command: spec.name.clone(),
                    members: set.members.clone(),
                });
            }
            if let Some(unknown) = set.members.iter().find(|m| !declared.contains(m.as_str())) {
                return Err(SpecError::UnknownSetMember {
                    command: spec.name.clone(),
                    option: unknown.clone(),
                });
            }
        }

        Ok(spec)
    }
}
