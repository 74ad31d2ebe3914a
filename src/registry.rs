//! Command registry: name to command, fixed after startup.

use crate::error::SpecError;
use crate::executor::Command;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command.
    pub fn with_builtin() -> Result<Self, SpecError> {
        let mut registry = Self::new();
        crate::commands::register_all(&mut registry)?;
        Ok(registry)
    }

    pub fn register(&mut self, command: Arc<dyn Command>) -> Result<(), SpecError> {
        let name = command.spec().name().to_string();
        if self.commands.contains_key(&name) {
            return Err(SpecError::DuplicateCommand(name));
        }
        self.commands.insert(name, command);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }
}
