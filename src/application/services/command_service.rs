use crate::domain::entities::{Command, CommandRegistry, Message, Content};
use crate::application::errors::CommandError;

pub const HELP_TEXT: &str = "Give me an Instagram User, And I'll give you their Profile Picture";

/// Service for managing and executing commands
pub struct CommandService {
    registry: CommandRegistry,
    prefix: String,
}

impl CommandService {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            registry: CommandRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn register(&mut self, command: Command) {
        self.registry.register(command);
    }

    pub fn register_defaults(&mut self) {
        self.register(Command::new("help")
            .with_aliases(vec!["start".to_string()])
            .with_handler(|_| HELP_TEXT.to_string()));
    }

    pub fn handle(&self, message: &Message) -> Result<Option<String>, CommandError> {
        let Content::Command { name, .. } = &message.content else {
            return Ok(None);
        };

        // Find command (without prefix)
        let cmd = self.registry.find(name)
            .ok_or_else(|| CommandError::NotFound(name.clone()))?;

        // Execute handler
        Ok(cmd.handler.as_ref().map(|handler| handler(message)))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}
