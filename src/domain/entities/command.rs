use std::collections::HashMap;

/// Represents a bot command
pub struct Command {
    pub name: String,
    pub aliases: Vec<String>,
    pub handler: Option<CommandHandler>,
}

/// Command handler function type
pub type CommandHandler = Box<dyn Fn(&crate::domain::entities::Message) -> String + Send + Sync>;

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            handler: None,
        }
    }

    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&crate::domain::entities::Message) -> String + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn matches(&self, input: &str) -> bool {
        let input_lower = input.to_lowercase();
        self.name.to_lowercase() == input_lower ||
            self.aliases.iter().any(|a| a.to_lowercase() == input_lower)
    }
}

/// Command registry for managing available commands
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Command>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) {
        self.commands.insert(command.name.clone(), command);
    }

    pub fn find(&self, input: &str) -> Option<&Command> {
        self.commands.values().find(|c| c.matches(input))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
