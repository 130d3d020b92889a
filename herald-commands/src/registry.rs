//! Command registry
//!
//! Registrations are kept in insertion order; matching walks them in that
//! order and the first match wins. Overlapping rules are not detected.

use crate::command::{CommandArgs, CommandFactory};
use crate::definition::CommandDefinition;
use crate::schema::resolve_interaction;
use crate::source::PermissionSource;
use herald_context::{Interaction, Message};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A registered command.
pub struct CommandRegistration {
    /// Instance factory
    pub factory: Arc<dyn CommandFactory>,

    /// Requirement source, `None` for unrestricted commands
    pub permissions: Option<Arc<dyn PermissionSource>>,

    /// Outcome of the registration-pass permission check
    pub enabled_by_default: bool,
}

impl std::fmt::Debug for CommandRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistration")
            .field("name", &self.name())
            .field("restricted", &self.permissions.is_some())
            .field("enabled_by_default", &self.enabled_by_default)
            .finish()
    }
}

impl CommandRegistration {
    /// The command's definition.
    pub fn definition(&self) -> &CommandDefinition {
        self.factory.definition()
    }

    /// The command's name.
    pub fn name(&self) -> &str {
        &self.definition().name
    }
}

/// A registration matched by an input, with its arguments.
#[derive(Debug, Clone)]
pub struct CommandMatch {
    /// Matched registration
    pub registration: Arc<CommandRegistration>,

    /// Extracted arguments
    pub args: CommandArgs,
}

/// Ordered, shareable set of registrations.
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: Arc<RwLock<Vec<Arc<CommandRegistration>>>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration.
    pub async fn insert(&self, registration: CommandRegistration) -> Arc<CommandRegistration> {
        let registration = Arc::new(registration);
        let mut commands = self.commands.write().await;

        if commands.iter().any(|existing| existing.name() == registration.name()) {
            tracing::warn!(
                command = registration.name(),
                "Duplicate command name registered, earlier registration matches first"
            );
        }

        if let Some(schema) = &registration.definition().interaction {
            if schema.name != registration.name() {
                tracing::warn!(
                    command = registration.name(),
                    schema = %schema.name,
                    "Interaction schema name differs from command name, interactions match the schema name"
                );
            }
        }

        commands.push(registration.clone());
        registration
    }

    /// Find the first registration whose matching rule accepts the message.
    pub async fn match_message(&self, message: &Message) -> Option<CommandMatch> {
        let commands = self.commands.read().await;
        commands.iter().find_map(|registration| {
            let matching = registration.definition().matching.as_ref()?;
            if !matching.matches(&message.content) {
                return None;
            }
            Some(CommandMatch {
                registration: registration.clone(),
                args: CommandArgs::Text(matching.arguments(&message.content)),
            })
        })
    }

    /// Find the first registration whose schema declares the interaction.
    ///
    /// The interaction's command name is compared with the schema name, which
    /// is the name the platform knows the command by.
    pub async fn match_interaction(&self, interaction: &Interaction) -> Option<CommandMatch> {
        let resolved = resolve_interaction(interaction);
        let commands = self.commands.read().await;
        let registration = commands.iter().find(|registration| {
            registration.definition().interaction.as_ref().is_some_and(|schema| {
                schema.name == interaction.command_name && schema.contains_path(resolved.path.as_slice())
            })
        })?;

        Some(CommandMatch {
            registration: registration.clone(),
            args: CommandArgs::Interaction(resolved),
        })
    }

    /// Get a registration by name.
    pub async fn get(&self, name: &str) -> Option<Arc<CommandRegistration>> {
        let commands = self.commands.read().await;
        commands.iter().find(|registration| registration.name() == name).cloned()
    }

    /// All definitions in registration order.
    pub async fn list(&self) -> Vec<CommandDefinition> {
        let commands = self.commands.read().await;
        commands.iter().map(|registration| registration.definition().clone()).collect()
    }

    /// Number of registrations.
    pub async fn len(&self) -> usize {
        self.commands.read().await.len()
    }

    /// Check if nothing is registered.
    pub async fn is_empty(&self) -> bool {
        self.commands.read().await.is_empty()
    }
}
