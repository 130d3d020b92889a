//! Interaction schemas and option resolution
//!
//! A command's interaction schema is built elsewhere and handed in as a tree.
//! Resolution walks an incoming interaction's option tree down the
//! sub-command path and flattens the leaf's options into name/value pairs.

use herald_context::{Interaction, InteractionOption, OptionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One option declared by an interaction schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaOption {
    /// Option name
    pub name: String,

    /// Option description
    pub description: String,

    /// Option type
    pub kind: OptionKind,

    /// Whether the option must be supplied
    #[serde(default)]
    pub required: bool,

    /// Nested options (sub-commands and groups only)
    #[serde(default)]
    pub options: Vec<SchemaOption>,
}

impl SchemaOption {
    /// Create an option of any kind.
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            options: Vec::new(),
        }
    }

    /// Create a sub-command.
    pub fn sub_command(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::SubCommand)
    }

    /// Create a sub-command group.
    pub fn group(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionKind::SubCommandGroup)
    }

    /// Mark the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Add a nested option.
    pub fn with_option(mut self, option: SchemaOption) -> Self {
        self.options.push(option);
        self
    }
}

/// Structured command schema.
///
/// # Examples
///
/// ```
/// use herald_commands::{InteractionSchema, SchemaOption};
/// use herald_context::OptionKind;
///
/// let schema = InteractionSchema::new("music", "Music controls")
///     .with_option(
///         SchemaOption::sub_command("play", "Play a song")
///             .with_option(SchemaOption::new("song", "Song to play", OptionKind::String).required()),
///     )
///     .with_option(SchemaOption::sub_command("stop", "Stop playback"));
///
/// assert!(schema.contains_path(&["play"]));
/// assert!(!schema.contains_path(&["pause"]));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionSchema {
    /// Top-level command name
    pub name: String,

    /// Command description
    pub description: String,

    /// Top-level options
    #[serde(default)]
    pub options: Vec<SchemaOption>,
}

impl InteractionSchema {
    /// Create a schema with no options.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            options: Vec::new(),
        }
    }

    /// Add a top-level option.
    pub fn with_option(mut self, option: SchemaOption) -> Self {
        self.options.push(option);
        self
    }

    /// Check whether the schema declares the given sub-command path.
    ///
    /// An empty path is contained when the schema has no top-level
    /// sub-commands.
    pub fn contains_path<S: AsRef<str>>(&self, path: &[S]) -> bool {
        let mut level = &self.options;
        for segment in path {
            let next = level
                .iter()
                .find(|option| option.kind.is_sub_command() && option.name == segment.as_ref());
            match next {
                Some(option) => level = &option.options,
                None => return false,
            }
        }
        !level.iter().any(|option| option.kind.is_sub_command())
    }
}

/// Interaction flattened to its sub-command path and option values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResolvedInteraction {
    /// Top-level command name
    pub command_name: String,

    /// Sub-command path, outermost first
    pub path: Vec<String>,

    /// Leaf option values by name
    pub options: BTreeMap<String, serde_json::Value>,
}

impl ResolvedInteraction {
    /// Get an option value.
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.options.get(name)
    }

    /// Get a string option.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.as_str())
    }

    /// Get an integer option.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|value| value.as_i64())
    }

    /// Get a boolean option.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|value| value.as_bool())
    }

    /// The innermost sub-command, if any.
    pub fn sub_command(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Command name and path joined by spaces, e.g. `music queue add`.
    pub fn full_name(&self) -> String {
        std::iter::once(self.command_name.as_str())
            .chain(self.path.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Resolve an interaction's sub-command path and leaf options.
///
/// Descends through the first sub-command or group option at each level
/// until reaching a level without one.
pub fn resolve_interaction(interaction: &Interaction) -> ResolvedInteraction {
    let mut path = Vec::new();
    let mut level: &[InteractionOption] = &interaction.options;

    while let Some(nested) = level.iter().find(|option| option.kind.is_sub_command()) {
        path.push(nested.name.clone());
        level = &nested.options;
    }

    let options = level
        .iter()
        .filter_map(|option| option.value.clone().map(|value| (option.name.clone(), value)))
        .collect();

    ResolvedInteraction {
        command_name: interaction.command_name.clone(),
        path,
        options,
    }
}
