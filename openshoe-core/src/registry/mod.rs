//! Table registry
//!
//! ID-indexed lookup of commands, processing steps and reportable states.
//! Tables are filled once at startup and are read-only afterwards; every
//! lookup is a single array index.

pub mod commands;
pub mod idset;
pub mod states;
pub mod steps;

pub use commands::{Command, CommandDescriptor, CommandTable, MAX_COMMAND_FIELDS, STANDARD_COMMANDS};
pub use idset::IdSet;
pub use states::{StateDescriptor, StateTable, StateVariable, STANDARD_STATES};
pub use steps::{ProcessingStep, StepDescriptor, StepTable, STANDARD_STEPS};

/// Rejected table registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Command ID registered twice
    DuplicateCommand(u8),
    /// Step ID registered twice
    DuplicateStep(u8),
    /// State ID registered twice
    DuplicateState(u8),
    /// Field widths do not add up to the payload length
    FieldLayout(u8),
    /// Command frame would not fit in the receive buffer
    PayloadTooLarge(u8),
    /// Declared state size differs from the encoded size
    StateSize(u8),
}

/// All three lookup tables
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: CommandTable,
    steps: StepTable,
    states: StateTable,
}

impl Registry {
    /// Create a registry with empty tables
    pub const fn new() -> Self {
        Self {
            commands: CommandTable::new(),
            steps: StepTable::new(),
            states: StateTable::new(),
        }
    }

    /// Registry holding the standard command, step and state sets
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register_commands(STANDARD_COMMANDS)?;
        registry.register_steps(STANDARD_STEPS)?;
        registry.register_states(STANDARD_STATES)?;
        log_info!(
            "registry: {} commands, {} steps, {} states",
            registry.commands.len(),
            registry.steps.len(),
            registry.states.len()
        );
        Ok(registry)
    }

    pub fn register_commands(
        &mut self,
        descriptors: &[CommandDescriptor],
    ) -> Result<(), RegistryError> {
        self.commands.register(descriptors)
    }

    pub fn register_steps(&mut self, descriptors: &[StepDescriptor]) -> Result<(), RegistryError> {
        self.steps.register(descriptors)
    }

    pub fn register_states(&mut self, descriptors: &[StateDescriptor]) -> Result<(), RegistryError> {
        self.states.register(descriptors)
    }

    pub fn lookup_command(&self, id: u8) -> Option<CommandDescriptor> {
        self.commands.lookup(id)
    }

    pub fn lookup_step(&self, id: u8) -> Option<StepDescriptor> {
        self.steps.lookup(id)
    }

    pub fn lookup_state(&self, id: u8) -> Option<StateDescriptor> {
        self.states.lookup(id)
    }

    /// Command table, as consulted by the receive state machine
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// State table, as consulted by the output multiplexer and the report
    pub fn states(&self) -> &StateTable {
        &self.states
    }
}
