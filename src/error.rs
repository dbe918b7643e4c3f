//! Unified error types for the HomeLink client.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! host loop's error handling uniform. All variants are `Copy` so they can be
//! cheaply passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level client error
// ---------------------------------------------------------------------------

/// Every fallible operation in the client funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An entity declaration was rejected by the registry.
    Declare(DeclareError),
    /// A state write did not match the entity's kind.
    State(StateError),
    /// An executor command frame could not be decoded.
    Command(CommandError),
    /// The serial frame decoder rejected the byte stream.
    Frame(FrameError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Declare(e) => write!(f, "declare: {e}"),
            Self::State(e) => write!(f, "state: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Declaration errors
// ---------------------------------------------------------------------------

/// Rejections raised at the registry boundary before an entity is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclareError {
    /// Entity name is the empty string.
    EmptyName,
    /// Actuator declared with a zero capability level.
    ZeroLevel,
    /// Name is already declared with the other entity kind.
    KindConflict,
    /// The registry's fixed entity budget is exhausted.
    RegistryFull,
}

impl fmt::Display for DeclareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "entity name is empty"),
            Self::ZeroLevel => write!(f, "actuator level must be non-zero"),
            Self::KindConflict => write!(f, "name already declared with the other kind"),
            Self::RegistryFull => write!(f, "registry is full"),
        }
    }
}

impl From<DeclareError> for Error {
    fn from(e: DeclareError) -> Self {
        Self::Declare(e)
    }
}

// ---------------------------------------------------------------------------
// State errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    /// No entity is declared under that name.
    UnknownEntity,
    /// Integer state offered for a sensor, or text state for an actuator.
    KindMismatch,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity => write!(f, "no such entity"),
            Self::KindMismatch => write!(f, "state value does not match entity kind"),
        }
    }
}

impl From<StateError> for Error {
    fn from(e: StateError) -> Self {
        Self::State(e)
    }
}

// ---------------------------------------------------------------------------
// Executor command errors
// ---------------------------------------------------------------------------

/// Failures while decoding a command frame from the executor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Frame is not a valid JSON object.
    Malformed,
    /// A required field is absent or has the wrong JSON type.
    MissingField(&'static str),
    /// The `command` field names no supported operation.
    UnknownCommand,
    /// The `type` field is neither `actuator` nor `sensor`.
    UnknownEntityKind,
    /// Sensor declared with a `data_type` outside the supported set.
    UnsupportedDataType,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed command JSON"),
            Self::MissingField(field) => write!(f, "missing or invalid field '{field}'"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::UnknownEntityKind => write!(f, "unknown entity type"),
            Self::UnsupportedDataType => write!(f, "unsupported sensor data_type"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Frame decoder errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// An in-flight frame outgrew the fixed accumulation buffer.
    /// The decoder resets and discards the frame.
    Overflow,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "command frame exceeds buffer capacity"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
