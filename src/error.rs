use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::io;

use crate::cli::CliError;
use crate::descriptor::DescriptorError;

/// Broken invariant of the calling compiler pass.
///
/// None of these are caused by malformed user input: they mean the type graph
/// or the configuration handed to the mangler is inconsistent. The mangler
/// stops at the first one and never returns a partial symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    /// A primitive type reached the encoder without a registered tag.
    MissingPrimitiveTag { primitive: String },
    /// A primitive type was given two different tags.
    ConflictingPrimitiveTag {
        primitive: String,
        existing: String,
        requested: String,
    },
    /// A plain entity name was registered twice in the substitution registry.
    DuplicateNameSubstitution { name: String },
    /// More fragments than the one-digit back-reference scheme can address.
    CompressionTableOverflow { fragment: String, capacity: usize },
    /// A vtable owner did not produce an `N ... E` composite name.
    VtableWithoutComposite { class: String },
    /// A method type was used where a value type is required.
    MethodTypeAsValue,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractViolation::MissingPrimitiveTag { primitive } => write!(
                f,
                "primitive type `{primitive}` has no mangled tag; register one before mangling"
            ),
            ContractViolation::ConflictingPrimitiveTag {
                primitive,
                existing,
                requested,
            } => write!(
                f,
                "primitive type `{primitive}` already mangles as `{existing}`, refusing `{requested}`"
            ),
            ContractViolation::DuplicateNameSubstitution { name } => {
                write!(f, "more than 1 substitution for name '{name}'")
            }
            ContractViolation::CompressionTableOverflow { fragment, capacity } => write!(
                f,
                "compression table is full ({capacity} entries) while inserting `{fragment}`"
            ),
            ContractViolation::VtableWithoutComposite { class } => {
                write!(f, "vtable name for `{class}` did not open a nested name")
            }
            ContractViolation::MethodTypeAsValue => {
                f.write_str("method type used as a parameter, result or array element")
            }
        }
    }
}

/// Unified error type for the mangler and its command line driver.
#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Cli(CliError),
    Descriptor(DescriptorError),
    Config {
        message: String,
    },
    Contract {
        violation: ContractViolation,
        backtrace: Option<Backtrace>,
    },
}

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Construct a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Construct a contract violation, capturing a backtrace in debug builds.
    pub fn contract(violation: ContractViolation) -> Self {
        Self::Contract {
            violation,
            backtrace: capture_backtrace(),
        }
    }

    /// The violated contract, if this error is one.
    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            Error::Contract { violation, .. } => Some(violation),
            _ => None,
        }
    }

    /// Return the captured backtrace, if any.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            Error::Contract { backtrace, .. } => backtrace.as_ref(),
            _ => None,
        }
    }
}

fn capture_backtrace() -> Option<Backtrace> {
    if cfg!(debug_assertions) {
        Some(Backtrace::force_capture())
    } else {
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::Cli(err) => write!(f, "{err}"),
            Error::Descriptor(err) => write!(f, "descriptor error: {err}"),
            Error::Config { message } => write!(f, "configuration error: {message}"),
            Error::Contract { violation, .. } => write!(f, "fatal: {violation}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Cli(err) => Some(err),
            Error::Descriptor(err) => Some(err),
            Error::Config { .. } | Error::Contract { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Io(error)
    }
}

impl From<CliError> for Error {
    fn from(error: CliError) -> Self {
        Error::Cli(error)
    }
}

impl From<DescriptorError> for Error {
    fn from(error: DescriptorError) -> Self {
        Error::Descriptor(error)
    }
}

impl From<ContractViolation> for Error {
    fn from(violation: ContractViolation) -> Self {
        Error::contract(violation)
    }
}
