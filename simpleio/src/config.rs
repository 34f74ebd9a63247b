//! Program configuration used for usage and error messages.

use std::path::Path;

/// Name used when the program name cannot be found from the process arguments.
const DEFAULT_PROGRAM_NAME: &str = "program";

/// The configuration of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    program_name: String,
    usage: Option<String>,
}

impl Config {
    /// Create a configuration for the given program name.
    pub fn new(program_name: impl Into<String>) -> Self {
        Config {
            program_name: program_name.into(),
            usage: None,
        }
    }

    /// Create a configuration named after the invocation path of the current process.
    pub fn from_env() -> Self {
        let name = std::env::args_os()
            .next()
            .map(|arg0| program_name_from(&arg0.to_string_lossy()))
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.into());

        Config::new(name)
    }

    /// Set the argument part of the usage message, typically the argument names separated by
    /// spaces. For example, a `sleep` program would use `seconds` to produce
    /// `usage: sleep seconds`.
    pub fn with_usage(mut self, args: impl Into<String>) -> Self {
        self.usage = Some(args.into());
        self
    }

    /// Get the program name.
    #[inline(always)]
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Get the argument part of the usage message, if set.
    #[inline(always)]
    pub fn usage(&self) -> Option<&str> {
        self.usage.as_deref()
    }

    /// Build the usage message. The `fallback` arguments are used when no usage was set.
    pub fn usage_message(&self, fallback: &str) -> String {
        let args = self.usage().unwrap_or(fallback);
        let message = format!("usage: {} {}", self.program_name, args);

        message.trim_end().to_string()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::from_env()
    }
}

/// Extract the program name from an invocation path, i.e. its last component. The whole path is
/// used when it has no usable last component.
pub fn program_name_from(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
