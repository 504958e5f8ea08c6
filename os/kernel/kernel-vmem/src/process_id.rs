use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;
use core::str::FromStr;

/// Name of a process.
///
/// Non-empty and free of whitespace and `_`. Frame labels join the id, segment
/// and page with `_`, so a label always splits back into exactly three parts.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ProcessId(String);

impl ProcessId {
    /// # Errors
    /// [`ProcessIdError::Empty`] for an empty name, [`ProcessIdError::Whitespace`]
    /// if the name contains whitespace, [`ProcessIdError::Separator`] if it
    /// contains `_`.
    pub fn new(id: impl Into<String>) -> Result<Self, ProcessIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ProcessIdError::Empty);
        }
        if id.chars().any(char::is_whitespace) {
            return Err(ProcessIdError::Whitespace(id));
        }
        if id.contains('_') {
            return Err(ProcessIdError::Separator(id));
        }
        Ok(Self(id))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ProcessIdError {
    #[error("process id must not be empty")]
    Empty,
    #[error("process id {0:?} contains whitespace")]
    Whitespace(String),
    #[error("process id {0:?} contains the label separator '_'")]
    Separator(String),
}

impl Borrow<str> for ProcessId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ProcessId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProcessId {
    type Err = ProcessIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for ProcessId {
    type Error = ProcessIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Debug for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProcessId({:?})", self.0)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
