//! Errors returned by the mutating operations of the `Acl`.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or changing an `Acl`. Queries never fail.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Duplicate role: {0}")]
    DuplicateRole(String),

    #[error("Duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("Unknown parent: {0}")]
    UnknownParent(String),

    /// A role lookup, removal or rule definition named an unregistered role.
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    /// A resource lookup, removal or rule definition named an unregistered resource.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Invalid rule type: {0:?} (expected \"allow\" or \"deny\")")]
    InvalidRuleType(String),

    #[error("Invalid rule operation: {0:?} (expected \"add\" or \"remove\")")]
    InvalidOperation(String),

    /// A configured rule refers to an assertion that was never registered.
    #[error("Unknown assertion: {0}")]
    UnknownAssertion(String),
} // enum Error


// Tests //////////////////////////////////////////////////////////////////////////////////////////


#[cfg(test)]
mod tests {

    use super::*;
    use test_env_log::test;

    #[test]
    fn display() {
        assert_eq!(Error::DuplicateRole(String::from("guest")).to_string(), "Duplicate role: guest");
        assert_eq!(Error::UnknownParent(String::from("staff")).to_string(), "Unknown parent: staff");
        assert_eq!(
            Error::InvalidRuleType(String::from("grant")).to_string(),
            "Invalid rule type: \"grant\" (expected \"allow\" or \"deny\")"
        );
    } // display

} // mod tests
