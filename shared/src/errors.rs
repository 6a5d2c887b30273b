//! Shared error types for the SV console

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Unknown selection kind: {input}")]
    UnknownSelectionKind { input: String },

    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}

pub type SharedResult<T> = Result<T, SharedError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::validate_lang;
    use crate::types::SelectionKind;

    #[test]
    fn test_errors_name_the_rejected_input() {
        let error = "poles".parse::<SelectionKind>().unwrap_err();
        assert_eq!(error.to_string(), "Unknown selection kind: poles");

        let error = validate_lang("e n").unwrap_err();
        assert!(matches!(error, SharedError::InvalidConfig { ref field, .. } if field == "lang"));
        assert_eq!(error.to_string(), "Invalid configuration: lang = e n");
    }
}
