use thiserror::Error;

/// Errors raised when applying a widget change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("Control '{control}' does not exist on the {tab} tab")]
    UnsupportedControl { tab: String, control: String },

    #[error("top_n {value} is not one of the offered choices {min}..={max}")]
    TopNOutOfRange { value: usize, min: usize, max: usize },
}

pub type ControlResult<T> = std::result::Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ControlError::UnsupportedControl {
            tab: "trend".to_string(),
            control: "top_n".to_string(),
        };
        assert_eq!(err.to_string(), "Control 'top_n' does not exist on the trend tab");

        let err = ControlError::TopNOutOfRange {
            value: 11,
            min: 3,
            max: 10,
        };
        assert!(err.to_string().contains("3..=10"));
    }
}
