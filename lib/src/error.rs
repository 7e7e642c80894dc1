//! Error types shared by the filtering core and its collaborators

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Image is empty: {rows}x{cols}")]
    EmptyImage { rows: usize, cols: usize },

    #[error("Unsupported channel count: {0} (expected 1, 3 or 4)")]
    UnsupportedChannelCount(usize),

    #[error("Image not readable: {0}")]
    ImageNotReadable(String),

    #[error("Image not writable: {0}")]
    ImageNotWritable(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl FilterError {
    /// Shape mismatch between two `(rows, cols)` pairs
    pub fn shape_mismatch(what: &str, expected: (usize, usize), actual: (usize, usize)) -> Self {
        FilterError::InvalidShape(format!(
            "{} is {}x{}, expected {}x{}",
            what, actual.0, actual.1, expected.0, expected.1
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FilterError::shape_mismatch("mask", (4, 4), (2, 3));
        assert_eq!(err.to_string(), "Invalid shape: mask is 2x3, expected 4x4");

        let err = FilterError::EmptyImage { rows: 0, cols: 7 };
        assert_eq!(err.to_string(), "Image is empty: 0x7");

        let err = FilterError::UnsupportedChannelCount(2);
        assert!(err.to_string().contains("2"));
    }
}
