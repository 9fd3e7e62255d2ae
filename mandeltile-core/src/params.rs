use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Parameters controlling escape-time iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractalParams {
    /// Iteration cap. A point still bounded after this many steps is
    /// reported as interior.
    pub max_iterations: u32,
}

impl FractalParams {
    pub const DEFAULT_MAX_ITERATIONS: u32 = 1024;

    pub fn new(max_iterations: u32) -> crate::Result<Self> {
        if max_iterations < 1 {
            return Err(CoreError::InvalidMaxIterations(max_iterations));
        }
        Ok(Self { max_iterations })
    }

    /// Return a copy with a different `max_iterations` value.
    pub fn with_max_iterations(self, max_iterations: u32) -> crate::Result<Self> {
        Self::new(max_iterations)
    }
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params() {
        assert_eq!(FractalParams::default().max_iterations, 1024);
    }

    #[test]
    fn invalid_max_iterations() {
        assert_eq!(
            FractalParams::new(0),
            Err(CoreError::InvalidMaxIterations(0))
        );
        assert!(FractalParams::default().with_max_iterations(0).is_err());
    }

    #[test]
    fn deserializes_from_json() {
        let p: FractalParams = serde_json::from_str(r#"{"max_iterations": 64}"#).unwrap();
        assert_eq!(p.max_iterations, 64);
    }
}
