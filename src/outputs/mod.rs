//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes single-source and aggregate documents
//!
//! # Output Structure
//!
//! ```text
//! ./
//! ├── all_latest3.json                # `all`: every source that succeeded
//! └── public/
//!     └── lao_santipap_latest3.json   # `single --lottery lao_santipap`
//! ```

pub mod json;

use std::path::PathBuf;

/// Default output path of the aggregate run.
pub const AGGREGATE_OUTPUT: &str = "all_latest3.json";

/// Default output path of a single-source run for `key`.
pub fn single_output_path(key: &str) -> PathBuf {
    PathBuf::from("public").join(format!("{key}_latest3.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_output_path() {
        assert_eq!(
            single_output_path("lao_santipap"),
            PathBuf::from("public/lao_santipap_latest3.json")
        );
    }
}
