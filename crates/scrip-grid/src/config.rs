//! Configuration for the SCRIP conversion pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::corners::CornerOptions;
use crate::error::{Result, ScripError};
use crate::scrip::{MaskPolicy, WriteOptions};
use crate::source::SourceVariables;

/// Default output file name.
pub const DEFAULT_OUTPUT: &str = "scrip_gaussian.nc";

/// Configuration for a single conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScripConfig {
    /// Source gridded NetCDF file.
    pub input: PathBuf,

    /// Destination SCRIP file. `None` computes the grid without writing it.
    pub output: Option<PathBuf>,

    /// Coordinate variable names in the source file.
    pub variables: SourceVariables,

    /// Reject grids where `nlon <= nlat`.
    pub require_nlon_gt_nlat: bool,

    pub mask_policy: MaskPolicy,

    /// Value of the `created_by` global attribute.
    pub created_by: String,
}

impl Default for ScripConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("sfcf000.nc"),
            output: Some(PathBuf::from(DEFAULT_OUTPUT)),
            variables: SourceVariables::default(),
            require_nlon_gt_nlat: false,
            mask_policy: MaskPolicy::Unchecked,
            created_by: "gaus2scrip".to_string(),
        }
    }
}

impl ScripConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GAUS2SCRIP_INPUT") {
            config.input = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("GAUS2SCRIP_OUTPUT") {
            config.output = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }

        if let Ok(val) = std::env::var("GAUS2SCRIP_LAT_VAR") {
            config.variables.lat = val;
        }

        if let Ok(val) = std::env::var("GAUS2SCRIP_LON_VAR") {
            config.variables.lon = val;
        }

        if let Ok(val) = std::env::var("GAUS2SCRIP_REQUIRE_NLON_GT_NLAT") {
            config.require_nlon_gt_nlat = parse_flag(&val);
        }

        if let Ok(val) = std::env::var("GAUS2SCRIP_STRICT_MASK") {
            if parse_flag(&val) {
                config.mask_policy = MaskPolicy::Strict;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.variables.lat.is_empty() || self.variables.lon.is_empty() {
            return Err(ScripError::Config(
                "coordinate variable names must not be empty".to_string(),
            ));
        }

        if self.output.as_deref() == Some(self.input.as_path()) {
            return Err(ScripError::Config(format!(
                "output {} would overwrite the input file",
                self.input.display()
            )));
        }

        Ok(())
    }

    pub fn corner_options(&self) -> CornerOptions {
        CornerOptions {
            require_nlon_gt_nlat: self.require_nlon_gt_nlat,
        }
    }

    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            created_by: self.created_by.clone(),
            mask_policy: self.mask_policy,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}
