#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/exposure/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod factors;
pub use factors::{load_factor_file, parse_factor_csv};

mod positions;
pub use positions::{
    ColumnMapping, canonicalize_positions, read_positions, read_sheet_export, validate_positions,
    write_position_snapshots,
};

mod holdings;
pub use holdings::{read_holdings, read_weights, write_holdings};

mod config;
pub use config::{ExposureConfig, OptionsConfig, PathsConfig};

mod frame;
pub use frame::{holdings_frame, top_holdings};

mod yahoo;
pub use yahoo::YahooPriceSource;

mod error;
pub use error::DataError;
