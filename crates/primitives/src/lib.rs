#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/exposure/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::{Position, PositionSet, Symbol};

mod period;
pub use period::Period;

mod prices;
pub use prices::{PriceObservation, PriceRow, PriceTable};

mod returns;
pub use returns::{AssetReturns, PORTFOLIO_RETURN, ReturnSeries};

mod factor;
pub use factor::{FactorName, FactorRow, FactorTable};

mod weights;
pub use weights::{DEFAULT_WEIGHT_TOLERANCE, Holding, WeightMapping};

mod error;
pub use error::ValidationError;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
