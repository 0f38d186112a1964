#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/exposure/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod weights;
pub use weights::{NormalizedWeights, WeightNormalizer, latest_prices};

mod returns;
pub use returns::{asset_returns, portfolio_returns};

mod align;
pub use align::{AlignedObservation, AlignedSample, align};

mod regression;
pub use regression::{RegressionConfig, RegressionResult, Term, TermEstimate, ThreeFactorModel};

mod report;
pub use report::RegressionReport;

mod pipeline;
pub use pipeline::{ExposurePipeline, history_window};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use exposure_traits::{FactorModel, PriceSource};

    pub use super::{ExposurePipeline, ModelError, RegressionResult, ThreeFactorModel, WeightNormalizer};
}
