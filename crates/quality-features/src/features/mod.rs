//! Concrete quality feature modules
//!
//! Every module partitions the image with [`BlockGrid`](crate::blocks::BlockGrid)
//! and therefore shares its partial-block policy.

mod block_statistic;
mod frequency_domain;
mod local_contrast;
mod mu;
mod region_of_interest;

pub use block_statistic::{BlockStatisticConfig, BlockStatisticFeature};
pub use frequency_domain::{FrequencyDomainConfig, FrequencyDomainFeature};
pub use local_contrast::{LocalContrastConfig, LocalContrastFeature};
pub use mu::{MuConfig, MuFeature};
pub use region_of_interest::{RegionOfInterestConfig, RegionOfInterestFeature};
