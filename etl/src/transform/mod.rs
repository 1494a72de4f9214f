//! Transformation stages.
//!
//! Stages run in a fixed order, each taking the previous stage's dataset
//! and returning a new one:
//!
//! ```text
//! normalize → impute → features → prune
//! ```

pub mod features;
pub mod impute;
pub mod normalize;
pub mod prune;
pub mod stats;

pub use features::{add_features, AGE_GROUP_LABELS, FREQUENCY_DAYS};
pub use impute::impute_rating;
pub use normalize::normalize_columns;
pub use prune::drop_unused;

use tracing::info_span;

use crate::models::Dataset;

/// A pure dataset-to-dataset stage.
pub type Stage = fn(&Dataset) -> Dataset;

/// The transform stages in execution order.
pub const STAGES: [(&str, Stage); 4] = [
    ("normalize", normalize_columns),
    ("impute", impute_rating),
    ("features", add_features),
    ("prune", drop_unused),
];

/// Run every stage of [`STAGES`] in order.
pub fn transform(dataset: Dataset) -> Dataset {
    STAGES.iter().fold(dataset, |ds, (name, stage)| {
        let _span = info_span!("stage", stage = *name).entered();
        stage(&ds)
    })
}
