//! Domain types for HybridAlpha

pub mod bar;
pub mod portfolio;
pub mod position;
pub mod regime;
pub mod signal;

pub use bar::{closes, Bar};
pub use portfolio::{PortfolioDay, Trade};
pub use position::Position;
pub use regime::{RegimeLabel, RegimeRecord};
pub use signal::{
    AlphaScoreRow, AlphaSignalRow, Contributions, ModelPrediction, PredictionRow,
    StateProbabilities, NUM_STATES,
};
