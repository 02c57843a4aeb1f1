//! HybridAlpha Core — regime classification, signal fusion, volatility
//! sizing, and a no-lookahead daily backtest.
//!
//! Every stage is a pure function over immutable inputs:
//! - `regime`: benchmark bars → one regime label per date
//! - `alphas`: instrument bars → four reference alpha signals
//! - `combiner`: signals + model probabilities + regime → bounded alpha score
//! - `sizing`: alpha score + trailing realized vol → capped target weight
//! - `backtest`: weights + closes → daily portfolio series and trade ledger

pub mod alphas;
pub mod backtest;
pub mod combiner;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod regime;
pub mod risk;
pub mod sizing;

pub use error::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner moves across rayon workers
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::RegimeRecord>();
        require_sync::<domain::RegimeRecord>();
        require_send::<domain::AlphaSignalRow>();
        require_sync::<domain::AlphaSignalRow>();
        require_send::<domain::ModelPrediction>();
        require_sync::<domain::ModelPrediction>();
        require_send::<domain::AlphaScoreRow>();
        require_sync::<domain::AlphaScoreRow>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::PortfolioDay>();
        require_sync::<domain::PortfolioDay>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();

        require_send::<regime::RuleBasedRegime>();
        require_sync::<regime::RuleBasedRegime>();
        require_send::<combiner::SignalCombiner>();
        require_sync::<combiner::SignalCombiner>();
        require_send::<sizing::VolTargetSizer>();
        require_sync::<sizing::VolTargetSizer>();
        require_send::<sizing::RealizedVolTable>();
        require_sync::<sizing::RealizedVolTable>();
        require_send::<data::ParquetCache>();
        require_sync::<data::ParquetCache>();
    }

    /// Regime models and sizers are usable as trait objects.
    #[test]
    fn stage_traits_are_object_safe() {
        let model: Box<dyn regime::RegimeModel> =
            Box::new(regime::RuleBasedRegime::new(regime::RegimeParams::default()).unwrap());
        assert_eq!(model.name(), "rule_based");

        let sizer: Box<dyn sizing::WeightSizer> = Box::new(sizing::VolTargetSizer::new(0.15, 0.1));
        assert_eq!(sizer.name(), "vol_target");
    }
}
