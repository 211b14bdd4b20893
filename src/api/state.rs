use crate::calculate::StageAggregator;
use crate::config::AnalysisConfig;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: StageAggregator,
    pub analysis: AnalysisConfig,
}
