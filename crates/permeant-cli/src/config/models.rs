use permeant::engine::config::PipelineConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub max_batch_size: usize,
}
