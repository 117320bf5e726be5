use std::{error::Error, sync::Arc};

use ai_llm_service::{OpenAiService, config_openrouter_report, telemetry};
use api::core::app_state::AppState;
use report_pipeline::{PipelineConfig, ReportPipeline, ReportRegistry};
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env is optional; real env vars win.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::app_layer())
        .with(telemetry::layer())
        .try_init()?;

    let llm_cfg = config_openrouter_report()?;
    let model = OpenAiService::new(llm_cfg)?;
    info!(model = model.model(), "llm client ready");

    let pipeline_cfg = PipelineConfig::from_env();
    info!(
        template = %pipeline_cfg.template_path.display(),
        max_upload_bytes = pipeline_cfg.max_upload_bytes,
        model_timeout = ?pipeline_cfg.model_timeout,
        "pipeline configured"
    );

    let registry = Arc::new(ReportRegistry::new());
    let pipeline = ReportPipeline::new(pipeline_cfg, Arc::new(model), registry);

    api::start(Arc::new(AppState::new(pipeline))).await?;

    Ok(())
}
