use clap::Parser;
use modelview_visualization::{init_logging, run, Args, LoggingConfig, ViewerConfig};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = ViewerConfig::default().with_args(args);

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..Default::default()
    });
    let registry = modelview_io::ImporterRegistry::default();
    log::info!("supported model formats: {}", registry.supported_extensions().join(", "));

    run(config)
}
