use anyhow::Result;
use sensorkit::cli::{self, Commands};
use sensorkit::commands::{self, AnalyzeConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = cli::parse_args();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            config,
            coverage_file,
            fail_fast,
            jobs,
            quiet,
        } => {
            let analyze_config = AnalyzeConfig {
                path,
                format,
                output,
                config_file: config,
                coverage_file,
                fail_fast,
                jobs,
                quiet,
            };
            commands::handle_analyze(analyze_config)
        }
        Commands::Sensors => {
            commands::list_sensors();
            Ok(())
        }
        Commands::Init { path, force } => commands::init_config(&path, force),
    }
}
