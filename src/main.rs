use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use nhl_gdt_lib::app;
use nhl_gdt_lib::cli::{self, Args};
use nhl_gdt_lib::config::AppConfig;
use nhl_gdt_lib::net::HttpFetcher;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            process::exit(cli::usage_exit_code(&e));
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("nhl_gdt_lib={0},nhl_gdt={0}", args.log_level())));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration failed\nError: {:#}", e);
            process::exit(cli::EXIT_USAGE);
        }
    };

    if args.save_config {
        match config.save() {
            Ok(()) => info!(
                "saved config to {}",
                AppConfig::default_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            ),
            Err(e) => error!("could not save config: {:#}", e),
        }
    }

    let fetcher = HttpFetcher::new(&config);
    let request = args.request(&config, chrono::Local::now().date_naive());

    match app::run(&request, &config, &fetcher).await {
        Ok(summary) => {
            if summary.written_to.is_none() {
                print!("{}", summary.text);
            }
            if let Some(path) = &summary.written_to {
                info!(
                    teams = %summary.teams.join(" vs "),
                    "wrote {} ({} markers replaced)",
                    path.display(),
                    summary.report.replaced.len()
                );
            }
        }
        Err(e) => {
            eprintln!("{}", e.diagnostics());
            process::exit(e.stage().exit_code());
        }
    }
}
