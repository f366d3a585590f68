use clap::Parser;
use docket::cli::commands::Cli;
use docket::cli::handlers;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("DOCKET_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        // refusals and storage failures were already shown as status messages
        if !handlers::is_reported(e.as_ref()) {
            eprintln!("error: {}", e);
        }
        std::process::exit(1);
    }
}
