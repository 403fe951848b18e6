use clap::Parser;

use oddsaxiom::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => oddsaxiom::cli::run::execute(&cli.config, args).await,
        Commands::Check => oddsaxiom::cli::check::execute(&cli.config).await,
        Commands::Status => oddsaxiom::cli::status::execute(&cli.config),
        Commands::Opportunities(args) => oddsaxiom::cli::opportunities::execute(&cli.config, args).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
