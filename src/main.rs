use anyhow::Result;
use clap::Parser;
use concurrent_tally::cli::{
    describe_failure, execute_letters, execute_search, Cli, Commands, LettersCommandConfig,
    SearchCommandConfig,
};
use concurrent_tally::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet)?;

    let result = match cli.command {
        Commands::Search {
            root,
            pattern,
            workers,
            config_preset,
            json,
            sequential_check,
        } => {
            execute_search(SearchCommandConfig {
                root,
                pattern,
                workers,
                config_preset,
                json,
                sequential_check,
                quiet: cli.quiet,
            })
            .await
        }
        Commands::Letters {
            urls,
            workers,
            timeout_secs,
            config_preset,
            timeline,
        } => {
            execute_letters(LettersCommandConfig {
                urls,
                workers,
                timeout_secs,
                config_preset,
                timeline,
                quiet: cli.quiet,
            })
            .await
        }
    };

    if let Err(error) = result {
        for line in describe_failure(&error) {
            eprintln!("{line}");
        }
        std::process::exit(1);
    }
    Ok(())
}
