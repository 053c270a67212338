use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use owlbot::types::check_depth;
use owlbot::{protocol, Engine, EngineConfig, Request, SearchVariant};

/// Picks a move for a chess position. Reads one request per line on stdin
/// (JSON or bare FEN) unless `--fen` is given.
#[derive(Parser, Debug)]
#[command(name = "owlbot", version, about)]
struct Cli {
    /// Search variant used when a request does not name one
    #[arg(long, value_enum, default_value_t = SearchVariant::AlphaBeta)]
    variant: SearchVariant,

    /// Search depth in plies (1 to 5); defaults to the variant's own depth
    #[arg(long, value_parser = parse_depth)]
    depth: Option<u8>,

    /// Answer a single position and exit
    #[arg(long)]
    fen: Option<String>,

    /// Log filter, e.g. `owlbot=debug`. RUST_LOG wins when set.
    #[arg(long, default_value = "owlbot=info")]
    log: String,
}

fn parse_depth(arg: &str) -> Result<u8, String> {
    let depth: u8 = arg.parse().map_err(|e| format!("{e}"))?;
    check_depth(depth).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig {
        variant: cli.variant,
        depth: cli.depth,
    };
    let mut engine = Engine::new(config);

    if let Some(fen) = cli.fen {
        let response = engine.handle(&Request::new(fen));
        match serde_json::to_string(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to encode response: {e}");
                return ExitCode::FAILURE;
            }
        }
        return if response.is_ok() { ExitCode::SUCCESS } else { ExitCode::FAILURE };
    }

    if let Err(e) = protocol::run(&mut engine) {
        eprintln!("i/o error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_flag_is_bounded() {
        let cli = Cli::try_parse_from(["owlbot", "--depth", "4"]).unwrap();
        assert_eq!(cli.depth, Some(4));
        assert!(Cli::try_parse_from(["owlbot", "--depth", "0"]).is_err());
        assert!(Cli::try_parse_from(["owlbot", "--depth", "9"]).is_err());
        assert!(Cli::try_parse_from(["owlbot", "--depth", "deep"]).is_err());
        assert_eq!(Cli::try_parse_from(["owlbot"]).unwrap().depth, None);
    }
}
