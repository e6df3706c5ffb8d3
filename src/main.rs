// Slate simulator entry point.
//
// Batch sequence:
// 1. Initialize tracing (stderr, env-filtered)
// 2. Load config (copying defaults on first run)
// 3. Load the roster file
// 4. Simulate the full slate with randomly sampled conditions
// 5. Write the dated CSV export
// 6. Optionally forward a --ask question about the slate to the LLM
//
// Usage: slatecast [--seed N] [--ask "question"]

use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use slatecast::config;
use slatecast::llm::client::LlmClient;
use slatecast::llm::prompt;
use slatecast::roster::CsvRosterProvider;
use slatecast::slate::{self, RandomSampler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing();
    info!("slatecast starting up");

    let args = CliArgs::parse(std::env::args().skip(1))?;

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        rosters = %config.data.rosters,
        export_dir = %config.data.export_dir,
        "config loaded"
    );

    // 3. Load the roster file
    let provider = CsvRosterProvider::load(Path::new(&config.data.rosters))
        .context("failed to load roster file")?;

    // 4. Simulate the full slate
    let mut sampler = match args.seed {
        Some(seed) => RandomSampler::seeded(seed, config.simulation.clone()),
        None => RandomSampler::new(config.simulation.clone()),
    };
    let rows = slate::simulate_slate(&provider, &mut sampler)
        .context("slate simulation failed")?;

    // 5. Write the dated CSV export
    let out_path = slate::export_path(
        Path::new(&config.data.export_dir),
        chrono::Local::now().date_naive(),
    );
    slate::write_slate_csv(&rows, &out_path)
        .with_context(|| format!("failed to write export to {}", out_path.display()))?;
    info!(rows = rows.len(), path = %out_path.display(), "slate export written");
    println!("Full slate simulation saved to {}", out_path.display());

    // 6. Optional Q&A over the freshly simulated slate
    if let Some(question) = args.question {
        let client = LlmClient::from_config(&config);
        if matches!(client, LlmClient::Disabled) {
            warn!("--ask given but no API key is configured");
        }
        let context_table = prompt::format_slate(&rows);
        let answer = client
            .ask_gpt(&question, &context_table)
            .await
            .context("language model query failed")?;
        println!("\n{answer}");
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    seed: Option<u64>,
    question: Option<String>,
}

impl CliArgs {
    fn parse(args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = CliArgs::default();
        let mut args = args;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args
                        .next()
                        .context("--seed requires a numeric argument")?;
                    parsed.seed = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid --seed value `{value}`"))?,
                    );
                }
                "--ask" => {
                    parsed.question =
                        Some(args.next().context("--ask requires a question argument")?);
                }
                other => anyhow::bail!("unrecognized argument `{other}`"),
            }
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<CliArgs> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_args_is_default() {
        assert_eq!(parse(&[]).unwrap(), CliArgs::default());
    }

    #[test]
    fn seed_and_ask_parse_together() {
        let args = parse(&["--seed", "42", "--ask", "who leads the slate?"]).unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.question.as_deref(), Some("who leads the slate?"));
    }

    #[test]
    fn bad_seed_is_an_error() {
        assert!(parse(&["--seed", "not-a-number"]).is_err());
    }

    #[test]
    fn missing_ask_value_is_an_error() {
        assert!(parse(&["--ask"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        assert!(parse(&["--frobnicate"]).is_err());
    }
}
