use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use console::style;
use dictionary::Dictionary;
use pronounce::ClipPlayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use render::{Outcome, Renderer};

mod config;
mod render;

/// Look up a word: definitions, examples, pronunciations, dialects and etymologies.
#[derive(Debug, Parser)]
#[command(name = "wordz", version)]
struct Args {
    /// Word to look up. Several words are searched as one phrase.
    #[arg(required = true, value_parser = NonEmptyStringValueParser::new())]
    word: Vec<String>,
    /// Play each pronunciation clip, same as VOICE_ACTIVATE=1.
    #[arg(long)]
    voice: bool,
    /// Print the response id and metadata before the entries.
    #[arg(long)]
    metadata: bool,
    #[arg(long)]
    no_color: bool,
    /// Source language code, e.g. en-gb or en-us.
    #[arg(long, value_name = "CODE")]
    language: Option<String>,
}

impl Args {
    fn phrase(&self) -> String {
        self.word.join(" ")
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // a missing .env is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = Args::parse();
    match run(args).await {
        Ok(outcome) => {
            tracing::debug!(?outcome, "lookup finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("{} {error:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(args: Args) -> anyhow::Result<Outcome> {
    let mut config = Config::from_env().context("invalid configuration")?;
    config.voice |= args.voice;
    if let Some(language) = &args.language {
        config.language = language.clone();
    }
    config.ensure_voice_output(pronounce::OUTPUT_AVAILABLE)?;
    let word = args.phrase();

    let dict = Dictionary::with_settings(config.credentials.clone(), config.api_settings())?;
    eprintln!(
        "{}",
        style("Please wait while we search for the meaning...").cyan()
    );
    let response = dict
        .lookup(&word)
        .await
        .with_context(|| format!("failed to look up {word:?}"))?;

    let player = ClipPlayer::new(config.playback_timeout);
    let renderer = Renderer::new()
        .styled(!args.no_color && console::colors_enabled())
        .show_metadata(args.metadata)
        .with_voice(&player, config.voice);
    let mut out = io::stdout();
    let outcome = renderer.render(&response, &mut out).await?;
    out.flush()?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use clap::error::ErrorKind;

    use super::*;

    #[test]
    fn word_is_required() {
        let error = Args::try_parse_from(["wordz"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn empty_word_is_rejected() {
        let error = Args::try_parse_from(["wordz", ""]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn words_form_one_phrase() {
        let args = Args::try_parse_from(["wordz", "--voice", "ice", "cream"]).unwrap();
        assert!(args.voice);
        assert!(!args.metadata);
        assert_eq!(args.phrase(), "ice cream");
    }

    #[test]
    fn flags_parse() {
        let args =
            Args::try_parse_from(["wordz", "--metadata", "--no-color", "--language", "en-us", "ace"])
                .unwrap();
        assert!(args.metadata);
        assert!(args.no_color);
        assert_eq!(args.language.as_deref(), Some("en-us"));
        assert_eq!(args.phrase(), "ace");
    }
}
