use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use quizzer::commands::play;
use quizzer::llm;
use quizzer::palette::Palette;

#[derive(Parser, Debug)]
#[command(
    name = "quizzer",
    version,
    about = "Topic quizzes in the terminal, powered by an LLM.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start an interactive quiz session
    Play {
        /// Topic for the first question. When omitted, the session starts
        /// with a topic prompt.
        #[arg(value_name = "TOPIC")]
        topic: Option<String>,
    },
    /// Manage the OpenAI API key
    Llm {
        /// Store an API key in the local auth file. Prompts for the key when
        /// no value is given.
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with = "clear")]
        set: Option<Option<String>>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the OpenAI API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Play { topic } => play::run(topic).await?,
        Command::Llm { set, clear, test } => handle_llm_command(set, clear, test).await?,
    }

    Ok(())
}

async fn handle_llm_command(
    set: Option<Option<String>>,
    clear: bool,
    test: bool,
) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        let key = match key {
            Some(key) => key,
            None => llm::secrets::prompt_for_api_key()?,
        };
        if key.is_empty() {
            bail!("No API key provided.");
        }
        llm::store_api_key(&key)?;
        println!(
            "{}",
            Palette::paint(Palette::SUCCESS, "Stored OpenAI API key in the local auth file.")
        );
        action_taken = true;
    }

    if clear {
        let removed = llm::clear_api_key()?;
        if removed {
            println!("Removed the stored OpenAI API key.");
        } else {
            println!("No OpenAI API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let source = llm::test_configured_api_key().await?;
        println!(
            "OpenAI API key from the {} is valid.",
            Palette::paint(Palette::INFO, source.description())
        );
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
