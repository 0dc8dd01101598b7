use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use lomo::{
    ChatSession, CohereClient, DirStorage, EssayAssistant, GenerationClient, Storage, logger,
    prompts, sanitize,
};

/// Command line arguments for the lomo binary.
#[derive(Parser)]
#[command(name = "lomo", about = "Lomo college-application assistant")]
struct Args {
    /// Directory holding the durable slots.
    #[arg(long = "data-dir", default_value = ".lomo")]
    data_dir: PathBuf,
    /// Base URL of the generation service.
    #[arg(long = "api-url", default_value = "https://api.cohere.com")]
    api_url: String,
    /// Model identifier sent with each request.
    #[arg(long, default_value = prompts::DEFAULT_MODEL)]
    model: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive counselor chat.
    Chat,
    /// One-shot essay feedback for a draft file.
    Essay {
        /// Path to the draft text file.
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();
    let api_key = std::env::var("COHERE_API_KEY")
        .map_err(|_| anyhow::anyhow!("COHERE_API_KEY is not set"))?;

    let storage: Arc<dyn Storage> = Arc::new(DirStorage::open(&args.data_dir)?);
    let generator: Arc<dyn GenerationClient> = Arc::new(CohereClient::new(&args.api_url, api_key));

    match args.command {
        Command::Chat => run_chat(storage, generator, args.model).await,
        Command::Essay { path } => run_essay(storage, generator, args.model, &path).await,
    }
}

async fn run_chat(
    storage: Arc<dyn Storage>,
    generator: Arc<dyn GenerationClient>,
    model: String,
) -> anyhow::Result<()> {
    let mut session = ChatSession::open(storage, generator).with_model(model);
    for message in session.messages() {
        print_message(message);
    }
    println!("(type /clear to reset, /quit to leave)");

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                if let Err(e) = session.clear() {
                    eprintln!("warning: {e}");
                }
                print_message(&session.messages()[0]);
            }
            input => {
                if let Some(reply) = session.send(input).await {
                    print_message(reply);
                }
            }
        }
    }
    Ok(())
}

async fn run_essay(
    storage: Arc<dyn Storage>,
    generator: Arc<dyn GenerationClient>,
    model: String,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let draft = std::fs::read_to_string(path)?;
    let mut assistant = EssayAssistant::open(storage, generator).with_model(model);
    if let Err(e) = assistant.set_draft(draft) {
        eprintln!("warning: draft may not survive a reload ({e})");
    }
    println!("{}", assistant.request_feedback().await);
    Ok(())
}

fn print_message(message: &lomo::ChatMessage) {
    let who = match message.sender {
        lomo::Sender::User => "you",
        lomo::Sender::Assistant => "lomo",
    };
    println!("{who}> {}", terminal_text(&message.text));
}

/// Flatten sanitized markup into terminal-friendly text.
fn terminal_text(markup: &str) -> String {
    sanitize(markup)
        .replace("</p>", "\n")
        .replace("</li>", "\n")
        .replace("<li>", "  - ")
        .replace("<br/>", "\n")
        .replace("<p>", "")
        .replace("<ul>", "")
        .replace("</ul>", "")
        .replace("<strong>", "")
        .replace("</strong>", "")
        .replace("<em>", "")
        .replace("</em>", "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim_end()
        .to_string()
}
