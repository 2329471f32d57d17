use clap::Parser;
use factcheck::agents::llm::create_provider;
use factcheck::cli::{Cli, Command};
use factcheck::config::Settings;
use factcheck::provider::ToolProviderConnector;
use factcheck::shell::{ConversationShell, WELCOME_MESSAGE};
use factcheck::supervisor::Supervisor;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment first so settings can see it
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    let llm = create_provider(&settings.llm)?;
    let connector = ToolProviderConnector::from_config(&settings.search);
    let supervisor = Supervisor::from_settings(llm, connector, &settings);
    info!(
        model = %settings.llm.model,
        search = supervisor.has_search(),
        "Fact-checker ready"
    );

    let mut shell = ConversationShell::new();
    if let Some(path) = &cli.transcript {
        shell.load_transcript(path).await?;
    }

    match cli.command() {
        Command::Check { text } => {
            let reply = shell.send(&supervisor, &text.join(" ")).await;
            println!("{}", reply);
        }
        Command::Chat => chat(&mut shell, &supervisor).await?,
    }

    Ok(())
}

/// Line-oriented conversation on stdin/stdout
///
/// `/load <path>` loads a caption file, `/clear` unloads it, `/quit` exits.
async fn chat(shell: &mut ConversationShell, supervisor: &Supervisor) -> anyhow::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n> ", WELCOME_MESSAGE).as_bytes()).await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" | "/exit" => break,
            "/clear" => {
                shell.clear_payload();
                stdout.write_all(b"Captions cleared.\n").await?;
            }
            _ if line.starts_with("/load ") => {
                let path = std::path::Path::new(line.trim_start_matches("/load ").trim());
                match shell.load_transcript(path).await {
                    Ok(()) => stdout.write_all(b"Captions loaded.\n").await?,
                    Err(e) => {
                        warn!("{:#}", e);
                        stdout.write_all(format!("Error: {:#}\n", e).as_bytes()).await?;
                    }
                }
            }
            _ => {
                let reply = shell.send(supervisor, line).await;
                stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
            }
        }
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
    }

    Ok(())
}
