use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};

use consultant_chat::chat::ChatService;
use consultant_chat::config::{ApiArgs, ServerConfig};
use consultant_chat::constants;
use consultant_chat::extract;
use consultant_chat::format;
use consultant_chat::session::ChatSession;
use consultant_chat::web_server::{self, WebSettings};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the chat web server.
    Serve {
        #[arg(long, env = "PORT", default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, default_value = "templates", help = "Directory holding index.html.")]
        templates_dir: PathBuf,
        #[arg(long, default_value = "static", help = "Directory served under /static.")]
        static_dir: PathBuf,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Chat with the model from the terminal.
    Chat {
        #[arg(long, help = "Start with consultant mode enabled.")]
        consultant: bool,
        #[arg(long, help = "Project identifier added to consultant prompts.")]
        project: Option<String>,
        #[command(flatten)]
        api: ApiArgs,
    },
    /// Run the file-bundle extractor on a saved reply and print the result as JSON.
    Extract {
        #[arg(help = "File containing the reply text; reads stdin when omitted.")]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for environment variables like API keys)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,consultant_chat=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            templates_dir,
            static_dir,
            api,
        } => {
            let config = ServerConfig::from_args(&api).context("Invalid configuration")?;
            info!("Starting chat server on port {}...", port);

            let settings = WebSettings {
                port,
                templates_dir,
                static_dir,
            };
            let mut web_server_handle =
                tokio::spawn(async move { web_server::start_web_server(&config, settings).await });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(Ok(())) => info!("Web server task completed unexpectedly."),
                        Ok(Err(e)) => {
                            error!("Web server failed: {:?}", e);
                            return Err(e);
                        }
                        Err(e) => {
                            error!("Web server task failed: {:?}", e);
                            return Err(e).context("Web server task failed");
                        }
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Chat {
            consultant,
            project,
            api,
        } => {
            let config = ServerConfig::from_args(&api).context("Invalid configuration")?;
            run_terminal_chat(ChatService::new(&config), consultant, project)
                .await
                .context("Chat session failed")?;
        }
        Commands::Extract { file } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };
            let result = extract::extract(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

const CHAT_HELP: &str = "Commands: /consultant on|off, /project <id>, /new, /quit";

async fn run_terminal_chat(
    service: ChatService,
    consultant: bool,
    project: Option<String>,
) -> Result<()> {
    let mut session = ChatSession::new();
    session.set_consultant_mode(consultant);
    session.project_id = project.unwrap_or_default();

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    stdout.write_all(format!("{}\n", CHAT_HELP).as_bytes()).await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit", _) => break,
            ("/new", _) => {
                session.new_chat();
                println!("(new chat)");
                continue;
            }
            ("/consultant", arg) => {
                session.set_consultant_mode(arg.trim() != "off");
                println!(
                    "(consultant mode {})",
                    if session.consultant_mode { "on" } else { "off" }
                );
                continue;
            }
            ("/project", arg) => {
                session.project_id = arg.trim().to_string();
                println!("(project: {})", session.project_id);
                continue;
            }
            _ => {}
        }

        let request = match session.begin_turn(input) {
            Ok(request) => request,
            Err(e) => {
                println!("({})", e);
                continue;
            }
        };

        match service.respond(&request).await {
            Ok(response) => {
                let rendered = session
                    .complete_turn(response)
                    .map(|m| format::render_reply(&m.content, m.files.as_deref()));
                match (rendered, &session.last_error) {
                    (Some(text), _) => println!("{}", text),
                    (None, Some(err)) => println!("error: {}", err),
                    (None, None) => {}
                }
                if let Some(phase) = session.consultant_state.phase {
                    println!("[phase: {:?}]", phase);
                }
            }
            Err(e) => {
                let message = e.public_message();
                error!("Chat request failed: {}", e);
                session.fail_turn(message.clone());
                println!("error: {}", message);
            }
        }
    }

    info!("Chat session finished.");
    Ok(())
}
