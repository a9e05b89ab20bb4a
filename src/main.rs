//! Study Buddy - terminal client
//!
//! Attach one PDF or YouTube transcript, then ask questions about it.

use std::io::Write;
use std::sync::Arc;

use study_buddy::command::{Command, HELP};
use study_buddy::{
    spawn_session, ClientConfig, DocumentFile, HttpGateway, LoggingGateway, Phase,
    RequestGateway, Role, SessionHandle, SessionUpdate, SessionView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging on stderr so it stays out of the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "study_buddy=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env()?;
    tracing::info!(
        backend = %config.backend_url,
        timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded"
    );

    let http = HttpGateway::new(&config.backend_url, config.request_timeout)?;
    let gateway: Arc<dyn RequestGateway> = Arc::new(LoggingGateway::new(Arc::new(http)));

    let handle = spawn_session(Arc::clone(&gateway));
    tracing::info!(session_id = %handle.session_id(), "Session started");

    let renderer = tokio::spawn(render_updates(handle.subscribe()));

    println!("Your AI Study Buddy ({})", config.backend_url);
    println!("Upload a PDF or add a YouTube link to start. Type /help for commands.");

    run_repl(&handle, gateway.as_ref()).await?;

    renderer.abort();
    Ok(())
}

async fn run_repl(
    handle: &SessionHandle,
    gateway: &dyn RequestGateway,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        // Affordances mirror the derived view: disabled inputs are refused
        // here, the controller guards the same rules again
        let view = handle.view();
        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Usage(usage) => println!("usage: {usage}"),
            Command::Unknown(name) => println!("Unknown command {name}. Type /help for commands."),
            Command::Status => print_status(&view),
            Command::Health => match gateway.health().await {
                Ok(health) => println!(
                    "backend {} (index loaded: {}, source: {})",
                    health.status,
                    health.vectorstore_loaded,
                    health.source.as_deref().unwrap_or("none")
                ),
                Err(e) => println!("backend unavailable: {e}"),
            },
            Command::AttachPdf(path) => {
                if !view.can_add_source {
                    println!("Please wait, still working on the previous request.");
                    continue;
                }
                match DocumentFile::load(&path).await {
                    Ok(file) => handle.attach_document(file).await?,
                    Err(e) => println!("Could not read {}: {e}", path.display()),
                }
            }
            Command::AttachVideo(url) => {
                if !view.can_add_source {
                    println!("Please wait, still working on the previous request.");
                    continue;
                }
                handle.attach_video(url).await?;
            }
            Command::Clear => handle.clear().await?,
            Command::Ask(question) => {
                if !view.can_ask {
                    println!("{}", view.input_placeholder);
                    continue;
                }
                handle.ask(question).await?;
            }
        }
    }

    Ok(())
}

/// Print new turns and progress as the session changes
async fn render_updates(mut updates: broadcast::Receiver<SessionUpdate>) {
    let mut printed = 0;
    let mut phase = Phase::Idle;

    loop {
        match updates.recv().await {
            Ok(SessionUpdate::View(view)) => {
                for turn in view.turns.iter().skip(printed) {
                    let speaker = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "bot",
                    };
                    println!("\n{speaker}> {}", turn.text);
                }
                printed = printed.max(view.turns.len());

                if view.phase != phase {
                    match view.phase {
                        Phase::AwaitingAttach => println!("Loading source..."),
                        Phase::AwaitingAnswer => println!("Thinking..."),
                        Phase::Idle => prompt(),
                    }
                    phase = view.phase;
                }
            }
            Ok(SessionUpdate::Notice { message }) => println!("! {message}"),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Renderer fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_status(view: &SessionView) {
    println!("source: {}", view.binding);
    println!("state:  {:?}", view.phase);
    println!("turns:  {}", view.turns.len());
    println!("hint:   {}", view.input_placeholder);
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
