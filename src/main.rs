use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use drivechat::cli::Args;
use drivechat::completion::CompletionPhase;
use drivechat::notify::ConsoleNotifier;
use drivechat::{AppStore, AuxiliaryKind, Config, SendOutcome, StoreEvent, VideoOutcome};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let mut config = Config::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    if !config.has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not set; completion requests will be rejected");
    }

    let mut store = AppStore::new(&config, Arc::new(ConsoleNotifier))?;

    if args.list {
        print_gallery(&store);
        return Ok(());
    }

    let Some(id) = args.sequence.as_deref() else {
        eprintln!(
            "{}",
            "No sequence selected. Use --list to see the gallery and --sequence <id> to pick one."
                .yellow()
        );
        return Ok(());
    };
    let Some(sequence) = store.catalog().get(id).cloned() else {
        return Err(format!("unknown sequence id: {id}").into());
    };

    if args.video {
        if store.open_video_viewer(&sequence) == VideoOutcome::Opened {
            if let (Some(title), Some(url)) = (store.current_video_title(), store.current_video_url()) {
                println!("{} {}", title.bold(), url.bright_blue());
            }
            store.close_video_player();
        }
    }

    if let Some(aux) = args.aux {
        let kind: AuxiliaryKind = aux.into();
        match store.fetch_auxiliary(&sequence, kind).await {
            Some(text) => print!("{text}"),
            None => eprintln!("{}", format!("{} is not available for this sequence", kind.file_name()).yellow()),
        }
    }

    if args.question.is_none() && !args.interactive {
        return Ok(());
    }

    store.select_sequence(sequence).await?;
    if let Some(welcome) = store.session().last() {
        println!("{}\n", welcome.content.bright_black());
    }

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_tokens(store.subscribe(), done_tx));

    if let Some(question) = &args.question {
        ask(&mut store, question, &mut done_rx).await;
    }

    if args.interactive {
        let stdin = io::stdin();
        prompt_marker()?;
        for line in stdin.lock().lines() {
            let line = line?;
            ask(&mut store, &line, &mut done_rx).await;
            prompt_marker()?;
        }
        println!();
    }

    drop(store);
    let _ = printer.await;
    Ok(())
}

fn print_gallery(store: &AppStore) {
    println!("{}", "Driving sequences".bold().underline());
    for seq in store.sequences() {
        println!(
            "  {}  {}  {}",
            seq.id.bright_cyan().bold(),
            seq.name,
            seq.description.as_deref().unwrap_or("").bright_black()
        );
    }
}

fn prompt_marker() -> io::Result<()> {
    print!("{} ", ">".bright_green().bold());
    io::stdout().flush()
}

async fn ask(store: &mut AppStore, question: &str, done_rx: &mut mpsc::UnboundedReceiver<()>) {
    match store.send_message(question).await {
        SendOutcome::Ignored(_) => return,
        SendOutcome::Completed { .. } => {}
        SendOutcome::Failed(_) => {
            if let Some(msg) = store.session().last() {
                println!("{}", msg.content.bright_red());
            }
        }
    }
    // Wait until the printer has flushed this answer.
    let _ = done_rx.recv().await;
}

/// Presentation side: print each streamed token as it arrives.
async fn print_tokens(mut rx: mpsc::UnboundedReceiver<StoreEvent>, done: mpsc::UnboundedSender<()>) {
    let mut stdout = io::stdout();
    while let Some(event) = rx.recv().await {
        match event {
            StoreEvent::TokenAppended { token, .. } => {
                let _ = write!(stdout, "{}", token.bright_white());
                let _ = stdout.flush();
            }
            StoreEvent::PhaseChanged(phase) if phase.is_terminal() => {
                if phase == CompletionPhase::Done {
                    let _ = writeln!(stdout, "\n");
                }
                let _ = done.send(());
            }
            _ => {}
        }
    }
}
