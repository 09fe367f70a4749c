//! Headless host for the inkwell editor: feeds paste, drop or picker events
//! into the core, runs the uploads and prints the resulting document.

mod effects;
mod files;
mod session;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use editor_logging::{editor_info, LogDestination};
use inkwell_core::{Document, EditorState, Msg, Node, NoticeKind};
use inkwell_engine::{ContentStore, EngineHandle};

use effects::EffectRunner;
use session::Session;

#[derive(Parser, Debug)]
#[command(name = "inkwell")]
#[command(about = "Upload images into a rich-text document from the command line")]
#[command(version)]
struct Cli {
    /// RON settings file (defaults to ./inkwell.ron when present)
    #[arg(short, long, env = "INKWELL_CONFIG")]
    config: Option<PathBuf>,

    /// Destination folder on the image host
    #[arg(short, long)]
    folder: Option<String>,

    /// Existing document; each line becomes a paragraph
    #[arg(short, long)]
    document: Option<PathBuf>,

    /// File that receives every persisted revision of the document
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    log: LogTarget,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,

    /// Seconds to wait for outstanding uploads
    #[arg(long, default_value_t = 300)]
    max_wait: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drag the files over the editor and drop them
    Drop { files: Vec<PathBuf> },
    /// Paste the files as clipboard image data, with optional HTML/text flavours
    Paste {
        images: Vec<PathBuf>,
        #[arg(long)]
        html: Option<PathBuf>,
        #[arg(long)]
        text: Option<String>,
    },
    /// Choose the files through the toolbar image picker
    Pick { files: Vec<PathBuf> },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogTarget {
    File,
    Terminal,
    Both,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = match cli.log {
        LogTarget::File => LogDestination::default_file(),
        LogTarget::Terminal => LogDestination::Terminal,
        LogTarget::Both => LogDestination::Both(PathBuf::from(editor_logging::DEFAULT_LOG_FILE)),
    };
    let level = if cli.verbose {
        editor_logging::log::LevelFilter::Debug
    } else {
        editor_logging::log::LevelFilter::Info
    };
    editor_logging::initialize(destination, level);

    let mut app_settings = settings::load_settings(cli.config.as_deref())?;
    if cli.folder.is_some() {
        app_settings.editor.default_folder = cli.folder.clone();
    }

    let mut state = EditorState::with_settings(app_settings.editor);
    if let Some(path) = &cli.document {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {:?}", path))?;
        state = state.with_document(Document::from_nodes(
            text.lines()
                .filter(|line| !line.trim().is_empty())
                .map(Node::paragraph)
                .collect(),
        ));
    }

    let engine =
        EngineHandle::new(app_settings.transport).context("Failed to start upload engine")?;
    let store = cli.output.clone().map(ContentStore::new);
    let mut session = Session::new(state, EffectRunner::new(engine, store));

    for msg in event_messages(cli.command)? {
        session.dispatch(msg);
    }
    let settled = session.run_until_idle(Duration::from_secs(cli.max_wait));

    let view = session.view();
    for notice in &view.notices {
        eprintln!("[{}] {}", notice_label(notice.kind), notice.message);
    }
    println!("{}", view.canonical_html);
    editor_info!(
        "Done: {} image(s), {} uploaded, {} failed, {} cancelled, {} unpersisted edit(s)",
        session.state().document().images().count(),
        view.tally.completed,
        view.tally.failed,
        view.tally.cancelled,
        view.dropped_edits
    );
    if let Some(store) = session.runner().store() {
        editor_info!("{} revision(s) written to {:?}", store.revisions(), store.target());
    }

    if !settled {
        anyhow::bail!("uploads still running after {} seconds", cli.max_wait);
    }
    Ok(())
}

/// The gesture each subcommand stands for, as editor messages.
fn event_messages(command: Command) -> Result<Vec<Msg>> {
    let msgs = match command {
        Command::Drop { files } => {
            let files = load_files(&files)?;
            vec![
                Msg::DragEntered,
                Msg::DragOver(files.clone()),
                Msg::Dropped(files),
            ]
        }
        Command::Paste { images, html, text } => {
            let html = html
                .map(|path| {
                    std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read HTML flavour {:?}", path))
                })
                .transpose()?;
            vec![Msg::Pasted(files::clipboard_payload(&images, html, text))]
        }
        Command::Pick { files } => vec![Msg::FilesPicked {
            files: load_files(&files)?,
            folder: None,
        }],
    };
    Ok(msgs)
}

fn load_files(paths: &[PathBuf]) -> Result<Vec<inkwell_core::FileRef>> {
    paths
        .iter()
        .map(|path| files::file_on_disk(path).with_context(|| format!("Failed to open {:?}", path)))
        .collect()
}

fn notice_label(kind: NoticeKind) -> &'static str {
    match kind {
        NoticeKind::Success => "ok",
        NoticeKind::Error => "error",
        NoticeKind::Info => "info",
        NoticeKind::Cancelled => "cancelled",
    }
}
