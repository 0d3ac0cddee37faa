//! CLI entry point for `filemailer`.

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};

use filemailer::config::Config;
use filemailer::inspect::{Inspector, MessageListing};
use filemailer::model::message::ParsedMessage;
use filemailer::store::MessageStore;

#[derive(Parser)]
#[command(
    name = "filemailer",
    version,
    about = "Capture outgoing mail to a directory and inspect it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding captured messages (overrides the config file)
    #[arg(short, long, global = true, env = "FILEMAILER_DIR", value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a raw message read from FILE (or stdin) instead of sending it
    Capture {
        file: Option<PathBuf>,
    },
    /// List captured messages, newest first
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one captured message
    Show {
        filename: String,
        /// Print the HTML body instead of the plain one
        #[arg(long, conflicts_with = "raw")]
        html: bool,
        /// Print the raw message
        #[arg(long)]
        raw: bool,
    },
    /// Decode an attachment and save it
    Attachment {
        filename: String,
        key: String,
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Delete every captured message
    DeleteAll,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = filemailer::config::load_config();
    if cli.dir.is_some() {
        config.mailer.temp_dir = cli.dir.clone();
    }

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Commands::Capture { file } => cmd_capture(&config, file.as_deref()),
        Commands::List { json } => cmd_list(&config, json),
        Commands::Show {
            filename,
            html,
            raw,
        } => cmd_show(&config, &filename, html, raw),
        Commands::Attachment {
            filename,
            key,
            output,
        } => cmd_attachment(&config, &filename, &key, &output),
        Commands::DeleteAll => cmd_delete_all(&config),
        Commands::Init { force } => cmd_init(&config, force),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = filemailer::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "filemailer.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn inspector(config: &Config) -> anyhow::Result<Inspector> {
    let dir = config
        .mailer
        .temp_dir
        .clone()
        .ok_or(filemailer::error::FileMailerError::Configuration)?;
    Ok(Inspector::new(dir, config.panel.clone()))
}

/// Read a raw message and store it.
fn cmd_capture(config: &Config, file: Option<&Path>) -> anyhow::Result<()> {
    let raw = match file {
        Some(path) => std::fs::read(path)?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let store = MessageStore::new(config.mailer.temp_dir.clone());
    let bytes = store.send(&raw)?;
    println!("  Captured {bytes} bytes");
    Ok(())
}

fn cmd_list(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut inspector = inspector(config)?;
    let listing = inspector.list_messages()?;

    if !listing.is_visible(config.panel.hide_empty) {
        return Ok(());
    }

    if json {
        print_listing_json(&listing)
    } else {
        print_listing_table(&listing, &config.panel.shown_headers());
        Ok(())
    }
}

fn cmd_show(config: &Config, filename: &str, html: bool, raw: bool) -> anyhow::Result<()> {
    let mut inspector = inspector(config)?;
    let message = inspector.message(filename)?;

    if raw {
        use std::io::Write;
        std::io::stdout().write_all(&message.raw)?;
        return Ok(());
    }

    print_message(&message, html);
    Ok(())
}

fn cmd_attachment(config: &Config, filename: &str, key: &str, output: &Path) -> anyhow::Result<()> {
    let mut inspector = inspector(config)?;
    let download = inspector.download_attachment(filename, key)?;
    let path = filemailer::export::attachment::save_attachment(&download, output)?;
    println!(
        "  Saved {} ({}) to {}",
        download.suggested_filename,
        download.content_type,
        path.display()
    );
    Ok(())
}

fn cmd_delete_all(config: &Config) -> anyhow::Result<()> {
    let mut inspector = inspector(config)?;
    let removed = inspector.delete_all()?;
    println!("  Deleted {removed} message(s)");
    Ok(())
}

fn cmd_init(config: &Config, force: bool) -> anyhow::Result<()> {
    let path = filemailer::config::config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    filemailer::config::save_config(config)?;
    println!("  Wrote {}", path.display());
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "filemailer", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print the listing as a table with one column per shown header.
fn print_listing_table(listing: &MessageListing, shown: &[String]) {
    use humansize::{format_size, BINARY};

    println!();
    println!(
        "  {} message(s), {} new",
        listing.count_all(),
        listing.count_new
    );
    println!();

    for message in &listing.messages {
        let date = message
            .date
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<19}  {:>8}",
            message.filename.as_deref().unwrap_or("?"),
            date,
            format_size(message.size(), BINARY)
        );
        for name in shown {
            let value: String = message.header(name).unwrap_or("").chars().take(70).collect();
            println!("      {:<10} {}", format!("{name}:"), value);
        }
        for (key, attachment) in &message.attachments {
            println!(
                "      {:<10} {} [{}] {}",
                "attachment",
                attachment.filename,
                attachment.content_type,
                key
            );
        }
    }
    println!();
}

/// Print the listing as JSON.
fn print_listing_json(listing: &MessageListing) -> anyhow::Result<()> {
    let messages: Vec<&ParsedMessage> = listing.messages.iter().map(AsRef::as_ref).collect();
    let output = serde_json::json!({
        "count_all": listing.count_all(),
        "count_new": listing.count_new,
        "messages": messages,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_message(message: &ParsedMessage, html: bool) {
    for (name, value) in &message.headers {
        println!("{name}: {value}");
    }
    println!();

    let body = if html {
        message.html_body.as_deref()
    } else {
        message.plain_body.as_deref()
    };
    match body {
        Some(text) => println!("{text}"),
        None => println!("(no {} body)", if html { "HTML" } else { "plain" }),
    }

    if !message.attachments.is_empty() {
        println!();
        for (key, attachment) in &message.attachments {
            println!(
                "  attachment {key}: {} ({}, {})",
                attachment.filename, attachment.content_type, attachment.transfer_encoding
            );
        }
    }
}
