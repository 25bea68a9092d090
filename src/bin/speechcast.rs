//! speechcast — 文档转语音命令行工具
//!
//! Usage:
//!   speechcast formats                              List format keys
//!   speechcast render <format> [--pretty] [--offline]
//!                                                   Print the speech markup for a format
//!   speechcast speak <format> --out <file> [--offline]
//!                                                   Synthesize a format and write the audio

use std::path::PathBuf;
use std::sync::Arc;

use speechcast::client::{HttpSpeechClient, SpeechService};
use speechcast::config::Config;
use speechcast::format::FormatKey;
use speechcast::ingest::{Ingested, Ingestor, SourceCatalog, SourceFetcher};
use speechcast::ssml::RenderOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "formats" => cmd_formats(),
        "render" => cmd_render(&args[2..]).await,
        "speak" => cmd_speak(&args[2..]).await,
        "version" | "--version" | "-V" => cmd_version(),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"speechcast — 文档转语音命令行工具

USAGE:
    speechcast <COMMAND> [OPTIONS]

COMMANDS:
    formats                              List available format keys
    render <format> [--pretty]           Print the speech markup for a format
    speak <format> --out <file>          Synthesize a format and write the audio file
    version                              Show version information
    help                                 Show this help message

OPTIONS:
    --offline                            Use the built-in samples instead of the server
    --config <path>                      YAML configuration file

ENVIRONMENT:
    SPEECHCAST_SERVER_URL                Server root (default http://localhost:8080)
    SPEECHCAST_HTTP_TIMEOUT_SECS         Request timeout"#
    );
}

fn cmd_version() {
    println!("speechcast {}", env!("CARGO_PKG_VERSION"));
}

fn cmd_formats() {
    for key in FormatKey::ALL {
        let kind = key.content_kind();
        println!("  {:<12} {}", key.as_str(), kind.mime_type());
    }
}

/// Options shared by `render` and `speak`.
struct CommonArgs {
    format: FormatKey,
    pretty: bool,
    offline: bool,
    out: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_common(args: &[String]) -> CommonArgs {
    let mut format = None;
    let mut pretty = false;
    let mut offline = false;
    let mut out = None;
    let mut config = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "--offline" => offline = true,
            "--out" | "-o" => out = iter.next().map(PathBuf::from),
            "--config" => config = iter.next().map(PathBuf::from),
            value if format.is_none() && !value.starts_with('-') => {
                format = Some(value.parse::<FormatKey>().unwrap_or_else(|e| fail(&e.to_string())));
            }
            other => fail(&format!("unexpected argument: {other}")),
        }
    }

    let Some(format) = format else {
        fail("missing <format> (one of: text, markup, structured)");
    };
    CommonArgs {
        format,
        pretty,
        offline,
        out,
        config,
    }
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn load_config(args: &CommonArgs) -> Config {
    Config::load(args.config.as_deref()).unwrap_or_else(|e| fail(&e.to_string()))
}

async fn ingest(args: &CommonArgs, config: &Config) -> Ingested {
    let fetcher: Arc<dyn SourceFetcher> = if args.offline {
        Arc::new(SourceCatalog::samples())
    } else {
        match config.build_source_fetcher() {
            Ok(fetcher) => Arc::new(fetcher),
            Err(e) => fail(&e.to_string()),
        }
    };
    match Ingestor::new(fetcher).ingest_rendered(args.format).await {
        Ok(ingested) => ingested,
        Err(e) => fail(&e.to_string()),
    }
}

async fn cmd_render(args: &[String]) {
    let args = parse_common(args);
    let config = load_config(&args);
    let ingested = ingest(&args, &config).await;
    if args.pretty {
        println!("{}", ingested.document.render(RenderOptions::pretty()));
    } else {
        println!("{}", ingested.ssml);
    }
}

async fn cmd_speak(args: &[String]) {
    let args = parse_common(args);
    let Some(out) = args.out.clone() else {
        fail("speak requires --out <file>");
    };
    let config = load_config(&args);
    let ingested = ingest(&args, &config).await;

    let client: HttpSpeechClient = config
        .build_speech_client()
        .unwrap_or_else(|e| fail(&e.to_string()));
    let audio = match client.speak(&ingested).await {
        Ok(audio) => audio,
        Err(e) => fail(&e.to_string()),
    };
    if let Err(e) = std::fs::write(&out, &audio) {
        fail(&format!("cannot write {}: {e}", out.display()));
    }
    println!(
        "{} -> {} ({} bytes)",
        ingested.format,
        out.display(),
        audio.len()
    );
}
