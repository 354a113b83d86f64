//! TrendScript command-line entry point.
//!
//! ```text
//! trendscript <keyword> <duration_minutes> [--upload-date D] [--length L] [--sort-by S]
//! trendscript transcript <video-url-or-id>
//! ```

use std::str::FromStr;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tscript_models::{extract_youtube_id, RequestError, SearchRequest, VideoRecord};
use tscript_youtube::{TranscriptResolver, YoutubeClient};
use tscript_worker::{Pipeline, PipelineConfig};

const USAGE: &str = "Usage:
  trendscript <keyword> <duration_minutes> [--upload-date any|hour|today|week|month]
              [--length any|short|medium|long] [--sort-by relevance|date|view_count|rating]
  trendscript transcript <video-url-or-id>";

enum Command {
    Generate(SearchRequest),
    Transcript(String),
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("Failed to install rustls crypto provider");
        std::process::exit(1);
    }

    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            std::process::exit(2);
        }
    };

    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let outcome = match command {
        Command::Generate(request) => generate(config, request).await,
        Command::Transcript(input) => transcript(config, &input).await,
    };

    if let Err(msg) = outcome {
        error!("{}", msg);
        eprintln!("Error: {}", msg);
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    for directive in ["tscript=info", "trendscript=info"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args {
        [] => Err("Missing arguments".to_string()),
        [cmd, input] if cmd == "transcript" => Ok(Command::Transcript(input.clone())),
        [keyword, duration, rest @ ..] => {
            let duration: u32 = duration
                .parse()
                .map_err(|_| format!("Duration must be a whole number of minutes, got {duration:?}"))?;
            let mut request = SearchRequest::new(keyword.clone(), duration);

            if let Ok(value) = std::env::var("TSCRIPT_UPLOAD_DATE") {
                request.upload_date = parse_filter(&value)?;
            }
            if let Ok(value) = std::env::var("TSCRIPT_LENGTH") {
                request.length = parse_filter(&value)?;
            }
            if let Ok(value) = std::env::var("TSCRIPT_SORT_BY") {
                request.sort_by = parse_filter(&value)?;
            }

            let mut flags = rest.iter();
            while let Some(flag) = flags.next() {
                let value = flags
                    .next()
                    .ok_or_else(|| format!("Missing value for {flag}"))?;
                match flag.as_str() {
                    "--upload-date" => request.upload_date = parse_filter(value)?,
                    "--length" => request.length = parse_filter(value)?,
                    "--sort-by" => request.sort_by = parse_filter(value)?,
                    other => return Err(format!("Unknown option {other}")),
                }
            }

            request.validate().map_err(|e| e.to_string())?;
            Ok(Command::Generate(request))
        }
        [_] => Err("Missing duration".to_string()),
    }
}

fn parse_filter<T: FromStr<Err = RequestError>>(value: &str) -> Result<T, String> {
    value.parse().map_err(|e: RequestError| e.to_string())
}

async fn generate(config: PipelineConfig, request: SearchRequest) -> Result<(), String> {
    let pipeline = Pipeline::from_config(config).map_err(|e| e.to_string())?;
    let output = pipeline.run(&request).await.map_err(|e| e.to_string())?;

    println!("Trending videos for \"{}\"\n", request.keyword);
    for (rank, video) in output.videos.iter().enumerate() {
        print_video(rank + 1, video);
    }
    println!("=== Generated script ({} min) ===\n", request.duration_minutes);
    println!("{}", output.script_text());
    Ok(())
}

async fn transcript(config: PipelineConfig, input: &str) -> Result<(), String> {
    let video_id = extract_youtube_id(input).map_err(|e| e.to_string())?;
    let client = YoutubeClient::new(config.youtube_config()).map_err(|e| e.to_string())?;
    let resolver = TranscriptResolver::from_client(client);

    match resolver.resolve_standalone(&video_id).await {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => Err(format!("No transcript available for {}", video_id)),
    }
}

fn print_video(rank: usize, video: &VideoRecord) {
    println!("{}. {}", rank, video.title);
    println!(
        "   Channel: {} | Views: {} | Likes: {} | Published: {}",
        if video.channel.is_empty() { "-" } else { &video.channel },
        video.views_raw.as_deref().unwrap_or("-"),
        video
            .estimated_likes
            .as_deref()
            .map(|likes| format!("{likes} (est.)"))
            .unwrap_or_else(|| "-".to_string()),
        video.publish_date_raw.as_deref().unwrap_or("-"),
    );
    println!("   {}", video.watch_url());
    println!("   Transcript: {}\n", preview(video.transcript.display_text(), 120));
}

fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars).collect();
        format!("{cut}...")
    }
}
