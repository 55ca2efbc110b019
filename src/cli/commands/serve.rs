//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::server;
use anyhow::Result;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    Output::header("Svar API Server");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Process Video", "POST /video/process");
    Output::kv("Chat", "POST /chat");
    Output::kv("Search", "POST /search");
    Output::kv("Transcription", "GET  /transcription");
    Output::kv("Status", "GET  /status");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::serve(&host, port, settings).await?;

    Ok(())
}
