//! Chat command implementation.
//!
//! Processes a video, then answers questions in an interactive loop. The
//! index lives in memory, so the whole session runs in one process.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::openai::is_api_key_configured;
use crate::pipeline::Pipeline;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Run the chat command.
pub async fn run_chat(
    url: &str,
    max_chunks: Option<usize>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if !is_api_key_configured() {
        Output::error("OPENAI_API_KEY is not set.");
        return Err(anyhow::anyhow!("Missing OPENAI_API_KEY"));
    }

    if let Some(model) = model {
        settings.rag.model = model;
    }
    let k = max_chunks.unwrap_or(settings.rag.top_k);

    let pipeline = Pipeline::new(&settings)?;

    let spinner = Output::spinner("Downloading and transcribing...");
    let result = match pipeline.process_video(url).await {
        Ok(r) => {
            spinner.finish_and_clear();
            r
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to process video: {}", e));
            return Err(e.into());
        }
    };

    Output::success(&format!("Processed \"{}\"", result.title));
    Output::kv("Transcript", &format!("{} chars", result.transcript_chars));
    Output::kv("Chunks", &result.chunk_count.to_string());
    println!();
    Output::info("Ask questions about the video. Type 'exit' to quit, '/search <query>' to see raw chunks.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        if let Some(query) = input.strip_prefix("/search ") {
            match pipeline.search(query, k).await {
                Ok(chunks) if chunks.is_empty() => {
                    Output::warning("No matching chunks.");
                }
                Ok(chunks) => {
                    for chunk in chunks {
                        Output::chunk(chunk.id, chunk.start_offset, chunk.end_offset, &chunk.text);
                    }
                }
                Err(e) => Output::error(&format!("Search failed: {}", e)),
            }
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        match pipeline.query(input, k).await {
            Ok(answer) => {
                spinner.finish_and_clear();
                println!("\n{}", answer.text);
            }
            Err(e @ SvarError::InvalidInput(_)) => {
                spinner.finish_and_clear();
                Output::warning(&e.to_string());
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Failed to generate answer: {}", e));
            }
        }
    }

    Ok(())
}
