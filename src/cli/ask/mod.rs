//! Ask command - one-shot question answering from the terminal

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Args;
use tracing::info;

use crate::domain::rag::Answer;
use crate::infrastructure::services::DocumentQaServiceTrait;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Document to load (.pdf, .docx or .txt)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Questions to answer, each as one argument
    #[arg(required = true)]
    pub questions: Vec<String>,

    /// Print the source chunks after each answer
    #[arg(long)]
    pub show_sources: bool,
}

/// Load the document, print an answer per question, exit
pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = super::prepare()?;
    let service = crate::create_service(&config)?;

    let filename = args
        .file
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("Invalid document path: {}", args.file.display()))?;

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let document = service.upload_file(filename, bytes).await?;
    info!(
        document = %document.name,
        chunks = document.chunk_count,
        "Document ready"
    );

    for question in &args.questions {
        let answer = service.query(question).await?;
        print!("{}", format_answer(question, &answer, args.show_sources));
    }

    Ok(())
}

fn format_answer(question: &str, answer: &Answer, show_sources: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Q: {}", question);
    let _ = writeln!(out, "A: {}", answer.answer);

    if show_sources {
        for (rank, source) in answer.sources.iter().enumerate() {
            let _ = writeln!(out, "  [{}] {}", rank + 1, source);
        }
    }

    out.push('\n');
    out
}
