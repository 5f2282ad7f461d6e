//! Ingest command

use crate::app::{IngestArgs, OutputFormat};
use crate::output;
use crate::services::Services;
use anyhow::Result;

pub async fn run(args: IngestArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let pipeline = services.ingestion_pipeline()?;

    if format == OutputFormat::Cli {
        eprintln!(
            "Ingesting {} source(s) into '{}'...",
            args.sources.len(),
            args.collection
        );
    }
    let stats = pipeline.ingest(&args.sources, &args.collection).await?;

    println!("{}", output::format_ingest_stats(&args.collection, &stats, format));
    Ok(())
}
