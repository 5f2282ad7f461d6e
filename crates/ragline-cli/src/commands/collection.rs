//! Collection management commands

use crate::app::{CollectionAction, CollectionArgs, OutputFormat};
use crate::output;
use crate::services::Services;
use anyhow::Result;
use ragline_core::RaglineError;

pub async fn run(args: CollectionArgs, services: &Services, format: OutputFormat) -> Result<()> {
    let db = &services.db;
    match args.action {
        CollectionAction::List => {
            let collections = db.list_collections()?;
            println!("{}", output::format_collections(&collections, format));
        }
        CollectionAction::Info { name } => {
            let info = db
                .get_collection(&name)?
                .ok_or_else(|| RaglineError::CollectionNotFound(name.clone()))?;
            println!("{}", output::format_collection_info(&info, format));
        }
        CollectionAction::Remove { name } => {
            if !db.drop_collection(&name)? {
                return Err(RaglineError::CollectionNotFound(name).into());
            }
            println!("Removed collection '{}'", name);
        }
    }
    Ok(())
}
