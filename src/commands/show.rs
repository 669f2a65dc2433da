//! Show a single document

use anyhow::Result;

use crate::error::Outcome;
use crate::Cms;

/// Print one document as JSON, or just its rendered body
pub async fn run(cms: &Cms, collection: &str, slug: &str, html_only: bool) -> Result<()> {
    let record = match cms.loader.load_content(collection, slug).await {
        Outcome::Absent(reason) => match cms.loader.default_for(collection, slug) {
            Some(record) => {
                eprintln!("{}/{}: {}; showing default content", collection, slug, reason);
                record
            }
            None => anyhow::bail!("{}/{}: {}", collection, slug, reason),
        },
        outcome => {
            if let Some(reason) = outcome.reason() {
                eprintln!("{}/{}: {}", collection, slug, reason);
            }
            match outcome.into_value() {
                Some(record) => (*record).clone(),
                None => anyhow::bail!("{}/{}: not loaded", collection, slug),
            }
        }
    };

    if html_only {
        println!("{}", record.body);
    } else {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Ok(())
}
