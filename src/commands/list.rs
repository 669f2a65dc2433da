//! List the documents of a collection

use anyhow::Result;

use crate::Cms;

/// List active documents of a collection in listing order
pub async fn run(cms: &Cms, collection: &str) -> Result<()> {
    let outcome = cms.loader.load_collection(collection).await;
    if let Some(reason) = outcome.reason() {
        eprintln!("{}: {}", collection, reason);
    }

    let records = outcome.into_value().unwrap_or_default();
    println!("{} ({}):", collection, records.len());
    for record in records.iter() {
        let title = record.title().unwrap_or("Untitled");
        match record.date() {
            Some(date) => println!(
                "  {} - {} [{}]",
                date.format("%Y-%m-%d"),
                title,
                record.slug
            ),
            None => println!("  {} [{}]", title, record.slug),
        }
    }

    Ok(())
}
