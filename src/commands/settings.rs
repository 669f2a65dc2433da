//! Show the global settings

use anyhow::Result;

use crate::error::Outcome;
use crate::Cms;

/// Print the global settings as JSON
pub async fn run(cms: &Cms) -> Result<()> {
    let settings = match cms.loader.load_settings().await {
        Outcome::Absent(reason) => anyhow::bail!("settings: {}", reason),
        Outcome::Degraded { value, reason } => {
            eprintln!("settings: {}", reason);
            value
        }
        Outcome::Ready(value) => value,
    };

    println!("{}", serde_json::to_string_pretty(&*settings)?);
    Ok(())
}
