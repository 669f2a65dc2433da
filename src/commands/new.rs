//! Create a new document

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Cms;

/// Write a new document with a front-matter scaffold and return its path
pub fn create_document(
    content_dir: &Path,
    collection: &str,
    title: &str,
    extension: &str,
) -> Result<PathBuf> {
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }

    let target_dir = content_dir.join(collection);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.{}", slug, extension));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let now = chrono::Local::now();
    let title_yaml = serde_yaml::to_string(title)?;
    let content = format!(
        "---\ntitle: {}date: {}\nactive: true\n---\n",
        title_yaml,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Run the new command
pub fn run(cms: &Cms, collection: &str, title: &str) -> Result<()> {
    let path = create_document(&cms.content_dir, collection, title, &cms.config.extension)?;
    println!("Created: {:?}", path);
    Ok(())
}
