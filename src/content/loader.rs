//! Content loader - fetches, parses, renders and caches documents

use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;

use super::defaults::DefaultContent;
use super::frontmatter::{parse_yaml_mapping, FrontMatter, ParsedDocument};
use super::markdown::MarkdownRenderer;
use super::record::{ContentPath, ContentRecord};
use crate::cache::{collection_key, content_key, TtlCache, SETTINGS_KEY};
use crate::error::{Degradation, LoadError, Outcome};
use crate::source::{DirectoryLister, Fetcher};

/// The global settings mapping
pub type Settings = FrontMatter;

/// Anything the loader keeps in its cache, with the degradation it was loaded with
#[derive(Debug, Clone)]
pub enum Cached {
    Record(Arc<ContentRecord>, Option<Degradation>),
    Collection(Arc<Vec<Arc<ContentRecord>>>, Option<Degradation>),
    Settings(Arc<Settings>, Option<Degradation>),
}

/// Cache shared between a loader and whoever owns the session
pub type ContentCache = TtlCache<Cached>;

/// Loads documents, collections and settings through a shared cache.
///
/// Failures never escape as errors: each call returns an [`Outcome`] that is
/// either ready, degraded (usable with something dropped), or absent. A cache
/// hit repeats the kind of the load that filled the entry. Absent results are
/// not cached, so the next call tries again.
pub struct ContentLoader {
    fetcher: Arc<dyn Fetcher>,
    lister: Arc<dyn DirectoryLister>,
    renderer: Arc<MarkdownRenderer>,
    cache: Arc<ContentCache>,
    extension: String,
    settings_path: String,
    defaults: Option<DefaultContent>,
}

impl ContentLoader {
    /// Create a loader with the default renderer and layout
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        lister: Arc<dyn DirectoryLister>,
        cache: Arc<ContentCache>,
    ) -> Self {
        Self {
            fetcher,
            lister,
            renderer: Arc::new(MarkdownRenderer::new()),
            cache,
            extension: "md".to_string(),
            settings_path: "settings/global.yml".to_string(),
            defaults: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<MarkdownRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Document file extension, without the dot
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<String>) -> Self {
        self.settings_path = path.into();
        self
    }

    /// Fallback table used by [`ContentLoader::load_content_or_default`]
    pub fn with_defaults(mut self, defaults: DefaultContent) -> Self {
        self.defaults = Some(defaults);
        self
    }

    pub fn cache(&self) -> &Arc<ContentCache> {
        &self.cache
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Drop everything cached so far
    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!("Content cache cleared");
    }

    /// Load a single document.
    ///
    /// Absent when the file cannot be fetched or has no front-matter
    /// delimiters; degraded when the front-matter block is not valid YAML.
    pub async fn load_content(&self, collection: &str, slug: &str) -> Outcome<Arc<ContentRecord>> {
        let key = content_key(collection, slug);
        if let Some(Cached::Record(record, degradation)) = self.cache.get(&key) {
            return Outcome::tagged(record, degradation);
        }

        let path = ContentPath::new(collection, slug);
        let raw = match self.fetcher.fetch(&path.file_path(&self.extension)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", path, e);
                return Outcome::Absent(e.into());
            }
        };

        let ParsedDocument {
            front_matter,
            body,
            error,
        } = ParsedDocument::parse(&raw);

        let degradation = match error {
            None => None,
            Some(LoadError::Deserialize(message)) => Some(Degradation::MalformedYaml(message)),
            Some(e) => {
                tracing::warn!("Failed to load {}: {}", path, e);
                return Outcome::Absent(e);
            }
        };

        let html = self.renderer.render(body);
        let record = Arc::new(ContentRecord::new(
            &path,
            front_matter,
            body.to_string(),
            html,
        ));
        self.cache
            .set(key, Cached::Record(Arc::clone(&record), degradation.clone()));

        Outcome::tagged(record, degradation)
    }

    /// Load every active document of a collection, in listing order.
    ///
    /// Documents are loaded concurrently and the call waits for all of them.
    /// Documents that fail to load are left out (the result is then
    /// degraded), as are documents with `active: false`. Never absent.
    pub async fn load_collection(&self, collection: &str) -> Outcome<Arc<Vec<Arc<ContentRecord>>>> {
        let key = collection_key(collection);
        if let Some(Cached::Collection(records, degradation)) = self.cache.get(&key) {
            return Outcome::tagged(records, degradation);
        }

        let slugs: Vec<String> = self
            .lister
            .list(collection)
            .await
            .iter()
            .filter_map(|name| self.slug_for(name))
            .collect();
        tracing::debug!("Collection {}: {} documents listed", collection, slugs.len());

        let outcomes = join_all(
            slugs
                .iter()
                .map(|slug| self.load_content(collection, slug)),
        )
        .await;

        let total = outcomes.len();
        let loaded: Vec<Arc<ContentRecord>> = outcomes
            .into_iter()
            .filter_map(Outcome::into_value)
            .collect();
        let failed = total - loaded.len();

        let records: Vec<Arc<ContentRecord>> =
            loaded.into_iter().filter(|record| record.is_active()).collect();
        let records = Arc::new(records);

        let degradation = (failed > 0).then(|| {
            tracing::warn!(
                "Collection {}: {} of {} documents failed to load",
                collection,
                failed,
                total
            );
            Degradation::PartialCollection { failed, total }
        });
        self.cache
            .set(key, Cached::Collection(Arc::clone(&records), degradation.clone()));

        Outcome::tagged(records, degradation)
    }

    /// Load the global settings.
    ///
    /// Absent only when the file cannot be fetched; malformed YAML gives a
    /// degraded, empty mapping that is cached like any other result.
    pub async fn load_settings(&self) -> Outcome<Arc<Settings>> {
        if let Some(Cached::Settings(settings, degradation)) = self.cache.get(SETTINGS_KEY) {
            return Outcome::tagged(settings, degradation);
        }

        let raw = match self.fetcher.fetch(&self.settings_path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to load settings: {}", e);
                return Outcome::Absent(e.into());
            }
        };

        let (settings, degradation) = match parse_yaml_mapping(&raw) {
            Ok(settings) => (settings, None),
            Err(e) => {
                tracing::warn!("Failed to parse settings, using empty: {}", e);
                (Settings::new(), Some(Degradation::MalformedYaml(e)))
            }
        };

        let settings = Arc::new(settings);
        self.cache.set(
            SETTINGS_KEY,
            Cached::Settings(Arc::clone(&settings), degradation.clone()),
        );

        Outcome::tagged(settings, degradation)
    }

    /// Load a document, or build it from the default table when absent
    pub async fn load_content_or_default(
        &self,
        collection: &str,
        slug: &str,
    ) -> Option<Arc<ContentRecord>> {
        match self.load_content(collection, slug).await {
            Outcome::Absent(_) => self.default_for(collection, slug).map(Arc::new),
            outcome => outcome.into_value(),
        }
    }

    /// The default record for a slot, if the table has one
    pub fn default_for(&self, collection: &str, slug: &str) -> Option<ContentRecord> {
        let record = self
            .defaults
            .as_ref()?
            .get(collection, slug, &self.renderer)?;
        tracing::debug!("Using default content for {}/{}", collection, slug);
        Some(record)
    }

    /// Slug of a listed file, if it is a document
    fn slug_for(&self, name: &str) -> Option<String> {
        let path = Path::new(name);
        let extension = path.extension()?.to_str()?;
        if extension != self.extension {
            return None;
        }
        path.file_stem()?.to_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::memory::MemorySource;
    use serde_yaml::Value;
    use std::time::Duration;

    fn loader_for(source: Arc<MemorySource>) -> ContentLoader {
        ContentLoader::new(
            source.clone(),
            source,
            Arc::new(ContentCache::new(Duration::from_secs(300))),
        )
    }

    fn services() -> MemorySource {
        MemorySource::new()
            .with_file(
                "services/roofing.md",
                "---\ntitle: Roofing\norder: 1\n---\nWe fix **roofs**.",
            )
            .with_file(
                "services/decks.md",
                "---\ntitle: Decks\nactive: true\n---\nDecks.",
            )
            .with_file(
                "services/old.md",
                "---\ntitle: Retired\nactive: false\n---\nGone.",
            )
    }

    #[tokio::test]
    async fn test_load_content() {
        let loader = loader_for(Arc::new(services()));
        let outcome = loader.load_content("services", "roofing").await;
        assert!(outcome.is_ready());

        let record = outcome.into_value().unwrap();
        assert_eq!(record.title(), Some("Roofing"));
        assert_eq!(record.get("order").and_then(Value::as_i64), Some(1));
        assert_eq!(record.raw_body, "We fix **roofs**.");
        assert_eq!(record.body, "<p>We fix <strong>roofs</strong>.</p>\n");
        assert_eq!(record.collection, "services");
        assert_eq!(record.slug, "roofing");
    }

    #[tokio::test]
    async fn test_cache_hit_returns_same_record() {
        let source = Arc::new(services());
        let loader = loader_for(source.clone());

        let first = loader.load_content("services", "roofing").await.into_value().unwrap();
        let second = loader.load_content("services", "roofing").await.into_value().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_expiry_refetches() {
        let source = Arc::new(services());
        let loader = loader_for(source.clone());

        let first = loader.load_content("services", "roofing").await.into_value().unwrap();
        source.put("services/roofing.md", "---\ntitle: Roofing v2\n---\nNew.");

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(loader.cache().get("services:roofing").is_none());
        assert_eq!(loader.cache().len(), 0);

        let second = loader.load_content("services", "roofing").await.into_value().unwrap();
        assert_eq!(source.fetch_count(), 2);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.title(), Some("Roofing v2"));
    }

    #[tokio::test]
    async fn test_missing_document_is_absent_and_not_cached() {
        let source = Arc::new(services());
        let loader = loader_for(source.clone());

        let outcome = loader.load_content("services", "plumbing").await;
        assert!(matches!(outcome, Outcome::Absent(LoadError::Fetch(_))));
        assert!(loader.cache().is_empty());

        source.put("services/plumbing.md", "---\ntitle: Plumbing\n---\nPipes.");
        let outcome = loader.load_content("services", "plumbing").await;
        assert!(outcome.is_ready());
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_format_is_absent() {
        let source = Arc::new(
            MemorySource::new().with_file("services/bad.md", "---\ntitle: Bad\nno closing"),
        );
        let loader = loader_for(source);

        let outcome = loader.load_content("services", "bad").await;
        assert!(matches!(outcome, Outcome::Absent(LoadError::InvalidFormat)));
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_yaml_is_degraded_and_cached() {
        let source = Arc::new(
            MemorySource::new().with_file("services/odd.md", "---\ntitle: [oops\n---\nBody"),
        );
        let loader = loader_for(source.clone());

        let outcome = loader.load_content("services", "odd").await;
        assert!(matches!(
            outcome,
            Outcome::Degraded {
                reason: LoadError::Deserialize(_),
                ..
            }
        ));
        let record = outcome.into_value().unwrap();
        assert!(record.fields.is_empty());
        assert_eq!(record.raw_body, "Body");

        // The cached record keeps its degraded tag
        let again = loader.load_content("services", "odd").await;
        assert!(matches!(
            again,
            Outcome::Degraded {
                reason: LoadError::Deserialize(_),
                ..
            }
        ));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_renderer_disabled_body_equals_raw() {
        let loader = loader_for(Arc::new(services()))
            .with_renderer(Arc::new(MarkdownRenderer::plain_text()));

        let record = loader
            .load_content("services", "roofing")
            .await
            .into_value()
            .unwrap();
        assert_eq!(record.body, record.raw_body);
        assert_eq!(record.body, "We fix **roofs**.");
    }

    #[tokio::test]
    async fn test_collection_filters_inactive() {
        let source = Arc::new(
            MemorySource::new()
                .with_file("portfolio/a.md", "---\ntitle: A\nactive: false\n---\nA")
                .with_file("portfolio/b.md", "---\ntitle: B\n---\nB")
                .with_listing("portfolio", &["a.md", "b.md"]),
        );
        let loader = loader_for(source);

        let outcome = loader.load_collection("portfolio").await;
        assert!(outcome.is_ready());
        let records = outcome.into_value().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "b");

        // Inactive documents stay individually loadable
        let a = loader.load_content("portfolio", "a").await.into_value().unwrap();
        assert!(!a.is_active());
    }

    #[tokio::test]
    async fn test_collection_tolerates_partial_failure() {
        let source = Arc::new(
            services().with_listing("services", &["roofing.md", "missing.md", "decks.md"]),
        );
        let loader = loader_for(source);

        let outcome = loader.load_collection("services").await;
        assert!(matches!(
            outcome,
            Outcome::Degraded {
                reason: LoadError::PartialCollection { failed: 1, total: 3 },
                ..
            }
        ));
        let slugs: Vec<_> = outcome
            .into_value()
            .unwrap()
            .iter()
            .map(|r| r.slug.clone())
            .collect();
        assert_eq!(slugs, vec!["roofing", "decks"]);
    }

    #[tokio::test]
    async fn test_partial_collection_stays_degraded_when_cached() {
        let source = Arc::new(services().with_listing("services", &["roofing.md", "missing.md"]));
        let loader = loader_for(source.clone());

        assert!(loader.load_collection("services").await.is_degraded());
        let fetches = source.fetch_count();

        let again = loader.load_collection("services").await;
        assert!(matches!(
            again,
            Outcome::Degraded {
                reason: LoadError::PartialCollection { failed: 1, total: 2 },
                ..
            }
        ));
        assert_eq!(again.value().unwrap().len(), 1);
        assert_eq!(source.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn test_collection_order_ignores_completion_order() {
        let source = Arc::new(
            services()
                .with_delay("services/decks.md", 5)
                .with_delay("services/roofing.md", 2)
                .with_listing("services", &["decks.md", "roofing.md", "old.md"]),
        );
        let loader = loader_for(source.clone());

        let records = loader.load_collection("services").await.into_value().unwrap();
        assert_eq!(
            source.completed(),
            vec!["services/old.md", "services/roofing.md", "services/decks.md"]
        );
        let slugs: Vec<_> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["decks", "roofing"]);
    }

    #[tokio::test]
    async fn test_collection_keeps_listing_order_and_skips_other_files() {
        let source = Arc::new(services().with_listing(
            "services",
            &["decks.md", "index.html", "old.md", "roofing.md", "notes.txt"],
        ));
        let loader = loader_for(source.clone());

        let records = loader.load_collection("services").await.into_value().unwrap();
        let slugs: Vec<_> = records.iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(slugs, vec!["decks", "roofing"]);
        assert_eq!(source.fetch_count(), 3);

        // Second call is served from the collection entry
        let again = loader.load_collection("services").await;
        assert!(again.is_ready());
        assert!(Arc::ptr_eq(&records, again.value().unwrap()));
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_collection_reuses_cached_documents() {
        let source = Arc::new(services().with_listing("services", &["roofing.md"]));
        let loader = loader_for(source.clone());

        let single = loader.load_content("services", "roofing").await.into_value().unwrap();
        let records = loader.load_collection("services").await.into_value().unwrap();
        assert!(Arc::ptr_eq(&single, &records[0]));
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_collection() {
        let loader = loader_for(Arc::new(MemorySource::new()));
        let outcome = loader.load_collection("reviews").await;
        assert!(outcome.is_ready());
        assert!(outcome.value().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_settings() {
        let source = Arc::new(MemorySource::new().with_file(
            "settings/global.yml",
            "company: Acme Renovations\nphone: 555-0100\nsocial:\n  facebook: acme\n",
        ));
        let loader = loader_for(source.clone());

        let settings = loader.load_settings().await.into_value().unwrap();
        assert_eq!(
            settings.get("company").and_then(Value::as_str),
            Some("Acme Renovations")
        );
        assert!(settings["social"].is_mapping());

        assert!(loader.load_settings().await.is_ready());
        assert_eq!(source.fetch_count(), 1);
        assert!(loader.cache().get(SETTINGS_KEY).is_some());
    }

    #[tokio::test]
    async fn test_malformed_settings_are_empty_not_absent() {
        let source = Arc::new(
            MemorySource::new().with_file("settings/global.yml", "company: [Acme\nphone: 1"),
        );
        let loader = loader_for(source.clone());

        let outcome = loader.load_settings().await;
        assert!(outcome.is_degraded());
        assert!(outcome.value().unwrap().is_empty());

        let again = loader.load_settings().await;
        assert!(matches!(
            again,
            Outcome::Degraded {
                reason: LoadError::Deserialize(_),
                ..
            }
        ));
        assert!(again.value().unwrap().is_empty());
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_settings_are_absent() {
        let loader = loader_for(Arc::new(MemorySource::new()));
        assert!(loader.load_settings().await.is_absent());
        assert!(loader.cache().is_empty());
    }

    #[tokio::test]
    async fn test_custom_settings_path_and_extension() {
        let source = Arc::new(
            MemorySource::new()
                .with_file("config/site.yaml", "name: Acme")
                .with_file("services/roofing.markdown", "---\ntitle: R\n---\nR")
                .with_listing("services", &["roofing.markdown", "skip.md"]),
        );
        let loader = loader_for(source)
            .with_settings_path("config/site.yaml")
            .with_extension("markdown");

        assert!(loader.load_settings().await.is_ready());
        let records = loader.load_collection("services").await.into_value().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "roofing");
    }

    #[tokio::test]
    async fn test_load_content_or_default() {
        let defaults = DefaultContent::from_yaml_str(
            "services:\n  plumbing:\n    title: Plumbing\n    body: Default pipes.\n",
        )
        .unwrap();
        let loader = loader_for(Arc::new(services())).with_defaults(defaults);

        let real = loader.load_content_or_default("services", "roofing").await.unwrap();
        assert_eq!(real.title(), Some("Roofing"));

        let fallback = loader.load_content_or_default("services", "plumbing").await.unwrap();
        assert_eq!(fallback.title(), Some("Plumbing"));
        assert_eq!(fallback.body, "<p>Default pipes.</p>\n");

        assert!(loader.load_content_or_default("services", "hvac").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_cache() {
        let source = Arc::new(services());
        let loader = loader_for(source.clone());

        loader.load_content("services", "roofing").await;
        loader.clear_cache();
        loader.load_content("services", "roofing").await;
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_both_fetch() {
        let source = Arc::new(services());
        let loader = loader_for(source.clone());

        let (a, b) = tokio::join!(
            loader.load_content("services", "roofing"),
            loader.load_content("services", "roofing")
        );
        assert!(a.is_ready() && b.is_ready());
        assert_eq!(source.fetch_count(), 2);
        assert_eq!(loader.cache().len(), 1);
    }
}
