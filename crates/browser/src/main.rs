//! Demo driver for the catalog browser core.
//!
//! Lists the first page of the catalog and, when `PROMPTDEX_QUERY` or
//! `PROMPTDEX_TITLE` is set, resolves that binding and prints the outcome.
//! `PROMPTDEX_OFFLINE=1` runs against a seeded in-memory store instead of
//! the remote one.

use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptdex_browser::config::BrowserConfig;
use promptdex_browser::notify::NotificationCenter;
use promptdex_browser::resolver::{resolve, Resolution};
use promptdex_browser::view_state::ViewController;
use promptdex_browser::widgets::{read_binding, JsonNodeWidgets};
use promptdex_client::{HttpCatalog, MemoryCatalog};
use promptdex_core::entry::{EntryDraft, RawPrompt};
use promptdex_core::store::CatalogStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptdex=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BrowserConfig::from_env();
    let offline = std::env::var("PROMPTDEX_OFFLINE").is_ok_and(|v| v == "1");

    let store: Arc<dyn CatalogStore> = if offline {
        tracing::info!("Running against the in-memory store");
        Arc::new(seed_demo_catalog().await?)
    } else {
        tracing::info!(base_url = %config.base_url, "Connecting to catalog store");
        Arc::new(HttpCatalog::new(config.base_url.clone()))
    };

    let toasts = NotificationCenter::new();
    let mut view = ViewController::with_page_limit(Arc::clone(&store), config.page_limit);
    if let Err(err) = view.reload().await {
        toasts.report("Failed to load the catalog", &err);
        print_toasts(&toasts);
        std::process::exit(1);
    }
    toasts.success(format!("Loaded {} entries", view.page().total));

    let (page, pages) = view.page_position();
    println!(
        "{} entries ({} page{}), showing page {}:",
        view.page().total,
        pages,
        if pages == 1 { "" } else { "s" },
        page
    );
    for row in &view.page().items {
        let star = if row.favorite { "*" } else { " " };
        println!(
            "  {star} [{}] {:<40} v{} tags: {}",
            &row.id[..row.id.len().min(14)],
            row.title,
            row.version,
            row.tags.join(", "),
        );
    }

    let query = std::env::var("PROMPTDEX_QUERY").unwrap_or_default();
    let title = std::env::var("PROMPTDEX_TITLE").unwrap_or_default();
    if !query.is_empty() || !title.is_empty() {
        let widgets = JsonNodeWidgets::from_value(json!({
            "mode": "auto",
            "query": query,
            "title": title,
        }));
        let binding = read_binding(&widgets);
        match resolve(store.as_ref(), &binding).await {
            Ok(Resolution::Resolved { entry, tag }) => {
                println!(
                    "\nResolved [{}] \"{}\" ({})",
                    entry.id,
                    entry.title,
                    tag.as_str()
                );
            }
            Ok(Resolution::NoMatch) => println!("\nNo match: the catalog is empty"),
            Err(err) => {
                toasts.report("Resolution failed", &err);
            }
        }
    }

    print_toasts(&toasts);
    Ok(())
}

/// Stand-in for the toast renderer: dump whatever is still active.
fn print_toasts(toasts: &NotificationCenter) {
    for toast in toasts.active() {
        println!("[{:?}] {}", toast.severity, toast.message);
    }
}

/// A couple of records so the offline mode has something to browse.
async fn seed_demo_catalog() -> anyhow::Result<MemoryCatalog> {
    let store = MemoryCatalog::new();
    store
        .create_entry(&EntryDraft {
            title: "Cinematic Portrait".into(),
            tags: vec!["portrait".into(), "cinematic".into()],
            model_scope: vec!["SDXL".into()],
            raw: RawPrompt {
                positive: "cinematic portrait of {subject}, warm rim light".into(),
                negative: "blurry, low quality".into(),
            },
            variables: [("subject".to_string(), "a sailor".to_string())].into(),
            ..EntryDraft::default()
        })
        .await?;
    store
        .create_entry(&EntryDraft {
            title: "Moody Landscape".into(),
            tags: vec!["landscape".into()],
            model_scope: vec!["Flux".into()],
            raw: RawPrompt {
                positive: "moody mountain landscape, rolling fog".into(),
                negative: String::new(),
            },
            ..EntryDraft::default()
        })
        .await?;
    Ok(store)
}
