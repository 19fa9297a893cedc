use std::sync::Arc;

use promptdex_client::MemoryCatalog;
use promptdex_core::entry::{Entry, EntryDraft, RawPrompt};
use promptdex_core::store::CatalogStore;

/// Seed one entry with a body that mentions its own title, so free-text
/// search finds it by either axis.
pub async fn seed_entry(
    store: &MemoryCatalog,
    title: &str,
    tags: &[&str],
    model: &[&str],
) -> Entry {
    store
        .create_entry(&EntryDraft {
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            model_scope: model.iter().map(|m| m.to_string()).collect(),
            raw: RawPrompt {
                positive: format!("{title}, detailed, {{style}} lighting"),
                negative: "blurry".to_string(),
            },
            variables: [("style".to_string(), "soft".to_string())].into(),
            ..EntryDraft::default()
        })
        .await
        .expect("seed entry")
}

/// Seed `count` entries titled `Entry 001` … in creation order, so the
/// most recently updated record is the last one seeded.
#[allow(dead_code)]
pub async fn seed_many(store: &MemoryCatalog, count: usize) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(count);
    for index in 1..=count {
        entries.push(seed_entry(store, &format!("Entry {index:03}"), &["bulk"], &[]).await);
    }
    entries
}

/// A fresh store wrapped for the coordinator/entry-store constructors.
#[allow(dead_code)]
pub fn shared(store: MemoryCatalog) -> Arc<MemoryCatalog> {
    Arc::new(store)
}
