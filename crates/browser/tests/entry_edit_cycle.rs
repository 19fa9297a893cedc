//! The optimistic read-mutate-refresh cycle: conflict detection on stale
//! version pairs, canonical re-fetch with re-derived assembled text, local
//! validation before any request, and list invalidation feeding the view
//! coordinator.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use common::{seed_entry, shared};
use promptdex_browser::entry_store::EntryStore;
use promptdex_browser::view_state::ViewController;
use promptdex_client::MemoryCatalog;
use promptdex_core::entry::{EntryPatch, RawPrompt};
use promptdex_core::error::CoreError;
use promptdex_core::search::SortKey;
use promptdex_core::store::CatalogStore;

#[tokio::test]
async fn load_populates_entry_assembly_and_placeholders() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &["a"], &[]).await;

    let mut editor = EntryStore::new(store.clone());
    let view = editor.load(&entry.id).await.unwrap();

    assert_eq!(view.entry.version, 1);
    // The seeded body reads "… {style} lighting" with style = "soft".
    assert!(view.assembled.positive.contains("soft lighting"));
    assert_eq!(view.placeholders(), vec!["style"]);
    assert!(!editor.is_busy());
}

#[tokio::test]
async fn favorite_toggle_refreshes_the_canonical_record() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &[], &[]).await;

    let mut editor = EntryStore::new(store.clone());
    editor.load(&entry.id).await.unwrap();
    assert_eq!(editor.list_generation(), 0);

    let view = editor.toggle_favorite().await.unwrap();
    assert!(view.entry.favorite);
    assert_eq!(view.entry.version, 2, "refreshed from the store, not patched locally");
    assert_eq!(editor.list_generation(), 1);

    let view = editor.toggle_favorite().await.unwrap();
    assert!(!view.entry.favorite);
    assert_eq!(view.entry.version, 3);
    assert_eq!(editor.list_generation(), 2);
}

#[tokio::test]
async fn second_writer_with_stale_pair_gets_a_conflict() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &[], &[]).await;

    // Two detail panes loaded the same snapshot.
    let mut first = EntryStore::new(store.clone());
    let mut second = EntryStore::new(store.clone());
    first.load(&entry.id).await.unwrap();
    second.load(&entry.id).await.unwrap();

    first.toggle_favorite().await.unwrap();

    let result = second.set_score(4).await;
    assert_matches!(result, Err(CoreError::Conflict(_)));

    // The losing pane's rendered state is untouched and nothing was
    // invalidated on its side.
    let stale = second.current().unwrap();
    assert_eq!(stale.entry.version, 1);
    assert_eq!(stale.entry.score, 0);
    assert_eq!(second.list_generation(), 0);
    assert!(!second.is_busy());
}

#[tokio::test]
async fn out_of_range_score_is_rejected_before_any_request() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &[], &[]).await;

    let mut editor = EntryStore::new(store.clone());
    editor.load(&entry.id).await.unwrap();

    assert_matches!(editor.set_score(6).await, Err(CoreError::Validation(_)));
    assert_eq!(editor.list_generation(), 0);

    // The record never saw a mutation.
    let untouched = store.get_entry(&entry.id).await.unwrap();
    assert_eq!(untouched.version, 1);
}

#[tokio::test]
async fn editing_the_raw_body_rederives_the_assembled_text() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &[], &[]).await;

    let mut editor = EntryStore::new(store.clone());
    editor.load(&entry.id).await.unwrap();

    let view = editor
        .mutate(EntryPatch {
            raw: Some(RawPrompt {
                positive: "rebuilt body with {style} glow".into(),
                negative: String::new(),
            }),
            ..EntryPatch::default()
        })
        .await
        .unwrap();

    // Derived text reflects the server's substitution of the new body,
    // not an echo of the patch.
    assert_eq!(view.assembled.positive, "rebuilt body with soft glow");
}

#[tokio::test]
async fn override_preview_shadows_entry_variables_without_mutating() {
    let store = shared(MemoryCatalog::new());
    let entry = seed_entry(&store, "Portrait A", &[], &[]).await;

    let mut editor = EntryStore::new(store.clone());
    editor.load(&entry.id).await.unwrap();

    let overrides = BTreeMap::from([("style".to_string(), "harsh".to_string())]);
    let view = editor.preview_with_overrides(&overrides).await.unwrap();
    assert!(view.assembled.positive.contains("harsh lighting"));

    assert_eq!(store.get_entry(&entry.id).await.unwrap().version, 1);
    assert_eq!(editor.list_generation(), 0);
}

#[tokio::test]
async fn successful_mutation_makes_the_list_reorder_under_favorite_sort() {
    let store = shared(MemoryCatalog::new());
    let plain = seed_entry(&store, "Older Plain", &[], &[]).await;
    seed_entry(&store, "Newer Plain", &[], &[]).await;

    let mut view = ViewController::new(store.clone());
    view.set_sort(SortKey::FavoriteDesc).await.unwrap();
    assert_eq!(view.page().items[0].title, "Newer Plain");

    let mut editor = EntryStore::new(store.clone());
    editor.load(&plain.id).await.unwrap();
    editor.toggle_favorite().await.unwrap();

    // The mutation invalidated the list; syncing reissues the current
    // query and the favorite now leads.
    assert!(view.ensure_fresh(editor.list_generation()).await.unwrap());
    assert_eq!(view.page().items[0].title, "Older Plain");

    // Unchanged generation: no further reload.
    assert!(!view.ensure_fresh(editor.list_generation()).await.unwrap());
}
