//! In-process reference implementation of the catalog store.
//!
//! Models the behavior the browser relies on the real store for: id
//! assignment, the version/`updated_at` pair moving together on every
//! mutation, conflict detection against the expected pair, soft delete and
//! purge, filtered search with the three sort keys, and `{name}` variable
//! substitution during assembly. The store also keeps a log of list
//! queries so resolver tests can assert exactly which fallback attempts
//! were issued.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use promptdex_core::entry::{
    AssembledPrompt, Entry, EntryDraft, EntryPage, EntryPatch, EntryStatus, EntrySummary,
    TagSummary,
};
use promptdex_core::error::CoreError;
use promptdex_core::search::{ListQuery, SortKey};
use promptdex_core::store::CatalogStore;
use promptdex_core::text::{normalize_tags, normalize_text, positive_preview};
use promptdex_core::types::{EntryId, Timestamp};

/// In-memory catalog store.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<EntryId, Entry>,
    tags: BTreeMap<String, Timestamp>,
    list_log: Vec<ListQuery>,
    clock: Option<Timestamp>,
}

impl Inner {
    /// Strictly increasing store clock. Guarantees that consecutive
    /// mutations never share an `updated_at`, so the version pair is
    /// always distinguishable.
    fn tick(&mut self) -> Timestamp {
        let now = Utc::now();
        let stamped = match self.clock {
            Some(prev) if now <= prev => prev + Duration::milliseconds(1),
            _ => now,
        };
        self.clock = Some(stamped);
        stamped
    }

    fn register_tags(&mut self, tags: &[String], now: Timestamp) {
        for tag in tags {
            self.tags.entry(tag.clone()).or_insert(now);
        }
    }
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `list_entries` calls issued so far.
    pub fn list_call_count(&self) -> usize {
        self.inner.lock().expect("store lock").list_log.len()
    }

    /// Snapshot of every `list_entries` call, in issue order.
    pub fn list_calls(&self) -> Vec<ListQuery> {
        self.inner.lock().expect("store lock").list_log.clone()
    }

    /// Forget the recorded call log (keeps the data).
    pub fn clear_call_log(&self) {
        self.inner.lock().expect("store lock").list_log.clear();
    }

    /// Attach or remove a thumbnail flag. Stands in for the image upload
    /// path, which is out of scope; still a mutation, so the version pair
    /// moves like any other edit.
    pub fn mark_thumbnail(&self, id: &str, has_thumbnail: bool) -> Result<(), CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let now = inner.tick();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| CoreError::entry_not_found(id))?;
        entry.has_thumbnail = has_thumbnail;
        entry.version += 1;
        entry.updated_at = now;
        Ok(())
    }

    fn summary(entry: &Entry) -> EntrySummary {
        EntrySummary {
            id: entry.id.clone(),
            title: entry.title.clone(),
            version: entry.version,
            tags: entry.tags.clone(),
            model_scope: entry.model_scope.clone(),
            favorite: entry.favorite,
            score: entry.score,
            has_thumbnail: entry.has_thumbnail,
            positive_preview: positive_preview(&entry.raw.positive),
            updated_at: entry.updated_at,
        }
    }

    fn matches(entry: &Entry, query: &ListQuery) -> bool {
        if entry.status != query.status {
            return false;
        }
        if query.favorite_only && !entry.favorite {
            return false;
        }
        if query.has_thumbnail && !entry.has_thumbnail {
            return false;
        }
        if !query.model.is_empty() {
            let needle = query.model.to_lowercase();
            if !entry
                .model_scope
                .iter()
                .any(|scope| scope.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        for tag in &query.tags {
            let needle = tag.to_lowercase();
            if !entry
                .tags
                .iter()
                .any(|candidate| candidate.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        if !query.q.is_empty() {
            let needle = query.q.to_lowercase();
            let tag_text = entry.tags.join(" ");
            let hit = entry.title.to_lowercase().contains(&needle)
                || entry.raw.positive.to_lowercase().contains(&needle)
                || entry.raw.negative.to_lowercase().contains(&needle)
                || tag_text.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        true
    }

    fn sort_rows(rows: &mut [&Entry], sort: SortKey) {
        match sort {
            SortKey::UpdatedDesc => {
                rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
            }
            SortKey::ScoreDesc => {
                rows.sort_by(|a, b| {
                    b.score
                        .cmp(&a.score)
                        .then(b.updated_at.cmp(&a.updated_at))
                        .then(a.id.cmp(&b.id))
                });
            }
            SortKey::FavoriteDesc => {
                rows.sort_by(|a, b| {
                    b.favorite
                        .cmp(&a.favorite)
                        .then(b.score.cmp(&a.score))
                        .then(b.updated_at.cmp(&a.updated_at))
                        .then(a.id.cmp(&b.id))
                });
            }
        }
    }

    fn apply_patch(entry: &mut Entry, patch: &EntryPatch) {
        if let Some(title) = &patch.title {
            let title = normalize_text(title);
            if !title.is_empty() {
                entry.title = title;
            }
        }
        if let Some(tags) = &patch.tags {
            entry.tags = normalize_tags(tags);
        }
        if let Some(model_scope) = &patch.model_scope {
            entry.model_scope = normalize_tags(model_scope);
        }
        if let Some(variables) = &patch.variables {
            entry.variables = variables.clone();
        }
        if let Some(raw) = &patch.raw {
            entry.raw = raw.clone();
        }
        if let Some(params) = &patch.params {
            entry.params = params.clone();
        }
        if let Some(status) = patch.status {
            entry.status = status;
        }
        if let Some(favorite) = patch.favorite {
            entry.favorite = favorite;
        }
        if let Some(score) = patch.score {
            entry.score = score;
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn list_entries(&self, query: &ListQuery) -> Result<EntryPage, CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        inner.list_log.push(query.clone());

        let mut rows: Vec<&Entry> = inner
            .entries
            .values()
            .filter(|entry| Self::matches(entry, query))
            .collect();
        Self::sort_rows(&mut rows, query.sort);

        let total = rows.len() as i64;
        let offset = query.offset.max(0) as usize;
        let limit = query.limit.max(0) as usize;
        let items = rows
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|entry| Self::summary(entry))
            .collect();
        Ok(EntryPage { items, total })
    }

    async fn get_entry(&self, id: &str) -> Result<Entry, CoreError> {
        let inner = self.inner.lock().expect("store lock");
        match inner.entries.get(id) {
            Some(entry) if entry.status == EntryStatus::Active => Ok(entry.clone()),
            _ => Err(CoreError::entry_not_found(id)),
        }
    }

    async fn create_entry(&self, draft: &EntryDraft) -> Result<Entry, CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let now = inner.tick();

        let title = normalize_text(&draft.title);
        let entry = Entry {
            id: format!("entry_{}", uuid::Uuid::new_v4().simple()),
            title: if title.is_empty() {
                "Untitled".to_string()
            } else {
                title
            },
            status: EntryStatus::Active,
            version: 1,
            tags: normalize_tags(&draft.tags),
            model_scope: normalize_tags(&draft.model_scope),
            variables: draft.variables.clone(),
            raw: draft.raw.clone(),
            params: draft.params.clone(),
            favorite: false,
            score: 0,
            has_thumbnail: false,
            created_at: now,
            updated_at: now,
        };
        inner.register_tags(&entry.tags, now);
        inner.entries.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: &str,
        patch: &EntryPatch,
        expected_version: i64,
        expected_updated_at: Timestamp,
    ) -> Result<Entry, CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let now = inner.tick();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| CoreError::entry_not_found(id))?;

        if entry.version != expected_version || entry.updated_at != expected_updated_at {
            return Err(CoreError::Conflict(format!(
                "entry {id} changed: expected v{expected_version}@{expected_updated_at}, \
                 current v{}@{}",
                entry.version, entry.updated_at
            )));
        }

        Self::apply_patch(entry, patch);
        entry.version += 1;
        entry.updated_at = now;
        let updated = entry.clone();
        inner.register_tags(&updated.tags, now);
        Ok(updated)
    }

    async fn delete_entry(&self, id: &str) -> Result<Entry, CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let now = inner.tick();
        let entry = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| CoreError::entry_not_found(id))?;
        entry.status = EntryStatus::Deleted;
        entry.version += 1;
        entry.updated_at = now;
        Ok(entry.clone())
    }

    async fn purge_deleted(&self) -> Result<u64, CoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| entry.status != EntryStatus::Deleted);
        Ok((before - inner.entries.len()) as u64)
    }

    async fn assemble(
        &self,
        id: &str,
        overrides: &BTreeMap<String, String>,
    ) -> Result<AssembledPrompt, CoreError> {
        let inner = self.inner.lock().expect("store lock");
        let entry = match inner.entries.get(id) {
            Some(entry) if entry.status == EntryStatus::Active => entry,
            _ => return Err(CoreError::entry_not_found(id)),
        };

        let mut variables = entry.variables.clone();
        for (key, value) in overrides {
            variables.insert(key.clone(), value.clone());
        }

        let mut positive = entry.raw.positive.clone();
        let mut negative = entry.raw.negative.clone();
        for (key, value) in &variables {
            let placeholder = format!("{{{key}}}");
            positive = positive.replace(&placeholder, value);
            negative = negative.replace(&placeholder, value);
        }
        Ok(AssembledPrompt { positive, negative })
    }

    async fn list_tags(&self, limit: i64) -> Result<Vec<TagSummary>, CoreError> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .tags
            .iter()
            .take(limit.max(0) as usize)
            .map(|(name, created_at)| TagSummary {
                name: name.clone(),
                created_at: *created_at,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use promptdex_core::entry::RawPrompt;

    use super::*;

    fn draft(title: &str, tags: &[&str], model: &[&str]) -> EntryDraft {
        EntryDraft {
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            model_scope: model.iter().map(|m| m.to_string()).collect(),
            ..EntryDraft::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_identity_and_version_one() {
        let store = MemoryCatalog::new();
        let entry = store
            .create_entry(&draft("Portrait A", &["a"], &["SDXL"]))
            .await
            .unwrap();
        assert!(entry.id.starts_with("entry_"));
        assert_eq!(entry.version, 1);
        assert_eq!(entry.status, EntryStatus::Active);
        assert_eq!(entry.updated_at, entry.created_at);
    }

    #[tokio::test]
    async fn update_bumps_version_and_timestamp_together() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(&draft("A", &[], &[])).await.unwrap();
        let updated = store
            .update_entry(
                &entry.id,
                &EntryPatch::favorite(true),
                entry.version,
                entry.updated_at,
            )
            .await
            .unwrap();
        assert_eq!(updated.version, 2);
        assert!(updated.updated_at > entry.updated_at);
        assert!(updated.favorite);
    }

    #[tokio::test]
    async fn stale_pair_conflicts_after_first_writer_wins() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(&draft("A", &[], &[])).await.unwrap();

        // Two affordances captured the same (version, updated_at) snapshot.
        let first = store
            .update_entry(
                &entry.id,
                &EntryPatch::favorite(true),
                entry.version,
                entry.updated_at,
            )
            .await;
        assert!(first.is_ok());

        let second = store
            .update_entry(
                &entry.id,
                &EntryPatch::score(4),
                entry.version,
                entry.updated_at,
            )
            .await;
        assert_matches!(second, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn stale_timestamp_alone_conflicts() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(&draft("A", &[], &[])).await.unwrap();
        let result = store
            .update_entry(
                &entry.id,
                &EntryPatch::favorite(true),
                entry.version,
                entry.updated_at - Duration::seconds(1),
            )
            .await;
        assert_matches!(result, Err(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn soft_delete_hides_from_get_but_not_from_deleted_list() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(&draft("A", &[], &[])).await.unwrap();
        store.delete_entry(&entry.id).await.unwrap();

        assert_matches!(
            store.get_entry(&entry.id).await,
            Err(CoreError::NotFound { .. })
        );

        let deleted = store
            .list_entries(&ListQuery {
                status: EntryStatus::Deleted,
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted.total, 1);
    }

    #[tokio::test]
    async fn restore_goes_through_the_update_path() {
        let store = MemoryCatalog::new();
        let entry = store.create_entry(&draft("A", &[], &[])).await.unwrap();
        let deleted = store.delete_entry(&entry.id).await.unwrap();

        let restored = store
            .update_entry(
                &entry.id,
                &EntryPatch::status(EntryStatus::Active),
                deleted.version,
                deleted.updated_at,
            )
            .await
            .unwrap();
        assert_eq!(restored.status, EntryStatus::Active);
        assert!(store.get_entry(&entry.id).await.is_ok());
    }

    #[tokio::test]
    async fn purge_removes_only_deleted_rows() {
        let store = MemoryCatalog::new();
        let keep = store.create_entry(&draft("Keep", &[], &[])).await.unwrap();
        let gone = store.create_entry(&draft("Gone", &[], &[])).await.unwrap();
        store.delete_entry(&gone.id).await.unwrap();

        assert_eq!(store.purge_deleted().await.unwrap(), 1);
        assert!(store.get_entry(&keep.id).await.is_ok());
        assert_matches!(
            store.get_entry(&gone.id).await,
            Err(CoreError::NotFound { .. })
        );
    }

    #[tokio::test]
    async fn search_filters_by_text_tags_and_model() {
        let store = MemoryCatalog::new();
        store
            .create_entry(&draft("Portrait A", &["a"], &["SDXL"]))
            .await
            .unwrap();
        store
            .create_entry(&draft("Landscape B", &["b"], &["Flux"]))
            .await
            .unwrap();

        let hit = store
            .list_entries(&ListQuery {
                q: "portrait".into(),
                tags: vec!["a".into()],
                model: "SDXL".into(),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(hit.total, 1);
        assert_eq!(hit.items[0].title, "Portrait A");

        let miss = store
            .list_entries(&ListQuery {
                q: "portrait".into(),
                model: "Flux".into(),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(miss.total, 0);
    }

    #[tokio::test]
    async fn favorite_sort_puts_favorites_first() {
        let store = MemoryCatalog::new();
        let plain = store.create_entry(&draft("Plain", &[], &[])).await.unwrap();
        let starred = store.create_entry(&draft("Starred", &[], &[])).await.unwrap();
        // `plain` is older; favorite it so favorite_desc reorders.
        store
            .update_entry(
                &plain.id,
                &EntryPatch::favorite(true),
                plain.version,
                plain.updated_at,
            )
            .await
            .unwrap();
        // Touch `starred` so it is the most recently updated row.
        store
            .update_entry(
                &starred.id,
                &EntryPatch::score(1),
                starred.version,
                starred.updated_at,
            )
            .await
            .unwrap();

        let by_update = store.list_entries(&ListQuery::default()).await.unwrap();
        assert_eq!(by_update.items[0].title, "Starred");

        let by_favorite = store
            .list_entries(&ListQuery {
                sort: SortKey::FavoriteDesc,
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(by_favorite.items[0].title, "Plain");
    }

    #[tokio::test]
    async fn assemble_substitutes_variables_with_overrides_winning() {
        let store = MemoryCatalog::new();
        let mut draft = draft("A", &[], &[]);
        draft.raw = RawPrompt {
            positive: "a {style} portrait, {mood}".into(),
            negative: "no {style}".into(),
        };
        draft.variables =
            BTreeMap::from([("style".into(), "noir".into()), ("mood".into(), "calm".into())]);
        let entry = store.create_entry(&draft).await.unwrap();

        let plain = store.assemble(&entry.id, &BTreeMap::new()).await.unwrap();
        assert_eq!(plain.positive, "a noir portrait, calm");
        assert_eq!(plain.negative, "no noir");

        let overridden = store
            .assemble(&entry.id, &BTreeMap::from([("style".into(), "pastel".into())]))
            .await
            .unwrap();
        assert_eq!(overridden.positive, "a pastel portrait, calm");
    }

    #[tokio::test]
    async fn tags_register_on_create_and_list_alphabetically() {
        let store = MemoryCatalog::new();
        store
            .create_entry(&draft("A", &["zeta", "alpha"], &[]))
            .await
            .unwrap();
        let tags = store.list_tags(200).await.unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn list_log_records_every_query() {
        let store = MemoryCatalog::new();
        store.list_entries(&ListQuery::default()).await.unwrap();
        store
            .list_entries(&ListQuery {
                q: "x".into(),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(store.list_call_count(), 2);
        assert_eq!(store.list_calls()[1].q, "x");
        store.clear_call_log();
        assert_eq!(store.list_call_count(), 0);
    }
}
