//! crates/toffee_core/src/marketplace.rs
//!
//! Share and import orchestration for the cross-user marketplace.
//!
//! Dedup here is check-then-write, not transactional: two concurrent
//! shares of identical content can both land, so "at most one entry per
//! (sharer, digest)" is a soft guarantee. The store offers no uniqueness
//! constraint across these collections, and upgrading silently would
//! change observable behavior.

use uuid::Uuid;

use crate::domain::{Document, MarketplaceEntry, NewMarketplaceEntry};
use crate::hash::content_hash;
use crate::ports::{PortError, PortResult, StudyStore};

/// The sharer name used when a user never set a username.
const ANONYMOUS: &str = "anonymous";

/// Publishes one of the user's documents to the marketplace.
///
/// Fails with [`PortError::AlreadyShared`] when this user has already
/// published content with the same digest.
pub async fn share_document(
    store: &dyn StudyStore,
    owner_id: Uuid,
    document_id: Uuid,
    tags: Vec<String>,
) -> PortResult<MarketplaceEntry> {
    let profile = store.get_profile(owner_id).await?;
    let shared_by = if profile.username.trim().is_empty() {
        ANONYMOUS.to_string()
    } else {
        profile.username
    };

    let doc = store.get_document(owner_id, document_id).await?;
    // Rows predating content addressing carry an empty hash; derive it
    // from the text so dedup still holds.
    let text_hash = if doc.text_hash.is_empty() {
        content_hash(&doc.text)
    } else {
        doc.text_hash.clone()
    };

    if store.find_share(&shared_by, &text_hash).await?.is_some() {
        return Err(PortError::AlreadyShared);
    }

    store
        .publish_entry(NewMarketplaceEntry {
            summary: doc.summary,
            text: doc.text,
            text_hash,
            questions: doc.questions,
            flashcards: doc.flashcards,
            shared_by,
            tags,
        })
        .await
}

/// Copies a marketplace entry into the user's own documents.
///
/// Fails with [`PortError::NotFound`] when the entry is gone and with
/// [`PortError::AlreadyImported`] — performing no write — when the user
/// already holds a copy, whether imported by id or matching by digest
/// (the case where the importer is the original sharer).
pub async fn import_document(
    store: &dyn StudyStore,
    owner_id: Uuid,
    entry_id: Uuid,
) -> PortResult<Document> {
    let entry = store.get_marketplace_entry(entry_id).await?;

    if store
        .has_imported(owner_id, entry.id, &entry.text_hash)
        .await?
    {
        return Err(PortError::AlreadyImported);
    }

    store.import_entry(owner_id, &entry).await
}
