//! In-memory reference store
//!
//! Table-per-entity `RwLock<HashMap>` layout. The response table carries
//! its `(survey, user)` unique index inside the same lock as the primary
//! map, making the upsert a single critical section - the in-memory
//! equivalent of a unique-constraint-backed upsert.

use crate::{ResponseDraft, ResponseStore, SurveyStore};
use async_trait::async_trait;
use canvass_core::{
    CanvassError, CanvassResult, Response, ResponseId, StorageError, Survey, SurveyId, UserId,
    ValidationState,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct ResponseTables {
    by_id: HashMap<ResponseId, Response>,
    by_survey_user: HashMap<(SurveyId, UserId), ResponseId>,
}

/// In-memory store implementing both repository traits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    surveys: RwLock<HashMap<SurveyId, Survey>>,
    responses: RwLock<ResponseTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn surveys_read(&self) -> CanvassResult<RwLockReadGuard<'_, HashMap<SurveyId, Survey>>> {
        self.surveys
            .read()
            .map_err(|_| CanvassError::Storage(StorageError::LockPoisoned))
    }

    fn surveys_write(&self) -> CanvassResult<RwLockWriteGuard<'_, HashMap<SurveyId, Survey>>> {
        self.surveys
            .write()
            .map_err(|_| CanvassError::Storage(StorageError::LockPoisoned))
    }

    fn responses_read(&self) -> CanvassResult<RwLockReadGuard<'_, ResponseTables>> {
        self.responses
            .read()
            .map_err(|_| CanvassError::Storage(StorageError::LockPoisoned))
    }

    fn responses_write(&self) -> CanvassResult<RwLockWriteGuard<'_, ResponseTables>> {
        self.responses
            .write()
            .map_err(|_| CanvassError::Storage(StorageError::LockPoisoned))
    }
}

#[async_trait]
impl SurveyStore for MemoryStore {
    async fn insert(&self, survey: &Survey) -> CanvassResult<()> {
        let mut surveys = self.surveys_write()?;
        if surveys.contains_key(&survey.survey_id) {
            return Err(CanvassError::Storage(StorageError::InsertFailed {
                entity: "Survey",
                reason: "already exists".to_string(),
            }));
        }
        // Unique compound key over the moderation contract, so two surveys
        // can never share an identical question + guidelines tuple.
        let duplicate = surveys.values().any(|existing| {
            existing.question == survey.question && existing.guidelines == survey.guidelines
        });
        if duplicate {
            return Err(CanvassError::Storage(StorageError::DuplicateKey {
                constraint: "question_guidelines",
            }));
        }
        surveys.insert(survey.survey_id, survey.clone());
        Ok(())
    }

    async fn get(&self, id: SurveyId) -> CanvassResult<Option<Survey>> {
        Ok(self.surveys_read()?.get(&id).cloned())
    }

    async fn list(&self, offset: usize, limit: usize) -> CanvassResult<Vec<Survey>> {
        let surveys = self.surveys_read()?;
        let mut all: Vec<Survey> = surveys.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, survey: &Survey) -> CanvassResult<()> {
        let mut surveys = self.surveys_write()?;
        match surveys.get_mut(&survey.survey_id) {
            Some(stored) => {
                *stored = survey.clone();
                Ok(())
            }
            None => Err(CanvassError::Storage(StorageError::NotFound {
                entity: "Survey",
                id: survey.survey_id,
            })),
        }
    }

    async fn delete(&self, id: SurveyId) -> CanvassResult<()> {
        let mut surveys = self.surveys_write()?;
        match surveys.remove(&id) {
            Some(_) => Ok(()),
            None => Err(CanvassError::Storage(StorageError::NotFound {
                entity: "Survey",
                id,
            })),
        }
    }

    async fn search(&self, query: &str) -> CanvassResult<Vec<Survey>> {
        let needle = query.to_lowercase();
        let surveys = self.surveys_read()?;
        let mut hits: Vec<Survey> = surveys
            .values()
            .filter(|s| {
                s.area.to_lowercase().contains(&needle)
                    || s.question.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits)
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn upsert_by_survey_user(&self, draft: ResponseDraft) -> CanvassResult<Response> {
        let mut tables = self.responses_write()?;
        let key = (draft.survey_id, draft.user_id);

        if let Some(existing_id) = tables.by_survey_user.get(&key).copied() {
            // Replace in place: same ID, fresh content and moderation state.
            let response = tables
                .by_id
                .get_mut(&existing_id)
                .ok_or(CanvassError::Storage(StorageError::NotFound {
                    entity: "Response",
                    id: existing_id,
                }))?;
            response.username = draft.username;
            response.content = draft.content;
            response.validation = ValidationState::Pending;
            response.violation_explanation = None;
            response.metadata = draft.metadata;
            response.updated_at = Utc::now();
            return Ok(response.clone());
        }

        let response = Response::new(
            draft.survey_id,
            draft.user_id,
            draft.username,
            draft.content,
            draft.metadata,
        );
        tables.by_survey_user.insert(key, response.response_id);
        tables.by_id.insert(response.response_id, response.clone());
        Ok(response)
    }

    async fn get(&self, id: ResponseId) -> CanvassResult<Option<Response>> {
        Ok(self.responses_read()?.by_id.get(&id).cloned())
    }

    async fn list_by_survey(&self, survey_id: SurveyId) -> CanvassResult<Vec<Response>> {
        let tables = self.responses_read()?;
        let mut all: Vec<Response> = tables
            .by_id
            .values()
            .filter(|r| r.survey_id == survey_id)
            .cloned()
            .collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update(&self, response: &Response) -> CanvassResult<()> {
        let mut tables = self.responses_write()?;
        match tables.by_id.get_mut(&response.response_id) {
            Some(stored) => {
                *stored = response.clone();
                Ok(())
            }
            None => Err(CanvassError::Storage(StorageError::NotFound {
                entity: "Response",
                id: response.response_id,
            })),
        }
    }

    async fn delete(&self, id: ResponseId) -> CanvassResult<()> {
        let mut tables = self.responses_write()?;
        match tables.by_id.remove(&id) {
            Some(removed) => {
                tables
                    .by_survey_user
                    .remove(&(removed.survey_id, removed.user_id));
                Ok(())
            }
            None => Err(CanvassError::Storage(StorageError::NotFound {
                entity: "Response",
                id,
            })),
        }
    }

    async fn delete_by_survey(&self, survey_id: SurveyId) -> CanvassResult<usize> {
        let mut tables = self.responses_write()?;
        let doomed: Vec<ResponseId> = tables
            .by_id
            .values()
            .filter(|r| r.survey_id == survey_id)
            .map(|r| r.response_id)
            .collect();
        for id in &doomed {
            if let Some(removed) = tables.by_id.remove(id) {
                tables
                    .by_survey_user
                    .remove(&(removed.survey_id, removed.user_id));
            }
        }
        tracing::debug!(%survey_id, count = doomed.len(), "cascade-deleted responses");
        Ok(doomed.len())
    }

    async fn delete_violations(&self, survey_id: SurveyId) -> CanvassResult<usize> {
        let mut tables = self.responses_write()?;
        let doomed: Vec<ResponseId> = tables
            .by_id
            .values()
            .filter(|r| r.survey_id == survey_id && r.validation == ValidationState::Violation)
            .map(|r| r.response_id)
            .collect();
        for id in &doomed {
            if let Some(removed) = tables.by_id.remove(id) {
                tables
                    .by_survey_user
                    .remove(&(removed.survey_id, removed.user_id));
            }
        }
        tracing::debug!(%survey_id, count = doomed.len(), "deleted violation responses");
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_core::{new_entity_id, Guidelines, ResponseMetadata};
    use chrono::Duration;
    use std::sync::Arc;

    fn sample_survey(question: &str) -> Survey {
        Survey::new(
            new_entity_id(),
            "dana",
            "public transit",
            question,
            Guidelines {
                permitted_domains: "transit, urban planning".to_string(),
                permitted_responses: "first-hand commuting experiences".to_string(),
                summary_instructions: "rank pain points by frequency".to_string(),
            },
            Utc::now() + Duration::days(7),
        )
    }

    fn draft(survey_id: SurveyId, user_id: UserId, content: &str) -> ResponseDraft {
        ResponseDraft {
            survey_id,
            user_id,
            username: "erin".to_string(),
            content: content.to_string(),
            metadata: ResponseMetadata::now(None, None),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_instead_of_duplicating() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let survey_id = new_entity_id();
        let user_id = new_entity_id();

        let first = store
            .upsert_by_survey_user(draft(survey_id, user_id, "the bus is always late"))
            .await?;

        // Simulate a prior moderation pass so the reset is observable.
        let mut flagged = first.clone();
        flagged.mark_violation("spam content");
        ResponseStore::update(&store, &flagged).await?;

        let second = store
            .upsert_by_survey_user(draft(survey_id, user_id, "trains are fine actually"))
            .await?;

        assert_eq!(first.response_id, second.response_id);
        assert_eq!(second.content, "trains are fine actually");
        assert_eq!(second.validation, ValidationState::Pending);
        assert!(second.violation_explanation.is_none());

        let all = store.list_by_survey(survey_id).await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_upsert_refreshes_username() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let survey_id = new_entity_id();
        let user_id = new_entity_id();

        let first = store
            .upsert_by_survey_user(draft(survey_id, user_id, "the bus is always late"))
            .await?;
        assert_eq!(first.username, "erin");

        // Same account, renamed since the first submission.
        let renamed = store
            .upsert_by_survey_user(ResponseDraft {
                survey_id,
                user_id,
                username: "erin_m".to_string(),
                content: "trains are fine actually".to_string(),
                metadata: ResponseMetadata::now(None, None),
            })
            .await?;
        assert_eq!(renamed.response_id, first.response_id);
        assert_eq!(renamed.username, "erin_m");

        let stored = ResponseStore::get(&store, first.response_id).await?.ok_or(
            CanvassError::Storage(StorageError::NotFound {
                entity: "Response",
                id: first.response_id,
            }),
        )?;
        assert_eq!(stored.username, "erin_m");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_upserts_keep_single_row() -> CanvassResult<()> {
        let store = Arc::new(MemoryStore::new());
        let survey_id = new_entity_id();
        let user_id = new_entity_id();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_by_survey_user(ResponseDraft {
                        survey_id,
                        user_id,
                        username: "erin".to_string(),
                        content: format!("concurrent submission number {}", i),
                        metadata: ResponseMetadata::now(None, None),
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.expect("task panicked")?;
        }

        let all = store.list_by_survey(survey_id).await?;
        assert_eq!(all.len(), 1, "uniqueness invariant violated");
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_question_guidelines_rejected() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let first = sample_survey("What is your daily commute like?");
        store.insert(&first).await?;

        let mut clone = sample_survey("What is your daily commute like?");
        clone.creator = new_entity_id();
        let err = store.insert(&clone).await.unwrap_err();
        assert!(matches!(
            err,
            CanvassError::Storage(StorageError::DuplicateKey { .. })
        ));

        // A different question with the same guidelines is fine.
        let other = sample_survey("How often do you cycle to work?");
        store.insert(&other).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_violations_only_removes_flagged() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let survey_id = new_entity_id();

        let clean = store
            .upsert_by_survey_user(draft(survey_id, new_entity_id(), "a thoughtful answer"))
            .await?;
        let bad = store
            .upsert_by_survey_user(draft(survey_id, new_entity_id(), "an off-topic answer"))
            .await?;

        let mut flagged = bad.clone();
        flagged.mark_violation("off-topic");
        ResponseStore::update(&store, &flagged).await?;

        let removed = store.delete_violations(survey_id).await?;
        assert_eq!(removed, 1);

        let remaining = store.list_by_survey(survey_id).await?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].response_id, clean.response_id);

        // Index entry is gone too: the flagged user may submit again.
        let again = store
            .upsert_by_survey_user(draft(survey_id, bad.user_id, "a better answer this time"))
            .await?;
        assert_ne!(again.response_id, bad.response_id);
        Ok(())
    }

    #[tokio::test]
    async fn test_cascade_delete_by_survey() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let survey = sample_survey("Should the city add bike lanes?");
        store.insert(&survey).await?;

        for _ in 0..3 {
            store
                .upsert_by_survey_user(draft(
                    survey.survey_id,
                    new_entity_id(),
                    "yes, more bike lanes please",
                ))
                .await?;
        }
        let unrelated = new_entity_id();
        store
            .upsert_by_survey_user(draft(unrelated, new_entity_id(), "unrelated survey answer"))
            .await?;

        let removed = store.delete_by_survey(survey.survey_id).await?;
        assert_eq!(removed, 3);
        assert!(store.list_by_survey(survey.survey_id).await?.is_empty());
        assert_eq!(store.list_by_survey(unrelated).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_search_matches_area_and_question() -> CanvassResult<()> {
        let store = MemoryStore::new();
        let transit = sample_survey("Is the metro frequent enough?");
        store.insert(&transit).await?;

        let hits = store.search("METRO").await?;
        assert_eq!(hits.len(), 1);

        let hits = store.search("transit").await?;
        assert_eq!(hits.len(), 1, "area field should match");

        let hits = store.search("gardening").await?;
        assert!(hits.is_empty());
        Ok(())
    }
}
