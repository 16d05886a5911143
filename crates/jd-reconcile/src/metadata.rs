//! Run-scoped memo of field metadata and project classification.
//!
//! Each field id and project key is fetched at most once per run, however many
//! (field, project) pairs reference it. Lookup failures are cached too:
//! missing metadata stays missing and an unclassifiable project stays
//! `Undetermined` for the rest of the run.

use std::collections::HashMap;

use jd_core::{FieldMetadata, FieldTarget, ProjectClassification, ReconcileEvent};
use jd_jira::JiraApi;

use crate::sink::EventSink;

#[derive(Debug, Default)]
pub struct MetadataCache {
    fields: HashMap<String, Option<FieldMetadata>>,
    projects: HashMap<String, ProjectClassification>,
}

impl MetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch metadata for every configured field and a classification for
    /// every configured project.
    pub async fn prime<A: JiraApi + ?Sized>(
        &mut self,
        api: &A,
        sink: &dyn EventSink,
        targets: &[FieldTarget],
    ) {
        for target in targets {
            self.field_metadata(api, sink, &target.field_id).await;
            for project in &target.projects {
                self.project_type(api, sink, &project.key).await;
            }
        }
    }

    /// Metadata for `field_id`, or `None` if the provider does not know it or
    /// the lookup failed.
    pub async fn field_metadata<A: JiraApi + ?Sized>(
        &mut self,
        api: &A,
        sink: &dyn EventSink,
        field_id: &str,
    ) -> Option<&FieldMetadata> {
        if !self.fields.contains_key(field_id) {
            let fetched = match api.field_list().await {
                Ok(fields) => {
                    let found = fields.into_iter().find(|f| f.id == field_id);
                    match &found {
                        Some(meta) => sink.emit(&ReconcileEvent::FieldMetadataLoaded {
                            field_id: field_id.to_string(),
                            name: meta.name.clone(),
                        }),
                        None => sink.emit(&ReconcileEvent::FieldMetadataMissing {
                            field_id: field_id.to_string(),
                            reason: None,
                        }),
                    }
                    found
                }
                Err(error) => {
                    sink.emit(&ReconcileEvent::FieldMetadataMissing {
                        field_id: field_id.to_string(),
                        reason: Some(error.to_string()),
                    });
                    None
                }
            };
            self.fields.insert(field_id.to_string(), fetched);
        }
        self.fields.get(field_id).and_then(Option::as_ref)
    }

    /// Classification of `project_key`; first classification wins.
    pub async fn project_type<A: JiraApi + ?Sized>(
        &mut self,
        api: &A,
        sink: &dyn EventSink,
        project_key: &str,
    ) -> ProjectClassification {
        if let Some(cached) = self.projects.get(project_key) {
            return *cached;
        }

        let classification = match api.project(project_key).await {
            Ok(project) => {
                let classification = project.classification();
                sink.emit(&ReconcileEvent::ProjectClassified {
                    project_key: project_key.to_string(),
                    classification,
                });
                classification
            }
            Err(error) => {
                sink.emit(&ReconcileEvent::ProjectTypeUnavailable {
                    project_key: project_key.to_string(),
                    reason: error.to_string(),
                });
                ProjectClassification::Undetermined
            }
        };
        self.projects.insert(project_key.to_string(), classification);
        classification
    }

    /// Cached classification without fetching.
    #[must_use]
    pub fn cached_project_type(&self, project_key: &str) -> Option<ProjectClassification> {
        self.projects.get(project_key).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use crate::test_support::FakeJira;
    use jd_core::ProjectTarget;

    const LOB: &str = "customfield_10050";

    fn targets() -> Vec<FieldTarget> {
        let projects = vec![
            ProjectTarget {
                key: "ABC".into(),
                value: "Platform".into(),
            },
            ProjectTarget {
                key: "DEF".into(),
                value: "Infra".into(),
            },
        ];
        vec![
            FieldTarget {
                field_id: LOB.into(),
                field_name: "LOB".into(),
                projects: projects.clone(),
            },
            FieldTarget {
                field_id: LOB.into(),
                field_name: "LOB again".into(),
                projects,
            },
        ]
    }

    #[tokio::test]
    async fn fetches_each_key_once() {
        let api = FakeJira::new()
            .with_select_field(LOB, "LOB", &["Platform"])
            .with_project("ABC", "next-gen")
            .with_project("DEF", "classic");
        let sink = RecordingSink::new();
        let mut cache = MetadataCache::new();

        cache.prime(&api, &sink, &targets()).await;
        cache.prime(&api, &sink, &targets()).await;

        let calls = api.calls();
        assert_eq!(calls.field_list, 1);
        assert_eq!(calls.project, 2);
        assert_eq!(
            cache.cached_project_type("ABC"),
            Some(ProjectClassification::NextGen)
        );
        assert_eq!(
            cache.cached_project_type("DEF"),
            Some(ProjectClassification::CompanyManaged)
        );
        assert_eq!(
            cache.field_metadata(&api, &sink, LOB).await.map(|m| m.name.as_str()),
            Some("LOB")
        );
        assert_eq!(api.calls().field_list, 1);
    }

    #[tokio::test]
    async fn failures_degrade_and_are_not_refetched() {
        let api = FakeJira::new().failing_field_list().failing_project_lookup();
        let sink = RecordingSink::new();
        let mut cache = MetadataCache::new();

        assert!(cache.field_metadata(&api, &sink, LOB).await.is_none());
        assert!(cache.field_metadata(&api, &sink, LOB).await.is_none());
        assert_eq!(
            cache.project_type(&api, &sink, "ABC").await,
            ProjectClassification::Undetermined
        );
        assert_eq!(
            cache.project_type(&api, &sink, "ABC").await,
            ProjectClassification::Undetermined
        );

        assert_eq!(api.calls().field_list, 1);
        assert_eq!(api.calls().project, 1);
        assert_eq!(sink.count("field_metadata_missing"), 1);
        assert_eq!(sink.count("project_type_unavailable"), 1);
    }

    #[tokio::test]
    async fn unknown_field_is_missing_not_error() {
        let api = FakeJira::new();
        let sink = RecordingSink::new();
        let mut cache = MetadataCache::new();

        assert!(cache.field_metadata(&api, &sink, LOB).await.is_none());
        match &sink.events()[0] {
            ReconcileEvent::FieldMetadataMissing { reason, .. } => assert!(reason.is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
