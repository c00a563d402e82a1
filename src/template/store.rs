//! Template catalogue storage with CRUD operations

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

use super::types::{TemplateError, TemplateResult, UpdateTemplateRequest, WhatsAppTemplate};

/// In-memory template catalogue
pub struct TemplateStore {
    templates: DashMap<String, WhatsAppTemplate>,
}

impl Default for TemplateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateStore {
    pub fn new() -> Self {
        Self {
            templates: DashMap::new(),
        }
    }

    /// Create a new template
    pub fn create(&self, template: WhatsAppTemplate) -> TemplateResult<WhatsAppTemplate> {
        template.validate()?;

        if self.templates.contains_key(&template.id) {
            return Err(TemplateError::AlreadyExists(template.id));
        }

        self.templates.insert(template.id.clone(), template.clone());
        tracing::debug!(template_id = %template.id, "Template created");

        Ok(template)
    }

    /// Get a template by ID
    pub fn get(&self, id: &str) -> TemplateResult<WhatsAppTemplate> {
        self.templates
            .get(id)
            .map(|t| t.clone())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    /// List all templates, ordered by name
    pub fn list(&self) -> Vec<WhatsAppTemplate> {
        let mut templates: Vec<WhatsAppTemplate> = self
            .templates
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        templates
    }

    /// Update an existing template
    pub fn update(
        &self,
        id: &str,
        updates: UpdateTemplateRequest,
    ) -> TemplateResult<WhatsAppTemplate> {
        let mut template = self.get(id)?;

        if let Some(name) = updates.name {
            template.name = name;
        }

        if let Some(language) = updates.language {
            template.language = language;
        }

        if let Some(category) = updates.category {
            template.category = category;
        }

        if let Some(status) = updates.status {
            template.status = status;
        }

        if let Some(components) = updates.components {
            template.components = components;
        }

        template.updated_at = Utc::now();
        template.validate()?;

        self.templates.insert(id.to_string(), template.clone());

        Ok(template)
    }

    /// Delete a template by ID
    pub fn delete(&self, id: &str) -> TemplateResult<()> {
        self.templates
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    pub fn exists(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Load templates from a JSON array, skipping ones already present.
    ///
    /// Returns the number of templates added. Any invalid template aborts
    /// the load before the store is touched.
    pub fn load_seed(&self, path: impl AsRef<Path>) -> TemplateResult<usize> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let templates: Vec<WhatsAppTemplate> = serde_json::from_str(&raw)?;
        self.load(templates)
    }

    pub fn load(&self, templates: Vec<WhatsAppTemplate>) -> TemplateResult<usize> {
        for template in &templates {
            template.validate()?;
        }

        let mut added = 0;
        for template in templates {
            if self.exists(&template.id) {
                tracing::warn!(template_id = %template.id, "Skipping duplicate seed template");
                continue;
            }
            self.templates.insert(template.id.clone(), template);
            added += 1;
        }

        Ok(added)
    }
}

/// Create an Arc-wrapped template store
pub fn create_template_store() -> Arc<TemplateStore> {
    Arc::new(TemplateStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateStatus;
    use serde_json::json;

    fn sample(id: &str, name: &str) -> WhatsAppTemplate {
        serde_json::from_value(json!({
            "id": id,
            "name": name,
            "components": [{"type": "BODY", "text": "Hello {{1}}"}]
        }))
        .unwrap()
    }

    #[test]
    fn test_store_create_and_get() {
        let store = TemplateStore::new();

        let created = store.create(sample("welcome", "welcome")).unwrap();
        assert_eq!(created.id, "welcome");

        let retrieved = store.get("welcome").unwrap();
        assert_eq!(retrieved.name, "welcome");
    }

    #[test]
    fn test_store_create_duplicate() {
        let store = TemplateStore::new();

        store.create(sample("duplicate", "dup")).unwrap();
        assert!(matches!(
            store.create(sample("duplicate", "dup")),
            Err(TemplateError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_store_create_invalid() {
        let store = TemplateStore::new();
        let mut template = sample("bad", "bad");
        template.components.clear();

        assert!(store.create(template).is_err());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_store_update() {
        let store = TemplateStore::new();
        store.create(sample("update-test", "Original")).unwrap();

        let updates = UpdateTemplateRequest {
            name: Some("Updated".to_string()),
            status: Some(TemplateStatus::Approved),
            ..Default::default()
        };

        let updated = store.update("update-test", updates).unwrap();
        assert_eq!(updated.name, "Updated");
        assert_eq!(updated.status, TemplateStatus::Approved);
    }

    #[test]
    fn test_store_update_rejects_invalid_components() {
        let store = TemplateStore::new();
        store.create(sample("keep", "keep")).unwrap();

        let updates = UpdateTemplateRequest {
            components: Some(vec![]),
            ..Default::default()
        };

        assert!(store.update("keep", updates).is_err());
        assert_eq!(store.get("keep").unwrap().components.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let store = TemplateStore::new();
        store.create(sample("delete-test", "x")).unwrap();
        assert!(store.exists("delete-test"));

        store.delete("delete-test").unwrap();
        assert!(!store.exists("delete-test"));
        assert!(matches!(
            store.delete("delete-test"),
            Err(TemplateError::NotFound(_))
        ));
    }

    #[test]
    fn test_store_list_sorted() {
        let store = TemplateStore::new();
        store.create(sample("b", "beta")).unwrap();
        store.create(sample("a", "alpha")).unwrap();
        store.create(sample("c", "gamma")).unwrap();

        let names: Vec<_> = store.list().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_load_skips_existing() {
        let store = TemplateStore::new();
        store.create(sample("a", "alpha")).unwrap();

        let added = store
            .load(vec![sample("a", "alpha"), sample("b", "beta")])
            .unwrap();
        assert_eq!(added, 1);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_load_seed_missing_file() {
        let store = TemplateStore::new();
        assert!(matches!(
            store.load_seed("/nonexistent/templates.json"),
            Err(TemplateError::Io(_))
        ));
    }
}
