use guestmail_common::{
    PropertyId, Stage, StoreError, StoreResult, Template, TemplateId, ValidationError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Templates keyed by id, kept in insertion order
#[derive(Debug, Default)]
pub struct DocumentStore {
    templates: Vec<Template>,
    index: HashMap<TemplateId, usize>,
    /// Highest numeric suffix seen on a `t<N>` id
    last_id: u64,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a template.
    ///
    /// Fails with `DuplicateId` if the id is taken and with `DuplicateName`
    /// if the owner already has a template of that name (ignoring case) in
    /// the same stage.
    pub fn add(&mut self, template: Template) -> StoreResult<()> {
        if self.index.contains_key(&template.id) {
            return Err(StoreError::DuplicateId(template.id));
        }

        if self
            .templates
            .iter()
            .any(|t| t.collides_with(&template.owner_id, template.stage, &template.name))
        {
            return Err(ValidationError::DuplicateName {
                name: template.name,
                stage: template.stage,
            }
            .into());
        }

        if let Some(n) = numeric_suffix(&template.id) {
            self.last_id = self.last_id.max(n);
        }

        debug!(template_id = %template.id, owner_id = %template.owner_id, stage = %template.stage, "Adding template");
        self.index.insert(template.id.clone(), self.templates.len());
        self.templates.push(template);
        Ok(())
    }

    /// Replace a template's source. The source is not validated.
    pub fn update(&mut self, id: &TemplateId, new_source: impl Into<String>) -> StoreResult<Template> {
        let slot = *self
            .index
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let template = &mut self.templates[slot];
        template.source = new_source.into();
        debug!(template_id = %id, bytes = template.source.len(), "Updated template source");

        Ok(template.clone())
    }

    pub fn get(&self, id: &TemplateId) -> Option<&Template> {
        self.index.get(id).map(|&slot| &self.templates[slot])
    }

    /// Templates owned by `owner_id`, in insertion order
    pub fn list_by_owner(&self, owner_id: &PropertyId) -> Vec<Template> {
        self.templates
            .iter()
            .filter(|t| &t.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Check the (owner, stage, name) key without inserting
    pub fn name_taken(&self, owner_id: &PropertyId, stage: Stage, name: &str) -> bool {
        self.templates
            .iter()
            .any(|t| t.collides_with(owner_id, stage, name))
    }

    /// Mint an id of the form `t<N>` above every numeric id stored so far
    pub fn next_template_id(&mut self) -> TemplateId {
        loop {
            self.last_id += 1;
            let id = TemplateId(format!("t{}", self.last_id));
            if !self.index.contains_key(&id) {
                return id;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn numeric_suffix(id: &TemplateId) -> Option<u64> {
    id.as_str().strip_prefix('t')?.parse().ok()
}

/// Store handle shared between the catalog facade and editing sessions
#[derive(Debug, Clone, Default)]
pub struct SharedStore(Arc<Mutex<DocumentStore>>);

impl SharedStore {
    pub fn new(store: DocumentStore) -> Self {
        Self(Arc::new(Mutex::new(store)))
    }

    /// Single writer; a panic while holding the lock leaves the data usable.
    pub fn lock(&self) -> MutexGuard<'_, DocumentStore> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
