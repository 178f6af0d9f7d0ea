use guestmail_common::{
    require, NewProperty, Property, PropertyId, Stage, StoreError, StoreResult, Template,
    TemplateId, ValidationError,
};
use tracing::info;

use crate::base::{base_templates, starter_source, BaseTemplate};
use crate::catalog::PropertyCatalog;
use crate::document_store::SharedStore;

/// Properties plus the templates they own.
///
/// Every template added through here has an owner the catalog knows.
#[derive(Debug)]
pub struct Workspace {
    catalog: PropertyCatalog,
    store: SharedStore,
    base: Vec<BaseTemplate>,
}

impl Workspace {
    /// Empty workspace that onboards properties with the default base set
    pub fn new() -> Self {
        Self::with_base(base_templates().to_vec())
    }

    pub fn with_base(base: Vec<BaseTemplate>) -> Self {
        Self {
            catalog: PropertyCatalog::new(),
            store: SharedStore::default(),
            base,
        }
    }

    pub fn catalog(&self) -> &PropertyCatalog {
        &self.catalog
    }

    /// Handle for editing sessions
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    /// Add a property and clone the base set into it
    pub fn add_property(&mut self, data: NewProperty) -> StoreResult<(Property, Vec<Template>)> {
        let property = self.catalog.add(data)?;
        let templates = self.onboard(&property.id)?;

        info!(
            property_id = %property.id,
            templates = templates.len(),
            "Property onboarded"
        );
        Ok((property, templates))
    }

    fn onboard(&mut self, owner_id: &PropertyId) -> StoreResult<Vec<Template>> {
        let mut store = self.store.lock();
        let mut created = Vec::with_capacity(self.base.len());

        for base in &self.base {
            let template = Template {
                id: store.next_template_id(),
                owner_id: owner_id.clone(),
                name: base.name.to_string(),
                stage: base.stage,
                source: base.source.to_string(),
            };
            store.add(template.clone())?;
            created.push(template);
        }

        Ok(created)
    }

    /// New-template flow: trimmed non-empty name, unique within (owner, stage),
    /// seeded with the starter skeleton.
    pub fn create_template(
        &mut self,
        owner_id: &PropertyId,
        name: &str,
        stage: Stage,
    ) -> StoreResult<Template> {
        if self.catalog.find_by_id(owner_id).is_none() {
            return Err(StoreError::PropertyNotFound(owner_id.clone()));
        }
        let name = require("Template name", name)?;

        let mut store = self.store.lock();
        // Reject before minting so a refused name doesn't use up an id
        if store.name_taken(owner_id, stage, name) {
            return Err(ValidationError::DuplicateName {
                name: name.to_string(),
                stage,
            }
            .into());
        }
        let template = Template {
            id: store.next_template_id(),
            owner_id: owner_id.clone(),
            name: name.to_string(),
            stage,
            source: starter_source(name),
        };
        store.add(template.clone())?;

        info!(template_id = %template.id, owner_id = %owner_id, stage = %stage, "Template created");
        Ok(template)
    }

    pub fn templates_for(&self, owner_id: &PropertyId) -> Vec<Template> {
        self.store.lock().list_by_owner(owner_id)
    }

    pub fn template(&self, id: &TemplateId) -> Option<Template> {
        self.store.lock().get(id).cloned()
    }

    /// Template opened when a property is selected: the first Pre-Arrival
    /// one, else the first one.
    pub fn default_template(&self, owner_id: &PropertyId) -> Option<Template> {
        let templates = self.templates_for(owner_id);
        templates
            .iter()
            .find(|t| t.stage == Stage::PreArrival)
            .or_else(|| templates.first())
            .cloned()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Group templates under their stage, stages in canonical order, empty
/// stages omitted.
pub fn group_by_stage(templates: &[Template]) -> Vec<(Stage, Vec<&Template>)> {
    Stage::ALL
        .iter()
        .filter_map(|&stage| {
            let group: Vec<&Template> = templates.iter().filter(|t| t.stage == stage).collect();
            (!group.is_empty()).then_some((stage, group))
        })
        .collect()
}
