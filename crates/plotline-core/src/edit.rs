//! Manual project entry and editing.
//!
//! Forms arrive as plain strings. Blank means "leave unchanged", so an
//! edit can never clear a field; only the fields in [`ProjectPatch`] can be
//! touched at all.

use plotline_model::{NewProject, ProjectId, ProjectPatch, ProjectRecord, Stage};
use serde::Deserialize;

use crate::error::{ImportError, Result};
use crate::plot::normalize_plot;
use crate::store::{RecordStore, StoreError};

/// Editable project fields as typed by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub label: String,
    pub stage: String,
    pub plot_number: String,
    pub zone: String,
    pub block: String,
    pub wayleave_number: String,
    pub account_number: String,
    pub justification: String,
    pub escalation_date: String,
}

impl ProjectForm {
    /// Builds a patch from the non-blank fields.
    ///
    /// The stage accepts either its storage key or its display label.
    pub fn to_patch(&self) -> Result<ProjectPatch> {
        let stage = match self.stage.trim() {
            "" => None,
            text => Some(text.parse::<Stage>().map_err(ImportError::Validation)?),
        };
        let plot = normalize_plot(&self.plot_number);
        Ok(ProjectPatch {
            label: filled(&self.label),
            stage,
            plot_number: (!plot.is_empty()).then_some(plot),
            zone: filled(&self.zone),
            block: filled(&self.block),
            wayleave_number: filled(&self.wayleave_number),
            account_number: filled(&self.account_number),
            justification: filled(&self.justification),
            escalation_date: filled(&self.escalation_date),
        })
    }
}

fn filled(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Applies `form` to project `id`.
///
/// The merged record is validated before anything is sent, so an escalated
/// project without an escalation date never reaches the store.
pub async fn edit_project<S: RecordStore + ?Sized>(
    store: &S,
    id: &ProjectId,
    form: &ProjectForm,
) -> Result<ProjectRecord> {
    let patch = form.to_patch()?;
    if patch.is_empty() {
        return Err(ImportError::Validation("no fields to update".to_string()));
    }
    let current = store
        .get_project(id)
        .await?
        .ok_or_else(|| ImportError::NotFound(id.clone()))?;
    patch
        .apply_to(&current)
        .validate()
        .map_err(|err| ImportError::Validation(err.to_string()))?;

    let updated = store
        .update_project(id, &patch)
        .await
        .map_err(|err| not_found_or(err, id))?;
    tracing::info!(id = %id, stage = %updated.stage, "project updated");
    Ok(updated)
}

/// Inserts a manually entered project.
///
/// Reference numbers stay unique: a reference already held by another
/// project is rejected before the insert.
pub async fn create_project<S: RecordStore + ?Sized>(
    store: &S,
    project: NewProject,
) -> Result<ProjectRecord> {
    if project.reference_number.trim().is_empty() {
        return Err(ImportError::Validation(
            "reference number is required".to_string(),
        ));
    }
    project
        .validate()
        .map_err(|err| ImportError::Validation(err.to_string()))?;
    if store
        .reference_numbers()
        .await?
        .contains(&project.reference_number)
    {
        return Err(ImportError::DuplicateReference(project.reference_number));
    }
    let record = store.insert_project(&project).await?;
    tracing::info!(id = %record.id, reference = %record.reference_number, "project created");
    Ok(record)
}

pub async fn delete_project<S: RecordStore + ?Sized>(store: &S, id: &ProjectId) -> Result<()> {
    store
        .delete_project(id)
        .await
        .map_err(|err| not_found_or(err, id))?;
    tracing::info!(id = %id, "project deleted");
    Ok(())
}

fn not_found_or(err: StoreError, id: &ProjectId) -> ImportError {
    match err {
        StoreError::NotFound(_) => ImportError::NotFound(id.clone()),
        other => ImportError::Store(other),
    }
}
