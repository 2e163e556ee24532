//! In-process record store with failure injection.
//!
//! Used by tests. Failure switches count calls from 1 so a test
//! can say "the second chunk insert fails".

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use plotline_model::{
    InfraPaymentRecord, NewProject, PaymentMarkers, ProjectId, ProjectPatch, ProjectRecord,
};

use super::{RecordStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct State {
    projects: Vec<ProjectRecord>,
    infra: Vec<InfraPaymentRecord>,
    next_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_reference_snapshot: AtomicBool,
    fail_plot_snapshot: AtomicBool,
    failing_references: Mutex<BTreeSet<String>>,
    failing_infra_calls: Mutex<BTreeSet<usize>>,
    failing_marker_calls: Mutex<BTreeSet<usize>>,
    infra_calls: AtomicUsize,
    marker_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds projects as if they were already stored.
    pub fn with_projects(self, projects: impl IntoIterator<Item = NewProject>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            for project in projects {
                let record = assign_id(&mut state, project);
                state.projects.push(record);
            }
        }
        self
    }

    /// Seeds ledger rows.
    pub fn with_infra(self, rows: impl IntoIterator<Item = InfraPaymentRecord>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.infra.extend(rows);
        }
        self
    }

    /// Makes the reference-number snapshot fail.
    pub fn with_failing_reference_snapshot(self) -> Self {
        self.fail_reference_snapshot.store(true, Ordering::SeqCst);
        self
    }

    /// Makes the ledger plot snapshot fail.
    pub fn with_failing_plot_snapshot(self) -> Self {
        self.fail_plot_snapshot.store(true, Ordering::SeqCst);
        self
    }

    /// Makes inserting the project with this reference number fail.
    pub fn with_failing_project(self, reference: impl Into<String>) -> Self {
        if let Ok(mut failing) = self.failing_references.lock() {
            failing.insert(reference.into());
        }
        self
    }

    /// Makes the `call`-th (1-based) ledger insert fail.
    pub fn with_failing_infra_insert(self, call: usize) -> Self {
        if let Ok(mut failing) = self.failing_infra_calls.lock() {
            failing.insert(call);
        }
        self
    }

    /// Makes the `call`-th (1-based) payment-marker query fail.
    pub fn with_failing_marker_query(self, call: usize) -> Self {
        if let Ok(mut failing) = self.failing_marker_calls.lock() {
            failing.insert(call);
        }
        self
    }

    /// Number of ledger insert calls received so far.
    pub fn infra_insert_calls(&self) -> usize {
        self.infra_calls.load(Ordering::SeqCst)
    }

    /// Number of payment-marker queries received so far.
    pub fn marker_query_calls(&self) -> usize {
        self.marker_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the ledger contents.
    pub fn infra_rows(&self) -> Vec<InfraPaymentRecord> {
        self.state
            .lock()
            .map(|state| state.infra.clone())
            .unwrap_or_default()
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".to_string()))
    }
}

fn assign_id(state: &mut State, project: NewProject) -> ProjectRecord {
    state.next_id += 1;
    let id = ProjectId::new(format!("mem-{}", state.next_id))
        .unwrap_or_else(|_| unreachable!("generated ids are never blank"));
    project.into_record(id)
}

fn contains(set: &Mutex<BTreeSet<usize>>, call: usize) -> bool {
    set.lock().map(|set| set.contains(&call)).unwrap_or(false)
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_projects(&self) -> StoreResult<Vec<ProjectRecord>> {
        let mut projects = self.state()?.projects.clone();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, id: &ProjectId) -> StoreResult<Option<ProjectRecord>> {
        Ok(self
            .state()?
            .projects
            .iter()
            .find(|project| &project.id == id)
            .cloned())
    }

    async fn insert_project(&self, project: &NewProject) -> StoreResult<ProjectRecord> {
        let failing = self
            .failing_references
            .lock()
            .map(|set| set.contains(&project.reference_number))
            .unwrap_or(false);
        if failing {
            return Err(StoreError::Transport(format!(
                "injected failure for {}",
                project.reference_number
            )));
        }
        let mut state = self.state()?;
        let record = assign_id(&mut state, project.clone());
        state.projects.push(record.clone());
        Ok(record)
    }

    async fn update_project(
        &self,
        id: &ProjectId,
        patch: &ProjectPatch,
    ) -> StoreResult<ProjectRecord> {
        let mut state = self.state()?;
        let project = state
            .projects
            .iter_mut()
            .find(|project| &project.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *project = patch.apply_to(project);
        Ok(project.clone())
    }

    async fn delete_project(&self, id: &ProjectId) -> StoreResult<()> {
        let mut state = self.state()?;
        let before = state.projects.len();
        state.projects.retain(|project| &project.id != id);
        if state.projects.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn reference_numbers(&self) -> StoreResult<BTreeSet<String>> {
        if self.fail_reference_snapshot.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected snapshot failure".to_string()));
        }
        Ok(self
            .state()?
            .projects
            .iter()
            .map(|project| project.reference_number.clone())
            .collect())
    }

    async fn infra_plot_numbers(&self) -> StoreResult<BTreeSet<String>> {
        if self.fail_plot_snapshot.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("injected snapshot failure".to_string()));
        }
        Ok(self
            .state()?
            .infra
            .iter()
            .map(|row| row.plot_number.clone())
            .collect())
    }

    async fn insert_infra_payments(&self, rows: &[InfraPaymentRecord]) -> StoreResult<()> {
        let call = self.infra_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if contains(&self.failing_infra_calls, call) {
            return Err(StoreError::Transport(format!(
                "injected failure for ledger insert {call}"
            )));
        }
        self.state()?.infra.extend_from_slice(rows);
        Ok(())
    }

    async fn payment_markers(&self, plots: &[String]) -> StoreResult<Vec<PaymentMarkers>> {
        let call = self.marker_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if contains(&self.failing_marker_calls, call) {
            return Err(StoreError::Transport(format!(
                "injected failure for marker query {call}"
            )));
        }
        Ok(self
            .state()?
            .infra
            .iter()
            .filter(|row| plots.contains(&row.plot_number))
            .map(InfraPaymentRecord::markers)
            .collect())
    }

    async fn search_ledger(&self, fragment: &str) -> StoreResult<Vec<InfraPaymentRecord>> {
        let needle = fragment.to_lowercase();
        Ok(self
            .state()?
            .infra
            .iter()
            .filter(|row| row.plot_number.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn clear_infra_payments(&self) -> StoreResult<u64> {
        let mut state = self.state()?;
        let removed = state.infra.len() as u64;
        state.infra.clear();
        Ok(removed)
    }
}
