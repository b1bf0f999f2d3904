//! Scheduling commands
//!
//! `schedule` moves dates (the soft path), `validate` only reports (the hard
//! path).

use anyhow::Result;

use super::output::Output;
use super::task::{edit, report_effects};
use crate::domain::StoreError;
use crate::storage::Project;

pub fn schedule(output: &Output, reference: Option<&str>) -> Result<()> {
    let (effects, _) = edit(|store| match reference {
        Some(reference) => {
            let id = store.resolve_ref(reference)?;
            store.enforce_schedule(&id)
        }
        None => store.reschedule_all(),
    })?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": true,
            "adjusted": effects.adjusted,
            "issues": effects.issues,
        }));
    } else if effects.adjusted.is_empty() {
        output.success("Schedule already satisfies all predecessors");
    } else {
        output.success(&format!("Rescheduled {} task(s)", effects.adjusted.len()));
    }
    report_effects(output, &effects);

    Ok(())
}

pub fn validate(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.load_store()?;

    let issues = store.validate();
    if !issues.is_empty() {
        return Err(StoreError::Validation(issues).into());
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "success": true,
            "tasks": store.live_tasks().count(),
        }));
    } else {
        output.success("No issues found");
    }

    Ok(())
}
