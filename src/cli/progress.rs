// src/cli/progress.rs — Terminal progress for the recipe sweep

use crate::core::types::RunEvent;

/// Build a progress callback that writes one line per event to stderr.
///
/// stdout is reserved for the final summary.
pub fn terminal_progress() -> impl Fn(RunEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", format_event(&event))
}

pub fn format_event(event: &RunEvent) -> String {
    match event {
        RunEvent::Started {
            project_key,
            recipe,
        } => format!("[start] {}, {}", project_key, recipe),
        RunEvent::Finished(outcome) => format!(
            "[done]  {}, {}, {}",
            outcome.project_key, outcome.recipe, outcome.result
        ),
    }
}
