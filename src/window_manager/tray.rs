use crate::window_manager::registry::{Visibility, WindowError, WindowRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrayEntry {
    pub id: String,
    pub title: String,
}

/// Minimized windows, oldest minimize first. Closed windows never appear.
pub fn entries(registry: &WindowRegistry) -> Vec<TrayEntry> {
    let mut minimized: Vec<_> = registry
        .windows()
        .iter()
        .filter(|w| w.visibility == Visibility::Minimized)
        .collect();
    minimized.sort_by_key(|w| w.minimized_seq());
    minimized
        .into_iter()
        .map(|w| TrayEntry {
            id: w.id.clone(),
            title: w.title.clone(),
        })
        .collect()
}

/// Restore a window from the tray. Returns `false` if it was not minimized.
pub fn activate(registry: &mut WindowRegistry, id: &str) -> Result<bool, WindowError> {
    if registry.get(id)?.visibility != Visibility::Minimized {
        return Ok(false);
    }
    registry.restore(id)?;
    Ok(true)
}
