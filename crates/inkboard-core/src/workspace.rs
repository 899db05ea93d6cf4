//! Open documents (tabs) and the active-tab selection.

use crate::canvas::CanvasDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier of a tab (a uuid v4 string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub String);

impl TabId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workspace errors.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("cannot remove the last tab")]
    LastTab,
    #[error("tab not found: {0}")]
    NotFound(TabId),
    #[error("invalid workspace: {0}")]
    Invalid(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The set of open documents. Always holds at least one tab, and `active` names one of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    tabs: Vec<CanvasDocument>,
    active: TabId,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create a workspace with a single empty "Untitled" tab.
    pub fn new() -> Self {
        let document = CanvasDocument::new();
        let active = document.id.clone();
        Self {
            tabs: vec![document],
            active,
        }
    }

    pub fn tabs(&self) -> &[CanvasDocument] {
        &self.tabs
    }

    pub fn active_id(&self) -> &TabId {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Add an empty tab named "Untitled {n+1}" and make it active.
    pub fn add_tab(&mut self) -> TabId {
        let name = format!("Untitled {}", self.tabs.len() + 1);
        let document = CanvasDocument::with_name(name);
        let id = document.id.clone();
        self.tabs.push(document);
        self.active = id.clone();
        log::debug!("Added tab {}", id);
        id
    }

    /// Remove a tab and return its document.
    ///
    /// When the active tab is removed, the tab that slides into its index
    /// (or the new last tab) becomes active.
    pub fn remove_tab(&mut self, id: &TabId) -> Result<CanvasDocument, WorkspaceError> {
        let index = self.index_of(id)?;
        if self.tabs.len() == 1 {
            return Err(WorkspaceError::LastTab);
        }
        let removed = self.tabs.remove(index);
        if &self.active == id {
            let next = index.min(self.tabs.len() - 1);
            self.active = self.tabs[next].id.clone();
        }
        log::debug!("Removed tab {}", id);
        Ok(removed)
    }

    /// Make `id` the active tab.
    pub fn switch_tab(&mut self, id: &TabId) -> Result<(), WorkspaceError> {
        self.index_of(id)?;
        self.active = id.clone();
        Ok(())
    }

    pub fn rename_tab(&mut self, id: &TabId, name: impl Into<String>) -> Result<(), WorkspaceError> {
        let index = self.index_of(id)?;
        self.tabs[index].name = name.into();
        Ok(())
    }

    pub fn active_document(&self) -> &CanvasDocument {
        // The invariant guarantees a match; index 0 covers a corrupted active id.
        let index = self.index_of(&self.active).unwrap_or(0);
        &self.tabs[index]
    }

    /// The only path through which interaction mutates shapes.
    pub fn active_document_mut(&mut self) -> &mut CanvasDocument {
        let index = self.index_of(&self.active).unwrap_or(0);
        &mut self.tabs[index]
    }

    pub fn document(&self, id: &TabId) -> Option<&CanvasDocument> {
        self.tabs.iter().find(|doc| &doc.id == id)
    }

    pub fn document_mut(&mut self, id: &TabId) -> Option<&mut CanvasDocument> {
        self.tabs.iter_mut().find(|doc| &doc.id == id)
    }

    fn index_of(&self, id: &TabId) -> Result<usize, WorkspaceError> {
        self.tabs
            .iter()
            .position(|doc| &doc.id == id)
            .ok_or_else(|| WorkspaceError::NotFound(id.clone()))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, WorkspaceError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON, rejecting workspaces that break the tab invariant.
    pub fn from_json(json: &str) -> Result<Self, WorkspaceError> {
        let mut workspace: Workspace = serde_json::from_str(json)?;
        workspace.validate()?;
        for document in &mut workspace.tabs {
            document.repair_ids()?;
        }
        Ok(workspace)
    }

    fn validate(&self) -> Result<(), WorkspaceError> {
        if self.tabs.is_empty() {
            return Err(WorkspaceError::Invalid("no tabs".to_string()));
        }
        let mut seen = HashSet::new();
        for document in &self.tabs {
            if !seen.insert(&document.id) {
                return Err(WorkspaceError::Invalid(format!("duplicate tab id {}", document.id)));
            }
        }
        if !seen.contains(&self.active) {
            return Err(WorkspaceError::Invalid(format!(
                "active tab {} is not open",
                self.active
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Shape};
    use kurbo::Point;

    fn rect() -> Shape {
        Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0, false))
    }

    #[test]
    fn test_new_workspace_has_one_tab() {
        let ws = Workspace::new();
        assert_eq!(ws.len(), 1);
        assert_eq!(ws.active_document().name, "Untitled");
        assert_eq!(ws.active_id(), &ws.tabs()[0].id);
    }

    #[test]
    fn test_add_tab_names_and_activates() {
        let mut ws = Workspace::new();
        let id = ws.add_tab();
        assert_eq!(ws.len(), 2);
        assert_eq!(ws.active_id(), &id);
        assert_eq!(ws.active_document().name, "Untitled 2");
        ws.add_tab();
        assert_eq!(ws.active_document().name, "Untitled 3");
    }

    #[test]
    fn test_remove_last_tab_fails() {
        let mut ws = Workspace::new();
        let id = ws.active_id().clone();
        assert!(matches!(ws.remove_tab(&id), Err(WorkspaceError::LastTab)));
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn test_remove_unknown_tab() {
        let mut ws = Workspace::new();
        ws.add_tab();
        let missing = TabId("nope".to_string());
        assert!(matches!(ws.remove_tab(&missing), Err(WorkspaceError::NotFound(_))));
    }

    #[test]
    fn test_remove_active_promotes_same_index() {
        let mut ws = Workspace::new();
        let first = ws.active_id().clone();
        let second = ws.add_tab();
        let third = ws.add_tab();

        ws.switch_tab(&second).unwrap();
        ws.remove_tab(&second).unwrap();
        assert_eq!(ws.active_id(), &third);

        ws.remove_tab(&third).unwrap();
        assert_eq!(ws.active_id(), &first);
    }

    #[test]
    fn test_remove_inactive_keeps_active() {
        let mut ws = Workspace::new();
        let first = ws.active_id().clone();
        let second = ws.add_tab();
        ws.remove_tab(&first).unwrap();
        assert_eq!(ws.active_id(), &second);
        assert_eq!(ws.len(), 1);
    }

    #[test]
    fn test_tabs_are_isolated() {
        let mut ws = Workspace::new();
        let a = ws.active_id().clone();
        ws.active_document_mut().add_shape(rect());

        let b = ws.add_tab();
        ws.active_document_mut().add_shape(rect());
        ws.active_document_mut().add_shape(rect());

        assert_eq!(ws.document(&a).unwrap().len(), 1);
        assert_eq!(ws.document(&b).unwrap().len(), 2);
    }

    #[test]
    fn test_switch_tab_does_not_touch_shapes() {
        let mut ws = Workspace::new();
        let a = ws.active_id().clone();
        ws.active_document_mut().add_shape(rect());
        let before = ws.document(&a).unwrap().shapes().to_vec();

        let b = ws.add_tab();
        ws.switch_tab(&a).unwrap();
        ws.switch_tab(&b).unwrap();
        ws.switch_tab(&a).unwrap();

        assert_eq!(ws.document(&a).unwrap().shapes(), before.as_slice());
        assert!(ws.document(&b).unwrap().is_empty());
    }

    #[test]
    fn test_rename_tab() {
        let mut ws = Workspace::new();
        let id = ws.active_id().clone();
        ws.rename_tab(&id, "Sketches").unwrap();
        assert_eq!(ws.active_document().name, "Sketches");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut ws = Workspace::new();
        ws.active_document_mut().add_shape(rect());
        ws.add_tab();

        let json = ws.to_json().unwrap();
        let restored = Workspace::from_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.active_id(), ws.active_id());
        assert_eq!(restored.tabs()[0].shapes(), ws.tabs()[0].shapes());
    }

    #[test]
    fn test_from_json_rejects_empty() {
        let json = r#"{"tabs":[],"active":"x"}"#;
        assert!(matches!(Workspace::from_json(json), Err(WorkspaceError::Invalid(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_active() {
        let ws = Workspace::new();
        let mut value: serde_json::Value = serde_json::from_str(&ws.to_json().unwrap()).unwrap();
        value["active"] = serde_json::Value::String("missing".to_string());
        let result = Workspace::from_json(&value.to_string());
        assert!(matches!(result, Err(WorkspaceError::Invalid(_))));
    }
}
