//! Main IPC message enums for communication between the editor core and UI.

use serde::{Deserialize, Serialize};

use crate::commands::{
    LightCommand, MeshCommand, SelectionCommand, TerrainCommand, TileCommand, ToolCommand,
    ViewCommand,
};
use crate::error::IpcError;
use crate::types::{LightingSettings, LightingSummary, MeshSummary, ToolState, ViewState};

/// Messages from the editor core to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EditorToUi {
    /// Full state sync when the UI loads
    Initialize {
        mesh: MeshSummary,
        tool: ToolState,
        lighting: LightingSettings,
    },

    /// Grid or vertex pool changed
    MeshChanged(MeshSummary),

    /// Number of tiles or vertices a command touched
    EditApplied { command: String, affected: usize },

    /// Vertex selection changed
    SelectionChanged { count: usize, capacity: usize },

    /// Lights placed or vertices rebaked
    LightingChanged(LightingSummary),

    /// Brush, paint or fx mask changed
    ToolChanged(ToolState),

    /// Editor window moved or zoomed
    ViewChanged(ViewState),

    /// Error notification
    Error { code: String, message: String },
}

/// Messages from the UI to the editor core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToEditor {
    /// UI has loaded and needs a full state sync
    Ready,

    /// Whole-mesh commands
    MeshCommand(MeshCommand),

    /// Height editing
    TerrainCommand(TerrainCommand),

    /// Per-tile editing
    TileCommand(TileCommand),

    /// Vertex selection
    SelectionCommand(SelectionCommand),

    /// Lights and ambient bake
    LightCommand(LightCommand),

    /// Tool settings
    ToolCommand(ToolCommand),

    /// Window navigation
    ViewCommand(ViewCommand),
}

impl UiToEditor {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        if json.trim().is_empty() {
            return Err(IpcError::InvalidFormat("empty message".to_string()));
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl EditorToUi {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Error notification from any displayable error
    pub fn error(code: &str, err: &impl std::fmt::Display) -> Self {
        Self::Error {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}
