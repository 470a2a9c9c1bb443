//! Editor session: the single owner of the mesh and tool state.
//!
//! `EditorSession` holds the mesh, the current selection, the placed
//! lights, the tool parameters, one viewport per view kind and the seeded
//! RNG. UI commands arrive as [`UiToEditor`] messages and are dispatched
//! onto the mesh operations; each command answers with the notifications
//! the UI needs to refresh.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use cartman_config::{BrushConfig, ConfigError, EditorConfig, LightingConfig};
use cartman_ipc::{
    EditorToUi, IpcError, LightCommand, LightInfo, LightingSettings, LightingSummary, MeshCommand,
    MeshSummary, SelectionCommand, TerrainCommand, TileCommand, TilePaintSettings, ToolCommand,
    ToolState, UiToEditor, VariantSetting, ViewCommand, ViewMode, ViewState,
};

use crate::dictionary::TileDictionary;
use crate::edit::{TextureVariant, TilePaint};
use crate::lighting::{Light, LightList, recompute_mesh};
use crate::mesh::{Mesh, MeshError, RawMesh};
use crate::selection::SelectionList;
use crate::types::TileFx;
use crate::viewport::{ViewKind, Viewport};

/// Window size viewports start with until the UI reports its layout
pub const DEFAULT_VIEW_SIZE: Vec2 = Vec2::new(640.0, 480.0);

/// Errors surfaced by session commands
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Ipc(#[from] IpcError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    /// Short machine-readable code for UI error notifications
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Mesh(_) => "mesh",
            SessionError::Ipc(_) => "ipc",
            SessionError::Config(_) => "config",
        }
    }
}

impl From<ViewMode> for ViewKind {
    fn from(mode: ViewMode) -> Self {
        match mode {
            ViewMode::Vertex => ViewKind::Vertex,
            ViewMode::Tile => ViewKind::Tile,
            ViewMode::Side => ViewKind::Side,
            ViewMode::Fx => ViewKind::Fx,
        }
    }
}

impl From<ViewKind> for ViewMode {
    fn from(kind: ViewKind) -> Self {
        match kind {
            ViewKind::Vertex => ViewMode::Vertex,
            ViewKind::Tile => ViewMode::Tile,
            ViewKind::Side => ViewMode::Side,
            ViewKind::Fx => ViewMode::Fx,
        }
    }
}

impl From<VariantSetting> for TextureVariant {
    fn from(setting: VariantSetting) -> Self {
        match setting {
            VariantSetting::Exact => TextureVariant::Exact,
            VariantSetting::Pair => TextureVariant::Pair,
            VariantSetting::Quad => TextureVariant::Quad,
            VariantSetting::Octet => TextureVariant::Octet,
        }
    }
}

impl From<TextureVariant> for VariantSetting {
    fn from(variant: TextureVariant) -> Self {
        match variant {
            TextureVariant::Exact => VariantSetting::Exact,
            TextureVariant::Pair => VariantSetting::Pair,
            TextureVariant::Quad => VariantSetting::Quad,
            TextureVariant::Octet => VariantSetting::Octet,
        }
    }
}

impl From<&TilePaintSettings> for TilePaint {
    fn from(settings: &TilePaintSettings) -> Self {
        Self {
            texture_bits: settings.texture_bits,
            upper_bits: settings.upper_bits,
            fx: TileFx(settings.fx),
            tile_type: settings.tile_type,
            variant: settings.variant.into(),
            texture_only: settings.texture_only,
            preserve_heights: settings.preserve_heights,
        }
    }
}

impl From<&TilePaint> for TilePaintSettings {
    fn from(paint: &TilePaint) -> Self {
        Self {
            texture_bits: paint.texture_bits,
            upper_bits: paint.upper_bits,
            fx: paint.fx.bits(),
            tile_type: paint.tile_type,
            variant: paint.variant.into(),
            texture_only: paint.texture_only,
            preserve_heights: paint.preserve_heights,
        }
    }
}

/// One open level and everything the tools need to edit it
#[derive(Debug)]
pub struct EditorSession {
    mesh: Mesh,
    selection: SelectionList,
    lights: LightList,
    lighting: LightingConfig,
    brush: BrushConfig,
    paint: TilePaint,
    fx_mask: TileFx,
    viewports: [Viewport; 4],
    rng: StdRng,
    vertices_baked: usize,
}

impl EditorSession {
    /// Start a session with an empty mesh
    pub fn new(dictionary: Arc<TileDictionary>, config: &EditorConfig) -> Result<Self, SessionError> {
        config.validate()?;
        let mesh = Mesh::with_config(dictionary, config);
        let selection = SelectionList::with_capacity(&mesh, config.selection_capacity);
        let viewports = ViewKind::ALL.map(|kind| Viewport::new(kind, DEFAULT_VIEW_SIZE.x, DEFAULT_VIEW_SIZE.y));

        Ok(Self {
            mesh,
            selection,
            lights: LightList::new(config.light_capacity),
            lighting: config.lighting,
            brush: config.brush,
            paint: TilePaint::default(),
            fx_mask: TileFx::DEFAULT_WALL,
            viewports,
            rng: StdRng::seed_from_u64(config.rng_seed),
            vertices_baked: 0,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn selection(&self) -> &SelectionList {
        &self.selection
    }

    pub fn lights(&self) -> &LightList {
        &self.lights
    }

    pub fn lighting(&self) -> &LightingConfig {
        &self.lighting
    }

    pub fn brush(&self) -> &BrushConfig {
        &self.brush
    }

    pub fn paint(&self) -> &TilePaint {
        &self.paint
    }

    pub fn fx_mask(&self) -> TileFx {
        self.fx_mask
    }

    pub fn viewport(&self, kind: ViewKind) -> &Viewport {
        &self.viewports[kind as usize]
    }

    pub fn viewport_mut(&mut self, kind: ViewKind) -> &mut Viewport {
        &mut self.viewports[kind as usize]
    }

    /// Replace the mesh with a loaded one, falling back to a blank grid of
    /// the given size when the raw arrays are inconsistent. Returns whether
    /// the raw mesh was used.
    pub fn load_or_blank(&mut self, raw: &RawMesh, tiles_x: u32, tiles_y: u32) -> Result<bool, SessionError> {
        let loaded = match self.mesh.load_raw(raw) {
            Ok(()) => true,
            Err(err) => {
                warn!("load_or_blank: {}, generating a blank {}x{} grid", err, tiles_x, tiles_y);
                self.mesh.create_blank(tiles_x, tiles_y)?;
                false
            }
        };
        self.reset_level_state();
        Ok(loaded)
    }

    /// Per-level state goes when the mesh is replaced: the selection is
    /// rebound and placed lights are dropped
    fn reset_level_state(&mut self) {
        self.selection.synch(&self.mesh);
        self.lights.clear();
        self.vertices_baked = 0;
    }

    /// Raw arrays for saving
    pub fn to_raw(&self) -> RawMesh {
        self.mesh.to_raw()
    }

    pub fn mesh_summary(&self) -> MeshSummary {
        MeshSummary {
            tiles_x: self.mesh.tiles_x(),
            tiles_y: self.mesh.tiles_y(),
            edge_z: self.mesh.edge_z(),
            used_vertices: self.mesh.pool().used_count(),
            free_vertices: self.mesh.free_vertices(),
        }
    }

    pub fn lighting_summary(&self) -> LightingSummary {
        LightingSummary {
            lights: self
                .lights
                .iter()
                .map(|l| LightInfo {
                    x: l.x,
                    y: l.y,
                    radius: l.radius,
                    level: l.level,
                })
                .collect(),
            vertices_baked: self.vertices_baked,
        }
    }

    pub fn tool_state(&self) -> ToolState {
        ToolState {
            brush_size: self.brush.size,
            brush_amount: self.brush.amount,
            paint: (&self.paint).into(),
            fx_mask: self.fx_mask.bits(),
        }
    }

    fn lighting_settings(&self) -> LightingSettings {
        LightingSettings {
            global_ambient: self.lighting.global_ambient,
            ambient_cut: self.lighting.ambient_cut,
            directional: self.lighting.directional,
        }
    }

    fn view_state(&self, kind: ViewKind) -> ViewState {
        let view = self.viewport(kind);
        ViewState {
            view: kind.into(),
            origin: view.origin.to_array(),
            zoom: view.zoom,
            size_px: [view.width_px, view.height_px],
        }
    }

    fn selection_changed(&self) -> EditorToUi {
        EditorToUi::SelectionChanged {
            count: self.selection.count(),
            capacity: self.selection.capacity(),
        }
    }

    fn applied(command: &str, affected: usize) -> EditorToUi {
        EditorToUi::EditApplied {
            command: command.to_string(),
            affected,
        }
    }

    /// Parse and apply one JSON command
    pub fn apply_json(&mut self, json: &str) -> Result<Vec<EditorToUi>, SessionError> {
        let msg = UiToEditor::from_json(json)?;
        self.apply(&msg)
    }

    /// Apply a command, turning failures into an error notification
    pub fn handle(&mut self, msg: &UiToEditor) -> Vec<EditorToUi> {
        match self.apply(msg) {
            Ok(replies) => replies,
            Err(err) => {
                warn!("Command failed: {}", err);
                vec![EditorToUi::error(err.code(), &err)]
            }
        }
    }

    /// Apply one UI command and return the notifications it produces
    pub fn apply(&mut self, msg: &UiToEditor) -> Result<Vec<EditorToUi>, SessionError> {
        match msg {
            UiToEditor::Ready => Ok(vec![EditorToUi::Initialize {
                mesh: self.mesh_summary(),
                tool: self.tool_state(),
                lighting: self.lighting_settings(),
            }]),
            UiToEditor::MeshCommand(cmd) => self.apply_mesh(cmd),
            UiToEditor::TerrainCommand(cmd) => Ok(self.apply_terrain(cmd)),
            UiToEditor::TileCommand(cmd) => self.apply_tile(cmd),
            UiToEditor::SelectionCommand(cmd) => Ok(self.apply_selection(cmd)),
            UiToEditor::LightCommand(cmd) => Ok(self.apply_light(cmd)),
            UiToEditor::ToolCommand(cmd) => Ok(self.apply_tool(cmd)),
            UiToEditor::ViewCommand(cmd) => Ok(self.apply_view(cmd)),
        }
    }

    fn apply_mesh(&mut self, cmd: &MeshCommand) -> Result<Vec<EditorToUi>, SessionError> {
        match *cmd {
            MeshCommand::CreateBlank { tiles_x, tiles_y } => {
                self.mesh.create_blank(tiles_x, tiles_y)?;
                self.reset_level_state();
                info!("Created blank {}x{} mesh", tiles_x, tiles_y);
                Ok(self.level_replaced())
            }
            MeshCommand::Clear => {
                self.mesh.clear();
                self.reset_level_state();
                Ok(self.level_replaced())
            }
            MeshCommand::FixMesh => {
                self.mesh.fix_mesh();
                Ok(vec![Self::applied("FixMesh", self.mesh.tile_count())])
            }
            MeshCommand::FixCorners => {
                self.mesh.fix_corners();
                Ok(vec![Self::applied("FixCorners", self.mesh.tile_count())])
            }
            MeshCommand::FixWalls => {
                self.mesh.fix_walls();
                Ok(vec![Self::applied("FixWalls", self.mesh.tile_count())])
            }
            MeshCommand::FixTwist => {
                self.mesh.fix_twist();
                Ok(vec![Self::applied("FixTwist", self.mesh.tile_count())])
            }
        }
    }

    fn level_replaced(&self) -> Vec<EditorToUi> {
        vec![
            EditorToUi::MeshChanged(self.mesh_summary()),
            self.selection_changed(),
            EditorToUi::LightingChanged(self.lighting_summary()),
        ]
    }

    fn apply_terrain(&mut self, cmd: &TerrainCommand) -> Vec<EditorToUi> {
        match *cmd {
            TerrainCommand::Raise { view, screen, lower } => {
                let viewport = *self.viewport(view.into());
                if !viewport.kind.is_top_down() {
                    debug!("Raise: {:?} view has no ground plane", viewport.kind);
                    return vec![Self::applied("Raise", 0)];
                }
                let center = viewport.screen_to_world(Vec2::from_array(screen)).truncate();
                let reach = Vec2::splat(self.brush.size);
                let ids = self.mesh.vertices_in_rect(center - reach, center + reach);
                let amount = if lower { -self.brush.amount } else { self.brush.amount };
                let moved = self.mesh.raise_around_point(&ids, center, amount, self.brush.size);
                self.mesh.fix_twist();
                vec![Self::applied("Raise", moved)]
            }
            TerrainCommand::FlattenBelow { screen_y } => {
                let side = *self.viewport(ViewKind::Side);
                vec![Self::applied("FlattenBelow", self.mesh.flatten_below(&side, screen_y))]
            }
            TerrainCommand::FlattenToHeight { height } => {
                vec![Self::applied("FlattenToHeight", self.mesh.flatten_to_height(height))]
            }
            TerrainCommand::LevelAllToZero => vec![Self::applied("LevelAllToZero", self.mesh.level_all_to_zero())],
            TerrainCommand::JitterMesh => vec![Self::applied("JitterMesh", self.mesh.jitter_mesh(&mut self.rng))],
        }
    }

    fn apply_tile(&mut self, cmd: &TileCommand) -> Result<Vec<EditorToUi>, SessionError> {
        let reply = match *cmd {
            TileCommand::Retype { x, y } => {
                let painted = self.mesh.retype(x, y, &self.paint, &mut self.rng)?;
                if painted {
                    // The tile's old vertex slots were released
                    self.selection.clear();
                }
                return Ok(vec![
                    Self::applied("Retype", painted as usize),
                    EditorToUi::MeshChanged(self.mesh_summary()),
                    self.selection_changed(),
                ]);
            }
            TileCommand::ClearAll => {
                let painted = self.mesh.clear_all(&self.paint, &mut self.rng)?;
                if painted > 0 {
                    self.selection.clear();
                }
                return Ok(vec![
                    Self::applied("ClearAll", painted),
                    EditorToUi::MeshChanged(self.mesh_summary()),
                    self.selection_changed(),
                ]);
            }
            TileCommand::SetFx { x, y, fx } => Self::applied("SetFx", self.mesh.set_tile_fx(x, y, TileFx(fx)) as usize),
            TileCommand::ToggleFx { x, y } => {
                Self::applied("ToggleFx", self.mesh.toggle_tile_fx(x, y, self.fx_mask) as usize)
            }
            TileCommand::SetFxByTexture { texture_bits, mask, fx } => Self::applied(
                "SetFxByTexture",
                self.mesh.set_fx_by_texture(texture_bits, mask, TileFx(fx)),
            ),
            TileCommand::TrimAutoTile { texture_bits, mask } => Self::applied(
                "TrimAutoTile",
                self.mesh.trim_auto_tile(texture_bits, mask, &mut self.rng),
            ),
            TileCommand::WeldCorner { x, y } => {
                self.mesh.weld_corner(x, y);
                Self::applied("WeldCorner", self.mesh.tile_index_at(x, y).is_some() as usize)
            }
            TileCommand::FixEdgeVertices { x, y } => {
                Self::applied("FixEdgeVertices", self.mesh.fix_edge_vertices(x, y))
            }
            TileCommand::SmoothWallBarrier { x, y } => {
                Self::applied("SmoothWallBarrier", self.mesh.smooth_wall_barrier(x, y) as usize)
            }
        };
        Ok(vec![reply])
    }

    fn apply_selection(&mut self, cmd: &SelectionCommand) -> Vec<EditorToUi> {
        match *cmd {
            SelectionCommand::AddRectangle { view, corner0, corner1 } => {
                let viewport = self.viewport(view.into());
                let a = viewport.screen_to_world(Vec2::from_array(corner0));
                let b = viewport.screen_to_world(Vec2::from_array(corner1));
                let axes = viewport.selection_axes();
                self.selection.add_rectangle(&self.mesh, a, b, axes);
            }
            SelectionCommand::RemoveRectangle { view, corner0, corner1 } => {
                let viewport = self.viewport(view.into());
                let a = viewport.screen_to_world(Vec2::from_array(corner0));
                let b = viewport.screen_to_world(Vec2::from_array(corner1));
                let axes = viewport.selection_axes();
                self.selection.remove_rectangle(&self.mesh, a, b, axes);
            }
            SelectionCommand::AddTile { x, y } => {
                self.selection.add_tile(&self.mesh, x, y);
            }
            SelectionCommand::AddConnected => {
                self.selection.add_connected(&self.mesh);
            }
            SelectionCommand::Clear => self.selection.clear(),
            SelectionCommand::Weld => {
                return vec![Self::applied("Weld", self.mesh.weld(&self.selection))];
            }
            SelectionCommand::Move { delta } => {
                let applied = self.mesh.move_selection(&self.selection, Vec3::from_array(delta));
                self.mesh.fix_twist();
                let moved = if applied == Vec3::ZERO { 0 } else { self.selection.count() };
                return vec![Self::applied("Move", moved)];
            }
            SelectionCommand::Jitter => {
                let moved = self.mesh.jitter_selection(&self.selection, &mut self.rng);
                self.mesh.fix_twist();
                return vec![Self::applied("Jitter", moved)];
            }
        }
        vec![self.selection_changed()]
    }

    fn apply_light(&mut self, cmd: &LightCommand) -> Vec<EditorToUi> {
        match *cmd {
            LightCommand::Place { x, y, radius, level } => {
                if !self.lights.place(Light::new(x, y, radius, level)) {
                    warn!("Place light: list is full ({} lights)", self.lights.capacity());
                }
            }
            LightCommand::AlterLast { x, y, radius, level } => {
                self.lights.alter_last(Light::new(x, y, radius, level));
            }
            LightCommand::Clear => self.lights.clear(),
            LightCommand::SetLighting(settings) => {
                self.lighting = LightingConfig {
                    global_ambient: settings.global_ambient,
                    ambient_cut: settings.ambient_cut,
                    directional: settings.directional,
                };
            }
            LightCommand::Recompute => {
                self.vertices_baked = recompute_mesh(&mut self.mesh, self.lights.as_slice(), &self.lighting);
            }
        }
        vec![EditorToUi::LightingChanged(self.lighting_summary())]
    }

    fn apply_tool(&mut self, cmd: &ToolCommand) -> Vec<EditorToUi> {
        match cmd {
            ToolCommand::SetBrush { size, amount } => {
                self.brush.size = size.max(0.0);
                self.brush.amount = *amount;
            }
            ToolCommand::SetPaint(settings) => self.paint = settings.into(),
            ToolCommand::SetFxMask { fx } => self.fx_mask = TileFx(*fx),
        }
        vec![EditorToUi::ToolChanged(self.tool_state())]
    }

    fn apply_view(&mut self, cmd: &ViewCommand) -> Vec<EditorToUi> {
        let kind = match *cmd {
            ViewCommand::Resize { view, width, height } => {
                self.viewport_mut(view.into()).resize(width, height);
                view
            }
            ViewCommand::Pan { view, delta } => {
                self.viewport_mut(view.into()).pan(Vec2::from_array(delta));
                view
            }
            ViewCommand::Zoom { view, anchor, zoom } => {
                self.viewport_mut(view.into()).zoom_at(Vec2::from_array(anchor), zoom);
                view
            }
        };
        vec![EditorToUi::ViewChanged(self.view_state(kind.into()))]
    }
}
