/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 128.0;

/// Terminates a tile's vertex chain.
pub const CHAINEND: u32 = u32::MAX;

/// Ambient value marking a vertex slot as free. Never written to a live vertex.
pub const VERTEX_UNUSED: u8 = 0;

/// Ambient value given to freshly allocated vertices before lighting runs.
pub const VERTEX_FRESH: u8 = 1;

/// Texture bits of a tile with no geometry ("fan off").
pub const FANOFF: u16 = 0xFFFF;

/// Maximum vertices in one tile shape (the 4x4 logical sub-grid).
pub const MAX_FAN_VERTICES: usize = 16;

/// Number of tile shape ids.
pub const MAX_TILE_TYPES: usize = 64;

/// Shape ids at or above this use the 2x texture scale.
pub const BIG_TILE_TYPE_START: u8 = 32;

/// Largest supported grid dimension per axis.
pub const MAX_MESH_TILES: u32 = 512;

/// Corner indices into a tile's vertex chain. Matches the dictionary order.
pub const CORNER_TL: usize = 0;
pub const CORNER_TR: usize = 1;
pub const CORNER_BR: usize = 2;
pub const CORNER_BL: usize = 3;

/// Height difference that moves the twist code by one step.
pub const TWIST_SLOPE: f32 = 50.0;

/// Twist code of a level tile.
pub const TWIST_FLAT: u8 = 119;

/// Highest baked ambient value.
pub const MAX_AMBIENT_LEVEL: u8 = 255;

/// Texture base for the blank-mesh checkerboard.
pub const BLANK_TEXTURE_BASE: u16 = 0x3E;
