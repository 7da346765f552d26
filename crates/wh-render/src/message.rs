//! Wire format for the render transport: one JSON object per line.

use serde::Serialize;

use wh_grid::CellKind;

/// A point in grid units, used both for object coordinates and sizes.
/// Coordinates may be fractional (sub-tick interpolation); this simulation
/// always emits whole-cell values.
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// RGBA color. Serializes as a 4-element JSON array, `r`/`g`/`b` as 0-255
/// ints and `a` as 0-1 — the exact shape the render wire format documents.
#[derive(Copy, Clone, PartialEq, Debug, Serialize)]
pub struct Color(pub u8, pub u8, pub u8, pub f32);

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RenderCellKind {
    Free,
    Obstacle,
    MaintenanceSlot,
    Stack,
    PickupZone,
}

impl From<CellKind> for RenderCellKind {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Free => RenderCellKind::Free,
            CellKind::Obstacle => RenderCellKind::Obstacle,
            CellKind::MaintenanceSlot => RenderCellKind::MaintenanceSlot,
            CellKind::Stack(_) => RenderCellKind::Stack,
            CellKind::PickupZone(_) => RenderCellKind::PickupZone,
        }
    }
}

/// What a `draw_object` message represents. Not itself part of the wire
/// format — [`RenderMessage::draw_object`] maps it to the documented
/// `color`/`size` fields.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ObjectKind {
    Agent { carrying: bool },
    Pallet,
    Cell(RenderCellKind),
}

impl ObjectKind {
    fn color(self) -> Color {
        match self {
            ObjectKind::Agent { carrying: false } => Color(46, 160, 67, 1.0),
            ObjectKind::Agent { carrying: true } => Color(240, 136, 62, 1.0),
            ObjectKind::Pallet => Color(160, 120, 60, 1.0),
            ObjectKind::Cell(RenderCellKind::Free) => Color(230, 230, 230, 1.0),
            ObjectKind::Cell(RenderCellKind::Obstacle) => Color(60, 60, 60, 1.0),
            ObjectKind::Cell(RenderCellKind::MaintenanceSlot) => Color(210, 210, 20, 1.0),
            ObjectKind::Cell(RenderCellKind::Stack) => Color(120, 80, 40, 1.0),
            ObjectKind::Cell(RenderCellKind::PickupZone) => Color(30, 144, 255, 1.0),
        }
    }

    fn size(self) -> Point {
        match self {
            ObjectKind::Agent { .. } => Point::new(0.8, 0.8),
            ObjectKind::Pallet => Point::new(0.5, 0.5),
            ObjectKind::Cell(_) => Point::new(1.0, 1.0),
        }
    }
}

/// One message in the render wire protocol. A completed frame is
/// `ClearScreen`, followed by zero or more `DrawObject`s, with `ScreenSize`
/// and `DrawGrid` sent once at startup and again only if the floor plan's
/// rendering unit changes (never, post-init, since the grid is static).
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderMessage {
    ScreenSize { width: u32, height: u32 },
    DrawGrid { unit_pixel_size: u32 },
    ClearScreen,
    DrawObject {
        coordinates: Point,
        size: Point,
        color: Color,
        id: String,
        text: Option<String>,
    },
}

impl RenderMessage {
    /// Build a `draw_object` message for `kind` standing at grid cell
    /// `(x, y)`.
    pub fn draw_object(id: impl Into<String>, kind: ObjectKind, x: i32, y: i32) -> Self {
        RenderMessage::DrawObject {
            coordinates: Point::new(x as f64, y as f64),
            size: kind.size(),
            color: kind.color(),
            id: id.into(),
            text: None,
        }
    }
}
