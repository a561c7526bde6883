//! Canvas Interaction Controller
//!
//! Gesture state for the wiring canvas: the click-to-connect protocol,
//! component dragging, and pan/zoom. Pure state machine over input
//! events; it owns no diagram data and emits draft connections and drag
//! updates for the store to apply. SVG painting lives elsewhere.

use std::sync::Arc;

use crate::ids::IdGenerator;
use crate::router::preview_path;
use crate::schema::{Connection, Point, WireKind};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Click-to-connect state: either idle, or holding the first endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectState {
    Idle,
    ConnectingFrom {
        component: String,
        pin: String,
        anchor: Point,
    },
}

/// Active component drag; concurrent with and independent of the
/// connect state.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub component: String,
    /// Grab offset from the component's top-left corner.
    pub offset: Point,
}

/// Pan/zoom of the canvas view.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub pan: Point,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Point::default(),
            zoom: 1.0,
        }
    }
}

/// Current selection, reported to the UI shell as
/// `(connection id | none, component id | none)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub connection: Option<String>,
    pub component: Option<String>,
}

pub struct CanvasController {
    connect: ConnectState,
    drag: Option<DragState>,
    viewport: Viewport,
    selection: Selection,
    cursor: Option<Point>,
    canvas_size: (f64, f64),
    ids: Arc<dyn IdGenerator>,
}

impl CanvasController {
    pub fn new(canvas_size: (f64, f64), ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            connect: ConnectState::Idle,
            drag: None,
            viewport: Viewport::default(),
            selection: Selection::default(),
            cursor: None,
            canvas_size,
            ids,
        }
    }

    pub fn connect_state(&self) -> &ConnectState {
        &self.connect
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Click on a pin. The first click arms the connection; a second
    /// click on a pin of a *different* component emits a draft wire
    /// (data type, default color, unvalidated) and returns to idle. A
    /// second click on the same component is a no-op.
    pub fn click_pin(
        &mut self,
        component_id: &str,
        pin_id: &str,
        at: Point,
    ) -> Option<Connection> {
        match &self.connect {
            ConnectState::Idle => {
                self.connect = ConnectState::ConnectingFrom {
                    component: component_id.to_string(),
                    pin: pin_id.to_string(),
                    anchor: at,
                };
                None
            }
            ConnectState::ConnectingFrom { component, pin, .. } => {
                if component == component_id {
                    return None;
                }
                let draft = Connection::new(
                    self.ids.next(),
                    component.clone(),
                    pin.clone(),
                    component_id,
                    pin_id,
                    WireKind::Data,
                );
                self.connect = ConnectState::Idle;
                self.cursor = None;
                Some(draft)
            }
        }
    }

    /// Click on empty canvas: abandon any pending connection and clear
    /// the selection.
    pub fn click_empty(&mut self) {
        self.connect = ConnectState::Idle;
        self.cursor = None;
        self.selection = Selection::default();
    }

    pub fn select_connection(&mut self, id: &str) -> &Selection {
        self.selection = Selection {
            connection: Some(id.to_string()),
            component: None,
        };
        &self.selection
    }

    pub fn select_component(&mut self, id: &str) -> &Selection {
        self.selection = Selection {
            connection: None,
            component: Some(id.to_string()),
        };
        &self.selection
    }

    /// Dashed preview wire from the armed pin to the cursor, one bend.
    pub fn preview(&self) -> Option<String> {
        match (&self.connect, self.cursor) {
            (ConnectState::ConnectingFrom { anchor, .. }, Some(cursor)) => {
                Some(preview_path(*anchor, cursor))
            }
            _ => None,
        }
    }

    /// Mouse-down on a component body.
    pub fn begin_drag(&mut self, component_id: &str, component_pos: Point, grab: Point) {
        self.drag = Some(DragState {
            component: component_id.to_string(),
            offset: Point::new(grab.x - component_pos.x, grab.y - component_pos.y),
        });
    }

    /// Pointer movement. Updates the connect preview cursor and, while a
    /// drag is active, yields the dragged component's new position
    /// clamped to the canvas bounds.
    pub fn pointer_moved(&mut self, at: Point) -> Option<(String, Point)> {
        self.cursor = Some(at);
        let drag = self.drag.as_ref()?;
        let (w, h) = self.canvas_size;
        let position = Point::new(
            (at.x - drag.offset.x).clamp(0.0, w),
            (at.y - drag.offset.y).clamp(0.0, h),
        );
        Some((drag.component.clone(), position))
    }

    /// Mouse-up: any active drag ends.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Canvas lost focus: abandon all transient gesture state.
    pub fn blur(&mut self) {
        self.drag = None;
        self.connect = ConnectState::Idle;
        self.cursor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pan by a screen-space delta (middle-drag or drag on empty space).
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan.x += dx;
        self.viewport.pan.y += dy;
    }

    /// Wheel zoom about the cursor: the world point under the cursor
    /// stays fixed on screen. Zoom is clamped to [0.1, 5.0].
    pub fn zoom_at(&mut self, cursor: Point, factor: f64) {
        let old = self.viewport.zoom;
        let new = (old * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if new == old {
            return;
        }
        let world_x = (cursor.x - self.viewport.pan.x) / old;
        let world_y = (cursor.y - self.viewport.pan.y) / old;
        self.viewport.pan.x = cursor.x - world_x * new;
        self.viewport.pan.y = cursor.y - world_y * new;
        self.viewport.zoom = new;
    }
}
