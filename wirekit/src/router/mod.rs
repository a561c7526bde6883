//! Smart Orthogonal Path Engine
//!
//! Routes a connection between two pins as an orthogonal polyline that
//! avoids, where possible, cells already occupied by other connections.
//! Up to five candidate strategies are generated per connection (direct,
//! horizontal detour, vertical detour, wide external contours above and
//! below the endpoints); clear candidates are scored by
//! `length + 20 x point count` and the cheapest wins. The external
//! contours are always generated so routing is total: if no candidate is
//! clear the first one is used regardless.
//!
//! The occupancy grid and the per-connection path cache live in an
//! explicit [`RoutingContext`] owned by the diagram view; its lifecycle
//! (reset on diagram swap, garbage collection against live connection
//! ids) is the caller's responsibility, never module-global state.

mod grid;

pub use grid::{OccupancyGrid, CELL_SIZE};

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::graph::resolved_link;
use crate::schema::{Component, Diagram, Pin, Point};

/// Stand-off distance from a pin before the first bend.
const STANDOFF: f64 = 30.0;

/// Minimum axis span before a detour corridor is considered.
const DETOUR_MIN_SPAN: f64 = 60.0;

/// Corridor position as a fraction of the axis span.
const DETOUR_FRACTION: f64 = 0.3;

/// Margin of the external contour beyond the endpoints' extent.
const EXTERNAL_MARGIN: f64 = 50.0;

/// Per-point complexity penalty in the candidate score.
const BEND_PENALTY: f64 = 20.0;

/// Side of a component's bounding box a wire exits from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl ExitSide {
    pub fn is_horizontal(self) -> bool {
        matches!(self, ExitSide::Left | ExitSide::Right)
    }

    /// Unit direction pointing away from the component body.
    fn direction(self) -> (f64, f64) {
        match self {
            ExitSide::Left => (-1.0, 0.0),
            ExitSide::Right => (1.0, 0.0),
            ExitSide::Top => (0.0, -1.0),
            ExitSide::Bottom => (0.0, 1.0),
        }
    }
}

/// Classify a pin's exit side from its offset against 40% of the
/// component's half extents; whichever threshold the pin is furthest
/// past (or nearest to) wins.
pub fn infer_exit_side(pin: &Pin, component: &Component) -> ExitSide {
    let (width, height) = component.body_size();
    let tx = 0.4 * width / 2.0;
    let ty = 0.4 * height / 2.0;
    let candidates = [
        (ExitSide::Left, -pin.position.x - tx),
        (ExitSide::Right, pin.position.x - tx),
        (ExitSide::Top, -pin.position.y - ty),
        (ExitSide::Bottom, pin.position.y - ty),
    ];
    candidates
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(side, _)| side)
        .unwrap_or(ExitSide::Left)
}

/// Occupancy grid plus the path cache for one diagram view.
#[derive(Debug, Default)]
pub struct RoutingContext {
    grid: OccupancyGrid,
    paths: HashMap<String, Vec<Point>>,
}

impl RoutingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all routing state, e.g. when the diagram reference changes.
    pub fn reset(&mut self) {
        self.grid.clear();
        self.paths.clear();
    }

    /// Release state for connections no longer present in the diagram.
    pub fn collect_garbage(&mut self, live: &HashSet<String>) {
        let stale: Vec<String> = self
            .paths
            .keys()
            .filter(|id| !live.contains(*id))
            .cloned()
            .collect();
        for id in stale {
            tracing::debug!(connection = %id, "releasing stale routing state");
            self.grid.release(&id);
            self.paths.remove(&id);
        }
    }

    /// The cached polyline for a connection, if it has been routed.
    pub fn cached_path(&self, connection_id: &str) -> Option<&[Point]> {
        self.paths.get(connection_id).map(Vec::as_slice)
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }
}

/// Route one connection between two concrete pins.
///
/// Releases the connection's previous cells before computing (so a
/// reroute never blocks itself), marks the chosen path, and caches it so
/// subsequent connections see it as an obstacle. Always returns a valid
/// SVG polyline from the `from` pin to the `to` pin.
pub fn route_connection(
    ctx: &mut RoutingContext,
    connection_id: &str,
    from: (&Component, &Pin),
    to: (&Component, &Pin),
) -> String {
    ctx.grid.release(connection_id);
    ctx.paths.remove(connection_id);

    let start = from.0.pin_position(from.1);
    let end = to.0.pin_position(to.1);
    let from_side = infer_exit_side(from.1, from.0);
    let to_side = infer_exit_side(to.1, to.0);

    let mut candidates = vec![direct_path(start, end, from_side, to_side)];
    if let Some(path) = horizontal_detour(start, end, from_side, to_side) {
        candidates.push(path);
    }
    if let Some(path) = vertical_detour(start, end, from_side, to_side) {
        candidates.push(path);
    }
    candidates.push(external_path_above(start, end, from_side, to_side));
    candidates.push(external_path_below(start, end, from_side, to_side));

    // Earlier strategies win ties, so the direct route is preferred
    // whenever it is no worse than a detour.
    let mut best: Option<(f64, usize)> = None;
    for (i, path) in candidates.iter().enumerate() {
        if !ctx.grid.is_clear(connection_id, path) {
            continue;
        }
        let s = score(path);
        if best.map_or(true, |(b, _)| s < b) {
            best = Some((s, i));
        }
    }
    let chosen = candidates[best.map(|(_, i)| i).unwrap_or(0)].clone();

    ctx.grid.mark(connection_id, &chosen);
    let svg = path_to_svg(&chosen);
    ctx.paths.insert(connection_id.to_string(), chosen);
    svg
}

/// Route every resolvable connection of a diagram, in connection order.
///
/// Connections referencing missing components are skipped; stale routing
/// state is collected first so removed wires stop acting as obstacles.
pub fn route_all(ctx: &mut RoutingContext, diagram: &Diagram) -> Vec<(String, String)> {
    let live: HashSet<String> = diagram.connections.iter().map(|c| c.id.clone()).collect();
    ctx.collect_garbage(&live);

    let mut routed = Vec::new();
    for conn in &diagram.connections {
        let Some(link) = resolved_link(diagram, conn) else {
            tracing::debug!(connection = %conn.id, "skipping connection with missing endpoint");
            continue;
        };
        let (Some(from_comp), Some(to_comp)) = (
            diagram.find_component(&link.from.0),
            diagram.find_component(&link.to.0),
        ) else {
            continue;
        };
        let (Some(from_pin), Some(to_pin)) = (
            from_comp.find_pin(&link.from.1),
            to_comp.find_pin(&link.to.1),
        ) else {
            // Resolution returned a non-pin token (empty pin list);
            // degrade to a straight anchor-to-anchor line.
            routed.push((
                conn.id.clone(),
                fallback_path(from_comp.center(), to_comp.center()),
            ));
            continue;
        };
        let svg = route_connection(ctx, &conn.id, (from_comp, from_pin), (to_comp, to_pin));
        routed.push((conn.id.clone(), svg));
    }
    routed
}

/// Straight two-point degradation used when no bounding-box data is
/// available, and for the dashed click-to-wire preview.
pub fn fallback_path(from: Point, to: Point) -> String {
    path_to_svg(&[from, to])
}

/// Simplified one-bend preview path for the interactive dashed wire.
pub fn preview_path(from: Point, to: Point) -> String {
    if from.x == to.x || from.y == to.y {
        return path_to_svg(&[from, to]);
    }
    path_to_svg(&[from, Point::new(to.x, from.y), to])
}

/// Direct strategy: fixed stand-off out of each pin, joined by an L or Z
/// bend depending on the exit orientations.
fn direct_path(start: Point, end: Point, from_side: ExitSide, to_side: ExitSide) -> Vec<Point> {
    let ea = offset(start, from_side, STANDOFF);
    let eb = offset(end, to_side, STANDOFF);

    let mut points = vec![start, ea];
    match (from_side.is_horizontal(), to_side.is_horizontal()) {
        (true, true) => {
            if ea.y != eb.y {
                let mid_x = (ea.x + eb.x) / 2.0;
                points.push(Point::new(mid_x, ea.y));
                points.push(Point::new(mid_x, eb.y));
            }
        }
        (false, false) => {
            if ea.x != eb.x {
                let mid_y = (ea.y + eb.y) / 2.0;
                points.push(Point::new(ea.x, mid_y));
                points.push(Point::new(eb.x, mid_y));
            }
        }
        (true, false) => points.push(Point::new(eb.x, ea.y)),
        (false, true) => points.push(Point::new(ea.x, eb.y)),
    }
    points.push(eb);
    points.push(end);
    dedup_points(points)
}

/// Detour through a vertical corridor at 30% of the x-span; only
/// considered for spans wide enough to be worth the bends.
fn horizontal_detour(
    start: Point,
    end: Point,
    from_side: ExitSide,
    to_side: ExitSide,
) -> Option<Vec<Point>> {
    if (end.x - start.x).abs() <= DETOUR_MIN_SPAN {
        return None;
    }
    let ea = offset(start, from_side, STANDOFF);
    let eb = offset(end, to_side, STANDOFF);
    let corridor_x = start.x.min(end.x) + DETOUR_FRACTION * (end.x - start.x).abs();
    Some(dedup_points(vec![
        start,
        ea,
        Point::new(corridor_x, ea.y),
        Point::new(corridor_x, eb.y),
        eb,
        end,
    ]))
}

/// Detour through a horizontal corridor at 30% of the y-span.
fn vertical_detour(
    start: Point,
    end: Point,
    from_side: ExitSide,
    to_side: ExitSide,
) -> Option<Vec<Point>> {
    if (end.y - start.y).abs() <= DETOUR_MIN_SPAN {
        return None;
    }
    let ea = offset(start, from_side, STANDOFF);
    let eb = offset(end, to_side, STANDOFF);
    let corridor_y = start.y.min(end.y) + DETOUR_FRACTION * (end.y - start.y).abs();
    Some(dedup_points(vec![
        start,
        ea,
        Point::new(ea.x, corridor_y),
        Point::new(eb.x, corridor_y),
        eb,
        end,
    ]))
}

/// Wide contour above the endpoints: double stand-off, then along the
/// outer margin past their extent.
fn external_path_above(
    start: Point,
    end: Point,
    from_side: ExitSide,
    to_side: ExitSide,
) -> Vec<Point> {
    let ea = offset(start, from_side, 2.0 * STANDOFF);
    let eb = offset(end, to_side, 2.0 * STANDOFF);
    let outer_y = start.y.min(end.y).min(ea.y).min(eb.y) - EXTERNAL_MARGIN;
    external_contour(start, ea, eb, end, outer_y)
}

/// Mirror contour below the endpoints, for when the top corridor is
/// already congested.
fn external_path_below(
    start: Point,
    end: Point,
    from_side: ExitSide,
    to_side: ExitSide,
) -> Vec<Point> {
    let ea = offset(start, from_side, 2.0 * STANDOFF);
    let eb = offset(end, to_side, 2.0 * STANDOFF);
    let outer_y = start.y.max(end.y).max(ea.y).max(eb.y) + EXTERNAL_MARGIN;
    external_contour(start, ea, eb, end, outer_y)
}

fn external_contour(start: Point, ea: Point, eb: Point, end: Point, outer_y: f64) -> Vec<Point> {
    dedup_points(vec![
        start,
        ea,
        Point::new(ea.x, outer_y),
        Point::new(eb.x, outer_y),
        eb,
        end,
    ])
}

fn offset(point: Point, side: ExitSide, distance: f64) -> Point {
    let (dx, dy) = side.direction();
    Point::new(point.x + dx * distance, point.y + dy * distance)
}

fn dedup_points(points: Vec<Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last() != Some(&p) {
            out.push(p);
        }
    }
    out
}

/// Candidate score: polyline length plus a per-point complexity penalty.
fn score(points: &[Point]) -> f64 {
    let length: f64 = points
        .windows(2)
        .map(|w| {
            let dx = w[1].x - w[0].x;
            let dy = w[1].y - w[0].y;
            (dx * dx + dy * dy).sqrt()
        })
        .sum();
    length + BEND_PENALTY * points.len() as f64
}

/// Render a polyline as an SVG path string.
pub fn path_to_svg(points: &[Point]) -> String {
    let mut path = String::new();
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{}{} {} ", command, p.x, p.y);
    }
    path.trim_end().to_string()
}
