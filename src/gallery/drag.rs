//! Rubber-band selection

use super::selection::Selection;
use crate::types::TileId;
use egui::{Pos2, Rect};

/// Where a primary press landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Gallery,
    Button,
    Lightbox,
    FormatSelector,
}

#[derive(Debug, Clone)]
struct DragSession {
    anchor: Pos2,
    band: Rect,
    tiles: Vec<(TileId, Rect)>,
}

/// Tracks one drag session at a time. Tile rectangles are snapshotted when the
/// session starts, so layout changes during the drag are not picked up.
#[derive(Debug, Clone, Default)]
pub struct DragSelect {
    session: Option<DragSession>,
}

/// Inclusive AABB test: touching edges count as intersecting
pub fn intersects(tile: Rect, band: Rect) -> bool {
    !(tile.max.x < band.min.x
        || tile.min.x > band.max.x
        || tile.max.y < band.min.y
        || tile.min.y > band.max.y)
}

impl DragSelect {
    /// Starts a session unless the press landed on a control or the lightbox.
    /// Any previous session ends here, even one whose release was missed.
    pub fn begin(&mut self, anchor: Pos2, target: PressTarget, tiles: Vec<(TileId, Rect)>) -> bool {
        self.session = None;
        if target != PressTarget::Gallery {
            return false;
        }
        self.session = Some(DragSession {
            anchor,
            band: Rect::from_min_max(anchor, anchor),
            tiles,
        });
        true
    }

    /// Grows the band to the pointer and selects every newly intersected tile.
    /// Returns the tiles that were added.
    pub fn update(&mut self, pointer: Pos2, selection: &mut Selection) -> Vec<TileId> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        session.band = Rect::from_two_pos(session.anchor, pointer);

        let mut added = Vec::new();
        for &(id, rect) in &session.tiles {
            if intersects(rect, session.band) && selection.select(id.vehicle, id.image) {
                added.push(id);
            }
        }
        added
    }

    pub fn end(&mut self) {
        self.session = None;
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Visible rubber band, if a session is running
    pub fn band(&self) -> Option<Rect> {
        self.session.as_ref().map(|s| s.band)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    /// Eight 100x100 tiles of vehicle 0 in a single row with 10px gaps
    fn row() -> Vec<(TileId, Rect)> {
        (0..8)
            .map(|i| {
                let x = i as f32 * 110.0;
                (TileId::new(0, i), Rect::from_min_max(pos2(x, 0.0), pos2(x + 100.0, 100.0)))
            })
            .collect()
    }

    /// Same tiles, but 2, 5 and 7 moved into a second row
    fn staggered() -> Vec<(TileId, Rect)> {
        row()
            .into_iter()
            .map(|(id, r)| {
                if [2, 5, 7].contains(&id.image) {
                    (id, r.translate(egui::vec2(0.0, 200.0)))
                } else {
                    (id, r)
                }
            })
            .collect()
    }

    #[test]
    fn band_is_normalized_from_any_direction() {
        let mut drag = DragSelect::default();
        let mut sel = Selection::new(1);
        assert!(drag.begin(pos2(300.0, 300.0), PressTarget::Gallery, Vec::new()));
        assert_eq!(drag.band(), Some(Rect::from_min_max(pos2(300.0, 300.0), pos2(300.0, 300.0))));
        drag.update(pos2(100.0, 50.0), &mut sel);
        assert_eq!(drag.band(), Some(Rect::from_min_max(pos2(100.0, 50.0), pos2(300.0, 300.0))));
    }

    #[test]
    fn drag_selects_exactly_intersected_tiles() {
        let mut drag = DragSelect::default();
        let mut sel = Selection::new(1);
        drag.begin(pos2(0.0, 250.0), PressTarget::Gallery, staggered());
        let added = drag.update(pos2(900.0, 260.0), &mut sel);
        drag.end();

        assert_eq!(sel.indices(0), vec![2, 5, 7]);
        assert_eq!(added.len(), 3);
        assert!(drag.band().is_none());
    }

    #[test]
    fn drag_never_deselects() {
        let mut drag = DragSelect::default();
        let mut sel = Selection::new(1);
        drag.begin(pos2(0.0, 250.0), PressTarget::Gallery, staggered());
        drag.update(pos2(900.0, 260.0), &mut sel);
        // shrinking the band away from 5 and 7 keeps them
        drag.update(pos2(250.0, 260.0), &mut sel);
        drag.end();
        assert_eq!(sel.indices(0), vec![2, 5, 7]);

        drag.begin(pos2(225.0, 250.0), PressTarget::Gallery, staggered());
        let added = drag.update(pos2(230.0, 260.0), &mut sel);
        drag.end();
        assert!(added.is_empty());
        assert_eq!(sel.indices(0), vec![2, 5, 7]);
    }

    #[test]
    fn touching_edges_intersect() {
        let tile = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(intersects(tile, Rect::from_min_max(pos2(100.0, 100.0), pos2(150.0, 150.0))));
        assert!(!intersects(tile, Rect::from_min_max(pos2(100.5, 0.0), pos2(150.0, 50.0))));
    }

    #[test]
    fn presses_on_controls_do_not_start_a_session() {
        let mut drag = DragSelect::default();
        let mut sel = Selection::new(1);
        for target in [PressTarget::Button, PressTarget::Lightbox, PressTarget::FormatSelector] {
            assert!(!drag.begin(pos2(0.0, 0.0), target, row()));
            assert!(drag.update(pos2(900.0, 100.0), &mut sel).is_empty());
        }
        assert_eq!(sel.total(), 0);
    }

    #[test]
    fn press_on_a_control_ends_a_stale_session() {
        let mut drag = DragSelect::default();
        let mut sel = Selection::new(1);
        // release never arrived
        drag.begin(pos2(0.0, 0.0), PressTarget::Gallery, row());
        assert!(!drag.begin(pos2(0.0, 0.0), PressTarget::Button, row()));
        assert!(drag.band().is_none());
        assert!(drag.update(pos2(900.0, 100.0), &mut sel).is_empty());
        assert_eq!(sel.total(), 0);
    }
}
