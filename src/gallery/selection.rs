//! Per-vehicle image selection

use std::collections::BTreeSet;

/// Display state of a vehicle's "Download Selected" button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedButton {
    pub label: String,
    pub enabled: bool,
    /// Accent style when something is selected, neutral otherwise
    pub emphasized: bool,
}

/// One set of selected image indices per vehicle.
///
/// Sets are created for every vehicle up front and only ever emptied, so a
/// vehicle index valid for the catalog is always valid here.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    sets: Vec<BTreeSet<usize>>,
}

impl Selection {
    pub fn new(vehicle_count: usize) -> Self {
        Self { sets: vec![BTreeSet::new(); vehicle_count] }
    }

    pub fn toggle(&mut self, vehicle: usize, image: usize) {
        if let Some(set) = self.sets.get_mut(vehicle) {
            if !set.remove(&image) {
                set.insert(image);
            }
        }
    }

    /// Returns true if the image was not selected before
    pub fn select(&mut self, vehicle: usize, image: usize) -> bool {
        self.sets.get_mut(vehicle).is_some_and(|set| set.insert(image))
    }

    pub fn is_selected(&self, vehicle: usize, image: usize) -> bool {
        self.sets.get(vehicle).is_some_and(|set| set.contains(&image))
    }

    pub fn count(&self, vehicle: usize) -> usize {
        self.sets.get(vehicle).map_or(0, BTreeSet::len)
    }

    pub fn total(&self) -> usize {
        self.sets.iter().map(BTreeSet::len).sum()
    }

    /// Selection mode: anything selected in any vehicle. Recomputed on every call.
    pub fn is_active(&self) -> bool {
        self.sets.iter().any(|set| !set.is_empty())
    }

    /// Selected image indices of a vehicle, ascending
    pub fn indices(&self, vehicle: usize) -> Vec<usize> {
        self.sets
            .get(vehicle)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn clear_all(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }

    pub fn button(&self, vehicle: usize) -> SelectedButton {
        let count = self.count(vehicle);
        SelectedButton {
            label: format!("Download Selected ({})", count),
            enabled: count > 0,
            emphasized: count > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_set_and_button() {
        let mut sel = Selection::new(2);
        sel.toggle(1, 4);
        let before = (sel.indices(1), sel.button(1));

        sel.toggle(1, 3);
        assert!(sel.is_selected(1, 3));
        assert_eq!(sel.button(1).label, "Download Selected (2)");
        sel.toggle(1, 3);

        assert_eq!((sel.indices(1), sel.button(1)), before);
    }

    #[test]
    fn button_follows_count() {
        let mut sel = Selection::new(1);
        assert_eq!(
            sel.button(0),
            SelectedButton { label: "Download Selected (0)".into(), enabled: false, emphasized: false }
        );
        sel.toggle(0, 0);
        assert_eq!(
            sel.button(0),
            SelectedButton { label: "Download Selected (1)".into(), enabled: true, emphasized: true }
        );
        sel.toggle(0, 0);
        assert!(!sel.button(0).enabled);
        assert!(!sel.button(0).emphasized);
    }

    #[test]
    fn mode_spans_all_vehicles() {
        let mut sel = Selection::new(3);
        assert!(!sel.is_active());
        sel.toggle(2, 0);
        assert!(sel.is_active());
        assert_eq!(sel.total(), 1);
        assert_eq!(sel.count(0), 0);
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut sel = Selection::new(2);
        sel.toggle(0, 1);
        sel.toggle(1, 2);
        sel.clear_all();
        let once: Vec<_> = (0..2).map(|v| (sel.indices(v), sel.button(v))).collect();
        sel.clear_all();
        let twice: Vec<_> = (0..2).map(|v| (sel.indices(v), sel.button(v))).collect();
        assert_eq!(once, twice);
        assert_eq!(sel.total(), 0);
    }

    #[test]
    fn indices_are_ascending() {
        let mut sel = Selection::new(1);
        for i in [7, 2, 5] {
            sel.toggle(0, i);
        }
        assert_eq!(sel.indices(0), vec![2, 5, 7]);
    }

    #[test]
    fn out_of_range_vehicle_is_ignored() {
        let mut sel = Selection::new(1);
        sel.toggle(5, 0);
        assert!(!sel.select(5, 0));
        assert_eq!(sel.total(), 0);
    }
}
