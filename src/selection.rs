//! Plot selection state as an immutable value plus an event reducer, instead
//! of mutable shared fields behind the UI.

use crate::dates::{DateRange, Month};

/// The two overlay slots. Left owns the left y-axis, right the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub fn index(&self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Right => 1,
        }
    }
}

/// One user action against the selection.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    LocationChosen { longitude: f64, latitude: f64 },
    WindowChosen { start: Month, end: Month },
    VariablePicked { slot: Slot, label: String },
    VariableCleared { slot: Slot },
    Reset,
}

/// Everything needed to build an overlay plot, accumulated event by event.
///
/// `apply` consumes the old value and returns the new one; there is no
/// in-place mutation and no partial write a failed later step could leave
/// behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub location: Option<(f64, f64)>,
    pub window: Option<DateRange>,
    pub slots: [Option<String>; 2],
}

/// A selection with every field present, ready to hand to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteSelection {
    pub longitude: f64,
    pub latitude: f64,
    pub window: DateRange,
    pub left_label: String,
    pub right_label: String,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(mut self, event: SelectionEvent) -> Selection {
        match event {
            SelectionEvent::LocationChosen {
                longitude,
                latitude,
            } => {
                self.location = Some((longitude, latitude));
            }
            SelectionEvent::WindowChosen { start, end } => {
                self.window = Some(DateRange::new(start, end));
            }
            SelectionEvent::VariablePicked { slot, label } => {
                self.slots[slot.index()] = Some(label);
            }
            SelectionEvent::VariableCleared { slot } => {
                self.slots[slot.index()] = None;
            }
            SelectionEvent::Reset => {
                self = Selection::default();
            }
        }
        self
    }

    /// Structural completeness only. Coordinate ranges, chronology and label
    /// resolution are checked downstream, where the errors carry context.
    pub fn complete(&self) -> Option<CompleteSelection> {
        let (longitude, latitude) = self.location?;
        let window = self.window?;
        let left_label = self.slots[0].clone()?;
        let right_label = self.slots[1].clone()?;
        Some(CompleteSelection {
            longitude,
            latitude,
            window,
            left_label,
            right_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(slot: Slot, label: &str) -> SelectionEvent {
        SelectionEvent::VariablePicked {
            slot,
            label: label.to_string(),
        }
    }

    #[test]
    fn events_accumulate_until_complete() {
        let selection = Selection::new()
            .apply(SelectionEvent::LocationChosen {
                longitude: 11.3,
                latitude: 47.3,
            })
            .apply(SelectionEvent::WindowChosen {
                start: Month::new(1999, 2),
                end: Month::new(2000, 4),
            });
        assert!(selection.complete().is_none());

        let selection = selection
            .apply(pick(Slot::Left, "Temperature at 2m"))
            .apply(pick(Slot::Right, "Snow Depth"));

        let complete = selection.complete().unwrap();
        assert_eq!(complete.longitude, 11.3);
        assert_eq!(complete.latitude, 47.3);
        assert_eq!(complete.window.start, Month::new(1999, 2));
        assert_eq!(complete.left_label, "Temperature at 2m");
        assert_eq!(complete.right_label, "Snow Depth");
    }

    #[test]
    fn repicking_a_slot_replaces_its_label() {
        let selection = Selection::new()
            .apply(pick(Slot::Left, "Lake Cover"))
            .apply(pick(Slot::Left, "Surface Pressure"));
        assert_eq!(selection.slots[0].as_deref(), Some("Surface Pressure"));
        assert_eq!(selection.slots[1], None);
    }

    #[test]
    fn clearing_a_slot_blocks_completion() {
        let selection = Selection::new()
            .apply(SelectionEvent::LocationChosen {
                longitude: 0.0,
                latitude: 0.0,
            })
            .apply(SelectionEvent::WindowChosen {
                start: Month::new(1990, 1),
                end: Month::new(1991, 1),
            })
            .apply(pick(Slot::Left, "Lake Cover"))
            .apply(pick(Slot::Right, "Snow Albedo"));
        assert!(selection.complete().is_some());

        let selection = selection.apply(SelectionEvent::VariableCleared { slot: Slot::Right });
        assert!(selection.complete().is_none());
    }

    #[test]
    fn reset_returns_to_the_empty_state() {
        let selection = Selection::new()
            .apply(pick(Slot::Left, "Lake Cover"))
            .apply(SelectionEvent::Reset);
        assert_eq!(selection, Selection::new());
    }

    #[test]
    fn apply_does_not_touch_unrelated_fields() {
        let base = Selection::new().apply(SelectionEvent::LocationChosen {
            longitude: -33.9,
            latitude: 23.1,
        });
        let after = base.clone().apply(pick(Slot::Right, "Friction Velocity"));
        assert_eq!(after.location, base.location);
        assert_eq!(after.window, None);
        assert_eq!(after.slots[0], None);
    }
}
