//! Recording map surface.

use crate::surface::{IndicatorHandle, IndicatorOptions, MapSurface, MarkerHandle};
use livelocator_domain::{GeoPoint, ResourceRef};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An operation applied to a [`MemoryMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A marker was added.
    MarkerAdded {
        id: u64,
        position: GeoPoint,
        icon: ResourceRef,
        draggable: bool,
    },
    /// A marker was repositioned.
    MarkerMoved { id: u64, position: GeoPoint },
    /// A marker was removed.
    MarkerRemoved { id: u64 },
    /// An indicator was added.
    IndicatorAdded { id: u64, options: IndicatorOptions },
    /// An indicator was recentered.
    IndicatorMoved { id: u64, center: GeoPoint },
    /// An indicator's radius changed.
    IndicatorResized { id: u64, radius: f64 },
    /// An indicator was removed.
    IndicatorRemoved { id: u64 },
    /// The camera moved.
    CameraMoved { target: GeoPoint, zoom: f32 },
}

#[derive(Debug, Default)]
struct Journal {
    events: Vec<MapEvent>,
    next_id: u64,
    live_markers: usize,
    live_indicators: usize,
    stale_writes: usize,
}

type SharedJournal = Arc<Mutex<Journal>>;

fn lock(journal: &Mutex<Journal>) -> MutexGuard<'_, Journal> {
    journal.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Map surface that keeps its overlays in memory and journals every call.
///
/// Writes to removed handles are not journaled; they are counted in
/// [`stale_writes`](Self::stale_writes) instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryMap {
    journal: SharedJournal,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// All journaled events, oldest first.
    pub fn events(&self) -> Vec<MapEvent> {
        lock(&self.journal).events.clone()
    }

    /// Number of journaled events.
    pub fn event_count(&self) -> usize {
        lock(&self.journal).events.len()
    }

    /// Forgets journaled events; live overlays are kept.
    pub fn clear_events(&self) {
        lock(&self.journal).events.clear();
    }

    /// Markers added and not yet removed.
    pub fn live_markers(&self) -> usize {
        lock(&self.journal).live_markers
    }

    /// Indicators added and not yet removed.
    pub fn live_indicators(&self) -> usize {
        lock(&self.journal).live_indicators
    }

    /// Writes that hit an already removed handle.
    pub fn stale_writes(&self) -> usize {
        lock(&self.journal).stale_writes
    }

    /// Radii set on any indicator, in order.
    pub fn radii(&self) -> Vec<f64> {
        lock(&self.journal)
            .events
            .iter()
            .filter_map(|event| match event {
                MapEvent::IndicatorResized { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect()
    }

    /// Number of camera moves.
    pub fn camera_moves(&self) -> usize {
        self.count(|event| matches!(event, MapEvent::CameraMoved { .. }))
    }

    /// Number of journaled events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&MapEvent) -> bool) -> usize {
        lock(&self.journal)
            .events
            .iter()
            .filter(|event| predicate(event))
            .count()
    }

    fn record(&self, event: MapEvent) {
        lock(&self.journal).events.push(event);
    }
}

impl MapSurface for MemoryMap {
    fn add_marker(
        &self,
        position: GeoPoint,
        icon: &ResourceRef,
        draggable: bool,
    ) -> Arc<dyn MarkerHandle> {
        let id = {
            let mut journal = lock(&self.journal);
            journal.next_id += 1;
            journal.live_markers += 1;
            let id = journal.next_id;
            journal.events.push(MapEvent::MarkerAdded {
                id,
                position,
                icon: icon.clone(),
                draggable,
            });
            id
        };

        Arc::new(MemoryMarker {
            id,
            journal: self.journal.clone(),
            state: Mutex::new(OverlayState::new(position)),
        })
    }

    fn add_indicator(&self, options: IndicatorOptions) -> Arc<dyn IndicatorHandle> {
        let id = {
            let mut journal = lock(&self.journal);
            journal.next_id += 1;
            journal.live_indicators += 1;
            let id = journal.next_id;
            journal.events.push(MapEvent::IndicatorAdded {
                id,
                options: options.clone(),
            });
            id
        };

        Arc::new(MemoryIndicator {
            id,
            journal: self.journal.clone(),
            state: Mutex::new(OverlayState::new((options.center, options.radius))),
        })
    }

    fn move_camera(&self, target: GeoPoint, zoom: f32) {
        self.record(MapEvent::CameraMoved { target, zoom });
    }
}

#[derive(Debug)]
struct OverlayState<T> {
    value: T,
    removed: bool,
}

impl<T: Copy> OverlayState<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            removed: false,
        }
    }
}

/// Applies `update` unless the overlay was removed, journaling `event`.
fn write<T>(
    journal: &Mutex<Journal>,
    state: &Mutex<OverlayState<T>>,
    update: impl FnOnce(&mut T),
    event: MapEvent,
) {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let mut journal = lock(journal);
    if state.removed {
        journal.stale_writes += 1;
        return;
    }
    update(&mut state.value);
    journal.events.push(event);
}

struct MemoryMarker {
    id: u64,
    journal: SharedJournal,
    state: Mutex<OverlayState<GeoPoint>>,
}

impl MarkerHandle for MemoryMarker {
    fn position(&self) -> GeoPoint {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
    }

    fn set_position(&self, position: GeoPoint) {
        write(
            &self.journal,
            &self.state,
            |value| *value = position,
            MapEvent::MarkerMoved {
                id: self.id,
                position,
            },
        );
    }

    fn remove(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.removed {
            return;
        }
        state.removed = true;
        let mut journal = lock(&self.journal);
        journal.live_markers -= 1;
        journal.events.push(MapEvent::MarkerRemoved { id: self.id });
    }
}

struct MemoryIndicator {
    id: u64,
    journal: SharedJournal,
    state: Mutex<OverlayState<(GeoPoint, f64)>>,
}

impl IndicatorHandle for MemoryIndicator {
    fn center(&self) -> GeoPoint {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .0
    }

    fn set_center(&self, center: GeoPoint) {
        write(
            &self.journal,
            &self.state,
            |value| value.0 = center,
            MapEvent::IndicatorMoved {
                id: self.id,
                center,
            },
        );
    }

    fn radius(&self) -> f64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .1
    }

    fn set_radius(&self, radius: f64) {
        write(
            &self.journal,
            &self.state,
            |value| value.1 = radius,
            MapEvent::IndicatorResized {
                id: self.id,
                radius,
            },
        );
    }

    fn remove(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.removed {
            return;
        }
        state.removed = true;
        let mut journal = lock(&self.journal);
        journal.live_indicators -= 1;
        journal.events.push(MapEvent::IndicatorRemoved { id: self.id });
    }
}
