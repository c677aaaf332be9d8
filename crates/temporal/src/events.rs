use foundation::ids::TileId;
use foundation::time::Time;

/// Notifications the provider reacts to.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TemporalEvent {
    /// A tile's geometry and temporal batch table are ready.
    TileLoaded(TileId),
    /// The viewer moved to another simulation time.
    TimeChanged(Time),
}

/// FIFO of pending events, filled by the loader or UI and drained by the
/// provider.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<TemporalEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: TemporalEvent) {
        self.events.push(event);
    }

    pub fn tile_loaded(&mut self, tile: TileId) {
        self.emit(TemporalEvent::TileLoaded(tile));
    }

    pub fn time_changed(&mut self, time: Time) {
        self.emit(TemporalEvent::TimeChanged(time));
    }

    pub fn events(&self) -> &[TemporalEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<TemporalEvent> {
        std::mem::take(&mut self.events)
    }
}
