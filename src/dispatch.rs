use egui::Pos2;
use std::collections::VecDeque;

/// Primary pointer button input in window coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press(Pos2),
    /// Pointer moved. Only delivered while the button is held.
    Motion(Pos2),
    Release(Pos2),
}

impl PointerEvent {
    pub fn pos(&self) -> Pos2 {
        match *self {
            Self::Press(pos) | Self::Motion(pos) | Self::Release(pos) => pos,
        }
    }
}

/// Something that can receive routed pointer events from an [`EventDispatcher`].
pub trait PointerListener {
    /// Whether a press at `pos` lands on this listener.
    fn accepts(&self, pos: Pos2) -> bool;

    fn pointer_event(&mut self, event: PointerEvent);
}

/// Queues raw pointer input and routes it to listeners.
///
/// A press grabs the pointer for the topmost listener under it. Until the matching release, every
/// motion and the release itself go to that listener only, wherever the pointer is.
#[derive(Debug, Default)]
pub struct EventDispatcher {
    pending: VecDeque<PointerEvent>,
    button_down: bool,
    grab: Option<usize>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, event: PointerEvent) {
        self.pending.push_back(event);
    }

    pub fn press(&mut self, pos: Pos2) {
        self.post(PointerEvent::Press(pos));
    }

    pub fn motion(&mut self, pos: Pos2) {
        self.post(PointerEvent::Motion(pos));
    }

    pub fn release(&mut self, pos: Pos2) {
        self.post(PointerEvent::Release(pos));
    }

    pub fn is_grabbed(&self) -> bool {
        self.grab.is_some()
    }

    /// Drains the queue into `listeners`, later entries being stacked on top of earlier ones.
    /// Returns how many events were delivered.
    ///
    /// The listener slice must stay the same between a press and its release, since the grab is
    /// tracked by position in the slice.
    pub fn dispatch(&mut self, listeners: &mut [&mut dyn PointerListener]) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.pending.pop_front() {
            let target = match event {
                PointerEvent::Press(pos) => {
                    if self.button_down {
                        continue;
                    }
                    self.button_down = true;
                    self.grab = listeners.iter().rposition(|l| l.accepts(pos));
                    self.grab
                }
                PointerEvent::Motion(_) if self.button_down => self.grab,
                PointerEvent::Motion(_) => None,
                PointerEvent::Release(_) => {
                    self.button_down = false;
                    self.grab.take()
                }
            };

            if let Some(listener) = target.and_then(|idx| listeners.get_mut(idx)) {
                listener.pointer_event(event);
                delivered += 1;
            }
        }
        delivered
    }
}
