//! Debounced manual-trigger button with short and long press detection.
//!
//! The physical (or logical) trigger feeds raw press timestamps into
//! [`TriggerButton::press`]; the dispatch loop calls [`TriggerButton::tick`]
//! at its own cadence to run the debounce + gesture state machine.
//! Re-trigger storms are absorbed twice over: the debounce window here, and
//! the analysis cooldown enforced by the service.
//!
//! | Gesture     | Condition            | Meaning                    |
//! |-------------|----------------------|----------------------------|
//! | Short press | Release under 2 s    | run one analysis cycle     |
//! | Long press  | Hold at least 2 s    | report readiness/status    |

const DEBOUNCE_MS: u64 = 50;
const LONG_PRESS_MS: u64 = 2000;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

/// Internal state machine for gesture detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GestureState {
    Idle,
    DebounceWait { since_ms: u64 },
    Pressed { since_ms: u64 },
}

/// Debounced trigger input. Owns no hardware; press edges are injected by
/// whatever the binary wires up (GPIO callback, keypress, test).
pub struct TriggerButton {
    state: GestureState,
    /// Timestamp of the most recent injected press edge.
    pending_press_ms: Option<u64>,
    /// Whether the input is currently held down.
    held: bool,
}

impl TriggerButton {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            pending_press_ms: None,
            held: false,
        }
    }

    /// Record a press edge at `now_ms` (monotonic milliseconds).
    pub fn press(&mut self, now_ms: u64) {
        self.pending_press_ms = Some(now_ms);
        self.held = true;
    }

    /// Record the release edge.
    pub fn release(&mut self) {
        self.held = false;
    }

    /// Run the debounce/gesture state machine. Call at dispatch-loop rate.
    /// Returns a classified gesture event, if any.
    pub fn tick(&mut self, now_ms: u64) -> Option<ButtonEvent> {
        match self.state {
            GestureState::Idle => {
                if let Some(press_ms) = self.pending_press_ms.take() {
                    self.state = GestureState::DebounceWait { since_ms: press_ms };
                }
                None
            }

            GestureState::DebounceWait { since_ms } => {
                if now_ms.saturating_sub(since_ms) >= DEBOUNCE_MS {
                    if self.held {
                        self.state = GestureState::Pressed { since_ms };
                    } else {
                        // Released within the debounce window: contact
                        // bounce, not a press.
                        self.state = GestureState::Idle;
                    }
                }
                None
            }

            GestureState::Pressed { since_ms } => {
                let held_ms = now_ms.saturating_sub(since_ms);

                if held_ms >= LONG_PRESS_MS {
                    self.state = GestureState::Idle;
                    self.held = false;
                    return Some(ButtonEvent::LongPress);
                }

                if !self.held {
                    self.state = GestureState::Idle;
                    return Some(ButtonEvent::ShortPress);
                }

                None
            }
        }
    }
}

impl Default for TriggerButton {
    fn default() -> Self {
        Self::new()
    }
}
