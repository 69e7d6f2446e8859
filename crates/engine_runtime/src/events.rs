//! Typed input events and the listener bus.
//!
//! The bus handles the two engine-level events itself before any listener
//! sees them: the escape key requests exit (and is not forwarded), and a
//! resize updates the context's viewport.

use crate::context::EngineContext;

/// Key code reserved for exiting the engine (ASCII 27).
pub const ESCAPE: char = '\u{1b}';

/// An input event delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press, with the pointer position at the time (0 when the
    /// source has no pointer).
    Key { code: char, x: i32, y: i32 },
    /// The drawable area changed size.
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    #[must_use]
    pub const fn key(code: char) -> Self {
        Self::Key { code, x: 0, y: 0 }
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        matches!(self, Self::Key { code: ESCAPE, .. })
    }
}

/// Reacts to input events, mutating the scene `S` and the engine context.
pub trait EventListener<S> {
    fn on_event(&mut self, event: &InputEvent, scene: &mut S, ctx: &mut EngineContext);
}

impl<S, F> EventListener<S> for F
where
    F: FnMut(&InputEvent, &mut S, &mut EngineContext),
{
    fn on_event(&mut self, event: &InputEvent, scene: &mut S, ctx: &mut EngineContext) {
        self(event, scene, ctx);
    }
}

/// Ordered set of listeners for one scene type.
pub struct EventBus<S> {
    listeners: Vec<Box<dyn EventListener<S>>>,
}

impl<S> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }
}

impl<S> std::fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<S> EventBus<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners run in registration order.
    pub fn subscribe(&mut self, listener: impl EventListener<S> + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a closure listener.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: FnMut(&InputEvent, &mut S, &mut EngineContext) + 'static,
    {
        self.subscribe(listener);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener. Escape and zero-sized resizes are
    /// consumed here.
    pub fn dispatch(&mut self, event: &InputEvent, scene: &mut S, ctx: &mut EngineContext) {
        match *event {
            InputEvent::Key { code: ESCAPE, .. } => {
                ctx.request_exit();
                return;
            }
            InputEvent::Resize { width, height } => {
                if !ctx.resize(width, height) {
                    return;
                }
            }
            InputEvent::Key { .. } => {}
        }
        for listener in &mut self.listeners {
            listener.on_event(event, scene, ctx);
        }
    }
}
