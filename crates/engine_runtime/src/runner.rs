//! The engine runner: waits for input until the next tick is due, dispatches
//! events, then advances the tick counter, updates and redraws the scene.

use std::collections::VecDeque;
use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use engine_render::{GlyphBackend, GlyphMetrics, RenderError};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::events::{ESCAPE, EventBus, EventListener, InputEvent};
use crate::tick::{TickClock, TickConfig};

/// Game-side state driven by the runner.
pub trait Scene {
    /// Called once per tick after the counter has advanced.
    fn update(&mut self, _ctx: &EngineContext) {}

    /// Emit this tick's glyphs. The runner brackets the call with
    /// `begin_frame` / `end_frame`.
    ///
    /// # Errors
    ///
    /// Any render failure aborts the run.
    fn draw(&mut self, ctx: &EngineContext, backend: &mut dyn GlyphBackend)
    -> Result<(), RenderError>;
}

/// Where input events come from.
pub trait EventSource {
    /// Wait up to `timeout` for the next event.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying input device fails.
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>>;
}

/// Keyboard and resize events from the terminal.
///
/// Resizes are reported in pixels: columns and rows times the glyph metrics.
#[derive(Debug, Default)]
pub struct TerminalEvents {
    metrics: GlyphMetrics,
}

impl TerminalEvents {
    #[must_use]
    pub fn new(metrics: GlyphMetrics) -> Self {
        Self { metrics }
    }

    /// Map a crossterm event onto an [`InputEvent`]. `Ctrl+C` maps to the
    /// escape key, since raw mode swallows the signal.
    #[must_use]
    pub fn translate(&self, event: &Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                KeyCode::Esc => Some(InputEvent::key(ESCAPE)),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(InputEvent::key(ESCAPE))
                }
                KeyCode::Char(code) => Some(InputEvent::key(code)),
                _ => None,
            },
            Event::Resize(cols, rows) => Some(InputEvent::Resize {
                width: (f32::from(*cols) * self.metrics.width) as u32,
                height: (f32::from(*rows) * self.metrics.height) as u32,
            }),
            _ => None,
        }
    }
}

impl EventSource for TerminalEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        if event::poll(timeout)? {
            Ok(self.translate(&event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// A fixed, pre-recorded event sequence. Once drained it behaves like an
/// idle device and sleeps for the requested timeout.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<InputEvent>,
}

impl ScriptedEvents {
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<InputEvent>> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }
}

/// Drives a [`Scene`] at a fixed tick rate against a backend and an event
/// source.
pub struct EngineRunner<S, B, E> {
    ctx: EngineContext,
    config: TickConfig,
    scene: S,
    backend: B,
    events: E,
    bus: EventBus<S>,
}

impl<S, B, E> std::fmt::Debug for EngineRunner<S, B, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRunner")
            .field("ctx", &self.ctx)
            .field("config", &self.config)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<S, B, E> EngineRunner<S, B, E>
where
    S: Scene,
    B: GlyphBackend,
    E: EventSource,
{
    #[must_use]
    pub fn new(config: &EngineConfig, scene: S, backend: B, events: E) -> Self {
        Self {
            ctx: EngineContext::from_config(config),
            config: config.tick_config(),
            scene,
            backend,
            events,
            bus: EventBus::new(),
        }
    }

    /// Register an input listener.
    pub fn subscribe(&mut self, listener: impl EventListener<S> + 'static) {
        self.bus.subscribe(listener);
    }

    /// Register a closure input listener.
    pub fn on_event<F>(&mut self, listener: F)
    where
        F: FnMut(&InputEvent, &mut S, &mut EngineContext) + 'static,
    {
        self.bus.on_event(listener);
    }

    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.ctx
    }

    #[must_use]
    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Give the scene, backend and event source back.
    pub fn into_parts(self) -> (S, B, E) {
        (self.scene, self.backend, self.events)
    }

    /// Route one event through the bus. Resizes also reach the backend.
    pub fn dispatch(&mut self, event: &InputEvent) {
        debug!(tick = self.ctx.tick(), ?event, "dispatching event");
        if let InputEvent::Resize { width, height } = *event {
            if width == 0 || height == 0 {
                warn!(width, height, "ignoring zero-sized resize");
                return;
            }
            self.backend.resize(width, height);
        }
        self.bus.dispatch(event, &mut self.scene, &mut self.ctx);
    }

    /// Run one tick: advance the counter, update, and redraw.
    ///
    /// # Errors
    ///
    /// Propagates backend and scene draw failures.
    pub fn step(&mut self) -> Result<(), RenderError> {
        let tick = self.ctx.advance_tick();
        self.scene.update(&self.ctx);
        self.backend.begin_frame()?;
        self.scene.draw(&self.ctx, &mut self.backend)?;
        self.backend.end_frame()?;
        debug!(tick, "tick complete");
        Ok(())
    }

    /// Run until exit is requested or the tick limit is reached. Returns the
    /// number of ticks run.
    ///
    /// # Errors
    ///
    /// Returns the first render or input failure.
    pub fn run(&mut self) -> Result<u64, RenderError> {
        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        let mut clock = TickClock::new(self.config.interval(), Instant::now());
        let mut ticks = 0u64;

        while !self.ctx.exit_requested() {
            let now = Instant::now();
            if clock.is_due(now) {
                clock.mark(self.ctx.tick().saturating_add(1), now);
                self.step()?;
                ticks += 1;
                if self.config.is_done(ticks) {
                    break;
                }
                continue;
            }

            if let Some(event) = self.events.poll(clock.time_until_due(now))? {
                self.dispatch(&event);
            }
        }

        info!(ticks, exit_requested = self.ctx.exit_requested(), "tick loop complete");
        Ok(ticks)
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEvent, KeyEventState};
    use engine_component::{Entity, EntityAllocator};
    use engine_math::{IVec2, Transform2D};
    use engine_render::{RecordingBackend, SpriteBundle, SpriteRenderComponent, draw_static};
    use engine_sprite::{Rgb, SpriteAsset};

    use super::*;

    /// Records the order of updates and draws.
    #[derive(Default)]
    struct LogScene {
        log: Vec<String>,
    }

    impl Scene for LogScene {
        fn update(&mut self, ctx: &EngineContext) {
            self.log.push(format!("update {}", ctx.tick()));
        }

        fn draw(
            &mut self,
            ctx: &EngineContext,
            _backend: &mut dyn GlyphBackend,
        ) -> Result<(), RenderError> {
            self.log.push(format!("draw {}", ctx.tick()));
            Ok(())
        }
    }

    fn fast_config(max_ticks: u64) -> EngineConfig {
        EngineConfig::default().with_tick_rate(50.0).with_max_ticks(max_ticks)
    }

    fn runner(
        max_ticks: u64,
        events: impl IntoIterator<Item = InputEvent>,
    ) -> EngineRunner<LogScene, RecordingBackend, ScriptedEvents> {
        EngineRunner::new(
            &fast_config(max_ticks),
            LogScene::default(),
            RecordingBackend::new(),
            ScriptedEvents::new(events),
        )
    }

    #[test]
    fn test_max_ticks_bounds_the_run() {
        let mut runner = runner(3, []);
        assert_eq!(runner.run().unwrap(), 3);
        assert_eq!(runner.context().tick(), 3);
        assert_eq!(runner.backend().frames().len(), 3);
        assert_eq!(
            runner.scene().log,
            ["update 1", "draw 1", "update 2", "draw 2", "update 3", "draw 3"]
        );
    }

    #[test]
    fn test_events_dispatch_before_next_redraw() {
        let mut runner = runner(2, [InputEvent::key('w')]);
        runner.on_event(|event, scene: &mut LogScene, ctx| {
            scene.log.push(format!("{event:?} at {}", ctx.tick()));
        });
        runner.run().unwrap();

        assert_eq!(
            runner.scene().log,
            [
                "update 1",
                "draw 1",
                "Key { code: 'w', x: 0, y: 0 } at 1",
                "update 2",
                "draw 2",
            ]
        );
    }

    #[test]
    fn test_escape_stops_before_further_ticks() {
        let mut runner = runner(0, [InputEvent::key(ESCAPE), InputEvent::key('w')]);
        runner.on_event(|_, scene: &mut LogScene, _| scene.log.push("listener".to_string()));

        assert_eq!(runner.run().unwrap(), 1);
        assert!(runner.context().exit_requested());
        assert_eq!(runner.backend().frames().len(), 1);
        assert_eq!(runner.scene().log, ["update 1", "draw 1"]);

        let (_, _, events) = runner.into_parts();
        assert_eq!(events.remaining(), 1);
    }

    #[test]
    fn test_resize_reaches_context() {
        let mut runner = runner(2, [InputEvent::Resize { width: 120, height: 40 }]);
        runner.run().unwrap();
        assert_eq!(runner.context().viewport(), engine_render::Viewport::new(120.0, 40.0));
    }

    #[test]
    fn test_zero_sized_resize_is_ignored() {
        let mut runner = runner(2, [InputEvent::Resize { width: 720, height: 0 }]);
        let before = runner.context().viewport();
        runner.run().unwrap();
        assert_eq!(runner.context().viewport(), before);
        assert!(runner.context().viewport().aspect().is_finite());
    }

    #[test]
    fn test_exit_requested_before_run_draws_nothing() {
        let mut runner = runner(5, []);
        runner.context_mut().request_exit();
        assert_eq!(runner.run().unwrap(), 0);
        assert!(runner.backend().frames().is_empty());
    }

    /// A scene holding one sprite entity that listeners move around.
    struct SpriteScene {
        entity: Entity,
    }

    impl Scene for SpriteScene {
        fn draw(
            &mut self,
            ctx: &EngineContext,
            backend: &mut dyn GlyphBackend,
        ) -> Result<(), RenderError> {
            draw_static(&self.entity, ctx.viewport(), ctx.zoom(), backend)?;
            Ok(())
        }
    }

    #[test]
    fn test_listener_moves_entity_between_frames() {
        let mut alloc = EntityAllocator::new();
        let mut entity = Entity::spawn::<SpriteBundle>(&mut alloc);
        entity
            .get_mut::<SpriteRenderComponent>()
            .unwrap()
            .set_sprite(SpriteAsset::blank(1, 1, Rgb::WHITE));

        let mut runner = EngineRunner::new(
            &fast_config(2),
            SpriteScene { entity },
            RecordingBackend::new(),
            ScriptedEvents::new([InputEvent::key('d')]),
        );
        runner.on_event(|event, scene: &mut SpriteScene, _| {
            if let InputEvent::Key { code: 'd', .. } = event {
                if let Some(transform) = scene.entity.get_mut::<Transform2D>() {
                    transform.translate(IVec2::X);
                }
            }
        });
        runner.run().unwrap();

        let frames = runner.backend().frames();
        assert_eq!(frames.len(), 2);
        let dx = frames[1][0].position.x - frames[0][0].position.x;
        assert!((dx - 0.03).abs() < 1e-5);
    }

    #[test]
    fn test_translate_terminal_events() {
        let events = TerminalEvents::new(GlyphMetrics::BITMAP_9_BY_15);
        let key = |code, modifiers| {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            })
        };

        assert_eq!(
            events.translate(&key(KeyCode::Char('w'), KeyModifiers::NONE)),
            Some(InputEvent::key('w'))
        );
        assert_eq!(
            events.translate(&key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(InputEvent::key(ESCAPE))
        );
        assert_eq!(
            events.translate(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputEvent::key(ESCAPE))
        );
        assert_eq!(events.translate(&key(KeyCode::Up, KeyModifiers::NONE)), None);
        assert_eq!(
            events.translate(&Event::Resize(80, 24)),
            Some(InputEvent::Resize { width: 720, height: 360 })
        );
    }
}
