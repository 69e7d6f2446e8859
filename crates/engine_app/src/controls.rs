//! Keyboard listeners for the demo scene.

use engine_math::IVec2;
use engine_runtime::{EngineContext, InputEvent};

use crate::scene::DemoScene;

/// `w`/`a`/`s`/`d` move one grid unit; `w` is up.
pub fn movement(event: &InputEvent, scene: &mut DemoScene, _ctx: &mut EngineContext) {
    let offset = match event {
        InputEvent::Key { code: 'w', .. } => IVec2::NEG_Y,
        InputEvent::Key { code: 's', .. } => IVec2::Y,
        InputEvent::Key { code: 'a', .. } => IVec2::NEG_X,
        InputEvent::Key { code: 'd', .. } => IVec2::X,
        _ => return,
    };
    scene.move_by(offset);
}

/// `[` zooms in by `step`, `]` zooms out.
pub fn zoom(step: f32) -> impl FnMut(&InputEvent, &mut DemoScene, &mut EngineContext) {
    move |event, _scene, ctx| match event {
        InputEvent::Key { code: '[', .. } => {
            ctx.adjust_zoom(step);
        }
        InputEvent::Key { code: ']', .. } => {
            ctx.adjust_zoom(-step);
        }
        _ => {}
    }
}

/// `x` plays the configured sound.
pub fn sound(event: &InputEvent, scene: &mut DemoScene, _ctx: &mut EngineContext) {
    if let InputEvent::Key { code: 'x', .. } = event {
        scene.play_sound();
    }
}
