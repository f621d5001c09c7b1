//! Demo scene: a camera, a spinning square that counts clicks, and a label.

use arbor_app::prelude::*;
use glam::Vec2;
use tracing::info;

/// Radians per second.
const SPIN_SPEED: f32 = 1.5;

#[derive(Debug, Default)]
pub struct Score {
    pub clicks: u32,
}

fn spinner(score: Component<Score>) -> impl FnOnce(&mut World) -> eyre::Result<()> + 'static {
    move |world: &mut World| {
        let rotation = hooks::attach(world, rotation(0.0))?;
        hooks::attach(world, shape(48.0, 48.0))?;

        on_update(world, move |_world, info| {
            if let Some(mut angle) = rotation.write() {
                angle.0 = (angle.0 + SPIN_SPEED * info.delta_secs()) % core::f32::consts::TAU;
            }
            Ok(())
        })?;

        on_draw(world, |_world, draw| {
            draw.surface.fill_rect(Vec2::new(48.0, 48.0), [220, 80, 40, 255]);
            Ok(())
        })?;

        on_pointer_down_inside(world, move |_world, _event, local| {
            if let Some(mut score) = score.write() {
                score.clicks += 1;
                info!(clicks = score.clicks, ?local, "spinner clicked");
            }
            Ok(())
        })?;

        Ok(())
    }
}

fn label(score: Component<Score>) -> impl FnOnce(&mut World) -> eyre::Result<()> + 'static {
    move |world: &mut World| {
        on_draw(world, move |_world, draw| {
            let clicks = score.read().map_or(0, |s| s.clicks);
            draw.surface.fill_text(&format!("clicks: {clicks}"), [255; 4]);
            Ok(())
        })?;
        Ok(())
    }
}

/// Root component of the demo.
pub fn demo(world: &mut World) -> eyre::Result<()> {
    let score = hooks::create_child(world, Some("score"), |_world: &mut World| Ok(Score::default()))?;

    let cam = hooks::create_child(world, Some("camera"), position(0.0, 0.0))?;
    world.add_component(cam.entity(), camera(false))?;

    // pointer input arrives in surface pixels, so keep the camera at the origin
    let spin = hooks::create_child(world, Some("spinner"), position(320.0, 180.0))?;
    world.add_component(spin.entity(), spinner(score.clone()))?;

    let text = hooks::create_child(world, Some("label"), position(280.0, 120.0))?;
    world.add_component(text.entity(), label(score))?;

    hooks::on_enabled(world, |world| {
        info!(entities = world.entity_count(), "demo scene enabled");
        Ok(())
    })?;
    Ok(())
}
