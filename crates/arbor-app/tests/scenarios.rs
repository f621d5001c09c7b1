//! End-to-end scenarios through the runtime.

use arbor_app::prelude::*;
use arbor_app::{DrawCommand, FrameReport, PassStats};
use glam::{UVec2, Vec2};
use pretty_assertions::assert_eq;

const SIZE: UVec2 = UVec2::new(320, 240);

struct Harness {
    clock: ManualClock,
    surface: RecordingSurface,
    runtime: Runtime,
}

fn harness() -> Harness {
    let clock = ManualClock::starting_at(1000.0);
    let surface = RecordingSurface::new(SIZE);
    let runtime = Runtime::new(clock.clone(), surface.clone(), RuntimeConfig::default());
    Harness {
        clock,
        surface,
        runtime,
    }
}

/// Construction function drawing `label` as text.
fn labelled(label: &'static str) -> impl FnOnce(&mut World) -> eyre::Result<()> + 'static {
    move |world: &mut World| {
        on_draw(world, move |_world, draw| {
            draw.surface.fill_text(label, [255; 4]);
            Ok(())
        })?;
        Ok(())
    }
}

#[test]
fn test_draw_order_cameras_first_then_creation() {
    let mut h = harness();
    h.runtime
        .mount(Some("R"), |world: &mut World| {
            on_draw(world, |_world, draw| {
                draw.surface.fill_text("R", [255; 4]);
                Ok(())
            })?;
            hooks::create_child(world, Some("A"), labelled("A"))?;
            let b = hooks::create_child(world, Some("B"), |world: &mut World| {
                on_draw(world, |_world, draw| {
                    draw.surface.fill_text("camera", [255; 4]);
                    Ok(())
                })?;
                hooks::mark_camera(world)?;
                Ok(())
            })?;
            world.add_component(b.entity(), labelled("B"))?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();

    assert_eq!(h.surface.texts(), vec!["camera", "R", "A", "B"]);
    assert_eq!(h.surface.commands().first(), Some(&DrawCommand::Clear));
}

#[test]
fn test_registration_during_draw_waits_for_next_frame() {
    let mut h = harness();
    let armed = Shared::new(true);

    h.runtime
        .mount(Some("R"), move |world: &mut World| {
            let armed = armed.clone();
            on_draw(world, move |world, draw| {
                draw.surface.fill_text("R", [255; 4]);
                if armed.get() {
                    *armed.write() = false;
                    on_draw(world, |_world, draw| {
                        draw.surface.fill_text("late", [255; 4]);
                        Ok(())
                    })?;
                    hooks::create_child(world, Some("spawned"), labelled("spawned"))?;
                }
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();
    assert_eq!(h.surface.texts(), vec!["R"]);

    h.runtime.advance(&h.clock, 16.0).unwrap();
    assert_eq!(h.surface.texts(), vec!["R", "late", "spawned"]);
}

#[test]
fn test_first_frame_has_no_delta_and_pause_skips_interval() {
    let mut h = harness();
    let deltas = Shared::new(Vec::new());
    let sink = deltas.clone();

    h.runtime
        .mount(None, move |world: &mut World| {
            on_frame(world, move |_world, info| {
                sink.write().push(info.delta);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();
    h.runtime.advance(&h.clock, 17.0).unwrap();
    h.runtime.pause().unwrap();
    assert_eq!(h.runtime.advance(&h.clock, 10_000.0).unwrap(), None);
    h.runtime.resume().unwrap();
    h.runtime.advance(&h.clock, 16.0).unwrap();
    h.runtime.advance(&h.clock, 18.0).unwrap();

    assert_eq!(*deltas.read(), vec![None, Some(17.0), None, Some(18.0)]);
}

#[test]
fn test_update_sees_clamped_delta() {
    let mut h = harness();
    let seen = Shared::new(Vec::new());
    let sink = seen.clone();

    h.runtime
        .mount(None, move |world: &mut World| {
            on_update(world, move |_world, info| {
                sink.write().push((info.delta_ms, info.raw_delta_ms));
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();
    h.runtime.advance(&h.clock, 20.0).unwrap();
    h.runtime.advance(&h.clock, 5000.0).unwrap();

    let max = h.runtime.config().max_frame_delta_ms;
    assert_eq!(*seen.read(), vec![(20.0, 20.0), (max, 5000.0)]);
}

#[test]
fn test_child_world_position_tracks_parent() {
    let mut h = harness();
    let parent = h.runtime.mount(None, |_world: &mut World| Ok(())).unwrap();
    let world = h.runtime.world_mut();

    let holder = world
        .create_child(parent.entity(), Some("parent"), position(10.0, 10.0))
        .unwrap();
    let child = world
        .create_child(holder.entity(), Some("child"), position(5.0, 5.0))
        .unwrap();

    assert_eq!(arbor_spatial::world_position(world, child.entity()), Vec2::new(15.0, 15.0));

    holder.write().unwrap().0 = Vec2::new(20.0, 20.0);
    assert_eq!(arbor_spatial::world_position(world, child.entity()), Vec2::new(25.0, 25.0));
}

#[test]
fn test_input_moves_replay_before_downs() {
    let mut h = harness();
    let log = Shared::new(Vec::new());
    let l = log.clone();

    h.runtime
        .mount(None, move |world: &mut World| {
            let down = l.clone();
            on_pointer_down(world, move |_world, event| {
                down.write().push(format!("down {}", event.position));
                Ok(())
            })?;
            let moved = l.clone();
            on_pointer_move(world, move |_world, event| {
                moved.write().push(format!("move {}", event.position));
                Ok(())
            })?;
            let frames = l.clone();
            on_update(world, move |_world, _info| {
                frames.write().push("update".to_owned());
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();
    h.runtime
        .push_input(RawInput::PointerDown { x: 1.0, y: 2.0, button: 0 })
        .unwrap();
    h.runtime.push_input(RawInput::PointerMove { x: 3.0, y: 4.0 }).unwrap();
    h.runtime.advance(&h.clock, 16.0).unwrap();

    assert_eq!(*log.read(), vec!["move [3, 4]", "down [1, 2]", "update"]);
    assert_eq!(h.runtime.last_report().unwrap().input_events, 2);
}

#[test]
fn test_failing_callbacks_are_isolated() {
    let mut h = harness();
    h.runtime
        .mount(None, |world: &mut World| {
            on_update(world, |_world, _info| Err(eyre::eyre!("update broke")))?;
            on_draw(world, |_world, _draw| Err(eyre::eyre!("draw broke")))?;
            hooks::create_child(world, Some("ok"), labelled("still drawn"))?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();
    h.runtime.advance(&h.clock, 16.0).unwrap();

    let report = h.runtime.last_report().unwrap();
    assert_eq!(
        report,
        FrameReport {
            tick: 2,
            input_events: 0,
            update: Some(PassStats { invoked: 1, failed: 1 }),
            draw: PassStats { invoked: 2, failed: 1 },
        }
    );
    assert_eq!(h.surface.texts(), vec!["still drawn"]);
}

#[test]
fn test_camera_sets_view_for_later_items() {
    let mut h = harness();
    h.runtime
        .mount(None, |world: &mut World| {
            let cam = hooks::create_child(world, Some("camera"), position(100.0, 50.0))?;
            world.add_component(cam.entity(), camera(false))?;
            let sprite = hooks::create_child(world, Some("sprite"), position(110.0, 60.0))?;
            world.add_component(sprite.entity(), shape(4.0, 4.0))?;
            world.add_component(sprite.entity(), |world: &mut World| {
                on_draw(world, |_world, draw| {
                    draw.surface.fill_rect(Vec2::new(4.0, 4.0), [0, 0, 0, 255]);
                    Ok(())
                })?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.advance(&h.clock, 16.0).unwrap();

    let rect = h
        .surface
        .commands()
        .into_iter()
        .find_map(|command| match command {
            DrawCommand::Rect { transform, .. } => Some(transform.translation),
            _ => None,
        });
    // sprite at (110, 60) minus half extent, seen from a camera at (100, 50)
    assert_eq!(rect, Some(Vec2::new(8.0, 8.0)));
}

#[test]
fn test_step_runs_while_paused() {
    let mut h = harness();
    let ticks = Shared::new(0_u32);
    let sink = ticks.clone();

    h.runtime
        .mount(None, move |world: &mut World| {
            on_update(world, move |_world, _info| {
                *sink.write() += 1;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.pause().unwrap();
    let info = h.runtime.step().unwrap();

    assert!(info.stepped);
    assert_eq!(ticks.get(), 1);
    assert_eq!(h.runtime.scheduler_state().unwrap(), arbor_tick::SchedulerState::Paused);
    assert_eq!(h.clock.pending(), None);
}

#[test]
fn test_unmount_destroys_leaf_first() {
    let mut h = harness();
    let log = Shared::new(Vec::new());

    fn tracked(log: Shared<Vec<&'static str>>, label: &'static str) -> impl FnOnce(&mut World) -> eyre::Result<()> + 'static {
        move |world: &mut World| {
            hooks::on_destroy(world, move |_world| {
                log.write().push(label);
                Ok(())
            })?;
            Ok(())
        }
    }

    let l = log.clone();
    h.runtime
        .mount(None, move |world: &mut World| {
            let a = hooks::create_child(world, Some("a"), tracked(l.clone(), "a"))?;
            world.create_child(a.entity(), Some("a1"), tracked(l.clone(), "a1"))?;
            hooks::create_child(world, Some("b"), tracked(l.clone(), "b"))?;
            hooks::on_destroy(world, {
                let l = l.clone();
                move |_world| {
                    l.write().push("root");
                    Ok(())
                }
            })?;
            Ok(())
        })
        .unwrap();

    h.runtime.unmount().unwrap();

    assert_eq!(*log.read(), vec!["a1", "a", "b", "root"]);
    assert_eq!(h.runtime.world().entity_count(), 0);
    assert_eq!(h.clock.pending(), None);
}

#[test]
fn test_mount_twice_fails() {
    let mut h = harness();
    h.runtime.mount(None, |_world: &mut World| Ok(())).unwrap();
    let again = h.runtime.mount(None, |_world: &mut World| Ok(()));
    assert_eq!(again.map(|_| ()), Err(arbor_app::AppError::AlreadyMounted));
}
