/// Platform shim: window, input mapping and a software presenter around
/// `Engine::tick`. Everything in here is replaceable; the engine core never
/// calls back into it.
use cubecraft::{
    BlockKind, ChunkBuffers, Engine, Framebuffer, Input, MoveInput, Rasterizer,
    CHUNK_HEIGHT, CHUNK_SIZE_X, CHUNK_SIZE_Z,
};
use glam::{IVec2, Vec2, Vec3};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const WORLD_SEED: u32 = 1337;
const SKY_COLOR: u32 = 0xFF87CEEB;

/// The placeable kinds on the hotbar, in slot order.
const HOTBAR: [BlockKind; 4] = [
    BlockKind::Stone,
    BlockKind::Dirt,
    BlockKind::Grass,
    BlockKind::Water,
];

fn main() {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    println!("=== Cubecraft ===");
    println!("Controls:");
    println!("  WASD - Move");
    println!("  Space - Jump / swim (double-tap toggles fly, Shift descends)");
    println!("  Mouse - Look, Left click - break, Right click - place");
    println!("  Wheel / 1-{} - Select block", HOTBAR.len());
    println!("  ESC - Release mouse");
    println!();

    let event_loop = EventLoop::new().unwrap();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Cubecraft")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)
            .unwrap(),
    );

    let context = softbuffer::Context::new(window.clone()).unwrap();
    let mut surface = softbuffer::Surface::new(&context, window.clone()).unwrap();

    let window_size = window.inner_size();
    let mut framebuffer =
        Framebuffer::new(window_size.width as usize, window_size.height as usize);

    let workers = std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1);

    println!("Generating world (seed {WORLD_SEED})...");
    let generation_start = Instant::now();
    let mut engine = Engine::new(
        WORLD_SEED,
        workers,
        window_size.width as f32 / window_size.height as f32,
    );
    println!(
        "World ready in {:.0}ms ({} workers)",
        generation_start.elapsed().as_millis(),
        workers
    );

    let rasterizer = Rasterizer::new();
    let mut chunk_buffers: HashMap<IVec2, ChunkBuffers> = HashMap::new();

    // Input state carried between events and the per-frame tick.
    let mut movement = MoveInput::default();
    let mut look_delta = Vec2::ZERO;
    let mut break_click = false;
    let mut place_click = false;
    let mut selected_slot = 0usize;
    let mut mouse_captured = false;

    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => {
                        elwt.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if new_size.width == 0 || new_size.height == 0 {
                            return;
                        }
                        framebuffer.resize(new_size.width as usize, new_size.height as usize);
                        engine
                            .camera
                            .set_aspect_ratio(new_size.width as f32 / new_size.height as f32);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        let pressed = event.state == ElementState::Pressed;
                        if let PhysicalKey::Code(keycode) = event.physical_key {
                            match keycode {
                                KeyCode::KeyW => movement.forward = pressed,
                                KeyCode::KeyS => movement.backward = pressed,
                                KeyCode::KeyA => movement.left = pressed,
                                KeyCode::KeyD => movement.right = pressed,
                                KeyCode::Space => movement.jump = pressed,
                                KeyCode::ShiftLeft => movement.descend = pressed,
                                KeyCode::Escape if pressed => {
                                    if mouse_captured {
                                        mouse_captured = false;
                                        window.set_cursor_visible(true);
                                    } else {
                                        elwt.exit();
                                    }
                                }
                                _ => {
                                    if pressed {
                                        if let Some(slot) = digit_slot(keycode) {
                                            if slot < HOTBAR.len() {
                                                selected_slot = slot;
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        if state != ElementState::Pressed {
                            return;
                        }
                        if !mouse_captured {
                            mouse_captured = true;
                            window.set_cursor_visible(false);
                            return;
                        }
                        match button {
                            MouseButton::Left => break_click = true,
                            MouseButton::Right => place_click = true,
                            _ => {}
                        }
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32,
                        };
                        if scroll > 0.0 {
                            selected_slot = (selected_slot + HOTBAR.len() - 1) % HOTBAR.len();
                        } else if scroll < 0.0 {
                            selected_slot = (selected_slot + 1) % HOTBAR.len();
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let dt = (now - last_frame).as_secs_f32().min(0.1);
                        last_frame = now;

                        let input = Input {
                            movement,
                            look_delta,
                            break_block: break_click,
                            place_block: place_click,
                            selected: HOTBAR[selected_slot],
                        };
                        look_delta = Vec2::ZERO;
                        break_click = false;
                        place_click = false;

                        let output = engine.tick(dt, &input);
                        for upload in output.uploads {
                            let buffers = ChunkBuffers {
                                opaque: upload.opaque,
                                transparent: upload.transparent,
                            };
                            if buffers.is_empty() {
                                chunk_buffers.remove(&upload.coord);
                            } else {
                                chunk_buffers.insert(upload.coord, buffers);
                            }
                        }

                        render_frame(
                            &mut framebuffer,
                            &rasterizer,
                            &engine,
                            &chunk_buffers,
                        );

                        surface
                            .resize(
                                NonZeroU32::new(framebuffer.width as u32).unwrap(),
                                NonZeroU32::new(framebuffer.height as u32).unwrap(),
                            )
                            .unwrap();
                        let mut buffer = surface.buffer_mut().unwrap();
                        buffer.copy_from_slice(framebuffer.color_slice());
                        buffer.present().unwrap();

                        frame_count += 1;
                        if fps_timer.elapsed().as_secs() >= 1 {
                            println!(
                                "FPS: {} | Chunks uploaded: {} | Sky fill left: {}",
                                frame_count,
                                chunk_buffers.len(),
                                output.sky_fill_remaining
                            );
                            frame_count = 0;
                            fps_timer = Instant::now();
                        }
                    }
                    _ => {}
                },
                Event::DeviceEvent {
                    event: DeviceEvent::MouseMotion { delta },
                    ..
                } => {
                    if mouse_captured {
                        look_delta += Vec2::new(delta.0 as f32, delta.1 as f32);
                    }
                }
                Event::AboutToWait => {
                    window.request_redraw();
                }
                _ => {}
            }
        })
        .unwrap();
}

fn digit_slot(keycode: KeyCode) -> Option<usize> {
    Some(match keycode {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        KeyCode::Digit9 => 8,
        _ => return None,
    })
}

fn render_frame(
    framebuffer: &mut Framebuffer,
    rasterizer: &Rasterizer,
    engine: &Engine,
    chunk_buffers: &HashMap<IVec2, ChunkBuffers>,
) {
    framebuffer.clear(SKY_COLOR);

    let view_proj = engine.camera.view_projection_matrix();
    let frustum = engine.camera.extract_frustum();
    let eye = engine.camera.position;

    // Frustum-cull chunk columns once for both passes.
    let mut visible: Vec<(&IVec2, &ChunkBuffers, f32)> = chunk_buffers
        .iter()
        .filter(|(coord, _)| frustum.is_column_visible(**coord))
        .map(|(coord, buffers)| {
            let centre = chunk_origin(*coord)
                + Vec3::new(
                    CHUNK_SIZE_X as f32 / 2.0,
                    CHUNK_HEIGHT as f32 / 2.0,
                    CHUNK_SIZE_Z as f32 / 2.0,
                );
            (coord, buffers, (centre - eye).length_squared())
        })
        .collect();

    // Opaque pass with depth writes.
    for (coord, buffers, _) in &visible {
        let origin = chunk_origin(**coord);
        rasterizer.draw_stream(framebuffer, &buffers.opaque, origin, &view_proj, true, false);
    }

    // Transparent pass: back-to-front by squared eye distance, no depth
    // writes, blending on.
    visible.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(std::cmp::Ordering::Equal));
    for (coord, buffers, _) in &visible {
        let origin = chunk_origin(**coord);
        rasterizer.draw_stream(
            framebuffer,
            &buffers.transparent,
            origin,
            &view_proj,
            false,
            true,
        );
    }

    if engine.player.in_water {
        underwater_tint(framebuffer);
    }
    draw_crosshair(framebuffer);
}

#[inline]
fn chunk_origin(coord: IVec2) -> Vec3 {
    Vec3::new(
        (coord.x * CHUNK_SIZE_X as i32) as f32,
        0.0,
        (coord.y * CHUNK_SIZE_Z as i32) as f32,
    )
}

/// Full-screen blue wash while the eye is inside water.
fn underwater_tint(framebuffer: &mut Framebuffer) {
    const TINT: (u32, u32, u32) = (0x1A, 0x66, 0xCC);
    const ALPHA: u32 = 102; // ~0.4

    for pixel in framebuffer.color.iter_mut() {
        let r = ((*pixel >> 16) & 0xFF) * (255 - ALPHA) / 255 + TINT.0 * ALPHA / 255;
        let g = ((*pixel >> 8) & 0xFF) * (255 - ALPHA) / 255 + TINT.1 * ALPHA / 255;
        let b = (*pixel & 0xFF) * (255 - ALPHA) / 255 + TINT.2 * ALPHA / 255;
        *pixel = 0xFF00_0000 | (r << 16) | (g << 8) | b;
    }
}

/// Two short white lines at the screen centre.
fn draw_crosshair(framebuffer: &mut Framebuffer) {
    let cx = framebuffer.width / 2;
    let cy = framebuffer.height / 2;
    let arm = 8usize;

    for x in cx.saturating_sub(arm)..(cx + arm).min(framebuffer.width) {
        let index = framebuffer.index(x, cy);
        framebuffer.color[index] = 0xFFFFFFFF;
    }
    for y in cy.saturating_sub(arm)..(cy + arm).min(framebuffer.height) {
        let index = framebuffer.index(cx, y);
        framebuffer.color[index] = 0xFFFFFFFF;
    }
}
