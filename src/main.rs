use std::{sync::Arc, time::Instant};
use tidepool::config::SimulationConfig;
use tidepool::constants::{
    BASE_TICK_SECS, FPS_UPDATE_INTERVAL_SECS, MAX_TICKS_PER_FRAME, WINDOW_HEIGHT, WINDOW_WIDTH,
};
use tidepool::renderer::Renderer;
use tidepool::simulation::SimulationState;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SimulationConfig::default();
    // Invalid dimensions are a configuration error, fatal at startup.
    let mut simulation_state = SimulationState::new(config)?;
    let grid_width = simulation_state.config().width;
    let grid_height = simulation_state.config().height;

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Tidepool Ocean Simulation")
            .with_inner_size(PhysicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT))
            .build(&event_loop)?,
    );
    let mut renderer = pollster::block_on(Renderer::new(window.clone(), grid_width, grid_height));

    let mut last_update_time = Instant::now();
    let mut time_accumulator = 0.0_f64;
    let mut last_fps_update_time = Instant::now();
    let mut frames_since_last_fps_update = 0u32;
    let mut current_fps = 0.0_f64;

    // The event loop is the sole owner of the simulation: advancing a tick
    // and reading a snapshot can never overlap.
    event_loop.run(move |event, elwt: &EventLoopWindowTarget<()>| {
        elwt.set_control_flow(ControlFlow::Poll);
        match event {
            Event::AboutToWait => {
                if !simulation_state.is_paused() {
                    let now = Instant::now();
                    time_accumulator += now.duration_since(last_update_time).as_secs_f64();
                    last_update_time = now;
                    let tick_interval = BASE_TICK_SECS / simulation_state.speed_multiplier();
                    let mut ticks_this_frame = 0;
                    while time_accumulator >= tick_interval {
                        simulation_state.advance();
                        time_accumulator -= tick_interval;
                        ticks_this_frame += 1;
                        if ticks_this_frame >= MAX_TICKS_PER_FRAME {
                            // Shed backlog instead of spiraling.
                            time_accumulator = 0.0;
                            break;
                        }
                    }
                } else {
                    last_update_time = Instant::now();
                    time_accumulator = 0.0;
                }
                window.request_redraw();
            }
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    renderer.resize(physical_size);
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    renderer.resize(window.inner_size());
                }
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } => {
                    if key_event.state == ElementState::Pressed && !key_event.repeat {
                        match key_event.physical_key {
                            PhysicalKey::Code(KeyCode::ArrowUp) => {
                                simulation_state.adjust_speed(true)
                            }
                            PhysicalKey::Code(KeyCode::ArrowDown) => {
                                simulation_state.adjust_speed(false)
                            }
                            PhysicalKey::Code(KeyCode::Space) => simulation_state.toggle_pause(),
                            PhysicalKey::Code(KeyCode::KeyR) => simulation_state.restart(),
                            PhysicalKey::Code(KeyCode::Escape) | PhysicalKey::Code(KeyCode::KeyQ) => {
                                elwt.exit()
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::RedrawRequested => {
                    frames_since_last_fps_update += 1;
                    let now = Instant::now();
                    let elapsed_secs = now.duration_since(last_fps_update_time).as_secs_f64();
                    if elapsed_secs >= FPS_UPDATE_INTERVAL_SECS {
                        current_fps = frames_since_last_fps_update as f64 / elapsed_secs;
                        last_fps_update_time = now;
                        frames_since_last_fps_update = 0;
                    }

                    let snapshot = simulation_state.snapshot();
                    match renderer.render(&snapshot) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            eprintln!("WGPU Error: OutOfMemory");
                            elwt.exit();
                        }
                        Err(e) => eprintln!("WGPU Error: {:?}", e),
                    }

                    let (flora, foragers, hunters) = simulation_state.population_counts();
                    let paused_text = if simulation_state.is_paused() {
                        " [PAUSED]"
                    } else {
                        ""
                    };
                    window.set_title(&format!(
                        "Tidepool - Tick: {} - A: {}, F: {}, P: {} - Speed: {:.2}x - FPS: {:.1}{}",
                        simulation_state.tick(),
                        flora,
                        foragers,
                        hunters,
                        simulation_state.speed_multiplier(),
                        current_fps,
                        paused_text
                    ));
                }
                _ => {}
            },
            _ => {}
        }
    })?;
    Ok(())
}
