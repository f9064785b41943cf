// Window module - Presentation window and event loop
//
// The window is created once the event loop resumes, covering the primary
// monitor without decorations unless configured as a scaled window. The
// screen size is the monitor's, not the window's: platforms that apply
// fullscreen asynchronously report the pre-fullscreen size at first, so
// the display context waits for the window to reach the monitor size.
// Every redraw runs one frame pump iteration; Escape or a close request
// raises the pump's stop signal, and the loop exits once the pump reports
// it has terminated.

use super::context::{DisplayContext, DisplayError};
use crate::emulator::{EmulatorCore, FramePump, PumpState, VideoConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

const WINDOW_TITLE: &str = "gb-present";

/// How long to wait for the window manager to apply fullscreen
const FULLSCREEN_TIMEOUT: Duration = Duration::from_secs(2);

/// How the presentation window covers the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Borderless over the whole primary monitor
    Fullscreen,
    /// Fixed-size window at an integer multiple of the logical frame
    Windowed { width: u32, height: u32 },
}

impl WindowMode {
    /// Pick the mode for frames of `frame_size` under `video`
    pub fn from_config(video: &VideoConfig, frame_size: (usize, usize)) -> Self {
        if video.fullscreen {
            WindowMode::Fullscreen
        } else {
            let scale = video.window_scale();
            WindowMode::Windowed {
                width: frame_size.0 as u32 * scale,
                height: frame_size.1 as u32 * scale,
            }
        }
    }

    /// Physical size to present to
    ///
    /// Fullscreen presents to the whole monitor when its size is known.
    /// Otherwise, and in windowed mode, the window's own size is used.
    pub fn screen_size(
        self,
        monitor: Option<PhysicalSize<u32>>,
        window: PhysicalSize<u32>,
    ) -> PhysicalSize<u32> {
        match (self, monitor) {
            (WindowMode::Fullscreen, Some(monitor)) if monitor.width > 0 && monitor.height > 0 => {
                monitor
            }
            _ => window,
        }
    }

    fn attributes(self, event_loop: &ActiveEventLoop) -> WindowAttributes {
        let attributes = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_resizable(false);

        match self {
            WindowMode::Fullscreen => attributes
                .with_decorations(false)
                .with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor()))),
            WindowMode::Windowed { width, height } => {
                attributes.with_inner_size(LogicalSize::new(width, height))
            }
        }
    }
}

/// Event loop handler that owns the pump and its display
pub struct PresentationWindow<C> {
    pump: FramePump<C>,
    video: VideoConfig,
    window: Option<Arc<Window>>,
    /// Screen size the context is waiting for the window to reach
    pending_screen: Option<PhysicalSize<u32>>,
    opened_at: Instant,
    context: Option<DisplayContext>,
    fatal: Option<DisplayError>,
}

impl<C: EmulatorCore> PresentationWindow<C> {
    pub fn new(pump: FramePump<C>, video: VideoConfig) -> Self {
        Self {
            pump,
            video,
            window: None,
            pending_screen: None,
            opened_at: Instant::now(),
            context: None,
            fatal: None,
        }
    }

    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<(), DisplayError> {
        let mode = WindowMode::from_config(&self.video, self.pump.core().frame_size());
        let window = Arc::new(event_loop.create_window(mode.attributes(event_loop))?);
        window.set_cursor_visible(false);

        let monitor = window
            .current_monitor()
            .or_else(|| event_loop.primary_monitor())
            .map(|monitor| monitor.size());
        let screen = mode.screen_size(monitor, window.inner_size());

        self.window = Some(window);
        self.pending_screen = Some(screen);
        self.opened_at = Instant::now();
        self.window_resized(self.current_size())
    }

    fn current_size(&self) -> PhysicalSize<u32> {
        self.window
            .as_ref()
            .map(|window| window.inner_size())
            .unwrap_or_default()
    }

    /// Create the display context once the window covers the screen
    fn window_resized(&mut self, size: PhysicalSize<u32>) -> Result<(), DisplayError> {
        let (Some(screen), Some(window)) = (self.pending_screen, self.window.as_ref()) else {
            return Ok(());
        };
        if size != screen {
            log::debug!(
                "Window is {}x{}, waiting for {}x{}",
                size.width,
                size.height,
                screen.width,
                screen.height
            );
            return Ok(());
        }

        let context =
            DisplayContext::initialize(Arc::clone(window), screen, self.pump.atlas(), &self.video)?;
        self.pending_screen = None;
        self.context = Some(context);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: DisplayError) {
        log::error!("{}", err);
        self.fatal = Some(err);
        event_loop.exit();
    }

    /// Settle for the window's actual size if fullscreen never arrives
    fn give_up_waiting(&mut self) -> Result<(), DisplayError> {
        if self.pending_screen.is_none() || self.opened_at.elapsed() < FULLSCREEN_TIMEOUT {
            return Ok(());
        }

        let size = self.current_size();
        log::warn!(
            "Window did not reach the screen size, presenting at {}x{}",
            size.width,
            size.height
        );
        self.pending_screen = Some(size);
        self.window_resized(size)
    }

    /// One pump iteration against the display
    fn pump_frame(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.give_up_waiting() {
            self.fail(event_loop, err);
            return;
        }
        let Some(context) = self.context.as_mut() else {
            return;
        };

        match self.pump.step(context) {
            Ok(PumpState::Running) => {}
            Ok(PumpState::Terminated) => event_loop.exit(),
            Err(err) => self.fail(event_loop, err),
        }
    }
}

impl<C: EmulatorCore> ApplicationHandler for PresentationWindow<C> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.open(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested");
                self.pump.stop_signal().raise();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                self.pump.stop_signal().raise();
            }
            WindowEvent::Resized(size) => {
                if let Err(err) = self.window_resized(size) {
                    self.fail(event_loop, err);
                }
            }
            WindowEvent::RedrawRequested => self.pump_frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Open the display and pump frames until stopped
///
/// # Arguments
/// * `video` - Video configuration
/// * `pump` - Frame pump with its program image already loaded
///
/// # Returns
/// Result indicating success or the display failure that ended the loop
pub fn run_presentation<C: EmulatorCore>(
    video: VideoConfig,
    pump: FramePump<C>,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut presentation = PresentationWindow::new(pump, video);
    event_loop.run_app(&mut presentation)?;

    if let Some(err) = presentation.fatal.take() {
        return Err(err.into());
    }

    log::info!(
        "Presented {} frames",
        presentation.pump.presented_frames()
    );
    Ok(())
}
