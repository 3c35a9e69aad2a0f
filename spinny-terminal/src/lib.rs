/// Terminal front end for the spinny render pipeline
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Point2;
use spinny_core::{Camera, RenderConfig, Renderer, Shape, Vector};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;
pub mod scene;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f64 = 2.0;

/// What a key press asks the application to do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Move(Vector),
    /// Pitch and yaw, in steps of the camera's rotational speed
    Turn(f64, f64),
    TogglePause,
    ResetCamera,
    ToggleWireframe,
    Quit,
}

/// Maps a key to an action.
pub fn key_action(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('r') => Some(Action::ResetCamera),
            KeyCode::Char('c') | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Char('w') => Action::Move(Vector::xyz(0.0, 1.0, 0.0)),
        KeyCode::Char('s') => Action::Move(Vector::xyz(0.0, -1.0, 0.0)),
        KeyCode::Char('a') => Action::Move(Vector::xyz(-1.0, 0.0, 0.0)),
        KeyCode::Char('d') => Action::Move(Vector::xyz(1.0, 0.0, 0.0)),
        KeyCode::Char(' ') => Action::Move(Vector::xyz(0.0, 0.0, 1.0)),
        KeyCode::Char('q') => Action::Move(Vector::xyz(0.0, 0.0, -1.0)),
        KeyCode::Char('i') | KeyCode::Up => Action::Turn(1.0, 0.0),
        KeyCode::Char('k') | KeyCode::Down => Action::Turn(-1.0, 0.0),
        KeyCode::Char('j') | KeyCode::Left => Action::Turn(0.0, 1.0),
        KeyCode::Char('l') | KeyCode::Right => Action::Turn(0.0, -1.0),
        KeyCode::Char('p') => Action::TogglePause,
        KeyCode::Char('f') => Action::ToggleWireframe,
        KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Accumulates mouse drag movement between frames
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PointerDelta {
    last: Option<(u16, u16)>,
    dx: i32,
    dy: i32,
}

impl PointerDelta {
    pub fn handle(&mut self, mouse: &MouseEvent) {
        let here = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(_) => self.last = Some(here),
            MouseEventKind::Drag(_) => {
                if let Some((x, y)) = self.last {
                    self.dx += here.0 as i32 - x as i32;
                    self.dy += here.1 as i32 - y as i32;
                }
                self.last = Some(here);
            }
            MouseEventKind::Up(_) => self.last = None,
            _ => {}
        }
    }

    /// Pitch and yaw steps for the movement so far, resetting it.
    ///
    /// Dragging right turns right and dragging down looks down.
    pub fn take_turn(&mut self) -> (f64, f64) {
        let turn = (-self.dy as f64, -self.dx as f64);
        self.dx = 0;
        self.dy = 0;
        turn
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    shape: Shape,
    camera: Camera,
    renderer: Renderer,
    canvas: AsciiRenderer,
    pointer: PointerDelta,
    running: bool,
    paused: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(shape: Shape) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(shape, width, height))
    }

    /// An app drawing into a `width` x `height` cell canvas.
    pub fn with_size(shape: Shape, width: u16, height: u16) -> Self {
        Self {
            shape,
            camera: Camera::default(),
            renderer: Renderer::new(Self::render_config(height)),
            canvas: AsciiRenderer::new(width as usize, height as usize),
            pointer: PointerDelta::default(),
            running: true,
            paused: false,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    fn render_config(height: u16) -> RenderConfig {
        RenderConfig::default()
            .with_zoom(height as f64 * 1.5)
            .with_pixel_aspect(CELL_ASPECT)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            cursor::Show,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(30);

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            if !self.paused {
                let (pitch, yaw) = self.pointer.take_turn();
                self.camera.turn_steps(pitch, yaw);
                self.render()?;
                self.frame_count += 1;
            } else {
                self.draw_status()?;
            }

            // Frame timing
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if let Some(action) = key_action(&key) {
                    self.apply(action);
                }
            }
            Event::Mouse(mouse) if !self.paused => self.pointer.handle(&mouse),
            Event::Resize(width, height) => {
                self.canvas.resize(width as usize, height as usize);
                let wireframe = self.renderer.config().wireframe;
                self.renderer =
                    Renderer::new(Self::render_config(height).with_wireframe(wireframe));
            }
            _ => {}
        }
    }

    /// Applies an action. Movement and turning are ignored while paused.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::TogglePause => {
                self.paused = !self.paused;
                self.pointer = PointerDelta::default();
            }
            Action::ResetCamera => {
                log::debug!("camera reset");
                self.camera = Camera::default();
            }
            Action::ToggleWireframe => {
                let config = self.renderer.config().clone();
                let wireframe = !config.wireframe;
                self.renderer = Renderer::new(config.with_wireframe(wireframe));
            }
            _ if self.paused => {}
            Action::Move(v) => {
                if let Err(e) = self.camera.move_by(&v) {
                    log::warn!("camera move failed: {e}");
                }
            }
            Action::Turn(pitch, yaw) => self.camera.turn_steps(pitch, yaw),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn render(&mut self) -> io::Result<()> {
        let centre = Point2::new(
            self.canvas.width() as f64 / 2.0,
            self.canvas.height() as f64 / 2.0,
        );

        // Clear renderer
        self.canvas.clear();

        // A failed frame is dropped and the next one starts fresh
        match self
            .renderer
            .render_frame(&mut self.shape, &mut self.camera, &centre)
        {
            Ok(frame) => self.canvas.render_frame(&frame),
            Err(e) => log::warn!("frame abandoned: {e}"),
        }

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.canvas.draw(&mut stdout)?;
        self.draw_status()
    }

    fn draw_status(&self) -> io::Result<()> {
        let mut stdout = stdout();
        let pos = self.camera.position();
        let coord = |i: usize| pos.get(i).unwrap_or(0.0);
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "X {:.2} Y {:.2} Z {:.2} | pitch {:.2} yaw {:.2} | FPS: {:.1} | {}",
                coord(0),
                coord(1),
                coord(2),
                self.camera.pitch(),
                self.camera.yaw(),
                self.fps,
                if self.paused {
                    "PAUSED (p to resume)"
                } else {
                    "WASD/Space/Q=Move IJKL/drag=Turn F=Outline P=Pause ^R=Reset Esc=Quit"
                }
            )),
            ResetColor
        )?;

        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::MouseButton;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            key_action(&key(KeyCode::Char('w'))),
            Some(Action::Move(Vector::xyz(0.0, 1.0, 0.0)))
        );
        assert_eq!(
            key_action(&key(KeyCode::Char(' '))),
            Some(Action::Move(Vector::xyz(0.0, 0.0, 1.0)))
        );
        assert_eq!(key_action(&key(KeyCode::Char('j'))), Some(Action::Turn(0.0, 1.0)));
        assert_eq!(key_action(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(key_action(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_control_bindings() {
        let reset = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(key_action(&reset), Some(Action::ResetCamera));
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(key_action(&quit), Some(Action::Quit));
    }

    fn app() -> TerminalApp {
        let shape = spinny_core::Primitive::Cube
            .at(&Vector::xyz(-0.5, -0.5, -0.5))
            .unwrap();
        TerminalApp::with_size(shape, 40, 20)
    }

    #[test]
    fn test_pause_freezes_camera() {
        let mut app = app();
        app.apply(Action::TogglePause);
        assert!(app.is_paused());
        app.apply(Action::Move(Vector::xyz(0.0, 1.0, 0.0)));
        app.apply(Action::Turn(1.0, 0.0));
        assert_eq!(app.camera().position(), &Vector::xyz(0.0, -10.0, 0.0));
        assert_eq!(app.camera().pitch(), 0.0);

        app.apply(Action::TogglePause);
        assert!(!app.is_paused());
        app.apply(Action::Move(Vector::xyz(0.0, 1.0, 0.0)));
        assert_ne!(app.camera().position(), &Vector::xyz(0.0, -10.0, 0.0));
    }

    #[test]
    fn test_reset_and_quit() {
        let mut app = app();
        app.apply(Action::Turn(2.0, 3.0));
        assert_ne!(app.camera().yaw(), 0.0);
        app.apply(Action::ResetCamera);
        assert_eq!((app.camera().pitch(), app.camera().yaw()), (0.0, 0.0));

        assert!(app.is_running());
        app.apply(Action::Quit);
        assert!(!app.is_running());
    }

    #[test]
    fn test_pointer_drag_accumulates() {
        let mut pointer = PointerDelta::default();
        pointer.handle(&mouse(MouseEventKind::Moved, 0, 0));
        pointer.handle(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 10));
        pointer.handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 13, 9));
        pointer.handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 15, 9));
        assert_eq!(pointer.take_turn(), (1.0, -5.0));
        assert_eq!(pointer.take_turn(), (0.0, 0.0));

        pointer.handle(&mouse(MouseEventKind::Up(MouseButton::Left), 15, 9));
        pointer.handle(&mouse(MouseEventKind::Drag(MouseButton::Left), 20, 9));
        assert_eq!(pointer.take_turn(), (0.0, 0.0));
    }
}
