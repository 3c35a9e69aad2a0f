/// Spinny Terminal Demo - Rotating Shapes
///
/// Renders one of the demo scenes with flat shading in the terminal.
/// Usage: spinny-terminal [towers|octahedron|cube]
/// Controls:
///   - WASD: Move, Space/Q: Up/Down
///   - IJKL / Arrow Keys / mouse drag: Turn
///   - P: Pause, F: Outlines, Ctrl-R: Reset camera
///   - Esc / Ctrl-C: Quit

use std::env;
use std::io;
use spinny_terminal::{scene, TerminalApp};

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let name = env::args().nth(1).unwrap_or_else(|| "towers".to_string());
    let shape = match scene::by_name(&name) {
        Some(shape) => shape.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
        None => {
            eprintln!("Unknown scene {name:?}, expected one of: {}", scene::SCENES.join(", "));
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "unknown scene"));
        }
    };

    log::info!(
        "Loaded scene {name}: {} points, {} faces",
        shape.points().len(),
        shape.faces().len()
    );

    let mut app = TerminalApp::new(shape)?;
    app.run()?;

    Ok(())
}
