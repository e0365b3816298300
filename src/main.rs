use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use log::{info, warn};

use tiltscroll::config::{effective_arm_length, DEFAULT_ARM_LENGTH};
use tiltscroll::font::{BlockFont, FontOutliner, GlyphOutliner};
use tiltscroll::haptics::PulseCounter;
use tiltscroll::sensor::{GravitySource, ReplaySource, SimulatedTilt, TiltHandle};
use tiltscroll::session::{LatestValue, SensorStage, SessionControl};
use tiltscroll::terminal::{pixel_size, TerminalSession};
use tiltscroll::{
    ColorScheme, DeviceOrientation, Error, Padding, PathTextRenderer, PixelBuffer,
    ReferencePolicy, ScrollConfig, TextScroller,
};

/// How long the draw loop waits for input before checking for new angles
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Simulated roll per arrow key press, in radians
const TILT_STEP: f64 = std::f64::consts::PI / 90.0;

/// Scroll a line of text by tilting the device
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Text to display
    text: String,

    /// White text on black instead of black on white
    #[arg(long)]
    dark: bool,

    /// Sighting arm length, in inches
    #[arg(long, default_value_t = DEFAULT_ARM_LENGTH)]
    arm_length: u32,

    /// Use the full arm length; otherwise it is halved
    #[arg(long)]
    long_range: bool,

    /// Disable the haptic tick at either end of the text
    #[arg(long)]
    no_vibrate: bool,

    /// Upper-case the text before showing it
    #[arg(long)]
    caps: bool,

    /// TrueType or OpenType font to outline the text with; a built-in
    /// block font is used otherwise
    #[arg(long, value_name = "TTF")]
    font: Option<PathBuf>,

    /// Terminal pixels per inch
    #[arg(long, default_value_t = 10.0)]
    density: f64,

    /// Blank pixel rows above and below the text
    #[arg(long, default_value_t = 2)]
    padding: u32,

    /// How the device is held
    #[arg(long, value_enum, default_value_t = DeviceOrientation::Portrait)]
    orientation: DeviceOrientation,

    /// Capture the reference "up" again whenever the orientation changes
    #[arg(long)]
    follow_rotation: bool,

    /// Replay gravity samples from a file instead of the arrow keys
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Sensor sampling rate, in Hz
    #[arg(long, default_value_t = 60.0)]
    rate_hz: f64,
}

impl Args {
    /// The text as it will be shown; empty text is rejected
    fn display_text(&self) -> Result<String, Error> {
        if self.text.is_empty() {
            return Err(Error::EmptyText);
        }
        Ok(if self.caps {
            self.text.to_uppercase()
        } else {
            self.text.clone()
        })
    }

    fn scroll_config(&self) -> ScrollConfig {
        ScrollConfig {
            arm_length_inches: effective_arm_length(self.arm_length, self.long_range) as f64,
            display_density: self.density,
            vibrate_enabled: !self.no_vibrate,
            colors: ColorScheme::for_dark_mode(self.dark),
            reference_policy: if self.follow_rotation {
                ReferencePolicy::FollowOrientation
            } else {
                ReferencePolicy::CaptureOnce
            },
        }
    }

    fn outliner(&self) -> anyhow::Result<Box<dyn GlyphOutliner>> {
        match &self.font {
            Some(path) => {
                let font = FontOutliner::from_file(path)
                    .with_context(|| format!("failed to load font {}", path.display()))?;
                info!("outlining text with {}", path.display());
                Ok(Box::new(font))
            }
            None => Ok(Box::new(BlockFont::default())),
        }
    }

    fn sample_period(&self) -> anyhow::Result<Duration> {
        if !(self.rate_hz.is_finite() && self.rate_hz > 0.0) {
            bail!("sampling rate must be positive, got {}", self.rate_hz);
        }
        Ok(Duration::from_secs_f64(1.0 / self.rate_hz))
    }

    /// Builds the gravity source; the tilt handle is only there when the
    /// arrow keys steer a simulated device
    fn gravity_source(&self) -> anyhow::Result<(Box<dyn GravitySource>, Option<TiltHandle>)> {
        match &self.replay {
            Some(path) => {
                let replay = ReplaySource::from_file(path, self.orientation)
                    .with_context(|| format!("failed to load replay {}", path.display()))?;
                info!("replaying {} gravity samples", replay.len());
                Ok((Box::new(replay), None))
            }
            None => {
                let (source, handle) = SimulatedTilt::new(self.orientation);
                Ok((Box::new(source), Some(handle)))
            }
        }
    }
}

/// Current terminal size in cells
fn terminal_size() -> anyhow::Result<(u16, u16)> {
    if let Some(size) = termsize::get() {
        return Ok((size.cols, size.rows));
    }
    warn!("termsize could not read the terminal size, asking crossterm");
    crossterm::terminal::size().context("failed to read terminal size")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let text = args.display_text()?;
    let config = args.scroll_config();
    let period = args.sample_period()?;
    let (source, tilt) = args.gravity_source()?;
    let (cols, rows) = terminal_size()?;
    let renderer = PathTextRenderer::new(args.outliner()?);

    let pulses = PulseCounter::new();
    let scroller = TextScroller::new(renderer, pulses.clone(), &text, config)
        .with_padding(Padding::vertical(args.padding));

    let mut terminal = TerminalSession::enter().context("failed to set up the terminal")?;
    let angles = LatestValue::new();
    let control = SessionControl::default();
    let stage = SensorStage::spawn(
        source,
        config.reference_policy,
        period,
        angles.clone(),
        control.clone(),
    )
    .context("failed to start the sensor thread")?;

    let session = Session {
        scroller,
        pulses,
        angles,
        control,
        tilt,
    };
    let result = session.run(&mut terminal, cols, rows);

    stage.shutdown();
    drop(terminal);
    result
}

/// Everything the draw loop owns for one scrolling session
struct Session {
    scroller: TextScroller<PathTextRenderer<Box<dyn GlyphOutliner>>, PulseCounter>,
    pulses: PulseCounter,
    angles: LatestValue<f64>,
    control: SessionControl,
    tilt: Option<TiltHandle>,
}

impl Session {
    /// Draw loop; returns when the user dismisses the text
    fn run(mut self, terminal: &mut TerminalSession, cols: u16, rows: u16) -> anyhow::Result<()> {
        let mut frame = self.resize(cols, rows);
        // Lay the text out before the first angle needs its width
        self.draw(terminal, &mut frame)?;
        let mut redraw = false;

        loop {
            if event::poll(FRAME_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                        KeyCode::Left => self.nudge(-TILT_STEP),
                        KeyCode::Right => self.nudge(TILT_STEP),
                        KeyCode::Char('0') => {
                            if let Some(tilt) = &self.tilt {
                                tilt.center();
                            }
                        }
                        _ => {}
                    },
                    // A tap anywhere dismisses
                    Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => break,
                    Event::Resize(cols, rows) => {
                        frame = self.resize(cols, rows);
                        redraw = true;
                    }
                    Event::FocusLost => self.control.pause(),
                    Event::FocusGained => self.control.resume(),
                    _ => {}
                }
            }

            if let Some(angle) = self.angles.take() {
                self.scroller.move_to(angle);
                redraw = true;
            }
            for _ in 0..self.pulses.take() {
                terminal.bell()?;
            }
            if redraw {
                self.draw(terminal, &mut frame)?;
                redraw = false;
            }
        }
        info!("dismissed");
        Ok(())
    }

    fn draw(&mut self, terminal: &mut TerminalSession, frame: &mut PixelBuffer) -> anyhow::Result<()> {
        self.scroller
            .render(frame)
            .context("text renderer was not set up")?;
        terminal.present(frame)?;
        Ok(())
    }

    fn resize(&mut self, cols: u16, rows: u16) -> PixelBuffer {
        let (width, height) = pixel_size(cols, rows);
        self.scroller.resize(width, height);
        PixelBuffer::new(width as usize, height as usize)
    }

    fn nudge(&self, delta: f64) {
        if let Some(tilt) = &self.tilt {
            tilt.nudge(delta);
        }
    }
}
