//! `hiresong` terminal front-end.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::TryRecvError;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{cursor, execute};
use hiresong_app::{
    AppConfig, CaptureCommand, CaptureController, MonotonicClock, app_version, capture_device,
    download_video, init_tracing, load_file, spawn_submission,
};
use hiresong_capture::{CAPTURED_FILE_NAME, CaptureEvent, CaptureMode, CaptureSession};
use hiresong_core::{Genre, SelectedFile};
use hiresong_ui::{
    FileSelector, SUCCESS_SUBTITLE, SUCCESS_TITLE, SelectionChange, ShellState, SubmitRejection,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(16);
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// HireSong: turn a selfie, a CV and a company URL into a video pitch.
#[derive(Parser)]
#[command(name = "hiresong", version = app_version(), about)]
struct Cli {
    /// Generation API base URL (overrides HIRESONG_API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a selfie and CV and download the generated video.
    Generate {
        /// Selfie image file.
        #[arg(long, required_unless_present = "webcam", conflicts_with = "webcam")]
        selfie: Option<PathBuf>,
        /// Take the selfie with the camera instead.
        #[arg(long)]
        webcam: bool,
        #[command(flatten)]
        camera: CameraArgs,
        /// CV in PDF format.
        #[arg(long)]
        cv: PathBuf,
        /// Company website URL.
        #[arg(long)]
        company_url: String,
        /// Music genre (see `hiresong genres`).
        #[arg(long, default_value_t = Genre::SurpriseMe)]
        genre: Genre,
        /// Download directory (overrides HIRESONG_OUTPUT_DIR).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Take a selfie with the camera and save it as JPEG.
    Snap {
        #[command(flatten)]
        camera: CameraArgs,
        /// Output file (defaults to selfie.jpg in the output directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List music genres.
    Genres,
}

#[derive(clap::Args, Clone, Copy)]
struct CameraArgs {
    /// Use a generated test pattern instead of a real camera.
    #[arg(long)]
    synthetic_camera: bool,
    /// Show a shutter key instead of the brightness gesture.
    #[arg(long)]
    shutter: bool,
}

impl CameraArgs {
    fn mode(self) -> CaptureMode {
        if self.shutter {
            CaptureMode::Shutter
        } else {
            CaptureMode::Gesture
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_overrides(cli.api_url.as_deref(), None)?;
    info!(version = app_version(), api_url = %config.api_url, "hiresong starting");

    match cli.command {
        Command::Generate {
            selfie,
            webcam,
            camera,
            cv,
            company_url,
            genre,
            out,
        } => {
            let config = config.with_overrides(None, out.as_deref())?;
            let selfie = match selfie {
                Some(path) if !webcam => SelfieSource::File(path),
                _ => SelfieSource::Camera(camera),
            };
            run_generate(&config, selfie, &cv, company_url, genre)
        }
        Command::Snap { camera, out } => {
            let target = out.unwrap_or_else(|| config.output_dir.join(CAPTURED_FILE_NAME));
            run_snap(camera, &target)
        }
        Command::Genres => {
            for genre in Genre::ALL {
                println!("{:<12} {}", genre.wire_value(), genre.label());
            }
            Ok(())
        }
    }
}

enum SelfieSource {
    File(PathBuf),
    Camera(CameraArgs),
}

fn run_generate(
    config: &AppConfig,
    selfie: SelfieSource,
    cv: &Path,
    company_url: String,
    genre: Genre,
) -> anyhow::Result<()> {
    let clock = MonotonicClock::new();
    let mut rng = StdRng::from_os_rng();
    let mut shell = ShellState::new(clock.now_ms());
    println!("{}", shell.header().title());

    match selfie {
        SelfieSource::File(path) => {
            let file = load_file(&path)?;
            let now_ms = clock.now_ms();
            if let SelectionChange::Selected(_) = shell.choose_selfie(file, now_ms, &mut rng)? {
                print_selection(shell.selfie_picker(), now_ms);
            }
        }
        SelfieSource::Camera(camera) => {
            shell.toggle_webcam();
            let Some(file) = capture_selfie(camera, &clock)? else {
                bail!("camera cancelled; no selfie taken");
            };
            shell.accept_captured_selfie(file);
            print_selection(shell.selfie_picker(), clock.now_ms());
        }
    }

    let file = load_file(cv)?;
    let now_ms = clock.now_ms();
    if let SelectionChange::Selected(_) = shell.choose_cv(file, now_ms, &mut rng)? {
        print_selection(shell.cv_picker(), now_ms);
    }
    shell.set_company_url(company_url);
    shell.set_genre(genre);

    let client = config.http_client()?;
    loop {
        let ticket = match shell.begin_submit() {
            Ok(ticket) => ticket,
            Err(SubmitRejection::Invalid(_)) => {
                bail!("⚠️ {}", shell.error().unwrap_or_default())
            }
            Err(rejection) => return Err(rejection.into()),
        };

        let outcomes = spawn_submission(client.clone(), ticket)?;
        let mut frame = 0_usize;
        let outcome = loop {
            match outcomes.try_recv() {
                Ok(outcome) => break outcome,
                Err(TryRecvError::Empty) => {
                    shell.tick(clock.now_ms(), &mut rng);
                    eprint!("\r{} {}", SPINNER[frame % SPINNER.len()], shell.submit_label());
                    io::stderr().flush()?;
                    frame += 1;
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(TryRecvError::Disconnected) => {
                    bail!("submission worker stopped unexpectedly")
                }
            }
        };
        eprintln!();

        shell.finish_submit(&outcome.ticket, outcome.result);
        let Some(error) = shell.error() else {
            break;
        };
        eprintln!("⚠️ {error}");
        if !confirm_retry()? {
            bail!("⚠️ {error}");
        }
    }

    println!("{SUCCESS_TITLE}");
    println!("{SUCCESS_SUBTITLE}");
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    let path = download_video(&shell, &client, &config.output_dir)?;
    println!("⬇️ Saved to {}", path.display());
    Ok(())
}

/// Asks on an interactive terminal whether to submit again.
fn confirm_retry() -> anyhow::Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(false);
    }
    eprint!("Try again? [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_selection(picker: &FileSelector, now_ms: u64) {
    if let Some(caption) = picker.preview_caption() {
        println!("✓ {caption}");
    }
    if let Some(comment) = picker.comment(now_ms) {
        println!("  {comment}");
    }
}

fn run_snap(camera: CameraArgs, target: &Path) -> anyhow::Result<()> {
    let clock = MonotonicClock::new();
    let Some(file) = capture_selfie(camera, &clock)? else {
        println!("Camera cancelled");
        return Ok(());
    };

    if let Some(parent) = target.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("cannot create {}", parent.display()))?;
    }
    fs::write(target, file.bytes())
        .with_context(|| format!("cannot write {}", target.display()))?;
    println!("📸 Saved {} ({})", target.display(), file.size_label());
    Ok(())
}

/// Restores the terminal even when the capture loop bails out.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show);
        println!();
    }
}

fn capture_selfie(
    camera: CameraArgs,
    clock: &MonotonicClock,
) -> anyhow::Result<Option<SelectedFile>> {
    let device = capture_device(camera.synthetic_camera)?;
    let session = CaptureSession::start(device, camera.mode(), clock.now_ms());
    let mut control = CaptureController::new(session);
    let _guard = RawModeGuard::enable()?;
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;

    loop {
        match control.tick(clock.now_ms()) {
            Some(CaptureEvent::Captured(file)) => return Ok(Some(file)),
            Some(CaptureEvent::Failed(message)) => warn!(%message, "capture failed"),
            None => {}
        }

        execute!(stdout, cursor::MoveToColumn(0), terminal::Clear(ClearType::CurrentLine))?;
        write!(stdout, "{}", control.status_line())?;
        stdout.flush()?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind != KeyEventKind::Release
        {
            let Some(command) = key_command(key.code, key.modifiers) else {
                continue;
            };
            debug!(?command, "capture key");
            if command == CaptureCommand::Retry {
                let device = capture_device(camera.synthetic_camera)?;
                control.retry_with(device, clock.now_ms());
            } else if !control.handle(command, clock.now_ms()) {
                return Ok(None);
            }
        }
    }
}

fn key_command(code: KeyCode, modifiers: KeyModifiers) -> Option<CaptureCommand> {
    match code {
        KeyCode::Char(' ') => Some(CaptureCommand::Press),
        KeyCode::Right => Some(CaptureCommand::DragRight),
        KeyCode::Left => Some(CaptureCommand::DragLeft),
        KeyCode::Enter => Some(CaptureCommand::Release),
        KeyCode::Char('t') => Some(CaptureCommand::TakePhoto),
        KeyCode::Char('r') => Some(CaptureCommand::Retry),
        KeyCode::Esc => Some(CaptureCommand::Cancel),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(CaptureCommand::Cancel)
        }
        _ => None,
    }
}
