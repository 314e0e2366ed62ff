use anyhow::{Context, Result};
use api::{CommandRecorder, EventSink, RenderedFrame};
use common::{FaceViewer, StatusProperty, ViewerConfig};
use faceviz::drivers::{driver_logger, load_driver};
use faceviz::strategies::{self, OutputAdapter};
use log::{debug, error, info, trace, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn config_path(args: &[String]) -> PathBuf {
    args.iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    info!("Starting...");
    debug!("Debug logging is active");
    trace!("Trace logging is active");

    let args: Vec<String> = std::env::args().collect();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Received Ctrl-C, shutting down...");
        r.store(false, Ordering::SeqCst);
    })
    .context("Error setting Ctrl-C handler")?;

    let config_path = config_path(&args);
    let config = ViewerConfig::load_or_create(&config_path).unwrap_or_else(|e| {
        error!("Failed to load config: {:#}. Using defaults.", e);
        ViewerConfig::default()
    });
    info!("Loaded Config: {:?}", config);

    let mut loaded = load_driver(&config.driver, &config.simulation);
    loaded
        .driver
        .initialize(driver_logger(&loaded.name))
        .with_context(|| format!("Failed to initialize driver {}", loaded.name))?;
    info!("✓ Initialized driver: {}", loaded.name);

    let mut output = strategies::create_strategy(&config.output);
    if let Err(e) = output.initialize() {
        error!("Failed to initialize {:?} output: {}", config.output.mode, e);
        return Err(e);
    }
    info!("Output initialized with {:?} Strategy.", config.output.mode);

    let status = StatusProperty::new();
    status.subscribe(|text| info!("Sensor status: {}", text));

    let (sink, rx) = EventSink::channel(config.event_queue_depth.max(1));
    let mut viewer = FaceViewer::new(loaded.driver, config.style, status.clone());
    viewer.open(sink).context("Failed to open sensor")?;
    let display = viewer.lifecycle().display();
    info!(
        "Sensor open: {}x{} colour frame, {} face slot(s)",
        display.width,
        display.height,
        viewer.lifecycle().slots().len()
    );

    info!("Entering Main Loop (Consumer)...");

    let mut recorder = CommandRecorder::new();
    let mut frame_count: u64 = 0;
    let mut log_interval: u64 = 1000;
    let mut last_log = Instant::now();
    let mut last_frame_time = Instant::now();
    let target_frame_duration = config
        .max_fps
        .filter(|fps| fps.is_finite() && *fps > 0.0)
        .map(|fps| Duration::from_secs_f32(1.0 / fps));

    while running.load(Ordering::SeqCst) {
        let event = match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Sensor stopped delivering events.");
                break;
            }
        };

        let Some(outcome) = viewer.handle_event(event, &mut recorder) else {
            continue;
        };

        let frame = RenderedFrame {
            sequence: outcome.sequence,
            width: display.width,
            height: display.height,
            status: status.get().unwrap_or_default(),
            faces_drawn: outcome.summary.faces_drawn,
            commands: recorder.take(),
        };
        if let Err(e) = output.send(&frame) {
            error!("Failed to send frame: {}", e);
        }

        frame_count += 1;
        if frame_count.is_multiple_of(log_interval) {
            let elapsed = last_log.elapsed().as_secs_f32();
            let fps = log_interval as f32 / elapsed;
            info!(
                "Tracking Active: Rendered {} frames (approx {:.1} FPS)",
                frame_count, fps
            );
            last_log = Instant::now();

            if frame_count >= 1_000_000 {
                log_interval = 1_000_000;
            } else if frame_count >= 100_000 {
                log_interval = 100_000;
            } else if frame_count >= 10_000 {
                log_interval = 10_000;
            }
        }

        if let Some(target_duration) = target_frame_duration {
            let elapsed = last_frame_time.elapsed();
            if elapsed < target_duration {
                thread::sleep(target_duration - elapsed);
            }
        }
        last_frame_time = Instant::now();
    }

    info!("Shutting down...");
    viewer.close();
    Ok(())
}
