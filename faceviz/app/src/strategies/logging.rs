use super::OutputAdapter;
use anyhow::Result;
use api::RenderedFrame;
use log::{debug, info, trace};

/// Writes a one-line summary of every frame to the debug log.
#[derive(Debug, Default)]
pub struct LogStrategy {
    last_status: Option<String>,
}

impl OutputAdapter for LogStrategy {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing Log Strategy. Frames are summarized at debug level.");
        Ok(())
    }

    fn send(&mut self, frame: &RenderedFrame) -> Result<()> {
        if self.last_status.as_deref() != Some(frame.status.as_str()) {
            info!("Frame {}: status '{}'", frame.sequence, frame.status);
            self.last_status = Some(frame.status.clone());
        }
        debug!(
            "Frame {} ({}x{}): {} face(s), {} command(s)",
            frame.sequence,
            frame.width,
            frame.height,
            frame.faces_drawn,
            frame.commands.len()
        );
        for command in &frame.commands {
            trace!("  {:?}", command);
        }
        Ok(())
    }
}
