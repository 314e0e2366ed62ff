use super::OutputAdapter;
use anyhow::{Context, Result};
use api::RenderedFrame;
use log::info;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Appends every frame to a file as one JSON document per line.
pub struct JsonlStrategy {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl JsonlStrategy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }
}

impl OutputAdapter for JsonlStrategy {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing JSON Lines Strategy...");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {:?}", self.path))?;
        self.writer = Some(BufWriter::new(file));
        info!("JSON Lines Strategy initialized. Target: {:?}", self.path);
        Ok(())
    }

    fn send(&mut self, frame: &RenderedFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            serde_json::to_writer(&mut *writer, frame)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        Ok(())
    }
}
