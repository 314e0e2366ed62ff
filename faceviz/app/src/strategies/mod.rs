pub mod generic_udp;
pub mod jsonl;
pub mod logging;

use anyhow::Result;
use api::RenderedFrame;
use common::{OutputConfig, OutputMode};
use generic_udp::GenericUdpStrategy;
use jsonl::JsonlStrategy;
use logging::LogStrategy;

/// Destination for rendered frames.
pub trait OutputAdapter {
    fn initialize(&mut self) -> Result<()>;
    fn send(&mut self, frame: &RenderedFrame) -> Result<()>;
}

pub enum OutputBackend {
    Log(LogStrategy),
    Jsonl(JsonlStrategy),
    Generic(GenericUdpStrategy),
}

impl OutputAdapter for OutputBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Log(s) => s.initialize(),
            Self::Jsonl(s) => s.initialize(),
            Self::Generic(s) => s.initialize(),
        }
    }

    fn send(&mut self, frame: &RenderedFrame) -> Result<()> {
        match self {
            Self::Log(s) => s.send(frame),
            Self::Jsonl(s) => s.send(frame),
            Self::Generic(s) => s.send(frame),
        }
    }
}

pub fn create_strategy(config: &OutputConfig) -> OutputBackend {
    match config.mode {
        OutputMode::Log => OutputBackend::Log(LogStrategy::default()),
        OutputMode::Jsonl => OutputBackend::Jsonl(JsonlStrategy::new(&config.path)),
        OutputMode::Udp => OutputBackend::Generic(GenericUdpStrategy::new(format!(
            "{}:{}",
            config.address, config.port
        ))),
    }
}
