use super::OutputAdapter;
use anyhow::{Context, Result};
use api::{DrawCommand, RenderedFrame};
use log::{info, trace, warn};
use std::net::UdpSocket;
use std::time::{Duration, Instant};

/// Largest payload a single IPv4 UDP datagram can carry.
pub const MAX_DATAGRAM_BYTES: usize = 65_507;

/// Frames whose drawing did not change are resent this often so a receiver
/// started late still gets a picture.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(1);

/// Sends rendered frames as JSON datagrams, skipping frames that draw exactly
/// what the previous datagram drew.
pub struct GenericUdpStrategy {
    socket: Option<UdpSocket>,
    target_address: String,
    last_sent: Option<(String, Vec<DrawCommand>)>,
    last_sent_at: Option<Instant>,
    oversized: u64,
}

impl GenericUdpStrategy {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
            last_sent: None,
            last_sent_at: None,
            oversized: 0,
        }
    }

    fn unchanged(&self, frame: &RenderedFrame) -> bool {
        let fresh = self
            .last_sent_at
            .is_some_and(|at| at.elapsed() < KEEPALIVE_INTERVAL);
        fresh
            && self
                .last_sent
                .as_ref()
                .is_some_and(|(status, commands)| *status == frame.status && *commands == frame.commands)
    }
}

impl OutputAdapter for GenericUdpStrategy {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing Generic UDP Strategy...");
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        socket
            .connect(&self.target_address)
            .with_context(|| format!("Failed to connect to {}", self.target_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        self.socket = Some(socket);
        info!(
            "Generic UDP Strategy initialized. Target: {}",
            self.target_address
        );
        Ok(())
    }

    fn send(&mut self, frame: &RenderedFrame) -> Result<()> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };
        if self.unchanged(frame) {
            trace!("Frame {} unchanged, not sent", frame.sequence);
            return Ok(());
        }

        let payload = serde_json::to_vec(frame)?;
        if payload.len() > MAX_DATAGRAM_BYTES {
            self.oversized += 1;
            // one warning per run of oversized frames
            if self.oversized == 1 {
                warn!(
                    "Frame {} is {} bytes, over the {} byte datagram limit; dropping oversized frames",
                    frame.sequence,
                    payload.len(),
                    MAX_DATAGRAM_BYTES
                );
            }
            return Ok(());
        }
        if self.oversized > 0 {
            info!("Sending again after {} oversized frame(s)", self.oversized);
            self.oversized = 0;
        }

        socket.send(&payload)?;
        self.last_sent = Some((frame.status.clone(), frame.commands.clone()));
        self.last_sent_at = Some(Instant::now());
        Ok(())
    }
}
