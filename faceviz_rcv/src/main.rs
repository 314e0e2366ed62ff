use anyhow::{Context, Result};
use api::{DrawCommand, RenderedFrame};
use log::{debug, error, info, warn};
use std::net::UdpSocket;

fn summarize(frame: &RenderedFrame) {
    println!(
        "Frame {} ({}x{}) status '{}': {} face(s)",
        frame.sequence, frame.width, frame.height, frame.status, frame.faces_drawn
    );
    for command in &frame.commands {
        if let DrawCommand::DrawText { text, origin, .. } = command {
            println!("  text at ({:.0}, {:.0}):", origin.x, origin.y);
            for line in text.lines() {
                println!("    {}", line);
            }
        }
    }
}

fn main() -> Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let port: u16 = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("Invalid port '{}'", arg))?,
        None => 9100,
    };
    let addr = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;

    info!("Listening for rendered frames on {}...", addr);

    let mut buf = [0u8; 65535]; // Max UDP size
    let mut last_frame: Option<RenderedFrame> = None;

    loop {
        match socket.recv_from(&mut buf) {
            Ok((amt, src)) => {
                debug!("Received {} bytes from {}", amt, src);
                let slice = &buf[..amt];

                match serde_json::from_slice::<RenderedFrame>(slice) {
                    Ok(frame) => {
                        // the sequence always changes, compare what is drawn
                        let changed = last_frame.as_ref().map_or(true, |last| {
                            last.status != frame.status || last.commands != frame.commands
                        });
                        if changed {
                            summarize(&frame);
                            last_frame = Some(frame);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", src, e);
                        if let Ok(s) = std::str::from_utf8(slice) {
                            debug!("Raw data: {}", s);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error receiving data: {}", e);
            }
        }
    }
}
