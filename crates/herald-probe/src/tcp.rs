//! TCP connect probe executor.

use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, Result};
use crate::kind::TcpProbeSpec;

/// Dial TCP; success iff connect completes before cancellation. The
/// connection is closed immediately on success.
pub async fn run(spec: &TcpProbeSpec, cancel: CancellationToken) -> Result<()> {
    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        result = TcpStream::connect(spec.address()) => {
            result.map_err(|e| ProbeError::Transport(e.to_string()))?
        }
    };
    drop(stream);
    Ok(())
}
