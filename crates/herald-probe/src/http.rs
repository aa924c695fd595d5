//! HTTP GET probe executor.

use tokio_util::sync::CancellationToken;

use crate::error::{ProbeError, Result};
use crate::kind::HttpProbeSpec;

/// Issue a single GET request. The body is fully drained and discarded so
/// keep-alive connections may be reused. One call produces one verdict; no
/// state is retained between invocations.
pub async fn run(spec: &HttpProbeSpec, cancel: CancellationToken) -> Result<()> {
    let client = reqwest::Client::new();
    let mut request = client.get(spec.url());
    for header in &spec.http_headers {
        request = request.header(header.name.as_str(), header.value.as_str());
    }

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        result = request.send() => result.map_err(|e| ProbeError::Transport(e.to_string()))?,
    };

    let status = response.status().as_u16();

    let body_result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        result = response.bytes() => result,
    };
    // Draining failures don't affect the verdict; only the status code does.
    let _ = body_result;

    if !spec.expected_status.contains(&status) {
        return Err(ProbeError::UnexpectedStatus {
            got: status,
            expected: spec.expected_status.clone(),
        });
    }

    Ok(())
}
