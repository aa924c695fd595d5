//! gRPC standard health-check probe executor.

use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic_health::pb::health_check_response::ServingStatus;
use tonic_health::pb::health_client::HealthClient;
use tonic_health::pb::HealthCheckRequest;

use crate::error::{ProbeError, Result};
use crate::kind::GrpcProbeSpec;

/// Establish an insecure channel, blocking until ready, call the standard
/// health service, and close the connection regardless of outcome.
pub async fn run(spec: &GrpcProbeSpec, cancel: CancellationToken) -> Result<()> {
    let endpoint = Channel::from_shared(spec.endpoint())
        .map_err(|e| ProbeError::Transport(e.to_string()))?;

    let channel = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        result = endpoint.connect() => result.map_err(|e| ProbeError::Transport(e.to_string()))?,
    };

    let mut client = HealthClient::new(channel);
    let request = HealthCheckRequest {
        service: spec.service.clone().unwrap_or_default(),
    };

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
        result = client.check(request) => result.map_err(|e| ProbeError::Grpc(e.to_string()))?,
    };

    let status = response.into_inner().status;
    if status != ServingStatus::Serving as i32 {
        return Err(ProbeError::NotServing {
            service: spec.service.clone(),
            status: format!("{status}"),
        });
    }

    Ok(())
}
