//! Protection source registration

use crate::cohesity::client::CohesityClient;
use crate::cohesity::models::{RegisterSourceRequest, ENV_VMWARE};
use crate::error::{CohesityError, Result};

/// Register a VMware vCenter with the cluster
pub async fn register_vcenter(
    client: &CohesityClient,
    vcenter: &str,
    username: &str,
    password: &str,
) -> Result<String> {
    let existing = client.list_root_sources(ENV_VMWARE).await?;
    if existing.iter().any(|s| s.endpoint() == Some(vcenter)) {
        return Err(CohesityError::already_exists("Source", vcenter));
    }

    let body = RegisterSourceRequest {
        endpoint: vcenter,
        environment: ENV_VMWARE,
        username,
        password,
        vmware_type: "kVCenter",
    };
    tracing::info!("Registering Vcenter {}", vcenter);
    client.register_source(&body).await?;

    Ok(format!("Successfully registered Vcenter {}", vcenter))
}
