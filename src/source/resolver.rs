//! Name to id resolution
//!
//! Every lookup goes to the cluster; nothing is cached between calls.

use crate::cohesity::client::CohesityClient;
use crate::cohesity::models::{ProtectionJob, ProtectionSource, ProtectionSourceNode, ENV_VMWARE};
use crate::error::{CohesityError, Result};

/// A display name and the identifier it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity<I> {
    pub name: String,
    pub id: I,
}

/// Result of resolving a vCenter and VMs under it.
///
/// `parent_id` is `None` when no registered vCenter matched; in that case
/// `sources` is always empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceResolution {
    pub parent_id: Option<i64>,
    pub sources: Vec<NamedEntity<i64>>,
    /// Requested child names with no match under the parent
    pub unresolved: Vec<String>,
}

impl SourceResolution {
    pub fn is_registered(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn source_ids(&self) -> Vec<i64> {
        self.sources.iter().map(|s| s.id).collect()
    }
}

/// Pick the root whose registration endpoint or display name equals `name`.
/// The first match in list order wins.
pub fn match_root(roots: &[ProtectionSourceNode], name: &str) -> Option<i64> {
    let mut matches = roots.iter().filter(|root| {
        root.endpoint() == Some(name) || root.protection_source.name == name
    });

    let first = matches.next()?;
    let extra = matches.count();
    if extra > 0 {
        tracing::warn!(
            "{} sources match {}, using the first one (id {})",
            extra + 1,
            name,
            first.protection_source.id
        );
    }
    Some(first.protection_source.id)
}

/// Split listed children into the requested ones and the requested names
/// nobody matched. Matches keep listing order and are deduplicated by id.
pub fn partition_children(
    requested: &[String],
    found: &[ProtectionSource],
) -> (Vec<NamedEntity<i64>>, Vec<String>) {
    let mut matched: Vec<NamedEntity<i64>> = Vec::new();
    for source in found {
        if requested.contains(&source.name) && !matched.iter().any(|m| m.id == source.id) {
            matched.push(NamedEntity {
                name: source.name.clone(),
                id: source.id,
            });
        }
    }

    let mut unresolved: Vec<String> = Vec::new();
    for name in requested {
        if !found.iter().any(|s| &s.name == name) && !unresolved.contains(name) {
            unresolved.push(name.clone());
        }
    }

    (matched, unresolved)
}

/// Resolve a vCenter by endpoint or name, then the named VMs under it.
///
/// A missing vCenter or missing VMs are reported in the returned value,
/// never as an error; only transport and API failures return `Err`.
pub async fn resolve_source(
    client: &CohesityClient,
    parent_name: &str,
    child_names: &[String],
) -> Result<SourceResolution> {
    tracing::info!("Fetching Vcenter and VM ids");

    let roots = client.list_root_sources(ENV_VMWARE).await?;
    let Some(parent_id) = match_root(&roots, parent_name) else {
        tracing::error!("Vcenter {} not available in the cluster", parent_name);
        return Ok(SourceResolution::default());
    };

    let vms = client.list_virtual_machines(parent_id, child_names).await?;
    let (sources, unresolved) = partition_children(child_names, &vms);

    if !unresolved.is_empty() {
        tracing::warn!(
            "Following list of vms '{}' are not available in vcenter, \
             please make sure the virtual machine names are correct",
            unresolved.join(",")
        );
    }

    Ok(SourceResolution {
        parent_id: Some(parent_id),
        sources,
        unresolved,
    })
}

/// Like [`resolve_source`], but a missing vCenter or an empty VM set is an
/// error
pub async fn require_sources(
    client: &CohesityClient,
    parent_name: &str,
    child_names: &[String],
) -> Result<(i64, Vec<NamedEntity<i64>>)> {
    let resolution = resolve_source(client, parent_name, child_names).await?;
    let Some(parent_id) = resolution.parent_id else {
        return Err(CohesityError::not_found("Vcenter", parent_name));
    };
    if resolution.sources.is_empty() {
        return Err(CohesityError::NoSources {
            vcenter: parent_name.to_string(),
            vms: child_names.join(","),
        });
    }
    Ok((parent_id, resolution.sources))
}

/// Resolve a storage domain by exact name
pub async fn storage_domain(client: &CohesityClient, name: &str) -> Result<NamedEntity<i64>> {
    tracing::info!("Getting storage domain with name {}", name);
    client
        .list_view_boxes(name)
        .await?
        .into_iter()
        .find(|b| b.name == name)
        .map(|b| NamedEntity { name: b.name, id: b.id })
        .ok_or_else(|| CohesityError::not_found("Storage domain", name))
}

/// Resolve a protection policy by exact name
pub async fn policy(client: &CohesityClient, name: &str) -> Result<NamedEntity<String>> {
    tracing::info!("Getting policy with name {}", name);
    client
        .list_protection_policies(name)
        .await?
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| NamedEntity { name: p.name, id: p.id })
        .ok_or_else(|| CohesityError::not_found("Policy", name))
}

/// Keep the single job named exactly `name`
pub fn select_job(jobs: Vec<ProtectionJob>, name: &str) -> Result<ProtectionJob> {
    let mut matching: Vec<ProtectionJob> = jobs
        .into_iter()
        .filter(|j| j.name == name && j.is_deleted != Some(true))
        .collect();

    match matching.len() {
        0 => Err(CohesityError::not_found("Job", name)),
        1 => Ok(matching.remove(0)),
        count => Err(CohesityError::Ambiguous {
            name: name.to_string(),
            count,
        }),
    }
}

/// Non-deleted job named exactly `name`, with its id
pub async fn find_job(client: &CohesityClient, name: &str) -> Result<(i64, ProtectionJob)> {
    tracing::info!("Getting protection job with name {}", name);
    let job = select_job(client.list_jobs(name).await?, name)?;
    let id = job
        .id
        .ok_or_else(|| CohesityError::Parse(format!("Job {} has no id", name)))?;
    Ok((id, job))
}
