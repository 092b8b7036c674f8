//! Label derivation for one monitoring endpoint.
//!
//! Pure data transformation: one endpoint plus its system's group
//! memberships and network identity become one target label set. The joined
//! inputs are already validated upstream, so there is no failure path here.

use std::collections::BTreeMap;

use tracing::debug;

use crate::rpc::{EndpointInfo, NetworkInfo, SystemGroup};

pub const ADDRESS_LABEL: &str = "__address__";

pub const HOSTNAME_LABEL: &str = "__meta_uyuni_minion_hostname";
pub const SYSTEM_ID_LABEL: &str = "__meta_uyuni_system_id";
pub const GROUPS_LABEL: &str = "__meta_uyuni_groups";
pub const ENDPOINT_NAME_LABEL: &str = "__meta_uyuni_endpoint_name";
pub const EXPORTER_LABEL: &str = "__meta_uyuni_exporter";
pub const PROXY_MODULE_LABEL: &str = "__meta_uyuni_proxy_module";
pub const METRICS_PATH_LABEL: &str = "__meta_uyuni_metrics_path";

/// Sentinel used instead of an empty group list.
const NO_GROUP: &str = "No group";

/// Derive the label set for one endpoint. Hostname precedence: the primary
/// FQDN when non-empty, the plain hostname otherwise. The address carries
/// the port only when the endpoint specifies one (port > 0).
pub fn endpoint_labels(
    endpoint: &EndpointInfo,
    groups: &[SystemGroup],
    network: &NetworkInfo,
) -> BTreeMap<String, String> {
    let hostname = if network.primary_fqdn.is_empty() {
        network.hostname.as_str()
    } else {
        network.primary_fqdn.as_str()
    };
    let address = if endpoint.port > 0 {
        format!("{}:{}", hostname, endpoint.port)
    } else {
        hostname.to_string()
    };

    let mut labels = BTreeMap::new();
    labels.insert(ADDRESS_LABEL.to_string(), address);
    labels.insert(HOSTNAME_LABEL.to_string(), hostname.to_string());
    labels.insert(SYSTEM_ID_LABEL.to_string(), endpoint.system_id.to_string());
    labels.insert(GROUPS_LABEL.to_string(), group_names(groups).join(","));

    // Optional attributes: present only when the source value is non-empty.
    let optional = [
        (ENDPOINT_NAME_LABEL, &endpoint.endpoint_name),
        (EXPORTER_LABEL, &endpoint.exporter_name),
        (PROXY_MODULE_LABEL, &endpoint.module),
        (METRICS_PATH_LABEL, &endpoint.path),
    ];
    for (name, value) in optional {
        if !value.is_empty() {
            labels.insert(name.to_string(), value.clone());
        }
    }

    debug!(?labels, "Configured target");
    labels
}

/// Display names of the system's groups, in server order. A system in no
/// group gets the sentinel rather than an empty list.
fn group_names(groups: &[SystemGroup]) -> Vec<String> {
    if groups.is_empty() {
        return vec![NO_GROUP.to_string()];
    }
    groups.iter().map(|g| g.name.clone()).collect()
}
