//! Network permission merging.

use std::collections::BTreeSet;

use weft_types::NetworkPermissions;

use crate::Result;
use crate::lines::json_objects;

/// Union the imported `allowed` domains into the main workflow's policy.
///
/// The result is deduplicated and sorted, so it does not depend on import
/// order. The firewall setting always comes from `top`. With no imports
/// `top`'s domains are still sorted and deduplicated, so the result equals
/// `top` only when its list was already in that form.
pub fn merge_network_permissions(
    top: Option<&NetworkPermissions>,
    imported: &str,
) -> Result<NetworkPermissions> {
    let mut allowed: BTreeSet<String> = top
        .map(|n| n.allowed.iter().cloned().collect())
        .unwrap_or_default();

    for line in json_objects(imported, "network") {
        let network: NetworkPermissions = match serde_json::from_value(line.into()) {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed network import");
                continue;
            }
        };
        allowed.extend(network.allowed);
    }

    Ok(NetworkPermissions {
        allowed: allowed.into_iter().collect(),
        firewall: top.and_then(|n| n.firewall.clone()),
    })
}
