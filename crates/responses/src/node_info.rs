//! Application API `/node_info` response.
use serde::{Deserialize, Serialize};

use crate::{decode::Response, shape::Polymorphic, status::NodeInfo};

/// Build information of the application binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationVersion {
    pub name: String,
    pub server_name: String,
    pub client_name: String,
    pub version: String,
    pub commit: String,
    pub build_tags: String,
    pub go: String,
}

/// `/node_info` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationInfo {
    pub node_info: Polymorphic<NodeInfo>,
    pub application_version: ApplicationVersion,
}

impl Response for ApplicationInfo {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_version() {
        let body = r#"{
            "node_info": {"network": "cosmoshub-4", "moniker": "node", "protocol_version": "legacy"},
            "application_version": {"name": "gaia", "server_name": "gaiad", "version": "v9.1.0", "commit": "abc"}
        }"#;
        let info = ApplicationInfo::decode(body.as_bytes()).unwrap();
        assert_eq!(info.application_version.version, "v9.1.0");

        let node = info.node_info.known().unwrap();
        assert_eq!(node.network, "cosmoshub-4");
        assert_eq!(node.protocol_version.opaque(), Some(r#""legacy""#));
    }

    #[test]
    fn node_info_of_unexpected_shape_is_opaque() {
        let info = ApplicationInfo::decode(br#"{"node_info":[1,2]}"#).unwrap();
        assert_eq!(info.node_info.opaque(), Some("[1,2]"));
        assert_eq!(info.application_version, ApplicationVersion::default());
    }
}
