use crate::domain::model::GatewayPair;
use crate::domain::settings::Gateways;

pub const IPFS_SCHEME: &str = "ipfs://";

impl Gateways {
    /// Rewrites an `ipfs://` link into its generic and service gateway forms.
    /// Anything else, placeholders included, passes through unchanged in both slots.
    pub fn convert(&self, uri: &str) -> GatewayPair {
        match uri.strip_prefix(IPFS_SCHEME) {
            Some(cid) => GatewayPair {
                generic: join_gateway(&self.generic, cid),
                service: join_gateway(&self.service, cid),
            },
            None => GatewayPair {
                generic: uri.to_string(),
                service: uri.to_string(),
            },
        }
    }

    /// Candidate HTTP locations for fetching `uri`, in the order they should be tried.
    pub fn fetch_candidates(&self, uri: &str) -> Vec<String> {
        let pair = self.convert(uri);
        if pair.generic == pair.service {
            vec![pair.generic]
        } else {
            vec![pair.generic, pair.service]
        }
    }
}

impl GatewayPair {
    /// Both forms of `uri` under the default public gateways.
    pub fn from_uri(uri: &str) -> Self {
        Gateways::default().convert(uri)
    }
}

fn join_gateway(base: &str, cid: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), cid.trim_start_matches('/'))
}

pub fn is_content_addressed(uri: &str) -> bool {
    uri.starts_with(IPFS_SCHEME)
}
