//! Request vocabulary shared by the client pipeline and the metrics recorder

use serde::{Deserialize, Serialize};

use crate::impl_domain_str_conversions;

/// HTTP methods supported by the decorated client and the OAuth1 signer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl_domain_str_conversions!(HttpMethod {
    Get => "GET",
    Post => "POST",
    Put => "PUT",
    Delete => "DELETE",
});

/// Coarse API bucket used to group call metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiCategory {
    Configuration,
    Instance,
    User,
    Other,
}

impl_domain_str_conversions!(ApiCategory {
    Configuration => "configuration",
    Instance => "instance",
    User => "user",
    Other => "other",
});

impl ApiCategory {
    /// Every category, default last.
    pub const ALL: [Self; 4] = [Self::Configuration, Self::Instance, Self::User, Self::Other];

    /// Resolve the category of a request path.
    ///
    /// Pure function of the path segments: an `instance` segment wins over a
    /// `configuration` segment (instances are nested under configurations),
    /// `user`/`users` segments map to the user API, anything else falls back
    /// to [`ApiCategory::Other`]. Query strings are ignored.
    pub fn from_path(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        let mut category = Self::Other;

        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment {
                "instance" | "instances" => return Self::Instance,
                "configuration" | "configurations" => category = Self::Configuration,
                "user" | "users" if category == Self::Other => category = Self::User,
                _ => {}
            }
        }

        category
    }
}
