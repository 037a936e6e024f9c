use std::fmt;

/// Ownership level of a resource, used as the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteType {
    Accounts,
    Zones,
}

impl RouteType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Zones => "zones",
        }
    }

    /// Path of the owner itself, e.g. `/zones/{id}`
    pub fn path(&self, id: &str) -> String {
        format!("/{}/{id}", self.as_str())
    }

    /// Path of a sub-resource, e.g. `/zones/{id}/dns_records`
    pub fn resource_path(&self, id: &str, resource: &str) -> String {
        format!("{}/{}", self.path(id), resource.trim_start_matches('/'))
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write methods may change server state, so a retry is not guaranteed to be
/// harmless.
pub fn is_write_method(method: &reqwest::Method) -> bool {
    method != reqwest::Method::GET && method != reqwest::Method::HEAD
}
