use anyhow::Result;
use keyward_auth::{AuthorizationResolver, Role};
use serde_json::json;

use crate::output::print_json;

pub fn permissions(resolver: &AuthorizationResolver, role: &str) -> Result<()> {
    if Role::parse(role).is_none() {
        tracing::warn!(role = %role, "Unknown role; no permissions granted");
    }

    let permissions = resolver.permissions_for(role);
    print_json(&json!({
        "role": role,
        "permissions": permissions.to_strings(),
    }))
}
