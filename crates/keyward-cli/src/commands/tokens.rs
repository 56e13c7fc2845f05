use anyhow::{Context, Result};
use keyward_auth::{RevokeOutcome, TokenService};
use serde_json::json;

use crate::output::{print_json, print_success};

pub async fn issue(
    service: &TokenService,
    subject: Option<&str>,
    username: Option<&str>,
) -> Result<()> {
    let pair = match (subject, username) {
        (Some(subject), _) => service
            .issue_for_subject(subject)
            .await
            .with_context(|| format!("cannot issue tokens for subject '{subject}'"))?,
        (None, Some(username)) => service
            .issue_for_username(username)
            .await
            .with_context(|| format!("cannot issue tokens for user '{username}'"))?,
        (None, None) => anyhow::bail!("either --subject or --username is required"),
    };

    print_json(&pair)?;
    print_success(&format!("Issued token pair for {}", pair.user_id));
    Ok(())
}

pub fn guest(service: &TokenService) -> Result<()> {
    let pair = service.guest_issue().context("cannot issue guest tokens")?;
    print_json(&pair)?;
    print_success(&format!("Issued guest token pair for {}", pair.user_id));
    Ok(())
}

pub async fn verify(service: &TokenService, token: &str) -> Result<()> {
    let claims = service.verify(token).await?;
    let permissions = service.permissions_for_claims(&claims);

    print_json(&json!({
        "claims": claims,
        "permissions": permissions.to_strings(),
    }))?;
    print_success(&format!("Token valid for {}", claims.sub));
    Ok(())
}

pub async fn rotate(service: &TokenService, refresh_token: &str) -> Result<()> {
    let pair = service.rotate(refresh_token).await?;
    print_json(&pair)?;
    print_success("Refresh token rotated; the old one is now revoked");
    Ok(())
}

pub async fn revoke(service: &TokenService, token: &str) -> Result<()> {
    match service.revoke(token).await? {
        RevokeOutcome::Revoked => print_success("Token revoked"),
        RevokeOutcome::AlreadyUnusable => {
            print_success("Token was already expired or revoked; nothing to do")
        }
    }
    Ok(())
}
