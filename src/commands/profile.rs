//! Profile, password, and avatar flows.

use crate::commands::{AppContext, require_session};
use crate::models::user::{Avatar, ProfileUpdate};
use anyhow::Result;

pub async fn show(ctx: &AppContext) -> Result<()> {
    let session = require_session(ctx).await?;
    let info = ctx.api.fetch_user(&session.user_id).await?;
    let avatar = ctx.sessions.avatar_for(&session.user_id).await?;
    println!("{} {}", info.first_name, info.last_name);
    println!("  email:  {}", info.email);
    println!("  phone:  {}", info.phone.as_deref().unwrap_or("-"));
    println!("  city:   {}", info.city.as_deref().unwrap_or("-"));
    println!("  avatar: {}", avatar);
    Ok(())
}

pub async fn update(
    ctx: &AppContext,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    city: Option<String>,
) -> Result<()> {
    let session = require_session(ctx).await?;
    let update = ProfileUpdate {
        first_name,
        last_name,
        phone,
        city,
        ..ProfileUpdate::default()
    };
    ctx.api.update_user(&session.user_id, &update).await?;
    println!("Details updated.");
    Ok(())
}

/// The auth service takes password changes through the same update
/// endpoint as profile edits.
pub async fn password(ctx: &AppContext, new_password: String) -> Result<()> {
    let session = require_session(ctx).await?;
    let update = ProfileUpdate {
        password: Some(new_password),
        ..ProfileUpdate::default()
    };
    ctx.api.update_user(&session.user_id, &update).await?;
    println!("Password changed.");
    Ok(())
}

pub async fn avatar_show(ctx: &AppContext) -> Result<()> {
    let session = require_session(ctx).await?;
    let avatar = ctx.sessions.avatar_for(&session.user_id).await?;
    println!("{}", avatar);
    Ok(())
}

pub async fn avatar_set(ctx: &AppContext, id: String) -> Result<()> {
    let session = require_session(ctx).await?;
    let avatar: Avatar = id.parse().map_err(anyhow::Error::msg)?;
    ctx.sessions.set_avatar(&session.user_id, avatar).await?;
    println!("Avatar set to {}.", avatar);
    Ok(())
}
