//! Login, registration, and logout flows.

use crate::commands::AppContext;
use crate::models::user::{RegisterRequest, Session};
use anyhow::Result;

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    let response = ctx.api.login(&email, &password).await?;
    let session = Session {
        user_id: response.user_id,
        email: response.user_info.email.clone(),
    };
    ctx.sessions.save_session(&session).await?;
    let avatar = ctx.sessions.avatar_for(&session.user_id).await?;
    println!(
        "Signed in as {} (user {}, avatar {})",
        session.email, session.user_id, avatar
    );
    Ok(())
}

pub async fn register(
    ctx: &AppContext,
    email: String,
    first_name: String,
    last_name: String,
    password: String,
    city: String,
) -> Result<()> {
    let request = RegisterRequest {
        email,
        first_name,
        last_name,
        password,
        city,
    };
    let ack = ctx.api.register(&request).await?;
    if ack.message.is_empty() {
        println!("Registered — you can sign in now.");
    } else {
        println!("{}", ack.message);
    }
    Ok(())
}

/// Forget the session and wipe the mirror, as the app did on logout.
pub async fn logout(ctx: &AppContext) -> Result<()> {
    ctx.sessions.clear_session().await?;
    ctx.store.clear().await?;
    println!("Signed out; local mirror cleared.");
    Ok(())
}
