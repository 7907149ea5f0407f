//! Bulk user decoration lookup.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::cli::table::{list_table, render_list};
use crate::domain::models::{Config, DecorationId, LiveUser, UserId};
use crate::domain::ports::UserRegistry;
use crate::services::DecorEvent;

#[derive(Args, Debug)]
pub struct UsersArgs {
    /// User ids to look up; all of them go out in one batched request
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UserDecorationOutput {
    pub user_id: String,
    pub decoration: Option<String>,
    pub animated: bool,
    pub image_url: Option<String>,
}

impl UserDecorationOutput {
    fn new(user_id: &UserId, decoration: Option<&DecorationId>, cdn_url: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            decoration: decoration.map(ToString::to_string),
            animated: decoration.is_some_and(DecorationId::is_animated),
            image_url: decoration
                .map(|d| format!("{}/{}.png", cdn_url.trim_end_matches('/'), d.hash())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersOutput {
    pub users: Vec<UserDecorationOutput>,
    pub batches: u64,
    pub updated_live_users: usize,
}

impl CommandOutput for UsersOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["user", "decoration", "image"]);
        for user in &self.users {
            table.add_row(vec![
                user.user_id.clone(),
                user.decoration.clone().unwrap_or_else(|| "-".to_string()),
                user.image_url.clone().unwrap_or_default(),
            ]);
        }
        render_list("user", &table, self.users.len())
    }
}

pub async fn execute(args: UsersArgs, config: Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::new(config)?;

    // Unique ids in argument order
    let mut ids: Vec<UserId> = Vec::with_capacity(args.ids.len());
    for id in args.ids {
        let id = UserId::new(id);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    for id in &ids {
        ctx.registry.upsert_user(LiveUser::new(id.clone(), id.to_string()));
    }
    let mut events = ctx.bus.subscribe();

    let resolved = ctx
        .users
        .resolve_many(&ids)
        .await
        .context("Failed to look up user decorations")?;

    let updated_live_users = count_user_updates(&mut events);

    let batches = ctx.users.batches().borrow().as_ref().map_or(0, |b| b.sequence);
    let out = UsersOutput {
        users: ids
            .iter()
            .map(|id| {
                let decoration = resolved.get(id).and_then(Option::as_ref);
                UserDecorationOutput::new(id, decoration, &ctx.config.api.cdn_url)
            })
            .collect(),
        batches,
        updated_live_users,
    };
    output(&out, json_mode);

    Ok(())
}

/// Drain `events`, counting user updates including any the receiver lagged behind on
fn count_user_updates(events: &mut broadcast::Receiver<DecorEvent>) -> usize {
    let mut count = 0;
    loop {
        match events.try_recv() {
            Ok(event) if event.payload.kind() == "USER_UPDATE" => count += 1,
            Ok(_) => {}
            Err(TryRecvError::Lagged(missed)) => {
                count += usize::try_from(missed).unwrap_or(usize::MAX);
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return count,
        }
    }
}
