use anyhow::Result;
use colored::Colorize;

use crate::catalog::StageCatalog;
use crate::errors::WorkflowError;
use crate::models::{StageAction, StageId, UserContext, UserId};
use crate::store::CaseStore;
use crate::workflow::PermissionResolver;

use super::common::{section, Workspace};

/// Print the effective permission set of `user_id` on `stage_id`.
pub fn execute(user_id: UserId, stage_id: StageId) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user_id)?;
    let data = workspace.store().snapshot()?;
    let catalog = StageCatalog::new(
        data.stages,
        data.executive_levels,
        data.role_permissions,
        data.user_permissions,
    );
    let stage = catalog
        .stage(stage_id)
        .ok_or_else(|| WorkflowError::not_found(format!("stage {stage_id}")))?;
    let user = UserContext::resolve(&actor, data.users.get(&user_id));
    let resolver = PermissionResolver::new(&catalog, &workspace.config.roles.superuser);
    let set = resolver.effective_permissions(&user, stage);

    section(&format!("User {} on '{}'", user_id, stage.name));
    println!("  {:<16} {}", "Roles:".dimmed(), user.roles.join(", "));
    for action in StageAction::ALL {
        print_flag(&action.to_string(), set.allows(action));
    }
    println!();
    print_flag("create case here", resolver.can_create_case_in_stage(&user, stage));
    print_flag("fill case here", resolver.can_fill_case_in_stage(&user, stage));
    Ok(())
}

fn print_flag(label: &str, allowed: bool) {
    let mark = if allowed { "✓".green() } else { "✗".red() };
    println!("  {} {}", mark, label);
}
