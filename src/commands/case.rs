use anyhow::Result;
use colored::Colorize;

use crate::models::status::{SUBMITTED_TO_WELFARE, SUBMITTED_TO_ZONAL};
use crate::models::{CaseId, CaseTypeId, StageCategory, UserId};
use crate::store::CaseStore;
use crate::workflow::TransitionAction;

use super::common::{print_transition, section, with_case_context, Workspace};

pub fn create(user: UserId, applicant: &str, case_type: Option<CaseTypeId>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let case = workspace.engine.create_case(&actor, case_type, applicant)?;
    println!(
        "{} Created case #{} (id {}) for {}",
        "✓".green().bold(),
        case.case_number,
        case.id,
        case.applicant_name.bold()
    );
    println!("  {:<16} {}", "Status:".dimmed(), case.status.cyan());
    println!("  {:<16} {}", "Version:".dimmed(), case.version);
    Ok(())
}

pub fn assign(user: UserId, case_id: CaseId, assignee: UserId, comment: Option<&str>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let result = workspace.engine.assign_case(case_id, assignee, &actor, comment);
    print_transition(&with_case_context(result, "assign", case_id)?);
    Ok(())
}

/// Stage category of the case, for routing to the specialized transitions
fn stage_category(workspace: &Workspace, case_id: CaseId) -> Result<(Option<StageCategory>, String)> {
    let case = workspace.engine.get_case(case_id)?;
    let data = workspace.store().snapshot()?;
    let category = case
        .current_workflow_stage_id
        .and_then(|id| data.stages.iter().find(|s| s.id == id))
        .map(|s| s.category());
    Ok((category, case.status))
}

pub fn approve(user: UserId, case_id: CaseId, comment: Option<&str>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let engine = &workspace.engine;
    let result = match stage_category(&workspace, case_id)? {
        (Some(StageCategory::Welfare), status) if status == SUBMITTED_TO_WELFARE => {
            engine.welfare_approve(case_id, &actor, comment)
        }
        (Some(StageCategory::Zonal), status) if status == SUBMITTED_TO_ZONAL => {
            engine.zonal_approve(case_id, &actor, comment)
        }
        _ => engine.apply_transition(case_id, &TransitionAction::Approve, &actor, comment),
    };
    print_transition(&with_case_context(result, "approve", case_id)?);
    Ok(())
}

pub fn reject(user: UserId, case_id: CaseId, comment: Option<&str>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let engine = &workspace.engine;
    let result = match stage_category(&workspace, case_id)? {
        (Some(StageCategory::Welfare), status) if status == SUBMITTED_TO_WELFARE => {
            engine.welfare_reject(case_id, &actor, comment)
        }
        (Some(StageCategory::Zonal), status) if status == SUBMITTED_TO_ZONAL => {
            engine.zonal_reject(case_id, &actor, comment)
        }
        _ => engine.apply_transition(case_id, &TransitionAction::Reject, &actor, comment),
    };
    print_transition(&with_case_context(result, "reject", case_id)?);
    Ok(())
}

/// Move a case to an administrator-defined status
pub fn move_to(
    user: UserId,
    case_id: CaseId,
    status: &str,
    comment: Option<&str>,
    expect_version: Option<u64>,
) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let action: TransitionAction = status.parse()?;
    let result = match expect_version {
        Some(version) => workspace
            .engine
            .apply_transition_at_version(case_id, version, &action, &actor, comment),
        None => workspace.engine.apply_transition(case_id, &action, &actor, comment),
    };
    print_transition(&with_case_context(result, "move", case_id)?);
    Ok(())
}

pub fn rework(user: UserId, case_id: CaseId, comment: Option<&str>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let result = workspace.engine.executive_rework(case_id, &actor, comment);
    print_transition(&with_case_context(result, "send back", case_id)?);
    Ok(())
}

pub fn forward_rework(user: UserId, case_id: CaseId, comment: Option<&str>) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let result = workspace.engine.forward_rework(case_id, &actor, comment);
    print_transition(&with_case_context(result, "forward rework for", case_id)?);
    Ok(())
}

pub fn checklist(user: UserId, case_id: CaseId, item_id: u64, answer: &str) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let progress = with_case_context(
        workspace
            .engine
            .record_checklist_response(case_id, item_id, answer, &actor),
        "record checklist answer for",
        case_id,
    )?;
    let shown = if progress.is_complete() {
        progress.to_string().green()
    } else {
        progress.to_string().yellow()
    };
    println!("{} Answer recorded; checklist {}", "✓".green().bold(), shown);
    Ok(())
}

pub fn show(case_id: CaseId) -> Result<()> {
    let workspace = Workspace::open()?;
    let case = workspace.engine.get_case(case_id)?;
    let data = workspace.store().snapshot()?;
    let stage = case
        .current_workflow_stage_id
        .and_then(|id| data.stages.iter().find(|s| s.id == id));

    section(&format!("Case #{}", case.case_number));
    println!("  {:<16} {}", "Applicant:".dimmed(), case.applicant_name.bold());
    println!("  {:<16} {}", "Status:".dimmed(), case.status.cyan());
    println!("  {:<16} {}", "Version:".dimmed(), case.version);
    match stage {
        Some(stage) => println!("  {:<16} {} ({})", "Stage:".dimmed(), stage.name, stage.id),
        None => println!("  {:<16} {}", "Stage:".dimmed(), "-".dimmed()),
    }
    if let Some(level) = case.current_executive_level {
        println!("  {:<16} {}", "Executive level:".dimmed(), level);
    }
    if let Some(level) = case.rework_requested_level {
        println!("  {:<16} {}", "Rework from:".dimmed(), format!("level {level}").yellow());
    }
    if let Some(assignee) = case.assignee_id {
        let name = data.users.get(&assignee).map(|u| u.name.as_str()).unwrap_or("?");
        println!("  {:<16} {} ({})", "Assignee:".dimmed(), name, assignee);
    }
    println!(
        "  {:<16} {}",
        "In stage since:".dimmed(),
        case.current_stage_entered_at.format("%Y-%m-%d %H:%M UTC")
    );

    if !case.workflow_history.is_empty() {
        section("Workflow");
        for entry in &case.workflow_history {
            println!(
                "  {}  {:<28} stage {:<4} by user {}",
                entry.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                entry.action,
                entry.stage_id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
                entry.actor_id
            );
        }
    }
    Ok(())
}

pub fn actions(user: UserId, case_id: CaseId) -> Result<()> {
    let workspace = Workspace::open()?;
    let actor = workspace.actor(user)?;
    let actions = workspace.engine.available_actions(case_id, &actor)?;
    if actions.is_empty() {
        println!("{}", "No actions available".dimmed());
        return Ok(());
    }
    for action in actions {
        println!("  {} {}", "•".cyan(), action);
    }
    Ok(())
}

pub fn history(case_id: CaseId) -> Result<()> {
    let workspace = Workspace::open()?;
    let entries = workspace.engine.history(case_id)?;
    for entry in entries {
        let from = entry.from_status.as_deref().unwrap_or("(new)");
        println!(
            "  {}  {} → {}  by user {}",
            entry.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            from,
            entry.to_status.cyan(),
            entry.actor_id
        );
        if let Some(comment) = entry.comment {
            println!("      {}", comment.italic());
        }
    }
    Ok(())
}
