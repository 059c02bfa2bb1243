use anyhow::Result;
use caseflow::commands::{case, catalog, diagnose, init, permissions, reconcile};

use super::types::{CaseCommands, CatalogCommands, Commands};

pub fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Init { catalog } => init::execute(catalog),
        Commands::Catalog { command } => match command {
            CatalogCommands::Import { path } => catalog::import(&path),
            CatalogCommands::Show => catalog::show(),
        },
        Commands::Case { command } => dispatch_case(command),
        Commands::Reconcile => reconcile::execute(),
        Commands::Diagnose { json } => diagnose::execute(json),
        Commands::Permissions { user, stage } => permissions::execute(user, stage),
    }
}

fn dispatch_case(command: CaseCommands) -> Result<()> {
    match command {
        CaseCommands::Create {
            user,
            applicant,
            case_type,
        } => case::create(user, &applicant, case_type),
        CaseCommands::Assign {
            user,
            case_id,
            assignee,
            comment,
        } => case::assign(user, case_id, assignee, comment.as_deref()),
        CaseCommands::Approve {
            user,
            case_id,
            comment,
        } => case::approve(user, case_id, comment.as_deref()),
        CaseCommands::Reject {
            user,
            case_id,
            comment,
        } => case::reject(user, case_id, comment.as_deref()),
        CaseCommands::Move {
            user,
            case_id,
            status,
            comment,
            expect_version,
        } => case::move_to(user, case_id, &status, comment.as_deref(), expect_version),
        CaseCommands::Rework {
            user,
            case_id,
            comment,
        } => case::rework(user, case_id, comment.as_deref()),
        CaseCommands::ForwardRework {
            user,
            case_id,
            comment,
        } => case::forward_rework(user, case_id, comment.as_deref()),
        CaseCommands::Checklist {
            user,
            case_id,
            item,
            answer,
        } => case::checklist(user, case_id, item, &answer),
        CaseCommands::Show { case_id } => case::show(case_id),
        CaseCommands::Actions { user, case_id } => case::actions(user, case_id),
        CaseCommands::History { case_id } => case::history(case_id),
    }
}
