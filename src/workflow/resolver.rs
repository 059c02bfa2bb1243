//! Stage resolution
//!
//! Maps a target status to a concrete stage through an ordered list of
//! rules, each a pure function of the status and the lookup context. The
//! first rule yielding a stage wins; `None` from every rule means the catalog
//! has no active stages at all, and callers keep the case's prior stage.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::catalog::StageCatalog;
use crate::models::{CaseTypeId, StageId, WorkflowStage};

/// Inputs shared by every resolution rule
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub catalog: &'a StageCatalog,
    pub case_type_id: Option<CaseTypeId>,
    pub current_stage_id: Option<StageId>,
}

pub type ResolveRule = fn(&str, &ResolveContext<'_>) -> Option<StageId>;

/// Resolution rules in priority order
pub const RESOLUTION_RULES: &[(&str, ResolveRule)] = &[
    ("membership", by_membership),
    ("pattern", by_pattern),
    ("sequential", by_sequence),
    ("first-stage", by_first_stage),
];

/// Status-name patterns for catalogs whose stages have no configured
/// status sets. Each maps to candidate stage-key fragments, tried in order.
const STATUS_PATTERNS: &[(&str, &[&str])] = &[
    (r"^(assigned|rework_required)$|_rejected$", &["assign"]),
    (r"^submitted_to_executive(_\d+)?$", &["executive", "approval"]),
    (r"^executive_", &["executive"]),
    (r"^(submitted_to_)?finance|disburse", &["finance", "disbursement"]),
    (r"^(submitted_to_)?zonal", &["zonal"]),
    (r"^(submitted_to_)?welfare", &["welfare"]),
    (r"^(in_)?counsel", &["counsel"]),
    (r"^draft$", &["draft"]),
];

static COMPILED_PATTERNS: LazyLock<Vec<(Regex, &'static [&'static str])>> =
    LazyLock::new(|| {
        STATUS_PATTERNS
            .iter()
            .filter_map(|(pattern, fragments)| Regex::new(pattern).ok().map(|re| (re, *fragments)))
            .collect()
    });

/// Resolve the stage a case with `status` belongs in.
pub fn resolve_stage_for_status(status: &str, ctx: &ResolveContext<'_>) -> Option<StageId> {
    for (name, rule) in RESOLUTION_RULES {
        if let Some(stage_id) = rule(status, ctx) {
            debug!(status, rule = *name, stage_id, "resolved stage for status");
            return Some(stage_id);
        }
    }
    debug!(status, "no stage resolvable; catalog has no active stages");
    None
}

/// Active stage listing `status`, type-specific before generic, then by order
pub fn by_membership(status: &str, ctx: &ResolveContext<'_>) -> Option<StageId> {
    ctx.catalog
        .active_stages_for(ctx.case_type_id)
        .into_iter()
        .filter(|s| s.has_status(status))
        .min_by_key(|s| (!s.is_type_specific(), s.sort_order, s.id))
        .map(|s| s.id)
}

/// Legacy fallback via the status-name pattern table
pub fn by_pattern(status: &str, ctx: &ResolveContext<'_>) -> Option<StageId> {
    COMPILED_PATTERNS
        .iter()
        .filter(|(re, _)| re.is_match(status))
        .flat_map(|(_, fragments)| fragments.iter())
        .find_map(|fragment| ctx.catalog.find_by_key(fragment, ctx.case_type_id))
        .map(|s| s.id)
}

/// Next stage by `sort_order` after the current one
pub fn by_sequence(_status: &str, ctx: &ResolveContext<'_>) -> Option<StageId> {
    let current = ctx.catalog.stage(ctx.current_stage_id?)?;
    next_in_sequence(ctx.catalog, current, ctx.case_type_id).map(|s| s.id)
}

/// First active stage, for initial or unset state
pub fn by_first_stage(_status: &str, ctx: &ResolveContext<'_>) -> Option<StageId> {
    ctx.catalog.first_stage(ctx.case_type_id).map(|s| s.id)
}

/// Active stage following `current` in the default linear path
pub fn next_in_sequence<'a>(
    catalog: &'a StageCatalog,
    current: &WorkflowStage,
    case_type_id: Option<CaseTypeId>,
) -> Option<&'a WorkflowStage> {
    catalog
        .active_stages_for(case_type_id)
        .into_iter()
        .find(|s| (s.sort_order, s.id) > (current.sort_order, current.id))
}

/// Successor for an approval: the explicit `next_stage_id` when it is still
/// active and applies to the case type, else the next stage in order.
pub fn successor<'a>(
    catalog: &'a StageCatalog,
    current: &WorkflowStage,
    case_type_id: Option<CaseTypeId>,
) -> Option<&'a WorkflowStage> {
    if let Some(next_id) = current.next_stage_id {
        match catalog.stage(next_id) {
            Some(next) if next.is_active && next.applies_to(case_type_id) => return Some(next),
            _ => debug!(
                stage_id = current.id,
                next_stage_id = next_id,
                "explicit successor unusable; falling back to sort order"
            ),
        }
    }
    next_in_sequence(catalog, current, case_type_id)
}
