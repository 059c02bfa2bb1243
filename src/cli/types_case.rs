//! Case-related CLI command types

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CaseCommands {
    /// Open a new case in the first stage
    Create {
        /// Acting user ID
        #[arg(short, long)]
        user: u64,

        /// Applicant's name
        applicant: String,

        /// Case type, for type-specific stages
        #[arg(long = "type")]
        case_type: Option<u64>,
    },

    /// Assign a case to a caseworker
    Assign {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        /// User ID of the caseworker
        assignee: u64,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Approve a case at its current stage
    Approve {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Reject a case back to assignment (comment usually required)
    Reject {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Move a case to a named status; the stage follows the status
    Move {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        /// Target status
        status: String,

        #[arg(short, long)]
        comment: Option<String>,

        /// Refuse the move unless the case is still at this version
        #[arg(long)]
        expect_version: Option<u64>,
    },

    /// Send an executive-stage case back to welfare for rework
    Rework {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Forward a welfare rework case to the caseworker
    ForwardRework {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        #[arg(short, long)]
        comment: Option<String>,
    },

    /// Answer a checklist item
    Checklist {
        #[arg(short, long)]
        user: u64,

        case_id: u64,

        /// Checklist item ID
        item: u64,

        answer: String,
    },

    /// Show a case with its workflow trail
    Show { case_id: u64 },

    /// List actions the user may take on a case
    Actions {
        #[arg(short, long)]
        user: u64,

        case_id: u64,
    },

    /// Show the status history of a case
    History { case_id: u64 },
}
