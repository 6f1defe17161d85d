//! Decision tables for the gate
//!
//! Each stage is an ordered list of guard/action rules evaluated top to bottom;
//! the first matching guard wins and the stage default applies when none do.
//! No I/O happens here so every branch can be tested directly.

use super::GateMode;
use crate::token::Lsat;
use crate::types::InvoiceStatus;

/// A named guard and the action it selects
#[derive(Debug)]
pub struct Rule<F, A> {
    pub name: &'static str,
    pub guard: fn(&F) -> bool,
    pub action: A,
}

/// Evaluate rules in order, returning the first match or the default
pub fn first_match<F, A: Copy>(rules: &[Rule<F, A>], facts: &F, default: A) -> (&'static str, A) {
    rules
        .iter()
        .find(|rule| (rule.guard)(facts))
        .map(|rule| (rule.name, rule.action))
        .unwrap_or(("default", default))
}

/// What is known before talking to the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryFacts {
    pub token_present: bool,
    pub expired: bool,
    pub oauth: bool,
}

impl EntryFacts {
    /// Derive the facts from the parsed token, if any
    pub fn new(token: Option<&Lsat>, mode: GateMode) -> Self {
        Self {
            token_present: token.is_some(),
            expired: token.map(Lsat::is_expired).unwrap_or(false),
            oauth: mode.oauth,
        }
    }
}

/// First-stage action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Create an invoice and answer with a new challenge
    IssueChallenge,
    /// Caveats were verified upstream; grant without a lookup
    OauthPassThrough,
    /// Consult the node about the token's invoice
    LookupInvoice,
}

pub const ENTRY_RULES: &[Rule<EntryFacts, Entry>] = &[
    Rule {
        name: "missing_token",
        guard: |f| !f.token_present,
        action: Entry::IssueChallenge,
    },
    Rule {
        name: "expired_token",
        guard: |f| f.expired,
        action: Entry::IssueChallenge,
    },
    Rule {
        name: "oauth",
        guard: |f| f.oauth,
        action: Entry::OauthPassThrough,
    },
];

/// Select the first-stage action
pub fn entry(facts: &EntryFacts) -> (&'static str, Entry) {
    first_match(ENTRY_RULES, facts, Entry::LookupInvoice)
}

/// What is known once the invoice has been looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceFacts {
    pub has_preimage: bool,
    pub hodl: bool,
    pub status: InvoiceStatus,
}

/// Second-stage action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Let the request through
    Grant,
    /// Re-send the token with the invoice's payment request
    Rechallenge,
    /// Settled hodl invoice presented again
    RejectReplay,
    /// Settle the held invoice with the presented preimage, then grant
    Settle,
}

// Hodl + held + no preimage grants access while the payment is only locked.
// Kept as-is pending product review of what access means for hodl paywalls.
pub const INVOICE_RULES: &[Rule<InvoiceFacts, Resolution>] = &[
    Rule {
        name: "hodl_pending_hold",
        guard: |f| !f.has_preimage && f.hodl && f.status == InvoiceStatus::Held,
        action: Resolution::Grant,
    },
    Rule {
        name: "unpaid_without_preimage",
        guard: |f| !f.has_preimage && (!f.hodl || f.status == InvoiceStatus::Unpaid),
        action: Resolution::Rechallenge,
    },
    Rule {
        name: "hodl_replay",
        guard: |f| f.has_preimage && f.hodl && f.status == InvoiceStatus::Paid,
        action: Resolution::RejectReplay,
    },
    Rule {
        name: "hodl_settle",
        guard: |f| f.has_preimage && f.hodl && f.status == InvoiceStatus::Held,
        action: Resolution::Settle,
    },
];

/// Select the second-stage action
pub fn resolve(facts: &InvoiceFacts) -> (&'static str, Resolution) {
    first_match(INVOICE_RULES, facts, Resolution::Grant)
}

/// What is known when minting a challenge failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueFailureFacts {
    pub oauth: bool,
    pub has_auth_uri: bool,
}

/// Diagnosis of a failed challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueFailure {
    MissingAuthUri,
    InvoiceGeneration,
}

pub const ISSUE_FAILURE_RULES: &[Rule<IssueFailureFacts, IssueFailure>] = &[Rule {
    name: "oauth_missing_auth_uri",
    guard: |f| f.oauth && !f.has_auth_uri,
    action: IssueFailure::MissingAuthUri,
}];

/// Classify a failed challenge
pub fn diagnose_issue_failure(facts: &IssueFailureFacts) -> (&'static str, IssueFailure) {
    first_match(ISSUE_FAILURE_RULES, facts, IssueFailure::InvoiceGeneration)
}
