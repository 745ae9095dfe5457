use crate::checker::reconcile::AnnotationSet;

/// Where a document's check cycle currently stands. The session lives as
/// long as the document is open; there is no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Checking,
    Annotated,
    Failed,
}

/// Handle for one in-flight check. Results are only accepted if the
/// ticket's version still matches the session, which is how superseded
/// requests get dropped without any cancellation machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckTicket {
    version: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// The ticket was superseded by a newer check or an edit; the result
    /// was silently dropped.
    Stale,
}

/// Per-document check state machine: `Idle -> Checking -> {Annotated,
/// Failed}`, with last-write-wins semantics for check results.
///
/// The debounce timer that decides when to call [`begin_check`] belongs to
/// the embedding UI, not to this type. All transitions happen on a single
/// owner; there is no shared mutable state.
///
/// [`begin_check`]: CheckSession::begin_check
#[derive(Debug, Default)]
pub struct CheckSession {
    version: u64,
    state: SessionState,
    annotations: Option<AnnotationSet>,
    failure: Option<String>,
}

impl CheckSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The committed annotation set, if any.
    pub fn annotations(&self) -> Option<&AnnotationSet> {
        self.annotations.as_ref()
    }

    /// The failure message, when in `Failed`.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Start a new check for the current text. Any outstanding ticket is
    /// superseded immediately; its eventual result will commit as `Stale`.
    pub fn begin_check(&mut self) -> CheckTicket {
        self.version += 1;
        self.state = SessionState::Checking;
        self.failure = None;
        CheckTicket {
            version: self.version,
        }
    }

    /// Commit the result of a finished check. Only the most recently
    /// initiated check may commit; anything older is dropped.
    pub fn commit(&mut self, ticket: CheckTicket, annotations: AnnotationSet) -> CommitOutcome {
        if ticket.version != self.version {
            return CommitOutcome::Stale;
        }
        self.state = SessionState::Annotated;
        self.annotations = Some(annotations);
        self.failure = None;
        CommitOutcome::Committed
    }

    /// Record a failed check. Same staleness guard as [`commit`].
    ///
    /// [`commit`]: CheckSession::commit
    pub fn fail(&mut self, ticket: CheckTicket, message: impl Into<String>) -> CommitOutcome {
        if ticket.version != self.version {
            return CommitOutcome::Stale;
        }
        self.state = SessionState::Failed;
        self.failure = Some(message.into());
        CommitOutcome::Committed
    }

    /// Manual retry from `Failed`. Returns `None` in any other state.
    pub fn retry(&mut self) -> Option<CheckTicket> {
        if self.state != SessionState::Failed {
            return None;
        }
        Some(self.begin_check())
    }

    /// The document text changed (including via an applied fix): pending
    /// annotations carry stale offsets, so they are dropped and any
    /// outstanding ticket is invalidated. The caller re-checks once its
    /// debounce window elapses.
    pub fn edited(&mut self) {
        self.version += 1;
        self.state = SessionState::Idle;
        self.annotations = None;
        self.failure = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::reconcile::reconcile;
    use crate::{Category, CorrectionError, Span};

    fn set_for(text: &str, start: i64, end: i64) -> AnnotationSet {
        reconcile(
            text,
            &[CorrectionError {
                span: Span { start, end },
                category: Category::Grammar,
                rule: "TEST".to_string(),
                original: String::new(),
                suggestion: "x".to_string(),
                message: String::new(),
            }],
        )
    }

    #[test]
    fn commit_flows_idle_to_annotated() {
        let mut session = CheckSession::new();
        assert_eq!(session.state(), SessionState::Idle);

        let ticket = session.begin_check();
        assert_eq!(session.state(), SessionState::Checking);

        let outcome = session.commit(ticket, set_for("some text", 0, 4));
        assert_eq!(outcome, CommitOutcome::Committed);
        assert_eq!(session.state(), SessionState::Annotated);
        assert_eq!(session.annotations().unwrap().len(), 1);
    }

    #[test]
    fn stale_result_does_not_overwrite_newer_commit() {
        let mut session = CheckSession::new();

        // Check initiated for T1, then the text changes and a newer check
        // for T2 commits first.
        let old = session.begin_check();
        let new = session.begin_check();

        assert_eq!(
            session.commit(new, set_for("new text", 0, 3)),
            CommitOutcome::Committed
        );
        let committed = session.annotations().unwrap().entries()[0].span;

        // The delayed T1 response arrives afterwards and must be ignored.
        assert_eq!(
            session.commit(old, set_for("old text", 4, 8)),
            CommitOutcome::Stale
        );
        assert_eq!(session.state(), SessionState::Annotated);
        assert_eq!(session.annotations().unwrap().entries()[0].span, committed);
    }

    #[test]
    fn stale_result_is_dropped_even_before_newer_commit() {
        let mut session = CheckSession::new();
        let old = session.begin_check();
        let _new = session.begin_check();

        assert_eq!(
            session.commit(old, set_for("text", 0, 4)),
            CommitOutcome::Stale
        );
        assert_eq!(session.state(), SessionState::Checking);
        assert!(session.annotations().is_none());
    }

    #[test]
    fn edit_invalidates_outstanding_ticket_and_clears_annotations() {
        let mut session = CheckSession::new();
        let ticket = session.begin_check();
        session.commit(ticket, set_for("text", 0, 4));

        let outstanding = session.begin_check();
        session.edited();

        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.annotations().is_none());
        assert_eq!(
            session.commit(outstanding, set_for("text", 0, 4)),
            CommitOutcome::Stale
        );
    }

    #[test]
    fn failure_and_manual_retry() {
        let mut session = CheckSession::new();
        let ticket = session.begin_check();

        assert_eq!(
            session.fail(ticket, "service unavailable"),
            CommitOutcome::Committed
        );
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.failure(), Some("service unavailable"));

        let retry = session.retry().expect("retry from Failed");
        assert_eq!(session.state(), SessionState::Checking);
        assert!(session.failure().is_none());

        session.commit(retry, set_for("text", 0, 4));
        assert_eq!(session.state(), SessionState::Annotated);
    }

    #[test]
    fn retry_outside_failed_is_refused() {
        let mut session = CheckSession::new();
        assert!(session.retry().is_none());
        session.begin_check();
        assert!(session.retry().is_none());
    }

    #[test]
    fn stale_failure_does_not_disturb_newer_check() {
        let mut session = CheckSession::new();
        let old = session.begin_check();
        let new = session.begin_check();

        assert_eq!(session.fail(old, "timeout"), CommitOutcome::Stale);
        assert_eq!(session.state(), SessionState::Checking);

        assert_eq!(
            session.commit(new, set_for("text", 0, 4)),
            CommitOutcome::Committed
        );
    }
}
