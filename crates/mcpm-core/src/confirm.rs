//! Confirmation capability injected into store operations.
//!
//! Stores never talk to the terminal. Destructive operations that are not
//! forced ask a [`Confirmer`]; frontends supply an interactive one and tests
//! supply a fixed answer.

/// Yes/no decision source.
pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers every prompt with the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl FixedAnswer {
    pub const YES: FixedAnswer = FixedAnswer(true);
    pub const NO: FixedAnswer = FixedAnswer(false);
}

impl Confirmer for FixedAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "auto-answered confirmation");
        self.0
    }
}

impl<F> Confirmer for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
