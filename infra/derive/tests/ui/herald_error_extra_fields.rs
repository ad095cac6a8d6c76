use herald_derive::herald_error;
use std::borrow::Cow;

// A variant carrying more than `source` and `context` gets no `From` impl,
// so it must be built explicitly.
#[herald_error]
pub enum DemoError {
    #[error("Step {step} failed{}: {source}", format_context(.context))]
    Step { step: usize, source: std::io::Error, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = DemoError::Step { step: 3, source: std::io::Error::other("boom"), context: None };
    assert_eq!(err.to_string(), "Step 3 failed: boom");
}
