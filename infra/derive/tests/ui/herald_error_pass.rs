use herald_derive::herald_error;
use std::borrow::Cow;

#[herald_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid value{}: {message}", format_context(.context))]
    Invalid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn open() -> Result<(), DemoError> {
    let io: Result<(), std::io::Error> = Err(std::io::Error::other("boom"));
    io.context("opening the demo file")
}

fn convert() -> Result<(), DemoError> {
    Err::<(), _>(std::io::Error::other("boom"))?;
    Ok(())
}

fn main() {
    let err = open().unwrap_err();
    assert_eq!(err.to_string(), "IO error (opening the demo file): boom");

    let err = convert().context("converting").unwrap_err();
    assert!(matches!(err, DemoError::Io { context: Some(_), .. }));

    let invalid: Result<(), DemoError> =
        Err(DemoError::Invalid { message: "bad".into(), context: None });
    assert_eq!(invalid.context("parsing").unwrap_err().to_string(), "Invalid value (parsing): bad");
}
