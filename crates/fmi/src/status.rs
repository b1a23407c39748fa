use shuttle_core::Status;

/// Status code returned by a raw primitive of any generation.
///
/// `Pending` only occurs for asynchronous co-simulation steps, which the
/// master never requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RawStatus {
    #[default]
    Ok,
    Warning,
    Discard,
    Error,
    Fatal,
    Pending,
}

impl From<RawStatus> for Status {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Ok => Status::Success,
            RawStatus::Warning => Status::Warning,
            RawStatus::Discard | RawStatus::Error | RawStatus::Fatal | RawStatus::Pending => {
                Status::Fatal
            }
        }
    }
}

/// Maps a boolean primitive result (a null or non-null instance handle).
pub(crate) fn handle(created: bool) -> Status {
    if created { Status::Success } else { Status::Fatal }
}

/// Runs `next` only if `first` succeeded, returning the worse of the two.
pub(crate) fn chain(first: Status, next: impl FnOnce() -> Status) -> Status {
    if !first.is_ok() {
        return first;
    }
    match (first, next()) {
        (_, Status::Fatal) => Status::Fatal,
        (Status::Warning, _) | (_, Status::Warning) => Status::Warning,
        _ => Status::Success,
    }
}
