/// The class of a completion failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No credential is available; no request was attempted.
    Unconfigured,
    /// The remote service rejected the configured credential.
    Unauthorized,
    /// The remote service is throttling requests. The caller may retry
    /// later; providers never retry on their own.
    RateLimited,
    /// Any other non-success outcome reported by the remote service.
    Remote,
    /// A connection-level failure (timeout, DNS, reset).
    Transport,
}

impl ErrorKind {
    /// Returns the one-line notice shown to the end user for this
    /// failure class.
    ///
    /// Every failure surfaces as exactly one reply in the originating
    /// channel; the full error detail stays in the logs.
    pub fn user_notice(self) -> &'static str {
        match self {
            ErrorKind::Unconfigured => {
                "⚠️ The completion service is not configured. \
                 Ask an administrator to set an API key."
            }
            ErrorKind::Unauthorized => {
                "⚠️ The completion service rejected the configured \
                 credential."
            }
            ErrorKind::RateLimited => {
                "⏳ I'm being rate limited right now. Please try again \
                 in a moment."
            }
            ErrorKind::Remote => {
                "⚠️ The completion service returned an error. Please \
                 try again later."
            }
            ErrorKind::Transport => {
                "⚠️ I couldn't reach the completion service. Please \
                 try again later."
            }
        }
    }
}
