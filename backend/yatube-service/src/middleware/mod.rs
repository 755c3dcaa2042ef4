/// HTTP middleware and request extractors
///
/// - `SessionMiddleware`: decodes the session cookie into a `SessionUser`
/// - `Viewer`: the current visitor, possibly anonymous
/// - `AuthUser`: the current visitor, required to be logged in
pub mod session;

pub use session::{AuthUser, SessionMiddleware, SessionUser, Viewer};
