// Authentication module
// Session storage, token endpoints and refresh coordination

mod coordinator;
mod credentials;
mod refresh;
mod session;
mod types;

pub(crate) use coordinator::abandoned;
pub use coordinator::{RefreshCoordinator, RefreshFlight, Ticket};
pub use credentials::SqliteSessionStore;
pub use refresh::{login, logout_request, refresh_access_token, LOGIN_PATH, LOGOUT_PATH, REFRESH_PATH};
pub use session::{
    MemorySessionStore, NullSessionStore, Session, SessionStore, ACCESS_TOKEN_KEY,
    REFRESH_TOKEN_KEY,
};
pub use types::{LoginResponse, TokenData, TokenPair, UserSummary};
