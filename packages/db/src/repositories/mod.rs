//! Repository implementations for database operations.

mod broadcast_repo;
mod engivia_repo;
mod session_repo;
mod user_repo;

pub use broadcast_repo::BroadcastRepository;
pub(crate) use broadcast_repo::BroadcastRecord;
pub use engivia_repo::EngiviaRepository;
pub use session_repo::SessionRepository;
pub use user_repo::UserRepository;
