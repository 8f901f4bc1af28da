//! Page components, one per application route.

mod broadcast_done;
mod broadcasts;
mod landing;
mod login;
mod registration;
mod user_account;

pub use broadcast_done::BroadcastDonePage;
pub use broadcasts::BroadcastsPage;
pub use landing::LandingPage;
pub use login::LoginPage;
pub use registration::RegistrationPage;
pub use user_account::UserAccountPage;
