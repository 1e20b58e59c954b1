pub mod claims;
pub mod guard;
pub mod token;

pub use claims::Claims;
pub use guard::{AuthContext, GateError, Guard, GuardPipeline};
pub use token::{SigningKeys, TokenError, TokenService};
