pub mod bearer;
pub mod claims;
pub mod error;
pub mod factory;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verifier;

pub use bearer::{extract_bearer, extract_bearer_from_headers};
pub use claims::{Audience, VerifiedClaims};
pub use error::{AuthError, SetupError};
pub use factory::build_gate;
pub use gate::AuthorizationGate;
pub use permissions::check_permission;
pub use verifier::{TokenVerifier, VerifierSettings};
