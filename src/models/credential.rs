/// Stored login for one user. Created by `rtimetracker user add`,
/// only ever read by the login flow.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}
