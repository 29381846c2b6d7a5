use serde::{Deserialize, Serialize};

use super::enums::Role;

/// A staff account as persisted. The credential is a PHC-format salted
/// hash; nothing in this struct ever leaves the server except through
/// [`StaffProfile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub id: String,
    pub name: String,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

/// Client-facing view of a staff account, minus the credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfile {
    pub id: String,
    pub name: String,
    pub login: String,
    pub role: Role,
    pub failed_attempts: u32,
    pub is_blocked: bool,
    pub is_deleted: bool,
}

impl StaffProfile {
    /// Nurses and coordination: the roles trusted with discharge,
    /// mark-viewed and deletion.
    pub fn is_supervisor(&self) -> bool {
        matches!(self.role, Role::Enfermeiro | Role::Coordenacao)
    }
}

impl From<&Collaborator> for StaffProfile {
    fn from(c: &Collaborator) -> Self {
        StaffProfile {
            id: c.id.clone(),
            name: c.name.clone(),
            login: c.login.clone(),
            role: c.role.clone(),
            failed_attempts: c.failed_attempts,
            is_blocked: c.is_blocked,
            is_deleted: c.is_deleted,
        }
    }
}

impl From<Collaborator> for StaffProfile {
    fn from(c: Collaborator) -> Self {
        StaffProfile::from(&c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_view_drops_the_hash() {
        let c = Collaborator {
            id: "2".into(),
            name: "COORDENAÇÃO".into(),
            login: "1010".into(),
            password_hash: "$pbkdf2-sha256$...".into(),
            role: Role::Coordenacao,
            failed_attempts: 0,
            is_blocked: false,
            is_deleted: false,
        };
        let json = serde_json::to_value(StaffProfile::from(&c)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["login"], "1010");
        assert_eq!(json["role"], "coordenacao");
    }
}
