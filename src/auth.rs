//! Staff authentication — password hashing, the login state machine, and
//! account administration.
//!
//! Passwords are short numeric PINs, stored as salted PBKDF2-SHA256 hashes.
//! Three wrong attempts in a row block the account until a supervisor
//! resets it. Accounts are never hard-deleted through the admin flow; they
//! are flagged deleted and blocked, and disappear from every listing except
//! the master developer's.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rusqlite::Connection;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Collaborator, Role, StaffProfile};

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Fresh and reset accounts start with this PIN; signing in with it forces
/// a password change before a session opens.
pub const DEFAULT_PASSWORD: &str = "1234";
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

/// The master developer account. Signs in regardless of the selected role,
/// cannot be deleted, and is re-asserted on every boot.
pub const DEV_LOGIN: &str = "5669";
pub const DEV_ID: &str = "1";
const DEV_NAME: &str = "MA Desenvolvedor";
const DEV_PASSWORD: &str = "387387";

// ═══════════════════════════════════════════════════════════
// Errors — messages are shown verbatim on the ward terminals
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("USUÁRIO NÃO ENCONTRADO: Verifique os dados ou procure a coordenação.")]
    UnknownUser,

    #[error("USUÁRIO BLOQUEADO: Limite de tentativas excedido. Procure o Enfermeiro ou a Coordenação para resetar sua senha.")]
    Blocked,

    #[error("SENHA BLOQUEADA: Você errou a senha 3 vezes. Procure seu superior para resetar sua senha.")]
    JustBlocked,

    #[error("SENHA INCORRETA: Tentativa {attempts} de 3. Após 3 erros o usuário será bloqueado.")]
    WrongPassword { attempts: u32 },

    #[error("A senha deve conter apenas números.")]
    PasswordNotNumeric,

    #[error("A nova senha deve ter no máximo 6 dígitos.")]
    PasswordTooLong,

    #[error("Você não pode usar a senha padrão como sua nova senha.")]
    PasswordIsDefault,

    #[error("O usuário (login) deve ser numérico.")]
    LoginNotNumeric,

    #[error("Este usuário já está cadastrado.")]
    DuplicateLogin,

    #[error("ACESSO NEGADO: Esta operação exige um perfil com mais permissões.")]
    Forbidden,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What a correct password leads to: an open session, or a forced password
/// change when the account is still on the default PIN.
#[derive(Debug)]
pub enum LoginOutcome {
    Authenticated(Collaborator),
    PasswordChangeRequired(Collaborator),
}

// ═══════════════════════════════════════════════════════════
// Password hashing
// ═══════════════════════════════════════════════════════════

/// Hash a password with PBKDF2-SHA256 under a fresh random salt.
/// The stored form is `$pbkdf2-sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut out);
    format!(
        "$pbkdf2-sha256${PBKDF2_ITERATIONS}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(out)
    )
}

/// Check a presented password against a stored hash string.
/// Unparseable stored values verify as false rather than erroring.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    // the leading '$' yields an empty first segment
    if parts.next() != Some("") || parts.next() != Some("pbkdf2-sha256") {
        return false;
    }
    let Some(iterations) = parts.next().and_then(|s| s.parse::<u32>().ok()) else {
        return false;
    };
    let Some(salt) = parts.next().and_then(|s| STANDARD_NO_PAD.decode(s).ok()) else {
        return false;
    };
    let Some(expected) = parts.next().and_then(|s| STANDARD_NO_PAD.decode(s).ok()) else {
        return false;
    };
    let expected: [u8; HASH_LENGTH] = match expected.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut computed = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut computed);
    computed.ct_eq(&expected).unwrap_u8() == 1
}

// ═══════════════════════════════════════════════════════════
// Login state machine
// ═══════════════════════════════════════════════════════════

/// Attempt a sign-in for the given login under the role selected on the
/// terminal. The wrong-attempt counter only moves on an actual password
/// check: unknown users and already-blocked accounts leave it untouched.
pub fn login(
    conn: &Connection,
    login_id: &str,
    role: Role,
    password: &str,
) -> Result<LoginOutcome, AuthError> {
    let Some(mut collaborator) = db::find_collaborator_by_login(conn, login_id)? else {
        return Err(AuthError::UnknownUser);
    };
    if collaborator.is_deleted {
        return Err(AuthError::UnknownUser);
    }
    // The master developer signs in regardless of the selected role.
    if login_id != DEV_LOGIN && collaborator.role != role {
        return Err(AuthError::UnknownUser);
    }
    if collaborator.is_blocked {
        return Err(AuthError::Blocked);
    }

    if verify_password(password, &collaborator.password_hash) {
        if collaborator.failed_attempts != 0 {
            collaborator.failed_attempts = 0;
            db::upsert_collaborator(conn, &collaborator)?;
        }
        if password == DEFAULT_PASSWORD {
            return Ok(LoginOutcome::PasswordChangeRequired(collaborator));
        }
        return Ok(LoginOutcome::Authenticated(collaborator));
    }

    collaborator.failed_attempts += 1;
    let attempts = collaborator.failed_attempts;
    collaborator.is_blocked = attempts >= MAX_LOGIN_ATTEMPTS;
    db::upsert_collaborator(conn, &collaborator)?;

    if collaborator.is_blocked {
        Err(AuthError::JustBlocked)
    } else {
        Err(AuthError::WrongPassword { attempts })
    }
}

/// Validate a candidate password against the ward PIN rules.
pub fn validate_new_password(new_password: &str) -> Result<(), AuthError> {
    if new_password.is_empty() || !new_password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::PasswordNotNumeric);
    }
    if new_password.len() > 6 {
        return Err(AuthError::PasswordTooLong);
    }
    if new_password == DEFAULT_PASSWORD {
        return Err(AuthError::PasswordIsDefault);
    }
    Ok(())
}

/// Set a new password for an account, clearing any block. Used both by the
/// forced change after a default-PIN login and by a voluntary change.
pub fn change_password(
    conn: &Connection,
    collaborator_id: &str,
    new_password: &str,
) -> Result<Collaborator, AuthError> {
    validate_new_password(new_password)?;
    let Some(mut collaborator) = db::get_collaborator(conn, collaborator_id)? else {
        return Err(AuthError::UnknownUser);
    };
    collaborator.password_hash = hash_password(new_password);
    collaborator.failed_attempts = 0;
    collaborator.is_blocked = false;
    db::upsert_collaborator(conn, &collaborator)?;
    Ok(collaborator)
}

// ═══════════════════════════════════════════════════════════
// Account administration
// ═══════════════════════════════════════════════════════════

pub fn is_dev(profile: &StaffProfile) -> bool {
    profile.login == DEV_LOGIN
}

/// Register a new staff account with the default PIN. Coordination only;
/// granting the coordination role itself is reserved to the developer.
/// A login previously freed by a deletion can likewise only be re-issued
/// by the developer.
pub fn register_collaborator(
    conn: &Connection,
    actor: &StaffProfile,
    name: &str,
    login_id: &str,
    role: Role,
) -> Result<Collaborator, AuthError> {
    if actor.role != Role::Coordenacao {
        return Err(AuthError::Forbidden);
    }
    if role == Role::Coordenacao && !is_dev(actor) {
        return Err(AuthError::Forbidden);
    }
    if login_id.is_empty() || !login_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::LoginNotNumeric);
    }

    match db::find_collaborator_by_login(conn, login_id)? {
        Some(existing) if !existing.is_deleted => return Err(AuthError::DuplicateLogin),
        Some(_) if !is_dev(actor) => return Err(AuthError::Forbidden),
        Some(existing) => {
            // free the login column for the fresh row
            db::delete_collaborator(conn, &existing.id)?;
        }
        None => {}
    }

    let collaborator = Collaborator {
        id: Uuid::new_v4().to_string(),
        name: name.trim().to_string(),
        login: login_id.to_string(),
        password_hash: hash_password(DEFAULT_PASSWORD),
        role,
        failed_attempts: 0,
        is_blocked: false,
        is_deleted: false,
    };
    db::upsert_collaborator(conn, &collaborator)?;
    Ok(collaborator)
}

/// Reset an account to the default PIN, clearing the block. Coordination
/// may always reset; a nurse only when the account is actually blocked.
pub fn reset_password(
    conn: &Connection,
    actor: &StaffProfile,
    target_id: &str,
) -> Result<Collaborator, AuthError> {
    let Some(mut target) = db::get_collaborator(conn, target_id)? else {
        return Err(AuthError::UnknownUser);
    };
    let allowed = match actor.role {
        Role::Coordenacao => true,
        Role::Enfermeiro => target.is_blocked,
        Role::Tecnico => false,
    };
    if !allowed {
        return Err(AuthError::Forbidden);
    }

    target.password_hash = hash_password(DEFAULT_PASSWORD);
    target.failed_attempts = 0;
    target.is_blocked = false;
    db::upsert_collaborator(conn, &target)?;
    Ok(target)
}

/// Soft-delete an account: flagged deleted and blocked, row kept.
/// The master developer cannot be deactivated.
pub fn deactivate_collaborator(
    conn: &Connection,
    actor: &StaffProfile,
    target_id: &str,
) -> Result<Collaborator, AuthError> {
    if actor.role != Role::Coordenacao {
        return Err(AuthError::Forbidden);
    }
    let Some(mut target) = db::get_collaborator(conn, target_id)? else {
        return Err(AuthError::UnknownUser);
    };
    if target.login == DEV_LOGIN {
        return Err(AuthError::Forbidden);
    }

    target.is_deleted = true;
    target.is_blocked = true;
    db::upsert_collaborator(conn, &target)?;
    Ok(target)
}

/// Hard-delete an account row. Administrative cleanup only; the master
/// developer row (id "1") is untouchable.
pub fn remove_collaborator(
    conn: &Connection,
    actor: &StaffProfile,
    target_id: &str,
) -> Result<(), AuthError> {
    if actor.role != Role::Coordenacao {
        return Err(AuthError::Forbidden);
    }
    if target_id == DEV_ID {
        return Err(AuthError::Forbidden);
    }
    match db::delete_collaborator(conn, target_id) {
        Err(DatabaseError::NotFound { .. }) => Err(AuthError::UnknownUser),
        other => Ok(other?),
    }
}

/// Staff listing as a given actor sees it: deleted accounts are hidden
/// from everyone except the master developer. Password hashes never leave
/// this function.
pub fn visible_collaborators(
    conn: &Connection,
    actor: &StaffProfile,
) -> Result<Vec<StaffProfile>, AuthError> {
    let include_deleted = is_dev(actor);
    let collaborators = db::list_collaborators(conn)?;
    Ok(collaborators
        .iter()
        .filter(|c| include_deleted || !c.is_deleted)
        .map(StaffProfile::from)
        .collect())
}

// ═══════════════════════════════════════════════════════════
// Stock accounts
// ═══════════════════════════════════════════════════════════

/// Ensure the stock accounts exist. First boot creates the three ward
/// accounts; every boot re-asserts the master developer row — canonical
/// id, fixed password, unblocked — so a locked-out ward can always be
/// rescued through it.
pub fn seed_default_accounts(conn: &Connection) -> Result<(), DatabaseError> {
    let dev = Collaborator {
        id: DEV_ID.into(),
        name: DEV_NAME.into(),
        login: DEV_LOGIN.into(),
        password_hash: hash_password(DEV_PASSWORD),
        role: Role::Coordenacao,
        failed_attempts: 0,
        is_blocked: false,
        is_deleted: false,
    };

    let existing = db::list_collaborators(conn)?;
    if existing.is_empty() {
        db::upsert_collaborator(conn, &dev)?;
        db::upsert_collaborator(
            conn,
            &Collaborator {
                id: "2".into(),
                name: "Coordenação Setorial".into(),
                login: "1010".into(),
                password_hash: hash_password(DEFAULT_PASSWORD),
                role: Role::Coordenacao,
                failed_attempts: 0,
                is_blocked: false,
                is_deleted: false,
            },
        )?;
        db::upsert_collaborator(
            conn,
            &Collaborator {
                id: "3".into(),
                name: "Técnico Exemplo".into(),
                login: "456".into(),
                password_hash: hash_password(DEFAULT_PASSWORD),
                role: Role::Tecnico,
                failed_attempts: 0,
                is_blocked: false,
                is_deleted: false,
            },
        )?;
        return Ok(());
    }

    // Some other row may have captured the developer login; clear it
    // before re-asserting the canonical row.
    for c in &existing {
        if c.login == DEV_LOGIN && c.id != DEV_ID {
            db::delete_collaborator(conn, &c.id)?;
        }
    }
    db::upsert_collaborator(conn, &dev)?;
    Ok(())
}
