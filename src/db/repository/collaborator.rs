use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::Collaborator;

/// Insert or replace a staff account. The login is kept in its own column
/// (with a UNIQUE constraint) so lookups and duplicate detection happen in
/// SQL rather than by scanning blobs.
pub fn upsert_collaborator(
    conn: &Connection,
    collaborator: &Collaborator,
) -> Result<(), DatabaseError> {
    let data = serde_json::to_string(collaborator)?;
    conn.execute(
        "INSERT OR REPLACE INTO collaborators (id, login, data) VALUES (?1, ?2, ?3)",
        params![collaborator.id, collaborator.login, data],
    )?;
    Ok(())
}

/// Get a staff account by ID.
pub fn get_collaborator(
    conn: &Connection,
    id: &str,
) -> Result<Option<Collaborator>, DatabaseError> {
    let result = conn.query_row(
        "SELECT data FROM collaborators WHERE id = ?1",
        params![id],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find a staff account by its login.
pub fn find_collaborator_by_login(
    conn: &Connection,
    login: &str,
) -> Result<Option<Collaborator>, DatabaseError> {
    let result = conn.query_row(
        "SELECT data FROM collaborators WHERE login = ?1",
        params![login],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// List all staff accounts (deleted ones included), ordered by name.
/// Visibility filtering is the caller's concern.
pub fn list_collaborators(conn: &Connection) -> Result<Vec<Collaborator>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT data FROM collaborators")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut collaborators = Vec::new();
    for data in rows {
        collaborators.push(serde_json::from_str::<Collaborator>(&data?)?);
    }
    collaborators.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(collaborators)
}

/// Remove a staff account row entirely. Soft deletion (the normal path)
/// goes through `upsert_collaborator` with the deleted flag set.
pub fn delete_collaborator(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    let affected = conn.execute("DELETE FROM collaborators WHERE id = ?1", params![id])?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "collaborator".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Role;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    pub(crate) fn make_collaborator(id: &str, login: &str, role: Role) -> Collaborator {
        Collaborator {
            id: id.into(),
            name: format!("Colaborador {login}"),
            login: login.into(),
            password_hash: "hash".into(),
            role,
            failed_attempts: 0,
            is_blocked: false,
            is_deleted: false,
        }
    }

    #[test]
    fn upsert_and_find_by_login() {
        let conn = test_db();
        let c = make_collaborator("2", "1010", Role::Coordenacao);
        upsert_collaborator(&conn, &c).unwrap();

        let found = find_collaborator_by_login(&conn, "1010").unwrap().unwrap();
        assert_eq!(found.id, "2");
        assert_eq!(found.role, Role::Coordenacao);
    }

    #[test]
    fn find_unknown_login_returns_none() {
        let conn = test_db();
        assert!(find_collaborator_by_login(&conn, "9999").unwrap().is_none());
    }

    #[test]
    fn upsert_updates_login_column() {
        let conn = test_db();
        let mut c = make_collaborator("2", "1010", Role::Tecnico);
        upsert_collaborator(&conn, &c).unwrap();

        c.login = "2020".into();
        upsert_collaborator(&conn, &c).unwrap();

        assert!(find_collaborator_by_login(&conn, "1010").unwrap().is_none());
        let found = find_collaborator_by_login(&conn, "2020").unwrap().unwrap();
        assert_eq!(found.id, "2");
    }

    #[test]
    fn list_includes_deleted_and_orders_by_name() {
        let conn = test_db();
        let mut a = make_collaborator("1", "111", Role::Enfermeiro);
        a.name = "ZILDA".into();
        a.is_deleted = true;
        let mut b = make_collaborator("2", "222", Role::Tecnico);
        b.name = "ADRIANA".into();
        upsert_collaborator(&conn, &a).unwrap();
        upsert_collaborator(&conn, &b).unwrap();

        let all = list_collaborators(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "ADRIANA");
        assert_eq!(all[1].name, "ZILDA");
    }

    #[test]
    fn delete_removes_the_row() {
        let conn = test_db();
        upsert_collaborator(&conn, &make_collaborator("3", "456", Role::Tecnico)).unwrap();
        delete_collaborator(&conn, "3").unwrap();
        assert!(get_collaborator(&conn, "3").unwrap().is_none());
    }

    #[test]
    fn delete_missing_fails() {
        let conn = test_db();
        let result = delete_collaborator(&conn, "ghost");
        assert!(matches!(result, Err(DatabaseError::NotFound { .. })));
    }
}
