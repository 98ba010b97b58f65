use serde::Serialize;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{RoleEntry, User};

pub async fn fetch_users(api: &ApiClient) -> AppResult<Vec<User>> {
    api.get_json("/usuario").await
}

pub async fn fetch_roles(api: &ApiClient) -> AppResult<Vec<RoleEntry>> {
    api.get_json("/administracion/roles").await
}

pub async fn create_role(api: &ApiClient, name: &str) -> AppResult<RoleEntry> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("A role needs a name".to_string()));
    }
    api.post_json(
        "/administracion/roles",
        &RoleEntry {
            id: None,
            name: name.to_string(),
        },
    )
    .await
}

#[derive(Debug, Serialize)]
struct AssignRoleRequest<'a> {
    #[serde(rename = "rol")]
    role: &'a str,
}

/// Optimistic role change: patch the row, persist, and on a failure pull
/// the list again so the panel shows what the server actually has.
pub async fn assign_role(
    api: &ApiClient,
    users: &mut Vec<User>,
    user_id: i64,
    role_name: &str,
) -> AppResult<()> {
    let role_name = role_name.trim();
    if role_name.is_empty() {
        return Err(AppError::Validation("Select a role first".to_string()));
    }

    let user = users
        .iter_mut()
        .find(|u| u.id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("No user with id {user_id}")))?;
    user.role = role_name.to_string();

    match api
        .put_json(
            &format!("/administracion/users/{user_id}/roles"),
            &AssignRoleRequest { role: role_name },
        )
        .await
    {
        Ok(()) => Ok(()),
        Err(e) => {
            match fetch_users(api).await {
                Ok(fresh) => *users = fresh,
                Err(reload) => {
                    tracing::warn!("User reload after a failed role change also failed: {reload}")
                }
            }
            Err(e)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    #[serde(rename = "nombre")]
    pub given_name: String,
    #[serde(rename = "apellido")]
    pub family_name: String,
    pub email: String,
}

pub async fn update_profile(
    api: &ApiClient,
    user_id: i64,
    fields: &ProfileUpdate,
) -> AppResult<()> {
    api.put_json(&format!("/administracion/users/{user_id}"), fields)
        .await
}

/// Deleting a user is irreversible; the caller must have walked through
/// an explicit confirmation step first.
pub async fn delete_user(api: &ApiClient, user_id: i64, confirmed: bool) -> AppResult<()> {
    if !confirmed {
        return Err(AppError::Validation(
            "User deletion requires explicit confirmation".to_string(),
        ));
    }
    api.delete(&format!("/administracion/users/{user_id}")).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn offline_api() -> ApiClient {
        // Never actually dialed in these tests; validation short-circuits
        // before any request is built.
        ApiClient::new(&Config {
            api_base_url: "http://localhost:9".to_string(),
            token_path: "/dev/null".to_string(),
            request_timeout_secs: 1,
        })
    }

    #[tokio::test]
    async fn unconfirmed_deletion_never_reaches_the_network() {
        let api = offline_api();
        let result = delete_user(&api, 1, false).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn empty_role_names_are_rejected_locally() {
        let api = offline_api();
        let mut users = Vec::new();
        let result = assign_role(&api, &mut users, 1, "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let result = create_role(&api, "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
