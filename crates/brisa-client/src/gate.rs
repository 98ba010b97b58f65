use crate::models::Role;

/// Every view the client can show. The gate decides who gets in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    AdminDashboard,
    Reports,
    UserManagement,
    SecretaryHome,
    InstructorHome,
}

impl Screen {
    pub fn is_public(&self) -> bool {
        matches!(self, Screen::Login | Screen::Register)
    }

    fn admits(&self, role: &Role) -> bool {
        match self {
            Screen::Login | Screen::Register => true,
            Screen::AdminDashboard | Screen::Reports | Screen::UserManagement => {
                *role == Role::Administrador
            }
            Screen::SecretaryHome => *role == Role::Secretaria,
            Screen::InstructorHome => matches!(role, Role::Instructor | Role::Alumno),
        }
    }
}

/// Where the gate stands while the session resolves and after.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Unauthenticated,
    Authenticated(Role),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Session still resolving; render nothing rather than a
    /// provisional redirect.
    Wait,
    Allow,
    Redirect(Screen),
}

/// The canonical home per role. One table, used for both denied
/// navigation and the root path.
pub fn home_for(role: &Role) -> Screen {
    match role {
        Role::Administrador => Screen::AdminDashboard,
        Role::Secretaria => Screen::SecretaryHome,
        Role::Instructor | Role::Alumno => Screen::InstructorHome,
        Role::Unknown(_) => Screen::Login,
    }
}

/// Gate a navigation attempt.
pub fn resolve(state: &SessionState, target: Screen) -> Resolution {
    match state {
        SessionState::Loading => Resolution::Wait,
        SessionState::Unauthenticated => {
            if target.is_public() {
                Resolution::Allow
            } else {
                Resolution::Redirect(Screen::Login)
            }
        }
        SessionState::Authenticated(role) => {
            let home = home_for(role);
            if target == home {
                Resolution::Allow
            } else if target.is_public() {
                // Logged-in users do not see login/register again.
                Resolution::Redirect(home)
            } else if target.admits(role) {
                Resolution::Allow
            } else {
                Resolution::Redirect(home)
            }
        }
    }
}

/// Resolve the root path: straight to the role's home.
pub fn root(state: &SessionState) -> Resolution {
    match state {
        SessionState::Loading => Resolution::Wait,
        SessionState::Unauthenticated => Resolution::Redirect(Screen::Login),
        SessionState::Authenticated(role) => Resolution::Redirect(home_for(role)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_never_redirects() {
        for screen in [Screen::Login, Screen::AdminDashboard, Screen::InstructorHome] {
            assert_eq!(resolve(&SessionState::Loading, screen), Resolution::Wait);
        }
        assert_eq!(root(&SessionState::Loading), Resolution::Wait);
    }

    #[test]
    fn unauthenticated_users_land_on_login() {
        let state = SessionState::Unauthenticated;
        assert_eq!(resolve(&state, Screen::Login), Resolution::Allow);
        assert_eq!(resolve(&state, Screen::Register), Resolution::Allow);
        assert_eq!(
            resolve(&state, Screen::AdminDashboard),
            Resolution::Redirect(Screen::Login)
        );
        assert_eq!(
            resolve(&state, Screen::SecretaryHome),
            Resolution::Redirect(Screen::Login)
        );
        assert_eq!(root(&state), Resolution::Redirect(Screen::Login));
    }

    #[test]
    fn every_role_has_exactly_one_home() {
        assert_eq!(home_for(&Role::Administrador), Screen::AdminDashboard);
        assert_eq!(home_for(&Role::Secretaria), Screen::SecretaryHome);
        assert_eq!(home_for(&Role::Instructor), Screen::InstructorHome);
        assert_eq!(home_for(&Role::Alumno), Screen::InstructorHome);
        assert_eq!(
            home_for(&Role::Unknown("ENFERMERO".to_string())),
            Screen::Login
        );
    }

    #[test]
    fn denied_navigation_redirects_to_the_canonical_home() {
        let instructor = SessionState::Authenticated(Role::Instructor);
        assert_eq!(
            resolve(&instructor, Screen::AdminDashboard),
            Resolution::Redirect(Screen::InstructorHome)
        );
        assert_eq!(
            resolve(&instructor, Screen::UserManagement),
            Resolution::Redirect(Screen::InstructorHome)
        );
        assert_eq!(resolve(&instructor, Screen::InstructorHome), Resolution::Allow);

        let secretary = SessionState::Authenticated(Role::Secretaria);
        assert_eq!(
            resolve(&secretary, Screen::Reports),
            Resolution::Redirect(Screen::SecretaryHome)
        );
        assert_eq!(resolve(&secretary, Screen::SecretaryHome), Resolution::Allow);

        let admin = SessionState::Authenticated(Role::Administrador);
        assert_eq!(resolve(&admin, Screen::Reports), Resolution::Allow);
        assert_eq!(resolve(&admin, Screen::UserManagement), Resolution::Allow);
        assert_eq!(
            resolve(&admin, Screen::InstructorHome),
            Resolution::Redirect(Screen::AdminDashboard)
        );
    }

    #[test]
    fn authenticated_users_skip_the_login_screen() {
        let admin = SessionState::Authenticated(Role::Administrador);
        assert_eq!(
            resolve(&admin, Screen::Login),
            Resolution::Redirect(Screen::AdminDashboard)
        );
    }

    #[test]
    fn unknown_roles_resolve_to_login_without_looping() {
        let state = SessionState::Authenticated(Role::Unknown("ENFERMERO".to_string()));
        // Home for an unknown role is the login screen; resolving it
        // there must terminate, not bounce.
        assert_eq!(resolve(&state, Screen::Login), Resolution::Allow);
        assert_eq!(
            resolve(&state, Screen::AdminDashboard),
            Resolution::Redirect(Screen::Login)
        );
        assert_eq!(root(&state), Resolution::Redirect(Screen::Login));
    }
}
