// End-to-end access control: bearer token in, gated screen out.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use brisa_client::auth::session::{AuthSession, TokenStore};
use brisa_client::auth::token;
use brisa_client::gate::{self, Resolution, Screen, SessionState};
use brisa_client::models::Role;

fn token_for(payload: &str) -> String {
    format!("header.{}.signature", URL_SAFE_NO_PAD.encode(payload))
}

fn temp_store(name: &str) -> TokenStore {
    let path = std::env::temp_dir().join(format!(
        "brisa-access-{}-{name}",
        std::process::id()
    ));
    let store = TokenStore::new(path.to_str().unwrap());
    store.clear();
    store
}

/// A stored token that decodes drives the session straight to the
/// role's home screen.
#[test]
fn stored_token_routes_to_the_role_home() {
    let store = temp_store("admin");
    store
        .save(&token_for(
            r#"{"id":1,"nombre":"Igna","apellido":"R","sub":"igna@escuela.com","roles":["ROLE_ADMINISTRADOR"]}"#,
        ))
        .unwrap();

    let mut session = AuthSession::new();
    session.restore(&store);

    assert_eq!(
        session.state(),
        SessionState::Authenticated(Role::Administrador)
    );
    assert_eq!(
        gate::root(&session.state()),
        Resolution::Redirect(Screen::AdminDashboard)
    );
    store.clear();
}

/// An unparsable stored token behaves exactly like no token: the
/// session is unauthenticated, the cache is wiped, and everything
/// protected redirects to login.
#[test]
fn unparsable_token_means_logged_out() {
    let store = temp_store("broken");
    store.save("definitely.not-base64.token").unwrap();

    let mut session = AuthSession::new();
    session.restore(&store);

    assert_eq!(session.state(), SessionState::Unauthenticated);
    assert_eq!(store.load(), None);

    for screen in [
        Screen::AdminDashboard,
        Screen::Reports,
        Screen::UserManagement,
        Screen::SecretaryHome,
        Screen::InstructorHome,
    ] {
        assert_eq!(
            gate::resolve(&session.state(), screen),
            Resolution::Redirect(Screen::Login)
        );
    }
}

/// Each role is boxed into its own area; crossing over lands you back
/// on your own home, never someone else's.
#[test]
fn roles_cannot_cross_into_other_areas() {
    let cases = [
        ("ROLE_SECRETARIA", Screen::SecretaryHome),
        ("ROLE_INSTRUCTOR", Screen::InstructorHome),
        ("ROLE_ALUMNO", Screen::InstructorHome),
    ];

    for (raw_role, home) in cases {
        let identity = token::decode(&token_for(&format!(
            r#"{{"id":2,"nombre":"X","apellido":"Y","sub":"x@escuela.com","roles":["{raw_role}"]}}"#
        )))
        .unwrap();
        let state = SessionState::Authenticated(identity.role.unwrap());

        assert_eq!(
            gate::resolve(&state, Screen::AdminDashboard),
            Resolution::Redirect(home)
        );
        assert_eq!(
            gate::resolve(&state, Screen::UserManagement),
            Resolution::Redirect(home)
        );
        assert_eq!(gate::resolve(&state, home), Resolution::Allow);
    }
}

/// A role the client does not recognize keeps its name but gets no
/// access: its home is the login screen.
#[test]
fn unknown_roles_fall_back_to_login() {
    let identity = token::decode(&token_for(
        r#"{"id":3,"nombre":"N","apellido":"M","sub":"n@escuela.com","roles":["ROLE_ENFERMERO"]}"#,
    ))
    .unwrap();
    assert_eq!(identity.role, Some(Role::Unknown("ENFERMERO".to_string())));

    let state = SessionState::Authenticated(identity.role.unwrap());
    assert_eq!(
        gate::resolve(&state, Screen::SecretaryHome),
        Resolution::Redirect(Screen::Login)
    );
    assert_eq!(gate::root(&state), Resolution::Redirect(Screen::Login));
}
