use std::io::{self, Write};

use chrono::Datelike;

use brisa_client::api::ApiClient;
use brisa_client::auth::{self, session::{AuthSession, TokenStore}};
use brisa_client::error::AppError;
use brisa_client::gate::{self, Resolution, Screen};
use brisa_client::models::{parse_iso_date, BookingStatus, Role, TransactionKind};
use brisa_client::services::{admin, agenda, ledger, report};

pub struct App {
    pub api: ApiClient,
    pub session: AuthSession,
    pub store: TokenStore,
}

enum Nav {
    To(Screen),
    /// Re-resolve from the root (after login/logout).
    Root,
    Quit,
}

pub async fn run(app: &mut App) -> anyhow::Result<()> {
    let mut target = root_screen(app);

    loop {
        let screen = match gate::resolve(&app.session.state(), target) {
            Resolution::Allow => target,
            Resolution::Redirect(next) => {
                target = next;
                continue;
            }
            // The session was restored before the loop started.
            Resolution::Wait => Screen::Login,
        };

        let nav = match screen {
            Screen::Login => login_screen(app).await?,
            Screen::Register => register_screen(app).await?,
            Screen::AdminDashboard => admin_dashboard(app).await?,
            Screen::Reports => reports_screen(app).await?,
            Screen::UserManagement => user_management(app).await?,
            Screen::SecretaryHome => secretary_home(app).await?,
            Screen::InstructorHome => instructor_home(app).await?,
        };

        match nav {
            Nav::Quit => break,
            Nav::Root => target = root_screen(app),
            Nav::To(next) => target = next,
        }
    }

    Ok(())
}

fn root_screen(app: &App) -> Screen {
    match gate::root(&app.session.state()) {
        Resolution::Redirect(screen) => screen,
        Resolution::Wait | Resolution::Allow => Screen::Login,
    }
}

async fn login_screen(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Acceso ===");
    println!("[1] Log in  [2] Register  [q] Quit");

    match prompt("option")?.as_str() {
        "1" => {
            let email = prompt("email")?;
            let password = prompt("password")?;
            match auth::authenticate(&app.api, &email, &password).await {
                Ok(token) => {
                    if let Err(e) = app.session.login(&app.store, &token) {
                        alert(&e);
                        return Ok(Nav::To(Screen::Login));
                    }
                    app.api.set_token(&token);
                    app.session.ensure_user_id(&app.api).await;
                    if let Some(identity) = app.session.identity() {
                        println!("Welcome, {}", identity.full_name());
                    }
                    Ok(Nav::Root)
                }
                Err(e) => {
                    alert(&e);
                    Ok(Nav::To(Screen::Login))
                }
            }
        }
        "2" => Ok(Nav::To(Screen::Register)),
        "q" => Ok(Nav::Quit),
        _ => Ok(Nav::To(Screen::Login)),
    }
}

async fn register_screen(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | New account ===");
    let req = auth::RegisterRequest {
        given_name: prompt("first name")?,
        family_name: prompt("last name")?,
        email: prompt("email")?,
        password: prompt("password")?,
    };
    match auth::register(&app.api, &req).await {
        Ok(()) => println!("Account created, you can log in now."),
        Err(e) => alert(&e),
    }
    Ok(Nav::To(Screen::Login))
}

async fn admin_dashboard(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Admin ===");

    let mut transactions = match report::fetch_all(&app.api).await {
        Ok(txs) => txs,
        Err(e) => {
            alert(&e);
            Vec::new()
        }
    };

    {
        let breakdown = report::partition(transactions.clone());
        println!(
            "{} pending / {} assigned / {} expenses",
            breakdown.pending.len(),
            breakdown.assigned.len(),
            breakdown.expenses.len()
        );
        for tx in &breakdown.pending {
            println!(
                "  #{:<4} {}  {:<20} {:<16} {:>10.2} {}",
                tx.id.unwrap_or(0),
                tx.date,
                truncate(&tx.instructor, 20),
                truncate(&tx.activity, 16),
                tx.total.unwrap_or(0.0),
                tx.currency
            );
        }
    }

    println!("[a] Assign income  [r] Reports  [u] Users  [l] Log out  [q] Quit  [enter] Refresh");
    match prompt("option")?.as_str() {
        "a" => {
            let id = prompt_i64("transaction id")?;
            let operator = prompt("operator (IGNA/JOSE)")?;
            match report::assign(&app.api, &mut transactions, id, &operator).await {
                Ok(()) => println!("Assignment saved."),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::AdminDashboard))
        }
        "r" => Ok(Nav::To(Screen::Reports)),
        "u" => Ok(Nav::To(Screen::UserManagement)),
        "l" => {
            logout(app);
            Ok(Nav::Root)
        }
        "q" => Ok(Nav::Quit),
        _ => Ok(Nav::To(Screen::AdminDashboard)),
    }
}

async fn reports_screen(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Reports ===");

    let today = chrono::Local::now().date_naive();
    let first_of_month = today.with_day(1).unwrap_or(today);
    let from = prompt_or("from (YYYY-MM-DD)", &first_of_month.to_string())?;
    let to = prompt_or("to (YYYY-MM-DD)", &today.to_string())?;
    if let Err(e) = parse_iso_date(&from).and(parse_iso_date(&to)) {
        alert(&e);
        return Ok(Nav::To(Screen::AdminDashboard));
    }

    match report::remote_summary(&app.api, &from, &to).await {
        Ok(remote) => {
            println!("-- Server summary {from} .. {to} --");
            println!("  Gross income:         {:>12.2}", remote.gross_income());
            println!("  Linked expenses:      {:>12.2}", remote.linked_expenses());
            println!("  Operational expenses: {:>12.2}", remote.operational_expenses());
            println!("  Net balance:          {:>12.2}", remote.net_income());
            println!(
                "  IGNA {:>10.2} / JOSE {:>10.2} / school {:>10.2}",
                remote.total_asignado_igna.unwrap_or(0.0),
                remote.total_asignado_jose.unwrap_or(0.0),
                remote.school_income()
            );
        }
        Err(AppError::NotFound(_)) => println!("No data in that range."),
        Err(e) => alert(&e),
    }

    match report::fetch_all(&app.api).await {
        Ok(txs) => {
            let summaries = report::summarize(&report::partition(txs));
            println!("-- Per currency (full ledger) --");
            for s in &summaries {
                println!(
                    "  {}: gross {:.2}, net {:.2}, IGNA {:.2}, JOSE {:.2}",
                    s.currency, s.gross_income, s.net_balance, s.assigned_igna, s.assigned_jose
                );
            }
            if prompt("export CSV? (y/N)")? == "y" {
                match report::summary_csv(&summaries) {
                    Ok(csv) => print!("{csv}"),
                    Err(e) => alert(&e),
                }
            }
        }
        Err(e) => alert(&e),
    }

    Ok(Nav::To(Screen::AdminDashboard))
}

async fn user_management(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Users & roles ===");

    let mut users = match admin::fetch_users(&app.api).await {
        Ok(users) => users,
        Err(e) => {
            alert(&e);
            Vec::new()
        }
    };
    for user in &users {
        println!(
            "  #{:<4} {:<28} {:<28} {}",
            user.id,
            truncate(&user.full_name(), 28),
            truncate(&user.email, 28),
            user.role
        );
    }

    println!("[r] Change role  [e] Edit profile  [d] Delete  [n] New role  [b] Back  [l] Log out");
    match prompt("option")?.as_str() {
        "r" => {
            match admin::fetch_roles(&app.api).await {
                Ok(roles) => {
                    let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
                    println!("Available roles: {}", names.join(", "));
                }
                Err(e) => alert(&e),
            }
            let id = prompt_i64("user id")?;
            let role = prompt("new role")?;
            match admin::assign_role(&app.api, &mut users, id, &role).await {
                Ok(()) => println!("Role updated."),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::UserManagement))
        }
        "e" => {
            let id = prompt_i64("user id")?;
            let fields = admin::ProfileUpdate {
                given_name: prompt("first name")?,
                family_name: prompt("last name")?,
                email: prompt("email")?,
            };
            match admin::update_profile(&app.api, id, &fields).await {
                Ok(()) => println!("Profile updated."),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::UserManagement))
        }
        "d" => {
            let id = prompt_i64("user id")?;
            let confirmed = prompt("type 'delete' to confirm")? == "delete";
            match admin::delete_user(&app.api, id, confirmed).await {
                Ok(()) => println!("User deleted."),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::UserManagement))
        }
        "n" => {
            let name = prompt("role name")?;
            match admin::create_role(&app.api, &name).await {
                Ok(role) => println!("Role {} created.", role.name),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::UserManagement))
        }
        "l" => {
            logout(app);
            Ok(Nav::Root)
        }
        _ => Ok(Nav::To(Screen::AdminDashboard)),
    }
}

async fn secretary_home(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Secretaria ===");
    println!("[m] Monitor  [n] New booking  [i] Income  [e] Expense  [l] Log out  [q] Quit");

    match prompt("option")?.as_str() {
        "m" => {
            let mut bookings = match agenda::fetch_all(&app.api).await {
                Ok(list) => list,
                Err(e) => {
                    alert(&e);
                    return Ok(Nav::To(Screen::SecretaryHome));
                }
            };
            print_bookings(&bookings);
            println!("[s] Reassign a rejected booking  [c] Confirm/reject  [enter] Back");
            match prompt("option")?.as_str() {
                "s" => {
                    let id = prompt_i64("booking id")?;
                    let instructor_id = prompt_i64("new instructor id")?;
                    match bookings.iter().find(|b| b.id == Some(id)) {
                        Some(rejected) => {
                            match agenda::reassign(&app.api, rejected, instructor_id).await {
                                Ok(created) => println!(
                                    "Booking recreated as #{} ({}).",
                                    created.id.unwrap_or(0),
                                    created.status
                                ),
                                Err(e) => alert(&e),
                            }
                        }
                        None => println!("No booking with id {id}."),
                    }
                }
                "c" => confirm_or_reject(app, &mut bookings).await?,
                _ => {}
            }
            Ok(Nav::To(Screen::SecretaryHome))
        }
        "n" => {
            let draft = agenda::NewBooking {
                student: prompt("student")?,
                date: prompt_or("date (YYYY-MM-DD)", &chrono::Local::now().date_naive().to_string())?,
                time: prompt_or("time (HH:MM)", "10:00")?,
                instructor_id: prompt_i64("instructor id")?,
                place: Some(prompt_or("place", "Escuela")?),
                rate: Some(prompt_f64("rate per hour")?),
                hours: Some(prompt_f64("hours")?),
                amount_paid: Some(prompt_f64("amount paid")?),
                hotel_referral: none_if_empty(prompt("hotel referral (optional)")?),
                status: BookingStatus::Pendiente,
            };
            match agenda::create(&app.api, &draft).await {
                Ok(created) => println!("Booking #{} created.", created.id.unwrap_or(0)),
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::SecretaryHome))
        }
        "i" => transaction_form(app, TransactionKind::Ingreso, Screen::SecretaryHome).await,
        "e" => transaction_form(app, TransactionKind::Egreso, Screen::SecretaryHome).await,
        "l" => {
            logout(app);
            Ok(Nav::Root)
        }
        "q" => Ok(Nav::Quit),
        _ => Ok(Nav::To(Screen::SecretaryHome)),
    }
}

async fn instructor_home(app: &mut App) -> anyhow::Result<Nav> {
    println!("\n=== BRISA | Instructor ===");
    println!("[a] My agenda  [i] New income sheet  [s] Monthly stats  [l] Log out  [q] Quit");

    match prompt("option")?.as_str() {
        "a" => {
            app.session.ensure_user_id(&app.api).await;
            let Some(instructor_id) = app.session.identity().and_then(|i| i.id) else {
                println!("Your user id is still resolving, try again in a moment.");
                return Ok(Nav::To(Screen::InstructorHome));
            };
            let mut bookings = match agenda::fetch_for_instructor(&app.api, instructor_id).await {
                Ok(list) => list,
                Err(e) => {
                    alert(&e);
                    return Ok(Nav::To(Screen::InstructorHome));
                }
            };
            if bookings.is_empty() {
                println!("No classes assigned.");
            } else {
                print_bookings(&bookings);
                confirm_or_reject(app, &mut bookings).await?;
            }
            Ok(Nav::To(Screen::InstructorHome))
        }
        "i" => transaction_form(app, TransactionKind::Ingreso, Screen::InstructorHome).await,
        "s" => {
            let year = prompt_i64("year")? as i32;
            let month = prompt_i64("month (1-12)")? as u32;
            match report::fetch_all(&app.api).await {
                Ok(txs) => {
                    let name = app
                        .session
                        .identity()
                        .map(|i| i.full_name())
                        .unwrap_or_default();
                    let own: Vec<_> = txs
                        .into_iter()
                        .filter(|tx| tx.instructor == name)
                        .collect();
                    let stats = report::monthly_stats(&own, year, month);
                    println!("{} classes in {year}-{month:02}", stats.class_count);
                    for (currency, total) in &stats.totals {
                        println!(
                            "  {currency}: school {:.2}, your 30% {:.2}",
                            total,
                            stats.instructor_share.get(currency).unwrap_or(&0.0)
                        );
                    }
                }
                Err(e) => alert(&e),
            }
            Ok(Nav::To(Screen::InstructorHome))
        }
        "l" => {
            logout(app);
            Ok(Nav::Root)
        }
        "q" => Ok(Nav::Quit),
        _ => Ok(Nav::To(Screen::InstructorHome)),
    }
}

async fn confirm_or_reject(
    app: &mut App,
    bookings: &mut Vec<brisa_client::models::Booking>,
) -> anyhow::Result<()> {
    let raw = prompt("confirm/reject a booking? (id or enter to skip)")?;
    if raw.is_empty() {
        return Ok(());
    }
    let Ok(id) = raw.parse::<i64>() else {
        println!("Not a booking id: {raw}");
        return Ok(());
    };
    let status = match prompt("new status ([c]onfirm / [r]eject)")?.as_str() {
        "c" => BookingStatus::Confirmada,
        "r" => BookingStatus::Rechazada,
        other => {
            println!("Unknown option: {other}");
            return Ok(());
        }
    };
    match agenda::transition(&app.api, bookings, id, status).await {
        Ok(()) => println!("Booking {id} is now {status}."),
        Err(e) => alert(&e),
    }
    Ok(())
}

async fn transaction_form(
    app: &mut App,
    kind: TransactionKind,
    back: Screen,
) -> anyhow::Result<Nav> {
    let today = chrono::Local::now().date_naive().to_string();

    // Instructors sign their own sheets; staff picks whose money it is.
    let role = app.session.identity().and_then(|i| i.role.clone());
    let instructor = match role {
        Some(Role::Instructor) | Some(Role::Alumno) => app
            .session
            .identity()
            .map(|i| i.full_name())
            .unwrap_or_default(),
        _ => prompt("instructor")?,
    };

    let mut draft = match kind {
        TransactionKind::Ingreso => ledger::TransactionDraft::income(&today, &instructor),
        TransactionKind::Egreso => ledger::TransactionDraft::expense(&today, &instructor),
    };

    draft.date = prompt_or("date (YYYY-MM-DD)", &today)?;
    if kind == TransactionKind::Ingreso {
        draft.activity = prompt_or("activity", &draft.activity)?;
        if draft.activity == "Otro" {
            draft.activity_other = prompt("specify activity")?;
        }
        draft.seller = prompt("seller (optional)")?;
        draft.set_hours(prompt_f64("hours")?);
        draft.set_rate(prompt_f64("rate per hour")?);
        draft.set_expenses(prompt_f64("associated expenses")?);
        draft.commission = prompt_f64("commission")?;
        println!("TOTAL: {:.2}", draft.total());
    } else {
        draft.set_expenses(prompt_f64("amount")?);
    }
    draft.details = prompt("details")?;
    draft.currency = prompt_or("currency (BRL/USD/ARS/CLP)", &draft.currency)?;
    draft.payment_method = prompt_or("payment method", &draft.payment_method)?;
    if draft.payment_method == "Otro" {
        draft.payment_method_other = prompt("payment method detail")?;
    }

    match ledger::submit(&app.api, &mut draft).await {
        Ok(saved) => println!("{} #{} saved.", saved.kind, saved.id.unwrap_or(0)),
        Err(e) => alert(&e),
    }
    Ok(Nav::To(back))
}

fn print_bookings(bookings: &[brisa_client::models::Booking]) {
    for b in bookings {
        println!(
            "  #{:<4} {:<10} {:<11} {:<6} {:<20} {:<20} {}",
            b.id.unwrap_or(0),
            b.status,
            b.date,
            truncate(&b.time, 5),
            truncate(&b.student, 20),
            truncate(b.instructor_name.as_deref().unwrap_or("-"), 20),
            b.place.as_deref().unwrap_or("-")
        );
    }
}

fn logout(app: &mut App) {
    app.session.logout(&app.store);
    app.api.clear_token();
    println!("Logged out.");
}

fn alert(err: &AppError) {
    println!("[!] {}", err.user_message());
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_or(label: &str, default: &str) -> io::Result<String> {
    let value = prompt(&format!("{label} [{default}]"))?;
    Ok(if value.is_empty() {
        default.to_string()
    } else {
        value
    })
}

fn prompt_f64(label: &str) -> io::Result<f64> {
    let raw = prompt(label)?;
    Ok(raw.parse().unwrap_or(0.0))
}

fn prompt_i64(label: &str) -> io::Result<i64> {
    loop {
        let raw = prompt(label)?;
        match raw.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Not a number: {raw}"),
        }
    }
}

fn none_if_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
