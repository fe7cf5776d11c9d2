use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use cafe_gate::auth::{Session, SqliteSessionStore};
use cafe_gate::cafe::{
    collect_stats, register, render_id_card, AccessDesk, CafeApi, DailyStats, MealType,
    MealWindow, Registration, StudentRoster,
};
use cafe_gate::config::{self, Command, Config, SessionMode};
use cafe_gate::http_client::CafeHttpClient;
use cafe_gate::transport::ReqwestTransport;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let config = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(api_url = %config.api_url, mode = ?config.session_mode, "Starting");

    let session = open_session(&config)?;

    let transport = Arc::new(ReqwestTransport::new(
        &config.api_url,
        config.http_max_connections,
        config.http_connect_timeout,
        config.http_request_timeout,
    )?);
    let client = Arc::new(CafeHttpClient::new(transport, session));
    let api = CafeApi::new(client.clone());

    match config.command.clone() {
        Command::Login { username, password } => {
            let (username, password) = config::prompt_credentials(username, password)?;
            let response = client
                .login(&username, &password)
                .await
                .context("Login failed")?;
            let name = response
                .user
                .map(|user| user.username)
                .filter(|name| !name.is_empty())
                .unwrap_or(username);
            println!("✅ Logged in as {}", name);
        }

        Command::Logout => {
            if client.logout().await {
                println!("👋 Logged out");
            } else {
                println!("👋 Local session cleared (server did not confirm logout)");
            }
        }

        Command::Status => print_status(&config, client.session()),

        Command::Students => {
            let students = api.list_students().await.map_err(login_hint)?;
            if students.is_empty() {
                println!("No students registered.");
            }
            for student in &students {
                println!(
                    "{:<14} {:<28} {:<26} {}",
                    student.student_id, student.name, student.department, student.year
                );
            }
        }

        Command::Meals { limit } => {
            let meals = api.recent_meals(limit).await.map_err(login_hint)?;
            if meals.is_empty() {
                println!("No meals recorded yet.");
            }
            for meal in &meals {
                let served = meal.timestamp.with_timezone(&chrono::Local);
                println!(
                    "#{:<6} student {:<6} {:<10} {}",
                    meal.log_id,
                    meal.student,
                    meal.meal_type,
                    served.format("%Y-%m-%d %H:%M")
                );
            }
        }

        Command::Stats => {
            let stats = collect_stats(&api).await.map_err(login_hint)?;
            print_stats(&stats);
        }

        Command::Scan { payload } => {
            let desk = AccessDesk::new(api, StudentRoster::new(config.roster_ttl));
            let outcome = desk.check_in(&payload).await.map_err(login_hint)?;
            println!("{}", outcome.message());
            if !outcome.is_allowed() {
                std::process::exit(2);
            }
        }

        Command::Station => {
            let desk = AccessDesk::new(api, StudentRoster::new(config.roster_ttl));
            run_station(&desk).await?;
        }

        Command::Register {
            name,
            email,
            phone,
            department,
            year,
            student_id,
        } => {
            let department = match department {
                Some(department) => department,
                None => config::prompt_department()?,
            };
            let registration = Registration {
                name,
                email,
                phone,
                department,
                year,
                student_id,
            };

            let student = register(&api, registration).await.map_err(login_hint)?;
            println!("✅ Student registered successfully!");
            println!();
            println!("{}", render_id_card(&student));
        }
    }

    Ok(())
}

/// Build the session over the configured storage
fn open_session(config: &Config) -> Result<Session> {
    let session = match config.session_mode {
        SessionMode::Sqlite => {
            let store = SqliteSessionStore::open(&config.session_db)?;
            tracing::debug!(path = %config.session_db.display(), "Using SQLite session store");
            Session::new(Arc::new(store))
        }
        SessionMode::Memory => Session::in_memory(),
        SessionMode::None => {
            tracing::warn!("Session storage disabled, requests are sent without credentials");
            Session::detached()
        }
    };
    Ok(session)
}

fn print_status(config: &Config, session: &Session) {
    println!("  API:          {}", config.api_url);
    println!("  Session mode: {:?}", config.session_mode);
    if config.session_mode == SessionMode::Sqlite {
        println!("  Session file: {}", config.session_db.display());
    }
    println!(
        "  Logged in:    {}",
        if session.is_authenticated() { "yes" } else { "no" }
    );
    println!("  Café:         {}", MealWindow::now().describe());
}

fn print_stats(stats: &DailyStats) {
    println!("📊 Café stats for {}", stats.day.format("%Y-%m-%d"));
    println!("  Students:     {}", stats.total_students);
    println!("  Meals today:  {}", stats.meals_today);
    for meal_type in [MealType::Breakfast, MealType::Lunch, MealType::Dinner] {
        let share = stats.share(meal_type);
        println!(
            "  {:<12}  {:>4}  {:<20} {:>5.1}%",
            meal_type.as_str(),
            stats.served(meal_type),
            "#".repeat((share / 5.0).round() as usize),
            share
        );
    }

    if stats.recent.is_empty() {
        println!("No recent activity.");
        return;
    }
    println!("Recent activity:");
    for meal in &stats.recent {
        let served = meal.timestamp.with_timezone(&chrono::Local);
        println!(
            "  #{:<6} student {:<6} {:<10} {}",
            meal.log_id,
            meal.student,
            meal.meal_type,
            served.format("%Y-%m-%d %H:%M")
        );
    }
}

/// Scan loop: one payload per stdin line until EOF or shutdown
async fn run_station(desk: &AccessDesk) -> Result<()> {
    println!("🍽️  Café station ready. {}", MealWindow::now().describe());
    println!("Scan or type a Student ID (Ctrl+C to stop).");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read scan input")?,
            _ = &mut shutdown => break,
        };

        let Some(line) = line else {
            tracing::debug!("Scan input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match desk.check_in(&line).await {
            Ok(outcome) => println!("{}", outcome.message()),
            Err(e) if e.requires_login() => {
                println!("❌ {}. Run `cafe-gate login` and scan again.", e);
            }
            Err(e) => println!("❌ {}", e),
        }
    }

    println!("👋 Station closed");
    Ok(())
}

/// Attach a login hint to errors that need a fresh session
fn login_hint(e: cafe_gate::error::ClientError) -> anyhow::Error {
    if e.requires_login() {
        anyhow::anyhow!("{} (run `cafe-gate login`)", e)
    } else {
        anyhow::Error::new(e)
    }
}

/// Handle shutdown signal
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, shutting down...");
        },
    }
}
