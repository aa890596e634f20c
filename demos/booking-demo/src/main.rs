//! A small end-to-end walk through the session lifecycle against a
//! running booking backend.
//!
//! ```sh
//! BOOKING_API_URL=http://localhost:8080 \
//! BOOKING_USERNAME=bob BOOKING_PASSWORD=hunter2 \
//! cargo run -p booking-demo
//! ```

use std::env;

use turnstile::prelude::*;

/// A navigator for a terminal: there is nowhere to redirect to, so it
/// just says where the user would have been sent.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn redirect_to_login(&self, return_url: &str) {
        println!("session ended; would redirect to /login?returnUrl={return_url}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let base_url =
        env::var("BOOKING_API_URL").unwrap_or_else(|_| "http://localhost:8080".into());
    let username = env::var("BOOKING_USERNAME").unwrap_or_else(|_| "demo".into());
    let password = env::var("BOOKING_PASSWORD").unwrap_or_else(|_| "demo".into());

    let client = TurnstileClientBuilder::new(&base_url)
        .store_path("booking-demo.redb")
        .build(ConsoleNavigator)?;
    let manager = client.manager();

    // A session may have survived from a previous run of this demo.
    if let Some(user) = manager.current_session() {
        println!("restored session for {} ({})", user.username, user.role);
    } else {
        println!("no persisted session; signing in as {username}");
        let user = manager
            .login(
                LoginRequest {
                    username: username.clone(),
                    password,
                },
                false,
            )
            .await?;
        println!("signed in as {} ({})", user.username, user.role);
    }

    println!("authenticated: {}", manager.is_authenticated());
    println!("organizer privileges: {}", manager.is_organizer());
    if let Some(delay) = manager.refresh_timer_delay() {
        println!("token renews in about {} minutes", delay.as_secs() / 60);
    }

    // Watch the session while we force an early renewal.
    let mut sessions = manager.subscribe();
    let watcher = tokio::spawn(async move {
        while sessions.changed().await.is_ok() {
            match sessions.borrow_and_update().clone() {
                Some(user) => println!("session update: {} is signed in", user.username),
                None => {
                    println!("session update: signed out");
                    break;
                }
            }
        }
    });

    println!("refreshing the token early...");
    match manager.silent_refresh().await {
        Ok(user) => println!("token renewed for {}", user.username),
        Err(error) => println!("refresh failed: {error}"),
    }

    manager.logout();
    watcher.await?;

    println!("done");
    Ok(())
}
