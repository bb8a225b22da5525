//! Seed script for development: populates a demo tenant through the store API.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `STORE_URL`, `STORE_API_KEY` and `STORE_JWT_SECRET` (reads .env).
//! The store must issue sessions on sign-up (email confirmation off).

use anyhow::{bail, Context};
use chrono::{Days, NaiveTime, Utc};
use rust_decimal::Decimal;
use salonbook::config::AppConfig;
use salonbook::errors::AppError;
use salonbook::models::appointment::{AppointmentStatus, CreateAppointment};
use salonbook::models::client::CreateClient;
use salonbook::models::hours::UpdateHours;
use salonbook::models::professional::CreateProfessional;
use salonbook::models::service::CreateService;
use salonbook::services::auth::{self, BusinessRegistration, LoginRequest};
use salonbook::services::{appointment, catalog, client, hours, lifecycle, professional};
use salonbook::store::{AuthClient, StoreClient};
use uuid::Uuid;

const OWNER_EMAIL: &str = "owner@salonbook.local";
const OWNER_PASSWORD: &str = "Test123!";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let store = StoreClient::new(&config.store_url, &config.store_api_key);
    let auth_client = AuthClient::new(&store);

    println!("=== salonbook Seed Script ===");

    let (business_id, token) = seed_owner(&auth_client, &store).await?;
    let store = store.as_user(&token);

    if !catalog::list_by_business(&store, business_id).await?.is_empty() {
        println!("[skip] Demo business already has services");
        return Ok(());
    }

    seed_hours(&store, business_id).await?;
    let services = seed_services(&store, business_id).await?;
    let professionals = seed_professionals(&store, business_id).await?;
    let clients = seed_clients(&store, business_id).await?;
    seed_appointments(&store, business_id, &services, &professionals, &clients).await?;

    println!("\n=== Seed complete! ===");
    println!("Business login: {OWNER_EMAIL} / {OWNER_PASSWORD}");

    Ok(())
}

/// Sign in as the demo owner, registering the account on first run.
async fn seed_owner(
    auth_client: &AuthClient,
    store: &StoreClient,
) -> anyhow::Result<(Uuid, String)> {
    let login = LoginRequest {
        email: OWNER_EMAIL.to_string(),
        password: OWNER_PASSWORD.to_string(),
    };
    let response = match auth::login_business(auth_client, store, &login).await {
        Ok(response) => {
            println!("[done] Signed in as existing demo owner");
            response
        }
        Err(AppError::InvalidCredentials) => {
            let registration = BusinessRegistration {
                business_name: "Demo Barbershop".to_string(),
                owner_name: "Demo Owner".to_string(),
                email: OWNER_EMAIL.to_string(),
                password: OWNER_PASSWORD.to_string(),
                phone: "+55 11 99999-0000".to_string(),
                city: "São Paulo".to_string(),
            };
            let response = auth::register_business(auth_client, store, &registration).await?;
            println!("[done] Registered demo owner and business");
            response
        }
        Err(e) => return Err(e.into()),
    };

    let Some(business_id) = response.business_id else {
        bail!("demo owner has no business");
    };
    let Some(session) = response.session else {
        bail!("sign-up did not return a session; disable email confirmation on the store");
    };
    Ok((business_id, session.access_token))
}

async fn seed_hours(store: &StoreClient, business_id: Uuid) -> anyhow::Result<()> {
    let input = UpdateHours {
        days: hours::default_week(),
    };
    hours::save_hours(store, business_id, &input).await?;
    println!("[done] Saved default opening hours");
    Ok(())
}

async fn seed_services(store: &StoreClient, business_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let services = [
        ("Haircut", "Classic cut and finish", 3500, 30),
        ("Beard trim", "Shape and hot towel", 2500, 30),
        ("Cut and beard", "Full service", 5500, 60),
        ("Coloring", "Single process color", 8000, 90),
    ];
    let mut ids = Vec::with_capacity(services.len());
    for (name, description, cents, duration) in services {
        let service = catalog::create(
            store,
            business_id,
            &CreateService {
                name: name.to_string(),
                description: Some(description.to_string()),
                price: Decimal::new(cents, 2),
                duration,
            },
        )
        .await?;
        ids.push(service.id);
    }
    println!("[done] Created {} services", ids.len());
    Ok(ids)
}

async fn seed_professionals(store: &StoreClient, business_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let professionals = [
        ("Ana Souza", "Stylist", "ana@salonbook.local"),
        ("Bruno Lima", "Barber", "bruno@salonbook.local"),
    ];
    let mut ids = Vec::with_capacity(professionals.len());
    for (name, specialty, contact) in professionals {
        let professional = professional::create(
            store,
            business_id,
            &CreateProfessional {
                name: name.to_string(),
                specialty: specialty.to_string(),
                contact: contact.to_string(),
            },
        )
        .await?;
        ids.push(professional.id);
    }
    println!("[done] Created {} professionals", ids.len());
    Ok(ids)
}

async fn seed_clients(store: &StoreClient, business_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
    let clients = [
        ("Carla Dias", "carla@example.com", "+55 11 98888-0001"),
        ("Diego Rocha", "diego@example.com", "+55 11 98888-0002"),
        ("Elisa Prado", "elisa@example.com", "+55 11 98888-0003"),
    ];
    let mut ids = Vec::with_capacity(clients.len());
    for (name, email, phone) in clients {
        let client = client::create(
            store,
            business_id,
            &CreateClient {
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
            },
        )
        .await?;
        ids.push(client.id);
    }
    println!("[done] Created {} clients", ids.len());
    Ok(ids)
}

/// Past appointments are completed so the dashboard has revenue; the rest
/// stay scheduled.
async fn seed_appointments(
    store: &StoreClient,
    business_id: Uuid,
    services: &[Uuid],
    professionals: &[Uuid],
    clients: &[Uuid],
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let mut completed = 0;
    let mut scheduled = 0;

    for (i, offset) in [-20i64, -12, -6, -2, 1, 3].into_iter().enumerate() {
        let date = if offset < 0 {
            today.checked_sub_days(Days::new(offset.unsigned_abs()))
        } else {
            today.checked_add_days(Days::new(offset.unsigned_abs()))
        }
        .context("seed date out of range")?;
        let hour = 9 + (i as u32 % 8);
        let time = NaiveTime::from_hms_opt(hour, 0, 0).context("invalid seed time")?;

        let created = appointment::create(
            store,
            business_id,
            &CreateAppointment {
                client_id: clients[i % clients.len()],
                service_id: services[i % services.len()],
                professional_id: professionals[i % professionals.len()],
                date,
                time,
            },
        )
        .await?;

        if offset < 0 {
            lifecycle::transition(store, business_id, created.id, AppointmentStatus::Completed)
                .await?;
            completed += 1;
        } else {
            scheduled += 1;
        }
    }

    println!("[done] Created {completed} completed and {scheduled} scheduled appointments");
    Ok(())
}
