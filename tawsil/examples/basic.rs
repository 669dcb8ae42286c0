//! Basic example of the Tawsil DI container.

use std::sync::atomic::{AtomicU64, Ordering};

use tawsil::logging::{self, LoggingConfig};
use tawsil::prelude::*;
use tracing::info;

// === Define your types ===

#[derive(Injectable)]
struct ConsoleLogger;

impl ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Config {
    database_url: String,
    debug: bool,
}

#[derive(Injectable)]
struct Database {
    #[inject(id = "IConfig")]
    config: Injected<Config>,
    #[inject(id = "ILogger")]
    logger: Injected<ConsoleLogger>,
    queries: AtomicU64,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.logger.get().log(&format!("Executing: {sql}"));
        format!("Results from {}", self.config.get().database_url)
    }
}

#[derive(Injectable)]
struct UserRepository {
    #[inject(id = "IDatabase")]
    db: Injected<Database>,
    // Back-reference: the service depends on the repository too
    #[inject(id = "IUserService")]
    service: Injected<UserService>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.get().query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

#[derive(Injectable)]
struct UserService {
    #[inject(id = "IUserRepository")]
    repo: Injected<UserRepository>,
    #[inject(id = "ILogger")]
    logger: Injected<ConsoleLogger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.get().log(&format!("Getting user {id}"));
        self.repo.get().find_user(id)
    }
}

fn main() -> std::result::Result<(), BoxError> {
    // Honors TAWSIL_LOG, e.g. TAWSIL_LOG=tawsil_container=debug
    logging::init(&LoggingConfig::from_env())?;

    let container = Container::new();

    // Config — produced by a factory, built once
    container.singleton_factory("IConfig", || {
        Ok::<_, BoxError>(Config {
            database_url: "postgres://localhost/myapp".to_string(),
            debug: true,
        })
    })?;
    container.singleton::<ConsoleLogger>("ILogger")?;
    container.singleton::<Database>("IDatabase")?;
    container.singleton::<UserRepository>("IUserRepository")?;
    container.transient::<UserService>("IUserService")?;

    let report = container.validate()?;
    info!(services = report.services, cycles = report.cycles.len(), "Graph checked");
    println!("{container:?}");

    let config = container.get::<Config>("IConfig")?;
    println!("Config: database_url={}, debug={}", config.database_url, config.debug);

    let service = container.get::<UserService>("IUserService")?;
    println!("{}", service.get_user(42));

    // Transient: a fresh service, sharing the singleton repository
    let another = container.get::<UserService>("IUserService")?;
    println!("{}", another.get_user(7));

    // The cycle was closed with a lazy reference back to the first service
    let repo = container.get::<UserRepository>("IUserRepository")?;
    println!("Back-reference alive: {}", repo.service.try_get().is_ok());
    println!("Queries executed: {}", repo.db.get().queries.load(Ordering::Relaxed));

    // Back-references do not own their target
    drop(service);
    println!("Back-reference alive after drop: {}", repo.service.try_get().is_ok());

    match container.get_erased("IMailer") {
        Ok(_) => unreachable!("IMailer was never registered"),
        Err(err) => println!("Expected failure: {err}"),
    }

    Ok(())
}
