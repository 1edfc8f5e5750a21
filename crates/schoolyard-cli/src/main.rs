use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use sqlx::PgPool;

use schoolyard_cli::seeder::{self, SeedConfig};
use schoolyard_config::DatabaseConfig;
use schoolyard_core::hash_password;
use schoolyard_db::init_db_pool;
use schoolyard_db::repositories::AdminRepository;

#[derive(Parser)]
#[command(name = "schoolyard-cli")]
#[command(about = "Schoolyard CLI - Administrative tools for Schoolyard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake levels, classes, subjects, teachers and students
    Seed {
        /// Number of levels (grades)
        #[arg(long, default_value = "6")]
        levels: usize,

        /// Number of classes per level
        #[arg(long, default_value = "2")]
        classes_per_level: usize,

        /// Number of subjects
        #[arg(long, default_value = "8")]
        subjects: usize,

        /// Number of teachers
        #[arg(long, default_value = "12")]
        teachers: usize,

        /// Number of students enrolled in each class
        #[arg(long, default_value = "25")]
        students_per_class: usize,

        /// Label of the academic year every class starts with
        #[arg(long, default_value = "2024/2025")]
        year: String,
    },
    /// Clear all seeded data (keeps admins)
    ClearSeed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let pool = init_db_pool(&DatabaseConfig::from_env())
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Seed {
            levels,
            classes_per_level,
            subjects,
            teachers,
            students_per_class,
            year,
        } => {
            let config = SeedConfig {
                levels,
                classes_per_level,
                subjects,
                teachers,
                students_per_class,
                year,
            };
            seeder::seed_all(&pool, &config)
                .await
                .context("Error seeding database, run `clear-seed` first if data already exists")?;
            Ok(())
        }
        Commands::ClearSeed => {
            seeder::clear_all(&pool)
                .await
                .context("Error clearing seeded data")?;
            Ok(())
        }
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Name")
            .interact_text()
            .context("Failed to read name")?,
    };

    let email: String = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    if password.len() < 6 {
        bail!("Password must be at least 6 characters long");
    }

    let mut conn = pool.acquire().await?;
    if AdminRepository::email_exists(&mut conn, &email).await? {
        bail!("An admin with this email already exists");
    }

    let password_hash = hash_password(&password).map_err(|e| e.error)?;
    let admin = AdminRepository::insert(&mut conn, name.trim(), &email, &password_hash, true).await?;

    println!("\n✅ Admin created successfully!");
    println!("   Email: {}", admin.email);
    println!("   Name: {}", admin.name);

    Ok(())
}
