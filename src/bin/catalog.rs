//! Catalog binary - browses the showroom from the terminal
//!
//! Usage:
//!   cargo run --bin catalog                                  # Featured + full inventory
//!   cargo run --bin catalog -- --search toyota --category SUV
//!   cargo run --bin catalog -- --details 3
//!   cargo run --bin catalog -- --favorites
//!   cargo run --bin catalog -- --toggle-lang                 # Also --toggle-currency, --toggle-theme
//!   cargo run --bin catalog -- --toggle-favorite 3
//!   cargo run --bin catalog -- --set-rate 60                 # Admin, needs SUPABASE_ACCESS_TOKEN
//!   cargo run --bin catalog -- --inquiries                   # Admin
//!   cargo run --bin catalog -- --translate-draft draft.json  # Admin
//!   cargo run --bin catalog -- --save-product form.json      # Admin, add --id 3 to update
//!   cargo run --bin catalog -- --delete-product 3            # Admin
//!
//! Required environment variables:
//! - SUPABASE_URL
//! - SUPABASE_ANON_KEY
//!
//! Optional:
//! - SUPABASE_ACCESS_TOKEN (signed-in admin session)
//! - PREFERENCES_FILE (defaults to data/preferences.json)
//! - FALLBACK_USD_TO_EGP (defaults to 50)

use anyhow::{bail, Context, Result};
use showroom::catalog::{ProductDraft, ProductForm};
use showroom::preferences::PreferenceStorage;
use showroom::rate::{FALLBACK_USD_TO_EGP, RATE_SETTING_KEY};
use showroom::session::{ProductView, Session};
use showroom::store::SupabaseClient;
use tracing::info;

/// Minimal config for the catalog client (no translation keys required)
struct CatalogConfig {
    supabase_url: String,
    supabase_anon_key: String,
    access_token: Option<String>,
    preferences_file: String,
    fallback_rate: f64,
}

impl CatalogConfig {
    fn from_env() -> Result<Self> {
        Ok(Self {
            supabase_url: std::env::var("SUPABASE_URL").context("SUPABASE_URL not set")?,
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY")
                .context("SUPABASE_ANON_KEY not set")?,
            access_token: std::env::var("SUPABASE_ACCESS_TOKEN")
                .ok()
                .filter(|v| !v.is_empty()),
            preferences_file: std::env::var("PREFERENCES_FILE")
                .unwrap_or_else(|_| "data/preferences.json".to_string()),
            fallback_rate: std::env::var("FALLBACK_USD_TO_EGP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(FALLBACK_USD_TO_EGP),
        })
    }
}

/// Value following `flag` on the command line
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_id(args: &[String], flag: &str) -> Result<Option<i64>> {
    match flag_value(args, flag) {
        Some(raw) => Ok(Some(
            raw.parse()
                .context(format!("{} expects a numeric product id, got '{}'", flag, raw))?,
        )),
        None if args.iter().any(|arg| arg == flag) => bail!("{} expects a product id", flag),
        None => Ok(None),
    }
}

fn print_card(view: &ProductView) {
    let heart = if view.is_favorite { " ♥" } else { "" };
    println!("[{}] {}{}  {}", view.id, view.content.name, heart, view.price);

    let details = &view.content.details;
    let mut specs = Vec::new();
    if let Some(category) = &view.content.category {
        specs.push(category.as_str());
    }
    for spec in [&details.mileage, &details.transmission, &details.fuel] {
        if !spec.is_empty() {
            specs.push(spec.as_str());
        }
    }
    if !specs.is_empty() {
        println!("    {}", specs.join(" | "));
    }
}

fn print_section(heading: &str, views: &[ProductView]) {
    println!("\n========== {} ==========", heading);
    for view in views {
        print_card(view);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("showroom=info".parse()?),
        )
        .init();

    // Load environment from .env file
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let has_flag = |flag: &str| args.iter().any(|arg| arg == flag);

    let config = CatalogConfig::from_env()?;
    let store = SupabaseClient::new(
        reqwest::Client::new(),
        &config.supabase_url,
        &config.supabase_anon_key,
    );
    let token = config.access_token.as_deref();

    // Admin actions don't need a browsing session
    if let Some(raw) = flag_value(&args, "--set-rate") {
        let rate: f64 = raw
            .trim()
            .parse()
            .context(format!("--set-rate expects a number, got '{}'", raw))?;
        if !rate.is_finite() || rate <= 0.0 {
            bail!("Exchange rate must be a positive number");
        }
        store
            .upsert_setting(RATE_SETTING_KEY, raw.trim(), token)
            .await
            .context("Failed to save exchange rate")?;
        println!("{} set to {}", RATE_SETTING_KEY, raw.trim());
        return Ok(());
    }

    if has_flag("--inquiries") {
        let inquiries = store
            .list_inquiries(token)
            .await
            .context("Failed to fetch inquiries")?;
        println!("\n========== INQUIRIES ({}) ==========", inquiries.len());
        for inquiry in inquiries {
            println!(
                "{} <{}> {}: {}",
                inquiry.name,
                inquiry.email,
                inquiry.vehicle_name.as_deref().unwrap_or("-"),
                inquiry.message.as_deref().unwrap_or("")
            );
        }
        return Ok(());
    }

    if let Some(path) = flag_value(&args, "--translate-draft") {
        let contents =
            std::fs::read_to_string(path).context(format!("Failed to read draft {}", path))?;
        let draft: ProductDraft =
            serde_json::from_str(&contents).context("Failed to parse draft JSON")?;
        if !draft.has_text() {
            bail!("Draft has no text to translate");
        }
        let fields = store
            .translate_draft(&draft, token)
            .await
            .context("Failed to translate draft")?;
        println!("{}", serde_json::to_string_pretty(&fields)?);
        return Ok(());
    }

    if let Some(path) = flag_value(&args, "--save-product") {
        let contents =
            std::fs::read_to_string(path).context(format!("Failed to read product form {}", path))?;
        let form: ProductForm =
            serde_json::from_str(&contents).context("Failed to parse product form JSON")?;
        let editing_id = parse_id(&args, "--id")?;

        let saved = store
            .save_product(&form, editing_id, token)
            .await
            .context("Failed to save product")?;
        if let Some(e) = &saved.translation_error {
            println!("Translation failed, saved without Arabic fields: {}", e);
        }
        match editing_id {
            Some(id) => println!("Product {} updated", id),
            None => println!("Product added"),
        }
        return Ok(());
    }

    if let Some(id) = parse_id(&args, "--delete-product")? {
        store
            .delete_product(id, token)
            .await
            .context(format!("Failed to delete product {}", id))?;
        println!("Product {} deleted", id);
        return Ok(());
    }

    info!("Loading catalog...");
    let storage = PreferenceStorage::open(&config.preferences_file);
    let mut session = Session::start(&store, storage, config.fallback_rate).await;

    if has_flag("--toggle-lang") {
        let language = session.toggle_language()?;
        println!("Language: {} ({})", language.native_name(), language.direction());
    }
    if has_flag("--toggle-currency") {
        println!("Currency: {}", session.toggle_currency()?.code());
    }
    if has_flag("--toggle-theme") {
        println!("Theme: {}", session.toggle_theme()?.code());
    }
    if let Some(id) = parse_id(&args, "--toggle-favorite")? {
        let now_favorite = session.toggle_favorite(id)?;
        println!(
            "Product {} {} favorites",
            id,
            if now_favorite { "added to" } else { "removed from" }
        );
    }

    let strings = session.strings();

    if let Some(id) = parse_id(&args, "--details")? {
        match session.open_details(&store, id).await {
            Some(view) => {
                print_card(&view);
                println!("\n{}", view.content.description);
                for image in view.image_url.iter().chain(view.gallery.iter()) {
                    println!("  {}", image);
                }
            }
            None => println!("{}", strings.product_not_found),
        }
        return Ok(());
    }

    if has_flag("--favorites") {
        let favorites = session.favorites();
        if favorites.is_empty() {
            println!("{}", strings.no_favorites);
        } else {
            print_section("♥", &favorites);
        }
        return Ok(());
    }

    let term = flag_value(&args, "--search").unwrap_or("");
    let category = flag_value(&args, "--category");

    if term.is_empty() && category.is_none() {
        print_section(strings.featured_heading, &session.featured());
    }
    print_section(strings.inventory_heading, &session.inventory(term, category));

    Ok(())
}
