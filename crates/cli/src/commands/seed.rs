//! Insert the launch catalog.
//!
//! Idempotent: categories and products already present (matched by slug)
//! are skipped, so the command can run against a live store without
//! clobbering manual edits.

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use la_matera_admin::backend::{AdminBackend, NewCategory, ProductInput};
use la_matera_admin::config::AdminConfig;
use la_matera_admin::supabase::{AdminSupabaseClient, SupabaseError};
use la_matera_core::{CategoryId, Slug, SlugError};

/// Seeding failures.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Backend(#[from] SupabaseError),

    #[error("bad seed name: {0}")]
    Slug(#[from] SlugError),
}

/// What the seed run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub products_created: usize,
    pub skipped: usize,
}

/// One launch product, tied to its category by slug.
struct SeedProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price: i64,
    cost_price: i64,
    stock: i64,
    featured: bool,
}

const LAUNCH_CATEGORIES: &[&str] = &["Mates", "Bombillas", "Termos", "Combos", "Accesorios"];

const LAUNCH_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Mate Imperial Torpedo",
        category: "mates",
        description: "Calabaza torpedo forrada en cuero, virola de alpaca cincelada.",
        price: 45_000,
        cost_price: 21_000,
        stock: 5,
        featured: true,
    },
    SeedProduct {
        name: "Mate Camionero Acero",
        category: "mates",
        description: "Mate camionero de acero inoxidable, prácticamente indestructible.",
        price: 30_000,
        cost_price: 14_000,
        stock: 12,
        featured: false,
    },
    SeedProduct {
        name: "Bombilla Pico Loro Alpaca",
        category: "bombillas",
        description: "Bombilla pico de loro en alpaca, filtro desmontable.",
        price: 12_500,
        cost_price: 6_000,
        stock: 20,
        featured: true,
    },
    SeedProduct {
        name: "Termo Media Manija 1L",
        category: "termos",
        description: "Termo de acero con media manija, pico cebador, 1 litro.",
        price: 68_000,
        cost_price: 39_000,
        stock: 8,
        featured: true,
    },
    SeedProduct {
        name: "Combo Matero Completo",
        category: "combos",
        description: "Mate, bombilla, termo y canasta: todo para empezar a cebar.",
        price: 110_000,
        cost_price: 62_000,
        stock: 4,
        featured: false,
    },
    SeedProduct {
        name: "Canasta Matera Cuero",
        category: "accesorios",
        description: "Canasta matera de cuero vacuno con costura reforzada.",
        price: 52_000,
        cost_price: 27_000,
        stock: 6,
        featured: false,
    },
];

/// Load configuration and seed the production backend.
///
/// # Errors
///
/// Returns an error if configuration is missing or any backend write fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdminConfig::from_env()?;
    let backend = AdminSupabaseClient::new(&config.supabase, &config.storage_bucket);

    let report = seed_catalog(&backend).await?;
    info!(
        categories = report.categories_created,
        products = report.products_created,
        skipped = report.skipped,
        "Seed complete"
    );
    Ok(())
}

/// Seed the launch catalog through any admin backend.
///
/// # Errors
///
/// Returns `SeedError` on the first backend failure; rows created before
/// the failure remain (reruns skip them).
pub async fn seed_catalog(backend: &dyn AdminBackend) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    // Categories first; products reference them by id.
    let mut category_ids: HashMap<String, CategoryId> = backend
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.slug.into_inner(), c.id))
        .collect();

    for name in LAUNCH_CATEGORIES {
        let slug = Slug::derive(name)?;
        if category_ids.contains_key(slug.as_str()) {
            info!(category = name, "already exists, skipping");
            report.skipped += 1;
            continue;
        }

        let created = backend
            .create_category(&NewCategory {
                name: (*name).to_string(),
                slug: slug.clone(),
            })
            .await?;
        info!(category = name, "created");
        category_ids.insert(slug.into_inner(), created.id);
        report.categories_created += 1;
    }

    let existing_products: Vec<String> = backend
        .list_products()
        .await?
        .into_iter()
        .map(|p| p.slug.into_inner())
        .collect();

    for product in LAUNCH_PRODUCTS {
        let slug = Slug::derive(product.name)?;
        if existing_products.iter().any(|s| s == slug.as_str()) {
            info!(product = product.name, "already exists, skipping");
            report.skipped += 1;
            continue;
        }

        let Some(category_id) = category_ids.get(product.category).copied() else {
            warn!(
                product = product.name,
                category = product.category,
                "category missing, skipping product"
            );
            report.skipped += 1;
            continue;
        };

        backend
            .create_product(&ProductInput {
                name: product.name.to_string(),
                slug,
                description: Some(product.description.to_string()),
                price: Decimal::from(product.price),
                cost_price: Some(Decimal::from(product.cost_price)),
                stock: product.stock,
                images: vec![],
                category_id,
                featured: product.featured,
            })
            .await?;
        info!(product = product.name, "created");
        report.products_created += 1;
    }

    Ok(report)
}
