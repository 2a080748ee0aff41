//! Catalog command handlers for the CLI.
//!
//! Called from `main` once config is loaded and the local store is open.
//! Output goes to stdout as plain text tables; diagnostics go through
//! `tracing`.

use std::collections::HashMap;

use tienda_chat::{Assistant, ChatContext};
use tienda_core::{
    compare_product, format_clp, format_distance, load_catalog_seed, offers_from_products,
    rank_all_groups, search_products, sellers_by_distance, AppConfig, Coordinate, Product,
    RankedOffer, Seller, SellerLocation, UserLocation,
};
use tienda_store::CatalogStore;

/// Load the demo catalog from `config.catalog_path`.
///
/// Without `force` the products are only rewritten when the stored catalog
/// version differs from the file's.
pub(crate) fn run_seed(store: &CatalogStore, config: &AppConfig, force: bool) -> anyhow::Result<()> {
    let seed = load_catalog_seed(&config.catalog_path)?;
    let outcome = if force {
        store.force_seed(&seed)?
    } else {
        store.seed_if_outdated(&seed)?
    };

    tracing::info!(
        version = %seed.version,
        products_written = outcome.products_written,
        sellers_added = outcome.sellers_added,
        force,
        "catalog seed applied"
    );

    if outcome.products_written {
        println!(
            "Seeded catalog {} ({} products, {} sellers added)",
            seed.version,
            seed.products.len(),
            outcome.sellers_added
        );
    } else {
        println!(
            "Catalog {} already seeded ({} sellers added)",
            seed.version, outcome.sellers_added
        );
    }
    Ok(())
}

/// Print offer groups ranked nearest first.
pub(crate) fn run_offers(
    store: &CatalogStore,
    config: &AppConfig,
    coordinate: Option<(f64, f64)>,
    limit: Option<usize>,
    query: Option<&str>,
) -> anyhow::Result<()> {
    let user = resolve_user(store, config, coordinate)?;
    let products = store.get_products()?;
    let sellers = store.get_sellers()?;

    let filtered: Vec<Product> = match query.map(str::trim) {
        Some(q) if !q.is_empty() => search_products(&products, q).into_iter().cloned().collect(),
        _ => products,
    };

    let offers = offers_from_products(&filtered, &sellers)?;
    let locations: Vec<SellerLocation> = sellers.iter().map(Seller::location).collect();
    let groups = rank_all_groups(&offers, &locations, user.coordinate, limit)?;

    if groups.is_empty() {
        println!("No offers found.");
        return Ok(());
    }

    let names = seller_names(&sellers);
    print_location(&user);
    println!(
        "{:<34} {:>7} {:>12} {:<26} {:>10}",
        "PRODUCT", "SELLERS", "CHEAPEST", "NEAREST", "DISTANCE"
    );
    for group in &groups {
        println!(
            "{:<34} {:>7} {:>12} {:<26} {:>10}",
            truncate(&group.product_name, 34),
            group.offer_count(),
            format_clp(group.cheapest.offer.price),
            truncate(seller_name(&names, &group.nearest.offer.seller_id), 26),
            distance_cell(&group.nearest),
        );
    }
    Ok(())
}

/// Print one listing's full comparison, cheapest first.
pub(crate) fn run_compare(
    store: &CatalogStore,
    config: &AppConfig,
    product_id: u64,
) -> anyhow::Result<()> {
    let user = resolve_user(store, config, None)?;
    let products = store.get_products()?;
    let sellers = store.get_sellers()?;
    let comparison = compare_product(&products, &sellers, user.coordinate, product_id)?;

    let names = seller_names(&sellers);
    let group = &comparison.group;
    println!("{} ({} offers)", group.product_name, group.offer_count());
    print_location(&user);
    for ranked in &comparison.by_price {
        let mut tags = Vec::new();
        if ranked.offer.product_id == group.cheapest.offer.product_id {
            tags.push("cheapest");
        }
        if ranked.offer.product_id == group.nearest.offer.product_id {
            tags.push("nearest");
        }
        println!(
            "  #{:<6} {:<26} {:>12} {:>10}  {}",
            ranked.offer.product_id,
            truncate(seller_name(&names, &ranked.offer.seller_id), 26),
            format_clp(ranked.offer.price),
            distance_cell(ranked),
            tags.join(", ")
        );
    }
    if !group.is_exclusive {
        println!("Price spread: {}", format_clp(group.price_spread()));
    }
    Ok(())
}

/// Print the seller directory, nearest first, then sellers with no location.
pub(crate) fn run_sellers(store: &CatalogStore, config: &AppConfig) -> anyhow::Result<()> {
    let user = resolve_user(store, config, None)?;
    let sellers = store.get_sellers()?;

    print_location(&user);
    for nearby in sellers_by_distance(&sellers, user.coordinate) {
        println!(
            "{:<12} {:<30} {:>10}  {}",
            nearby.seller.id, nearby.seller.name, nearby.distance_label, nearby.seller.address
        );
    }
    for seller in sellers.iter().filter(|s| s.coordinate.is_none()) {
        println!(
            "{:<12} {:<30} {:>10}  {}",
            seller.id, seller.name, "?", seller.address
        );
    }
    Ok(())
}

/// Ask the assistant one question with no prior history.
pub(crate) async fn run_chat(
    store: &CatalogStore,
    config: &AppConfig,
    message: &str,
) -> anyhow::Result<()> {
    let user = resolve_user(store, config, None)?;
    let products = store.get_products()?;
    let sellers = store.get_sellers()?;
    let assistant = Assistant::from_config(&config.chat);

    let ctx = ChatContext::new(&products, &sellers, user);
    let reply = assistant.reply(message, &[], &ctx).await?;
    tracing::debug!(source = ?reply.source, links = reply.products.len(), "chat reply");

    println!("{}", reply.text);
    for link in &reply.products {
        println!(
            "  -> [{}] {} ({}) #{}",
            link.tag,
            link.label,
            format_clp(link.price),
            link.product_id
        );
    }
    Ok(())
}

fn resolve_user(
    store: &CatalogStore,
    config: &AppConfig,
    coordinate: Option<(f64, f64)>,
) -> anyhow::Result<UserLocation> {
    match coordinate {
        Some((lat, lng)) => Ok(UserLocation::precise(Coordinate::new(lat, lng)?)),
        None => Ok(store.resolve_user_location(config.default_location)?),
    }
}

fn print_location(user: &UserLocation) {
    let kind = if user.is_precise() {
        "your location"
    } else {
        "approximate location"
    };
    println!(
        "Distances from {kind} ({:.4}, {:.4})",
        user.coordinate.lat, user.coordinate.lng
    );
}

fn seller_names(sellers: &[Seller]) -> HashMap<&str, &str> {
    sellers
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect()
}

fn seller_name<'a>(names: &HashMap<&str, &'a str>, seller_id: &'a str) -> &'a str {
    names.get(seller_id).copied().unwrap_or(seller_id)
}

pub(crate) fn distance_cell(ranked: &RankedOffer) -> String {
    if ranked.distance_known {
        format_distance(ranked.distance_meters)
    } else {
        "?".to_owned()
    }
}

/// Clip `text` to `width` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
